//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the client for the remote backend API and the process-local
//! request cache and rate limiter that sit in front of it.

pub mod backend;
