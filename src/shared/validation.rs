use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Extracts the backend user key from a `Set-Cookie` header
    /// - Matches: "UserKey=abc%3D; Path=/; HttpOnly" -> "abc%3D"
    pub static ref USER_KEY_COOKIE_REGEX: Regex = Regex::new(r"UserKey=([^;]+)").unwrap();

    /// Anything that is not an ASCII digit (used to normalise phone numbers)
    pub static ref NON_DIGIT_REGEX: Regex = Regex::new(r"\D").unwrap();
}

/// Keep only the digits of a phone fragment
pub fn digits_only(input: &str) -> String {
    NON_DIGIT_REGEX.replace_all(input, "").into_owned()
}

/// Pull the URL-decoded user key out of a `Set-Cookie` header value
pub fn user_key_from_set_cookie(header: &str) -> Option<String> {
    let raw = USER_KEY_COOKIE_REGEX.captures(header)?.get(1)?.as_str();
    match urlencoding::decode(raw) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("+62"), "62");
        assert_eq!(digits_only("(812) 345-678"), "812345678");
        assert_eq!(digits_only(""), "");
    }

    #[test]
    fn test_user_key_from_set_cookie() {
        assert_eq!(
            user_key_from_set_cookie("UserKey=abc%3D%3D; Path=/; HttpOnly").as_deref(),
            Some("abc==")
        );
        assert_eq!(
            user_key_from_set_cookie("Other=1; UserKey=plain").as_deref(),
            Some("plain")
        );
        assert!(user_key_from_set_cookie("Session=xyz; Path=/").is_none());
    }
}
