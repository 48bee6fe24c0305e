/// Validates a social login `redirect_uri` against the configured allow-list.
///
/// Returns `Some(uri)` only for an exact match with one of the allowed URIs.
///
/// # Security
///
/// This function prevents the authorization code from being delivered to an
/// attacker-controlled location:
/// - Only exact matches are accepted (no prefix or pattern matching)
/// - URIs containing control characters are rejected
/// - An empty allow-list rejects everything
///
/// # Examples
///
/// ```
/// use authbridge_core::auth::validate_redirect_uri;
///
/// let allowed = vec!["http://localhost:3000/auth/google".to_string()];
///
/// assert_eq!(
///     validate_redirect_uri("http://localhost:3000/auth/google", &allowed),
///     Some("http://localhost:3000/auth/google")
/// );
/// assert_eq!(validate_redirect_uri("https://evil.com", &allowed), None);
/// ```
pub fn validate_redirect_uri<'a>(uri: &'a str, allowed: &[String]) -> Option<&'a str> {
    if uri.is_empty() {
        return None;
    }

    // Reject control characters (potential header injection)
    if uri.chars().any(|c| c.is_control()) {
        return None;
    }

    if allowed.iter().any(|candidate| candidate == uri) {
        Some(uri)
    } else {
        None
    }
}
