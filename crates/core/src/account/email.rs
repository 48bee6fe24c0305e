/// Normalize an email address by lowercasing its domain part.
///
/// Surrounding whitespace is trimmed and the address is split at the last `@`.
/// The local part is left untouched. Input without an `@` is returned trimmed.
///
/// # Examples
///
/// ```
/// use authbridge_core::account::normalize_email;
///
/// assert_eq!(normalize_email("John@GMAil.coM"), "John@gmail.com");
/// assert_eq!(normalize_email("  no-at-sign "), "no-at-sign");
/// ```
pub fn normalize_email(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => trimmed.to_string(),
    }
}

/// Canonical form used to store and look up accounts.
///
/// Applies [`normalize_email`] and then lowercases the whole address, so
/// `JOHN@Example.COM` and `john@example.com` name the same account.
///
/// # Examples
///
/// ```
/// use authbridge_core::account::canonical_email;
///
/// assert_eq!(canonical_email(" JOHN@Example.COM"), "john@example.com");
/// ```
pub fn canonical_email(raw: &str) -> String {
    normalize_email(raw).to_lowercase()
}

/// Split a provider-supplied display name into first and last name.
///
/// The first whitespace-separated word becomes the first name and the rest the
/// last name. Missing parts are empty strings.
pub fn split_full_name(name: &str) -> (String, String) {
    let name = name.trim();
    match name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}
