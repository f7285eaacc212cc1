use validator::ValidateEmail;

/// Longest address accepted, per the SMTP path limit.
pub const MAX_EMAIL_LEN: usize = 254;

pub const MAX_SOURCE_LEN: usize = 200;

/// Trims and lowercases an email so it can be used as a store key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates that the input looks like a deliverable email address.
///
/// On top of the `validator` syntax check the domain must carry a dot and an
/// alphabetic TLD of at least two characters, so `user@localhost` is rejected.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.len() > MAX_EMAIL_LEN || !email.validate_email() {
        return false;
    }

    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}
