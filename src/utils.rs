use lazy_static::lazy_static;
use rand::distributions::Alphanumeric;
use rand::Rng;
use regex::Regex;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_RE.is_match(email)
}

/// Opaque 9-character lowercase alphanumeric identifier.
pub fn fresh_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}
