use rand::{rngs::OsRng, RngCore};
use time::{Duration, OffsetDateTime};

const TOKEN_BYTES: usize = 40;

/// Random one-time token for email verification and password reset,
/// hex encoded (80 characters).
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn reset_token_expiry(issued_at: OffsetDateTime, ttl_hours: i64) -> OffsetDateTime {
    issued_at + Duration::hours(ttl_hours)
}

/// A reset token is usable strictly before its expiry.
pub fn is_unexpired(expires: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
    expires.is_some_and(|exp| exp > now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_80_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn expiry_window() {
        let issued = OffsetDateTime::now_utc();
        let exp = reset_token_expiry(issued, 24);
        assert_eq!(exp - issued, Duration::hours(24));
        assert!(is_unexpired(Some(exp), issued + Duration::hours(23)));
        assert!(!is_unexpired(Some(exp), issued + Duration::hours(24)));
        assert!(!is_unexpired(Some(exp), issued + Duration::hours(25)));
        assert!(!is_unexpired(None, issued));
    }
}
