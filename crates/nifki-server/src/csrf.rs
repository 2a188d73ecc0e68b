//! Per-page form tokens.
//!
//! The edit form carries a keyed BLAKE3 hash of the page name under the
//! server's secret key. A save is accepted only when the token matches the
//! page being saved, so a form cannot be replayed against another page or
//! forged without the key.

use nifki_core::PageName;

use crate::config::SecretKey;

/// Token embedded in the edit form for `page`.
pub fn token_for(key: &SecretKey, page: &PageName) -> String {
    blake3::keyed_hash(key.as_bytes(), page.as_str().as_bytes())
        .to_hex()
        .to_string()
}

/// Checks a submitted token. The comparison is constant time.
pub fn verify(key: &SecretKey, page: &PageName, token: &str) -> bool {
    match blake3::Hash::from_hex(token) {
        Ok(submitted) => submitted == blake3::keyed_hash(key.as_bytes(), page.as_str().as_bytes()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(s: &str) -> PageName {
        PageName::parse(s).unwrap()
    }

    #[test]
    fn token_verifies_for_its_page_only() {
        let key = SecretKey::from_bytes([1u8; 32]);
        let token = token_for(&key, &page("mygame"));
        assert_eq!(token.len(), 64);
        assert!(verify(&key, &page("mygame"), &token));
        assert!(!verify(&key, &page("othergame"), &token));
    }

    #[test]
    fn token_depends_on_key() {
        let token = token_for(&SecretKey::from_bytes([1u8; 32]), &page("mygame"));
        assert!(!verify(&SecretKey::from_bytes([2u8; 32]), &page("mygame"), &token));
    }

    #[test]
    fn garbage_is_rejected() {
        let key = SecretKey::from_bytes([1u8; 32]);
        assert!(!verify(&key, &page("mygame"), ""));
        assert!(!verify(&key, &page("mygame"), "not hex at all"));
    }
}
