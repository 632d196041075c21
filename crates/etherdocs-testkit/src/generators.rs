//! Proptest generators for property-based testing.

use proptest::prelude::*;

use etherdocs::VerificationRequest;
use etherdocs_core::{Address, Fingerprint, Keypair};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random Address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Generate a random Fingerprint.
pub fn fingerprint() -> impl Strategy<Value = Fingerprint> {
    any::<[u8; 32]>().prop_map(Fingerprint::from_bytes)
}

/// Generate document bytes of specified max length.
pub fn document(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Two documents that differ.
pub fn distinct_documents(max_len: usize) -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (document(max_len), document(max_len)).prop_filter("documents must differ", |(a, b)| a != b)
}

/// A fingerprint rendered the ways a user might type it: canonical,
/// upper-case digits, `0X` prefix, or padded with whitespace.
pub fn fingerprint_text() -> impl Strategy<Value = (Fingerprint, String)> {
    (fingerprint(), 0u8..4).prop_map(|(fp, style)| {
        let canonical = fp.to_hex();
        let text = match style {
            0 => canonical,
            1 => format!("0x{}", canonical[2..].to_uppercase()),
            2 => format!("0X{}", &canonical[2..]),
            _ => format!("  {canonical}\n"),
        };
        (fp, text)
    })
}

/// Text that is not a fingerprint.
pub fn malformed_hash_text() -> impl Strategy<Value = String> {
    prop_oneof![
        // Wrong length.
        "0x[0-9a-f]{0,63}".prop_map(String::from),
        "0x[0-9a-f]{65,80}".prop_map(String::from),
        // Missing prefix.
        "[0-9a-f]{64}".prop_map(String::from),
        // Non-hex digit somewhere in the body.
        ("[0-9a-f]{0,63}", "[g-zG-Z_-]").prop_map(|(body, bad)| {
            let mut text = format!("0x{body}{bad}");
            while text.len() < 66 {
                text.push('0');
            }
            text
        }),
        // Free text.
        "[ -~]{0,40}".prop_filter("must not parse", |s| Fingerprint::parse(s).is_err()),
    ]
}

/// A request that never reaches the ledger.
pub fn invalid_request() -> impl Strategy<Value = VerificationRequest> {
    malformed_hash_text().prop_map(VerificationRequest::ByHash)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn fingerprint_text_parses_to_same_value((fp, text) in fingerprint_text()) {
            prop_assert_eq!(Fingerprint::parse(&text).unwrap(), fp);
        }

        #[test]
        fn malformed_text_never_parses(text in malformed_hash_text()) {
            prop_assert!(Fingerprint::parse(&text).is_err());
        }

        #[test]
        fn keypair_address_matches_public_key(kp in keypair()) {
            prop_assert_eq!(kp.address(), kp.public_key().address());
        }
    }
}
