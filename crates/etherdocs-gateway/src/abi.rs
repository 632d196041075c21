//! Calldata for the document registry contract.
//!
//! The registry exposes two methods:
//!
//! ```text
//! registerDocument(bytes32)            // state-changing
//! verifyDocument(bytes32) returns bool // view
//! ```
//!
//! Calldata is the 4-byte selector followed by the fingerprint as one
//! 32-byte word. Return data for `verifyDocument` is one 32-byte word.

use bytes::{BufMut, Bytes, BytesMut};
use etherdocs_core::{keccak256, Fingerprint};

use crate::error::AbiError;

/// Signature text of the registration method.
pub const REGISTER_SIGNATURE: &str = "registerDocument(bytes32)";

/// Signature text of the lookup method.
pub const VERIFY_SIGNATURE: &str = "verifyDocument(bytes32)";

/// Size of an ABI word.
pub const WORD_LEN: usize = 32;

/// Size of a call with one `bytes32` argument.
pub const CALL_LEN: usize = 4 + WORD_LEN;

/// A 4-byte method selector.
pub type Selector = [u8; 4];

/// First four bytes of Keccak-256 over a method signature.
pub fn selector(signature: &str) -> Selector {
    let digest = keccak256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// A decoded registry call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryCall {
    Register(Fingerprint),
    Verify(Fingerprint),
}

impl RegistryCall {
    /// The fingerprint argument.
    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            Self::Register(fp) | Self::Verify(fp) => fp,
        }
    }

    /// Encode as calldata.
    pub fn encode(&self) -> Bytes {
        match self {
            Self::Register(fp) => encode_register(fp),
            Self::Verify(fp) => encode_verify(fp),
        }
    }
}

/// Calldata for `registerDocument(fp)`.
pub fn encode_register(fingerprint: &Fingerprint) -> Bytes {
    encode_call(&selector(REGISTER_SIGNATURE), fingerprint)
}

/// Calldata for `verifyDocument(fp)`.
pub fn encode_verify(fingerprint: &Fingerprint) -> Bytes {
    encode_call(&selector(VERIFY_SIGNATURE), fingerprint)
}

fn encode_call(selector: &Selector, fingerprint: &Fingerprint) -> Bytes {
    let mut buf = BytesMut::with_capacity(CALL_LEN);
    buf.put_slice(selector);
    buf.put_slice(fingerprint.as_bytes());
    buf.freeze()
}

/// Decode registry calldata.
pub fn decode_call(data: &[u8]) -> Result<RegistryCall, AbiError> {
    if data.len() != CALL_LEN {
        return Err(AbiError::WrongLength {
            expected: CALL_LEN,
            actual: data.len(),
        });
    }

    let mut word = [0u8; WORD_LEN];
    word.copy_from_slice(&data[4..]);
    let fingerprint = Fingerprint::from_bytes(word);

    let head = &data[..4];
    if head == selector(REGISTER_SIGNATURE) {
        Ok(RegistryCall::Register(fingerprint))
    } else if head == selector(VERIFY_SIGNATURE) {
        Ok(RegistryCall::Verify(fingerprint))
    } else {
        Err(AbiError::UnknownSelector(hex::encode(head)))
    }
}

/// Encode a `bool` return word.
pub fn encode_bool(value: bool) -> Bytes {
    let mut word = [0u8; WORD_LEN];
    word[WORD_LEN - 1] = u8::from(value);
    Bytes::copy_from_slice(&word)
}

/// Decode a `bool` return word. Only the canonical 0 and 1 words are accepted.
pub fn decode_bool(data: &[u8]) -> Result<bool, AbiError> {
    if data.len() != WORD_LEN {
        return Err(AbiError::WrongLength {
            expected: WORD_LEN,
            actual: data.len(),
        });
    }
    if data[..WORD_LEN - 1].iter().any(|b| *b != 0) {
        return Err(AbiError::NotABool);
    }
    match data[WORD_LEN - 1] {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(AbiError::NotABool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherdocs_core::fingerprint;
    use proptest::prelude::*;

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector(REGISTER_SIGNATURE)), "9b131974");
        assert_eq!(hex::encode(selector(VERIFY_SIGNATURE)), "fe35089f");
    }

    #[test]
    fn test_call_layout() {
        let fp = fingerprint(b"layout");
        let data = encode_register(&fp);
        assert_eq!(data.len(), CALL_LEN);
        assert_eq!(&data[..4], &selector(REGISTER_SIGNATURE));
        assert_eq!(&data[4..], fp.as_bytes());
    }

    #[test]
    fn test_decode_call() {
        let fp = fingerprint(b"decode");
        assert_eq!(decode_call(&encode_register(&fp)), Ok(RegistryCall::Register(fp)));
        assert_eq!(decode_call(&encode_verify(&fp)), Ok(RegistryCall::Verify(fp)));
        assert_eq!(RegistryCall::Verify(fp).encode(), encode_verify(&fp));
    }

    #[test]
    fn test_decode_call_rejects_garbage() {
        assert_eq!(
            decode_call(&[0u8; 5]),
            Err(AbiError::WrongLength {
                expected: CALL_LEN,
                actual: 5
            })
        );
        let mut data = encode_verify(&Fingerprint::ZERO).to_vec();
        data[0] ^= 0xff;
        assert!(matches!(decode_call(&data), Err(AbiError::UnknownSelector(_))));
    }

    #[test]
    fn test_bool_words() {
        assert_eq!(decode_bool(&encode_bool(true)), Ok(true));
        assert_eq!(decode_bool(&encode_bool(false)), Ok(false));

        let mut two = [0u8; WORD_LEN];
        two[WORD_LEN - 1] = 2;
        assert_eq!(decode_bool(&two), Err(AbiError::NotABool));

        let mut high = [0u8; WORD_LEN];
        high[0] = 1;
        high[WORD_LEN - 1] = 1;
        assert_eq!(decode_bool(&high), Err(AbiError::NotABool));

        assert!(matches!(decode_bool(&[1]), Err(AbiError::WrongLength { .. })));
    }

    proptest! {
        #[test]
        fn prop_only_canonical_words_are_bools(word in any::<[u8; WORD_LEN]>()) {
            let canonical = word[..WORD_LEN - 1].iter().all(|b| *b == 0) && word[WORD_LEN - 1] <= 1;
            match decode_bool(&word) {
                Ok(value) => {
                    prop_assert!(canonical);
                    let encoded = encode_bool(value);
                    prop_assert_eq!(encoded.as_ref(), &word[..]);
                }
                Err(err) => {
                    prop_assert!(!canonical);
                    prop_assert_eq!(err, AbiError::NotABool);
                }
            }
        }

        #[test]
        fn prop_foreign_selectors_are_refused(head in any::<[u8; 4]>(), body in any::<[u8; WORD_LEN]>()) {
            prop_assume!(head != selector(REGISTER_SIGNATURE) && head != selector(VERIFY_SIGNATURE));
            let mut data = head.to_vec();
            data.extend_from_slice(&body);
            prop_assert_eq!(decode_call(&data), Err(AbiError::UnknownSelector(hex::encode(head))));
        }

        #[test]
        fn prop_calldata_of_wrong_length_is_refused(data in proptest::collection::vec(any::<u8>(), 0..96)) {
            prop_assume!(data.len() != CALL_LEN);
            prop_assert_eq!(
                decode_call(&data),
                Err(AbiError::WrongLength { expected: CALL_LEN, actual: data.len() })
            );
        }
    }
}
