//! Golden test vectors for deterministic verification.
//!
//! Fingerprints and selectors must match what any Keccak-256 implementation
//! (and therefore the deployed registry contract) computes.

use etherdocs_core::fingerprint;
use etherdocs_gateway::abi;

/// A document with its expected fingerprint.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Document bytes.
    pub document: &'static [u8],
    /// Expected fingerprint, canonical form.
    pub expected_fingerprint: &'static str,
}

/// A method signature with its expected selector.
#[derive(Debug, Clone)]
pub struct SelectorVector {
    pub signature: &'static str,
    /// Expected selector, hex without prefix.
    pub expected_selector: &'static str,
}

/// Get all fingerprint vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty document",
            document: b"",
            expected_fingerprint:
                "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
        },
        GoldenVector {
            name: "abc",
            document: b"abc",
            expected_fingerprint:
                "0x4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45",
        },
        GoldenVector {
            name: "hello",
            document: b"hello",
            expected_fingerprint:
                "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8",
        },
        GoldenVector {
            name: "registry signature text",
            document: b"registerDocument(bytes32)",
            expected_fingerprint:
                "0x9b1319742735671c17507e040bba4c645b71ea90b08430db2d4965a5ed89fd8d",
        },
        GoldenVector {
            name: "lookup signature text",
            document: b"verifyDocument(bytes32)",
            expected_fingerprint:
                "0xfe35089f37fcb416d09b2345f695648f7c6f19edcf71b5145645f068545240f3",
        },
    ]
}

/// Get all selector vectors.
pub fn selector_vectors() -> Vec<SelectorVector> {
    vec![
        SelectorVector {
            signature: "transfer(address,uint256)",
            expected_selector: "a9059cbb",
        },
        SelectorVector {
            signature: abi::REGISTER_SIGNATURE,
            expected_selector: "9b131974",
        },
        SelectorVector {
            signature: abi::VERIFY_SIGNATURE,
            expected_selector: "fe35089f",
        },
    ]
}

/// Check every vector; returns `(name, passed, actual)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let fingerprints = all_vectors().into_iter().map(|v| {
        let actual = fingerprint(v.document).to_hex();
        (v.name.to_string(), actual == v.expected_fingerprint, actual)
    });
    let selectors = selector_vectors().into_iter().map(|v| {
        let actual = hex::encode(abi::selector(v.signature));
        (v.signature.to_string(), actual == v.expected_selector, actual)
    });
    fingerprints.chain(selectors).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_pass() {
        for (name, passed, actual) in verify_all_vectors() {
            assert!(passed, "vector {name} produced {actual}");
        }
    }

    #[test]
    fn test_selectors_prefix_signature_fingerprints() {
        let vectors = all_vectors();
        for selector in selector_vectors().iter().skip(1) {
            let golden = vectors
                .iter()
                .find(|v| v.document == selector.signature.as_bytes())
                .unwrap();
            assert_eq!(&golden.expected_fingerprint[2..10], selector.expected_selector);
        }
    }
}
