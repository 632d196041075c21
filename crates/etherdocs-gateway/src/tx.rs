//! Ledger transactions and their signatures.
//!
//! A transaction is signed over a domain tag followed by the canonical CBOR
//! encoding of its fields. Its hash covers those bytes plus the signature.

use bytes::Bytes;
use ciborium::value::Value;
use etherdocs_core::{
    encode_canonical, Address, CoreError, Keypair, PublicKey, Signature, TxHash,
};

/// Domain separation for transaction signatures.
pub const TX_SIG_DOMAIN: &[u8] = b"etherdocs/tx-sig/v1";

/// An unsigned contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub chain_id: u64,
    /// Per-sender counter; makes otherwise identical calls distinct.
    pub nonce: u64,
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
}

impl Transaction {
    fn to_cbor(&self) -> Value {
        let text = |s: &str| Value::Text(s.to_string());
        Value::Map(vec![
            (text("chain"), Value::Integer(self.chain_id.into())),
            (text("nonce"), Value::Integer(self.nonce.into())),
            (text("from"), Value::Bytes(self.from.as_bytes().to_vec())),
            (text("to"), Value::Bytes(self.to.as_bytes().to_vec())),
            (text("data"), Value::Bytes(self.data.to_vec())),
        ])
    }

    /// The exact bytes a wallet signs.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, CoreError> {
        let mut bytes = TX_SIG_DOMAIN.to_vec();
        bytes.extend_from_slice(&encode_canonical(&self.to_cbor())?);
        Ok(bytes)
    }
}

/// A transaction with the sender's signature attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx: Transaction,
    pub public_key: PublicKey,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Sign `tx` with `keypair`.
    pub fn sign(tx: Transaction, keypair: &Keypair) -> Result<Self, CoreError> {
        let signature = keypair.sign(&tx.signing_bytes()?);
        Ok(Self {
            tx,
            public_key: keypair.public_key(),
            signature,
        })
    }

    /// Check that the key owns `from` and the signature covers the fields.
    pub fn verify(&self) -> Result<(), CoreError> {
        if self.public_key.address() != self.tx.from {
            return Err(CoreError::InvalidPublicKey);
        }
        self.public_key
            .verify(&self.tx.signing_bytes()?, &self.signature)
    }

    /// Identifier of this transaction.
    pub fn hash(&self) -> Result<TxHash, CoreError> {
        let mut bytes = self.tx.signing_bytes()?;
        bytes.extend_from_slice(self.signature.as_bytes());
        Ok(TxHash::of(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi;
    use etherdocs_core::fingerprint;

    fn sample(keypair: &Keypair, nonce: u64) -> Transaction {
        Transaction {
            chain_id: 1337,
            nonce,
            from: keypair.address(),
            to: Address::from_bytes([0xcc; 20]),
            data: abi::encode_register(&fingerprint(b"tx")),
        }
    }

    #[test]
    fn test_sign_verify() {
        let keypair = Keypair::from_seed(&[7; 32]);
        let signed = SignedTransaction::sign(sample(&keypair, 0), &keypair).unwrap();
        signed.verify().unwrap();
    }

    #[test]
    fn test_tampered_field_fails() {
        let keypair = Keypair::from_seed(&[7; 32]);
        let mut signed = SignedTransaction::sign(sample(&keypair, 0), &keypair).unwrap();
        signed.tx.data = abi::encode_register(&fingerprint(b"other"));
        assert!(matches!(signed.verify(), Err(CoreError::InvalidSignature)));
    }

    #[test]
    fn test_foreign_sender_fails() {
        let owner = Keypair::from_seed(&[7; 32]);
        let thief = Keypair::from_seed(&[8; 32]);
        let signed = SignedTransaction::sign(sample(&owner, 0), &thief).unwrap();
        assert!(matches!(signed.verify(), Err(CoreError::InvalidPublicKey)));
    }

    #[test]
    fn test_nonce_changes_hash() {
        let keypair = Keypair::from_seed(&[7; 32]);
        let a = SignedTransaction::sign(sample(&keypair, 0), &keypair).unwrap();
        let b = SignedTransaction::sign(sample(&keypair, 1), &keypair).unwrap();
        assert_ne!(a.hash().unwrap(), b.hash().unwrap());
        assert_eq!(a.hash().unwrap(), a.clone().hash().unwrap());
    }

    #[test]
    fn test_signing_bytes_are_domain_tagged() {
        let keypair = Keypair::from_seed(&[7; 32]);
        let bytes = sample(&keypair, 3).signing_bytes().unwrap();
        assert!(bytes.starts_with(TX_SIG_DOMAIN));
        let body: Value = ciborium::from_reader(&bytes[TX_SIG_DOMAIN.len()..]).unwrap();
        assert!(matches!(body, Value::Map(ref entries) if entries.len() == 5));
    }
}
