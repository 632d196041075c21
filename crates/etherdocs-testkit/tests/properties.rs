//! Properties that hold across crates.

use etherdocs::{fingerprint, IssuanceOutcome, Outcome, Phase, VerificationRequest};
use etherdocs_testkit::generators::{distinct_documents, document, invalid_request};
use etherdocs_testkit::TestFixture;
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn fingerprint_is_deterministic(doc in document(4096)) {
        prop_assert_eq!(fingerprint(&doc), fingerprint(&doc));
    }

    #[test]
    fn distinct_documents_have_distinct_fingerprints((a, b) in distinct_documents(256)) {
        prop_assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn invalid_requests_never_reach_the_ledger(request in invalid_request()) {
        let fixture = TestFixture::new();
        let result = runtime().block_on(fixture.verify(request));
        prop_assert_eq!(result.outcome, Outcome::Invalid);
        prop_assert!(!result.trail.contains(&Phase::AwaitingLedger));
        prop_assert_eq!(fixture.gateway().total_calls(), 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn register_then_verify_is_found(doc in document(512)) {
        let fixture = TestFixture::new();
        let rt = runtime();

        let before = rt.block_on(fixture.verify(VerificationRequest::ByFile(doc.clone())));
        prop_assert_eq!(before.outcome, Outcome::NotFound);

        let first = rt.block_on(fixture.issue(&doc));
        prop_assert!(
            matches!(first.outcome, IssuanceOutcome::Registered { .. }),
            "unexpected {:?}",
            first.outcome
        );
        let second = rt.block_on(fixture.issue(&doc));
        prop_assert_eq!(second.outcome, IssuanceOutcome::AlreadyRegistered);

        let after = rt.block_on(fixture.verify(VerificationRequest::ByFile(doc)));
        prop_assert_eq!(after.outcome, Outcome::Success);
    }
}

#[tokio::test]
async fn transport_failure_is_never_not_found() {
    let fixture = TestFixture::new();
    fixture.issue(b"on ledger").await;
    fixture.ledger.set_offline(true);

    for doc in [&b"on ledger"[..], b"not on ledger"] {
        let result = fixture
            .verify(VerificationRequest::ByFile(doc.to_vec()))
            .await;
        assert_eq!(result.outcome, Outcome::TransportError);
    }
}

#[tokio::test]
async fn no_wallet_is_transport_error_with_detail() {
    let fixture = TestFixture::new();
    let result = fixture
        .verify_without_wallet(VerificationRequest::ByHash(format!("0x{}", "0".repeat(64))))
        .await;
    assert_eq!(result.outcome, Outcome::TransportError);
    assert!(result.detail.starts_with("no wallet available"));
    assert_eq!(fixture.gateway().verify_calls(), 1);
}
