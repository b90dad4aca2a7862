//! Fallback policy decisions.

use std::sync::Arc;

use courier::address::{DirectoryEntry, E164Canonicalizer, InMemoryDirectory};
use courier::config::FallbackConfig;
use courier::policy::FallbackPolicy;

const NUMBER: &str = "+15551234567";
const GROUP: &str = "__textsecure_group__!00ff";

fn entry(number: &str, fallback: bool) -> DirectoryEntry {
    DirectoryEntry {
        number: number.to_owned(),
        fallback,
        relay: None,
    }
}

fn policy(entries: Vec<DirectoryEntry>, allowed: bool, ask_required: bool) -> FallbackPolicy {
    FallbackPolicy::new(
        Arc::new(E164Canonicalizer::default()),
        Arc::new(InMemoryDirectory::from_entries(entries)),
        Arc::new(FallbackConfig {
            allowed,
            ask_required,
        }),
    )
}

#[tokio::test]
async fn directory_verdict_decides_for_individuals() {
    let p = policy(vec![entry(NUMBER, true)], true, false);
    assert!(p.is_fallback_supported(NUMBER).await);
    assert!(p.is_fallback_supported("(555) 123-4567").await);

    let p = policy(vec![entry(NUMBER, false)], true, false);
    assert!(!p.is_fallback_supported(NUMBER).await);
}

#[tokio::test]
async fn unknown_numbers_have_no_fallback() {
    let p = policy(vec![], true, false);
    assert!(!p.is_fallback_supported(NUMBER).await);
}

#[tokio::test]
async fn malformed_destinations_have_no_fallback() {
    let p = policy(vec![entry(NUMBER, true)], true, true);
    for raw in ["", "not-a-number", "+1", "__textsecure_group__!"] {
        assert!(!p.is_fallback_supported(raw).await, "{raw:?}");
        assert!(!p.is_fallback_approval_required(raw).await, "{raw:?}");
    }
}

#[tokio::test]
async fn groups_never_fall_back() {
    let p = policy(vec![entry(GROUP, true)], true, false);
    assert!(!p.is_fallback_supported(GROUP).await);

    let verdict = p.evaluate(GROUP).await;
    assert!(verdict.canonical.is_some_and(|c| c.is_group()));
    assert!(!verdict.supported);
}

#[tokio::test]
async fn disabled_preference_overrides_directory() {
    let p = policy(vec![entry(NUMBER, true)], false, true);
    assert!(!p.is_fallback_supported(NUMBER).await);
    assert!(!p.is_fallback_approval_required(NUMBER).await);
}

#[tokio::test]
async fn approval_follows_configuration_when_supported() {
    let p = policy(vec![entry(NUMBER, true)], true, false);
    assert!(!p.is_fallback_approval_required(NUMBER).await);

    let p = policy(vec![entry(NUMBER, true)], true, true);
    assert!(p.is_fallback_approval_required(NUMBER).await);
}

#[tokio::test]
async fn approval_never_required_without_support() {
    let p = policy(vec![entry(NUMBER, false)], true, true);
    assert!(!p.is_fallback_approval_required(NUMBER).await);
}

#[tokio::test]
async fn verdict_carries_canonical_form() {
    let p = policy(vec![entry(NUMBER, true)], true, true);
    let verdict = p.evaluate("+1 555 123 4567").await;
    assert_eq!(
        verdict.canonical.map(|c| c.into_string()).as_deref(),
        Some(NUMBER)
    );
    assert!(verdict.supported);
    assert!(verdict.approval_required);
}
