mod common;

use common::{Catalog, Harness, SOURCE_ID, source_profile};
use futures::StreamExt;
use ssolink_models::{ConnectionState, MetadataUpdate};
use ssolink_traits::{AuditAction, AuditResult};

#[tokio::test]
async fn test_discovery_creates_linked_profile_once() {
    let harness = Harness::new().with_source().await;
    let catalog = Catalog::new();
    catalog.grant("111", "Admin");

    let first = harness
        .reconciler
        .sync_linked_profiles(SOURCE_ID, &catalog)
        .await
        .unwrap();
    assert_eq!(first.created, vec!["sso:sso:1#Admin-111"]);
    assert!(first.removed.is_empty());
    assert_eq!(harness.stored_ids().await, vec!["sso:1", "sso:sso:1#Admin-111"]);

    let second = harness
        .reconciler
        .sync_linked_profiles(SOURCE_ID, &catalog)
        .await
        .unwrap();
    assert!(second.created.is_empty());
    assert!(second.removed.is_empty());
    assert_eq!(second.roles_found, 1);
    assert_eq!(harness.stored_ids().await, vec!["sso:1", "sso:sso:1#Admin-111"]);
}

#[tokio::test]
async fn test_rediscovery_keeps_existing_metadata() {
    let harness = Harness::new().with_source().await;
    let catalog = Catalog::new();
    catalog.grant("111", "Admin");

    harness
        .reconciler
        .sync_linked_profiles(SOURCE_ID, &catalog)
        .await
        .unwrap();
    harness
        .store
        .update_metadata(
            "sso:sso:1#Admin-111",
            MetadataUpdate::state(ConnectionState::Valid),
        )
        .await
        .unwrap();

    harness
        .reconciler
        .sync_linked_profiles(SOURCE_ID, &catalog)
        .await
        .unwrap();

    let stored = harness
        .store
        .get_profile("sso:sso:1#Admin-111")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.connection_state(), ConnectionState::Valid);
}

#[tokio::test]
async fn test_complete_run_removes_revoked_role() {
    let harness = Harness::new().with_source().await;
    let catalog = Catalog::new();
    catalog.grant("111", "Admin");
    catalog.grant("111", "ReadOnly");

    harness
        .reconciler
        .sync_linked_profiles(SOURCE_ID, &catalog)
        .await
        .unwrap();

    catalog.revoke("111", "ReadOnly");
    let report = harness
        .reconciler
        .sync_linked_profiles(SOURCE_ID, &catalog)
        .await
        .unwrap();

    assert_eq!(report.removed, vec!["sso:sso:1#ReadOnly-111"]);
    assert_eq!(harness.stored_ids().await, vec!["sso:1", "sso:sso:1#Admin-111"]);
}

#[tokio::test]
async fn test_interrupted_run_removes_nothing() {
    let harness = Harness::new().with_source().await;
    let catalog = Catalog::new();
    catalog.grant("111", "Admin");
    catalog.grant("222", "Admin");

    harness
        .reconciler
        .sync_linked_profiles(SOURCE_ID, &catalog)
        .await
        .unwrap();

    catalog.revoke("222", "Admin");
    catalog.grant("333", "Admin");
    let source = source_profile();
    let first_new = harness
        .reconciler
        .discover_linked_profiles(SOURCE_ID, &source, &catalog)
        .next()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first_new.0, "sso:sso:1#Admin-333");
    assert!(
        harness
            .store
            .get_profile("sso:sso:1#Admin-222")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_failed_listing_skips_cleanup() {
    let harness = Harness::new().with_source().await;
    let catalog = Catalog::new();
    catalog.grant("111", "Admin");
    catalog.grant("222", "Admin");

    harness
        .reconciler
        .sync_linked_profiles(SOURCE_ID, &catalog)
        .await
        .unwrap();

    catalog.set_broken(true);
    let report = harness
        .reconciler
        .sync_linked_profiles(SOURCE_ID, &catalog)
        .await
        .unwrap();

    assert!(report.degraded);
    assert_eq!(report.accounts_seen, 1);
    assert!(report.removed.is_empty());
    assert_eq!(
        harness.stored_ids().await,
        vec!["sso:1", "sso:sso:1#Admin-111", "sso:sso:1#Admin-222"]
    );
}

#[tokio::test]
async fn test_cleanup_is_scoped_to_source_session() {
    let harness = Harness::new().with_source().await;
    harness
        .store
        .add_profile("sso:2", source_profile().into())
        .await
        .unwrap();
    let catalog = Catalog::new();
    catalog.grant("111", "Admin");

    harness
        .reconciler
        .sync_linked_profiles("sso:2", &catalog)
        .await
        .unwrap();
    catalog.revoke("111", "Admin");
    catalog.grant("111", "Dev");
    harness
        .reconciler
        .sync_linked_profiles(SOURCE_ID, &catalog)
        .await
        .unwrap();

    assert_eq!(
        harness.stored_ids().await,
        vec!["sso:1", "sso:2", "sso:sso:1#Dev-111", "sso:sso:2#Admin-111"]
    );
}

#[tokio::test]
async fn test_identical_empty_catalog_warning_is_not_repeated() {
    let harness = Harness::new().with_source().await;
    harness
        .store
        .add_profile("sso:2", source_profile().into())
        .await
        .unwrap();
    let catalog = Catalog::new();

    harness
        .reconciler
        .sync_linked_profiles(SOURCE_ID, &catalog)
        .await
        .unwrap();
    harness
        .reconciler
        .sync_linked_profiles("sso:2", &catalog)
        .await
        .unwrap();

    // Both sessions share a start URL, so they render the same message.
    assert_eq!(harness.notifier.messages().len(), 1);
}

#[tokio::test]
async fn test_discovery_audits_each_created_profile() {
    let harness = Harness::new().with_source().await;
    let catalog = Catalog::new();
    catalog.grant("111", "Admin");
    catalog.grant("222", "Admin");

    harness
        .reconciler
        .sync_linked_profiles(SOURCE_ID, &catalog)
        .await
        .unwrap();

    let added: Vec<_> = harness
        .audit
        .events_for(AuditAction::AddProfile)
        .into_iter()
        .map(|event| (event.id, event.result))
        .collect();
    assert_eq!(
        added,
        vec![
            (SOURCE_ID.to_string(), AuditResult::Succeeded),
            ("sso:sso:1#Admin-111".to_string(), AuditResult::Succeeded),
            ("sso:sso:1#Admin-222".to_string(), AuditResult::Succeeded),
        ]
    );
}
