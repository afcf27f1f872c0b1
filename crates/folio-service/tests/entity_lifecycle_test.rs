//! Entity CREATE / LIST / RENAME / DELETE integration tests.

mod helpers;

use folio_core::error::ErrorKind;
use folio_core::types::RecordId;
use folio_entity::DriveRecord;
use folio_storage::providers::BlobOperation;
use serde_json::to_value;

use helpers::{TestHarness, owner};

#[tokio::test]
async fn test_create_trims_name_and_derives_folder() {
    let h = TestHarness::new();
    let u1 = owner("u1");

    let (entity, report) = h.manager.create(&u1, "  Shopify  ").await.unwrap();
    assert_eq!(entity.name, "Shopify");
    assert_eq!(entity.path, "entities/Shopify");
    assert_eq!(entity.prefix, "users/u1/entities/Shopify/");
    assert_eq!(entity.id, RecordId::derived(&u1, "shopify"));
    assert!(report.is_clean());

    let folder = h.catalog.get_by_id(&entity.id).await.unwrap();
    assert!(folder.is_folder());
    assert_eq!(folder.blob_key, "users/u1/entities/Shopify/");
    assert_eq!(
        h.blob_keys().await,
        vec!["users/u1/entities/Shopify/.folder".to_string()]
    );
    assert_eq!(h.manager.list(&u1).await.unwrap(), vec!["Shopify"]);
}

#[tokio::test]
async fn test_blank_names_rejected_before_any_store_call() {
    let h = TestHarness::new();
    let u1 = owner("u1");

    let err = h.manager.create(&u1, "   ").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let err = h.manager.rename(&u1, "Shopify", " \t ").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let err = h.manager.rename(&u1, "", "Shopify Inc").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    let err = h.manager.delete(&u1, "  ").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    assert_eq!(h.blob_store.call_count(), 0);
    assert_eq!(h.records.call_count(), 0);
}

#[tokio::test]
async fn test_create_collision_is_conflict() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();

    let err = h.manager.create(&u1, "shopify").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    let err = h.manager.create(&u1, "Shopify").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    // Other owners derive different ids.
    h.manager.create(&owner("u2"), "Shopify").await.unwrap();
    assert_eq!(h.manager.list(&u1).await.unwrap(), vec!["Shopify"]);
}

#[tokio::test]
async fn test_create_tolerates_placeholder_failure() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.blob_store.fail_when(BlobOperation::Put, ".folder").await;

    let (_, report) = h.manager.create(&u1, "Stripe").await.unwrap();
    assert_eq!(report.step("placeholder").unwrap().failed, 1);
    assert!(h.blob_keys().await.is_empty());
    assert_eq!(h.manager.list(&u1).await.unwrap(), vec!["Stripe"]);
}

#[tokio::test]
async fn test_create_aborts_when_folder_record_fails() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.records.fail_when("drive_records", "put", "");

    let err = h.manager.create(&u1, "Stripe").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Database);
    assert!(h.blob_keys().await.is_empty());
}

#[tokio::test]
async fn test_list_deduplicates_and_sorts() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Stripe").await.unwrap();
    h.manager.create(&u1, "Amazon").await.unwrap();

    // A stray duplicate folder record for an existing entity.
    let duplicate = DriveRecord::folder(
        RecordId::new(),
        u1.clone(),
        "Stripe",
        "entities/Stripe",
        "users/u1/entities/Stripe/",
    );
    h.records.insert_raw(
        "drive_records",
        &duplicate.id.to_string(),
        to_value(&duplicate).unwrap(),
    );
    // Nested folders and foreign owners never show up.
    let nested = DriveRecord::folder(
        RecordId::new(),
        u1.clone(),
        "2024",
        "entities/Stripe/2024",
        "users/u1/entities/Stripe/2024/",
    );
    h.catalog.create(&nested).await.unwrap();
    h.manager.create(&owner("u2"), "Zebra").await.unwrap();

    assert_eq!(h.manager.list(&u1).await.unwrap(), vec!["Amazon", "Stripe"]);
}

#[tokio::test]
async fn test_list_hides_items_beyond_scan_cap() {
    let h = TestHarness::with_limits(10, 3);
    let u1 = owner("u1");
    for name in ["A", "B", "C", "D", "E"] {
        h.manager.create(&u1, name).await.unwrap();
    }

    let names = h.manager.list(&u1).await.unwrap();
    assert_eq!(names.len(), 3);
}

#[tokio::test]
async fn test_rename_moves_everything_under_prefix() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();
    let march = h.upload(&u1, "Shopify", "march.pdf").await;
    let april = h.upload(&u1, "Shopify", "april.pdf").await;
    h.upload(&u1, "Shopify", "may.csv").await;
    h.add_transactions(&march, "Shopify", 2).await;
    h.manager.create(&u1, "Stripe").await.unwrap();
    h.upload(&u1, "Stripe", "june.pdf").await;

    let report = h
        .manager
        .rename(&u1, "Shopify", "  Shopify Inc ")
        .await
        .unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.step("move-blobs").unwrap().succeeded, 4);
    assert_eq!(report.step("metadata").unwrap().succeeded, 3);
    assert_eq!(report.step("cross-references").unwrap().succeeded, 3);
    assert_eq!(report.step("ledger").unwrap().succeeded, 2);

    assert!(h.blob_keys_under("users/u1/entities/Shopify/").await.is_empty());
    assert_eq!(
        h.blob_keys_under("users/u1/entities/Shopify Inc/").await,
        vec![
            "users/u1/entities/Shopify Inc/.folder",
            "users/u1/entities/Shopify Inc/april.pdf",
            "users/u1/entities/Shopify Inc/march.pdf",
            "users/u1/entities/Shopify Inc/may.csv",
        ]
    );
    assert_eq!(h.blob_keys_under("users/u1/entities/Stripe/").await.len(), 2);

    let new_folder_id = RecordId::derived(&u1, "shopify-inc");
    assert!(
        h.catalog
            .find_by_id(&RecordId::derived(&u1, "shopify"))
            .await
            .unwrap()
            .is_none()
    );
    let folder = h.catalog.get_by_id(&new_folder_id).await.unwrap();
    assert_eq!(folder.name, "Shopify Inc");
    assert_eq!(folder.path, "entities/Shopify Inc");
    assert_eq!(folder.blob_key, "users/u1/entities/Shopify Inc/");

    let moved = h.catalog.get_by_id(&april.id).await.unwrap();
    assert_eq!(moved.blob_key, "users/u1/entities/Shopify Inc/april.pdf");
    assert_eq!(moved.path, "entities/Shopify Inc/april.pdf");
    assert_eq!(moved.parent_id, Some(new_folder_id));
    assert_eq!(moved.name, "april.pdf");

    let urls = h.upload_urls().await;
    assert!(
        urls.iter()
            .filter(|url| !url.contains("Stripe"))
            .all(|url| url.contains("/users/u1/entities/Shopify Inc/"))
    );
    assert!(urls.iter().any(|url| url.ends_with("Stripe/june.pdf")));

    assert_eq!(h.manager.list(&u1).await.unwrap(), vec!["Shopify Inc", "Stripe"]);
    assert!(h.ledger.for_entity(&u1, "Shopify").await.unwrap().is_empty());
    assert_eq!(h.ledger.for_entity(&u1, "Shopify Inc").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_after_rename_clears_relabelled_ledger_rows() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();
    let march = h.upload(&u1, "Shopify", "march.pdf").await;
    h.add_transactions(&march, "Shopify", 3).await;

    h.manager.rename(&u1, "Shopify", "Shopify Inc").await.unwrap();
    let report = h.manager.delete(&u1, "Shopify Inc").await.unwrap();
    assert_eq!(report.step("ledger").unwrap().succeeded, 3);
    assert!(h.ledger.for_file(&march.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rename_tolerates_unreachable_ledger() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();
    let march = h.upload(&u1, "Shopify", "march.pdf").await;
    h.add_transactions(&march, "Shopify", 1).await;
    h.records.set_unreachable("transactions", true);

    let report = h.manager.rename(&u1, "Shopify", "Shopify Inc").await.unwrap();
    assert!(report.step("ledger").unwrap().is_skipped());
    assert_eq!(h.manager.list(&u1).await.unwrap(), vec!["Shopify Inc"]);
}

#[tokio::test]
async fn test_rename_twice_is_harmless() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();
    h.upload(&u1, "Shopify", "march.pdf").await;

    h.manager.rename(&u1, "Shopify", "Shopify Inc").await.unwrap();
    let keys_after_first = h.blob_keys().await;

    let second = h.manager.rename(&u1, "Shopify", "Shopify Inc").await.unwrap();
    assert_eq!(second.step("move-blobs").unwrap().attempted, 0);
    assert!(second.step("folder-record").unwrap().is_skipped());

    assert_eq!(h.blob_keys().await, keys_after_first);
    assert_eq!(h.manager.list(&u1).await.unwrap(), vec!["Shopify Inc"]);
}

#[tokio::test]
async fn test_rename_to_same_name_is_noop() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();
    let calls = h.blob_store.call_count();

    let report = h.manager.rename(&u1, "Shopify", " Shopify ").await.unwrap();
    assert!(report.steps.is_empty());
    assert_eq!(h.blob_store.call_count(), calls);
}

#[tokio::test]
async fn test_rename_case_only_updates_folder_in_place() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    let (entity, _) = h.manager.create(&u1, "shopify").await.unwrap();
    h.upload(&u1, "shopify", "march.pdf").await;

    let report = h.manager.rename(&u1, "shopify", "Shopify").await.unwrap();
    assert!(report.is_clean(), "{report:?}");

    let folder = h.catalog.get_by_id(&entity.id).await.unwrap();
    assert_eq!(folder.name, "Shopify");
    assert_eq!(folder.path, "entities/Shopify");
    assert_eq!(h.manager.list(&u1).await.unwrap(), vec!["Shopify"]);
}

#[tokio::test]
async fn test_rename_onto_existing_entity_is_conflict() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();
    h.manager.create(&u1, "Stripe").await.unwrap();
    h.upload(&u1, "Stripe", "june.pdf").await;
    let before = h.blob_keys().await;

    let err = h.manager.rename(&u1, "Stripe", "Shopify").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(h.blob_keys().await, before);
}

#[tokio::test]
async fn test_rename_aborts_on_move_failure() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();
    let march = h.upload(&u1, "Shopify", "march.pdf").await;
    h.blob_store
        .fail_when(BlobOperation::Copy, "Shopify/march.pdf")
        .await;

    let err = h.manager.rename(&u1, "Shopify", "Shopify Inc").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);

    // No compensation: what moved stays moved, records are untouched.
    let record = h.catalog.get_by_id(&march.id).await.unwrap();
    assert_eq!(record.blob_key, "users/u1/entities/Shopify/march.pdf");
    assert_eq!(h.manager.list(&u1).await.unwrap(), vec!["Shopify"]);
}

#[tokio::test]
async fn test_rename_metadata_failures_are_best_effort() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();
    let march = h.upload(&u1, "Shopify", "march.pdf").await;
    let april = h.upload(&u1, "Shopify", "april.pdf").await;
    h.records
        .fail_when("drive_records", "update", march.id.to_string());
    h.records.set_unreachable("statement_uploads", true);

    let report = h.manager.rename(&u1, "Shopify", "Shopify Inc").await.unwrap();
    let metadata = report.step("metadata").unwrap();
    assert_eq!((metadata.succeeded, metadata.failed), (1, 1));
    assert!(report.step("cross-references").unwrap().is_skipped());

    let stale = h.catalog.get_by_id(&march.id).await.unwrap();
    assert_eq!(stale.blob_key, "users/u1/entities/Shopify/march.pdf");
    let updated = h.catalog.get_by_id(&april.id).await.unwrap();
    assert_eq!(updated.blob_key, "users/u1/entities/Shopify Inc/april.pdf");
    assert_eq!(h.manager.list(&u1).await.unwrap(), vec!["Shopify Inc"]);
}

#[tokio::test]
async fn test_delete_removes_entity_everywhere() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();
    let march = h.upload(&u1, "Shopify", "march.pdf").await;
    let april = h.upload(&u1, "Shopify", "april.pdf").await;
    h.add_transactions(&march, "Shopify", 3).await;
    h.manager.create(&u1, "Stripe").await.unwrap();
    let june = h.upload(&u1, "Stripe", "june.pdf").await;
    h.add_transactions(&june, "Stripe", 1).await;

    let report = h.manager.delete(&u1, " Shopify ").await.unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.step("delete-blobs").unwrap().succeeded, 3);
    assert_eq!(report.step("metadata").unwrap().succeeded, 3);
    assert_eq!(report.step("ledger").unwrap().succeeded, 3);

    assert_eq!(h.manager.list(&u1).await.unwrap(), vec!["Stripe"]);
    for file in [&march, &april] {
        let err = h.catalog.get_by_id(&file.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
    assert!(h.blob_keys_under("users/u1/entities/Shopify/").await.is_empty());
    assert!(h.ledger.for_entity(&u1, "Shopify").await.unwrap().is_empty());
    assert_eq!(h.ledger.for_entity(&u1, "Stripe").await.unwrap().len(), 1);
    assert!(h.catalog.get_by_id(&june.id).await.is_ok());
}

#[tokio::test]
async fn test_delete_succeeds_with_ledger_unreachable() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();
    let march = h.upload(&u1, "Shopify", "march.pdf").await;
    h.add_transactions(&march, "Shopify", 2).await;
    h.records.set_unreachable("transactions", true);

    let report = h.manager.delete(&u1, "Shopify").await.unwrap();
    assert!(report.step("ledger").unwrap().is_skipped());
    assert_eq!(report.step("metadata").unwrap().succeeded, 2);
    assert!(h.manager.list(&u1).await.unwrap().is_empty());

    h.records.set_unreachable("transactions", false);
    assert_eq!(h.ledger.for_entity(&u1, "Shopify").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_blob_failure_aborts_before_metadata() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();
    let march = h.upload(&u1, "Shopify", "march.pdf").await;
    h.blob_store
        .fail_when(BlobOperation::Delete, "march.pdf")
        .await;

    let err = h.manager.delete(&u1, "Shopify").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);

    assert!(h.catalog.get_by_id(&march.id).await.is_ok());
    assert_eq!(h.manager.list(&u1).await.unwrap(), vec!["Shopify"]);
}

#[tokio::test]
async fn test_delete_missing_entity_succeeds_quietly() {
    let h = TestHarness::new();
    let report = h.manager.delete(&owner("u1"), "Nobody").await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.step("delete-blobs").unwrap().attempted, 0);
}

#[tokio::test]
async fn test_delete_absorbs_single_record_delete_failure() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    let (entity, _) = h.manager.create(&u1, "Shopify").await.unwrap();
    let march = h.upload(&u1, "Shopify", "march.pdf").await;
    let april = h.upload(&u1, "Shopify", "april.pdf").await;
    h.records
        .fail_when("drive_records", "delete", march.id.to_string());

    let report = h.manager.delete(&u1, "Shopify").await.unwrap();
    let metadata = report.step("metadata").unwrap();
    assert_eq!(metadata.attempted, 3);
    assert_eq!(metadata.failed, 1);
    assert_eq!(metadata.succeeded, 2);
    assert_eq!(report.failed(), 1);

    assert!(h.catalog.get_by_id(&march.id).await.is_ok());
    for id in [&april.id, &entity.id] {
        let err = h.catalog.get_by_id(id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
    assert!(h.blob_keys_under("users/u1/entities/Shopify/").await.is_empty());
}

#[tokio::test]
async fn test_delete_absorbs_single_ledger_row_failure() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    h.manager.create(&u1, "Shopify").await.unwrap();
    let march = h.upload(&u1, "Shopify", "march.pdf").await;
    h.add_transactions(&march, "Shopify", 3).await;
    let stuck = h.ledger.for_file(&march.id).await.unwrap().remove(0);
    h.records
        .fail_when("transactions", "delete", stuck.id.to_string());

    let report = h.manager.delete(&u1, "Shopify").await.unwrap();
    let ledger = report.step("ledger").unwrap();
    assert_eq!(ledger.attempted, 3);
    assert_eq!(ledger.failed, 1);
    assert_eq!(ledger.succeeded, 2);
    assert_eq!(report.step("metadata").unwrap().failed, 0);

    let remaining = h.ledger.for_entity(&u1, "Shopify").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, stuck.id);
    assert!(h.manager.list(&u1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_leaves_other_owners_untouched() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    let u2 = owner("u2");
    h.manager.create(&u1, "x").await.unwrap();
    h.upload(&u1, "x", "march.pdf").await;
    h.manager.create(&u2, "x").await.unwrap();
    let theirs = h.upload(&u2, "x", "march.pdf").await;

    let err = folio_core::types::OwnerId::parse("u1/entities/x").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    h.manager.delete(&u1, "x").await.unwrap();
    assert!(h.blob_keys_under("users/u1/").await.is_empty());
    assert_eq!(
        h.blob_keys_under("users/u2/").await,
        vec!["users/u2/entities/x/.folder", "users/u2/entities/x/march.pdf"]
    );
    assert!(h.catalog.get_by_id(&theirs.id).await.is_ok());
    assert_eq!(h.manager.list(&u2).await.unwrap(), vec!["x"]);
}

#[tokio::test]
async fn test_dot_names_rejected() {
    let h = TestHarness::new();
    let u1 = owner("u1");
    for name in [".", ".."] {
        let err = h.manager.create(&u1, name).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = h.manager.delete(&u1, name).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
    assert!(h.blob_keys().await.is_empty());
}
