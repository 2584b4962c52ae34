// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Historical import against the mock platform.

use replywise_core::types::{DraftStatus, ReplyOrigin, ReplyStatus};
use replywise_core::{PublishErrorKind, ReplywiseError, ReviewStore};
use replywise_pipeline::ImportSettings;
use replywise_pipeline::import::POSTED_BY_PLATFORM;
use replywise_test_utils::harness::{BUSINESS_ID, LOCATION_NAME};
use replywise_test_utils::{TestHarness, listed_review};

fn settings() -> ImportSettings {
    ImportSettings {
        page_concurrency: 4,
        max_in_flight_generations: 2,
        generate_missing_replies: true,
        history_quota_exempt: true,
    }
}

async fn two_page_harness() -> TestHarness {
    let harness = TestHarness::builder().build().await.unwrap();
    harness
        .platform
        .set_pages(vec![
            vec![
                listed_review(LOCATION_NAME, "h-1", 5, Some("Great"), Some("Thanks a lot!")),
                listed_review(LOCATION_NAME, "h-2", 4, Some("Good bread"), None),
            ],
            vec![listed_review(LOCATION_NAME, "h-3", 2, None, None)],
        ])
        .await;
    harness
}

async fn status_of(harness: &TestHarness, external_id: &str) -> ReplyStatus {
    harness
        .store
        .get_review_by_external_id(BUSINESS_ID, external_id)
        .await
        .unwrap()
        .unwrap()
        .reply_status
}

#[tokio::test]
async fn imports_every_page_and_drafts_missing_replies() {
    let harness = two_page_harness().await;

    let report = harness
        .importer(settings())
        .import_history(BUSINESS_ID)
        .await
        .unwrap();

    assert_eq!(report.pages, 2);
    assert_eq!(report.imported, 3);
    assert_eq!(report.duplicates, 0);
    assert_eq!(report.failed_items, 0);
    assert_eq!(report.replies_imported, 1);
    assert_eq!(report.dispatched, 2);
    assert_eq!(report.generation.get(&ReplyStatus::Pending), Some(&2));
    assert_eq!(report.generation_errors, 0);
    assert_eq!(harness.platform.list_calls().await, 2);
    assert_eq!(harness.platform.refresh_tokens().await.len(), 1);

    assert_eq!(status_of(&harness, "h-1").await, ReplyStatus::Posted);
    assert_eq!(status_of(&harness, "h-2").await, ReplyStatus::Pending);
    assert_eq!(status_of(&harness, "h-3").await, ReplyStatus::Pending);
}

#[tokio::test]
async fn existing_platform_reply_is_stored_as_imported() {
    let harness = two_page_harness().await;
    harness
        .importer(settings())
        .import_history(BUSINESS_ID)
        .await
        .unwrap();

    let review = harness
        .store
        .get_review_by_external_id(BUSINESS_ID, "h-1")
        .await
        .unwrap()
        .unwrap();
    assert!(review.quota_exempt);
    let replies = harness.replies(&review.id).await.unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].text, "Thanks a lot!");
    assert_eq!(replies[0].origin, ReplyOrigin::Imported);
    assert_eq!(replies[0].status, DraftStatus::Posted);
    assert_eq!(replies[0].posted_by.as_deref(), Some(POSTED_BY_PLATFORM));
    assert!(!replies[0].quota_consuming);
}

#[tokio::test]
async fn exempt_history_does_not_touch_quota() {
    let harness = TestHarness::builder().monthly_limit(0).build().await.unwrap();
    harness
        .platform
        .set_pages(vec![vec![listed_review(LOCATION_NAME, "h-9", 3, None, None)]])
        .await;

    let report = harness
        .importer(settings())
        .import_history(BUSINESS_ID)
        .await
        .unwrap();
    assert_eq!(report.generation.get(&ReplyStatus::Pending), Some(&1));

    let review = harness
        .store
        .get_review_by_external_id(BUSINESS_ID, "h-9")
        .await
        .unwrap()
        .unwrap();
    let draft = harness.store.active_draft(&review.id).await.unwrap().unwrap();
    assert!(!draft.quota_consuming);
}

#[tokio::test]
async fn counted_history_respects_quota() {
    let harness = TestHarness::builder().monthly_limit(1).build().await.unwrap();
    harness
        .platform
        .set_pages(vec![vec![
            listed_review(LOCATION_NAME, "q-1", 5, None, None),
            listed_review(LOCATION_NAME, "q-2", 5, None, None),
        ]])
        .await;

    let report = harness
        .importer(ImportSettings {
            max_in_flight_generations: 1,
            history_quota_exempt: false,
            ..settings()
        })
        .import_history(BUSINESS_ID)
        .await
        .unwrap();

    assert_eq!(report.generation.get(&ReplyStatus::Pending), Some(&1));
    assert_eq!(report.generation.get(&ReplyStatus::QuotaExceeded), Some(&1));
}

#[tokio::test]
async fn second_import_only_sees_duplicates() {
    let harness = two_page_harness().await;
    let importer = harness.importer(settings());
    importer.import_history(BUSINESS_ID).await.unwrap();

    let report = importer.import_history(BUSINESS_ID).await.unwrap();
    assert_eq!(report.imported, 0);
    assert_eq!(report.duplicates, 3);
    assert_eq!(report.dispatched, 0);
    assert_eq!(harness.generator.call_count().await, 2);
}

#[tokio::test]
async fn generation_disabled_marks_reviews_skipped() {
    let harness = two_page_harness().await;
    let report = harness
        .importer(ImportSettings {
            generate_missing_replies: false,
            ..settings()
        })
        .import_history(BUSINESS_ID)
        .await
        .unwrap();

    assert_eq!(report.dispatched, 0);
    assert_eq!(report.imported, 3);
    assert_eq!(status_of(&harness, "h-1").await, ReplyStatus::Posted);
    assert_eq!(status_of(&harness, "h-2").await, ReplyStatus::Skipped);
    assert_eq!(status_of(&harness, "h-3").await, ReplyStatus::Skipped);
    assert_eq!(harness.generator.call_count().await, 0);
}

#[tokio::test]
async fn listing_failure_still_settles_dispatched_work() {
    let harness = two_page_harness().await;
    harness.platform.fail_listing_at(1).await;

    let err = harness
        .importer(settings())
        .import_history(BUSINESS_ID)
        .await
        .unwrap_err();
    assert!(matches!(err, ReplywiseError::Transport { .. }));

    // Page 0 was fully handled before the failure surfaced.
    assert_eq!(status_of(&harness, "h-1").await, ReplyStatus::Posted);
    assert_eq!(status_of(&harness, "h-2").await, ReplyStatus::Pending);
    assert!(
        harness
            .store
            .get_review_by_external_id(BUSINESS_ID, "h-3")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn refused_refresh_aborts_before_listing() {
    let harness = two_page_harness().await;
    harness.platform.fail_refresh(PublishErrorKind::Unauthorized).await;

    let err = harness
        .importer(settings())
        .import_history(BUSINESS_ID)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReplywiseError::Publish {
            kind: PublishErrorKind::Unauthorized,
            ..
        }
    ));
    assert_eq!(harness.platform.list_calls().await, 0);
}

#[tokio::test]
async fn unknown_business_is_not_found() {
    let harness = TestHarness::builder().build().await.unwrap();
    let err = harness
        .importer(settings())
        .import_history("no-such-business")
        .await
        .unwrap_err();
    assert!(matches!(err, ReplywiseError::NotFound { .. }));
}

#[tokio::test]
async fn failed_generation_is_reported_per_review() {
    let harness = two_page_harness().await;
    harness.generator.push_failure("overloaded").await;

    let report = harness
        .importer(ImportSettings {
            max_in_flight_generations: 1,
            ..settings()
        })
        .import_history(BUSINESS_ID)
        .await
        .unwrap();

    assert_eq!(report.dispatched, 2);
    assert_eq!(report.generation.get(&ReplyStatus::Failed), Some(&1));
    assert_eq!(report.generation.get(&ReplyStatus::Pending), Some(&1));
    assert_eq!(report.generation_errors, 0);
}

#[tokio::test]
async fn one_failed_item_leaves_siblings_untouched() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness
        .platform
        .set_pages(vec![vec![
            listed_review(LOCATION_NAME, "s-1", 5, Some("Lovely"), None),
            listed_review(LOCATION_NAME, "s-2", 4, None, None),
            listed_review(LOCATION_NAME, "s-3", 3, Some("Fine"), Some("Thank you!")),
        ]])
        .await;
    harness.faults.fail_review_insert("s-2", 1).await;

    let report = harness
        .importer(settings())
        .import_history(BUSINESS_ID)
        .await
        .unwrap();

    assert_eq!(report.failed_items, 1);
    assert_eq!(report.imported, 2);
    assert_eq!(report.replies_imported, 1);
    assert_eq!(report.dispatched, 1);
    assert_eq!(report.generation.get(&ReplyStatus::Pending), Some(&1));
    assert_eq!(status_of(&harness, "s-1").await, ReplyStatus::Pending);
    assert_eq!(status_of(&harness, "s-3").await, ReplyStatus::Posted);
    assert!(
        harness
            .store
            .get_review_by_external_id(BUSINESS_ID, "s-2")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn review_left_without_outcome_is_resumed_by_next_import() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness
        .platform
        .set_pages(vec![vec![
            listed_review(LOCATION_NAME, "r-1", 5, Some("Great"), Some("Thanks a lot!")),
            listed_review(LOCATION_NAME, "r-2", 4, Some("Good"), None),
        ]])
        .await;
    harness.faults.fail_reply_writes(1).await;
    let importer = harness.importer(settings());

    let first = importer.import_history(BUSINESS_ID).await.unwrap();
    assert_eq!(first.failed_items, 1);
    assert_eq!(first.imported, 1);
    let stranded = harness
        .store
        .get_review_by_external_id(BUSINESS_ID, "r-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stranded.reply_status, ReplyStatus::Pending);
    assert!(harness.replies(&stranded.id).await.unwrap().is_empty());

    let second = importer.import_history(BUSINESS_ID).await.unwrap();
    assert_eq!(second.failed_items, 0);
    assert_eq!(second.resumed, 1);
    assert_eq!(second.duplicates, 1);
    assert_eq!(second.imported, 0);
    assert_eq!(second.replies_imported, 1);
    assert_eq!(second.dispatched, 0);

    assert_eq!(status_of(&harness, "r-1").await, ReplyStatus::Posted);
    let replies = harness.replies(&stranded.id).await.unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].origin, ReplyOrigin::Imported);
    assert_eq!(harness.generator.call_count().await, 1);
}
