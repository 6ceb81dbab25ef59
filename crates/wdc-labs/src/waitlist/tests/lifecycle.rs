use super::common::*;
use crate::waitlist::domain::{ApplicationField, SubmissionPhase};
use crate::waitlist::store::StoreWriteError;
use crate::waitlist::SubmitOutcome;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn retry_returns_to_idle_with_fields_retained() {
    let controller = controller(ImmediateStore::failing(StoreWriteError::Unavailable(
        "quota exceeded".into(),
    )));
    fill_valid(&controller);
    controller.submit().await;

    assert!(controller.retry());
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, SubmissionPhase::Idle);
    assert_eq!(snapshot.fields.first_name, "David");
    assert!(snapshot.failure.is_none());

    assert!(!controller.retry(), "retry only applies to failures");
}

#[tokio::test]
async fn resubmitting_from_failed_issues_a_new_write() {
    let store = ImmediateStore::failing(StoreWriteError::Duplicate);
    let controller = controller(store.clone());
    fill_valid(&controller);

    controller.submit().await;
    assert_eq!(controller.phase(), SubmissionPhase::Failed);
    controller
        .set_field(ApplicationField::Email, "david.a@example.com")
        .expect("failed phase stays editable");
    controller.submit().await;

    assert_eq!(store.calls(), 2);
}

#[tokio::test]
async fn reset_after_success_leaves_an_empty_idle_form() {
    let controller = controller(ImmediateStore::accepting());
    fill_valid(&controller);
    assert_eq!(controller.submit().await, SubmitOutcome::Succeeded);

    controller.reset();

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, SubmissionPhase::Idle);
    for field in ApplicationField::ALL {
        assert_eq!(snapshot.fields.get(field), "");
    }
}

#[tokio::test]
async fn submit_after_success_is_ignored_until_dismissed() {
    let store = ImmediateStore::accepting();
    let controller = controller(store.clone());
    fill_valid(&controller);
    controller.submit().await;

    assert_eq!(controller.submit().await, SubmitOutcome::Ignored);
    assert!(controller.dismiss());
    assert_eq!(controller.phase(), SubmissionPhase::Idle);
    assert!(!controller.dismiss());
    assert_eq!(store.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn success_is_dismissed_after_the_delay() {
    let controller = controller(ImmediateStore::accepting());
    fill_valid(&controller);
    controller.submit().await;

    let dismissed = controller
        .dismiss_success_after(Duration::from_millis(2500))
        .await;

    assert!(dismissed);
    assert_eq!(controller.phase(), SubmissionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn stale_dismiss_timer_leaves_a_newer_success_alone() {
    let controller = Arc::new(controller(ImmediateStore::accepting()));
    fill_valid(&controller);
    controller.submit().await;

    let timer = tokio::spawn({
        let controller = controller.clone();
        async move {
            controller
                .dismiss_success_after(Duration::from_millis(2500))
                .await
        }
    });
    tokio::task::yield_now().await;

    controller.reset();
    fill_valid(&controller);
    controller
        .set_field(ApplicationField::Email, "second@example.com")
        .expect("editable after reset");
    assert_eq!(controller.submit().await, SubmitOutcome::Succeeded);

    assert!(!timer.await.expect("timer task completes"));
    assert_eq!(controller.phase(), SubmissionPhase::Succeeded);
}

#[tokio::test]
async fn reset_while_in_flight_discards_the_late_result() {
    let store = GatedStore::failing(StoreWriteError::Transport("timed out".into()));
    let controller = Arc::new(controller(store.clone()));
    fill_valid(&controller);

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    store.wait_for_write().await;

    controller.reset();
    store.release();

    assert_eq!(
        pending.await.expect("submit task completes"),
        SubmitOutcome::Cancelled
    );
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, SubmissionPhase::Idle);
    assert!(snapshot.failure.is_none());
    assert!(snapshot.fields.is_empty());
}

#[tokio::test]
async fn subscribers_observe_each_transition() {
    let store = GatedStore::accepting();
    let controller = Arc::new(controller(store.clone()));
    let mut updates = controller.subscribe();
    fill_valid(&controller);

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    store.wait_for_write().await;
    assert_eq!(
        updates.borrow_and_update().phase,
        SubmissionPhase::Submitting
    );

    store.release();
    pending.await.expect("submit task completes");
    assert!(updates.has_changed().expect("sender alive"));
    assert_eq!(updates.borrow_and_update().phase, SubmissionPhase::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn abandoned_submit_unlocks_the_form_as_failed() {
    let store = GatedStore::accepting();
    let controller = controller(store.clone());
    fill_valid(&controller);

    let timed_out = tokio::time::timeout(Duration::from_secs(5), controller.submit()).await;
    assert!(timed_out.is_err(), "the store never answers");

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, SubmissionPhase::Failed);
    assert_eq!(snapshot.fields.first_name, "David");
    assert!(snapshot
        .failure
        .as_deref()
        .expect("failure message")
        .contains("interrupted"));

    controller
        .set_field(ApplicationField::Email, "david.a@example.com")
        .expect("failed phase stays editable");
    assert!(controller.retry());
    assert_eq!(store.calls(), 1);
}

#[tokio::test]
async fn completed_submit_is_not_rewritten_as_interrupted() {
    let controller = controller(ImmediateStore::accepting());
    fill_valid(&controller);

    assert_eq!(controller.submit().await, SubmitOutcome::Succeeded);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.phase, SubmissionPhase::Succeeded);
    assert!(snapshot.failure.is_none());
}
