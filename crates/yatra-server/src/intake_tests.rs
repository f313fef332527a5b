use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::*;
use crate::intake::{submit_intake, ParticipantIntake, SubmitError, VolunteerIntake};
use yatra_model::{AgeBounds, FieldError, ParticipantDraft, VolunteerDraft};

fn participant_draft() -> ParticipantDraft {
    ParticipantDraft {
        full_name: "Asha Rao".to_string(),
        phone: "9999999999".to_string(),
        age: Some(30),
        gender: "female".to_string(),
        address: "Bangalore".to_string(),
        emergency_contact: "8888888888".to_string(),
        agreed_to_terms: true,
        time_slot: "2025-07-26".to_string(),
        ..ParticipantDraft::default()
    }
}

fn volunteer_draft() -> VolunteerDraft {
    VolunteerDraft {
        full_name: "Meera Iyer".to_string(),
        phone: "9876501234".to_string(),
        email: "meera@example.org".to_string(),
        preferred_role: "first_aid".to_string(),
        availability: "full_event".to_string(),
        motivation: "Serve the pilgrims along the route.".to_string(),
        ..VolunteerDraft::default()
    }
}

#[tokio::test]
async fn valid_participant_submission_persists_and_counts() {
    let store = Arc::new(FakeStore::default());
    let state = AppState::new(store.clone());

    let record = submit_intake::<ParticipantIntake>(&state, participant_draft())
        .await
        .expect("submission accepted");

    assert_eq!(record.participant.time_slot.as_str(), "2025-07-26");
    assert_eq!(store.insert_calls.load(Ordering::Relaxed), 1);
    assert_eq!(store.count_calls.load(Ordering::Relaxed), 1);
    assert_eq!(store.participants.lock().await.len(), 1);
    assert_eq!(state.intake.registrations_total.load(Ordering::Relaxed), 1);
    assert_eq!(state.intake.rejections_total.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn rejected_draft_never_touches_the_store() {
    let store = Arc::new(FakeStore::default());
    let state = AppState::new(store.clone());

    let mut draft = participant_draft();
    draft.phone = String::new();
    let err = submit_intake::<ParticipantIntake>(&state, draft)
        .await
        .expect_err("missing phone rejected");
    assert!(matches!(
        err,
        SubmitError::Rejected(FieldError::Missing("phone"))
    ));
    assert_eq!(store.insert_calls.load(Ordering::Relaxed), 0);
    assert_eq!(store.count_calls.load(Ordering::Relaxed), 0);
    assert_eq!(state.intake.rejections_total.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn missing_consent_is_rejected_before_any_store_call() {
    let store = Arc::new(FakeStore::default());
    let state = AppState::new(store.clone());

    let mut draft = participant_draft();
    draft.agreed_to_terms = false;
    let err = submit_intake::<ParticipantIntake>(&state, draft)
        .await
        .expect_err("consent required");
    assert!(matches!(
        err,
        SubmitError::Rejected(FieldError::ConsentRequired)
    ));
    assert_eq!(store.insert_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn unknown_slot_is_rejected_without_an_insert() {
    let store = Arc::new(FakeStore::default());
    let state = AppState::new(store.clone());

    let mut draft = participant_draft();
    draft.time_slot = "2025-09-01".to_string();
    let err = submit_intake::<ParticipantIntake>(&state, draft)
        .await
        .expect_err("date outside the season");
    assert!(matches!(err, SubmitError::SlotNotFound(ref s) if s == "2025-09-01"));
    assert_eq!(store.insert_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn full_slot_returns_conflict_with_the_observed_occupancy() {
    let store = Arc::new(FakeStore::default());
    *store.fixed_count.lock().await = Some(200);
    let state = AppState::new(store.clone());

    let err = submit_intake::<ParticipantIntake>(&state, participant_draft())
        .await
        .expect_err("slot at capacity");
    match err {
        SubmitError::SlotFull {
            slot,
            capacity,
            occupancy,
        } => {
            assert_eq!(slot, "2025-07-26");
            assert_eq!(capacity, 200);
            assert_eq!(occupancy, 200);
        }
        other => panic!("expected SlotFull, got {other:?}"),
    }
    assert_eq!(store.insert_calls.load(Ordering::Relaxed), 0);
    assert_eq!(state.intake.slot_full_total.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn last_seat_is_still_accepted() {
    let store = Arc::new(FakeStore::default());
    *store.fixed_count.lock().await = Some(199);
    let state = AppState::new(store.clone());

    submit_intake::<ParticipantIntake>(&state, participant_draft())
        .await
        .expect("one seat left");
    assert_eq!(store.insert_calls.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn stale_occupancy_reads_let_submissions_overshoot_capacity() {
    let store = Arc::new(FakeStore::default());
    // Freeze the reported occupancy below capacity, as concurrent submitters
    // racing the same count would each observe.
    *store.fixed_count.lock().await = Some(0);
    let state = AppState::with_config(
        store.clone(),
        ApiConfig {
            slot_capacity: 1,
            ..ApiConfig::default()
        },
    );

    for _ in 0..3 {
        submit_intake::<ParticipantIntake>(&state, participant_draft())
            .await
            .expect("stale count admits the submission");
    }
    assert_eq!(store.participants.lock().await.len(), 3);
    assert_eq!(state.intake.slot_full_total.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn count_failure_fails_open_and_still_accepts_the_registration() {
    let store = Arc::new(FakeStore::default());
    store.fail_count.store(true, Ordering::Relaxed);
    let state = AppState::new(store.clone());

    submit_intake::<ParticipantIntake>(&state, participant_draft())
        .await
        .expect("count outage must not block intake");
    assert_eq!(store.insert_calls.load(Ordering::Relaxed), 1);
    assert_eq!(
        state.intake.capacity_fail_open_total.load(Ordering::Relaxed),
        1
    );
}

#[tokio::test]
async fn store_write_failure_surfaces_as_a_store_error() {
    let store = Arc::new(FakeStore::default());
    store.fail_insert.store(true, Ordering::Relaxed);
    let state = AppState::new(store.clone());

    let err = submit_intake::<ParticipantIntake>(&state, participant_draft())
        .await
        .expect_err("insert outage surfaces");
    assert!(matches!(err, SubmitError::Store(_)));
    assert_eq!(state.intake.store_failures_total.load(Ordering::Relaxed), 1);
    assert_eq!(state.intake.registrations_total.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn volunteer_submission_skips_the_capacity_check() {
    let store = Arc::new(FakeStore::default());
    let state = AppState::new(store.clone());

    submit_intake::<VolunteerIntake>(&state, volunteer_draft())
        .await
        .expect("volunteer accepted");
    assert_eq!(store.count_calls.load(Ordering::Relaxed), 0);
    assert_eq!(store.volunteers.lock().await.len(), 1);
    assert_eq!(state.intake.volunteers_total.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn configured_age_bounds_narrow_the_accepted_range() {
    let store = Arc::new(FakeStore::default());
    let state = AppState::with_config(
        store.clone(),
        ApiConfig {
            age_bounds: AgeBounds { min: 18, max: 80 },
            ..ApiConfig::default()
        },
    );

    let mut draft = participant_draft();
    draft.age = Some(16);
    let err = submit_intake::<ParticipantIntake>(&state, draft)
        .await
        .expect_err("under the configured minimum");
    assert!(matches!(
        err,
        SubmitError::Rejected(FieldError::OutOfRange("age", 18, 80))
    ));

    let mut draft = participant_draft();
    draft.age = Some(18);
    submit_intake::<ParticipantIntake>(&state, draft)
        .await
        .expect("at the configured minimum");
}
