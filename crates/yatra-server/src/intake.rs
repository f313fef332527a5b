use std::sync::atomic::Ordering;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};
use yatra_model::{
    AgeBounds, FieldError, Participant, ParticipantDraft, ParticipantRecord, SlotId, Volunteer,
    VolunteerDraft, VolunteerRecord,
};

use crate::{AppState, RegistrationStore, StoreError};

/// Validation knobs applied to submitted drafts.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeRules {
    pub age: AgeBounds,
}

#[derive(Debug)]
pub enum SubmitError {
    Rejected(FieldError),
    SlotNotFound(String),
    SlotFull {
        slot: String,
        capacity: u32,
        occupancy: u64,
    },
    Store(StoreError),
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(err) => write!(f, "{err}"),
            Self::SlotNotFound(slot) => write!(f, "no pilgrimage slot on {slot}"),
            Self::SlotFull {
                slot,
                capacity,
                occupancy,
            } => write!(f, "slot {slot} is full ({occupancy}/{capacity})"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// One registration form wired through the shared submit pipeline. The two
/// implementors differ only in validation and in whether a slot capacity
/// check applies.
#[async_trait]
pub trait IntakeForm {
    type Draft: Send + 'static;
    type Valid: Send + Sync;
    type Record: Send;

    const FORM: &'static str;

    fn validate(draft: Self::Draft, rules: &IntakeRules) -> Result<Self::Valid, FieldError>;
    fn slot(valid: &Self::Valid) -> Option<&SlotId>;
    async fn persist(
        store: &dyn RegistrationStore,
        valid: &Self::Valid,
    ) -> Result<Self::Record, StoreError>;
}

pub struct ParticipantIntake;

#[async_trait]
impl IntakeForm for ParticipantIntake {
    type Draft = ParticipantDraft;
    type Valid = Participant;
    type Record = ParticipantRecord;

    const FORM: &'static str = "participant";

    fn validate(draft: Self::Draft, rules: &IntakeRules) -> Result<Self::Valid, FieldError> {
        draft.validate(rules.age)
    }

    fn slot(valid: &Self::Valid) -> Option<&SlotId> {
        Some(&valid.time_slot)
    }

    async fn persist(
        store: &dyn RegistrationStore,
        valid: &Self::Valid,
    ) -> Result<Self::Record, StoreError> {
        store.insert_participant(valid).await
    }
}

pub struct VolunteerIntake;

#[async_trait]
impl IntakeForm for VolunteerIntake {
    type Draft = VolunteerDraft;
    type Valid = Volunteer;
    type Record = VolunteerRecord;

    const FORM: &'static str = "volunteer";

    fn validate(draft: Self::Draft, _rules: &IntakeRules) -> Result<Self::Valid, FieldError> {
        draft.validate()
    }

    fn slot(_valid: &Self::Valid) -> Option<&SlotId> {
        None
    }

    async fn persist(
        store: &dyn RegistrationStore,
        valid: &Self::Valid,
    ) -> Result<Self::Record, StoreError> {
        store.insert_volunteer(valid).await
    }
}

/// Current occupancy of a slot. Fails open: an unreadable count renders as
/// zero so a store hiccup never blocks the form.
pub(crate) async fn slot_occupancy(state: &AppState, slot: &SlotId) -> u64 {
    let started = Instant::now();
    let result = state.store.count_for_slot(slot).await;
    state
        .metrics
        .observe_store_op("count_for_slot", started.elapsed())
        .await;
    match result {
        Ok(count) => count,
        Err(err) => {
            state
                .intake
                .capacity_fail_open_total
                .fetch_add(1, Ordering::Relaxed);
            warn!(slot = %slot, "occupancy read failed, treating slot as empty: {err}");
            0
        }
    }
}

/// Shared submit pipeline: validate, resolve the slot, check capacity,
/// persist.
///
/// The capacity check is advisory. Nothing spans the read and the insert, so
/// concurrent submitters racing for the last seats can push a slot past its
/// capacity; the roster is reconciled off-system before event day.
pub(crate) async fn submit_intake<F: IntakeForm>(
    state: &AppState,
    draft: F::Draft,
) -> Result<F::Record, SubmitError> {
    let rules = state.rules();
    let valid = F::validate(draft, &rules).map_err(|err| {
        state.intake.rejections_total.fetch_add(1, Ordering::Relaxed);
        SubmitError::Rejected(err)
    })?;

    if let Some(slot_id) = F::slot(&valid) {
        let slot = state
            .catalog
            .get(slot_id)
            .ok_or_else(|| SubmitError::SlotNotFound(slot_id.to_string()))?;
        let occupancy = slot_occupancy(state, slot_id).await;
        if occupancy >= u64::from(slot.capacity) {
            state.intake.slot_full_total.fetch_add(1, Ordering::Relaxed);
            return Err(SubmitError::SlotFull {
                slot: slot_id.to_string(),
                capacity: slot.capacity,
                occupancy,
            });
        }
    }

    let started = Instant::now();
    let result = F::persist(state.store.as_ref(), &valid).await;
    state
        .metrics
        .observe_store_op("insert", started.elapsed())
        .await;
    match result {
        Ok(record) => {
            if F::FORM == "participant" {
                state
                    .intake
                    .registrations_total
                    .fetch_add(1, Ordering::Relaxed);
            } else {
                state
                    .intake
                    .volunteers_total
                    .fetch_add(1, Ordering::Relaxed);
            }
            info!(form = F::FORM, "registration stored");
            Ok(record)
        }
        Err(err) => {
            state
                .intake
                .store_failures_total
                .fetch_add(1, Ordering::Relaxed);
            Err(SubmitError::Store(err))
        }
    }
}
