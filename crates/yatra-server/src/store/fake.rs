// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;
use yatra_model::{
    Participant, ParticipantRecord, RegistrationId, SlotId, Volunteer, VolunteerRecord,
};

use crate::{RegistrationStore, StoreError};

/// In-memory store for tests. Call counters and failure toggles are plain
/// public fields so a test can inspect or flip them mid-flight.
pub struct FakeStore {
    pub participants: Mutex<Vec<ParticipantRecord>>,
    pub volunteers: Mutex<Vec<VolunteerRecord>>,
    pub insert_calls: AtomicU64,
    pub count_calls: AtomicU64,
    pub fail_insert: AtomicBool,
    pub fail_count: AtomicBool,
    pub fail_ping: AtomicBool,
    /// When set, `count_for_slot` reports this instead of the stored rows.
    pub fixed_count: Mutex<Option<u64>>,
}

impl Default for FakeStore {
    fn default() -> Self {
        Self {
            participants: Mutex::new(Vec::new()),
            volunteers: Mutex::new(Vec::new()),
            insert_calls: AtomicU64::new(0),
            count_calls: AtomicU64::new(0),
            fail_insert: AtomicBool::new(false),
            fail_count: AtomicBool::new(false),
            fail_ping: AtomicBool::new(false),
            fixed_count: Mutex::new(None),
        }
    }
}

#[async_trait]
impl RegistrationStore for FakeStore {
    async fn insert_participant(
        &self,
        participant: &Participant,
    ) -> Result<ParticipantRecord, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_insert.load(Ordering::Relaxed) {
            return Err(StoreError("fake participant insert failure".to_string()));
        }
        let record = ParticipantRecord {
            id: RegistrationId::generate(),
            participant: participant.clone(),
            created_at: Utc::now(),
        };
        self.participants.lock().await.push(record.clone());
        Ok(record)
    }

    async fn insert_volunteer(
        &self,
        volunteer: &Volunteer,
    ) -> Result<VolunteerRecord, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_insert.load(Ordering::Relaxed) {
            return Err(StoreError("fake volunteer insert failure".to_string()));
        }
        let record = VolunteerRecord {
            id: RegistrationId::generate(),
            volunteer: volunteer.clone(),
            created_at: Utc::now(),
        };
        self.volunteers.lock().await.push(record.clone());
        Ok(record)
    }

    async fn count_for_slot(&self, slot: &SlotId) -> Result<u64, StoreError> {
        self.count_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_count.load(Ordering::Relaxed) {
            return Err(StoreError("fake count failure".to_string()));
        }
        if let Some(fixed) = *self.fixed_count.lock().await {
            return Ok(fixed);
        }
        let rows = self.participants.lock().await;
        Ok(rows
            .iter()
            .filter(|r| r.participant.time_slot == *slot)
            .count() as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.fail_ping.load(Ordering::Relaxed) {
            return Err(StoreError("fake ping failure".to_string()));
        }
        Ok(())
    }
}
