// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use tokio::sync::Mutex;
use yatra_model::{
    Participant, ParticipantRecord, RegistrationId, SlotId, Volunteer, VolunteerRecord,
};

use crate::{RegistrationStore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS participant_registrations (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    phone TEXT NOT NULL,
    email TEXT,
    age INTEGER NOT NULL,
    gender TEXT NOT NULL,
    address TEXT NOT NULL,
    emergency_contact TEXT NOT NULL,
    medical_conditions TEXT,
    agreed_to_terms INTEGER NOT NULL,
    time_slot TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_participant_time_slot
    ON participant_registrations(time_slot);
CREATE TABLE IF NOT EXISTS volunteer_registrations (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    phone TEXT NOT NULL,
    email TEXT NOT NULL,
    preferred_role TEXT NOT NULL,
    availability TEXT NOT NULL,
    skills_qualifications TEXT,
    previous_experience TEXT,
    motivation TEXT NOT NULL,
    created_at TEXT NOT NULL
);
";

/// SQLite-backed registration store. One connection behind an async mutex;
/// registration volume is form-driven and never needs a pool.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError(format!("create db parent dir failed: {e}")))?;
            }
        }
        let conn =
            Connection::open(path).map_err(|e| StoreError(format!("open db failed: {e}")))?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )
        .map_err(|e| StoreError(format!("apply pragmas failed: {e}")))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError(format!("apply schema failed: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError(format!("open in-memory db failed: {e}")))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError(format!("apply schema failed: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl RegistrationStore for SqliteStore {
    async fn insert_participant(
        &self,
        participant: &Participant,
    ) -> Result<ParticipantRecord, StoreError> {
        let record = ParticipantRecord {
            id: RegistrationId::generate(),
            participant: participant.clone(),
            created_at: Utc::now(),
        };
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO participant_registrations
                (id, full_name, phone, email, age, gender, address, emergency_contact,
                 medical_conditions, agreed_to_terms, time_slot, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                record.id.to_string(),
                record.participant.full_name.as_str(),
                record.participant.phone.as_str(),
                record.participant.email.as_ref().map(|e| e.as_str()),
                i64::from(record.participant.age),
                record.participant.gender.as_str(),
                record.participant.address,
                record.participant.emergency_contact.as_str(),
                record.participant.medical_conditions,
                i64::from(record.participant.agreed_to_terms),
                record.participant.time_slot.as_str(),
                record.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| StoreError(format!("insert participant failed: {e}")))?;
        Ok(record)
    }

    async fn insert_volunteer(
        &self,
        volunteer: &Volunteer,
    ) -> Result<VolunteerRecord, StoreError> {
        let record = VolunteerRecord {
            id: RegistrationId::generate(),
            volunteer: volunteer.clone(),
            created_at: Utc::now(),
        };
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO volunteer_registrations
                (id, full_name, phone, email, preferred_role, availability,
                 skills_qualifications, previous_experience, motivation, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id.to_string(),
                record.volunteer.full_name.as_str(),
                record.volunteer.phone.as_str(),
                record.volunteer.email.as_str(),
                record.volunteer.preferred_role.as_str(),
                record.volunteer.availability.as_str(),
                record.volunteer.skills_qualifications,
                record.volunteer.previous_experience,
                record.volunteer.motivation,
                record.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| StoreError(format!("insert volunteer failed: {e}")))?;
        Ok(record)
    }

    async fn count_for_slot(&self, slot: &SlotId) -> Result<u64, StoreError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM participant_registrations WHERE time_slot = ?1",
                params![slot.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| StoreError(format!("count for slot failed: {e}")))?;
        Ok(count as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|e| StoreError(format!("ping failed: {e}")))
    }
}
