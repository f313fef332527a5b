#![forbid(unsafe_code)]
//! Yatra domain model SSOT: slot catalog, registration drafts and records,
//! field validation, static event content.
//!
//! ```compile_fail
//! use yatra_model::Gender;
//!
//! fn lossy(g: Gender) -> &'static str {
//!     match g {
//!         Gender::Male => "m",
//!         Gender::Female => "f",
//!     }
//! }
//! ```

mod event;
mod fields;
mod participant;
mod slot;
mod volunteer;

pub use event::{ContactInfo, EventInfo, ScheduleDay, ScheduleItem};
pub use fields::{
    AgeBounds, Email, FieldError, FullName, Phone, RegistrationId, ADDRESS_MAX_LEN,
    EMAIL_MAX_LEN, FREE_TEXT_MAX_LEN, FULL_NAME_MAX_LEN, MOTIVATION_MAX_LEN, PHONE_MAX_LEN,
    PHONE_MIN_DIGITS,
};
pub use participant::{Gender, Participant, ParticipantDraft, ParticipantRecord};
pub use slot::{
    Slot, SlotCatalog, SlotId, SlotWeekend, DEFAULT_SLOT_CAPACITY, SLOT_ID_MAX_LEN,
};
pub use volunteer::{
    Availability, Volunteer, VolunteerDraft, VolunteerRecord, VolunteerRole,
};

pub const CRATE_NAME: &str = "yatra-model";
