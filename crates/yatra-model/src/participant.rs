use crate::fields::{
    optional_text, required_text, AgeBounds, Email, FieldError, FullName, Phone, RegistrationId,
    ADDRESS_MAX_LEN, FREE_TEXT_MAX_LEN,
};
use crate::slot::SlotId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse(input: &str) -> Result<Self, FieldError> {
        match input.trim() {
            "" => Err(FieldError::Missing("gender")),
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(FieldError::Invalid(
                "gender",
                "must be one of male, female, other",
            )),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire-shaped registration draft. Every field carries a serde default so a
/// missing field deserializes instead of failing the request; presence is
/// enforced by [`ParticipantDraft::validate`], which names the offending field
/// instead of surfacing a serde error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantDraft {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub age: Option<i64>,
    pub gender: String,
    pub address: String,
    pub emergency_contact: String,
    pub medical_conditions: String,
    #[serde(rename = "agreedToTerms")]
    pub agreed_to_terms: bool,
    #[serde(rename = "timeSlot")]
    pub time_slot: String,
}

impl ParticipantDraft {
    /// Drafts are consumed by value; the first violated rule wins and nothing
    /// is persisted on any failure path.
    pub fn validate(self, bounds: AgeBounds) -> Result<Participant, FieldError> {
        let full_name = FullName::parse(&self.full_name)?;
        let phone = Phone::parse(&self.phone)?;
        let email = match self.email.trim() {
            "" => None,
            raw => Some(Email::parse(raw)?),
        };
        let age = match self.age {
            None => return Err(FieldError::Missing("age")),
            Some(value) => bounds.check(value)?,
        };
        let gender = Gender::parse(&self.gender)?;
        let address = required_text(&self.address, "address", ADDRESS_MAX_LEN)?;
        let emergency_contact = Phone::parse_field(&self.emergency_contact, "emergency_contact")?;
        let medical_conditions =
            optional_text(&self.medical_conditions, "medical_conditions", FREE_TEXT_MAX_LEN)?;
        if !self.agreed_to_terms {
            return Err(FieldError::ConsentRequired);
        }
        let time_slot = SlotId::parse(&self.time_slot)?;
        Ok(Participant {
            full_name,
            phone,
            email,
            age,
            gender,
            address,
            emergency_contact,
            medical_conditions,
            agreed_to_terms: true,
            time_slot,
        })
    }
}

/// A fully validated participant registration. Produced only by
/// [`ParticipantDraft::validate`]; the consent flag is always `true` here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub full_name: FullName,
    pub phone: Phone,
    pub email: Option<Email>,
    pub age: u8,
    pub gender: Gender,
    pub address: String,
    pub emergency_contact: Phone,
    pub medical_conditions: Option<String>,
    #[serde(rename = "agreedToTerms")]
    pub agreed_to_terms: bool,
    #[serde(rename = "timeSlot")]
    pub time_slot: SlotId,
}

/// The persisted row. Registrations are append-only: no update or delete path
/// exists anywhere in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub id: RegistrationId,
    #[serde(flatten)]
    pub participant: Participant,
    pub created_at: DateTime<Utc>,
}
