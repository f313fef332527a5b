use crate::fields::{
    optional_text, required_text, Email, FieldError, FullName, Phone, RegistrationId,
    FREE_TEXT_MAX_LEN, MOTIVATION_MAX_LEN,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerRole {
    CrowdManagement,
    LogisticsSupport,
    FirstAid,
    FoodService,
    RegistrationHelp,
    RouteGuidance,
    Photography,
    GeneralAssistance,
}

impl VolunteerRole {
    pub const ALL: [Self; 8] = [
        Self::CrowdManagement,
        Self::LogisticsSupport,
        Self::FirstAid,
        Self::FoodService,
        Self::RegistrationHelp,
        Self::RouteGuidance,
        Self::Photography,
        Self::GeneralAssistance,
    ];

    pub fn parse(input: &str) -> Result<Self, FieldError> {
        match input.trim() {
            "" => Err(FieldError::Missing("preferred_role")),
            "crowd_management" => Ok(Self::CrowdManagement),
            "logistics_support" => Ok(Self::LogisticsSupport),
            "first_aid" => Ok(Self::FirstAid),
            "food_service" => Ok(Self::FoodService),
            "registration_help" => Ok(Self::RegistrationHelp),
            "route_guidance" => Ok(Self::RouteGuidance),
            "photography" => Ok(Self::Photography),
            "general_assistance" => Ok(Self::GeneralAssistance),
            _ => Err(FieldError::Invalid(
                "preferred_role",
                "is not a recognized volunteer role",
            )),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CrowdManagement => "crowd_management",
            Self::LogisticsSupport => "logistics_support",
            Self::FirstAid => "first_aid",
            Self::FoodService => "food_service",
            Self::RegistrationHelp => "registration_help",
            Self::RouteGuidance => "route_guidance",
            Self::Photography => "photography",
            Self::GeneralAssistance => "general_assistance",
        }
    }

    /// Human label as shown on the volunteer sign-up form.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::CrowdManagement => "Crowd Management",
            Self::LogisticsSupport => "Logistics Support",
            Self::FirstAid => "First Aid & Medical Support",
            Self::FoodService => "Food & Refreshment Service",
            Self::RegistrationHelp => "Registration & Check-in",
            Self::RouteGuidance => "Route Guidance",
            Self::Photography => "Photography & Documentation",
            Self::GeneralAssistance => "General Assistance",
        }
    }
}

impl Display for VolunteerRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    FullEvent,
    MorningOnly,
    AfternoonOnly,
    SpecificDays,
}

impl Availability {
    pub const ALL: [Self; 4] = [
        Self::FullEvent,
        Self::MorningOnly,
        Self::AfternoonOnly,
        Self::SpecificDays,
    ];

    pub fn parse(input: &str) -> Result<Self, FieldError> {
        match input.trim() {
            "" => Err(FieldError::Missing("availability")),
            "full_event" => Ok(Self::FullEvent),
            "morning_only" => Ok(Self::MorningOnly),
            "afternoon_only" => Ok(Self::AfternoonOnly),
            "specific_days" => Ok(Self::SpecificDays),
            _ => Err(FieldError::Invalid(
                "availability",
                "is not a recognized availability option",
            )),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullEvent => "full_event",
            Self::MorningOnly => "morning_only",
            Self::AfternoonOnly => "afternoon_only",
            Self::SpecificDays => "specific_days",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::FullEvent => "Full Event (All Days)",
            Self::MorningOnly => "Morning Sessions Only",
            Self::AfternoonOnly => "Afternoon Sessions Only",
            Self::SpecificDays => "Specific Days (mention in experience)",
        }
    }
}

impl Display for Availability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire-shaped volunteer draft. Same missing-as-empty convention as the
/// participant draft; volunteers are not slot-bound and must supply an email.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VolunteerDraft {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub preferred_role: String,
    pub availability: String,
    pub skills_qualifications: String,
    pub previous_experience: String,
    pub motivation: String,
}

impl VolunteerDraft {
    pub fn validate(self) -> Result<Volunteer, FieldError> {
        let full_name = FullName::parse(&self.full_name)?;
        let phone = Phone::parse(&self.phone)?;
        let email = Email::parse(&self.email)?;
        let preferred_role = VolunteerRole::parse(&self.preferred_role)?;
        let availability = Availability::parse(&self.availability)?;
        let skills_qualifications =
            optional_text(&self.skills_qualifications, "skills_qualifications", FREE_TEXT_MAX_LEN)?;
        let previous_experience =
            optional_text(&self.previous_experience, "previous_experience", FREE_TEXT_MAX_LEN)?;
        let motivation = required_text(&self.motivation, "motivation", MOTIVATION_MAX_LEN)?;
        Ok(Volunteer {
            full_name,
            phone,
            email,
            preferred_role,
            availability,
            skills_qualifications,
            previous_experience,
            motivation,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub full_name: FullName,
    pub phone: Phone,
    pub email: Email,
    pub preferred_role: VolunteerRole,
    pub availability: Availability,
    pub skills_qualifications: Option<String>,
    pub previous_experience: Option<String>,
    pub motivation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolunteerRecord {
    pub id: RegistrationId,
    #[serde(flatten)]
    pub volunteer: Volunteer,
    pub created_at: DateTime<Utc>,
}
