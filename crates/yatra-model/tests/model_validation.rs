use yatra_model::{
    AgeBounds, FieldError, ParticipantDraft, SlotId, VolunteerDraft, ADDRESS_MAX_LEN,
    FULL_NAME_MAX_LEN,
};

fn complete_draft() -> ParticipantDraft {
    ParticipantDraft {
        full_name: "Asha Rao".to_string(),
        phone: "9999999999".to_string(),
        email: "asha@example.com".to_string(),
        age: Some(30),
        gender: "female".to_string(),
        address: "Bangalore".to_string(),
        emergency_contact: "8888888888".to_string(),
        medical_conditions: String::new(),
        agreed_to_terms: true,
        time_slot: "2025-07-26".to_string(),
    }
}

fn complete_volunteer() -> VolunteerDraft {
    VolunteerDraft {
        full_name: "Ravi Kumar".to_string(),
        phone: "9876543210".to_string(),
        email: "ravi@example.com".to_string(),
        preferred_role: "first_aid".to_string(),
        availability: "full_event".to_string(),
        skills_qualifications: "certified paramedic".to_string(),
        previous_experience: String::new(),
        motivation: "serve the pilgrims".to_string(),
    }
}

#[test]
fn complete_participant_draft_validates() {
    let participant = complete_draft().validate(AgeBounds::default()).expect("valid");
    assert_eq!(participant.full_name.as_str(), "Asha Rao");
    assert_eq!(participant.age, 30);
    assert_eq!(participant.gender.as_str(), "female");
    assert!(participant.agreed_to_terms);
    assert_eq!(participant.time_slot.as_str(), "2025-07-26");
    assert!(participant.email.is_some());
    assert!(participant.medical_conditions.is_none());
}

#[test]
fn each_required_field_rejects_when_blank() {
    let blank_cases: [(fn(&mut ParticipantDraft), &str); 6] = [
        (|d| d.full_name.clear(), "full_name"),
        (|d| d.phone.clear(), "phone"),
        (|d| d.age = None, "age"),
        (|d| d.gender.clear(), "gender"),
        (|d| d.address.clear(), "address"),
        (|d| d.emergency_contact.clear(), "emergency_contact"),
    ];
    for (blank, field) in blank_cases {
        let mut draft = complete_draft();
        blank(&mut draft);
        let err = draft.validate(AgeBounds::default()).expect_err(field);
        assert_eq!(err.field(), field, "expected {field} to be reported");
    }
}

#[test]
fn first_violated_rule_wins() {
    let mut draft = complete_draft();
    draft.full_name.clear();
    draft.phone.clear();
    let err = draft.validate(AgeBounds::default()).expect_err("rejects");
    assert_eq!(err, FieldError::Missing("full_name"));
}

#[test]
fn consent_false_rejects_even_when_everything_else_is_valid() {
    let mut draft = complete_draft();
    draft.agreed_to_terms = false;
    let err = draft.validate(AgeBounds::default()).expect_err("rejects");
    assert_eq!(err, FieldError::ConsentRequired);
    assert_eq!(err.field(), "agreed_to_terms");
}

#[test]
fn age_bounds_reject_out_of_range_values() {
    for bad in [0, -1, 121, 500] {
        let mut draft = complete_draft();
        draft.age = Some(bad);
        let err = draft.validate(AgeBounds::default()).expect_err("rejects");
        assert_eq!(err, FieldError::OutOfRange("age", 1, 120));
    }
    for good in [1, 120] {
        let mut draft = complete_draft();
        draft.age = Some(good);
        assert!(draft.validate(AgeBounds::default()).is_ok());
    }
}

#[test]
fn strict_age_bounds_narrow_the_accepted_range() {
    let strict = AgeBounds { min: 18, max: 80 };
    let mut draft = complete_draft();
    draft.age = Some(17);
    assert_eq!(
        draft.validate(strict).expect_err("rejects"),
        FieldError::OutOfRange("age", 18, 80)
    );
    let mut draft = complete_draft();
    draft.age = Some(81);
    assert!(draft.validate(strict).is_err());
    let mut draft = complete_draft();
    draft.age = Some(30);
    assert!(draft.validate(strict).is_ok());
}

#[test]
fn email_is_optional_but_validated_when_present() {
    let mut draft = complete_draft();
    draft.email = String::new();
    let participant = draft.validate(AgeBounds::default()).expect("valid");
    assert!(participant.email.is_none());

    let mut draft = complete_draft();
    draft.email = "not-an-address".to_string();
    let err = draft.validate(AgeBounds::default()).expect_err("rejects");
    assert_eq!(err.field(), "email");
}

#[test]
fn phone_requires_enough_digits_and_a_sane_charset() {
    let mut draft = complete_draft();
    draft.phone = "12345".to_string();
    assert_eq!(
        draft
            .validate(AgeBounds::default())
            .expect_err("rejects")
            .field(),
        "phone"
    );

    let mut draft = complete_draft();
    draft.phone = "99999x9999".to_string();
    assert!(draft.validate(AgeBounds::default()).is_err());

    let mut draft = complete_draft();
    draft.phone = "+91 (80) 2345-6789".to_string();
    assert!(draft.validate(AgeBounds::default()).is_ok());
}

#[test]
fn oversized_fields_reject_with_the_configured_limit() {
    let mut draft = complete_draft();
    draft.full_name = "x".repeat(FULL_NAME_MAX_LEN + 1);
    assert_eq!(
        draft.validate(AgeBounds::default()).expect_err("rejects"),
        FieldError::TooLong("full_name", FULL_NAME_MAX_LEN)
    );

    let mut draft = complete_draft();
    draft.address = "x".repeat(ADDRESS_MAX_LEN + 1);
    assert_eq!(
        draft.validate(AgeBounds::default()).expect_err("rejects"),
        FieldError::TooLong("address", ADDRESS_MAX_LEN)
    );
}

#[test]
fn gender_accepts_only_the_published_values() {
    for good in ["male", "female", "other"] {
        let mut draft = complete_draft();
        draft.gender = good.to_string();
        assert!(draft.validate(AgeBounds::default()).is_ok(), "{good}");
    }
    let mut draft = complete_draft();
    draft.gender = "unspecified".to_string();
    assert_eq!(
        draft
            .validate(AgeBounds::default())
            .expect_err("rejects")
            .field(),
        "gender"
    );
}

#[test]
fn slot_id_must_be_a_bare_calendar_date() {
    assert!(SlotId::parse("2025-07-26").is_ok());
    assert!(SlotId::parse(" 2025-08-25 ").is_ok());
    assert_eq!(
        SlotId::parse("").expect_err("empty"),
        FieldError::Missing("time_slot")
    );
    assert!(SlotId::parse("2025-07-26T04:00").is_err());
    assert!(SlotId::parse("26-07-2025").is_err());
    assert!(SlotId::parse("2025-02-30").is_err());
}

#[test]
fn whitespace_only_fields_count_as_missing() {
    let mut draft = complete_draft();
    draft.address = "   ".to_string();
    assert_eq!(
        draft.validate(AgeBounds::default()).expect_err("rejects"),
        FieldError::Missing("address")
    );
}

#[test]
fn field_values_are_trimmed_on_validation() {
    let mut draft = complete_draft();
    draft.full_name = "  Asha Rao  ".to_string();
    draft.time_slot = " 2025-07-26".to_string();
    let participant = draft.validate(AgeBounds::default()).expect("valid");
    assert_eq!(participant.full_name.as_str(), "Asha Rao");
    assert_eq!(participant.time_slot.as_str(), "2025-07-26");
}

#[test]
fn complete_volunteer_draft_validates() {
    let volunteer = complete_volunteer().validate().expect("valid");
    assert_eq!(volunteer.preferred_role.as_str(), "first_aid");
    assert_eq!(volunteer.availability.as_str(), "full_event");
    assert_eq!(
        volunteer.skills_qualifications.as_deref(),
        Some("certified paramedic")
    );
    assert!(volunteer.previous_experience.is_none());
}

#[test]
fn volunteer_email_and_motivation_are_required() {
    let mut draft = complete_volunteer();
    draft.email = String::new();
    assert_eq!(
        draft.validate().expect_err("rejects").field(),
        "email"
    );

    let mut draft = complete_volunteer();
    draft.motivation = String::new();
    assert_eq!(
        draft.validate().expect_err("rejects"),
        FieldError::Missing("motivation")
    );
}

#[test]
fn volunteer_role_and_availability_reject_unknown_values() {
    let mut draft = complete_volunteer();
    draft.preferred_role = "cooking".to_string();
    assert_eq!(
        draft.validate().expect_err("rejects").field(),
        "preferred_role"
    );

    let mut draft = complete_volunteer();
    draft.availability = "weekends".to_string();
    assert_eq!(
        draft.validate().expect_err("rejects").field(),
        "availability"
    );
}

#[test]
fn field_error_messages_are_user_displayable() {
    assert_eq!(
        FieldError::Missing("full_name").to_string(),
        "full_name is required"
    );
    assert_eq!(
        FieldError::OutOfRange("age", 1, 120).to_string(),
        "age must be between 1 and 120"
    );
    assert_eq!(
        FieldError::ConsentRequired.to_string(),
        "terms and conditions must be accepted before registering"
    );
}
