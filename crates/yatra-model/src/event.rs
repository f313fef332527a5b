use serde::Serialize;

/// Static descriptive content for the event, served read-only by the API.
/// Nothing here is persisted or user-editable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventInfo {
    pub name: String,
    pub season: String,
    pub duration_days: u32,
    pub distance: String,
    pub expected_attendance: String,
    pub starting_point: String,
    pub destination: String,
    pub contact: ContactInfo,
    pub schedule: Vec<ScheduleDay>,
    pub guidelines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub office: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleDay {
    pub day: String,
    pub items: Vec<ScheduleItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleItem {
    pub time: String,
    pub activity: String,
    pub location: String,
}

fn item(time: &str, activity: &str, location: &str) -> ScheduleItem {
    ScheduleItem {
        time: time.to_string(),
        activity: activity.to_string(),
        location: location.to_string(),
    }
}

impl EventInfo {
    #[must_use]
    pub fn kanwariya_2025() -> Self {
        Self {
            name: "Kanwariya Yatra 2025".to_string(),
            season: "Shravanmasa".to_string(),
            duration_days: 3,
            distance: "6-7 km".to_string(),
            expected_attendance: "1000+ devotees".to_string(),
            starting_point: "Narayanhalli Cross".to_string(),
            destination: "Kailasagiri Guhanthaara Devalaya, Dakshina Kailasa Kshethra".to_string(),
            contact: ContactInfo {
                phone: "+91 72594 26555".to_string(),
                email: "kanwariyayatra2025@gmail.com".to_string(),
                office: "Narayanahalli Cross towards Kailasagiribetta, Chintamani, Karnataka"
                    .to_string(),
            },
            schedule: vec![
                ScheduleDay {
                    day: "July 26, 2025".to_string(),
                    items: vec![
                        item(
                            "4:00 AM",
                            "Registration & Kanwar Distribution",
                            "Narayanhalli Cross",
                        ),
                        item(
                            "5:30 AM",
                            "Sacred Water Collection Ceremony",
                            "Local Sacred Source",
                        ),
                        item(
                            "6:30 AM",
                            "Yatra Begins - Group Departure",
                            "Narayanhalli Cross",
                        ),
                        item("12:00 PM", "Midday Rest & Prasadam", "Rest Point 1"),
                        item("6:00 PM", "Evening Camp Setup", "Halfway Point"),
                    ],
                },
                ScheduleDay {
                    day: "July 27, 2025".to_string(),
                    items: vec![
                        item("4:00 AM", "Morning Prayers & Departure", "Camp"),
                        item("10:00 AM", "Sacred Darshan Break", "Local Temple"),
                        item("2:00 PM", "Final Ascent Begins", "Base of Kailasagiri"),
                        item(
                            "6:00 PM",
                            "Reach Kailasagiri Guhanthaara Devalaya",
                            "Dakshina Kailasa Kshethra",
                        ),
                        item(
                            "7:00 PM",
                            "Sacred Water Offering Ceremony",
                            "Guhanthaara Devalaya",
                        ),
                    ],
                },
                ScheduleDay {
                    day: "July 28, 2025".to_string(),
                    items: vec![
                        item("4:00 AM", "Morning Abhishekam", "Guhanthaara Devalaya"),
                        item(
                            "6:00 AM",
                            "Group Meditation & Prayers",
                            "Dakshina Kailasa Kshethra",
                        ),
                        item("8:00 AM", "Prasadam Distribution", "Temple Premises"),
                        item(
                            "10:00 AM",
                            "Return Journey Begins",
                            "Kailasagiri Guhanthaara Devalaya",
                        ),
                        item("6:00 PM", "Arrival & Closing Ceremony", "Chintamani"),
                    ],
                },
            ],
            guidelines: [
                "Wear saffron or white attire during the Yatra",
                "Maintain purity of mind and body throughout the journey",
                "Walk barefoot when possible as a mark of devotion",
                "Carry your Kanwar with respect and devotion",
                "Chant 'Bol Bam' and 'Har Har Mahadev' while walking",
                "Follow designated routes and safety instructions",
                "Respect fellow pilgrims and volunteers",
                "Carry identification and emergency contact details",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}
