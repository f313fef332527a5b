use crate::fields::FieldError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const SLOT_ID_MAX_LEN: usize = 10;
pub const DEFAULT_SLOT_CAPACITY: u32 = 200;

const SLOT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical slot key: a bare ISO calendar date. Older revisions also used
/// date+time composites; only the date form is encoded here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct SlotId(String);

impl SlotId {
    pub fn parse(input: &str) -> Result<Self, FieldError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(FieldError::Missing("time_slot"));
        }
        if s.len() > SLOT_ID_MAX_LEN {
            return Err(FieldError::TooLong("time_slot", SLOT_ID_MAX_LEN));
        }
        if NaiveDate::parse_from_str(s, SLOT_DATE_FORMAT).is_err() {
            return Err(FieldError::Invalid(
                "time_slot",
                "must be a calendar date in YYYY-MM-DD form",
            ));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(SLOT_DATE_FORMAT).to_string())
    }

    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, SLOT_DATE_FORMAT).ok()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for SlotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One bookable yatra date with its fixed capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub id: SlotId,
    pub label: String,
    pub capacity: u32,
}

/// Display grouping for the booking form: three consecutive dates per
/// weekend batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotWeekend {
    pub label: String,
    pub slots: Vec<Slot>,
}

/// Static enumeration of the bookable dates. Defined in-process; nothing
/// about the catalog itself is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotCatalog {
    weekends: Vec<SlotWeekend>,
}

impl SlotCatalog {
    /// The fifteen published 2025 dates, Saturday through Monday across five
    /// weekend batches, every slot sharing one capacity.
    #[must_use]
    pub fn yatra_2025(capacity: u32) -> Self {
        let batches: [(&str, [(u32, u32); 3]); 5] = [
            ("July 26-28", [(7, 26), (7, 27), (7, 28)]),
            ("August 2-4", [(8, 2), (8, 3), (8, 4)]),
            ("August 9-11", [(8, 9), (8, 10), (8, 11)]),
            ("August 16-18", [(8, 16), (8, 17), (8, 18)]),
            ("August 23-25", [(8, 23), (8, 24), (8, 25)]),
        ];
        let weekends = batches
            .into_iter()
            .map(|(label, days)| SlotWeekend {
                label: label.to_string(),
                slots: days
                    .into_iter()
                    .filter_map(|(month, day)| NaiveDate::from_ymd_opt(2025, month, day))
                    .map(|date| Slot {
                        id: SlotId::from_date(date),
                        label: date.format("%A, %B %-d, %Y").to_string(),
                        capacity,
                    })
                    .collect(),
            })
            .collect();
        Self { weekends }
    }

    #[must_use]
    pub fn get(&self, id: &SlotId) -> Option<&Slot> {
        self.slots().find(|slot| &slot.id == id)
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.weekends.iter().flat_map(|weekend| weekend.slots.iter())
    }

    #[must_use]
    pub fn weekends(&self) -> &[SlotWeekend] {
        &self.weekends
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weekends.iter().all(|weekend| weekend.slots.is_empty())
    }
}
