//! Non-performing asset (NPA) classification by days overdue.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NpaClass {
    Standard,
    #[serde(rename = "Sub-Standard")]
    SubStandard,
    Doubtful,
    Loss,
}

impl NpaClass {
    pub fn display_name(self) -> &'static str {
        match self {
            NpaClass::Standard => "Standard",
            NpaClass::SubStandard => "Sub-Standard",
            NpaClass::Doubtful => "Doubtful",
            NpaClass::Loss => "Loss",
        }
    }

    /// Everything past `Standard` counts toward the NPA book.
    pub fn is_non_performing(self) -> bool {
        self != NpaClass::Standard
    }
}

/// One row of the classification table: `[from_days, until_days)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NpaBucket {
    pub class: NpaClass,
    pub from_days: u32,
    /// `None` for the open-ended top bucket.
    pub until_days: Option<u32>,
}

/// Ordered classification table.
pub const NPA_BUCKETS: [NpaBucket; 4] = [
    NpaBucket { class: NpaClass::Standard, from_days: 0, until_days: Some(90) },
    NpaBucket { class: NpaClass::SubStandard, from_days: 90, until_days: Some(180) },
    NpaBucket { class: NpaClass::Doubtful, from_days: 180, until_days: Some(365) },
    NpaBucket { class: NpaClass::Loss, from_days: 365, until_days: None },
];

/// Classify a loan by days overdue.
pub fn npa_bucket(days_overdue: u32) -> NpaClass {
    NPA_BUCKETS
        .iter()
        .find(|b| days_overdue >= b.from_days && b.until_days.is_none_or(|until| days_overdue < until))
        .map(|b| b.class)
        .unwrap_or(NpaClass::Loss)
}
