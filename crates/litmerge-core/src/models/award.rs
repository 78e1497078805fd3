use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a title on an award listing, as the award pages spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AwardStatus {
    Winner,
    Finalist,
    Shortlist,
    Longlist,
    #[default]
    #[serde(other)]
    Other,
}

impl AwardStatus {
    pub fn is_win(&self) -> bool {
        matches!(self, Self::Winner)
    }

    /// Made the final cut without winning.
    pub fn is_shortlisted(&self) -> bool {
        matches!(self, Self::Finalist | Self::Shortlist)
    }

    /// Lenient parse used on scraped text ("winner", "Short list", ...).
    pub fn from_label(label: &str) -> Self {
        let folded: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "winner" | "won" => Self::Winner,
            "finalist" => Self::Finalist,
            "shortlist" | "shortlisted" => Self::Shortlist,
            "longlist" | "longlisted" => Self::Longlist,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for AwardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Winner => "Winner",
            Self::Finalist => "Finalist",
            Self::Shortlist => "Shortlist",
            Self::Longlist => "Longlist",
            Self::Other => "Other",
        };
        f.write_str(label)
    }
}

/// One award listing attached to a merged book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardEntry {
    pub award: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub status: AwardStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_is_lenient() {
        assert_eq!(AwardStatus::from_label("Winner"), AwardStatus::Winner);
        assert_eq!(AwardStatus::from_label("short-list"), AwardStatus::Shortlist);
        assert_eq!(AwardStatus::from_label(" FINALIST "), AwardStatus::Finalist);
        assert_eq!(AwardStatus::from_label("honorable mention"), AwardStatus::Other);
    }

    #[test]
    fn unknown_status_deserializes_as_other() {
        let status: AwardStatus = serde_json::from_str("\"Judges' Pick\"").unwrap();
        assert_eq!(status, AwardStatus::Other);
        let status: AwardStatus = serde_json::from_str("\"Shortlist\"").unwrap();
        assert!(status.is_shortlisted());
        assert!(!status.is_win());
    }
}
