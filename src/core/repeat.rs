use serde::{Deserialize, Serialize};
use std::fmt;

/// Recurrence label attached to a reminder.
///
/// Purely descriptive: nothing in the crate materializes future occurrences
/// from it. It is only consulted when the task also carries a reminder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Weekdays,
}

impl Repeat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Weekdays => "weekdays",
        }
    }

    /// Parse a user-supplied label. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Some(Self::None),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "weekdays" => Some(Self::Weekdays),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Label rendered next to a reminder, e.g. `"• Daily"`. Empty for `None`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Daily => "• Daily",
            Self::Weekly => "• Weekly",
            Self::Monthly => "• Monthly",
            Self::Weekdays => "• Weekdays",
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Repeat::parse("Daily"), Some(Repeat::Daily));
        assert_eq!(Repeat::parse(" WEEKDAYS "), Some(Repeat::Weekdays));
        assert_eq!(Repeat::parse("none"), Some(Repeat::None));
        assert_eq!(Repeat::parse("fortnightly"), None);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Repeat::Monthly).unwrap(), "\"monthly\"");
        let r: Repeat = serde_json::from_str("\"weekly\"").unwrap();
        assert_eq!(r, Repeat::Weekly);
    }

    #[test]
    fn label_is_empty_for_none() {
        assert_eq!(Repeat::None.label(), "");
        assert_eq!(Repeat::Daily.label(), "• Daily");
        assert_eq!(Repeat::Weekdays.to_string(), "weekdays");
    }
}
