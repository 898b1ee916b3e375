//! Identification chip record.
//!
//! # Invariants
//! - `code` and `clinic` are non-blank.
//! - `implanted_on` is not after today.
//! - A chip is only reached through the single pet that references it.

use super::{require_not_future, require_text, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-assigned chip identity.
pub type ChipId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chip {
    /// `None` until the first insert.
    pub id: Option<ChipId>,
    /// Registry code printed on the chip.
    pub code: String,
    pub implanted_on: NaiveDate,
    /// Clinic that performed the implantation.
    pub clinic: String,
    /// Free-text observations.
    pub notes: Option<String>,
    pub is_deleted: bool,
}

impl Chip {
    /// Creates an unsaved chip with no notes.
    pub fn new(code: impl Into<String>, implanted_on: NaiveDate, clinic: impl Into<String>) -> Self {
        Self {
            id: None,
            code: code.into(),
            implanted_on,
            clinic: clinic.into(),
            notes: None,
            is_deleted: false,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns the first field violation, checked in declaration order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("code", &self.code)?;
        require_not_future("implanted_on", Some(self.implanted_on))?;
        require_text("clinic", &self.clinic)?;
        Ok(())
    }

    /// True when the chip still needs an insert (`None` or the `0` sentinel).
    pub fn is_new(&self) -> bool {
        matches!(self.id, None | Some(0))
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    pub fn restore(&mut self) {
        self.is_deleted = false;
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::Chip;
    use crate::model::ValidationError;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_chip_is_active_and_unsaved() {
        let chip = Chip::new("CHIP-001", date(2021, 5, 5), "VetCenter");
        assert!(chip.is_new());
        assert!(chip.is_active());
        assert!(chip.validate().is_ok());
    }

    #[test]
    fn zero_id_counts_as_new() {
        let mut chip = Chip::new("CHIP-001", date(2021, 5, 5), "VetCenter");
        chip.id = Some(0);
        assert!(chip.is_new());
        chip.id = Some(7);
        assert!(!chip.is_new());
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let chip = Chip::new(" ", date(2021, 5, 5), "");
        assert_eq!(chip.validate(), Err(ValidationError::MissingField("code")));

        let chip = Chip::new("CHIP-001", date(2021, 5, 5), "");
        assert_eq!(chip.validate(), Err(ValidationError::MissingField("clinic")));
    }

    #[test]
    fn notes_are_optional() {
        let chip = Chip::new("CHIP-002", date(2022, 1, 1), "VetCenter").with_notes("left shoulder");
        assert_eq!(chip.notes.as_deref(), Some("left shoulder"));
        assert!(chip.validate().is_ok());
    }
}
