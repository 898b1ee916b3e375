//! Pet record with its optional chip.

use super::chip::Chip;
use super::{require_not_future, require_text, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-assigned pet identity.
pub type PetId = i64;

/// Pet as seen by services and callers.
///
/// The pet owns its chip: deleting the pet cascades to the chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    /// `None` until the first insert; immutable afterwards.
    pub id: Option<PetId>,
    pub name: String,
    pub species: String,
    pub breed: String,
    /// Unknown birth dates are allowed.
    pub birth_date: Option<NaiveDate>,
    /// Owner full name.
    pub owner: String,
    /// Attached only while the referenced chip is active.
    pub chip: Option<Chip>,
    pub is_deleted: bool,
}

impl Pet {
    /// Creates an unsaved pet without chip.
    pub fn new(
        name: impl Into<String>,
        species: impl Into<String>,
        breed: impl Into<String>,
        birth_date: Option<NaiveDate>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            species: species.into(),
            breed: breed.into(),
            birth_date,
            owner: owner.into(),
            chip: None,
            is_deleted: false,
        }
    }

    pub fn with_chip(mut self, chip: Chip) -> Self {
        self.chip = Some(chip);
        self
    }

    /// Returns the first field violation, checked in declaration order.
    ///
    /// Does not look into the attached chip; see [`Chip::validate`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("species", &self.species)?;
        require_text("breed", &self.breed)?;
        require_not_future("birth_date", self.birth_date)?;
        require_text("owner", &self.owner)?;
        Ok(())
    }

    /// Id of the attached chip when it has already been persisted.
    pub fn chip_id(&self) -> Option<i64> {
        self.chip
            .as_ref()
            .and_then(|chip| chip.id)
            .filter(|id| *id != 0)
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
    use super::Pet;
    use crate::model::chip::Chip;
    use crate::model::ValidationError;
    use chrono::{Duration, Local, NaiveDate};

    fn rex() -> Pet {
        Pet::new(
            "Rex",
            "Dog",
            "Labrador",
            NaiveDate::from_ymd_opt(2020, 1, 1),
            "Ana",
        )
    }

    #[test]
    fn valid_pet_passes() {
        assert!(rex().validate().is_ok());
        assert!(rex().is_active());
        assert_eq!(rex().id, None);
    }

    #[test]
    fn missing_fields_are_reported_in_order() {
        let mut pet = rex();
        pet.species = String::new();
        pet.owner = String::new();
        assert_eq!(pet.validate(), Err(ValidationError::MissingField("species")));

        let mut pet = rex();
        pet.owner = "  ".to_string();
        assert_eq!(pet.validate(), Err(ValidationError::MissingField("owner")));
    }

    #[test]
    fn future_birth_date_is_rejected() {
        let mut pet = rex();
        pet.birth_date = Some(Local::now().date_naive() + Duration::days(30));
        assert_eq!(pet.validate(), Err(ValidationError::FutureDate("birth_date")));
    }

    #[test]
    fn chip_id_ignores_unsaved_and_zero_ids() {
        let chip = Chip::new("CHIP-001", NaiveDate::from_ymd_opt(2021, 5, 5).unwrap(), "VetCenter");
        let mut pet = rex().with_chip(chip);
        assert_eq!(pet.chip_id(), None);

        pet.chip.as_mut().unwrap().id = Some(0);
        assert_eq!(pet.chip_id(), None);

        pet.chip.as_mut().unwrap().id = Some(4);
        assert_eq!(pet.chip_id(), Some(4));
    }

    #[test]
    fn soft_delete_and_restore_toggle_flag() {
        let mut pet = rex();
        pet.soft_delete();
        assert!(!pet.is_active());
        pet.restore();
        assert!(pet.is_active());
    }
}
