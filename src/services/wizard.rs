use std::sync::Arc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::models::cuisine::{Cuisine, CuisinePreference};
use crate::models::location::LocationSelection;
use crate::models::notification::{Notification, Notifier};
use crate::models::preferences::Preferences;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Cuisine,
    Location,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WizardError {
    #[error("at least one cuisine must be selected")]
    NoCuisineSelected,
    #[error("a location is required")]
    MissingLocation,
    #[error("not available on the {0:?} step")]
    WrongStep(WizardStep),
}

/// Two-step onboarding: pick cuisines, then a location.
pub struct SelectionWizard {
    step: WizardStep,
    cuisines: CuisinePreference,
    notifier: Arc<dyn Notifier>,
}

impl SelectionWizard {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            step: WizardStep::Cuisine,
            cuisines: CuisinePreference::default(),
            notifier,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn cuisines(&self) -> &CuisinePreference {
        &self.cuisines
    }

    fn expect_step(&self, step: WizardStep) -> Result<(), WizardError> {
        if self.step != step {
            return Err(WizardError::WrongStep(self.step));
        }
        Ok(())
    }

    pub fn toggle_cuisine(&mut self, cuisine: Cuisine) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Cuisine)?;
        self.cuisines.toggle(cuisine);
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Cuisine)?;
        if self.cuisines.is_empty() {
            self.notifier.notify(Notification::destructive(
                "Please select at least one cuisine",
                "Or choose 'Surprise Me' for random selections",
            ));
            return Err(WizardError::NoCuisineSelected);
        }
        self.step = WizardStep::Location;
        Ok(())
    }

    pub fn surprise_me(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Cuisine)?;
        self.cuisines = CuisinePreference::Surprise;
        self.step = WizardStep::Location;
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Location)?;
        self.step = WizardStep::Cuisine;
        Ok(())
    }

    /// Final step. The caller drops the wizard once this succeeds.
    pub fn complete(
        &self,
        location: LocationSelection,
        radius_meters: u32,
    ) -> Result<Preferences, WizardError> {
        self.expect_step(WizardStep::Location)?;
        if location.address.is_empty() {
            self.notifier.notify(Notification::destructive(
                "Please enter a location",
                "Or use your current location",
            ));
            return Err(WizardError::MissingLocation);
        }

        Ok(Preferences {
            cuisines: self.cuisines.clone(),
            location,
            radius: radius_meters,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::models::location::Coordinates;
    use crate::models::notification::NoticeBuffer;
    use super::*;

    fn wizard() -> (Arc<NoticeBuffer>, SelectionWizard) {
        let notices = Arc::new(NoticeBuffer::new());
        let wizard = SelectionWizard::new(notices.clone());
        (notices, wizard)
    }

    #[test]
    fn starts_on_cuisine_step_with_nothing_selected() {
        let (_, wizard) = wizard();
        assert_eq!(wizard.step(), WizardStep::Cuisine);
        assert!(wizard.cuisines().is_empty());
    }

    #[test]
    fn empty_selection_does_not_advance() {
        let (notices, mut wizard) = wizard();

        assert_eq!(wizard.next(), Err(WizardError::NoCuisineSelected));
        assert_eq!(wizard.step(), WizardStep::Cuisine);

        let notices = notices.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Please select at least one cuisine");
    }

    #[test]
    fn every_non_empty_selection_advances() {
        for cuisine in Cuisine::ALL {
            let (notices, mut wizard) = wizard();
            wizard.toggle_cuisine(cuisine).unwrap();
            wizard.next().unwrap();
            assert_eq!(wizard.step(), WizardStep::Location);
            assert!(notices.drain().is_empty());
        }
    }

    #[test]
    fn deselecting_everything_blocks_next_again() {
        let (_, mut wizard) = wizard();
        wizard.toggle_cuisine(Cuisine::Thai).unwrap();
        wizard.toggle_cuisine(Cuisine::Thai).unwrap();
        assert_eq!(wizard.next(), Err(WizardError::NoCuisineSelected));
    }

    #[test]
    fn surprise_me_sets_sentinel_and_advances() {
        let (_, mut wizard) = wizard();
        wizard.toggle_cuisine(Cuisine::Indian).unwrap();

        wizard.surprise_me().unwrap();

        assert_eq!(wizard.cuisines(), &CuisinePreference::Surprise);
        assert_eq!(wizard.step(), WizardStep::Location);
    }

    #[test]
    fn back_keeps_selection() {
        let (_, mut wizard) = wizard();
        wizard.toggle_cuisine(Cuisine::Mexican).unwrap();
        wizard.toggle_cuisine(Cuisine::Thai).unwrap();
        wizard.next().unwrap();

        wizard.back().unwrap();

        assert_eq!(wizard.step(), WizardStep::Cuisine);
        assert_eq!(
            wizard.cuisines(),
            &CuisinePreference::Selected(vec![Cuisine::Mexican, Cuisine::Thai])
        );
    }

    #[test]
    fn operations_from_the_wrong_step_are_rejected() {
        let (_, mut wizard) = wizard();
        assert_eq!(wizard.back(), Err(WizardError::WrongStep(WizardStep::Cuisine)));
        assert_eq!(
            wizard.complete(LocationSelection::default(), 5000),
            Err(WizardError::WrongStep(WizardStep::Cuisine))
        );

        wizard.surprise_me().unwrap();
        assert_eq!(
            wizard.toggle_cuisine(Cuisine::Thai),
            Err(WizardError::WrongStep(WizardStep::Location))
        );
    }

    #[test]
    fn completion_requires_an_address() {
        let (notices, mut wizard) = wizard();
        wizard.surprise_me().unwrap();

        assert_eq!(
            wizard.complete(LocationSelection::default(), 5000),
            Err(WizardError::MissingLocation)
        );
        assert_eq!(notices.drain()[0].title, "Please enter a location");
    }

    #[test]
    fn completion_emits_preferences() {
        let (_, mut wizard) = wizard();
        wizard.toggle_cuisine(Cuisine::Japanese).unwrap();
        wizard.next().unwrap();
        let location = LocationSelection::resolved("Tokyo", Coordinates { lat: 35.68, lng: 139.76 });

        let preferences = wizard.complete(location.clone(), 3000).unwrap();

        assert_eq!(preferences.cuisines, CuisinePreference::Selected(vec![Cuisine::Japanese]));
        assert_eq!(preferences.location, location);
        assert_eq!(preferences.radius, 3000);
    }
}
