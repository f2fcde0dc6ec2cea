use std::sync::Arc;
use std::time::Duration;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};
use crate::models::cuisine::{Cuisine, UnknownCuisine};
use crate::models::location::{LocationSelection, PlacePrediction};
use crate::models::notification::{NoticeBuffer, Notification, Notifier};
use crate::models::restaurant::Restaurant;
use crate::repositories::places_repo::PlacesClient;
use crate::services::geolocation::Geolocator;
use crate::services::location_resolver::{LocationError, LocationResolver};
use crate::services::restaurant_service::RestaurantService;
use crate::services::result_browser::ResultBrowser;
use crate::services::wizard::{SelectionWizard, WizardError, WizardStep};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    UnknownCuisine(#[from] UnknownCuisine),
    #[error("not available while {0}")]
    WrongPhase(&'static str),
}

impl SessionError {
    /// The user was told what to fix and can carry on from where they are.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SessionError::Wizard(WizardError::WrongStep(_)) => false,
            SessionError::Wizard(_) | SessionError::Location(_) => true,
            SessionError::UnknownCuisine(_) | SessionError::WrongPhase(_) => false,
        }
    }
}

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Cuisine,
    Location,
    Browsing,
}

#[derive(Clone, Serialize, Debug)]
pub struct SessionView {
    pub session_id: String,
    pub phase: PhaseName,
    pub cuisines: Vec<String>,
    pub search_text: String,
    pub radius_km: f64,
    pub location_error: Option<String>,
    pub predictions: Vec<PlacePrediction>,
    pub restaurant: Option<Restaurant>,
    pub position: Option<usize>,
    pub total: Option<usize>,
    pub notices: Vec<Notification>,
}

enum SessionPhase {
    Onboarding {
        wizard: SelectionWizard,
        resolver: LocationResolver,
    },
    Browsing {
        browser: ResultBrowser,
    },
}

/// One user's way through the wizard and the recommendations it produced.
pub struct DiscoverySession {
    id: String,
    phase: SessionPhase,
    notices: Arc<NoticeBuffer>,
    places: Arc<PlacesClient>,
    restaurants: Arc<RestaurantService>,
    debounce: Duration,
    last_active: OffsetDateTime,
}

impl DiscoverySession {
    pub fn new(
        id: String,
        places: Arc<PlacesClient>,
        restaurants: Arc<RestaurantService>,
        debounce: Duration,
    ) -> Self {
        let notices = Arc::new(NoticeBuffer::new());
        let phase = onboarding(&places, &notices, debounce);
        Self {
            id,
            phase,
            notices,
            places,
            restaurants,
            debounce,
            last_active: OffsetDateTime::now_utc(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn last_active(&self) -> OffsetDateTime {
        self.last_active
    }

    pub fn touch(&mut self) {
        self.last_active = OffsetDateTime::now_utc();
    }

    pub fn phase(&self) -> PhaseName {
        match &self.phase {
            SessionPhase::Onboarding { wizard, .. } => match wizard.step() {
                WizardStep::Cuisine => PhaseName::Cuisine,
                WizardStep::Location => PhaseName::Location,
            },
            SessionPhase::Browsing { .. } => PhaseName::Browsing,
        }
    }

    fn start_over(&mut self) {
        self.phase = onboarding(&self.places, &self.notices, self.debounce);
    }

    fn wizard(&mut self) -> Result<&mut SelectionWizard, SessionError> {
        return match &mut self.phase {
            SessionPhase::Onboarding { wizard, .. } => Ok(wizard),
            SessionPhase::Browsing { .. } => Err(SessionError::WrongPhase("browsing")),
        };
    }

    /// The resolver is only reachable once the wizard is on its location step.
    fn resolver(&mut self) -> Result<&mut LocationResolver, SessionError> {
        return match &mut self.phase {
            SessionPhase::Onboarding { wizard, resolver } => {
                if wizard.step() != WizardStep::Location {
                    return Err(WizardError::WrongStep(wizard.step()).into());
                }
                Ok(resolver)
            }
            SessionPhase::Browsing { .. } => Err(SessionError::WrongPhase("browsing")),
        };
    }

    fn browser(&mut self) -> Result<&mut ResultBrowser, SessionError> {
        return match &mut self.phase {
            SessionPhase::Browsing { browser } => Ok(browser),
            SessionPhase::Onboarding { .. } => Err(SessionError::WrongPhase("onboarding")),
        };
    }

    pub fn toggle_cuisine(&mut self, cuisine_id: &str) -> Result<(), SessionError> {
        let cuisine: Cuisine = cuisine_id.parse()?;
        self.wizard()?.toggle_cuisine(cuisine)?;
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), SessionError> {
        self.wizard()?.next()?;
        Ok(())
    }

    pub fn surprise_me(&mut self) -> Result<(), SessionError> {
        self.wizard()?.surprise_me()?;
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), SessionError> {
        self.wizard()?.back()?;
        Ok(())
    }

    pub fn set_radius_km(&mut self, radius_km: f64) -> Result<f64, SessionError> {
        Ok(self.resolver()?.set_radius_km(radius_km))
    }

    pub fn predictions(&self) -> Result<Vec<PlacePrediction>, SessionError> {
        return match &self.phase {
            SessionPhase::Onboarding { wizard, resolver } => {
                if wizard.step() != WizardStep::Location {
                    return Err(WizardError::WrongStep(wizard.step()).into());
                }
                Ok(resolver.predictions())
            }
            SessionPhase::Browsing { .. } => Err(SessionError::WrongPhase("browsing")),
        };
    }

    pub fn set_search_text(&mut self, text: &str) -> Result<(), SessionError> {
        self.resolver()?.set_search_text(text);
        Ok(())
    }

    pub async fn select_prediction(
        &mut self,
        prediction: &PlacePrediction,
        geolocator: &dyn Geolocator,
    ) -> Result<(), SessionError> {
        let location = self.resolver()?.select_prediction(prediction, geolocator).await?;
        self.finish_onboarding(location).await
    }

    pub async fn use_current_location(
        &mut self,
        geolocator: &dyn Geolocator,
    ) -> Result<(), SessionError> {
        let location = self.resolver()?.use_current_location(geolocator).await?;
        self.finish_onboarding(location).await
    }

    pub async fn submit_location(&mut self) -> Result<(), SessionError> {
        let location = self.resolver()?.submit().await?;
        self.finish_onboarding(location).await
    }

    async fn finish_onboarding(&mut self, location: LocationSelection) -> Result<(), SessionError> {
        let preferences = match &self.phase {
            SessionPhase::Onboarding { wizard, resolver } => {
                wizard.complete(location, resolver.radius_meters())?
            }
            SessionPhase::Browsing { .. } => return Err(SessionError::WrongPhase("browsing")),
        };

        let restaurants = match self.restaurants.fetch_restaurants(&preferences).await {
            Ok(restaurants) => restaurants,
            Err(e) => {
                warn!("Something went wrong fetching restaurants for session {} due to: {}", self.id, e);
                self.notices.notify(Notification::destructive(
                    "Oops! Something went wrong",
                    "Please try again",
                ));
                self.start_over();
                return Ok(());
            }
        };

        match ResultBrowser::new(restaurants, self.notices.clone()) {
            Ok(browser) => {
                info!("Session {} is browsing {} restaurants", self.id, browser.len());
                self.phase = SessionPhase::Browsing { browser };
            }
            Err(_) => self.start_over(),
        }
        Ok(())
    }

    pub fn try_another(&mut self) -> Result<(), SessionError> {
        self.browser()?.try_another();
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), SessionError> {
        if !matches!(self.phase, SessionPhase::Browsing { .. }) {
            return Err(SessionError::WrongPhase("onboarding"));
        }

        let previous = std::mem::replace(
            &mut self.phase,
            onboarding(&self.places, &self.notices, self.debounce),
        );
        if let SessionPhase::Browsing { browser } = previous {
            browser.restart();
        }
        Ok(())
    }

    /// Current state plus every notice raised since the last view.
    pub fn view(&self) -> SessionView {
        let mut view = SessionView {
            session_id: self.id.clone(),
            phase: self.phase(),
            cuisines: Vec::new(),
            search_text: String::new(),
            radius_km: 0.0,
            location_error: None,
            predictions: Vec::new(),
            restaurant: None,
            position: None,
            total: None,
            notices: self.notices.drain(),
        };

        match &self.phase {
            SessionPhase::Onboarding { wizard, resolver } => {
                view.cuisines = wizard.cuisines().ids();
                view.search_text = resolver.search_text().to_string();
                view.radius_km = resolver.radius_km();
                view.location_error = resolver.location_error().map(str::to_string);
                view.predictions = resolver.predictions();
            }
            SessionPhase::Browsing { browser } => {
                view.restaurant = Some(browser.current().clone());
                view.position = Some(browser.index());
                view.total = Some(browser.len());
            }
        }
        view
    }
}

fn onboarding(
    places: &Arc<PlacesClient>,
    notices: &Arc<NoticeBuffer>,
    debounce: Duration,
) -> SessionPhase {
    let notifier: Arc<dyn Notifier> = notices.clone();
    SessionPhase::Onboarding {
        wizard: SelectionWizard::new(notifier.clone()),
        resolver: LocationResolver::new(places.clone(), notifier, debounce),
    }
}
