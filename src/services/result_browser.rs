use std::sync::Arc;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use crate::models::notification::{Notification, Notifier};
use crate::models::restaurant::Restaurant;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("no restaurants found")]
pub struct NoRestaurants;

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Advance {
    Next,
    Wrapped,
}

/// One restaurant at a time out of a single search's results.
pub struct ResultBrowser {
    restaurants: Vec<Restaurant>,
    index: usize,
    notifier: Arc<dyn Notifier>,
}

impl ResultBrowser {
    pub fn new(
        restaurants: Vec<Restaurant>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, NoRestaurants> {
        if restaurants.is_empty() {
            notifier.notify(Notification::destructive(
                "No restaurants found",
                "Try different cuisines or location",
            ));
            return Err(NoRestaurants);
        }

        Ok(Self {
            restaurants,
            index: 0,
            notifier,
        })
    }

    pub fn current(&self) -> &Restaurant {
        &self.restaurants[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn try_another(&mut self) -> Advance {
        if self.index + 1 < self.restaurants.len() {
            self.index += 1;
            return Advance::Next;
        }

        self.index = 0;
        self.notifier.notify(Notification::info(
            "Starting over",
            "You've seen all suggestions, showing them again",
        ));
        Advance::Wrapped
    }

    /// Drops the results; the caller goes back to a fresh wizard.
    pub fn restart(self) {
        debug!("Discarding {} browsed restaurants", self.restaurants.len());
    }
}
