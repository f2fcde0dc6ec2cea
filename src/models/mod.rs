pub mod cuisine;
pub mod location;
pub mod notification;
pub mod places_response;
pub mod preferences;
pub mod restaurant;
