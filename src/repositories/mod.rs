pub mod places_repo;
pub mod session_repo;
