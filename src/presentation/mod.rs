// Presentation layer - HTTP routes over the simulation services
pub mod app_state;
pub mod error;
pub mod handlers;
pub mod router;
