// Domain layer - Glucose regulation core (model, controller, driver)
pub mod controller;
pub mod dataset;
pub mod error;
pub mod glucose;
pub mod model;
pub mod simulation;
pub mod stream;
