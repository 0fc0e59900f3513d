//! Closed-loop blood-glucose simulation: a noisy virtual patient regulated by a
//! PID-driven insulin pump, served over HTTP for teaching control theory.
//!
//! Not a medical device.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
