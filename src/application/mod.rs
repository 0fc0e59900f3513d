// Application layer - Use cases driving the simulation core
pub mod batch_service;
pub mod dataset_service;
pub mod live_session_service;
pub mod pacer;
pub mod run_request;
