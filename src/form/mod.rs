pub mod input;
pub mod orchestrator;
pub mod outcome;
pub mod session;
pub mod view;
