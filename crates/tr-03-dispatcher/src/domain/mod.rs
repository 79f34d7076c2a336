//! Domain layer for the Dispatcher

pub mod errors;
pub mod gas;
