//! Bridge between the page controller and the backend worker thread.

pub mod commands;
pub mod runtime;
