//! Foundation utilities shared across the shell

pub mod logging;
pub mod tasks;
