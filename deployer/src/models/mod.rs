//! Domain models

pub mod bundle;
pub mod outcome;
pub mod report;
pub mod status;
