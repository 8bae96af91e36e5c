//! Crate-level tests

mod test_config;
mod test_executor;
mod test_fsm;
