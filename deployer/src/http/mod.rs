//! HTTP access to the Orchestrator server

pub mod api;
pub mod client;
pub mod control_center;
pub mod endpoint;
pub mod packages;
pub mod plugins;
pub mod transport;
