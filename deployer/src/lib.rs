//! VMware Orchestrator plug-in deployer
//!
//! Uploads a plug-in bundle to an Orchestrator server, optionally deleting
//! the previous package first, then optionally restarts the service and
//! waits for it to come back and for pending configuration to be applied.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod utils;
