//! Command implementations

pub mod config;
pub mod create;
pub mod delete;
pub mod dev;
pub mod status;
pub mod version;
