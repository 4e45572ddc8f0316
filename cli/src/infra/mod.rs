//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: the registry document,
//! filesystem access, the OS listener probe and the config file.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod config;
pub mod fs;
pub mod host_registry;
pub mod network;
