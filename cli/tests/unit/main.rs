//! Unit tests for sitehost CLI
//!
//! These tests use in-memory fakes for the host, filesystem and listener
//! table and run fast without external I/O.

mod config_service;
mod pool_manager;
mod property_tests;
mod site_deprovisioner;
mod site_status;
