//! Integration tests for sitehost CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! Every test points `SITEHOST_CONFIG` at a temp directory so nothing under
//! `~/.sitehost` is read or written.

mod site_lifecycle;
