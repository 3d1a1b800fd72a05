//! E2E integration tests for sareport-daemon.
//!
//! These tests run the real orchestrator against temporary directories and
//! validate report flow, shutdown, configuration handling and fault isolation.
//!
//! # Test Structure
//!
//! - `helpers/` -- Shared test utilities (workspace builder, report fixtures, file assertions)
//! - `scenarios/` -- Test files organized by scenario
//!
//! # Running
//!
//! ```bash
//! cargo test -p sareport-daemon --test e2e
//! ```

mod helpers;
mod scenarios;
