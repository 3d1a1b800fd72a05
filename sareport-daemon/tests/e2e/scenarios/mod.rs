//! E2E test scenarios.
//!
//! - `pipeline_flow` -- report file to JSON result and archive
//! - `shutdown` -- signal-driven stop of all pipeline tasks
//! - `config_error` -- invalid configuration is rejected before start
//! - `fault_isolation` -- bad reports and lost input directory do not corrupt other work

mod config_error;
mod fault_isolation;
mod pipeline_flow;
mod shutdown;
