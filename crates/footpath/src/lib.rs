//! Headless host for Footpath mob movement
//!
//! Loads layered configuration, builds a named scenario, and records what
//! every mob does tick by tick.

pub mod config;
pub mod scenario;
pub mod trace;

pub use config::{OutputFormat, RunConfig, SimConfig};
pub use scenario::Scenario;
pub use trace::{MobSummary, Recorder, TraceFrame, TraceSummary};
