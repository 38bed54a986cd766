//! Offline data tools: CSV sample export and upstream API probes.

pub mod export;
pub mod probe;

pub use export::{run_export, ExportReport, ExportSummary};
pub use probe::{run_probe, ProbeReport, ProbeResult};
