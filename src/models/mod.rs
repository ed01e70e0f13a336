pub mod process;
pub mod report;
pub mod target;

pub use process::{ProcessRecord, TerminationMethod, TerminationOutcome};
pub use report::{AutostartEntry, CycleReport, ProcessResult, SkipReason, StartupReport, SweepAction};
pub use target::{ApplicationIdentifier, InstalledApp, TargetSpec, FAMILY_MARKER};
