pub mod data_provider;
pub mod execution;
pub mod formatter;
pub mod metrics;
pub mod runner;

pub use data_provider::{Bar, HistoricalBars, NewsArchive};
pub use execution::{BracketExit, ExitKind, SimulatedBroker};
pub use formatter::ReportFormatter;
pub use metrics::{BacktestReport, EquityTracker};
pub use runner::BacktestRunner;
