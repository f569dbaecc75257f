//! CLI commands for the sentiment trader.

pub mod backtest;
pub mod classify;
pub mod run;

pub use backtest::{run_backtest, BacktestArgs};
pub use classify::{run_classify, ClassifyArgs};
pub use run::{run_live, RunArgs};
