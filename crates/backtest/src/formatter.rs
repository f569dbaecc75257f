#![allow(clippy::format_push_string)]

use crate::metrics::BacktestReport;
use rust_decimal::Decimal;

pub struct ReportFormatter;

impl ReportFormatter {
    #[must_use]
    pub fn format(report: &BacktestReport) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                SENTIMENT BACKTEST RESULTS                     \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        // Time Period
        output.push_str("Time Period\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Symbol:                {}\n", report.symbol));
        match (report.start_time, report.end_time) {
            (Some(start), Some(end)) => {
                output.push_str(&format!("Start:                 {}\n", start.format("%Y-%m-%d %H:%M:%S UTC")));
                output.push_str(&format!("End:                   {}\n", end.format("%Y-%m-%d %H:%M:%S UTC")));
                output.push_str(&format!("Duration:              {} days\n", (end - start).num_days()));
            }
            _ => output.push_str("Start:                 N/A (no bars)\n"),
        }
        output.push('\n');

        // Portfolio Performance
        output.push_str("Portfolio Performance\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Initial Equity:        ${:.2}\n", report.initial_equity));
        output.push_str(&format!("Final Equity:          ${:.2}\n", report.final_equity));
        output.push_str(&format!("Equity Peak:           ${:.2}\n", report.equity_peak));
        output.push_str(&format!(
            "Total Return:          {:.2}%\n",
            report.total_return * Decimal::ONE_HUNDRED
        ));
        output.push_str(&format!(
            "Max Drawdown:          {:.2}%\n",
            report.max_drawdown * Decimal::ONE_HUNDRED
        ));
        output.push_str(&format!("Final Position:        {}\n", report.final_state));
        output.push('\n');

        // Activity
        output.push_str("Strategy Activity\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Ticks:                 {}\n", report.ticks));
        output.push_str(&format!("Orders:                {}\n", report.orders));
        output.push_str(&format!("Flips:                 {}\n", report.flips));
        output.push_str(&format!("Bracket Exits:         {}\n", report.bracket_exits));
        output.push_str(&format!("Skipped (cash):        {}\n", report.skipped_ticks));
        output.push_str(&format!("Errored Ticks:         {}\n", report.errored_ticks));

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        if report.orders == 0 {
            output.push_str("\n⚠️  No orders were placed during this backtest.\n");
            output.push_str("    Consider adjusting thresholds or the news archive range.\n\n");
        }

        output
    }
}
