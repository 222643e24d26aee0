//! The `nback report` command.

use std::path::Path;

use anyhow::Result;
use comfy_table::Table;

use nback_core::summary::SessionSummary;

pub fn execute(path: &Path) -> Result<()> {
    let summary = SessionSummary::load_json(path)?;

    println!("Session {}", summary.id);
    println!(
        "Subject: {} <{}>",
        summary.subject_first_name, summary.subject_email
    );
    println!("Recorded: {}", summary.recorded_at.to_rfc3339());

    let mut table = Table::new();
    table.set_header(vec!["Test", "Trials", "Correct", "Incorrect", "Accuracy", "Status"]);
    table.add_row(vec![
        summary.test_type(),
        summary.total_trials.to_string(),
        summary.correct.to_string(),
        summary.incorrect.to_string(),
        format!("{:.2}%", summary.accuracy),
        summary.status.to_string(),
    ]);
    println!("\n{table}");

    Ok(())
}
