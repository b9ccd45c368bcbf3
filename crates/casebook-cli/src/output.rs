//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::pipeline::RunReport;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a run report.
    pub fn format_report(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_report_json(report),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(self.format_report_quiet(report)),
        }
    }

    fn format_report_json(&self, report: &RunReport) -> Result<String> {
        let records: Vec<serde_json::Value> = report
            .records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "title": r.title,
                    "actors": r.actors,
                    "preconditions": r.preconditions,
                    "trigger": r.trigger,
                    "main_flow": r.main_flow,
                    "alternative_flows": r.alternative_flows,
                    "postconditions": r.postconditions,
                    "notes": r.notes
                })
            })
            .collect();

        let skipped: Vec<serde_json::Value> = report
            .skipped
            .iter()
            .map(|f| {
                serde_json::json!({
                    "chunk": f.chunk_index,
                    "attempts": f.attempts,
                    "reason": f.reason
                })
            })
            .collect();

        let rejected: Vec<serde_json::Value> = report
            .rejected
            .iter()
            .map(|r| {
                serde_json::json!({
                    "line": r.line_number,
                    "input": r.input,
                    "reason": r.reason.to_string()
                })
            })
            .collect();

        let recipients: Vec<&str> = report.recipients.iter().map(|r| r.as_str()).collect();

        let json = serde_json::json!({
            "run_id": report.run_id.to_string(),
            "model": report.model_name,
            "chunks": report.chunk_count,
            "processing_time_ms": report.processing_time_ms,
            "records": records,
            "skipped_chunks": skipped,
            "recipients": recipients,
            "rejected_recipients": rejected,
            "document": {
                "file_name": report.document_name,
                "bytes": report.document_bytes,
                "saved_to": report.saved_to.as_ref().map(|p| p.display().to_string())
            },
            "sent": report.sent
        });

        Ok(serde_json::to_string_pretty(&json)?)
    }

    fn format_report_table(&self, report: &RunReport) -> String {
        let mut lines = Vec::new();

        if report.records.is_empty() {
            lines.push(self.warning("No use cases extracted."));
        } else {
            let mut builder = Builder::default();
            builder.push_record(["#", "Title", "Actors", "Steps", "Alternatives"]);

            for (idx, record) in report.records.iter().enumerate() {
                builder.push_record([
                    (idx + 1).to_string(),
                    record.title.clone(),
                    record.actors.join(", "),
                    record.main_flow.len().to_string(),
                    record.alternative_flows.len().to_string(),
                ]);
            }

            let mut table = builder.build();
            table
                .with(Style::rounded())
                .with(Modify::new(Rows::first()).with(Alignment::center()));
            lines.push(table.to_string());
        }

        for failure in &report.skipped {
            lines.push(self.warning(&format!(
                "Chunk {} skipped after {} attempt(s): {}",
                failure.chunk_index, failure.attempts, failure.reason
            )));
        }
        for rejection in &report.rejected {
            lines.push(self.warning(&format!(
                "Recipient line {} rejected ({}): {}",
                rejection.line_number, rejection.reason, rejection.input
            )));
        }

        lines.push(self.info(&format!(
            "Run {} | {} | {} chunk(s) | {} ms",
            report.run_id.short(),
            report.model_name,
            report.chunk_count,
            report.processing_time_ms
        )));

        if let Some(path) = &report.saved_to {
            lines.push(self.success(&format!(
                "Saved {} ({} bytes)",
                path.display(),
                report.document_bytes
            )));
        }
        if report.sent {
            lines.push(self.success(&format!(
                "Sent {} to {} recipient(s)",
                report.document_name,
                report.recipients.len()
            )));
        }

        lines.join("\n")
    }

    fn format_report_quiet(&self, report: &RunReport) -> String {
        let titles: Vec<&str> = report.records.iter().map(|r| r.title.as_str()).collect();
        titles.join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
