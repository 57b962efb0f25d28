//! Run Report
//!
//! Summarises an execution record as one line per step: status, attempt
//! count, duration of the latest attempt and error message.

use colored::Colorize;

use crate::workflow::{ExecutionRecord, StepStatus};

/// Width of the action column.
const ACTION_WIDTH: usize = 14;
const STATUS_WIDTH: usize = 14;

/// One step of a [`RunReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepLine {
    pub index: usize,
    pub action: String,
    pub status: StepStatus,
    pub attempts: u32,
    pub duration_ms: Option<i64>,
    pub error: Option<String>,
}

/// Snapshot of a run for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run_id: String,
    pub completed: bool,
    pub steps: Vec<StepLine>,
}

impl RunReport {
    pub fn from_record(record: &ExecutionRecord) -> Self {
        let steps = record
            .actions()
            .iter()
            .zip(record.action_states())
            .enumerate()
            .map(|(index, (action, state))| StepLine {
                index,
                action: action.clone(),
                status: state.status,
                attempts: state.attempts,
                duration_ms: state.duration_ms(),
                error: state.error.clone(),
            })
            .collect();

        Self {
            run_id: record.id().to_string(),
            completed: record.is_completed(),
            steps,
        }
    }

    /// Total attempts across all steps.
    pub fn total_attempts(&self) -> u32 {
        self.steps.iter().map(|s| s.attempts).sum()
    }

    /// Renders the report as a text table.
    pub fn render(&self) -> String {
        let mut output = format!("\nRun {}:\n\n", self.run_id);

        for step in &self.steps {
            let duration = step
                .duration_ms
                .map_or_else(|| "-".to_string(), |ms| format!("{} ms", ms));

            output.push_str(&format!(
                "{:>3} {} | {} | attempts: {} | {}",
                step.index,
                truncate(&step.action, ACTION_WIDTH),
                colorize(step.status),
                step.attempts,
                duration
            ));

            if let Some(ref error) = step.error {
                output.push_str(&format!(" | {}", error));
            }
            output.push('\n');
        }

        let outcome = if self.completed {
            "completed".green().to_string()
        } else {
            "incomplete".yellow().to_string()
        };
        output.push_str(&format!(
            "\nStatus: {} ({} attempts)\n",
            outcome,
            self.total_attempts()
        ));
        output
    }
}

/// Colors the status after padding it, so escape codes do not eat the width.
fn colorize(status: StepStatus) -> String {
    let text = format!("{:<width$}", status.to_string(), width = STATUS_WIDTH);
    match status {
        StepStatus::Succeeded => text.green().to_string(),
        StepStatus::Failed => text.red().to_string(),
        StepStatus::Started => text.yellow().to_string(),
        StepStatus::NotExecuted => text.dimmed().to_string(),
    }
}

/// Pads or truncates a string to a fixed width.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{to_document, Document};
    use serde_json::json;

    fn record() -> ExecutionRecord {
        let mut record = ExecutionRecord::new(
            "run-42",
            to_document(json!({"a": 1})),
            vec!["print".to_string(), "fail_random".to_string(), "echo".to_string()],
        );
        record.begin_step(0).unwrap();
        record.succeed_step(0, Document::new()).unwrap();
        record.begin_step(1).unwrap();
        record.fail_step(1, None, "random fail").unwrap();
        record
    }

    #[test]
    fn test_report_from_record() {
        let report = RunReport::from_record(&record());

        assert_eq!(report.run_id, "run-42");
        assert!(!report.completed);
        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.steps[1].status, StepStatus::Failed);
        assert_eq!(report.steps[1].error.as_deref(), Some("random fail"));
        assert_eq!(report.steps[2].attempts, 0);
        assert_eq!(report.total_attempts(), 2);
    }

    #[test]
    fn test_render_contains_steps() {
        let text = RunReport::from_record(&record()).render();

        assert!(text.contains("run-42"));
        assert!(text.contains("print"));
        assert!(text.contains("succeeded"));
        assert!(text.contains("random fail"));
        assert!(text.contains("incomplete"));
    }

    #[test]
    fn test_render_completed() {
        let mut record = ExecutionRecord::new("done", Document::new(), vec!["echo".to_string()]);
        record.begin_step(0).unwrap();
        record.succeed_step(0, Document::new()).unwrap();
        record.mark_completed();

        let text = RunReport::from_record(&record).render();
        assert!(text.contains("completed"));
        assert!(!text.contains("incomplete"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("echo", 6), "echo  ");
        assert_eq!(truncate("a_very_long_action_name", 10), "a_very_...");
    }

    #[test]
    fn test_truncate_narrow_width() {
        assert_eq!(truncate("abcdef", 2), "...");
        assert_eq!(truncate("abcdef", 0), "...");
    }

    #[test]
    fn test_status_padded_before_coloring() {
        for status in [
            StepStatus::NotExecuted,
            StepStatus::Started,
            StepStatus::Succeeded,
            StepStatus::Failed,
        ] {
            let padded = format!("{:<14}", status.to_string());
            assert!(colorize(status).contains(&padded), "{:?}", status);
        }

        let rendered = RunReport::from_record(&record()).render();
        assert!(rendered.contains("not executed  "));
    }
}
