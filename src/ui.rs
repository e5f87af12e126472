//! Terminal output for the JobBuddy client — spinner and colored results.
//!
//! Uses `indicatif` for the progress spinner and `console` for styling. The
//! [`GenerationProgress`] tracks one generation session on screen.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::generation::{GeneratedDocument, PollOutcome, SessionState};

/// Visual progress indicator for one generation session.
pub struct GenerationProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl GenerationProgress {
    /// Start the spinner for the given cover letter id.
    pub fn start(job_id: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("Generating cover letter {job_id}..."));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Stop the spinner and print the final session state.
    pub fn complete(&self, state: &SessionState, attempts: u32) {
        self.pb.finish_and_clear();
        match state {
            SessionState::Succeeded { .. } => {
                println!(
                    "  {} Generation finished after {attempts} poll(s)",
                    self.green.apply_to("✓")
                );
            }
            SessionState::Failed { kind, message } => {
                println!(
                    "  {} Generation failed ({kind}): {message}",
                    self.red.apply_to("✗")
                );
            }
            other => {
                println!(
                    "  {} Polling stopped in state {other} after {attempts} poll(s)",
                    self.yellow.apply_to("…")
                );
            }
        }
    }

    /// Print the normalized document the way the download page renders it.
    pub fn print_document(&self, document: &GeneratedDocument) {
        println!();
        if !document.title.is_empty() {
            println!("{}", self.green.apply_to(&document.title));
            println!();
        }
        println!("{}", document.flat_text);
        if let Some(preview) = &document.preview_ref {
            println!();
            println!("  preview: {preview}");
        }
    }
}

/// One-line rendering of a single classified status probe.
pub fn print_poll_outcome(outcome: &PollOutcome) {
    let green = Style::new().green().bold();
    let red = Style::new().red().bold();
    let yellow = Style::new().yellow();

    match outcome {
        PollOutcome::Succeeded { .. } => {
            println!("{} SUCCESS: result is ready", green.apply_to("✓"));
        }
        PollOutcome::StillProcessing => {
            println!(
                "{} PROCESSING: generation still running",
                yellow.apply_to("…")
            );
        }
        PollOutcome::RetryableConflict => {
            println!(
                "{} NOT READY: job accepted but not materialized yet",
                yellow.apply_to("…")
            );
        }
        PollOutcome::Fatal { kind, message } => {
            println!("{} {kind}: {message}", red.apply_to("✗"));
        }
    }
}
