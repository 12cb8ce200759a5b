use super::{EXIT_FAILURES, EXIT_FATAL, EXIT_OK};
use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, ColorChoice};
use libregcopy::{Copier, CopySummary};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Flags of the copy subcommand
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOptions {
    /// Remove local images left behind by a failed copy
    pub cleanup_on_failure: bool,
    /// Exit with a distinct code when any tag failed
    pub fail_on_error: bool,
}

#[derive(Debug, Tabled)]
struct FailureRow {
    #[tabled(rename = "IMAGE")]
    image: String,
    #[tabled(rename = "STEP")]
    step: String,
    #[tabled(rename = "ERROR")]
    error: String,
}

#[derive(Debug, Tabled)]
struct SkippedRow {
    #[tabled(rename = "REPOSITORY")]
    repository: String,
    #[tabled(rename = "ERROR")]
    error: String,
}

/// Handle the copy subcommand and return the process exit code
pub async fn handle_copy(ctx: &AppContext, options: CopyOptions) -> u8 {
    let formatter = format::create_formatter(ctx.color);

    let mut app = ctx.config.app.clone();
    if options.cleanup_on_failure {
        app.cleanup_on_failure = true;
    }

    let copier = match Copier::from_config(&app) {
        Ok(copier) => copier,
        Err(e) => {
            formatter.error(&format!("Error: {}", e));
            return EXIT_FATAL;
        }
    };

    tracing::debug!(config = %ctx.config_path.display(), "starting copy");
    match copier.run().await {
        Ok(summary) => {
            if ctx.verbosity >= VerbosityLevel::Verbose && !summary.copied.is_empty() {
                println!("{}", render_copied(&summary, ctx.color));
            }
            println!("{}", render_summary(&summary, ctx.color));
            exit_code(&summary, options.fail_on_error)
        }
        Err(e) => {
            formatter.error(&format!("Copy aborted: {}", e));
            EXIT_FATAL
        }
    }
}

/// Exit code for a finished run
pub fn exit_code(summary: &CopySummary, fail_on_error: bool) -> u8 {
    if fail_on_error && !summary.is_clean() {
        EXIT_FAILURES
    } else {
        EXIT_OK
    }
}

/// One line per copied image
pub fn render_copied(summary: &CopySummary, color: ColorChoice) -> String {
    summary
        .copied
        .iter()
        .map(|job| format!("{} {} -> {}", format::checkmark(color), job.source, job.target))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable summary of a run
pub fn render_summary(summary: &CopySummary, color: ColorChoice) -> String {
    let mut lines = vec![format!(
        "{} {} copied, {} failed, {} skipped",
        if summary.is_clean() {
            format::checkmark(color)
        } else {
            format::error_mark(color)
        },
        summary.succeeded(),
        summary.failed(),
        summary.skipped.len()
    )];

    if !summary.failures.is_empty() {
        let rows: Vec<FailureRow> = summary
            .failures
            .iter()
            .map(|f| FailureRow {
                image: f.job.source.to_string(),
                step: f.step.to_string(),
                error: f.error.clone(),
            })
            .collect();
        lines.push(String::new());
        lines.push(Table::new(&rows).with(Style::empty()).to_string());
    }

    if !summary.skipped.is_empty() {
        let rows: Vec<SkippedRow> = summary
            .skipped
            .iter()
            .map(|s| SkippedRow {
                repository: s.repository.clone(),
                error: s.error.clone(),
            })
            .collect();
        lines.push(String::new());
        lines.push(Table::new(&rows).with(Style::empty()).to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
#[path = "copy_tests.rs"]
mod tests;
