use super::{EXIT_FATAL, EXIT_OK};
use crate::context::AppContext;
use crate::format::{self, Formattable, OutputFormat};
use libregcopy::{CopyPlan, Copier};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Tabled)]
struct PlanRow {
    #[tabled(rename = "REPOSITORY")]
    repository: String,
    #[tabled(rename = "COUNT")]
    count: usize,
    #[tabled(rename = "TAGS")]
    tags: String,
}

impl Formattable for CopyPlan {
    fn format_pretty(&self) -> String {
        let mut lines = Vec::new();

        if self.repositories.is_empty() {
            lines.push("No repositories match the include pattern.".to_string());
        } else {
            let rows: Vec<PlanRow> = self
                .repositories
                .iter()
                .map(|r| PlanRow {
                    repository: r.repository.clone(),
                    count: r.tags.len(),
                    tags: r.tags.join(", "),
                })
                .collect();
            lines.push(Table::new(&rows).with(Style::empty()).to_string());
        }

        for skipped in &self.skipped {
            lines.push(format!("skipped {}: {}", skipped.repository, skipped.error));
        }

        lines.push(format!(
            "{} repositories, {} tags to copy",
            self.repositories.len(),
            self.tag_count()
        ));
        lines.join("\n")
    }
}

/// Handle the plan subcommand and return the process exit code
pub async fn handle_plan(ctx: &AppContext, output: OutputFormat) -> u8 {
    let formatter = format::create_formatter(ctx.color);

    let plan = match Copier::from_config(&ctx.config.app) {
        Ok(copier) => copier.plan().await,
        Err(e) => Err(e),
    };

    let plan = match plan {
        Ok(plan) => plan,
        Err(e) => {
            formatter.error(&format!("Error: {}", e));
            return EXIT_FATAL;
        }
    };

    match format::format_output(&plan, output) {
        Ok(rendered) => {
            println!("{}", rendered);
            EXIT_OK
        }
        Err(e) => {
            formatter.error(&format!("Error formatting output: {}", e));
            EXIT_FATAL
        }
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
