use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod context;
mod format;
mod logging;

/// regcopy - copy container images between registries
///
/// Reads the catalog of a source registry, keeps the repositories matching an
/// include pattern and copies every tag to a destination registry through a
/// local container engine.
#[derive(Parser, Debug)]
#[command(name = "regcopy")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: ./application.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Control colored output: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy every matching repository and tag to the destination registry
    Copy {
        /// Remove local images left behind by a failed copy
        #[arg(long)]
        cleanup_on_failure: bool,
        /// Exit with code 2 when any tag failed or repository was skipped
        #[arg(long)]
        fail_on_error: bool,
    },
    /// List what would be copied without running the engine
    Plan {
        /// Output format: pretty, json, yaml
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Display version information
    Version,
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            commands::version::print_version();
            return ExitCode::SUCCESS;
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    let verbosity = context::VerbosityLevel::from_flags(cli.verbose, cli.quiet);
    let color = format::ColorChoice::from(cli.color.as_str());
    logging::init(verbosity);

    let formatter = format::create_formatter(color);
    let ctx = match context::AppContext::build(cli.config.as_deref(), color, verbosity) {
        Ok(ctx) => ctx,
        Err(e) => {
            formatter.error(&format!("Error: {}", e));
            return ExitCode::from(commands::EXIT_FATAL);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            formatter.error(&format!("Unable to start runtime: {}", e));
            return ExitCode::from(commands::EXIT_FATAL);
        }
    };

    let code = runtime.block_on(async {
        match cli.command {
            Commands::Copy {
                cleanup_on_failure,
                fail_on_error,
            } => {
                let options = commands::copy::CopyOptions {
                    cleanup_on_failure,
                    fail_on_error,
                };
                commands::copy::handle_copy(&ctx, options).await
            }
            Commands::Plan { format } => {
                let fmt = format::OutputFormat::from(format.as_str());
                commands::plan::handle_plan(&ctx, fmt).await
            }
            Commands::Version | Commands::Completion { .. } => commands::EXIT_OK,
        }
    });

    ExitCode::from(code)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
