use crate::error::GitLogError;
use crate::report::ReportStyle;
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status for a run that failed after the history walk started.
pub const EXIT_RUN_FAILED: u8 = 5;

#[derive(Parser, Debug)]
#[command(name = "git-log-json")]
#[command(about = "Forensic git history analyser: one JSON record per file changed by each commit")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, help = "Path to git repository")]
    pub path: PathBuf,

    #[arg(short, long, help = "Branch to analyse, defaults to the current active branch")]
    pub branch: Option<String>,

    #[arg(short, long, help = "Name of analysis results file")]
    pub output_file: PathBuf,

    #[arg(short, long, help = "Indent the output and print debugging information to stderr")]
    pub debug: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn report_style(&self) -> ReportStyle {
        if self.debug {
            ReportStyle::Pretty
        } else {
            ReportStyle::Compact
        }
    }

    pub fn log_level(&self) -> tracing::Level {
        if self.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }

    /// Diagnostics go to stderr; `RUST_LOG` can add directives on top.
    pub fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(self.log_level().into()))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    pub fn execute(self) -> ExitCode {
        self.init_logging();

        match crate::report::exec(&self) {
            Ok(_) => ExitCode::SUCCESS,
            Err(err) => match err.downcast_ref::<GitLogError>() {
                Some(config) if config.is_configuration() => {
                    eprintln!("{config}. Terminating.");
                    ExitCode::from(config.exit_code())
                }
                _ => {
                    eprintln!("{} {err:#}", style("Error:").red().bold());
                    ExitCode::from(EXIT_RUN_FAILED)
                }
            },
        }
    }
}
