//! IDChecker CLI
//!
//! Lists ID records from a 1Password vault, sorted by expiration date.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use idcheck_core::{
    build_report, load_config, render_console, resolve_config_path, validate_output_dir,
    write_csv, CheckError, CheckResult, ReportObserver, Warning, FILTER_TAG, OpClient,
};

#[derive(Parser)]
#[command(name = "idchecker")]
#[command(version)]
#[command(about = "IDChecker - ID records from 1Password, sorted by expiration date")]
#[command(after_help = "EXAMPLES:
  idchecker login https://my.1password.com jane@example.com
  idchecker check                              Print the report
  idchecker check --vault \"Team IDs\" --notes   Include record notes
  idchecker check --dir ./reports              Save report_<datetime>.csv")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to 1Password through the op CLI
    Login {
        /// 1Password account URL
        url: String,
        /// Account e-mail
        username: String,
        /// Path or name of the op executable
        #[arg(long)]
        op: Option<PathBuf>,
    },

    /// Build the expiry report
    Check {
        /// Name of the vault where the IDs are stored
        #[arg(long)]
        vault: Option<String>,
        /// Folder where report_<datetime>.csv is saved (prints to the terminal otherwise)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Add notes from the ID record to the report
        #[arg(long)]
        notes: bool,
        /// Config file (defaults to $IDCHECKER_CONFIG or the user config dir)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path or name of the op executable
        #[arg(long)]
        op: Option<PathBuf>,
    },
}

/// Initialize logging
fn init_logging() {
    // Log to stderr (stdout carries the report)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .compact(),
        )
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        None => {
            println!("IDChecker - ID records from 1Password, sorted by expiration date");
            println!();
            println!("Run 'idchecker --help' for usage information.");
            println!("Run 'idchecker login <url> <username>' to sign in first.");
        }
        Some(cmd) => {
            if let Err(e) = handle_command(cmd).await {
                match e {
                    CheckError::NotSignedIn | CheckError::InvalidOutputDir(_) => {
                        println!("{}", e)
                    }
                    other => eprintln!("Error: {}", other),
                }
                std::process::exit(1);
            }
        }
    }
}

async fn handle_command(cmd: Commands) -> CheckResult<()> {
    match cmd {
        Commands::Login { url, username, op } => {
            handle_login(&url, &username, op).await?;
        }
        Commands::Check {
            vault,
            dir,
            notes,
            config,
            op,
        } => {
            handle_check(vault, dir, notes, config, op).await?;
        }
    }

    Ok(())
}

// === Command Handlers ===

async fn handle_login(url: &str, username: &str, op: Option<PathBuf>) -> CheckResult<()> {
    let mut config = load_config(&resolve_config_path()).await?;
    if let Some(op) = op {
        config.op_binary = op;
    }

    OpClient::from_config(&config).signin(url, username).await
}

async fn handle_check(
    vault: Option<String>,
    dir: Option<PathBuf>,
    notes: bool,
    config_path: Option<PathBuf>,
    op: Option<PathBuf>,
) -> CheckResult<()> {
    if let Some(dir) = &dir {
        validate_output_dir(dir)?;
    }

    let config_path = config_path.unwrap_or_else(resolve_config_path);
    debug!("Loading config from {}", config_path.display());
    let mut config = load_config(&config_path).await?;
    if let Some(vault) = vault {
        config.vault = vault;
    }
    if let Some(op) = op {
        config.op_binary = op;
    }

    let client = OpClient::from_config(&config);
    let mut progress = Progress::stdout();

    progress.line(format_args!("1. Getting a list of all records"));
    let report = build_report(&client, &config, notes, &mut progress).await?;
    progress.finish();

    match dir {
        Some(dir) => {
            let path = write_csv(&report, &dir)?;
            println!("Report saved to {}", path.display());
        }
        None => print!("{}", render_console(&report, terminal_width())),
    }

    Ok(())
}

// === Progress ===

/// Stage messages and a progress bar over the item fetches.
///
/// Messages are written to `out` directly. While a visible bar is drawing
/// they are written inside `ProgressBar::suspend`; a hidden bar (no terminal
/// on its target) is bypassed.
struct Progress<W: Write> {
    out: W,
    draw_target: fn() -> ProgressDrawTarget,
    bar: Option<ProgressBar>,
}

impl Progress<io::Stdout> {
    fn stdout() -> Self {
        Self::new(io::stdout(), ProgressDrawTarget::stderr)
    }
}

impl<W: Write> Progress<W> {
    fn new(out: W, draw_target: fn() -> ProgressDrawTarget) -> Self {
        Self {
            out,
            draw_target,
            bar: None,
        }
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        let out = &mut self.out;
        let mut write = || {
            let _ = writeln!(out, "{}", args);
            let _ = out.flush();
        };
        match &self.bar {
            Some(bar) if !bar.is_hidden() => bar.suspend(write),
            _ => write(),
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
            self.line(format_args!(""));
        }
    }
}

impl<W: Write> ReportObserver for Progress<W> {
    fn on_listed(&mut self, _total: usize) {
        self.line(format_args!("Done"));
        self.line(format_args!("2. Filtering the list by the '{}' tag", FILTER_TAG));
    }

    fn on_filtered(&mut self, count: usize) {
        self.line(format_args!("Done. The number of filtered records: {}", count));
        self.line(format_args!("3. Getting full information about filtered records"));

        let bar = ProgressBar::with_draw_target(Some(count as u64), (self.draw_target)());
        bar.set_style(
            ProgressStyle::with_template(" {percent}% | {wide_bar}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█ "),
        );
        self.bar = Some(bar);
    }

    fn on_item(&mut self, index: usize, _total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_position(index as u64);
        }
    }

    fn on_warning(&mut self, warning: &Warning) {
        self.line(format_args!("{}\n", warning));
    }
}

// === Helper Functions ===

fn terminal_width() -> usize {
    console::Term::stdout()
        .size_checked()
        .map(|(_, cols)| cols as usize)
        .unwrap_or(80)
}
