// C Mastery Playground: runnable C concept snippets in the terminal

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use cmastery::catalog::Catalog;
use cmastery::runner::SnippetRunner;
use cmastery::ui::App;

#[derive(Parser)]
#[command(name = "cmastery")]
#[command(about = "A terminal playground of runnable C concept snippets", long_about = None)]
struct Cli {
    /// Print the numbered concept titles and exit
    #[arg(long, conflicts_with = "run")]
    list: bool,

    /// Run one concept headlessly: a 1-based number or an exact title
    #[arg(long, value_name = "ENTRY")]
    run: Option<String>,

    /// With --run, print real newlines instead of line-break markers
    #[arg(long, requires = "run")]
    raw: bool,

    /// Write diagnostics to this file (the only log sink in TUI mode)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `cmastery::runner=trace`; falls back to RUST_LOG
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn is_headless(&self) -> bool {
        self.list || self.run.is_some()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_main(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> Result<ExitCode> {
    init_logging(&cli)?;

    let catalog = Catalog::builtin();

    if cli.list {
        for (index, entry) in catalog.entries().iter().enumerate() {
            println!("{:>2}  {}", index + 1, entry.title());
        }
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(key) = &cli.run {
        return run_headless(&catalog, key, cli.raw);
    }

    run_tui(catalog)?;
    Ok(ExitCode::SUCCESS)
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level '{}'", level))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("could not create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        // The TUI owns the terminal; without a log file it logs nowhere
        None if !cli.is_headless() => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn run_headless(catalog: &Catalog, key: &str, raw: bool) -> Result<ExitCode> {
    let (_, entry) = catalog.lookup(key).with_context(|| {
        format!(
            "no concept '{}' (use a number from 1 to {} or an exact title; see --list)",
            key,
            catalog.len()
        )
    })?;

    let runner = SnippetRunner::new();
    if raw {
        return match runner.execute(entry.source()) {
            Ok(captured) => {
                print!("{}", captured);
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                eprintln!("{}", err);
                Ok(ExitCode::FAILURE)
            }
        };
    }

    let result = runner.run(entry.source());
    println!("{}", result.output);
    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_tui(catalog: Catalog) -> Result<()> {
    enable_raw_mode().context("could not enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("could not enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("could not create terminal")?;

    let mut app = App::new(catalog);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("terminal UI failed")
}
