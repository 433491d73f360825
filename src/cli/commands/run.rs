//! Run command implementation
//!
//! Streams lines through the engine, then releases the mapping state
//! before anything else happens.

use crate::anonymization::{Engine, StatsReport};
use crate::config::load_config;
use crate::domain::Result;
use crate::{log_error_with_context, log_run_complete};
use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const IO_BUFFER_SIZE: usize = 64 * 1024;

/// Stats report format
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatsFormat {
    /// `rule: count` lines
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Print per-rule stats to stderr (overrides [engine] stats)
    #[arg(long)]
    pub stats: bool,

    /// Format of the stats report
    #[arg(long, value_enum, default_value_t = StatsFormat::Text)]
    pub stats_format: StatsFormat,

    /// Read from this file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RunArgs {
    /// Execute the run command
    pub fn execute(&self, config_path: &Path) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path.display(), "Starting run");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("config error: {e}");
                return Ok(2);
            }
        };
        if self.stats {
            config.engine.stats = true;
        }

        let mut engine = match Engine::new(&config) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("engine error: {e}");
                return Ok(2);
            }
        };

        let start = Instant::now();
        let result = self.stream(&mut engine);
        let lines = engine.lines_processed();
        engine.close();

        if let Err(e) = result {
            log_error_with_context!(&e, "Run aborted");
            eprintln!("run error: {e}");
            return Ok(5);
        }

        let report = StatsReport::new(&engine.stats_snapshot(), lines);
        log_run_complete!(lines, report.total_replacements, start.elapsed());

        if engine.stats_enabled() {
            self.print_stats(&report)?;
        }
        Ok(0)
    }

    fn stream(&self, engine: &mut Engine) -> Result<u64> {
        let input: Box<dyn BufRead> = match &self.input {
            Some(path) => Box::new(BufReader::with_capacity(IO_BUFFER_SIZE, File::open(path)?)),
            None => Box::new(io::stdin().lock()),
        };
        let output: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(BufWriter::with_capacity(IO_BUFFER_SIZE, File::create(path)?)),
            None => Box::new(BufWriter::with_capacity(IO_BUFFER_SIZE, io::stdout().lock())),
        };
        engine.process(input, output)
    }

    fn print_stats(&self, report: &StatsReport) -> anyhow::Result<()> {
        match self.stats_format {
            StatsFormat::Text => eprint!("{}", report.format_console()),
            StatsFormat::Json => eprintln!("{}", report.to_json()?),
        }
        Ok(())
    }
}
