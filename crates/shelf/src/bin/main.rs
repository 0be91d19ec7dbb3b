use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use clap::Parser;
use color_eyre::{
    Result,
    eyre::{WrapErr, eyre},
};
use libshelf::{
    EntryKey,
    jsonl::{self, LineError, Summary},
};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, prelude::*};

use crate::cli::{Cli, Command, LogFormat};

mod cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = init_tracing(cli.log_format);
    color_eyre::install()?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Command::Keys => {
            for name in EntryKey::names() {
                writeln!(out, "{name}")?;
            }
        }
        Command::Check { input } => check(open_input(input.as_deref())?, &mut out)?,
        Command::Normalize {
            input,
            skip_invalid,
        } => normalize(open_input(input.as_deref())?, &mut out, skip_invalid)?,
        Command::Get { id, input } => get(open_input(input.as_deref())?, &mut out, &id)?,
    }

    out.flush().wrap_err("failed to write output")
}

fn init_tracing(format: LogFormat) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(io::stderr());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt = tracing_subscriber::fmt::layer().with_writer(writer);
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default());

    match format {
        LogFormat::Pretty => registry.with(fmt).init(),
        LogFormat::Json => registry.with(fmt.json()).init(),
    }
    guard
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) if path != Path::new("-") => {
            debug!(path = %path.display(), "reading records");
            let file = File::open(path)
                .wrap_err_with(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => {
            debug!("reading records from stdin");
            Ok(Box::new(io::stdin().lock()))
        }
    }
}

fn check(reader: impl BufRead, out: &mut impl Write) -> Result<()> {
    let mut summary = Summary::default();
    for result in jsonl::read_entries(reader) {
        let result = match result {
            Err(e @ LineError::Io { .. }) => return Err(e).wrap_err("failed to read input"),
            other => other,
        };
        if let Err(e) = &result {
            warn!(line = e.line(), error = %e, "invalid record");
        }
        summary.record(&result);
    }

    info!(valid = summary.valid, invalid = summary.invalid, "check finished");
    writeln!(out, "{} valid, {} invalid", summary.valid, summary.invalid)?;

    if summary.is_clean() {
        Ok(())
    } else {
        Err(eyre!(
            "{} of {} records are invalid",
            summary.invalid,
            summary.total()
        ))
    }
}

fn get(reader: impl BufRead, out: &mut impl Write, id: &str) -> Result<()> {
    let entry = jsonl::find_by_id(reader, id)
        .wrap_err("failed to read input")?
        .ok_or_else(|| eyre!("no entry with _id {id:?}"))?;
    serde_json::to_writer_pretty(&mut *out, &entry)?;
    writeln!(out)?;
    Ok(())
}

fn normalize(reader: impl BufRead, out: &mut impl Write, skip_invalid: bool) -> Result<()> {
    let mut summary = Summary::default();
    for result in jsonl::read_entries(reader) {
        summary.record(&result);
        match result {
            Ok(entry) => jsonl::write_entry(&mut *out, &entry)?,
            Err(e @ LineError::Io { .. }) => return Err(e).wrap_err("failed to read input"),
            Err(e) if skip_invalid => warn!(line = e.line(), error = %e, "dropping invalid record"),
            Err(e) => {
                return Err(e).wrap_err("record rejected, pass --skip-invalid to drop it");
            }
        }
    }

    info!(
        written = summary.valid,
        dropped = summary.invalid,
        "normalize finished"
    );
    Ok(())
}
