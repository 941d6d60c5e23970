use std::io;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use log::{info, LevelFilter};

mod app;
mod cli;

use cli::{Args, CliError};

fn main() {
    match timfmt() {
        Ok(()) => {}
        Err(cli_error) => cli_error.exit(),
    }
}

fn timfmt() -> Result<(), CliError> {
    let args = Args::try_parse()?;
    log_setup(&args);

    // stdin must be locked before we can hand a reader to the app
    let stdin = io::stdin();
    let inbuf = input_setup(&args, stdin.lock())?;

    let stdout = io::stdout();
    let mut outbuf = stdout.lock();

    // every message in the run is anchored to the same instant
    app::run(&args, &Utc::now(), inbuf, &mut outbuf)?;

    Ok(())
}

// RUST_LOG takes over from the -v count when set. -q silences both.
fn log_setup(args: &Args) {
    if args.quiet {
        return;
    }

    if std::env::var_os("RUST_LOG").is_some() {
        pretty_env_logger::init();
        return;
    }

    let log_filter = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        3 | _ => LevelFilter::Trace,
    };
    pretty_env_logger::formatted_builder()
        .filter_module("timcast", log_filter)
        .filter_module("timfmt", log_filter)
        .init();
}

fn input_setup<'stdin>(
    args: &Args,
    stdin: std::io::StdinLock<'stdin>,
) -> Result<Box<dyn io::BufRead + 'stdin>, anyhow::Error> {
    if args.input_is_stdin() {
        info!("reading events from standard input");
        return Ok(Box::new(stdin));
    }

    info!("reading events from file: \"{}\"", &args.file);
    let file = std::fs::File::open(&args.file)
        .with_context(|| format!("unable to open --file \"{}\"", args.file))?;
    Ok(Box::new(io::BufReader::new(file)))
}
