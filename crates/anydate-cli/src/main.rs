mod cli;
mod commands;
mod logging;

use std::process;

use anyhow::{anyhow, Result};
use anydate::Settings;
use chrono_tz::Tz;
use clap::Parser;

use crate::cli::{Cli, Command};
use crate::commands::Mode;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = settings(cli.locale.as_deref(), cli.tz.as_deref())?;
    settings.clone().install();
    let mode = if cli.date_only { Mode::DateOnly } else { Mode::DateTime };

    let output = match cli.command {
        Command::Parse(args) => commands::parse(&args, mode, &settings)?,
        Command::Shift(args) => commands::shift(&args, mode, &settings)?,
        Command::StartOf(args) => commands::start_of(&args, mode, &settings)?,
        Command::EndOf(args) => commands::end_of(&args, mode, &settings)?,
        Command::Compare(args) => commands::compare(&args, &settings)?,
        Command::Format(args) => commands::format(&args, mode, &settings),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Process defaults overridden by the global flags.
fn settings(locale: Option<&str>, tz: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::current();
    if let Some(locale) = locale {
        settings = settings.with_locale(locale);
    }
    if let Some(name) = tz {
        let zone: Tz = name
            .parse()
            .map_err(|_| anyhow!("unknown timezone '{name}'"))?;
        settings = settings.with_local_zone(zone);
    }
    Ok(settings)
}
