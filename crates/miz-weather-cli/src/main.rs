// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use miz_weather_core::{
    set_weather_from_icao_record, set_weather_from_metar_str, ApplyRecord, FetchConfig,
    MissionTime, NoaaClient,
};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Base URL of the NOAA text report server
    #[arg(long, env = "MIZ_WEATHER_BASE_URL", global = true)]
    base_url: Option<String>,

    /// HTTP timeout in seconds (none by default)
    #[arg(long, env = "MIZ_WEATHER_TIMEOUT", global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a METAR string to a mission
    Metar {
        metar: String,
        from: PathBuf,
        to: PathBuf,
    },
    /// Fetch the current METAR for a station and apply it to a mission
    Icao {
        station: String,
        from: PathBuf,
        to: PathBuf,
    },
    /// Set the mission start date and time (YYYYMMDDHHMMSS)
    Time {
        time: String,
        from: PathBuf,
        to: PathBuf,
    },
    /// Print the current TAF for a station
    Taf { station: String },
    /// Print the current METAR for a station
    FetchMetar { station: String },
}

impl Cli {
    fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig::default();
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        config.timeout_secs = self.timeout;
        config
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // stdout carries the JSON; logs go to stderr
    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger: {}", e);
    }
}

enum Outcome {
    Record(ApplyRecord),
    Text(String),
}

fn report(record: &ApplyRecord) -> ExitCode {
    println!("{}", record.to_json());
    if record.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(cli: &Cli) -> Result<Outcome> {
    let config = cli.fetch_config();
    let client = || NoaaClient::new(config.clone()).context("Could not build HTTP client");

    match &cli.command {
        Commands::Metar { metar, from, to } => {
            Ok(Outcome::Record(set_weather_from_metar_str(metar, from, to)))
        }
        Commands::Icao { station, from, to } => Ok(Outcome::Record(
            set_weather_from_icao_record(&config, station, from, to),
        )),
        Commands::Time { time, from, to } => {
            let mission_time = MissionTime::from_string(time)?;
            if !mission_time.apply_to_miz(from, to)? {
                bail!("{} has no mission table to update", from.display());
            }
            Ok(Outcome::Text(format!(
                "Mission time set to {} start_time={} in {}",
                mission_time.date,
                mission_time.start_time,
                to.display()
            )))
        }
        Commands::Taf { station } => {
            let taf = client()?
                .fetch_taf(station)
                .with_context(|| format!("Could not fetch TAF for {}", station))?;
            Ok(Outcome::Text(taf))
        }
        Commands::FetchMetar { station } => {
            let metar = client()?
                .fetch_metar(station)
                .with_context(|| format!("Could not fetch METAR for {}", station))?;
            Ok(Outcome::Text(metar))
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli)? {
        Outcome::Record(record) => Ok(report(&record)),
        Outcome::Text(text) => {
            println!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
    }
}
