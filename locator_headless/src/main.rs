// SPDX-FileCopyrightText: 2026 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use algorithm::Strategy;
use bridge::UnknownLocationPolicy;
use clap::Parser;
use common::{authorization::AuthorizationStatus, position::Position};
use simulated_provider::{SimulatedLocationProvider, SimulationConfig};
use std::{str::FromStr, sync::Arc};
use streamer::{LocationStreamer, StreamerConfig};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV file with a header line and one "longitude,latitude" record per point.
    #[arg(short, long)]
    route: String,
    /// JSON file with the streamer configuration.
    #[arg(short, long)]
    config: Option<String>,
    #[arg(short, long, default_value_t = 1000)]
    interval_ms: u64,
    /// Overrides the retention strategy of the configuration.
    #[arg(short, long)]
    strategy: Option<Strategy>,
    /// Authorization the simulated provider starts with.
    #[arg(long, default_value = "not-determined")]
    authorization: AuthorizationStatus,
    /// Answer of the simulated user to the authorization prompt.
    #[arg(short, long, default_value = "authorized-when-in-use")]
    answer: AuthorizationStatus,
    #[arg(long)]
    ignore_unknown_location: bool,
    /// Injects a location failure every n-th point.
    #[arg(long)]
    fail_every: Option<usize>,
    /// Stops after the given number of result snapshots.
    #[arg(short, long)]
    max_results: Option<usize>,
}

fn parse_coordinate(record: &csv::StringRecord, index: usize) -> Result<f64, ()> {
    let field = record.get(index).ok_or_else(|| {
        error!("Route record {:?} has no field {}", record, index);
    })?;
    f64::from_str(field.trim()).map_err(|e| {
        error!("Invalid coordinate {} in route. Error: {}", field, e);
    })
}

fn read_route_from_file(file_path: &str) -> Result<Vec<Position>, ()> {
    let mut rdr = csv::Reader::from_path(file_path).map_err(|e| {
        error!("Failed to open route file {}. Error: {}", file_path, e);
    })?;
    let mut positions = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| {
            error!("Failed to read route file {}. Error: {}", file_path, e);
        })?;
        let longitude = parse_coordinate(&record, 0)?;
        let latitude = parse_coordinate(&record, 1)?;
        positions.push(Position::new(latitude, longitude));
    }
    debug!("length of route: {}", positions.len());
    Ok(positions)
}

fn read_streamer_config(cli: &Cli) -> Result<StreamerConfig, ()> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| {
                error!("Failed to read config file {}. Error: {}", path, e);
            })?;
            StreamerConfig::from_json(&json).map_err(|e| {
                error!("Failed to parse config file {}. Error: {}", path, e);
            })?
        }
        None => StreamerConfig::default(),
    };
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if cli.ignore_unknown_location {
        config.unknown_location = UnknownLocationPolicy::Ignore;
    }
    Ok(config)
}

fn create_provider(cli: &Cli) -> Result<SimulatedLocationProvider, ()> {
    let route = read_route_from_file(&cli.route)?;
    SimulatedLocationProvider::new(SimulationConfig {
        route,
        interval_ms: cli.interval_ms,
        authorization: cli.authorization,
        answer: Some(cli.answer),
        fail_every: cli.fail_every,
        ..Default::default()
    })
    .map_err(|e| {
        error!("Failed to create simulated provider. Error: {}", e);
    })
}

/// Prints every change of the buffer as one JSON line.
async fn print_results(streamer: Arc<LocationStreamer>, max_results: Option<usize>) {
    let mut results = streamer.subscribe_results();
    let mut snapshots = 0;
    while results.changed().await.is_ok() {
        let line = serde_json::to_string(&*results.borrow_and_update());
        match line {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to serialize results. Error: {}", e),
        }
        snapshots += 1;
        if max_results.is_some_and(|max| snapshots >= max) {
            info!("Printed {} snapshots, stopping", snapshots);
            streamer.stop();
            return;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = read_streamer_config(&cli)?;
    let provider = create_provider(&cli)?;
    let streamer = Arc::new(LocationStreamer::new(Arc::new(provider), config));

    let ctrlc_streamer = streamer.clone();
    ctrlc::set_handler(move || {
        info!("Interrupted, stopping location streaming");
        ctrlc_streamer.stop();
    })
    .map_err(|e| {
        error!("Failed to install Ctrl-C handler. Error: {}", e);
    })?;

    let printer = tokio::spawn(print_results(streamer.clone(), cli.max_results));
    info!("Starting location streaming...");
    let result = streamer.start(true).await;
    printer.abort();
    result.map_err(|e| {
        error!("Location streaming failed. Error: {}", e);
    })
}
