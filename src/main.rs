use std::{path::PathBuf, time::Duration};

use _model::Coordinate;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use ureq::Agent;

use crate::{generate::OpenAi, nominatim::Nominatim, overpass::Overpass};

mod cluster;
mod explore;
mod generate;
mod locate;
mod nominatim;
mod overpass;
mod pipeline;
mod report;
mod utils;

// metres, roughly one mile
const DEFAULT_RADIUS: f64 = 1609.0;

#[derive(Debug, Parser)]
#[command(name = "ecopoi", version)]
#[command(about = "Find nature points of interest near a location")]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Defaults to `explore`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Args)]
struct Config {
    /// Overpass API interpreter endpoint
    #[arg(long, global = true, env = "ECOPOI_OVERPASS_URL", default_value = overpass::DEFAULT_URL)]
    overpass_url: String,

    /// Nominatim base URL
    #[arg(long, global = true, env = "ECOPOI_NOMINATIM_URL", default_value = nominatim::DEFAULT_URL)]
    nominatim_url: String,

    /// Text completion API base URL
    #[arg(long, global = true, env = "ECOPOI_OPENAI_URL", default_value = generate::DEFAULT_URL)]
    openai_url: String,

    /// Text completion API key; descriptions are skipped without one
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_key: Option<String>,

    /// Text completion model
    #[arg(long, global = true, env = "ECOPOI_MODEL", default_value = generate::DEFAULT_MODEL)]
    model: String,

    /// Points closer than this many metres are grouped together
    #[arg(long, global = true, default_value_t = cluster::DEFAULT_THRESHOLD, value_parser = positive)]
    threshold: f64,

    /// Network timeout in seconds
    #[arg(long, global = true, default_value_t = 60)]
    timeout: u64,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Interactive session: pick a location, read about it, search nearby
    Explore,
    /// Search once around a coordinate or address
    Search {
        #[arg(long, requires = "lon", required_unless_present = "address", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        address: Option<String>,
        /// Search radius in metres
        #[arg(long, default_value_t = DEFAULT_RADIUS, value_parser = positive)]
        radius: f64,
        #[arg(long)]
        json: bool,
    },
    /// Group and classify the elements of a saved Overpass JSON response
    Group {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

fn positive(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(x) if x.is_finite() && x > 0.0 => Ok(x),
        Ok(_) => Err("must be a positive number".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

pub struct Services {
    pub agent: Agent,
    pub overpass: Overpass,
    pub nominatim: Nominatim,
    pub generator: Option<OpenAi>,
    pub threshold: f64,
}

impl Services {
    fn new(config: Config) -> Self {
        let agent = utils::agent(Duration::from_secs(config.timeout));
        let generator = config
            .openai_key
            .filter(|x| !x.is_empty())
            .map(|key| OpenAi::new(agent.clone(), &config.openai_url, key, config.model));
        Self {
            overpass: Overpass::new(agent.clone(), config.overpass_url),
            nominatim: Nominatim::new(agent.clone(), config.nominatim_url),
            generator,
            threshold: config.threshold,
            agent,
        }
    }
}

/// Used when `RUST_LOG` is unset.
fn log_level(verbose: bool) -> &'static str {
    if verbose {
        "info"
    } else {
        "warn"
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level(cli.config.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    let services = Services::new(cli.config);
    match cli.command.unwrap_or(Command::Explore) {
        Command::Explore => explore::run(&services),
        Command::Search {
            lat,
            lon,
            address,
            radius,
            json,
        } => {
            let centre = match (lat, lon, address) {
                (Some(lat), Some(lon), _) => Coordinate::new(lat, lon)?,
                (_, _, Some(address)) => {
                    let location = services
                        .nominatim
                        .search(&address)?
                        .with_context(|| format!("Unable to find address: {address}"))?;
                    info!(address = %location.address, "geocoded");
                    location.coordinate
                }
                _ => bail!("either --lat and --lon or --address is required"),
            };

            match pipeline::search(&services.overpass, centre, radius, services.threshold) {
                Ok(entries) => report::print(&entries, json),
                Err(e) => {
                    error!("{e}");
                    report::print(&[], json)?;
                    Err(e.into())
                }
            }
        }
        Command::Group { file, json } => {
            let pois = overpass::load(&file)?;
            info!(elements = pois.len(), file = %file.display(), "loaded");
            report::print(&pipeline::run(pois, services.threshold), json)
        }
    }
}
