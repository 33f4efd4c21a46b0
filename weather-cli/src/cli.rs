use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};
use weather_core::{Config, ErrorRecord, InputRecord, OutputRecord, run_batch};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Normalized current weather for a batch of cities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key in the config file.
    Configure,

    /// Process input items and print one output item per input.
    Run {
        /// JSON file holding an array of items (`{"city": ...}` or `{"json": {"city": ...}}`).
        /// Reads stdin when neither this nor `--city` is given.
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// City to process; may be repeated. Takes precedence over `--input`.
        #[arg(long = "city", short = 'c')]
        cities: Vec<String>,

        /// Wrap every output item as `{"json": ...}`.
        #[arg(long)]
        envelope: bool,

        #[arg(long)]
        pretty: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Run {
                input,
                cities,
                envelope,
                pretty,
            } => {
                let outputs = match load_inputs(input, cities) {
                    Ok((config, inputs)) => run_batch(&config, &inputs).await,
                    Err(e) => {
                        tracing::error!("A critical error occurred: {e:#}");
                        vec![OutputRecord::Error(ErrorRecord {
                            error: format!("{e:#}"),
                            city: None,
                        })]
                    }
                };

                let failed = outputs.iter().filter(|o| o.is_error()).count();
                tracing::info!("Processed {} items, {failed} failed", outputs.len());

                print_outputs(&outputs, envelope, pretty)
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load existing configuration")?;

    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.set_api_key(api_key.trim().to_string());
    let path = config.save()?;

    println!("Saved configuration to {}", path.display());
    Ok(())
}

/// Everything that must succeed before per-item processing starts.
fn load_inputs(
    input: Option<PathBuf>,
    cities: Vec<String>,
) -> anyhow::Result<(Config, Vec<InputRecord>)> {
    let config = Config::load()?;

    if !cities.is_empty() {
        return Ok((config, cities.into_iter().map(InputRecord::new).collect()));
    }

    let raw = match input {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read input items from stdin")?;
            buf
        }
    };

    Ok((config, parse_items(&raw)?))
}

/// Parse a JSON array of items; a single object counts as a one-item batch.
fn parse_items(raw: &str) -> anyhow::Result<Vec<InputRecord>> {
    let value: Value = serde_json::from_str(raw).context("Input items are not valid JSON")?;

    let items = match value {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        _ => anyhow::bail!("Input must be a JSON array of items"),
    };

    Ok(items.iter().map(InputRecord::from_json).collect())
}

fn print_outputs(outputs: &[OutputRecord], envelope: bool, pretty: bool) -> anyhow::Result<()> {
    let items = outputs
        .iter()
        .map(serde_json::to_value)
        .collect::<serde_json::Result<Vec<_>>>()?;

    let value: Value = if envelope {
        items.into_iter().map(|item| serde_json::json!({ "json": item })).collect()
    } else {
        Value::Array(items)
    };

    let text = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };

    println!("{text}");
    Ok(())
}
