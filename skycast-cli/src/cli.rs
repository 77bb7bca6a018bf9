use anyhow::Result;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};

use skycast_core::config::Config;
use skycast_core::geolocate::IpGeolocator;
use skycast_core::provider::openweather::OpenWeatherProvider;
use skycast_core::store::FileStore;
use skycast_core::{Session, Sources, UnitSystem, View};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather and forecasts in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key used by all fetches.
    Configure,

    /// One-shot mode: resolve a city, fetch, render once, exit.
    Show {
        /// City name, resolved via geocoding.
        city: String,

        /// Unit system: metric or imperial. Defaults to the configured one.
        #[arg(long)]
        units: Option<UnitSystem>,

        /// Forecast view: daily or hourly.
        #[arg(long, default_value = "daily")]
        view: View,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Show { city, units, view }) => show(&city, units, view).await,
            None => interactive().await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()?;

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!(
        "Configuration saved to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn build_session(config: &Config) -> Result<Session> {
    let api_key = config.require_api_key()?.to_string();
    let provider = OpenWeatherProvider::new(api_key);

    let sources = Sources {
        geolocator: Box::new(IpGeolocator::new()),
        geocoder: Box::new(provider.clone()),
        weather: Box::new(provider.clone()),
        forecast: Box::new(provider),
    };

    let store = FileStore::open()?;
    Ok(Session::new(sources, Box::new(store)).with_units(config.starting_units()))
}

async fn show(city: &str, units: Option<UnitSystem>, view: View) -> Result<()> {
    let config = Config::load()?;
    let mut session = build_session(&config)?
        .with_units(units.unwrap_or_else(|| config.starting_units()))
        .with_view(view);

    session.search(city).await;
    if let Some(err) = session.last_error() {
        anyhow::bail!("{err}");
    }

    render::render(&session);
    Ok(())
}

const ACTION_SEARCH: &str = "Search city";
const ACTION_SAVE: &str = "Save location";
const ACTION_LOAD: &str = "Load saved location";
const ACTION_UNITS: &str = "Toggle °C / °F";
const ACTION_VIEW: &str = "Switch daily / hourly view";
const ACTION_THEME: &str = "Toggle theme";
const ACTION_REFRESH: &str = "Refresh";
const ACTION_QUIT: &str = "Quit";

async fn interactive() -> Result<()> {
    let config = Config::load()?;
    let mut session = build_session(&config)?;

    session.start().await;

    loop {
        render::render(&session);

        let mut actions = vec![ACTION_SEARCH, ACTION_SAVE];
        if !session.saved().is_empty() {
            actions.push(ACTION_LOAD);
        }
        actions.extend([
            ACTION_UNITS,
            ACTION_VIEW,
            ACTION_THEME,
            ACTION_REFRESH,
            ACTION_QUIT,
        ]);

        let choice = match Select::new("Action:", actions).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };

        match choice {
            ACTION_SEARCH => {
                if let Ok(input) = Text::new("City:").prompt() {
                    session.search(&input).await;
                }
            }
            ACTION_SAVE => session.save_current(),
            ACTION_LOAD => {
                let labels: Vec<String> = session
                    .saved()
                    .entries()
                    .iter()
                    .enumerate()
                    .map(|(index, location)| saved_label(index, location))
                    .collect();

                if let Ok(picked) = Select::new("Saved locations:", labels).raw_prompt() {
                    session.load_saved(picked.index).await;
                }
            }
            ACTION_UNITS => session.toggle_units().await,
            ACTION_VIEW => session.toggle_view(),
            ACTION_THEME => session.toggle_theme(),
            ACTION_REFRESH => session.refresh().await,
            _ => break,
        }
    }

    Ok(())
}

fn saved_label(index: usize, location: &skycast_core::Coordinate) -> String {
    let name = if location.display_name.is_empty() {
        format!("Location {}", index + 1)
    } else {
        location.display_name.clone()
    };

    format!(
        "{name} ({:.2}, {:.2})",
        location.latitude, location.longitude
    )
}
