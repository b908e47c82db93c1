//! citywx - browse world cities with live weather.
//!
//!   $ citywx list --pages 2 --filter country=france --sort population --desc
//!   $ citywx list --search par
//!   $ citywx weather "New York"
//!   $ citywx open /weather/New%20York
//!   $ citywx config

use anyhow::Result;
use clap::{Parser, Subcommand};
use citywx_core::{AppError, Config};
use citywx_ui::{CityRow, Column, DetailFetcher, DetailState, ListController, LoadOutcome, Route};

#[derive(Parser, Debug)]
#[command(name = "citywx", version, about = "Cities of the world with live weather")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the city table
    List(ListArgs),
    /// Show current weather for one city
    Weather { city: String },
    /// Open an app route such as `/` or `/weather/Paris`
    Open { route: String },
    /// Print the configuration file location and check it
    Config,
}

#[derive(clap::Args, Debug, Default)]
struct ListArgs {
    /// Number of catalog pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,
    /// Column filter as COLUMN=TEXT (repeatable)
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(Column, String)>,
    /// Column to sort by
    #[arg(long)]
    sort: Option<Column>,
    /// Sort descending
    #[arg(long)]
    desc: bool,
    /// Search city or country names
    #[arg(long)]
    search: Option<String>,
    /// Print the detail route of every row
    #[arg(long)]
    links: bool,
}

fn parse_filter(raw: &str) -> Result<(Column, String), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=TEXT, got {:?}", raw))?;
    let column = column.trim().parse::<Column>().map_err(|e| e.to_string())?;
    Ok((column, value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    citywx_core::init()?;
    let cli = Cli::parse();

    if let Command::Config = cli.command {
        return show_config();
    }

    let (config, _) = Config::load_validated()?;
    tracing::info!("citywx started");

    match cli.command {
        Command::List(args) => run_list(&config, args).await,
        Command::Weather { city } => run_weather(&config, &city).await,
        Command::Open { route } => match Route::parse(&route) {
            Some(Route::List) => {
                let args = ListArgs {
                    pages: 1,
                    ..ListArgs::default()
                };
                run_list(&config, args).await
            }
            Some(Route::Weather(city)) => run_weather(&config, &city).await,
            None => anyhow::bail!("Unknown route: {}", route),
        },
        Command::Config => show_config(),
    }
}

fn startup_error(e: AppError) -> anyhow::Error {
    tracing::error!("Failed to set up clients: {}", e);
    anyhow::anyhow!(e.user_message())
}

fn show_config() -> Result<()> {
    let path = Config::config_path()?;
    let config = Config::load()?;
    let validation = config.validate();

    println!("Config file: {}", path.display());
    for warning in &validation.warnings {
        println!("  warning: {}", warning);
    }
    for error in &validation.errors {
        println!("  error: {}", error);
    }
    if validation.is_valid() {
        println!("Configuration OK");
    }
    Ok(())
}

async fn run_list(config: &Config, args: ListArgs) -> Result<()> {
    let controller = ListController::from_config(config).map_err(startup_error)?;

    for (column, value) in args.filters {
        controller.set_filter(column, value);
    }
    if let Some(term) = &args.search {
        controller.set_search(term.as_str());
    }
    let column = args.sort.unwrap_or(Column::Name);
    if controller.state().sort.column != column {
        controller.set_sort(column);
    }
    if args.desc {
        controller.set_sort(column);
    }

    for _ in 0..args.pages {
        match controller.load_next_page().await {
            LoadOutcome::Loaded { .. } => {}
            LoadOutcome::Skipped | LoadOutcome::Discarded => break,
            LoadOutcome::Failed(e) => {
                tracing::debug!("Stopping after failed page: {}", e);
                break;
            }
        }
    }

    let state = controller.state();
    let unit = controller.temperature_unit();

    if args.search.is_some() {
        let suggestions = controller.suggestions(config.ui.suggestion_limit);
        if !suggestions.is_empty() {
            println!("Suggestions: {}", suggestions.join(", "));
        }
    }

    println!("Cities Table");
    let headers: Vec<String> = Column::ALL
        .iter()
        .map(|c| {
            if *c == state.sort.column {
                format!("{} {}", c.label(), state.sort.order.arrow())
            } else {
                c.label().to_string()
            }
        })
        .collect();
    print_row(&headers, "Temperature");

    for row in controller.visible_rows() {
        print_city(&row, &row.weather_lines(unit).join(" / "));
        if args.links {
            println!("    {}", Route::weather(&row.city.name));
        }
    }

    println!(
        "{} of {} cities shown{}",
        state.visible.len(),
        state.cities.len(),
        if state.has_more { "" } else { " (end of catalog)" }
    );
    if let Some(message) = &state.error_message {
        eprintln!("{}", message);
    }
    Ok(())
}

fn print_city(row: &CityRow, weather: &str) {
    let cells: Vec<String> = Column::ALL
        .iter()
        .map(|c| c.value(&row.city).into_owned())
        .collect();
    print_row(&cells, weather);
}

fn print_row(cells: &[String], last: &str) {
    let widths = [24, 20, 22, 14, 12];
    let line: String = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$} ", cell, width = width))
        .collect();
    println!("{}{}", line, last);
}

async fn run_weather(config: &Config, city: &str) -> Result<()> {
    let fetcher = DetailFetcher::from_config(config).map_err(startup_error)?;
    let state = fetcher.open(city).await;

    println!("Weather Information");
    match &state {
        DetailState::Loaded(weather) => {
            let unit = weather.unit.symbol();
            println!("City: {}", weather.city);
            println!("Temperature: {}{}", weather.rounded_temperature(), unit);
            println!("Min Temperature: {}{}", weather.rounded_min(), unit);
            println!("Max Temperature: {}{}", weather.rounded_max(), unit);
            println!(
                "Weather: {} ({}) {}",
                weather.description,
                weather.condition.description(),
                weather.icon_url()
            );
            println!("Humidity: {}%", weather.humidity);
            println!("Wind Speed: {} {}", weather.wind_speed, weather.unit.speed_unit());
            println!("Pressure: {} hPa", weather.pressure);
            match weather.visibility_km() {
                Some(km) => println!("Visibility: {} km", km),
                None => println!("Visibility: n/a"),
            }
            println!(
                "Coordinates: Longitude {}, Latitude {}",
                weather.longitude, weather.latitude
            );
            println!("Sunrise: {}", weather.sunrise_local());
            println!("Sunset: {}", weather.sunset_local());
            Ok(())
        }
        DetailState::Idle | DetailState::Loading { .. } => {
            println!("Loading weather data...");
            Ok(())
        }
        DetailState::NotFound { .. } | DetailState::Failed { .. } => {
            anyhow::bail!("{}", state.error_message().unwrap_or("Error fetching weather data"))
        }
    }
}
