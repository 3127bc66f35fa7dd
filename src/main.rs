use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod app;
mod config;
mod listing;
mod logging;
mod ui;

use app::App;
use config::Config;
use listing::{Catalog, ListingQuery, SortOrder};

#[derive(Parser)]
#[command(name = "homelet")]
#[command(about = "Property listing manager with a step-by-step creation wizard")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print listings, filtered and sorted
    List {
        /// Only listings whose city contains this text
        #[arg(long)]
        city: Option<String>,

        /// Only listings in this category
        #[arg(long)]
        category: Option<String>,

        /// Minimum monthly rent
        #[arg(long)]
        min_price: Option<i64>,

        /// Maximum monthly rent
        #[arg(long)]
        max_price: Option<i64>,

        /// Minimum guest capacity
        #[arg(long)]
        guests: Option<u32>,

        /// Required amenity (repeatable)
        #[arg(long = "amenity")]
        amenities: Vec<String>,

        /// Display order
        #[arg(short, long, value_enum, default_value_t = SortOrder::Newest)]
        sort: SortOrder,
    },

    /// Write the current configuration to ~/.config/homelet/config.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    // No subcommand = TUI mode
    let is_tui_mode = cli.command.is_none();

    // File-based logging for TUI, stderr for CLI
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::List {
            city,
            category,
            min_price,
            max_price,
            guests,
            amenities,
            sort,
        }) => {
            let query = ListingQuery {
                city_contains: city,
                category,
                min_price,
                max_price,
                min_guests: guests,
                required_amenities: amenities,
            };
            cmd_list(&config, &query, sort)?;
        }
        Some(Commands::Init) => {
            config.save()?;
            println!("Configuration written for data dir {}", config.data_path().display());
        }
        None => {
            run_tui(config, logging_handle.log_file_path).await?;
        }
    }

    Ok(())
}

async fn run_tui(config: Config, log_file_path: Option<PathBuf>) -> Result<()> {
    let mut app = App::new(config)?;
    let result = app.run().await;

    // Point at the session log on exit if anything was written
    if let Some(log_path) = log_file_path {
        if log_path.exists() {
            if let Ok(metadata) = log_path.metadata() {
                if metadata.len() > 0 {
                    eprintln!("Session log: {}", log_path.display());
                }
            }
        }
    }

    result
}

fn cmd_list(config: &Config, query: &ListingQuery, sort: SortOrder) -> Result<()> {
    let catalog = Catalog::open_file(config.listings_path())?;
    let listings = catalog.list(query, sort);

    if listings.is_empty() {
        if catalog.is_empty() {
            println!("No listings yet. Run homelet without arguments to create one.");
        } else {
            println!("No listings match the given filters.");
        }
        return Ok(());
    }

    println!("Listings ({} of {})", listings.len(), catalog.len());
    println!("{}", "─".repeat(72));

    for listing in listings {
        println!(
            "{:<30} {:<12} {:<14} {}{:<8} {}",
            truncate(&listing.title, 30),
            listing.category,
            truncate(&listing.city, 14),
            config.ui.currency,
            listing.rent,
            listing.status,
        );
    }

    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}
