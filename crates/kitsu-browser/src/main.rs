//! Kitsu catalog browser CLI.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kitsu_browser::display::{detail_block, summary_line};
use kitsu_browser::{
    CatalogError, CatalogService, EntityCache, PageStatus, PaginationController, Recovery,
    RenderStrategy, Translator, ViewKind,
};
use shared::{Config, PreferenceStore, Theme};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

/// Synopsis length shown by `show`
const SYNOPSIS_LEN: usize = 600;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse the Kitsu anime catalog", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List TV series
    Series(BrowseArgs),

    /// List movies
    Movies(BrowseArgs),

    /// Search the whole catalog
    Search {
        text: String,

        /// Number of pages to load
        #[arg(short, long, default_value = "1")]
        pages: usize,
    },

    /// Show one anime in detail
    Show { id: String },

    /// Show the featured strip
    Featured {
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Manage favorite anime
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Show or change the theme preference
    Theme { value: Option<Theme> },
}

#[derive(clap::Args, Debug)]
struct BrowseArgs {
    /// Narrow the listing by title text
    #[arg(short, long)]
    search: Option<String>,

    /// Number of pages to load
    #[arg(short, long, default_value = "1")]
    pages: usize,
}

#[derive(Subcommand, Debug)]
enum FavoritesAction {
    List,
    Add { id: String },
    Remove { id: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        shared::logging::parse_level(&config.logging.default_level)
    };

    shared::logging::init(shared::LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "kitsu-browser".to_string(),
        default_level: log_level,
        console: config.logging.console,
        file: config.logging.file,
        json_format: config.logging.json_format,
    })?;

    info!(config_file = %args.config.display(), base_url = %config.catalog.base_url, "Kitsu browser starting");

    match args.command {
        Command::Favorites { action } => run_favorites(&config, action).await,
        Command::Theme { value } => run_theme(&config, value),
        command => {
            let service = build_service(&config)?;
            run_catalog(&config, &service, command).await
        }
    }
}

fn build_service(config: &Config) -> Result<CatalogService> {
    let translator =
        Translator::from_config(&config.translation).context("Failed to create translator")?;
    let cache = Arc::new(EntityCache::new());

    CatalogService::from_config(&config.catalog, Arc::new(translator), cache)
        .context("Failed to create catalog client")
}

async fn run_catalog(config: &Config, service: &CatalogService, command: Command) -> Result<ExitCode> {
    let outcome = match command {
        Command::Series(browse) => {
            let mut controller =
                PaginationController::for_view(ViewKind::Series, service, &config.pagination);
            browse_pages(service, &mut controller, browse.search, browse.pages).await
        }
        Command::Movies(browse) => {
            let mut controller =
                PaginationController::for_view(ViewKind::Movies, service, &config.pagination);
            browse_pages(service, &mut controller, browse.search, browse.pages).await
        }
        Command::Search { text, pages } => {
            let mut controller =
                PaginationController::for_view(ViewKind::Search, service, &config.pagination);
            browse_pages(service, &mut controller, Some(text), pages).await
        }
        Command::Show { id } => service.get_by_id(&id).await.map(|entity| {
            println!("{}", detail_block(&entity, SYNOPSIS_LEN));
        }),
        Command::Featured { limit } => service.featured(limit).await.map(|page| {
            for entity in &page.entities {
                println!("{}", summary_line(entity));
            }
        }),
        Command::Favorites { .. } | Command::Theme { .. } => Ok(()),
    };

    Ok(match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    })
}

/// Load up to `pages` pages through the controller, printing entities as they arrive.
///
/// A retryable failure is retried once before giving up.
async fn browse_pages(
    service: &CatalogService,
    controller: &mut PaginationController,
    text: Option<String>,
    pages: usize,
) -> Result<(), CatalogError> {
    let Some(mut request) = controller.set_filter(text) else {
        return Ok(());
    };

    let mut printed = 0;
    let mut loaded = 0;
    let mut retried = false;

    loop {
        controller.drive(service, request).await;

        if let PageStatus::Error { error, .. } = controller.status() {
            let error = error.clone();
            match controller.retry() {
                Some(retry) if error.is_retryable() && !retried => {
                    info!(error = %error, "Retrying once");
                    retried = true;
                    request = retry;
                    continue;
                }
                _ => return Err(error),
            }
        }

        for entity in &controller.entities()[printed..] {
            println!("{}", summary_line(entity));
        }
        printed = controller.len();
        loaded += 1;

        if loaded >= pages {
            break;
        }

        // Pretend the user scrolled to the bottom of the list
        match controller.on_scroll(0.0) {
            Some(next) => request = next,
            None => break,
        }
    }

    let layout = match controller.render_strategy() {
        RenderStrategy::Grid => "grid".to_string(),
        RenderStrategy::Virtualized { row_height } => format!("virtualized, {}px rows", row_height),
    };
    eprintln!(
        "{} entries ({} layout){}",
        controller.len(),
        layout,
        if controller.has_more() { ", more available" } else { "" }
    );

    Ok(())
}

fn report(error: &CatalogError) {
    let hint = match error.recovery() {
        Recovery::RetryConnection => "Check your connection and run the command again.",
        Recovery::Retry => "Run the command again to retry.",
        Recovery::NavigateAway => "Try a different id or browse the catalog instead.",
    };
    eprintln!("Error: {}\n{}", error.message(), hint);
}

async fn run_favorites(config: &Config, action: FavoritesAction) -> Result<ExitCode> {
    let store = PreferenceStore::open(config.preferences_path())
        .context("Failed to open preference store")?;

    match action {
        FavoritesAction::Add { id } => {
            if store.add_favorite(&id)? {
                println!("Added {} to favorites", id);
            } else {
                println!("{} is already a favorite", id);
            }
        }
        FavoritesAction::Remove { id } => {
            if store.remove_favorite(&id)? {
                println!("Removed {} from favorites", id);
            } else {
                println!("{} is not a favorite", id);
            }
        }
        FavoritesAction::List => {
            let favorites = store.favorites()?;
            if favorites.is_empty() {
                println!("No favorites yet");
                return Ok(ExitCode::SUCCESS);
            }

            let service = build_service(config)?;
            for id in &favorites {
                match service.get_by_id(id).await {
                    Ok(entity) => println!("{}", summary_line(&entity)),
                    Err(error) => println!("[{:>6}] ({})", id, error.message()),
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_theme(config: &Config, value: Option<Theme>) -> Result<ExitCode> {
    let store = PreferenceStore::open(config.preferences_path())
        .context("Failed to open preference store")?;

    if let Some(theme) = value {
        store.set_theme(theme)?;
        info!(theme = %theme, "Theme updated");
    }

    println!("{}", store.theme()?);
    Ok(ExitCode::SUCCESS)
}
