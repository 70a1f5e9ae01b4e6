//! Unsplash New Tab - rotating photo backgrounds for new tabs
//!
//! Runs the new-tab page as a local HTTP service, or drives single
//! operations (open a tab, prune, clear, configure) from the command line.

use clap::{Parser, Subcommand, ValueEnum};
use image_cache_db::ImageStore;
use newtab_service::page::{render_html, render_onboarding_html};
use newtab_service::{
    apply_preferences, clear_all, open_new_tab, prune, start_server, Config, NewTabContext,
    NewTabError, PageRenderer, Result, ServerState, SharedState,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};
use unsplash_source::SelectedContent;

#[derive(Parser)]
#[command(name = "unsplash-new-tab")]
#[command(about = "Rotating new-tab backgrounds from cached Unsplash photos")]
#[command(version)]
struct Cli {
    /// SQLite image cache (overrides NEWTAB_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open one new tab and write the rendered page
    Open {
        /// Write the page here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Serve new-tab pages over HTTP
    Serve {
        /// Listen port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Evict the oldest cached images
    Prune {
        /// Images to keep (defaults to MAX_CACHED_IMAGES)
        #[arg(long)]
        max: Option<usize>,
    },

    /// Drop every cached image
    Clear,

    /// Show cache statistics and preferences
    Status,

    /// Change where images come from
    Configure {
        /// Use random photos instead of a user's collection
        #[arg(long)]
        random: Option<bool>,
        /// Which of the user's collections to use
        #[arg(long, value_enum)]
        content: Option<ContentArg>,
        /// Unsplash username
        #[arg(long)]
        username: Option<String>,
    },

    /// Print an onboarding example image URL
    Onboarding {
        /// Print the full onboarding page instead of the URL
        #[arg(long)]
        html: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ContentArg {
    #[value(name = "myLikes")]
    MyLikes,
    #[value(name = "myPhotos")]
    MyPhotos,
}

impl From<ContentArg> for SelectedContent {
    fn from(arg: ContentArg) -> Self {
        match arg {
            ContentArg::MyLikes => SelectedContent::MyLikes,
            ContentArg::MyPhotos => SelectedContent::MyPhotos,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("newtab_service=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    };

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command {
        Commands::Open { output } => open(config, output).await,
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
        Commands::Prune { max } => {
            let max = max.unwrap_or(config.max_cached_images);
            let report = prune(&config, max).await?;
            println!(
                "Pruned {} of {} images (cap {})",
                report.outcome.deleted, report.before, max
            );
            Ok(())
        }
        Commands::Clear => {
            let report = clear_all(&config).await?;
            println!("Cleared {} images", report.outcome.deleted);
            Ok(())
        }
        Commands::Status => status(config).await,
        Commands::Configure {
            random,
            content,
            username,
        } => configure(config, random, content, username).await,
        Commands::Onboarding { html } => {
            let url = {
                let mut rng = rand::thread_rng();
                config.source.onboarding(&mut rng)
            };
            if html {
                print!("{}", render_onboarding_html(&url));
            } else {
                println!("{}", url);
            }
            Ok(())
        }
    }
}

async fn open(config: Config, output: Option<PathBuf>) -> Result<()> {
    let ctx = NewTabContext::from_config(config);
    let page = Arc::new(PageRenderer::new());

    let report = open_new_tab(&ctx, page.clone()).join().await;
    match &report.populate {
        Ok(populate) => info!(
            inserted = populate.inserted(),
            failed = populate.failed(),
            "Prefetch finished"
        ),
        Err(e) => warn!(error = %e, "Prefetch failed"),
    }
    if let Err(e) = &report.prune {
        warn!(error = %e, "Prune failed");
    }

    let html = render_html(&page.view().await);
    match output {
        Some(path) => {
            tokio::fs::write(&path, html).await?;
            info!("Wrote new tab to {:?}", path);
        }
        None => print!("{}", html),
    }

    report.selection.map(|_| ())
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting Unsplash New Tab...");
    info!("Port: {}", config.port);
    info!("Image cache: {:?}", config.db_path);
    info!("Preferences: {:?}", config.preferences_path);
    info!(
        "Cache cap: {} images, {} fetched per tab",
        config.max_cached_images, config.photos_to_fetch
    );

    // Create the schema up front so the first tab does not race on it
    ImageStore::open(&config.db_path).await?;

    let port = config.port;
    let state: SharedState = Arc::new(ServerState::new(NewTabContext::from_config(config)));

    start_server(state, port)
        .await
        .map_err(|e| NewTabError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

async fn status(config: Config) -> Result<()> {
    let ctx = NewTabContext::from_config(config);
    let store = ImageStore::open(&ctx.config.db_path).await?;
    let stats = store.stats().await?;
    let prefs = ctx.preferences.get().await?;

    println!("Image cache: {}", ctx.config.db_path.display());
    println!(
        "  {} / {} images, {} bytes",
        stats.entries, ctx.config.max_cached_images, stats.total_bytes
    );
    if let (Some(oldest), Some(newest)) = (stats.oldest_created_at, stats.newest_created_at) {
        println!("  oldest {} ms, newest {} ms", oldest, newest);
    }

    if prefs.targets_user() {
        println!(
            "Source: {}'s {}",
            prefs.username,
            prefs.selected_content.label()
        );
    } else {
        println!("Source: random photos");
    }
    println!("Next fetch: {}", ctx.config.source.for_preferences(&prefs));

    Ok(())
}

async fn configure(
    config: Config,
    random: Option<bool>,
    content: Option<ContentArg>,
    username: Option<String>,
) -> Result<()> {
    let ctx = NewTabContext::from_config(config);
    let mut prefs = ctx.current_preferences().await;

    if let Some(random) = random {
        prefs.use_random_photos = random;
    }
    if let Some(content) = content {
        prefs.selected_content = content.into();
    }
    if let Some(username) = username {
        prefs.username = username;
    }

    let update = apply_preferences(&ctx, prefs).await?;
    if let Some(cleared) = update.cleared {
        println!(
            "Preferences saved, cleared {} cached images",
            cleared.outcome.deleted
        );
    } else {
        println!("Preferences unchanged");
    }

    Ok(())
}
