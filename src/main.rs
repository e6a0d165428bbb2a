// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trailbook CLI
//!
//! Logs in to Strava, lists activities and prints monthly totals as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trailbook::{
    config::Config,
    db::FileStore,
    services::{activity::DEFAULT_PER_PAGE, ActivityFilter, ActivitySource, AuthState},
    Trailbook,
};

#[derive(Parser)]
#[command(name = "trailbook")]
#[command(author, version, about = "Monthly summaries of your Strava activities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize with Strava in the browser
    Login {
        /// Redirect URL to complete the login with, instead of prompting
        #[arg(long)]
        callback: Option<String>,
    },

    /// Show whether credentials are stored
    Status,

    /// List activities
    Activities {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,

        /// Only activities before this unix timestamp
        #[arg(long)]
        before: Option<i64>,

        /// Only activities after this unix timestamp
        #[arg(long)]
        after: Option<i64>,

        /// Follow pages until the feed ends
        #[arg(long)]
        all: bool,
    },

    /// Aggregate distance, time and elevation per month
    Monthly {
        /// Number of months including the current one
        #[arg(short, long, default_value_t = 3)]
        months: u32,

        /// Include the raw activities for each month
        #[arg(long)]
        raw: bool,
    },

    /// Delete stored credentials
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let store = FileStore::open(&config.credentials_path)
        .await
        .context("Failed to open credential store")?;
    let app = Trailbook::new(config, Arc::new(store)).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Login { callback } => login(&app, callback).await,
        Commands::Status => {
            let state = app.oauth().load().await?;
            print_json(&serde_json::json!({
                "authenticated": state == AuthState::Authenticated,
            }))
        }
        Commands::Activities {
            page,
            per_page,
            before,
            after,
            all,
        } => {
            let pager = app.pager().with_filter(ActivityFilter { before, after });
            let activities = if all {
                let (activities, pages) = pager.fetch_all(per_page).await?;
                tracing::info!(pages, count = activities.len(), "Fetched all activities");
                activities
            } else {
                pager.fetch_page(page, per_page).await?
            };
            print_json(&activities)
        }
        Commands::Monthly { months, raw } => {
            let report = app.aggregator().aggregate(months).await;
            if let Some(diagnostic) = &report.diagnostic {
                if diagnostic.is_auth_error() {
                    eprintln!("Your session has expired. Run `trailbook login` to continue.");
                }
            }

            let mut out = serde_json::json!({
                "aggregates": report.aggregates,
                "stop": report.stop,
                "pages_fetched": report.pages_fetched,
                "complete": report.is_complete(),
                "diagnostic": report.diagnostic.as_ref().map(|e| e.to_string()),
            });
            if raw {
                out["raw"] = serde_json::to_value(&report.raw)?;
            }
            print_json(&out)
        }
        Commands::Logout => {
            app.oauth().logout().await?;
            eprintln!("Logged out.");
            Ok(())
        }
    }
}

async fn login(app: &Trailbook, callback: Option<String>) -> anyhow::Result<()> {
    let mut oauth = app.oauth();
    oauth.load().await?;

    let auth_url = oauth.initiate();
    let callback_url = match callback {
        Some(url) => url,
        None => {
            if let Err(e) = open::that(&auth_url) {
                tracing::warn!(error = %e, "Failed to open browser automatically");
            }
            eprintln!("Open this URL to authorize Trailbook:\n\n{}\n", auth_url);
            eprintln!("Then paste the URL you were redirected to:");

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            input.trim().to_string()
        }
    };

    match oauth.handle_callback(&callback_url).await? {
        AuthState::Authenticated => {
            eprintln!("Authentication successful!");
            Ok(())
        }
        state => anyhow::bail!("Authorization not completed (state: {:?})", state),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize structured JSON logging on stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trailbook=info,warn"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
