//! SSA Operator Console
//!
//! Command-line front end to the SSA dashboard session: catalog queries,
//! ground tracks, conjunction scenes and maneuver planning against a live
//! backend. Map scenes are written as GeoJSON.
//!
//! Usage:
//!   ssa-console --api-base http://localhost:8000 stats
//!   ssa-console track 25544 48274 --out tracks.geojson
//!   ssa-console conjunction 25544 ISS 48274 CSS 2024-01-01T12:00:00Z
//!   ssa-console maneuver --alert-index 0 --target-miss 2.0

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use ssa_gateway::{parse_timestamp, EventType, GatewayConfig, HttpGateway, SatelliteId};
use ssa_overlay::{ConjunctionScene, Dashboard, GeoJsonSurface, Notice, SearchOutcome};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type ConsoleDashboard = Dashboard<HttpGateway, GeoJsonSurface>;

#[derive(Parser, Debug)]
#[command(name = "ssa-console", about = "Space situational awareness operator console")]
struct Args {
    /// Backend base URL (overrides SSA_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Request timeout in seconds (overrides SSA_API_TIMEOUT_SEC)
    #[arg(long)]
    timeout_sec: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Backend health, catalog size and latest alerts
    Stats,
    /// Search the catalog by name
    Search { query: String },
    /// List catalog entries
    Satellites {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Render ground tracks for one or more satellites
    Track {
        #[arg(required = true)]
        ids: Vec<u32>,
        /// Write the scene here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List conjunction or docking alerts
    Alerts {
        #[arg(long = "type", default_value = "COLLISION")]
        event_type: EventType,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Build the hazard scene for two objects
    Conjunction {
        primary_id: u32,
        primary_name: String,
        secondary_id: u32,
        secondary_name: String,
        /// Time of closest approach (RFC 3339 or naive UTC)
        tca: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Plan an avoidance maneuver for a loaded alert
    Maneuver {
        #[arg(long)]
        alert_index: usize,
        #[arg(long)]
        target_miss: f64,
        #[arg(long = "type", default_value = "COLLISION")]
        event_type: EventType,
    },
    /// Reload TLEs from the upstream catalog
    RefreshTles,
    /// Run conjunction screening over the catalog
    Screen,
    /// Train the orbital-regime classifier
    Train,
    /// Classify the catalog and show the results
    Classify,
    /// Show the latest classifier performance report
    Report,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

fn write_scene(dashboard: &ConsoleDashboard, out: Option<PathBuf>) -> Result<()> {
    let scene = dashboard.registry().surface().to_feature_collection();
    match out {
        Some(path) => {
            info!("Writing scene to {:?}", path);
            let file = File::create(&path).with_context(|| format!("creating {:?}", path))?;
            serde_json::to_writer_pretty(BufWriter::new(file), &scene)?;
            Ok(())
        }
        None => print_json(&scene),
    }
}

/// Surface notices the session raised; errors still propagate via `?`
fn flush_notices(dashboard: &mut ConsoleDashboard) {
    for notice in dashboard.view_mut().take_notices() {
        match notice {
            Notice::Info(message) => info!("{}", message),
            Notice::Error(message) => warn!("{}", message),
        }
    }
    if let Some(status) = dashboard.view_mut().status.take() {
        info!("status: {}", status);
    }
}

async fn run(dashboard: &mut ConsoleDashboard, command: Command) -> Result<()> {
    match command {
        Command::Stats => {
            dashboard.load_dashboard_stats().await;
            print_json(&dashboard.view().stats)?;
        }
        Command::Search { query } => match dashboard.search(&query).await {
            SearchOutcome::Results(_) => print_json(&dashboard.view().search_results)?,
            SearchOutcome::Hidden => return Err(anyhow!("query must be at least 2 characters")),
            SearchOutcome::Failed(e) => return Err(e.into()),
            SearchOutcome::Superseded => {}
        },
        Command::Satellites { .. } => {
            dashboard.load_satellites().await?;
            print_json(&dashboard.view().satellite_rows)?;
        }
        Command::Track { ids, out } => {
            for id in ids {
                dashboard.add_satellite(SatelliteId(id), None, None).await?;
            }
            print_json(&dashboard.view().active_satellites)?;
            write_scene(dashboard, out)?;
        }
        Command::Alerts { event_type, .. } => {
            let count = dashboard.load_alerts(event_type).await?;
            info!("{} {} alerts", count, event_type);
            print_json(&dashboard.view().alert_rows)?;
        }
        Command::Conjunction {
            primary_id,
            primary_name,
            secondary_id,
            secondary_name,
            tca,
            out,
        } => {
            let tca = parse_timestamp(&tca).ok_or_else(|| anyhow!("invalid TCA: {}", tca))?;
            let scene = ConjunctionScene {
                primary_id: SatelliteId(primary_id),
                primary_name,
                secondary_id: SatelliteId(secondary_id),
                secondary_name,
                tca,
            };
            let outcome = dashboard.visualize_conjunction(&scene).await?;
            if !outcome.marker_placed() {
                warn!("No closest-approach sample; scene has no hazard marker");
            }
            write_scene(dashboard, out)?;
        }
        Command::Maneuver {
            alert_index,
            target_miss,
            event_type,
        } => {
            dashboard.load_alerts(event_type).await?;
            let alert = dashboard
                .alerts()
                .get(alert_index)
                .cloned()
                .ok_or_else(|| anyhow!("no {} alert at index {}", event_type, alert_index))?;
            dashboard.select_alert(alert);
            print_json(&dashboard.view().selected_alert)?;
            let panel = dashboard.calculate_maneuver(target_miss).await?;
            print_json(&panel.fields())?;
        }
        Command::RefreshTles => {
            let summary = dashboard.refresh_tles().await?;
            print_json(&summary)?;
        }
        Command::Screen => {
            let summary = dashboard.run_screening().await?;
            print_json(&summary)?;
        }
        Command::Train => {
            let message = dashboard.train_classifier().await?;
            info!("{}", message);
        }
        Command::Classify => {
            dashboard.run_classification().await?;
            print_json(&dashboard.view().classification_rows)?;
        }
        Command::Report => {
            if dashboard.load_performance_report().await? {
                print_json(&dashboard.view().performance)?;
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "ssa_console=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = GatewayConfig::from_env();
    if let Some(base) = args.api_base {
        config = config.with_base_url(base);
    }
    if let Some(timeout) = args.timeout_sec {
        config = config.with_timeout_sec(timeout);
    }
    match &args.command {
        Command::Satellites { limit: Some(limit) } => config.satellite_list_limit = *limit,
        Command::Alerts { limit: Some(limit), .. } => config.alert_limit = *limit,
        _ => {}
    }
    info!("SSA backend: {}", config.base_url);

    let gateway = HttpGateway::new(config.clone())?;
    let mut dashboard = Dashboard::new(gateway, GeoJsonSurface::new(), config);

    let result = run(&mut dashboard, args.command).await;
    flush_notices(&mut dashboard);
    result
}
