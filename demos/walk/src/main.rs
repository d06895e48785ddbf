//! walk — plan a night walk across a small synthetic (or CSV-loaded) city.
//!
//! Ranks route options between two points, finds the nearest refuge, scans
//! the surrounding area for risk zones and forecasts hotspots a week ahead.
//!
//! ```text
//! RUST_LOG=debug cargo run -p walk -- --from 42.8746,74.5698 --to 42.8790,74.5930
//! cargo run -p walk -- --data-dir data/bishkek --config walk.example.toml --json
//! ```

mod provider;
mod synthetic;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};

use sr_core::{CrowdedArea, GeoPoint, RiskConfig, RouteConfig, ScanConfig};
use sr_risk::{BoundingBox, GridRiskScanner, Hotspot, RiskDatasets, RiskModel, RiskZone, ZoneAverages};
use sr_route::{RouteOption, SafeRoutePlanner, SosRoute};

use provider::StraightLineProvider;
use synthetic::build_city;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "walk", about = "Rank walking routes by safety")]
struct Cli {
    /// Origin as `lat,lon`
    #[arg(long, value_parser = parse_point, default_value = "42.8746,74.5698")]
    from: GeoPoint,

    /// Destination as `lat,lon`
    #[arg(long, value_parser = parse_point, default_value = "42.8790,74.5930")]
    to: GeoPoint,

    /// TOML file with optional `[risk]`, `[route]` and `[scan]` tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with incidents.csv, complaints.csv, safe_places.csv and
    /// lit_segments.csv; a synthetic city is generated when omitted
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Seed for the synthetic city
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn parse_point(s: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = s.split_once(',').ok_or_else(|| format!("expected `lat,lon`, got {s:?}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude {lat:?}: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude {lon:?}: {e}"))?;
    GeoPoint::try_new(lat, lon).map_err(|e| e.to_string())
}

// ── Config file ───────────────────────────────────────────────────────────────

#[derive(Default, Deserialize)]
#[serde(default)]
struct WalkConfig {
    risk: RiskConfig,
    route: RouteConfig,
    scan: ScanConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<WalkConfig> {
    let Some(path) = path else {
        return Ok(WalkConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: WalkConfig = toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    log::info!("loaded configuration from {}", path.display());
    Ok(config)
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Report {
    options: Vec<RouteOption>,
    sos: Option<SosRoute>,
    zones: Vec<RiskZone>,
    hotspots: Vec<Hotspot>,
    /// Risk at the origin relative to its cell average.
    origin_anomaly: Option<f64>,
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let now = Utc::now();

    // 1. Datasets.
    let (datasets, crowded): (RiskDatasets, Vec<CrowdedArea>) = match &cli.data_dir {
        Some(dir) => (RiskDatasets::load_dir(dir)?, Vec::new()),
        None => build_city(cli.seed, now),
    };
    log::info!(
        "datasets: {} incidents, {} complaints, {} safe places, {} lit segments",
        datasets.incidents.len(),
        datasets.complaints.len(),
        datasets.safe_places.len(),
        datasets.lit_segments.len()
    );

    // 2. Model and planner.
    let model = RiskModel::new(datasets, config.risk)?;
    let planner = SafeRoutePlanner::new(model.clone(), Arc::new(StraightLineProvider::default()), config.route)?
        .with_crowded_areas(crowded);

    let t0 = Instant::now();
    let options = planner.plan(cli.from, cli.to, now);
    let sos = planner.sos(cli.from);
    log::debug!("planning took {:.1} ms", t0.elapsed().as_secs_f64() * 1e3);

    // 3. Scan a box around both endpoints plus a margin.
    let margin = 0.01;
    let around = BoundingBox::around(&[cli.from, cli.to]).context("empty point set")?;
    let bounds = BoundingBox::new(
        around.south - margin,
        around.west - margin,
        around.north + margin,
        around.east + margin,
    )?;
    let scanner = GridRiskScanner::new(&model, config.scan)?;

    let t0 = Instant::now();
    let zones = scanner.scan_zones(&bounds, now);
    let hotspots = scanner.scan_hotspots(&bounds, now + Duration::days(7));
    let averages = ZoneAverages::compute(&scanner, &bounds, now);
    log::debug!("scanning took {:.1} ms", t0.elapsed().as_secs_f64() * 1e3);

    let origin_anomaly = averages.anomaly_ratio(cli.from, model.risk_at_point(cli.from, now));
    let report = Report { options, sos, zones, hotspots, origin_anomaly };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, cli.from, cli.to);
    }
    Ok(())
}

fn print_report(report: &Report, from: GeoPoint, to: GeoPoint) {
    println!("=== walk: {from} → {to} ===");
    println!();

    if report.options.is_empty() {
        println!("No routes available.");
    } else {
        println!("{:<4} {:<14} {:>8} {:>8} {:>7} {:>7}  {}", "#", "Kind", "Score", "Risk", "Lit %", "Crowd %", "Description");
        println!("{}", "-".repeat(96));
        for (i, o) in report.options.iter().enumerate() {
            println!(
                "{:<4} {:<14} {:>8.2} {:>8.3} {:>7.0} {:>7.0}  {}{}",
                i + 1,
                format!("{:?}", o.kind),
                o.evaluation.total_score,
                o.evaluation.base.avg_risk,
                o.evaluation.light_coverage_pct,
                o.evaluation.crowd_coverage_pct,
                o.description,
                if o.passes_safe_place { " [safe place]" } else { "" },
            );
        }
    }
    println!();

    match &report.sos {
        Some(sos) => println!(
            "SOS: {} ({}) {:.0} m away, ~{:.0} min on foot",
            sos.place.label(),
            sos.place.kind,
            sos.straight_line_m,
            sos.route.duration_s / 60.0
        ),
        None => println!("SOS: no safe place reachable"),
    }
    if let Some(ratio) = report.origin_anomaly {
        println!("Origin risk is {ratio:.2}x its area average");
    }
    println!();

    println!("Risk zones now: {}  |  hotspots in 7 days: {}", report.zones.len(), report.hotspots.len());
    for z in report.zones.iter().take(5) {
        println!("  {}  risk {:.2}  r={:.0} m", z.center, z.risk, z.radius_m);
    }
}
