//! Print the ranked shelter list to the terminal.
//!
//! Run with: cargo run -p shelterlens-web --bin shelterlens-rank -- --radius 5

use std::path::PathBuf;

use clap::Parser;
use shelterlens_common::{Category, LocatorConfig};
use shelterlens_ranker::{RankedShelter, RankingQuery};
use shelterlens_web::{state::AppState, telemetry};

#[derive(Parser, Debug)]
#[command(name = "shelterlens-rank", version, about = "Rank shelters by distance from the reference point")]
struct Args {
    /// Config file (defaults to $SHELTERLENS_CONFIG or ./shelterlens.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Radius in miles (defaults to ranking.threshold_miles)
    #[arg(short, long)]
    radius: Option<f64>,

    /// Only show these categories (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Also print every shelter regardless of radius
    #[arg(long)]
    all: bool,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();
    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => LocatorConfig::from_path(path)?,
        None => LocatorConfig::load_or_default()?,
    };
    let mut query = RankingQuery::within(args.radius.unwrap_or(config.ranking.threshold_miles));
    if !query.threshold_miles.is_finite() || query.threshold_miles <= 0.0 {
        anyhow::bail!("--radius must be a positive number of miles");
    }
    if !args.categories.is_empty() {
        query.categories = Some(args.categories.iter().map(|c| Category::parse(c)).collect());
    }

    let state = AppState::from_config(config)?;
    let snapshot = state.rank(&query).await;
    let reference = state.pipeline.reference();

    for warning in &snapshot.warnings {
        eprintln!("warning: {}", warning);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot.ranked)?);
        return Ok(());
    }

    if args.all {
        println!("Distances to {}", reference.name);
        print_table(&snapshot.ranked.all);
        println!();
    }

    println!("Shelters Within {} Miles of {}", query.threshold_miles, reference.name);
    if snapshot.ranked.is_empty() {
        println!("Shelter data could not be processed.");
    } else {
        print_table(&snapshot.ranked.nearby);
    }
    Ok(())
}

fn print_table(rows: &[RankedShelter]) {
    let name_w = rows.iter().map(|r| r.shelter.name.chars().count()).max().unwrap_or(4).max(4);
    let cat_w = rows.iter().map(|r| r.shelter.category.label().chars().count()).max().unwrap_or(8).max(8);

    println!("{:<name_w$}  {:<cat_w$}  {:>12}  Address", "Name", "Category", "Distance");
    for r in rows {
        println!(
            "{:<name_w$}  {:<cat_w$}  {:>12}  {}",
            r.shelter.name,
            r.shelter.category.label(),
            r.distance_label(),
            r.shelter.address,
        );
    }
}
