use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use calc_data::AddonLoader;
use calc_db_sqlite::{SqliteCatalogRepository, database_url};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Load the addon catalog from a CSV file into the database.
///
/// The CSV file should have the following columns:
/// - project_type: website, ecommerce, ai_tools or erp_systems
/// - label: addon name, unique within its project type
/// - description: short description
/// - price: whole złoty
///
/// Addons of every project type named in the file are replaced; other
/// project types keep their current addons.
#[derive(Parser, Debug)]
#[command(name = "calc-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing addon data
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database path or URL (e.g. catalog.db or sqlite:catalog.db?mode=rwc)
    #[arg(short, long, default_value = "catalog.db")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let url = database_url(&args.database);

    let repo = SqliteCatalogRepository::new(&url)
        .await
        .with_context(|| format!("Failed to connect to database: {}", url))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    println!("Loading addons from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = AddonLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", records.len());

    let inserted = AddonLoader::load(&repo, &records)
        .await
        .context("Failed to load addons into database")?;

    println!("Successfully loaded {} addons into the database.", inserted);

    Ok(())
}
