//! Seed data loader - fills the geo-reference, postal-code and profile tables
//!
//! Run with: cargo run --bin seed-data -- --file seeds.json [--repair]
//!
//! The file holds three optional arrays: `geo_references`, `postal_codes`, `profiles`.
//! Profiles without coordinates are placed at their city's reference coordinate.

use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use showmatch_api::{
    config,
    db,
    entities::profile,
    models::{Coordinate, ProfileKind},
    repositories::Stores,
    services::{geo_reference::GeoReferenceService, geocoding::DistanceResolver},
};

#[derive(Debug, Parser)]
#[command(name = "seed-data", about = "Load geo reference data and demo profiles")]
struct Cli {
    /// JSON file to load
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Recompute every normalized city key after loading
    #[arg(long)]
    repair: bool,

    /// Overrides the configured database URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Skip running migrations before loading
    #[arg(long)]
    no_migrate: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeedFile {
    geo_references: Vec<GeoReferenceSeed>,
    postal_codes: Vec<PostalCodeSeed>,
    profiles: Vec<ProfileSeed>,
}

#[derive(Debug, Deserialize)]
struct GeoReferenceSeed {
    city: String,
    state: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct PostalCodeSeed {
    code: String,
    city: String,
    state: String,
}

#[derive(Debug, Deserialize)]
struct ProfileSeed {
    id: Option<Uuid>,
    kind: ProfileKind,
    display_name: String,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    service_radius_km: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mut cfg = config::load_config().context("failed to load configuration")?;
    if let Some(url) = cli.database_url.clone() {
        cfg.database_url = url;
    }
    if cfg.uses_in_memory_store() {
        anyhow::bail!("seed-data needs a real database; set DATABASE_URL or APP__DATABASE_URL");
    }

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to the database")?;
    if !cli.no_migrate {
        db::run_migrations(&pool).await?;
    }
    let stores = Stores::database(Arc::new(pool));
    let geo = GeoReferenceService::new(stores.geo_references.clone(), stores.postal_codes.clone());

    if let Some(path) = &cli.file {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let seeds: SeedFile = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        load(&stores, &geo, seeds).await?;
    }

    if cli.repair {
        let changed = geo.repair_normalized_index().await?;
        info!("Normalized index repaired: {} row(s) rewritten", changed);
    }

    if cli.file.is_none() && !cli.repair {
        warn!("Nothing to do; pass --file and/or --repair");
    }
    Ok(())
}

async fn load(stores: &Stores, geo: &GeoReferenceService, seeds: SeedFile) -> Result<()> {
    for entry in &seeds.geo_references {
        let coordinate = Coordinate::new(entry.latitude, entry.longitude)?;
        geo.upsert_entry(&entry.city, &entry.state, coordinate)
            .await
            .with_context(|| format!("geo reference {}/{}", entry.city, entry.state))?;
    }
    info!("Loaded {} geo reference row(s)", seeds.geo_references.len());

    for entry in &seeds.postal_codes {
        geo.upsert_postal_code(&entry.code, &entry.city, &entry.state)
            .await
            .with_context(|| format!("postal code {}", entry.code))?;
    }
    info!("Loaded {} postal code(s)", seeds.postal_codes.len());

    let resolver = DistanceResolver::new(stores.geo_references.clone(), stores.postal_codes.clone());
    let mut loaded = 0;
    for seed in seeds.profiles {
        let coordinate = match Coordinate::from_parts(seed.latitude, seed.longitude) {
            Some(c) => Some(c),
            None => match (&seed.city, &seed.state) {
                (Some(city), Some(state)) => resolver.resolve_by_city_state(city, state).await.ok(),
                _ => None,
            },
        };
        if coordinate.is_none() {
            warn!(name = %seed.display_name, "profile has no resolvable location; it will never match a search");
        }

        let model = profile::Model {
            id: seed.id.unwrap_or_else(Uuid::new_v4),
            kind: seed.kind,
            display_name: seed.display_name,
            city: seed.city,
            state: seed.state,
            postal_code: seed.postal_code,
            latitude: coordinate.map(|c| c.latitude()),
            longitude: coordinate.map(|c| c.longitude()),
            service_radius_km: seed.service_radius_km,
            created_at: Utc::now(),
            updated_at: None,
        };
        stores.profiles.insert(model).await?;
        loaded += 1;
    }
    info!("Loaded {} profile(s)", loaded);

    Ok(())
}
