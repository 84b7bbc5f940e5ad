use anyhow::{bail, Context};
use clap::Parser;
use province_geometry::config::ResolverConfig;
use province_geometry::geometry::{
    find_by_relation, find_province, province_list, to_lat_lng_rings, GeometryResolver, Lookup,
};
use province_geometry::server;
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// provgeo: province boundary resolver
///
/// Resolves Vietnamese province names or OSM relation ids to boundary rings in
/// [lat, lng] order, using OpenStreetMap Nominatim.
///
/// Examples:
///   provgeo "Sơn La"
///   provgeo --osm-id 1903291
///   provgeo --search "Điện Biên"
///   provgeo --list
///   provgeo --serve --port 8090
#[derive(Parser)]
#[command(name = "provgeo", version, about, long_about = None)]
struct Cli {
    /// Province name (relation id → search → built-in bounds).
    #[arg(index = 1)]
    province: Option<String>,

    /// Look up an OSM relation id directly.
    #[arg(long)]
    osm_id: Option<u64>,

    /// Free-text search only, skipping the catalogue.
    #[arg(long)]
    search: Option<String>,

    /// List the built-in province catalogue.
    #[arg(long)]
    list: bool,

    /// Print the raw GeoJSON feature instead of rings.
    #[arg(long)]
    raw: bool,

    /// Offline mode: only built-in data, no network.
    #[arg(long)]
    offline: bool,

    /// Start the HTTP API.
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8090)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ResolverConfig::from_env().context("invalid PROVGEO_* configuration")?;

    if cli.list {
        println!("{}", serde_json::to_string_pretty(&province_list())?);
        return Ok(());
    }

    let mut resolver = GeometryResolver::new(&config);
    resolver.set_offline(cli.offline);

    if cli.serve {
        server::start(&cli.host, cli.port, resolver)
            .await
            .with_context(|| format!("server on {}:{} failed", cli.host, cli.port))?;
        return Ok(());
    }

    if let Some(id) = cli.osm_id {
        let label = match find_by_relation(id) {
            Some(p) => format!("relation {} ({})", id, p.name),
            None => format!("relation {}", id),
        };
        return print_lookup(&label, resolver.lookup_by_osm_id(id).await, cli.raw);
    }

    if let Some(ref name) = cli.search {
        return print_lookup(name, resolver.lookup_by_name(name).await, cli.raw);
    }

    let Some(ref name) = cli.province else {
        bail!("No province specified. Try: provgeo \"Sơn La\", provgeo --osm-id 1903291, or provgeo --list");
    };

    if find_province(name).is_none() {
        tracing::warn!(%name, "not in the built-in catalogue; falling back to search");
    }
    match resolver.resolve_province(name).await {
        Some(boundary) => {
            tracing::info!(province = %boundary.name, source = %boundary.source, "resolved");
            println!("{}", serde_json::to_string_pretty(&boundary)?);
            Ok(())
        }
        None => bail!("No boundary found for '{}'", name),
    }
}

fn print_lookup(label: &str, lookup: Lookup, raw: bool) -> anyhow::Result<()> {
    let feature = match lookup {
        Lookup::Found(f) => f,
        Lookup::NotFound => bail!("No boundary found for {}", label),
        Lookup::Failed(e) => bail!("No boundary found for {}: {}", label, e),
    };

    let out = if raw {
        serde_json::to_value(&*feature)?
    } else {
        json!({
            "name": feature.name(),
            "display_name": feature.display_name(),
            "geometry_type": feature.geometry.kind(),
            "rings": to_lat_lng_rings(&feature.geometry),
        })
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
