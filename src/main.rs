use clap::Parser;
use env_logger::Env;
use log::{error, info};
use tokio::sync::mpsc;

mod manifest;
mod networking;
mod selection;

use manifest::{ManifestEvent, ManifestStore};
use networking::ManifestClient;

#[derive(Parser, Debug)]
#[command(
    name = "Truck Pack Launcher",
    author,
    version,
    about = "Fetches the truck pack manifest and prepares pack import requests"
)]
struct Cli {
    /// Fetch the manifest from this URL instead of the default endpoint.
    #[arg(long)]
    manifest_url: Option<String>,

    /// Print launcher version and exit without fetching anything.
    #[arg(long)]
    version_only: bool,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if cli.version_only {
        println!("Truck Pack Launcher {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let client = match cli.manifest_url {
        Some(url) => ManifestClient::with_url(url),
        None => ManifestClient::new(),
    };
    let mut store = ManifestStore::new(client);

    let (tx, mut rx) = mpsc::unbounded_channel();
    store.load(&tx).await;
    drop(tx);

    match rx.recv().await {
        Some(ManifestEvent::Loaded) => print_pack_overview(&store),
        Some(ManifestEvent::Failed(reason)) => {
            error!("could not load pack manifest: {reason}");
            std::process::exit(1);
        }
        None => {
            error!("manifest load finished without a completion signal");
            std::process::exit(1);
        }
    }
}

/// Render what the pack page would show: the pack list, the preselected pack,
/// its memory options, and the import request the defaults would produce.
fn print_pack_overview(store: &ManifestStore) {
    let packs = store.available_packs();
    if packs.is_empty() {
        println!("The manifest lists no installable packs.");
        return;
    }

    let selected = selection::initial_pack_index(packs, store.default_pack_name());
    println!("Available truck packs:");
    for (i, pack) in packs.iter().enumerate() {
        let marker = if i == selected { "*" } else { " " };
        println!("  {marker} {}", selection::pack_label(pack));
    }

    let pack = &packs[selected];
    let options = selection::memory_options(&pack.recommended_ram);
    let memory_index = selection::default_memory_index(&options);
    println!("\nMemory options for {}:", pack.name);
    for (i, option) in options.iter().enumerate() {
        let marker = if i == memory_index { "*" } else { " " };
        println!("  {marker} {}", selection::memory_label(*option));
    }

    let request = selection::build_import_request(pack, options[memory_index].memory_mb);
    info!(
        "import request for {} v{}: {} MB from {}",
        request.pack_name, request.pack_version, request.memory_mb, request.download_url
    );
    match serde_json::to_string_pretty(&request) {
        Ok(json) => println!("\nImport request:\n{json}"),
        Err(err) => error!("could not render import request: {err}"),
    }
}
