use std::fmt;

use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::networking::ManifestClient;

pub mod models;

pub use models::{Manifest, PackEntry};

/// Whole-document parse failures. Individual bad pack entries are skipped
/// instead of failing the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Malformed(String),
    NotAnObject,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Malformed(detail) => write!(f, "manifest is not valid JSON: {detail}"),
            ParseError::NotAnObject => write!(f, "manifest root is not a JSON object"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Completion signals sent to whoever drives the store (the UI layer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManifestEvent {
    Loaded,
    Failed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

/// An available update for an installed pack instance, phrased for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackUpdate {
    pub pack_name: String,
    pub current_version: String,
    pub latest_version: String,
}

/// Fetches the remote pack manifest and serves queries against the most
/// recent successful parse.
///
/// Queries keep answering from the last good manifest while a refresh is in
/// flight or after a failed one; only a successful parse replaces the table,
/// and it replaces it wholesale.
pub struct ManifestStore {
    client: ManifestClient,
    manifest: Manifest,
    state: LoadState,
    loaded: bool,
}

impl ManifestStore {
    pub fn new(client: ManifestClient) -> Self {
        Self {
            client,
            manifest: Manifest::default(),
            state: LoadState::Unloaded,
            loaded: false,
        }
    }

    /// Fetch the manifest once and apply the result, reporting completion on
    /// `updates`. A call while a fetch is already in flight is ignored; the
    /// store never processes two fetches into the same table.
    pub async fn load(&mut self, updates: &mpsc::UnboundedSender<ManifestEvent>) {
        if !self.begin_load() {
            debug!("manifest: load requested while a fetch is in flight; ignoring");
            return;
        }
        info!("manifest: fetching pack manifest from {}", self.client.url());
        match self.client.fetch_bytes().await {
            Ok(bytes) => self.apply_payload(&bytes, updates),
            Err(reason) => {
                warn!("manifest: fetch failed: {reason}");
                self.state = LoadState::Failed;
                let _ = updates.send(ManifestEvent::Failed(reason));
            }
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Whether any fetch has ever parsed successfully. Stays true across
    /// later failed refreshes, since the old table is still being served.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// All packs in manifest order.
    pub fn available_packs(&self) -> &[PackEntry] {
        self.manifest.packs()
    }

    pub fn default_pack_name(&self) -> &str {
        &self.manifest.default_pack
    }

    pub fn pack_info(&self, name: &str) -> Option<&PackEntry> {
        self.manifest.get(name)
    }

    pub fn latest_version(&self, name: &str) -> Option<&str> {
        self.manifest.get(name).map(|p| p.version.as_str())
    }

    /// Whether the pack embedded in `instance_label` is behind the manifest.
    ///
    /// Instance labels have no canonical pack id, so this matches the first
    /// entry whose name is a case-insensitive substring of the label. No
    /// match means "not outdated".
    pub fn is_pack_outdated(&self, instance_label: &str, current_version: &str) -> bool {
        match self.find_pack_for_label(instance_label) {
            Some(pack) => current_version != pack.version,
            None => false,
        }
    }

    /// Like [`is_pack_outdated`](Self::is_pack_outdated), but carries the
    /// matched pack's name and versions so the caller can phrase an update
    /// prompt.
    pub fn check_pack_update(
        &self,
        instance_label: &str,
        current_version: &str,
    ) -> Option<PackUpdate> {
        let pack = self.find_pack_for_label(instance_label)?;
        if current_version == pack.version {
            return None;
        }
        Some(PackUpdate {
            pack_name: pack.name.clone(),
            current_version: current_version.to_owned(),
            latest_version: pack.version.clone(),
        })
    }

    fn find_pack_for_label(&self, instance_label: &str) -> Option<&PackEntry> {
        let label = instance_label.to_lowercase();
        self.manifest
            .packs()
            .iter()
            .find(|pack| label.contains(&pack.name.to_lowercase()))
    }

    /// Claim the in-flight slot. Returns false when a fetch is already
    /// running; `Loaded -> Loading` and `Failed -> Loading` are both fine.
    fn begin_load(&mut self) -> bool {
        if self.state == LoadState::Loading {
            return false;
        }
        self.state = LoadState::Loading;
        true
    }

    /// Parse a fetched payload and swap it in. On a parse failure the prior
    /// manifest is left untouched so queries never see a half-applied load.
    fn apply_payload(&mut self, bytes: &[u8], updates: &mpsc::UnboundedSender<ManifestEvent>) {
        match parse_manifest(bytes) {
            Ok(manifest) => {
                info!(
                    "manifest: loaded {} packs (default: {:?})",
                    manifest.len(),
                    manifest.default_pack
                );
                self.manifest = manifest;
                self.loaded = true;
                self.state = LoadState::Loaded;
                let _ = updates.send(ManifestEvent::Loaded);
            }
            Err(err) => {
                warn!("manifest: {err}");
                self.state = LoadState::Failed;
                let _ = updates.send(ManifestEvent::Failed(err.to_string()));
            }
        }
    }
}

/// Decode a manifest document.
///
/// `default_pack` and `packs` may be missing or wrong-typed without failing
/// the document; a pack entry missing any of name/version/url is dropped with
/// a warning while the rest still load.
pub fn parse_manifest(bytes: &[u8]) -> Result<Manifest, ParseError> {
    let root: Value =
        serde_json::from_slice(bytes).map_err(|e| ParseError::Malformed(e.to_string()))?;
    let root = root.as_object().ok_or(ParseError::NotAnObject)?;

    let mut manifest = Manifest::with_default_pack(text_field(root, "default_pack"));
    if !manifest.default_pack.is_empty() {
        debug!("manifest: default pack is {}", manifest.default_pack);
    }

    let items = root.get("packs").and_then(Value::as_array);
    for item in items.into_iter().flatten() {
        let Some(fields) = item.as_object() else {
            warn!("manifest: skipping non-object pack entry");
            continue;
        };
        let entry = PackEntry {
            name: text_field(fields, "pack_name"),
            version: text_field(fields, "pack_version"),
            download_url: text_field(fields, "pack_url"),
            recommended_ram: text_field(fields, "recommended_ram"),
        };
        if entry.name.is_empty() || entry.version.is_empty() || entry.download_url.is_empty() {
            warn!("manifest: skipping incomplete pack entry {:?}", entry.name);
            continue;
        }
        debug!(
            "manifest: pack {} version {} (recommended RAM {:?})",
            entry.name, entry.version, entry.recommended_ram
        );
        manifest.upsert(entry);
    }

    Ok(manifest)
}

fn text_field(obj: &serde_json::Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}
