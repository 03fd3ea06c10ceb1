use std::collections::HashMap;

use serde::Serialize;

use crate::manifest::PackEntry;

/// The memory allocations offered to the user, in MB (2 GB through 16 GB).
pub const MEMORY_OPTIONS_MB: [u32; 8] = [2048, 4096, 6144, 8192, 10240, 12288, 14336, 16384];

/// Used whenever a memory string cannot be understood.
const FALLBACK_MEMORY_MB: u32 = 4096;

/// Position of the 8192 MB option, preselected when nothing is recommended.
const DEFAULT_MEMORY_INDEX: usize = 3;

/// One row of the memory dropdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryOption {
    pub memory_mb: u32,
    pub recommended: bool,
}

/// Everything the import mechanism needs to install a chosen pack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImportRequest {
    pub pack_name: String,
    pub pack_version: String,
    pub download_url: String,
    pub memory_mb: u32,
    pub extra_metadata: HashMap<String, String>,
}

/// Convert strings like "8G" or "512M" to megabytes.
///
/// A missing unit letter means gigabytes; anything unparsable resolves to the
/// 4096 MB default. Never fails.
pub fn memory_string_to_mb(text: &str) -> u32 {
    if text.is_empty() {
        return FALLBACK_MEMORY_MB;
    }

    let upper = text.to_ascii_uppercase();
    let (digits, multiplier) = if let Some(rest) = upper.strip_suffix('M') {
        (rest, 1)
    } else if let Some(rest) = upper.strip_suffix('G') {
        (rest, 1024)
    } else {
        (upper.as_str(), 1024)
    };

    digits
        .parse::<u32>()
        .ok()
        .and_then(|value| value.checked_mul(multiplier))
        .unwrap_or(FALLBACK_MEMORY_MB)
}

/// The fixed memory choices, with the single option matching the pack's
/// recommendation marked. An unrecognized recommendation marks nothing.
pub fn memory_options(recommended_text: &str) -> Vec<MemoryOption> {
    let recommended_mb = memory_string_to_mb(recommended_text);
    MEMORY_OPTIONS_MB
        .iter()
        .map(|&memory_mb| MemoryOption {
            memory_mb,
            recommended: memory_mb == recommended_mb,
        })
        .collect()
}

/// Which option to preselect: the recommended one, else 8 GB.
pub fn default_memory_index(options: &[MemoryOption]) -> usize {
    options
        .iter()
        .position(|o| o.recommended)
        .unwrap_or(DEFAULT_MEMORY_INDEX)
}

/// Which pack to preselect: the manifest's default pack, else the first.
pub fn initial_pack_index(packs: &[PackEntry], default_name: &str) -> usize {
    if default_name.is_empty() {
        return 0;
    }
    packs
        .iter()
        .position(|p| p.name == default_name)
        .unwrap_or(0)
}

/// Display form of a pack, e.g. "SuperTruckPack (v2.0)".
pub fn pack_label(entry: &PackEntry) -> String {
    format!("{} (v{})", entry.name, entry.version)
}

/// Display form of a memory option, e.g. "8 GB (Recommended)".
pub fn memory_label(option: MemoryOption) -> String {
    let gb = option.memory_mb / 1024;
    if option.recommended {
        format!("{gb} GB (Recommended)")
    } else {
        format!("{gb} GB")
    }
}

/// Build the import request for a chosen pack and memory allocation.
///
/// `memory_mb` is not checked against the option set; callers source it from
/// [`memory_options`]. Pure construction, no side effects.
pub fn build_import_request(entry: &PackEntry, memory_mb: u32) -> ImportRequest {
    let mut extra_metadata = HashMap::new();
    extra_metadata.insert("TruckPack".to_owned(), "true".to_owned());
    extra_metadata.insert("TruckPackName".to_owned(), entry.name.clone());
    extra_metadata.insert("TruckPackVersion".to_owned(), entry.version.clone());
    extra_metadata.insert("MaxMemAlloc".to_owned(), memory_mb.to_string());

    ImportRequest {
        pack_name: entry.name.clone(),
        pack_version: entry.version.clone(),
        download_url: entry.download_url.clone(),
        memory_mb,
        extra_metadata,
    }
}
