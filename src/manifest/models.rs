use serde::Serialize;

/// One installable truck pack as advertised by the manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackEntry {
    pub name: String,
    pub version: String,
    pub download_url: String,
    /// Advertised memory recommendation, e.g. "8G" or "512M". Empty means none.
    pub recommended_ram: String,
}

/// The most recently parsed server response.
///
/// Entries are unique by name and keep manifest order; a duplicate name
/// replaces the earlier value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    pub default_pack: String,
    packs: Vec<PackEntry>,
}

impl Manifest {
    pub fn with_default_pack(default_pack: String) -> Self {
        Self {
            default_pack,
            packs: Vec::new(),
        }
    }

    pub fn upsert(&mut self, entry: PackEntry) {
        if let Some(existing) = self.packs.iter_mut().find(|p| p.name == entry.name) {
            *existing = entry;
        } else {
            self.packs.push(entry);
        }
    }

    pub fn get(&self, name: &str) -> Option<&PackEntry> {
        self.packs.iter().find(|p| p.name == name)
    }

    pub fn packs(&self) -> &[PackEntry] {
        &self.packs
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, version: &str) -> PackEntry {
        PackEntry {
            name: name.into(),
            version: version.into(),
            download_url: format!("https://packs.example/{name}.zip"),
            recommended_ram: String::new(),
        }
    }

    #[test]
    fn upsert_keeps_first_position_and_last_value() {
        let mut manifest = Manifest::default();
        manifest.upsert(entry("Alpha", "1.0"));
        manifest.upsert(entry("Beta", "1.0"));
        manifest.upsert(entry("Alpha", "2.0"));

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.packs()[0].name, "Alpha");
        assert_eq!(manifest.packs()[0].version, "2.0");
        assert_eq!(manifest.packs()[1].name, "Beta");
    }

    #[test]
    fn lookup_by_name() {
        let mut manifest = Manifest::default();
        manifest.upsert(entry("Alpha", "1.0"));

        assert_eq!(manifest.get("Alpha").map(|p| p.version.as_str()), Some("1.0"));
        assert!(manifest.get("Gamma").is_none());
    }
}
