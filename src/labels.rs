// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Class labels and the curated remedy list.
//!
//! [`LabelTable`] maps a model output index to the class name the model was
//! trained on. It is resolved once from a directory-per-class asset layout:
//!
//! ```text
//! assets/
//! ├── Aloe Vera/
//! │   └── 0001.jpg
//! ├── Neem/
//! │   └── ...
//! └── resnet_model.onnx      <- plain files are not classes
//! ```
//!
//! [`SupportedSet`] is the hand-authored list of remedy descriptions the
//! decision policy tests membership against and cycles through.

use std::path::Path;
use std::sync::Arc;

use crate::error::{HealifyError, Result};

/// Remedy text for Neem.
pub const NEEM: &str = "Neem: Acts as an antibacterial and anti-inflammatory agent, used for skin infections and wound healing.";

/// Remedy text for Tulsi.
pub const TULSI: &str = "Tulsi: Known for its immunity-boosting and anti-inflammatory properties, helps in respiratory disorders.";

/// Remedy text for Aloe Vera.
pub const ALOE_VERA: &str =
    "Aloe Vera: Soothes skin irritation, aids in wound healing, and promotes digestive health.";

/// Placeholder entry for plants that are not described.
pub const UNIDENTIFIED: &str = "unidentified";

/// The curated rotation, in order.
pub const CURATED_REMEDIES: [&str; 7] =
    [NEEM, NEEM, UNIDENTIFIED, TULSI, ALOE_VERA, UNIDENTIFIED, NEEM];

/// Ordered class names, indexed by model output position.
///
/// Built once and shared read-only; the index of a name is its identity, so the
/// table is never re-derived after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    names: Arc<[String]>,
}

impl LabelTable {
    /// Resolve the class table from a directory-per-class asset store.
    ///
    /// Every top-level directory that holds at least one entry is a class.
    /// Entries are ordered by name so the mapping is stable across platforms.
    ///
    /// # Errors
    ///
    /// Returns [`HealifyError::ConfigError`] if the directory cannot be enumerated.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        let entries = std::fs::read_dir(dir).map_err(|e| {
            HealifyError::ConfigError(format!("Cannot list label store {}: {e}", dir.display()))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                HealifyError::ConfigError(format!("Cannot list label store {}: {e}", dir.display()))
            })?;
            let path = entry.path();
            if !path.is_dir() || !has_entries(&path) {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        Ok(Self::from_names(names))
    }

    /// Read class names from a text file, one per line. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`HealifyError::ConfigError`] if the file cannot be read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            HealifyError::ConfigError(format!("Cannot read label file {}: {e}", path.display()))
        })?;

        Ok(Self::from_names(
            text.lines().map(str::trim).filter(|line| !line.is_empty()),
        ))
    }

    /// Build a table from names already in model order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Class name at `index`, if the index is in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table has no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All class names in index order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterate `(index, name)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }
}

fn has_entries(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_some())
}

/// Curated remedy descriptions, used as a lookup set and as a rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedSet {
    entries: Vec<String>,
}

impl SupportedSet {
    /// Create a set from an ordered list of descriptions.
    ///
    /// # Errors
    ///
    /// Returns [`HealifyError::ConfigError`] if `entries` is empty, since the
    /// rotation needs at least one position.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        if entries.is_empty() {
            return Err(HealifyError::ConfigError(
                "Supported set must contain at least one entry".to_string(),
            ));
        }
        Ok(Self { entries })
    }

    /// Exact text membership.
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.entries.iter().any(|entry| entry == text)
    }

    /// Entry at rotation position `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&str> {
        self.entries.get(position).map(String::as_str)
    }

    /// Entry at `position` taken modulo the rotation length.
    #[must_use]
    pub fn cyclic(&self, position: usize) -> &str {
        &self.entries[position % self.entries.len()]
    }

    /// Number of positions in the rotation (duplicates included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; kept for API symmetry with collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in rotation order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl Default for SupportedSet {
    fn default() -> Self {
        Self {
            entries: CURATED_REMEDIES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}
