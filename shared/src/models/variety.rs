//! Sugarcane variety models and the harvest-day table

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Harvest days used for any variety missing from the table
pub const DEFAULT_HARVEST_DAYS: u32 = 365;

/// Version tag of the built-in variety table
pub const STANDARD_TABLE_VERSION: &str = "2024.1";

/// Sugarcane cultivars commonly planted by SRA-registered farms
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SugarcaneVariety {
    Psr07195,
    Psr03171,
    Psr200034,
    Phil931601,
    Phil940913,
    Phil991793,
    Lcp85384,
    Ps1,
    Vmc88354,
    Vmc84524,
    /// Any cultivar not in the built-in list
    Other(String),
}

impl SugarcaneVariety {
    pub const KNOWN: [SugarcaneVariety; 10] = [
        SugarcaneVariety::Psr07195,
        SugarcaneVariety::Psr03171,
        SugarcaneVariety::Psr200034,
        SugarcaneVariety::Phil931601,
        SugarcaneVariety::Phil940913,
        SugarcaneVariety::Phil991793,
        SugarcaneVariety::Lcp85384,
        SugarcaneVariety::Ps1,
        SugarcaneVariety::Vmc88354,
        SugarcaneVariety::Vmc84524,
    ];

    /// Parse a free-text label. Case and whitespace are ignored, so
    /// `"lcp 85-384"` and `"LCP85-384"` both resolve to [`SugarcaneVariety::Lcp85384`].
    pub fn parse(label: &str) -> Self {
        let key = variety_key(label);
        Self::KNOWN
            .iter()
            .find(|known| variety_key(known.label()) == key)
            .cloned()
            .unwrap_or_else(|| SugarcaneVariety::Other(label.trim().to_string()))
    }

    /// Canonical display label
    pub fn label(&self) -> &str {
        match self {
            SugarcaneVariety::Psr07195 => "PSR 07-195",
            SugarcaneVariety::Psr03171 => "PSR 03-171",
            SugarcaneVariety::Psr200034 => "PSR 2000-34",
            SugarcaneVariety::Phil931601 => "Phil 93-1601",
            SugarcaneVariety::Phil940913 => "Phil 94-0913",
            SugarcaneVariety::Phil991793 => "Phil 99-1793",
            SugarcaneVariety::Lcp85384 => "LCP 85-384",
            SugarcaneVariety::Ps1 => "PS 1",
            SugarcaneVariety::Vmc88354 => "VMC 88-354",
            SugarcaneVariety::Vmc84524 => "VMC 84-524",
            SugarcaneVariety::Other(name) => name,
        }
    }

    /// Nominal days from planting to harvest, `None` for unlisted cultivars
    pub fn nominal_harvest_days(&self) -> Option<u32> {
        match self {
            SugarcaneVariety::Psr07195 | SugarcaneVariety::Psr03171 => Some(345),
            SugarcaneVariety::Psr200034 => Some(355),
            SugarcaneVariety::Phil931601
            | SugarcaneVariety::Phil940913
            | SugarcaneVariety::Phil991793 => Some(360),
            SugarcaneVariety::Lcp85384 | SugarcaneVariety::Ps1 => Some(365),
            SugarcaneVariety::Vmc88354 => Some(370),
            SugarcaneVariety::Vmc84524 => Some(375),
            SugarcaneVariety::Other(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SugarcaneVariety::Other(_))
    }
}

impl From<&str> for SugarcaneVariety {
    fn from(label: &str) -> Self {
        SugarcaneVariety::parse(label)
    }
}

impl From<String> for SugarcaneVariety {
    fn from(label: String) -> Self {
        SugarcaneVariety::parse(&label)
    }
}

impl From<SugarcaneVariety> for String {
    fn from(variety: SugarcaneVariety) -> Self {
        variety.label().to_string()
    }
}

impl std::fmt::Display for SugarcaneVariety {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Lookup key: lowercase with all whitespace removed
fn variety_key(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One row of the variety table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarietyEntry {
    pub label: String,
    pub harvest_days: u32,
}

/// Result of resolving a variety label against a [`VarietyTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarietyLookup {
    pub harvest_days: u32,
    /// `false` when the label was not in the table and the default was used
    pub known: bool,
}

/// Versioned mapping from variety label to nominal harvest days.
///
/// Serialized as a list of [`VarietyEntry`] rows; lookup keys are rebuilt
/// from the labels on deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "VarietyTableRows", into = "VarietyTableRows")]
pub struct VarietyTable {
    pub version: String,
    pub default_harvest_days: u32,
    entries: BTreeMap<String, VarietyEntry>,
}

#[derive(Serialize, Deserialize)]
struct VarietyTableRows {
    version: String,
    default_harvest_days: u32,
    #[serde(default)]
    entries: Vec<VarietyEntry>,
}

impl From<VarietyTableRows> for VarietyTable {
    fn from(rows: VarietyTableRows) -> Self {
        let mut table = VarietyTable::empty(rows.default_harvest_days).with_version(rows.version);
        for entry in &rows.entries {
            table.insert(&entry.label, entry.harvest_days);
        }
        table
    }
}

impl From<VarietyTable> for VarietyTableRows {
    fn from(table: VarietyTable) -> Self {
        Self {
            version: table.version,
            default_harvest_days: table.default_harvest_days,
            entries: table.entries.into_values().collect(),
        }
    }
}

impl VarietyTable {
    /// The built-in table of ten cultivars
    pub fn standard() -> Self {
        let entries = SugarcaneVariety::KNOWN
            .iter()
            .filter_map(|variety| {
                variety.nominal_harvest_days().map(|days| {
                    (
                        variety_key(variety.label()),
                        VarietyEntry {
                            label: variety.label().to_string(),
                            harvest_days: days,
                        },
                    )
                })
            })
            .collect();

        Self {
            version: STANDARD_TABLE_VERSION.to_string(),
            default_harvest_days: DEFAULT_HARVEST_DAYS,
            entries,
        }
    }

    /// An empty table that resolves every label to `default_harvest_days`
    pub fn empty(default_harvest_days: u32) -> Self {
        Self {
            version: "empty".to_string(),
            default_harvest_days,
            entries: BTreeMap::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_default_harvest_days(mut self, days: u32) -> Self {
        self.default_harvest_days = days;
        self
    }

    /// Add or replace the harvest days for a label
    pub fn with_entry(mut self, label: &str, harvest_days: u32) -> Self {
        self.insert(label, harvest_days);
        self
    }

    pub fn insert(&mut self, label: &str, harvest_days: u32) {
        let canonical = SugarcaneVariety::parse(label);
        self.entries.insert(
            variety_key(label),
            VarietyEntry {
                label: canonical.label().to_string(),
                harvest_days,
            },
        );
    }

    /// Resolve a label. Unknown labels fall back to the default and emit a
    /// warning event; they never fail.
    pub fn lookup(&self, label: &str) -> VarietyLookup {
        match self.entries.get(&variety_key(label)) {
            Some(entry) => VarietyLookup {
                harvest_days: entry.harvest_days,
                known: true,
            },
            None => {
                tracing::warn!(
                    variety = %label,
                    default_days = self.default_harvest_days,
                    table_version = %self.version,
                    "Unknown sugarcane variety, using default harvest days"
                );
                VarietyLookup {
                    harvest_days: self.default_harvest_days,
                    known: false,
                }
            }
        }
    }

    pub fn harvest_days(&self, label: &str) -> u32 {
        self.lookup(label).harvest_days
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(&variety_key(label))
    }

    pub fn entries(&self) -> impl Iterator<Item = &VarietyEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for VarietyTable {
    fn default() -> Self {
        Self::standard()
    }
}
