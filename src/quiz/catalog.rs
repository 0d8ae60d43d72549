//! Country Catalog
//!
//! The finite, immutable-for-session list of countries a quiz draws from.
//! Catalogs are built from a [`CatalogSource`]; entries missing any of the
//! required fields are dropped before the engine ever sees them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// COUNTRY ID
// =============================================================================

/// Stable, opaque country identifier (e.g. an ISO alpha-3 code).
///
/// Guesses are compared by this value only, never by display name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(pub String);

impl CountryId {
    /// Create from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque handle to a flag image (URL or asset path).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagRef(pub String);

// =============================================================================
// COUNTRY
// =============================================================================

/// A single country record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Unique identifier
    pub id: CountryId,
    /// Canonical display name (revealed after every guess)
    pub display_name: String,
    /// Flag image reference
    pub flag_ref: FlagRef,
    /// Region, used as the hint
    pub region: String,
}

impl Country {
    /// Create a country record.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        flag_ref: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            id: CountryId(id.into()),
            display_name: display_name.into(),
            flag_ref: FlagRef(flag_ref.into()),
            region: region.into(),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Errors raised while fetching or parsing a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Dataset file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Dataset was not valid JSON in a supported shape.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Provider-specific fetch failure.
    #[error("catalog fetch failed: {0}")]
    Fetch(String),
}

// =============================================================================
// RAW DATASET RECORDS
// =============================================================================

#[derive(Debug, Deserialize)]
struct RestName {
    common: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestFlags {
    png: Option<String>,
    svg: Option<String>,
}

/// One entry of a country dataset, in either supported shape.
///
/// Every field is optional here; incomplete entries are filtered out by
/// [`RawCountry::into_country`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCountry {
    /// REST-countries shape: `name.common`, `flags.png|svg`, `cca3`, `region`
    Rest {
        name: RestName,
        flags: RestFlags,
        cca3: Option<String>,
        region: Option<String>,
    },
    /// Flat shape matching [`Country`]'s own serialization
    Flat {
        id: Option<String>,
        display_name: Option<String>,
        flag_ref: Option<String>,
        region: Option<String>,
    },
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl RawCountry {
    fn into_country(self) -> Option<Country> {
        let (id, name, flag, region) = match self {
            RawCountry::Rest { name, flags, cca3, region } => {
                let flag = non_empty(flags.png).or_else(|| non_empty(flags.svg));
                (non_empty(cca3), non_empty(name.common), flag, non_empty(region))
            }
            RawCountry::Flat { id, display_name, flag_ref, region } => (
                non_empty(id),
                non_empty(display_name),
                non_empty(flag_ref),
                non_empty(region),
            ),
        };
        Some(Country::new(id?, name?, flag?, region?))
    }
}

/// Parse a JSON dataset into complete country records.
///
/// Entries lacking an id, display name, flag, or region are skipped.
pub fn parse_countries(json: &str) -> Result<Vec<Country>, CatalogError> {
    let raw: Vec<RawCountry> = serde_json::from_str(json)?;
    let total = raw.len();
    let countries: Vec<Country> = raw.into_iter().filter_map(RawCountry::into_country).collect();

    if countries.len() < total {
        debug!("Dropped {} incomplete catalog entries", total - countries.len());
    }

    Ok(countries)
}

// =============================================================================
// CATALOG SOURCE
// =============================================================================

/// Provider of country records.
///
/// Fetching happens once before the first session starts; a failed fetch
/// leaves the engine untouched and retrying is up to the caller.
pub trait CatalogSource {
    /// Fetch every available country.
    fn fetch_catalog(&self) -> Result<Vec<Country>, CatalogError>;
}

/// Catalog source backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    /// Create a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the dataset.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonFileCatalog {
    fn fetch_catalog(&self) -> Result<Vec<Country>, CatalogError> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_countries(&json)
    }
}

/// Catalog source over an in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    countries: Vec<Country>,
}

impl StaticCatalog {
    /// Wrap an existing list.
    pub fn new(countries: Vec<Country>) -> Self {
        Self { countries }
    }
}

impl CatalogSource for StaticCatalog {
    fn fetch_catalog(&self) -> Result<Vec<Country>, CatalogError> {
        Ok(self.countries.clone())
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Immutable list of countries with an id index.
///
/// Uses BTreeMap for the index so iteration order never depends on hashing.
#[derive(Debug, Clone, Default)]
pub struct CountryCatalog {
    countries: Vec<Country>,
    index: BTreeMap<CountryId, usize>,
}

impl CountryCatalog {
    /// Build a catalog, keeping the first record for any repeated id.
    pub fn new(countries: Vec<Country>) -> Self {
        let mut kept = Vec::with_capacity(countries.len());
        let mut index = BTreeMap::new();

        for country in countries {
            if index.contains_key(&country.id) {
                warn!("Duplicate country id {} dropped from catalog", country.id);
                continue;
            }
            index.insert(country.id.clone(), kept.len());
            kept.push(country);
        }

        Self { countries: kept, index }
    }

    /// Fetch from a source and build the catalog.
    pub fn load(source: &dyn CatalogSource) -> Result<Self, CatalogError> {
        let catalog = Self::new(source.fetch_catalog()?);
        info!("Loaded catalog with {} countries", catalog.len());
        Ok(catalog)
    }

    /// Number of countries.
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    /// True when the catalog has no countries.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Country at a catalog index.
    pub fn get(&self, index: usize) -> Option<&Country> {
        self.countries.get(index)
    }

    /// Catalog index of an id.
    pub fn index_of(&self, id: &CountryId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Look up a country by id.
    pub fn find(&self, id: &CountryId) -> Option<&Country> {
        self.index_of(id).and_then(|i| self.get(i))
    }

    /// Iterate in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.countries.iter()
    }

    /// Case-insensitive substring search over display names.
    pub fn search(&self, term: &str) -> Vec<&Country> {
        let needle = term.trim().to_lowercase();
        self.countries
            .iter()
            .filter(|c| c.display_name.to_lowercase().contains(&needle))
            .collect()
    }
}

impl std::ops::Index<usize> for CountryCatalog {
    type Output = Country;

    fn index(&self, index: usize) -> &Country {
        &self.countries[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REST_JSON: &str = r#"[
        {"name": {"common": "France"}, "flags": {"png": "fr.png"}, "cca3": "FRA", "region": "Europe"},
        {"name": {"common": "Japan"}, "flags": {"svg": "jp.svg"}, "cca3": "JPN", "region": "Asia"},
        {"name": {"common": "Nowhere"}, "flags": {}, "cca3": "NWH", "region": "Oceania"},
        {"name": {"common": "Noregion"}, "flags": {"png": "x.png"}, "cca3": "NRG"}
    ]"#;

    #[test]
    fn test_parse_rest_shape_filters_incomplete() {
        let countries = parse_countries(REST_JSON).unwrap();
        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].id, CountryId::from("FRA"));
        assert_eq!(countries[1].flag_ref, FlagRef("jp.svg".into()));
    }

    #[test]
    fn test_parse_flat_shape() {
        let json = r#"[{"id": "BRA", "display_name": "Brazil", "flag_ref": "br.png", "region": "Americas"},
                       {"id": "", "display_name": "Blank", "flag_ref": "b.png", "region": "Europe"}]"#;
        let countries = parse_countries(json).unwrap();
        assert_eq!(countries, vec![Country::new("BRA", "Brazil", "br.png", "Americas")]);
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(parse_countries("{not json"), Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_duplicate_ids_dropped() {
        let catalog = CountryCatalog::new(vec![
            Country::new("FRA", "France", "fr.png", "Europe"),
            Country::new("FRA", "France again", "fr2.png", "Europe"),
            Country::new("JPN", "Japan", "jp.png", "Asia"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find(&"FRA".into()).unwrap().display_name, "France");
        assert_eq!(catalog.index_of(&"JPN".into()), Some(1));
    }

    #[test]
    fn test_search() {
        let catalog = CountryCatalog::new(vec![
            Country::new("NLD", "Netherlands", "nl.png", "Europe"),
            Country::new("NZL", "New Zealand", "nz.png", "Oceania"),
            Country::new("JPN", "Japan", "jp.png", "Asia"),
        ]);
        let hits: Vec<_> = catalog.search("  NE ").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(hits, vec!["NLD", "NZL"]);
        assert_eq!(catalog.search("").len(), 3);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("countries.json");
        std::fs::write(&path, REST_JSON).unwrap();

        let catalog = CountryCatalog::load(&JsonFileCatalog::new(&path)).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let source = JsonFileCatalog::new("/definitely/not/here.json");
        assert!(matches!(CountryCatalog::load(&source), Err(CatalogError::Io { .. })));
    }
}
