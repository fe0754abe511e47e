//! Core shelter types shared by the sources, the ranker and the dashboard.
//! Raw rows come out of the sources, `ShelterRecord`s come out of normalisation.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Finite and inside the geographic domain.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.7}, {:.7})", self.latitude, self.longitude)
    }
}

/// Fixed point every distance is measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub name: String,
    pub position: Position,
}

pub const PAULS_PLACE_NAME: &str = "Paul's Place";
pub const PAULS_PLACE: Position = Position::new(39.2820504, -76.6328439);

impl Default for ReferencePoint {
    fn default() -> Self {
        Self {
            name: PAULS_PLACE_NAME.to_string(),
            position: PAULS_PLACE,
        }
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Primary service type of a shelter.
///
/// The known labels form a closed set; labels outside it survive as
/// `Other` so a category table can grow without a code change. `Other`
/// labels compare, hash and order ASCII case-insensitively, matching how
/// `parse` treats the known labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    EmergencyShelters,
    FoodAndMeals,
    HealthCare,
    Veterans,
    Lgbtqia,
    Youth,
    Employment,
    AssistancePrograms,
    LegalAid,
    Unknown,
    Other(String),
}

impl Category {
    /// Every label of the closed set, in dashboard order.
    pub const KNOWN: [Category; 10] = [
        Category::EmergencyShelters,
        Category::FoodAndMeals,
        Category::HealthCare,
        Category::Veterans,
        Category::Lgbtqia,
        Category::Youth,
        Category::Employment,
        Category::AssistancePrograms,
        Category::LegalAid,
        Category::Unknown,
    ];

    pub fn label(&self) -> &str {
        match self {
            Category::EmergencyShelters  => "Emergency Shelters",
            Category::FoodAndMeals       => "Food & Meals",
            Category::HealthCare         => "Health Care & Treatment",
            Category::Veterans           => "Veterans",
            Category::Lgbtqia            => "LGBTQIA+",
            Category::Youth              => "Youth",
            Category::Employment         => "Employment",
            Category::AssistancePrograms => "Assistance Programs & Resources",
            Category::LegalAid           => "Legal Aid",
            Category::Unknown            => "Unknown",
            Category::Other(label)       => label,
        }
    }

    /// Parse a label. Never fails: blank input is `Unknown`, unrecognised
    /// input is kept verbatim as `Other`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Category::Unknown;
        }
        Self::KNOWN
            .iter()
            .find(|known| known.label().eq_ignore_ascii_case(trimmed))
            .cloned()
            .unwrap_or_else(|| Category::Other(trimmed.to_string()))
    }

    fn ordinal(&self) -> u8 {
        match self {
            Category::EmergencyShelters  => 0,
            Category::FoodAndMeals       => 1,
            Category::HealthCare         => 2,
            Category::Veterans           => 3,
            Category::Lgbtqia            => 4,
            Category::Youth              => 5,
            Category::Employment         => 6,
            Category::AssistancePrograms => 7,
            Category::LegalAid           => 8,
            Category::Unknown            => 9,
            Category::Other(_)           => 10,
        }
    }

    fn folded(&self) -> impl Iterator<Item = u8> + '_ {
        let label: &[u8] = match self {
            Category::Other(label) => label.as_bytes(),
            _ => &[],
        };
        label.iter().map(u8::to_ascii_lowercase)
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Category::Other(a), Category::Other(b)) => a.eq_ignore_ascii_case(b),
            _ => self.ordinal() == other.ordinal(),
        }
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordinal().hash(state);
        for b in self.folded() {
            b.hash(state);
        }
    }
}

impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal()
            .cmp(&other.ordinal())
            .then_with(|| self.folded().cmp(other.folded()))
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Unknown
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        Category::parse(&raw)
    }
}

impl From<&str> for Category {
    fn from(raw: &str) -> Self {
        Category::parse(raw)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Raw rows (pre-normalisation)
// ---------------------------------------------------------------------------

/// Where a raw row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Remote,
    File,
    Sample,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Remote => "remote",
            SourceKind::File   => "file",
            SourceKind::Sample => "sample",
        }
    }

    /// Address shown when the source does not provide one.
    pub fn default_address(&self) -> &'static str {
        match self {
            SourceKind::Remote => "unknown",
            SourceKind::File | SourceKind::Sample => "Not Available",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coordinates exactly as a source delivered them. Values stay textual
/// until normalisation so a malformed cell fails one row, not the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "snake_case")]
pub enum RawCoordinates {
    /// Maryland State Plane (EPSG:2248), US survey feet.
    Projected { x: Option<String>, y: Option<String> },
    /// WGS84 decimal degrees.
    Geographic { latitude: Option<String>, longitude: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawShelter {
    pub source: SourceKind,
    pub name: String,
    pub address: Option<String>,
    pub category: Option<String>,
    pub coordinates: RawCoordinates,
}

/// All rows contributed by one source in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceBatch {
    pub kind: SourceKind,
    pub label: String,
    pub rows: Vec<RawShelter>,
}

impl SourceBatch {
    pub fn new(kind: SourceKind, label: impl Into<String>, rows: Vec<RawShelter>) -> Self {
        Self { kind, label: label.into(), rows }
    }

    pub fn empty(kind: SourceKind, label: impl Into<String>) -> Self {
        Self::new(kind, label, Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Normalised records
// ---------------------------------------------------------------------------

/// A shelter with a resolved WGS84 position and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterRecord {
    pub name: String,
    pub address: String,
    pub position: Position,
    pub category: Category,
    pub source: SourceKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_known_labels() {
        assert_eq!(Category::parse("Food & Meals"), Category::FoodAndMeals);
        assert_eq!(Category::parse("  veterans "), Category::Veterans);
        assert_eq!(Category::parse("lgbtqia+"), Category::Lgbtqia);
        assert_eq!(Category::parse(""), Category::Unknown);
        assert_eq!(Category::parse("unknown"), Category::Unknown);
    }

    #[test]
    fn test_category_keeps_unrecognised_label() {
        let c = Category::parse("Pet Friendly");
        assert_eq!(c, Category::Other("Pet Friendly".to_string()));
        assert_eq!(c.label(), "Pet Friendly");
    }

    #[test]
    fn test_unrecognised_labels_ignore_case() {
        use std::collections::HashSet;

        let table = Category::parse("Pet Friendly");
        let typed = Category::parse("pet friendly");
        assert_eq!(table, typed);
        assert_eq!(table.cmp(&typed), Ordering::Equal);
        assert_ne!(table, Category::parse("Pet Free"));

        let set: HashSet<Category> = [table, typed].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert!(Category::Other("a".to_string()) > Category::Unknown);
    }

    #[test]
    fn test_category_serde_uses_labels() {
        let json = serde_json::to_string(&Category::HealthCare).unwrap();
        assert_eq!(json, "\"Health Care & Treatment\"");
        let back: Category = serde_json::from_str("\"Legal Aid\"").unwrap();
        assert_eq!(back, Category::LegalAid);
    }

    #[test]
    fn test_position_validity() {
        assert!(PAULS_PLACE.is_valid());
        assert!(!Position::new(91.0, 0.0).is_valid());
        assert!(!Position::new(0.0, -180.5).is_valid());
        assert!(!Position::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_source_default_addresses() {
        assert_eq!(SourceKind::File.default_address(), "Not Available");
        assert_eq!(SourceKind::Remote.default_address(), "unknown");
    }
}
