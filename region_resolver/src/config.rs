// ********* Input data structures ***********

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::Display;

/// The geographic level of a statistics row.
///
/// The census tables mix four levels in one file; the level decides how the
/// display name of a row is derived and whether the row can carry a region id.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoKind {
    /// A census metropolitan area.
    Cma,
    Province,
    Territory,
    /// The country-wide aggregate. Rows of this kind carry no region id and
    /// are matched by kind, never by id or name.
    Canada,
}

impl GeoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoKind::Cma => "cma",
            GeoKind::Province => "province",
            GeoKind::Territory => "territory",
            GeoKind::Canada => "canada",
        }
    }
}

/// One row of the region statistics table: a geographic unit with its map
/// join key and the home-bilingualism percentage for each age band.
#[derive(PartialEq, Debug, Clone)]
pub struct RegionRecord {
    /// Identifier used by the geographic boundary layer to key map features.
    /// `None` only for the country-wide aggregate row.
    pub region: Option<u32>,
    pub name: String,
    pub province: String,
    /// Source bucket tag. The catch-all bucket `"zz_other"` is excluded from
    /// the name join.
    pub area: String,
    pub pct_age_0_to_4: f64,
    pub pct_age_5_to_9: f64,
    pub pct_age_0_to_9: f64,
}

/// One row of the language-pair statistics table: a (geographic unit,
/// language pair) combination with six percentage metrics.
#[derive(PartialEq, Debug, Clone)]
pub struct LanguagePairRecord {
    pub kind: GeoKind,
    pub area: String,
    pub province: String,
    pub language_pair: String,
    pub pct_bilingual_age_0_to_4: f64,
    pub pct_bilingual_age_5_to_9: f64,
    pub pct_bilingual_age_0_to_9: f64,
    pub pct_all_age_0_to_4: f64,
    pub pct_all_age_5_to_9: f64,
    pub pct_all_age_0_to_9: f64,
}

/// The payload of a map-hover event, as produced by the boundary layer.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Selection {
    pub region: u32,
    pub name: String,
    pub province: String,
}

// ******** Output data structures *********

/// One of the three recognized age bands of the census tables.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum AgeBand {
    Age0To4,
    Age5To9,
    Age0To9,
}

impl AgeBand {
    /// The band shown before the user makes any dropdown selection.
    pub const DEFAULT: AgeBand = AgeBand::Age0To9;

    pub const ALL: [AgeBand; 3] = [AgeBand::Age0To4, AgeBand::Age5To9, AgeBand::Age0To9];

    /// The stable key used in source column names and query arguments.
    pub fn key(&self) -> &'static str {
        match self {
            AgeBand::Age0To4 => "0_to_4",
            AgeBand::Age5To9 => "5_to_9",
            AgeBand::Age0To9 => "0_to_9",
        }
    }

    /// Table-header label for the bilingual-children metric of this band.
    pub fn bilingual_label(&self) -> &'static str {
        match self {
            AgeBand::Age0To4 => "% bilinguals 0-4y",
            AgeBand::Age5To9 => "% bilinguals 5-9y",
            AgeBand::Age0To9 => "% bilinguals 0-9y",
        }
    }

    /// Table-header label for the all-children metric of this band.
    pub fn all_children_label(&self) -> &'static str {
        match self {
            AgeBand::Age0To4 => "% all children 0-4y",
            AgeBand::Age5To9 => "% all children 5-9y",
            AgeBand::Age0To9 => "% all children 0-9y",
        }
    }
}

impl std::str::FromStr for AgeBand {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<AgeBand, ResolverError> {
        match s {
            "0_to_4" => Ok(AgeBand::Age0To4),
            "5_to_9" => Ok(AgeBand::Age5To9),
            "0_to_9" => Ok(AgeBand::Age0To9),
            _ => Err(ResolverError::InvalidAgeBand {
                value: s.to_string(),
            }),
        }
    }
}

/// A language-pair row projected down to the identifying columns plus the
/// two metrics of the selected age band. Metrics of the other bands are not
/// part of the value.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ResolvedRow {
    pub kind: GeoKind,
    pub name: String,
    pub province: String,
    pub language_pair: String,
    pub percent_bilingual: f64,
    pub percent_all: f64,
}

/// The answer to one resolution query.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Resolution {
    pub rows: Vec<ResolvedRow>,
    pub label: String,
}

/// The two-state toggle of the click interaction: the first click arms a
/// sticky selection, the second clears it. The caller owns the current state;
/// the resolver holds no interaction state.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum SelectionMode {
    Unarmed,
    Armed,
}

impl SelectionMode {
    pub fn after_click(self) -> SelectionMode {
        match self {
            SelectionMode::Unarmed => SelectionMode::Armed,
            SelectionMode::Armed => SelectionMode::Unarmed,
        }
    }
}

/// Errors that prevent the joined table from being constructed or a query
/// from being understood.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ResolverError {
    /// The age-band argument is not one of the three recognized keys.
    InvalidAgeBand { value: String },
    /// Two region rows share the same region id.
    DuplicateRegionId { region: u32 },
    /// Two joinable region rows share the same display name.
    DuplicateRegionName { name: String },
    /// A percentage value is not a finite number.
    BadPercentage { name: String, column: &'static str },
}

impl Error for ResolverError {}

impl Display for ResolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolverError::InvalidAgeBand { value } => {
                write!(f, "unrecognized age band {:?}", value)
            }
            ResolverError::DuplicateRegionId { region } => {
                write!(f, "duplicate region id {} in region table", region)
            }
            ResolverError::DuplicateRegionName { name } => {
                write!(f, "duplicate region name {:?} in region table", name)
            }
            ResolverError::BadPercentage { name, column } => {
                write!(
                    f,
                    "row {:?}: column {} is not a finite percentage",
                    name, column
                )
            }
        }
    }
}
