/*!
Joins the census region statistics and language-pair statistics into one
immutable in-memory table, and resolves map selections against it.

The table is built once with [initialize] (or through the
[builder::Builder]) and answers queries with [JoinedTable::resolve]. See the
[manual] module for the expected shape of the input tables.
*/

mod config;
pub mod builder;
pub mod manual;

use log::{debug, info};

use std::collections::{HashMap, HashSet};

pub use crate::config::*;

/// The source bucket tag of region rows excluded from the name join.
pub const OTHER_AREA: &str = "zz_other";

const NORTHERN_TERRITORIES: [&str; 3] = ["Northwest Territories", "Nunavut", "Yukon"];

// **** Private structures ****

// One language-pair row after the join: the derived display name and, when
// the name matched a region, the map join key.
#[derive(PartialEq, Debug, Clone)]
struct JoinedRow {
    name: String,
    region: Option<u32>,
    pair: LanguagePairRecord,
}

// How one selection is looked up after the special-case name corrections.
#[derive(Eq, PartialEq, Debug, Clone)]
enum LookupKey {
    Region(u32),
    Name(String),
}

/// The joined table. Immutable after construction; every query is a pure
/// function of the table and its arguments.
#[derive(PartialEq, Debug, Clone)]
pub struct JoinedTable {
    rows: Vec<JoinedRow>,
    by_region: HashMap<u32, Vec<usize>>,
    by_name: HashMap<String, Vec<usize>>,
    aggregate: Vec<usize>,
}

/// Builds the joined table from the two statistics tables.
///
/// Language-pair rows are joined to regions on their derived display name,
/// restricted to regions outside the `"zz_other"` bucket. Rows whose name
/// matches no region are dropped, matching the source data behavior.
/// Aggregate rows (kind `canada`) are always retained and carry no region id.
///
/// Deterministic given identical inputs. Fails if the region table is
/// internally inconsistent or any percentage is not finite.
pub fn initialize(
    regions: &[RegionRecord],
    pairs: &[LanguagePairRecord],
) -> Result<JoinedTable, ResolverError> {
    info!(
        "initialize: {} region rows, {} language-pair rows",
        regions.len(),
        pairs.len()
    );

    check_regions(regions)?;
    check_pairs(pairs)?;

    let region_by_name: HashMap<&str, &RegionRecord> = regions
        .iter()
        .filter(|r| r.area != OTHER_AREA)
        .map(|r| (r.name.as_str(), r))
        .collect();

    let mut rows: Vec<JoinedRow> = Vec::new();
    for pair in pairs.iter().filter(|p| p.kind != GeoKind::Canada) {
        let name = display_name(pair);
        match region_by_name.get(name.as_str()) {
            Some(region) => rows.push(JoinedRow {
                name,
                region: region.region,
                pair: pair.clone(),
            }),
            None => {
                debug!(
                    "initialize: dropping language-pair row {:?} ({:?}): no matching region",
                    pair.language_pair, name
                );
            }
        }
    }
    // The aggregate rows come back after the join even though they have no
    // region id. They are matched by kind later.
    for pair in pairs.iter().filter(|p| p.kind == GeoKind::Canada) {
        rows.push(JoinedRow {
            name: display_name(pair),
            region: None,
            pair: pair.clone(),
        });
    }

    let mut by_region: HashMap<u32, Vec<usize>> = HashMap::new();
    let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
    let mut aggregate: Vec<usize> = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        if row.pair.kind == GeoKind::Canada {
            aggregate.push(idx);
            continue;
        }
        if let Some(region) = row.region {
            by_region.entry(region).or_default().push(idx);
        }
        by_name.entry(row.name.clone()).or_default().push(idx);
    }

    debug!(
        "initialize: joined table has {} rows ({} aggregate)",
        rows.len(),
        aggregate.len()
    );
    Ok(JoinedTable {
        rows,
        by_region,
        by_name,
        aggregate,
    })
}

impl JoinedTable {
    /// The number of rows retained by the join, aggregate rows included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolves a map selection and an age band into a row set and a label.
    ///
    /// With no selection, returns the country-wide aggregate rows under the
    /// label `All of Canada`. Otherwise the selection goes through the
    /// special-case name corrections (Ottawa/Gatineau, the northern
    /// territories) and is looked up by name for those cases, by region id
    /// for everything else. A lookup miss yields an empty row set, never an
    /// error.
    pub fn resolve(&self, selection: Option<&Selection>, band: AgeBand) -> Resolution {
        match selection {
            None => {
                let rows = self
                    .aggregate
                    .iter()
                    .map(|&idx| project(&self.rows[idx], band))
                    .collect();
                Resolution {
                    rows,
                    label: "All of Canada".to_string(),
                }
            }
            Some(sel) => {
                let (key, shown) = correct_selection(sel);
                let indices: &[usize] = match &key {
                    LookupKey::Name(name) => {
                        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
                    }
                    LookupKey::Region(region) => {
                        self.by_region.get(region).map(Vec::as_slice).unwrap_or(&[])
                    }
                };
                debug!(
                    "resolve: selection {:?} -> {:?}, {} rows",
                    sel,
                    key,
                    indices.len()
                );
                Resolution {
                    rows: indices
                        .iter()
                        .map(|&idx| project(&self.rows[idx], band))
                        .collect(),
                    label: format!("Region: {}", shown),
                }
            }
        }
    }

    /// Same as [JoinedTable::resolve] with the age band given as its string
    /// key. Fails on an unrecognized key.
    pub fn resolve_named(
        &self,
        selection: Option<&Selection>,
        band_key: &str,
    ) -> Result<Resolution, ResolverError> {
        let band: AgeBand = band_key.parse()?;
        Ok(self.resolve(selection, band))
    }
}

// A handful of map features use identifiers incompatible with the
// statistical tables: the Ottawa–Gatineau metro area spans two provinces and
// the three territories are aggregated for privacy. Those selections are
// rewritten to the name the tables actually carry and looked up by name; the
// id lookup is the common path for everything else.
fn correct_selection(sel: &Selection) -> (LookupKey, String) {
    if sel.name.contains("Ottawa") && sel.province == "Quebec" {
        (LookupKey::Name("Gatineau".to_string()), "Gatineau".to_string())
    } else if sel.name.contains("Ottawa") && sel.province == "Ontario" {
        (LookupKey::Name("Ottawa".to_string()), "Ottawa".to_string())
    } else if NORTHERN_TERRITORIES.contains(&sel.name.as_str()) {
        (
            LookupKey::Name("Northern Canada".to_string()),
            "Northern Canada".to_string(),
        )
    } else {
        (LookupKey::Region(sel.region), sel.name.clone())
    }
}

fn display_name(pair: &LanguagePairRecord) -> String {
    match pair.kind {
        GeoKind::Cma => normalize_area_name(&pair.area),
        GeoKind::Province => pair.province.trim().to_string(),
        kind => kind.as_str().to_string(),
    }
}

// The boundary layer and the census tables disagree on the separator inside
// compound area names ("Ottawa - Gatineau" vs "Ottawa–Gatineau"). Every
// separator collapses to a plain hyphen with the surrounding whitespace
// removed.
fn normalize_area_name(raw: &str) -> String {
    raw.split(|c| matches!(c, '-' | '\u{2013}' | '\u{2014}' | '/'))
        .map(str::trim)
        .collect::<Vec<&str>>()
        .join("-")
}

fn project(row: &JoinedRow, band: AgeBand) -> ResolvedRow {
    let p = &row.pair;
    let (percent_bilingual, percent_all) = match band {
        AgeBand::Age0To4 => (p.pct_bilingual_age_0_to_4, p.pct_all_age_0_to_4),
        AgeBand::Age5To9 => (p.pct_bilingual_age_5_to_9, p.pct_all_age_5_to_9),
        AgeBand::Age0To9 => (p.pct_bilingual_age_0_to_9, p.pct_all_age_0_to_9),
    };
    ResolvedRow {
        kind: p.kind,
        name: row.name.clone(),
        province: p.province.clone(),
        language_pair: p.language_pair.clone(),
        percent_bilingual,
        percent_all,
    }
}

fn check_regions(regions: &[RegionRecord]) -> Result<(), ResolverError> {
    let mut seen_ids: HashSet<u32> = HashSet::new();
    let mut seen_names: HashSet<&str> = HashSet::new();
    for r in regions.iter() {
        if let Some(region) = r.region {
            if !seen_ids.insert(region) {
                return Err(ResolverError::DuplicateRegionId { region });
            }
        }
        if r.area != OTHER_AREA && !seen_names.insert(r.name.as_str()) {
            return Err(ResolverError::DuplicateRegionName {
                name: r.name.clone(),
            });
        }
        let columns = [
            ("Percent_age_0_to_4", r.pct_age_0_to_4),
            ("Percent_age_5_to_9", r.pct_age_5_to_9),
            ("Percent_age_0_to_9", r.pct_age_0_to_9),
        ];
        for (column, value) in columns {
            if !value.is_finite() {
                return Err(ResolverError::BadPercentage {
                    name: r.name.clone(),
                    column,
                });
            }
        }
    }
    Ok(())
}

fn check_pairs(pairs: &[LanguagePairRecord]) -> Result<(), ResolverError> {
    for p in pairs.iter() {
        let columns = [
            ("percent_bilingual_children_age_0_to_4", p.pct_bilingual_age_0_to_4),
            ("percent_bilingual_children_age_5_to_9", p.pct_bilingual_age_5_to_9),
            ("percent_bilingual_children_age_0_to_9", p.pct_bilingual_age_0_to_9),
            ("percent_all_children_age_0_to_4", p.pct_all_age_0_to_4),
            ("percent_all_children_age_5_to_9", p.pct_all_age_5_to_9),
            ("percent_all_children_age_0_to_9", p.pct_all_age_0_to_9),
        ];
        for (column, value) in columns {
            if !value.is_finite() {
                return Err(ResolverError::BadPercentage {
                    name: display_name(p),
                    column,
                });
            }
        }
    }
    Ok(())
}
