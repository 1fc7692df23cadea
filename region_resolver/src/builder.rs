pub use crate::config::*;
use crate::{initialize, JoinedTable};

/// A builder for assembling the joined table record by record.
///
/// Useful when the two source tables are streamed in rather than available
/// as slices.
///
/// ```
/// pub use region_resolver::builder::Builder;
/// pub use region_resolver::{AgeBand, GeoKind, LanguagePairRecord, RegionRecord};
/// # use region_resolver::ResolverError;
///
/// let mut builder = Builder::new();
/// builder.add_region(RegionRecord {
///     region: None,
///     name: "Canada".to_string(),
///     province: "".to_string(),
///     area: "canada".to_string(),
///     pct_age_0_to_4: 17.0,
///     pct_age_5_to_9: 18.4,
///     pct_age_0_to_9: 17.8,
/// });
/// builder.add_language_pair(LanguagePairRecord {
///     kind: GeoKind::Canada,
///     area: "".to_string(),
///     province: "".to_string(),
///     language_pair: "English-French".to_string(),
///     pct_bilingual_age_0_to_4: 5.8,
///     pct_bilingual_age_5_to_9: 6.2,
///     pct_bilingual_age_0_to_9: 6.0,
///     pct_all_age_0_to_4: 1.1,
///     pct_all_age_5_to_9: 1.2,
///     pct_all_age_0_to_9: 1.1,
/// });
/// let table = builder.build()?;
/// let resolution = table.resolve(None, AgeBand::DEFAULT);
/// assert_eq!(resolution.label, "All of Canada");
///
/// # Ok::<(), ResolverError>(())
/// ```
#[derive(Default)]
pub struct Builder {
    pub(crate) _regions: Vec<RegionRecord>,
    pub(crate) _pairs: Vec<LanguagePairRecord>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _regions: Vec::new(),
            _pairs: Vec::new(),
        }
    }

    pub fn regions(mut self, records: &[RegionRecord]) -> Builder {
        self._regions.extend(records.iter().cloned());
        self
    }

    pub fn language_pairs(mut self, records: &[LanguagePairRecord]) -> Builder {
        self._pairs.extend(records.iter().cloned());
        self
    }

    pub fn add_region(&mut self, record: RegionRecord) {
        self._regions.push(record);
    }

    pub fn add_language_pair(&mut self, record: LanguagePairRecord) {
        self._pairs.push(record);
    }

    /// Runs the integrity checks and the join. The builder can be reused
    /// afterwards; the table does not borrow from it.
    pub fn build(&self) -> Result<JoinedTable, ResolverError> {
        initialize(&self._regions, &self._pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_matches_direct_initialization() {
        let regions = vec![RegionRecord {
            region: Some(1),
            name: "Montréal".to_string(),
            province: "Quebec".to_string(),
            area: "cma_qc".to_string(),
            pct_age_0_to_4: 24.0,
            pct_age_5_to_9: 26.0,
            pct_age_0_to_9: 25.0,
        }];
        let pairs = vec![LanguagePairRecord {
            kind: GeoKind::Cma,
            area: "Montréal".to_string(),
            province: "Quebec".to_string(),
            language_pair: "English-French".to_string(),
            pct_bilingual_age_0_to_4: 10.0,
            pct_bilingual_age_5_to_9: 11.0,
            pct_bilingual_age_0_to_9: 10.5,
            pct_all_age_0_to_4: 2.0,
            pct_all_age_5_to_9: 2.2,
            pct_all_age_0_to_9: 2.1,
        }];

        let built = Builder::new()
            .regions(&regions)
            .language_pairs(&pairs)
            .build()
            .unwrap();
        let direct = initialize(&regions, &pairs).unwrap();
        assert_eq!(built, direct);
        assert_eq!(built.len(), 1);
    }
}
