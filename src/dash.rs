use log::{debug, info, warn};

use region_resolver::{
    initialize, AgeBand, GeoKind, LanguagePairRecord, RegionRecord, Resolution, Selection,
};
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::dash::config_reader::*;
use crate::dash::io_common::{cell, parse_percent, RawTable};

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Workbook {path} has no usable worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing a line of {path}"))]
    CsvLineParse { source: csv::Error, path: String },
    #[snafu(display(""))]
    OpeningJson { source: std::io::Error },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    MissingParentDir {},
    #[snafu(display("Missing column {column} in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Row {name}: cannot read {column} value {value:?} as a percentage"))]
    PercentParse {
        name: String,
        column: String,
        value: String,
    },
    #[snafu(display("Row {name}: cannot read region id {value:?}"))]
    RegionIdParse { name: String, value: String },
    #[snafu(display("Row {name}: unknown geography type {value:?}"))]
    UnknownGeoKind { name: String, value: String },
    #[snafu(display("{source}"))]
    Resolver {
        source: region_resolver::ResolverError,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;

// Column names of the region statistics table.
const COL_REGION: &str = "Region";
const COL_NAME: &str = "name";
// Column names shared by both tables.
const COL_PROVINCE: &str = "province";
const COL_AREA: &str = "area";
// Column names of the language-pair statistics table.
const COL_TYPE: &str = "type";
const COL_LANGUAGE_PAIR: &str = "language_pair_collapsed";

/// Converts the raw region statistics table into typed records.
/// An empty `Region` cell marks the country-wide aggregate row.
pub fn regions_from_table(table: &RawTable, path: &str) -> DashResult<Vec<RegionRecord>> {
    let region_idx = table.column(COL_REGION, path)?;
    let name_idx = table.column(COL_NAME, path)?;
    let province_idx = table.column(COL_PROVINCE, path)?;
    let area_idx = table.column(COL_AREA, path)?;
    let p04_idx = table.column("Percent_age_0_to_4", path)?;
    let p59_idx = table.column("Percent_age_5_to_9", path)?;
    let p09_idx = table.column("Percent_age_0_to_9", path)?;

    let mut res: Vec<RegionRecord> = Vec::new();
    for row in table.rows.iter() {
        let name = cell(row, name_idx).trim().to_string();
        let raw_region = cell(row, region_idx).trim();
        let region = if raw_region.is_empty() {
            None
        } else {
            Some(raw_region.parse::<u32>().ok().context(RegionIdParseSnafu {
                name: name.as_str(),
                value: raw_region,
            })?)
        };
        res.push(RegionRecord {
            region,
            province: cell(row, province_idx).trim().to_string(),
            area: cell(row, area_idx).trim().to_string(),
            pct_age_0_to_4: parse_percent(cell(row, p04_idx), &name, "Percent_age_0_to_4")?,
            pct_age_5_to_9: parse_percent(cell(row, p59_idx), &name, "Percent_age_5_to_9")?,
            pct_age_0_to_9: parse_percent(cell(row, p09_idx), &name, "Percent_age_0_to_9")?,
            name,
        });
    }
    Ok(res)
}

/// Converts the raw language-pair statistics table into typed records.
pub fn pairs_from_table(table: &RawTable, path: &str) -> DashResult<Vec<LanguagePairRecord>> {
    let type_idx = table.column(COL_TYPE, path)?;
    let area_idx = table.column(COL_AREA, path)?;
    let province_idx = table.column(COL_PROVINCE, path)?;
    let pair_idx = table.column(COL_LANGUAGE_PAIR, path)?;
    let b04_idx = table.column("percent_bilingual_children_age_0_to_4", path)?;
    let b59_idx = table.column("percent_bilingual_children_age_5_to_9", path)?;
    let b09_idx = table.column("percent_bilingual_children_age_0_to_9", path)?;
    let a04_idx = table.column("percent_all_children_age_0_to_4", path)?;
    let a59_idx = table.column("percent_all_children_age_5_to_9", path)?;
    let a09_idx = table.column("percent_all_children_age_0_to_9", path)?;

    let mut res: Vec<LanguagePairRecord> = Vec::new();
    for row in table.rows.iter() {
        let area = cell(row, area_idx).trim().to_string();
        let province = cell(row, province_idx).trim().to_string();
        // The most specific name available, for error messages.
        let label = if area.is_empty() {
            province.clone()
        } else {
            area.clone()
        };
        let kind = parse_geo_kind(cell(row, type_idx).trim(), &label)?;
        res.push(LanguagePairRecord {
            kind,
            language_pair: cell(row, pair_idx).trim().to_string(),
            pct_bilingual_age_0_to_4: parse_percent(
                cell(row, b04_idx),
                &label,
                "percent_bilingual_children_age_0_to_4",
            )?,
            pct_bilingual_age_5_to_9: parse_percent(
                cell(row, b59_idx),
                &label,
                "percent_bilingual_children_age_5_to_9",
            )?,
            pct_bilingual_age_0_to_9: parse_percent(
                cell(row, b09_idx),
                &label,
                "percent_bilingual_children_age_0_to_9",
            )?,
            pct_all_age_0_to_4: parse_percent(
                cell(row, a04_idx),
                &label,
                "percent_all_children_age_0_to_4",
            )?,
            pct_all_age_5_to_9: parse_percent(
                cell(row, a59_idx),
                &label,
                "percent_all_children_age_5_to_9",
            )?,
            pct_all_age_0_to_9: parse_percent(
                cell(row, a09_idx),
                &label,
                "percent_all_children_age_0_to_9",
            )?,
            area,
            province,
        });
    }
    Ok(res)
}

fn parse_geo_kind(value: &str, name: &str) -> DashResult<GeoKind> {
    match value {
        "cma" => Ok(GeoKind::Cma),
        "province" => Ok(GeoKind::Province),
        "territory" => Ok(GeoKind::Territory),
        "canada" => Ok(GeoKind::Canada),
        _ => UnknownGeoKindSnafu { name, value }.fail(),
    }
}

fn read_source(source: &FileSource, root: &Path) -> DashResult<RawTable> {
    let p: PathBuf = root.join(&source.file_path);
    let path = p.as_path().display().to_string();
    info!(
        "Attempting to read {} source {:?}",
        source.provider, path
    );
    match source.provider.as_str() {
        "csv" => io_csv::read_table(&path, b','),
        "tsv" => io_csv::read_table(&path, b'\t'),
        "xlsx" => io_xlsx::read_table(&path, source.worksheet_name.as_deref()),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn load_config(args: &Args) -> DashResult<(DashConfig, PathBuf)> {
    match &args.config {
        Some(config_path) => {
            let mut config = read_config(config_path)?;
            let root = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            if let Some(path) = &args.regions {
                config.region_source = FileSource::from_path(path);
            }
            if let Some(path) = &args.language_pairs {
                config.language_pair_source = FileSource::from_path(path);
            }
            Ok((config, root))
        }
        None => {
            let (regions, language_pairs) = match (&args.regions, &args.language_pairs) {
                (Some(r), Some(l)) => (r.clone(), l.clone()),
                _ => {
                    whatever!("Either --config or both --regions and --language-pairs must be provided")
                }
            };
            let config = DashConfig {
                output_settings: OutputSettings {
                    dashboard_title: "Home bilingualism in Canada".to_string(),
                    output_directory: None,
                },
                region_source: FileSource::from_path(&regions),
                language_pair_source: FileSource::from_path(&language_pairs),
                default_age_band: None,
            };
            Ok((config, PathBuf::from(".")))
        }
    }
}

fn selection_from_args(args: &Args) -> DashResult<Option<Selection>> {
    match (&args.region_id, &args.region_name, &args.region_province) {
        (None, None, None) => Ok(None),
        (Some(region), Some(name), Some(province)) => Ok(Some(Selection {
            region: *region,
            name: name.clone(),
            province: province.clone(),
        })),
        _ => {
            whatever!("--region-id, --region-name and --region-province must be provided together")
        }
    }
}

fn build_summary_js(config: &DashConfig, band: AgeBand, resolution: &Resolution) -> JSValue {
    let columns = json!([
        { "name": "Language Pair", "id": "language_pair" },
        {
            "name": band.bilingual_label(),
            "id": format!("percent_bilingual_children_age_{}", band.key()),
        },
        {
            "name": band.all_children_label(),
            "id": format!("percent_all_children_age_{}", band.key()),
        },
    ]);
    json!({
        "config": { "title": config.output_settings.dashboard_title },
        "label": resolution.label,
        "ageBand": band.key(),
        "columns": columns,
        "rows": resolution.rows,
    })
}

fn write_summary(pretty: &str, out: &Option<String>) -> DashResult<()> {
    match out.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty);
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, pretty).context(WritingSummarySnafu { path })?;
        }
    }
    Ok(())
}

/// Runs one full resolution: read the sources, build the joined table,
/// answer the query described by the CLI flags and emit the JSON summary.
pub fn run_query(args: &Args) -> DashResult<()> {
    let (config, root) = load_config(args)?;
    info!("config: {:?}", config);

    let region_table = read_source(&config.region_source, &root)?;
    let regions = regions_from_table(&region_table, &config.region_source.file_path)?;
    let pair_table = read_source(&config.language_pair_source, &root)?;
    let pairs = pairs_from_table(&pair_table, &config.language_pair_source.file_path)?;

    let table = initialize(&regions, &pairs).context(ResolverSnafu {})?;
    info!("Joined table: {} rows", table.len());

    let selection = selection_from_args(args)?;
    let band_key = args
        .age_band
        .clone()
        .or_else(|| config.default_age_band.clone())
        .unwrap_or_else(|| AgeBand::DEFAULT.key().to_string());
    let band: AgeBand = band_key.parse().context(ResolverSnafu {})?;

    let resolution = table.resolve(selection.as_ref(), band);
    info!(
        "Resolved {:?}: {} rows",
        resolution.label,
        resolution.rows.len()
    );

    let summary = build_summary_js(&config, band, &resolution);
    let pretty = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    write_summary(&pretty, &args.out)?;

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &args.reference {
        let reference = read_summary(reference_path)?;
        let pretty_reference =
            serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
        if pretty_reference != pretty {
            warn!("Found differences with the reference summary");
            print_diff(pretty_reference.as_str(), pretty.as_str(), "\n");
            whatever!("Difference detected between produced summary and reference summary")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dash::io_csv::read_table_from_reader;

    const REGIONS_TSV: &str = "Region\tname\tprovince\tarea\tPercent_age_0_to_4\tPercent_age_5_to_9\tPercent_age_0_to_9\n\
        1\tMontréal\tQuebec\tcma_qc\t24.0\t26.0\t25.0\n\
        \tCanada\t\tcanada\t17.0\t18.4\t17.8\n";

    const PAIRS_CSV: &str = "type,area,province,language_pair_collapsed,\
        percent_bilingual_children_age_0_to_4,percent_bilingual_children_age_5_to_9,\
        percent_bilingual_children_age_0_to_9,percent_all_children_age_0_to_4,\
        percent_all_children_age_5_to_9,percent_all_children_age_0_to_9\n\
        cma,Montréal,Quebec,English-French,10.0,11.0,10.5,2.0,2.2,2.1\n\
        canada,,,English-French,5.8,6.2,6.0,1.1,1.2,1.1\n";

    fn sample_regions() -> Vec<RegionRecord> {
        let table = read_table_from_reader(REGIONS_TSV.as_bytes(), b'\t', "regions.tsv").unwrap();
        regions_from_table(&table, "regions.tsv").unwrap()
    }

    fn sample_pairs() -> Vec<LanguagePairRecord> {
        let table = read_table_from_reader(PAIRS_CSV.as_bytes(), b',', "pairs.csv").unwrap();
        pairs_from_table(&table, "pairs.csv").unwrap()
    }

    #[test]
    fn regions_tsv_parses_to_typed_records() {
        let regions = sample_regions();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].region, Some(1));
        assert_eq!(regions[0].name, "Montréal");
        assert_eq!(regions[0].pct_age_5_to_9, 26.0);
        // The aggregate row carries no join key.
        assert_eq!(regions[1].region, None);
        assert_eq!(regions[1].name, "Canada");
    }

    #[test]
    fn pairs_csv_parses_to_typed_records() {
        let pairs = sample_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].kind, GeoKind::Cma);
        assert_eq!(pairs[0].language_pair, "English-French");
        assert_eq!(pairs[0].pct_all_age_5_to_9, 2.2);
        assert_eq!(pairs[1].kind, GeoKind::Canada);
    }

    #[test]
    fn unknown_geography_type_is_rejected() {
        let bad = PAIRS_CSV.replace("cma,Montréal", "continent,Montréal");
        let table = read_table_from_reader(bad.as_bytes(), b',', "pairs.csv").unwrap();
        let err = pairs_from_table(&table, "pairs.csv").unwrap_err();
        assert!(matches!(err, DashError::UnknownGeoKind { .. }));
        assert!(err.to_string().contains("continent"));
    }

    #[test]
    fn unparseable_percentage_is_rejected() {
        let bad = REGIONS_TSV.replace("26.0", "n/a");
        let table = read_table_from_reader(bad.as_bytes(), b'\t', "regions.tsv").unwrap();
        let err = regions_from_table(&table, "regions.tsv").unwrap_err();
        assert!(matches!(err, DashError::PercentParse { .. }));
        assert!(err.to_string().contains("Percent_age_5_to_9"));
    }

    #[test]
    fn missing_column_is_rejected() {
        let table = read_table_from_reader(REGIONS_TSV.as_bytes(), b'\t', "regions.tsv").unwrap();
        let err = pairs_from_table(&table, "regions.tsv").unwrap_err();
        assert!(matches!(err, DashError::MissingColumn { .. }));
    }

    #[test]
    fn summary_for_default_query() {
        let table = initialize(&sample_regions(), &sample_pairs()).unwrap();
        let resolution = table.resolve(None, AgeBand::DEFAULT);
        assert_eq!(resolution.label, "All of Canada");
        assert_eq!(resolution.rows.len(), 1);

        let config = DashConfig {
            output_settings: OutputSettings {
                dashboard_title: "Home bilingualism in Canada".to_string(),
                output_directory: None,
            },
            region_source: FileSource::from_path("regions.tsv"),
            language_pair_source: FileSource::from_path("pairs.csv"),
            default_age_band: None,
        };
        let summary = build_summary_js(&config, AgeBand::DEFAULT, &resolution);
        assert_eq!(summary["label"], "All of Canada");
        assert_eq!(summary["ageBand"], "0_to_9");
        assert_eq!(summary["columns"][1]["name"], "% bilinguals 0-9y");
        assert_eq!(summary["rows"][0]["language_pair"], "English-French");
        assert_eq!(summary["rows"][0]["percent_bilingual"], 6.0);
    }

    #[test]
    fn dashboard_config_parses_from_json() {
        let raw = r#"{
            "outputSettings": { "dashboardTitle": "Home bilingualism in Canada" },
            "regionSource": { "provider": "tsv", "filePath": "assets/results.tsv" },
            "languagePairSource": { "provider": "xlsx", "filePath": "assets/pairs.xlsx", "worksheetName": "pairs" },
            "defaultAgeBand": "0_to_9"
        }"#;
        let config: DashConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.region_source.provider, "tsv");
        assert_eq!(
            config.language_pair_source.worksheet_name.as_deref(),
            Some("pairs")
        );
        assert_eq!(config.default_age_band.as_deref(), Some("0_to_9"));
    }

    #[test]
    fn provider_is_guessed_from_the_extension() {
        assert_eq!(guess_provider("assets/results.tsv"), "tsv");
        assert_eq!(guess_provider("assets/pairs.xlsx"), "xlsx");
        assert_eq!(guess_provider("assets/pairs.csv"), "csv");
        assert_eq!(guess_provider("assets/pairs"), "csv");
    }

    fn args_with_selection(
        region_id: Option<u32>,
        region_name: Option<&str>,
        region_province: Option<&str>,
    ) -> Args {
        Args {
            config: None,
            regions: None,
            language_pairs: None,
            region_id,
            region_name: region_name.map(str::to_string),
            region_province: region_province.map(str::to_string),
            age_band: None,
            out: None,
            reference: None,
            verbose: false,
        }
    }

    #[test]
    fn selection_flags_must_come_together() {
        let none = selection_from_args(&args_with_selection(None, None, None)).unwrap();
        assert!(none.is_none());

        let full =
            selection_from_args(&args_with_selection(Some(1), Some("Montréal"), Some("Quebec")))
                .unwrap();
        assert_eq!(
            full,
            Some(Selection {
                region: 1,
                name: "Montréal".to_string(),
                province: "Quebec".to_string(),
            })
        );

        assert!(selection_from_args(&args_with_selection(Some(1), None, None)).is_err());
    }
}
