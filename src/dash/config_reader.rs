use crate::dash::*;

/// Presentation settings carried through to the JSON summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "dashboardTitle")]
    pub dashboard_title: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

/// One tabular data source of the dashboard.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// One of `csv`, `tsv` or `xlsx`.
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// Only meaningful for the `xlsx` provider; defaults to the first
    /// worksheet of the workbook.
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
}

impl FileSource {
    /// A source with the provider guessed from the file extension.
    pub fn from_path(path: &str) -> FileSource {
        FileSource {
            provider: guess_provider(path).to_string(),
            file_path: path.to_string(),
            worksheet_name: None,
        }
    }
}

pub fn guess_provider(path: &str) -> &'static str {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some("tsv") => "tsv",
        Some("xlsx") => "xlsx",
        _ => "csv",
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "regionSource")]
    pub region_source: FileSource,
    #[serde(rename = "languagePairSource")]
    pub language_pair_source: FileSource,
    #[serde(rename = "defaultAgeBand")]
    pub default_age_band: Option<String>,
}

pub fn read_config(path: &str) -> DashResult<DashConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    let config: DashConfig = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
