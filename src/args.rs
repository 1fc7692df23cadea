use clap::Parser;

/// Resolves a census map selection into the matching language-pair table.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) JSON dashboard configuration describing the data sources.
    /// Relative source paths are resolved against the directory of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The region statistics table (tsv, csv or xlsx). Overrides the
    /// source given in the --config file.
    #[clap(long, value_parser)]
    pub regions: Option<String>,

    /// (file path) The language-pair statistics table (csv, tsv or xlsx). Overrides
    /// the source given in the --config file.
    #[clap(long, value_parser)]
    pub language_pairs: Option<String>,

    /// (integer) The region id of the hovered map feature. Must be given together
    /// with --region-name and --region-province. With no selection flags, the
    /// country-wide overview is returned.
    #[clap(long, value_parser)]
    pub region_id: Option<u32>,

    /// (string) The display name of the hovered map feature.
    #[clap(long, value_parser)]
    pub region_name: Option<String>,

    /// (string) The province of the hovered map feature.
    #[clap(long, value_parser)]
    pub region_province: Option<String>,

    /// (default 0_to_9) The age band to project: 0_to_4, 5_to_9 or 0_to_9.
    #[clap(long, value_parser)]
    pub age_band: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the JSON summary of the
    /// resolution. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, bilidash will
    /// check that the produced summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
