// Primitives for reading the CSV and TSV source tables.

use std::io::Read;

use crate::dash::{io_common::RawTable, *};

pub fn read_table(path: &str, delimiter: u8) -> DashResult<RawTable> {
    let rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    parse_table(rdr, path)
}

/// Same as [read_table] for an already-open input, mostly for tests.
pub fn read_table_from_reader<R: Read>(
    input: R,
    delimiter: u8,
    path: &str,
) -> DashResult<RawTable> {
    let rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(input);
    parse_table(rdr, path)
}

fn parse_table<R: Read>(mut rdr: csv::Reader<R>, path: &str) -> DashResult<RawTable> {
    let headers: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { path })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    debug!("parse_table: {:?} headers: {:?}", path, headers);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in rdr.records() {
        let line = record.context(CsvLineParseSnafu { path })?;
        rows.push(line.iter().map(|s| s.to_string()).collect());
    }
    debug!("parse_table: {:?}: {} data rows", path, rows.len());
    Ok(RawTable { headers, rows })
}
