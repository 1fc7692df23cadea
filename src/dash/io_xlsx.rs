// Reader for census tables distributed as Excel workbooks.

use calamine::{open_workbook, Reader, Xlsx};

use crate::dash::{io_common::RawTable, *};

pub fn read_table(path: &str, worksheet: Option<&str>) -> DashResult<RawTable> {
    let p = path.to_string();
    let mut workbook: Xlsx<_> = open_workbook(p).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu { path })?;
    debug!("read_table: header: {:?}", header);
    let headers = header
        .iter()
        .map(read_cell)
        .collect::<DashResult<Vec<String>>>()?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in iter {
        rows.push(
            row.iter()
                .map(read_cell)
                .collect::<DashResult<Vec<String>>>()?,
        );
    }
    debug!("read_table: {:?}: {} data rows", path, rows.len());
    Ok(RawTable { headers, rows })
}

// Every cell comes back as a string; the typed validation happens in one
// place regardless of the provider.
fn read_cell(cell: &calamine::DataType) -> DashResult<String> {
    match cell {
        calamine::DataType::String(s) => Ok(s.trim().to_string()),
        calamine::DataType::Float(f) => Ok(format!("{}", f)),
        calamine::DataType::Int(i) => Ok(i.to_string()),
        calamine::DataType::Empty => Ok("".to_string()),
        _ => whatever!("read_cell: could not understand cell {:?}", cell),
    }
}
