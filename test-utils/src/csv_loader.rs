use std::error::Error;
use std::path::Path;

use csv::Reader;

/// Columns of a per-sensor session file
#[repr(usize)]
#[derive(Debug, Clone, Copy)]
pub enum CsvFileColumn {
    Timestamp,
    X,
    Y,
    Z,
}

impl From<CsvFileColumn> for usize {
    fn from(value: CsvFileColumn) -> Self {
        value as usize
    }
}

/// Returns the header row of a session file.
pub fn load_header(file_path: impl AsRef<Path>) -> Result<Vec<String>, Box<dyn Error>> {
    let mut rdr = Reader::from_path(file_path)?;
    Ok(rdr.headers()?.iter().map(str::to_string).collect())
}

/// Loads every data row, parsed as floats. The header row is skipped.
pub fn load_csv(file_path: impl AsRef<Path>) -> Result<Vec<Vec<f64>>, Box<dyn Error>> {
    let mut rdr = Reader::from_path(file_path)?;
    let mut data = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let row = record
            .iter()
            .map(|s| s.parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()?;
        data.push(row);
    }

    Ok(data)
}

/// Number of data rows, header excluded.
pub fn count_rows(file_path: impl AsRef<Path>) -> Result<usize, Box<dyn Error>> {
    Ok(load_csv(file_path)?.len())
}

/// Loads a single column from every data row.
pub fn load_column(
    file_path: impl AsRef<Path>,
    column: CsvFileColumn,
) -> Result<Vec<f64>, Box<dyn Error>> {
    let idx = usize::from(column);
    load_csv(file_path)?
        .into_iter()
        .map(|row| {
            row.get(idx)
                .copied()
                .ok_or_else(|| format!("Column index {} out of bounds", idx).into())
        })
        .collect()
}
