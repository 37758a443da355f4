// src/common/csv_io.rs

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

use crate::common::error::AppError;

/// A CSV row that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 1-based physical line of the record in the file, header included.
    pub line: usize,
    pub message: String,
}

pub fn write_csv<T, I>(rows: I) -> Result<Vec<u8>, AppError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("CSV flush failed: {}", e)))
}

/// Parses every row it can. Malformed rows are reported, not fatal; only a
/// missing header or a header without the `required` columns aborts the import.
pub fn read_csv<T>(data: &[u8], required: &[&'static str]) -> Result<(Vec<(usize, T)>, Vec<RowError>), AppError>
where
    T: DeserializeOwned,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    if let Some(column) = required.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        return Err(AppError::CsvMissingColumn(*column));
    }

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for result in reader.records() {
        match result {
            Ok(record) => {
                let line = record.position().map_or(0, |p| p.line() as usize);
                match record.deserialize::<T>(Some(&headers)) {
                    Ok(row) => rows.push((line, row)),
                    Err(e) => errors.push(RowError { line, message: e.to_string() }),
                }
            }
            Err(e) => {
                let line = e.position().map_or(0, |p| p.line() as usize);
                errors.push(RowError { line, message: e.to_string() });
            }
        }
    }

    Ok((rows, errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        name: String,
        quantity: f64,
        #[serde(default)]
        unit: Option<String>,
    }

    #[test]
    fn writes_header_and_rows() {
        let bytes = write_csv(vec![
            Row { name: "Brass".into(), quantity: 10.5, unit: Some("kg".into()) },
            Row { name: "Lead, soft".into(), quantity: 3.0, unit: None },
        ])
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name,quantity,unit");
        assert_eq!(lines[1], "Brass,10.5,kg");
        assert_eq!(lines[2], "\"Lead, soft\",3.0,");
    }

    #[test]
    fn bad_rows_are_collected_with_line_numbers() {
        let data = b"name,quantity,unit\n  Brass , 10 ,kg\nCopper,lots,kg\nZinc,2\n";
        let (rows, errors) = read_csv::<Row>(data, &["name"]).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], (2, Row { name: "Brass".into(), quantity: 10.0, unit: Some("kg".into()) }));
        assert_eq!(rows[1].0, 4);
        assert_eq!(rows[1].1.unit, None);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 3);
    }

    #[test]
    fn line_numbers_count_blank_lines() {
        let data = b"name,quantity\nBrass,10\n\nCopper,lots\n";
        let (rows, errors) = read_csv::<Row>(data, &["name"]).unwrap();

        assert_eq!(rows[0].0, 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 4);
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = read_csv::<Row>(b"", &["name"]).unwrap_err();
        assert!(matches!(err, AppError::CsvMissingColumn("name")));
    }

    #[test]
    fn header_must_name_required_columns() {
        let err = read_csv::<Row>(b"title,quantity\nBrass,10\n", &["name"]).unwrap_err();
        assert!(matches!(err, AppError::CsvMissingColumn("name")));
    }
}
