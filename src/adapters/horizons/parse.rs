//! Reading the `$$SOE` / `$$EOE` data block of a Horizons CSV-format result.

use crate::domain::model::{EphemerisSample, OrbitalElements, Position};
use crate::utils::error::{OrbitError, Result};
use csv::StringRecord;

const START_OF_EPHEMERIS: &str = "$$SOE";
const END_OF_EPHEMERIS: &str = "$$EOE";

/// Column names and data rows of one ephemeris block.
#[derive(Debug)]
struct DataBlock {
    columns: StringRecord,
    rows: Vec<StringRecord>,
}

impl DataBlock {
    /// Horizons ends every line with a comma, so the last column is unnamed and never looked up.
    fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Last non-empty line of the result; Horizons puts its diagnostic there.
fn summarize(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('*'))
        .last()
        .unwrap_or("empty response")
        .chars()
        .take(200)
        .collect()
}

fn data_block(obj_id: &str, text: &str) -> Result<DataBlock> {
    let lines: Vec<&str> = text.lines().collect();

    let soe = lines
        .iter()
        .position(|l| l.trim() == START_OF_EPHEMERIS)
        .ok_or_else(|| OrbitError::MissingEphemerisError {
            object_id: obj_id.to_string(),
            detail: summarize(text),
        })?;

    let eoe = lines[soe..]
        .iter()
        .position(|l| l.trim() == END_OF_EPHEMERIS)
        .map(|offset| soe + offset)
        .ok_or_else(|| OrbitError::ParseError {
            message: format!("'{}': {} without {}", obj_id, START_OF_EPHEMERIS, END_OF_EPHEMERIS),
        })?;

    let header = lines[..soe]
        .iter()
        .rev()
        .find(|l| l.contains("JDTDB"))
        .ok_or_else(|| OrbitError::ParseError {
            message: format!("'{}': no column header before {}", obj_id, START_OF_EPHEMERIS),
        })?;

    // 表頭加上 $$SOE 與 $$EOE 之間的資料列，交給 csv 解析
    let mut table = String::from(*header);
    for line in &lines[soe + 1..eoe] {
        table.push('\n');
        table.push_str(line);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(table.as_bytes());

    let csv_error = |e: csv::Error| OrbitError::ParseError {
        message: format!("'{}': unreadable data block: {}", obj_id, e),
    };

    let columns = reader.headers().map_err(csv_error)?.clone();
    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(csv_error)?;

    Ok(DataBlock { columns, rows })
}

fn parse_number(obj_id: &str, column: &str, raw: &str) -> Result<f64> {
    raw.parse::<f64>().map_err(|e| OrbitError::ParseError {
        message: format!("'{}': column {} value '{}': {}", obj_id, column, raw, e),
    })
}

fn required_column(block: &DataBlock, obj_id: &str, name: &str) -> Result<usize> {
    block.column(name).ok_or_else(|| OrbitError::ParseError {
        message: format!("'{}': response has no {} column", obj_id, name),
    })
}

pub(crate) fn parse_elements(obj_id: &str, text: &str) -> Result<OrbitalElements> {
    let block = data_block(obj_id, text)?;
    let row = block.rows.first().ok_or_else(|| OrbitError::MissingEphemerisError {
        object_id: obj_id.to_string(),
        detail: "elements block is empty".to_string(),
    })?;

    let optional = |name: &str| -> Option<f64> {
        block
            .column(name)
            .and_then(|i| row.get(i))
            .and_then(|raw| raw.parse::<f64>().ok())
    };

    let semi_major_axis = optional("A").ok_or_else(|| OrbitError::MissingElementError {
        object_id: obj_id.to_string(),
        field: "a".to_string(),
    })?;

    Ok(OrbitalElements {
        epoch_jd_tdb: optional("JDTDB"),
        eccentricity: optional("EC"),
        semi_major_axis,
    })
}

pub(crate) fn parse_vectors(obj_id: &str, text: &str) -> Result<Vec<EphemerisSample>> {
    let block = data_block(obj_id, text)?;

    let jd = required_column(&block, obj_id, "JDTDB")?;
    let x = required_column(&block, obj_id, "X")?;
    let y = required_column(&block, obj_id, "Y")?;
    let z = required_column(&block, obj_id, "Z")?;
    let calendar = block.column("Calendar Date (TDB)");

    block
        .rows
        .iter()
        .enumerate()
        .map(|(n, row)| {
            let field = |i: usize, name: &str| -> Result<f64> {
                let raw = row.get(i).ok_or_else(|| OrbitError::ParseError {
                    message: format!("'{}': row {} has no {} value", obj_id, n + 1, name),
                })?;
                parse_number(obj_id, name, raw)
            };

            let position = Position {
                x: field(x, "X")?,
                y: field(y, "Y")?,
                z: field(z, "Z")?,
            };
            if !position.is_finite() {
                return Err(OrbitError::ParseError {
                    message: format!("'{}': row {} has a non-finite position", obj_id, n + 1),
                });
            }

            Ok(EphemerisSample {
                jd_tdb: field(jd, "JDTDB")?,
                calendar: calendar
                    .and_then(|i| row.get(i))
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                position,
            })
        })
        .collect()
}
