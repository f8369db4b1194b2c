//! Record Loader
//!
//! Parses the line-oriented CSV address file into `AddressRecord`s.
//! Malformed rows are counted and skipped; only an unreadable file is a
//! hard error. The fixed schema is:
//!
//! `LON,LAT,NUMBER,STREET,UNIT,CITY,DISTRICT,REGION,POSTCODE,ID,HASH`

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::normalizer::normalize;
use super::types::AddressRecord;

/// Minimum number of fields a row must have to be considered.
const MIN_FIELDS: usize = 11;

/// Outcome of a load: the accepted records plus the rejected-row count.
#[derive(Debug)]
pub struct LoadSummary {
    pub records: Vec<AddressRecord>,
    pub rejected: usize,
}

/// Reads the data file, skipping the header line and blank lines.
///
/// Each accepted record carries normalized `number`/`street`/`unit`/
/// `city`/`postcode` fields plus the raw street/unit/city values for
/// display.
pub fn load_records(path: &Path) -> Result<LoadSummary> {
    let file = File::open(path)
        .with_context(|| format!("could not open data file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    let mut rejected = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("read error in {}", path.display()))?;

        // First line is the header.
        if line_no == 0 {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        match parse_row(&line) {
            Some(record) => records.push(record),
            None => rejected += 1,
        }
    }

    Ok(LoadSummary { records, rejected })
}

fn parse_row(line: &str) -> Option<AddressRecord> {
    let fields = split_row(line);

    if fields.len() < MIN_FIELDS {
        tracing::warn!(
            "malformed row: expected at least {} fields, got {}",
            MIN_FIELDS,
            fields.len()
        );
        return None;
    }

    let longitude = parse_coordinate(&fields[0], -180.0..=180.0, "longitude")?;
    let latitude = parse_coordinate(&fields[1], -90.0..=90.0, "latitude")?;

    let hash_text = fields[10].trim();
    let hash = match u64::from_str_radix(hash_text, 16) {
        Ok(hash) => hash,
        Err(_) => {
            tracing::warn!("malformed row: invalid hash {:?}", hash_text);
            return None;
        }
    };

    // DISTRICT (6), REGION (7), and ID (9) are not carried.
    Some(AddressRecord {
        longitude,
        latitude,
        hash,
        number: normalize(&fields[2]),
        street: normalize(&fields[3]),
        unit: normalize(&fields[4]),
        city: normalize(&fields[5]),
        postcode: normalize(&fields[8]),
        original_street: fields[3].trim().to_string(),
        original_unit: fields[4].trim().to_string(),
        original_city: fields[5].trim().to_string(),
    })
}

fn parse_coordinate(
    field: &str,
    range: std::ops::RangeInclusive<f64>,
    name: &str,
) -> Option<f64> {
    match field.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && range.contains(&value) => Some(value),
        Ok(value) => {
            tracing::warn!("malformed row: {} {} out of range", name, value);
            None
        }
        Err(_) => {
            tracing::warn!("malformed row: unparsable {} {:?}", name, field);
            None
        }
    }
}

/// Splits one CSV line on commas, honouring a single double-quote
/// toggle: a comma inside a quoted run is a literal comma.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);

    fields
}
