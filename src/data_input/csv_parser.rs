// src/data_input/csv_parser.rs

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use crate::config::ColumnConfig;
use crate::data_input::country_data::{CountryRecord, ParsedTable};
use crate::error::{GlobeError, Result};
use crate::metrics::{Metric, METRIC_COUNT};

/// Parses the country CSV file, maps headers, and extracts one record per row.
///
/// Identity columns are mandatory; metric columns are optional and reported
/// through `ParsedTable::metrics_found`.
pub fn parse_country_file(input_file_path: &Path, columns: &ColumnConfig) -> Result<ParsedTable> {
    info!("Reading '{}'", input_file_path.display());
    let file = File::open(input_file_path)?;
    parse_country_reader(BufReader::new(file), columns)
}

/// Same as [`parse_country_file`] for any reader.
pub fn parse_country_reader<R: Read>(reader: R, columns: &ColumnConfig) -> Result<ParsedTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    // --- Header Definition and Index Mapping ---
    let header_record = reader.headers()?.clone();
    debug!("Headers found in CSV: {:?}", header_record);

    let find = |wanted: &str| header_record.iter().position(|h| h.trim() == wanted);
    let country_idx = find(&columns.country);
    let code_idx = find(&columns.code);

    let missing: Vec<String> = [(&columns.country, country_idx), (&columns.code, code_idx)]
        .iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| format!("'{name}'"))
        .collect();
    let (country_idx, code_idx) = match (country_idx, code_idx) {
        (Some(country), Some(code)) => (country, code),
        _ => return Err(GlobeError::MissingColumns(missing)),
    };

    let mut metric_indices: [Option<usize>; METRIC_COUNT] = [None; METRIC_COUNT];
    let mut metrics_found = [false; METRIC_COUNT];
    debug!("Header mapping status:");
    for metric in Metric::ALL {
        let idx = find(metric.column());
        metric_indices[metric.index()] = idx;
        metrics_found[metric.index()] = idx.is_some();
        debug!(
            "  '{}': {}",
            metric.column(),
            if idx.is_some() { "Found" } else { "Not Found" }
        );
        if idx.is_none() {
            warn!(
                "Column '{}' ({}) not found; metric unavailable",
                metric.column(),
                metric.label()
            );
        }
    }

    // --- Data Reading and Storage ---
    let mut rows: Vec<CountryRecord> = Vec::new();
    let mut skipped_rows = 0usize;
    let mut unparseable_cells = [0usize; METRIC_COUNT];

    for (row_index, result) in reader.records().enumerate() {
        // Header is line 1
        let line = row_index + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping line {line} due to CSV read error: {e}");
                skipped_rows += 1;
                continue;
            }
        };

        let country = record.get(country_idx).unwrap_or("").trim();
        let code = record.get(code_idx).unwrap_or("").trim();
        if country.is_empty() || code.is_empty() {
            warn!("Skipping line {line}: blank country name or code");
            skipped_rows += 1;
            continue;
        }

        // Geometry codes are matched upper-case
        let mut current = CountryRecord {
            country: country.to_string(),
            code: code.to_ascii_uppercase(),
            ..CountryRecord::default()
        };

        for metric in Metric::ALL {
            let cell = metric_indices[metric.index()]
                .and_then(|csv_idx| record.get(csv_idx))
                .map(str::trim)
                .unwrap_or("");
            current.values[metric.index()] = parse_metric_cell(cell);
            if current.values[metric.index()].is_none() && !is_missing_marker(cell) {
                unparseable_cells[metric.index()] += 1;
            }
        }

        rows.push(current);
    }

    for metric in Metric::ALL {
        let count = unparseable_cells[metric.index()];
        if count > 0 {
            warn!(
                "{count} non-numeric value(s) in column '{}' treated as missing",
                metric.column()
            );
        }
    }

    info!(
        "Finished reading {} data rows ({} skipped).",
        rows.len(),
        skipped_rows
    );

    let table = ParsedTable {
        rows,
        metrics_found,
        skipped_rows,
    };
    let available: Vec<&str> = table.available_metrics().iter().map(|m| m.label()).collect();
    debug!("Metrics available: {}", available.join(", "));
    Ok(table)
}

/// Blank cells and the usual NA spellings count as missing without a warning.
fn is_missing_marker(cell: &str) -> bool {
    cell.is_empty()
        || ["na", "n/a", "nan", "null", "none", "-"]
            .iter()
            .any(|m| cell.eq_ignore_ascii_case(m))
}

fn parse_metric_cell(cell: &str) -> Option<f64> {
    if is_missing_marker(cell) {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ParsedTable> {
        parse_country_reader(text.as_bytes(), &ColumnConfig::default())
    }

    #[test]
    fn test_parses_rows_and_metrics() {
        let table = parse(
            "Country_x,Country Code,htn,phy,nurse\n\
             Kenya,KEN,24.5,2.1,11.0\n\
             Ghana,GHA,30,1.4,\n",
        )
        .unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].country, "Kenya");
        assert_eq!(table.rows[0].code, "KEN");
        assert_eq!(table.rows[0].value(Metric::Htn), Some(24.5));
        assert_eq!(table.rows[1].value(Metric::Nurses), None);
        assert!(table.has_metric(Metric::Physicians));
        assert!(!table.has_metric(Metric::Chws));
        assert_eq!(
            table.available_metrics(),
            vec![Metric::Htn, Metric::Physicians, Metric::Nurses]
        );
    }

    #[test]
    fn test_missing_identity_columns_lists_all() {
        match parse("Name,ISO,htn\nKenya,KEN,1\n") {
            Err(GlobeError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["'Country_x'".to_string(), "'Country Code'".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_blank_keys_are_skipped() {
        let table = parse(
            "Country_x,Country Code,htn\n\
             Kenya,KEN,20\n\
             ,GHA,30\n\
             Togo,,40\n",
        )
        .unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.skipped_rows, 2);
    }

    #[test]
    fn test_non_numeric_cells_become_missing() {
        let table = parse(
            "Country_x,Country Code,htn,hw\n\
             Kenya,KEN,abc,NA\n\
             Kenya,KEN,inf,7\n",
        )
        .unwrap();
        assert_eq!(table.rows[0].value(Metric::Htn), None);
        assert_eq!(table.rows[0].value(Metric::TotalHw), None);
        assert_eq!(table.rows[1].value(Metric::Htn), None);
        assert_eq!(table.rows[1].value(Metric::TotalHw), Some(7.0));
    }

    #[test]
    fn test_headers_and_fields_are_trimmed() {
        let table = parse(" Country_x , Country Code ,htn \n  Peru , PER , 12.5 \n").unwrap();
        assert_eq!(table.rows[0].country, "Peru");
        assert_eq!(table.rows[0].code, "PER");
        assert_eq!(table.rows[0].value(Metric::Htn), Some(12.5));
    }

    #[test]
    fn test_custom_identity_columns() {
        let columns = ColumnConfig {
            country: "Country".into(),
            code: "ISO3".into(),
        };
        let table =
            parse_country_reader("Country,ISO3,phy\nChile,CHL,25\n".as_bytes(), &columns).unwrap();
        assert_eq!(table.rows[0].code, "CHL");
        assert_eq!(table.rows[0].value(Metric::Physicians), Some(25.0));
    }

    #[test]
    fn test_codes_are_uppercased() {
        let table = parse("Country_x,Country Code,htn\nKenya,ken,20\nPeru, Per ,30\n").unwrap();
        assert_eq!(table.rows[0].code, "KEN");
        assert_eq!(table.rows[1].code, "PER");
        assert_eq!(table.rows[0].country, "Kenya");
    }
}

// src/data_input/csv_parser.rs
