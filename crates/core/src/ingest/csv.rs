use crate::domain::sales::RawSalesRecord;
use anyhow::{Context, Result};
use serde_json::{Number, Value};
use std::io::Read;
use std::path::Path;

const DATE_COLUMNS: &[&str] = &["date", "day", "timestamp"];
const AMOUNT_COLUMNS: &[&str] = &[
    "total",
    "amount",
    "sales",
    "unitssold",
    "units_sold",
    "quantity",
];

pub fn load_csv_path(path: impl AsRef<Path>) -> Result<Vec<RawSalesRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open sales history {}", path.display()))?;
    load_csv(file).with_context(|| format!("failed to read sales history {}", path.display()))
}

pub fn load_csv<R: Read>(reader: R) -> Result<Vec<RawSalesRecord>> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(::csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("CSV header row is unreadable")?.clone();
    let date_idx = find_column(&headers, DATE_COLUMNS)
        .with_context(|| format!("no date column found (expected one of {DATE_COLUMNS:?})"))?;
    let amount_idx = find_column(&headers, AMOUNT_COLUMNS)
        .with_context(|| format!("no amount column found (expected one of {AMOUNT_COLUMNS:?})"))?;

    let mut out = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        // Header is line 1.
        let row = row.with_context(|| format!("CSV line {} is unreadable", i + 2))?;
        let date = row.get(date_idx).unwrap_or_default();
        let amount = row.get(amount_idx).unwrap_or_default();
        out.push(RawSalesRecord {
            date: Value::String(date.to_string()),
            total: cell_value(amount),
        });
    }

    if out.is_empty() {
        tracing::warn!("sales history CSV has a header but no rows");
    }

    Ok(out)
}

fn find_column(headers: &::csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
        .collect();

    // Candidate order is priority order.
    candidates
        .iter()
        .find_map(|c| normalized.iter().position(|h| h == c))
}

fn cell_value(cell: &str) -> Value {
    let s = cell.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = s.parse::<u64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = s.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_date_total_csv() {
        let data = "date,total\n2024-08-01,100\n2024-08-02, 250 \n";
        let rows = load_csv(data.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![
                RawSalesRecord::new("2024-08-01", 100),
                RawSalesRecord::new("2024-08-02", 250),
            ]
        );
    }

    #[test]
    fn reads_product_level_history() {
        let data = "Product,Date,UnitsSold\nTusker,2024-08-01,50\nTusker,2024-08-02,75\n\
                    Guinness,2024-08-01,30\nGuinness,2024-08-02,45\n";
        let rows = load_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2], RawSalesRecord::new("2024-08-01", 30));
    }

    #[test]
    fn passes_bad_cells_through_for_validation() {
        let data = "date,amount\nyesterday,-5\n2024-08-02,12.5\n2024-08-03,lots\n2024-08-04,\n";
        let rows = load_csv(data.as_bytes()).unwrap();
        assert_eq!(rows[0].date, json!("yesterday"));
        assert_eq!(rows[0].total, json!(-5));
        assert_eq!(rows[1].total, json!(12.5));
        assert_eq!(rows[2].total, json!("lots"));
        assert_eq!(rows[3].total, Value::Null);
    }

    #[test]
    fn prefers_total_over_quantity() {
        let data = "date,quantity,total\n2024-08-01,3,900\n";
        let rows = load_csv(data.as_bytes()).unwrap();
        assert_eq!(rows[0].total, json!(900));
    }

    #[test]
    fn missing_columns_are_an_error() {
        assert!(load_csv("when,total\n2024-08-01,1\n".as_bytes()).is_err());
        assert!(load_csv("date,price\n2024-08-01,1\n".as_bytes()).is_err());
    }

    #[test]
    fn tolerates_byte_order_mark() {
        let data = "\u{feff}Date,Total\n2024-08-01,1\n";
        let rows = load_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
