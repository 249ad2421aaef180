use anyhow::{bail, Context};
use chrono::FixedOffset;
use mauzo_core::domain::sales::RawSalesRecord;
use mauzo_core::ingest::{csv, ledger};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistorySource {
    Csv(PathBuf),
    Ledger(PathBuf),
}

pub fn load_history(
    source: &HistorySource,
    shop_offset: FixedOffset,
) -> anyhow::Result<Vec<RawSalesRecord>> {
    match source {
        HistorySource::Csv(path) if path.as_os_str() == "-" => {
            csv::load_csv(std::io::stdin().lock()).context("failed to read sales history from stdin")
        }
        HistorySource::Csv(path) => csv::load_csv_path(path),
        HistorySource::Ledger(path) => load_ledger(path, shop_offset),
    }
}

fn load_ledger(path: &Path, shop_offset: FixedOffset) -> anyhow::Result<Vec<RawSalesRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open sales ledger {}", path.display()))?;
    let doc: Value = serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("sales ledger {} is not valid JSON", path.display()))?;

    let sales = match doc {
        Value::Array(_) => doc,
        Value::Object(mut map) => map
            .remove("sales")
            .with_context(|| format!("sales ledger {} has no \"sales\" field", path.display()))?,
        _ => bail!("sales ledger {} must be a JSON array or object", path.display()),
    };

    let sales: Vec<ledger::LedgerSale> = serde_json::from_value(sales)
        .with_context(|| format!("sales ledger {} has malformed sales", path.display()))?;
    let days = ledger::daily_totals(&sales, shop_offset)?;

    tracing::info!(sales = sales.len(), days = days.len(), "loaded sales ledger");
    Ok(days.into_iter().map(RawSalesRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn eat() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_csv_history() {
        let f = write_temp("Date,UnitsSold\n2024-08-01,12\n2024-08-02,\n");
        let rows = load_history(&HistorySource::Csv(f.path().to_path_buf()), eat()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].total, json!(12));
        assert_eq!(rows[1].total, Value::Null);
    }

    #[test]
    fn ledger_accepts_bare_array_and_wrapped_object() {
        let sales = json!([
            {"id": "S1", "total": 400, "timestamp": "2024-08-19 10:30 PM"},
            {"id": "S2", "total": 220.5, "timestamp": "2024-08-19T21:00:00Z"},
        ]);

        let bare = write_temp(&sales.to_string());
        let wrapped = write_temp(&json!({ "sales": sales }).to_string());

        for f in [bare, wrapped] {
            let rows = load_history(&HistorySource::Ledger(f.path().to_path_buf()), eat()).unwrap();
            // 21:00Z is 00:00 on the 20th in Nairobi.
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0], RawSalesRecord::new("2024-08-19", 400));
            assert_eq!(rows[1], RawSalesRecord::new("2024-08-20", 221));
        }
    }

    #[test]
    fn ledger_without_sales_is_an_error() {
        let f = write_temp(r#"{"items": []}"#);
        let err = load_history(&HistorySource::Ledger(f.path().to_path_buf()), eat()).unwrap_err();
        assert!(format!("{err:#}").contains("\"sales\""));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_history(&HistorySource::Csv("/nonexistent/history.csv".into()), eat())
            .unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/history.csv"));
    }
}
