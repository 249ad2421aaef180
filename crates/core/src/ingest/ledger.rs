use crate::domain::sales::SalesRecord;
use anyhow::{bail, ensure, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSale {
    pub id: String,
    #[serde(default)]
    pub items: Vec<LedgerItem>,
    pub total: f64,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub cashier: Option<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpesa_receipt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerItem {
    pub drink_name: String,
    pub quantity: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Mpesa,
    Card,
}

/// Sum sale totals per local calendar day, rounded to whole currency units.
pub fn daily_totals(sales: &[LedgerSale], shop_offset: FixedOffset) -> Result<Vec<SalesRecord>> {
    let mut cents_by_day = BTreeMap::<NaiveDate, u64>::new();

    for sale in sales {
        ensure!(
            sale.total.is_finite() && sale.total >= 0.0,
            "sale {}: total must be a non-negative amount (got {})",
            sale.id,
            sale.total
        );
        let day = sale_date(&sale.timestamp, shop_offset)
            .with_context(|| format!("sale {}: unreadable timestamp", sale.id))?;

        let cents = to_cents(sale.total)
            .with_context(|| format!("sale {}: total too large ({})", sale.id, sale.total))?;
        let entry = cents_by_day.entry(day).or_insert(0);
        *entry = entry
            .checked_add(cents)
            .with_context(|| format!("daily total overflow on {day}"))?;
    }

    let out: Vec<SalesRecord> = cents_by_day
        .into_iter()
        .map(|(date, cents)| SalesRecord {
            date,
            total: cents / 100 + u64::from(cents % 100 >= 50),
        })
        .collect();

    tracing::debug!(sales = sales.len(), days = out.len(), "aggregated ledger into daily totals");
    Ok(out)
}

fn to_cents(amount: f64) -> Option<u64> {
    let cents = (amount * 100.0).round();
    if cents < 18_446_744_073_709_551_616.0 {
        Some(cents as u64)
    } else {
        None
    }
}

pub fn sale_date(timestamp: &str, shop_offset: FixedOffset) -> Result<NaiveDate> {
    let s = timestamp.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&shop_offset).date_naive());
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %I:%M %p",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }

    bail!("unsupported timestamp format: {s:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eat() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sale(id: &str, total: f64, timestamp: &str) -> LedgerSale {
        LedgerSale {
            id: id.to_string(),
            items: vec![],
            total,
            payment_method: Some(PaymentMethod::Cash),
            cashier: None,
            timestamp: timestamp.to_string(),
            mpesa_receipt: None,
        }
    }

    #[test]
    fn deserializes_till_records() {
        let v = json!({
            "id": "SALE001",
            "items": [{"drinkName": "Tusker", "quantity": 2, "price": 400}],
            "total": 400,
            "paymentMethod": "Mpesa",
            "cashier": "John D.",
            "timestamp": "2024-08-19 10:30 PM",
        });
        let s: LedgerSale = serde_json::from_value(v).unwrap();
        assert_eq!(s.payment_method, Some(PaymentMethod::Mpesa));
        assert_eq!(s.items[0].drink_name, "Tusker");
        assert_eq!(sale_date(&s.timestamp, eat()).unwrap(), d(2024, 8, 19));
    }

    #[test]
    fn sums_per_day_in_date_order() {
        let sales = vec![
            sale("3", 250.0, "2024-08-20 09:15 AM"),
            sale("1", 400.0, "2024-08-19 10:30 PM"),
            sale("2", 220.0, "2024-08-19 10:25 PM"),
        ];
        let days = daily_totals(&sales, eat()).unwrap();
        assert_eq!(
            days,
            vec![
                SalesRecord { date: d(2024, 8, 19), total: 620 },
                SalesRecord { date: d(2024, 8, 20), total: 250 },
            ]
        );
    }

    #[test]
    fn utc_timestamps_use_shop_day() {
        // 22:30 UTC is 01:30 the next morning in Nairobi.
        assert_eq!(
            sale_date("2024-08-19T22:30:00.000Z", eat()).unwrap(),
            d(2024, 8, 20)
        );
        assert_eq!(sale_date("2024-08-19T22:30:00", eat()).unwrap(), d(2024, 8, 19));
    }

    #[test]
    fn rounds_cents_half_up_per_day() {
        let sales = vec![
            sale("1", 100.25, "2024-08-19"),
            sale("2", 100.25, "2024-08-19"),
        ];
        assert_eq!(daily_totals(&sales, eat()).unwrap()[0].total, 201);
    }

    #[test]
    fn rejects_negative_totals_and_bad_timestamps() {
        assert!(daily_totals(&[sale("1", -1.0, "2024-08-19")], eat()).is_err());
        assert!(daily_totals(&[sale("1", f64::NAN, "2024-08-19")], eat()).is_err());
        let err = daily_totals(&[sale("X9", 1.0, "last tuesday")], eat()).unwrap_err();
        assert!(format!("{err:#}").contains("X9"));
    }
}
