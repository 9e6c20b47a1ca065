//! # Service Records
//!
//! The data-entry side of the pipeline: what the shop writes down when a
//! customer drops off a device.
//!
//! A [`ServiceRecord`] is the draft the front desk fills in. Once the
//! record store accepts it, it becomes a [`StoredRecord`] with a
//! store-assigned identity. Identity and the intake fields are immutable
//! after that point; only the readiness flag and the repair-metadata
//! fields (`parts`, `parts_origin`, `technician`) change later, through an
//! update path that is not part of this crate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of device brought in for repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    Mob,
    Tablet,
    Laptop,
    #[serde(rename = "PC")]
    Pc,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Mob => "Mob",
            Self::Tablet => "Tablet",
            Self::Laptop => "Laptop",
            Self::Pc => "PC",
        };
        f.write_str(s)
    }
}

impl FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mob" => Ok(Self::Mob),
            "tablet" => Ok(Self::Tablet),
            "laptop" => Ok(Self::Laptop),
            "pc" => Ok(Self::Pc),
            other => Err(format!(
                "unknown device type '{}' (expected Mob, Tablet, Laptop or PC)",
                other
            )),
        }
    }
}

/// A service intake record, as drafted at the front desk.
///
/// Serializes as the flat camelCase field set the external record store
/// expects. `is_ready` is `None` at creation (the repair hasn't started).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub full_name: String,
    pub device_type: DeviceType,
    pub problem: String,
    pub phone_number: String,
    pub price: Decimal,
    #[serde(default)]
    pub is_ready: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl ServiceRecord {
    /// Draft a new record stamped with the current time.
    pub fn draft(
        full_name: impl Into<String>,
        device_type: DeviceType,
        problem: impl Into<String>,
        phone_number: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            device_type,
            problem: problem.into(),
            phone_number: phone_number.into(),
            price,
            is_ready: None,
            created_at: Utc::now(),
        }
    }
}

/// A persisted record with store-assigned identity and repair metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: i64,
    #[serde(flatten)]
    pub record: ServiceRecord,
    /// Number of replacement parts used so far.
    #[serde(default)]
    pub parts: u32,
    /// Supplier the parts came from.
    #[serde(default)]
    pub parts_origin: Option<String>,
    /// Technician assigned to the repair.
    #[serde(default)]
    pub technician: Option<String>,
}

/// Filter records by a case-insensitive substring over name, device type,
/// phone number and problem, then sort newest-first.
///
/// Pure helper backing the CLI's quick-search; an empty query matches
/// everything.
pub fn search(records: &[StoredRecord], query: &str) -> Vec<StoredRecord> {
    let query = query.to_lowercase();
    let mut hits: Vec<StoredRecord> = records
        .iter()
        .filter(|r| {
            query.is_empty()
                || r.record.full_name.to_lowercase().contains(&query)
                || r.record.device_type.to_string().to_lowercase().contains(&query)
                || r.record.phone_number.contains(&query)
                || r.record.problem.to_lowercase().contains(&query)
        })
        .cloned()
        .collect();
    hits.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn stored(id: i64, name: &str, problem: &str, ts: i64) -> StoredRecord {
        StoredRecord {
            id,
            record: ServiceRecord {
                full_name: name.to_string(),
                device_type: DeviceType::Mob,
                problem: problem.to_string(),
                phone_number: "070123456".to_string(),
                price: Decimal::new(2500, 2),
                is_ready: None,
                created_at: Utc.timestamp_opt(ts, 0).unwrap(),
            },
            parts: 0,
            parts_origin: None,
            technician: None,
        }
    }

    #[test]
    fn test_device_type_roundtrip() {
        for s in ["Mob", "Tablet", "Laptop", "PC"] {
            let d: DeviceType = s.parse().unwrap();
            assert_eq!(d.to_string(), s);
        }
        assert!("toaster".parse::<DeviceType>().is_err());
    }

    #[test]
    fn test_record_serializes_flat_camel_case() {
        let r = stored(7, "Ana K", "cracked screen", 1_700_000_000);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["fullName"], "Ana K");
        assert_eq!(json["deviceType"], "Mob");
        assert_eq!(json["phoneNumber"], "070123456");
        assert_eq!(json["price"], "25.00");
        assert_eq!(json["isReady"], serde_json::Value::Null);
    }

    #[test]
    fn test_search_matches_any_field() {
        let records = vec![
            stored(1, "Ana K", "cracked screen", 100),
            stored(2, "Bekim H", "battery drain", 200),
        ];

        assert_eq!(search(&records, "ana").len(), 1);
        assert_eq!(search(&records, "battery").len(), 1);
        assert_eq!(search(&records, "070").len(), 2);
        assert_eq!(search(&records, "mob").len(), 2);
        assert_eq!(search(&records, "nothing-matches").len(), 0);
    }

    #[test]
    fn test_search_sorts_newest_first() {
        let records = vec![
            stored(1, "Older", "x", 100),
            stored(2, "Newer", "x", 200),
        ];
        let hits = search(&records, "");
        assert_eq!(hits[0].id, 2);
        assert_eq!(hits[1].id, 1);
    }
}
