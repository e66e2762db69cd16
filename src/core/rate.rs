//! Rate entries and snapshots

use crate::core::error::RateError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One currency's rate quoted against the feed's base currency (USD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEntry {
    pub country: String,
    pub currency_code: String,
    pub rate: f64,
    pub last_update: String,
}

impl RateEntry {
    fn validate(&self) -> Result<(), RateError> {
        if self.currency_code.trim().is_empty() {
            return Err(RateError::Parse("record with empty currency code".into()));
        }
        if self.country.trim().is_empty() {
            return Err(RateError::Parse(format!(
                "empty name for currency {}",
                self.currency_code
            )));
        }
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(RateError::Parse(format!(
                "invalid rate {} for currency {}",
                self.rate, self.currency_code
            )));
        }
        Ok(())
    }
}

/// A complete set of rates, sorted ascending by rate.
///
/// Snapshots are built whole and never mutated afterwards; the store swaps
/// them by reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateSnapshot {
    entries: Vec<RateEntry>,
}

impl RateSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a snapshot from raw entries.
    ///
    /// Repeated currency codes keep the last entry seen. Equal rates are
    /// ordered by currency code. Any invalid entry rejects the whole set.
    pub fn from_entries<I>(entries: I) -> Result<Self, RateError>
    where
        I: IntoIterator<Item = RateEntry>,
    {
        let mut unique: Vec<RateEntry> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            entry.validate()?;
            match positions.get(&entry.currency_code) {
                Some(&pos) => unique[pos] = entry,
                None => {
                    positions.insert(entry.currency_code.clone(), unique.len());
                    unique.push(entry);
                }
            }
        }

        unique.sort_by(|a, b| {
            a.rate
                .total_cmp(&b.rate)
                .then_with(|| a.currency_code.cmp(&b.currency_code))
        });

        Ok(Self { entries: unique })
    }

    pub fn entries(&self) -> &[RateEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive lookup by currency code.
    pub fn get(&self, currency_code: &str) -> Option<&RateEntry> {
        self.entries
            .iter()
            .find(|e| e.currency_code.eq_ignore_ascii_case(currency_code))
    }

    pub fn to_json(&self) -> Result<Vec<u8>, RateError> {
        serde_json::to_vec(self).map_err(|e| RateError::StorageWrite(e.to_string()))
    }

    /// Parses a stored snapshot, re-checking the snapshot invariants.
    pub fn from_json(bytes: &[u8]) -> Result<Self, RateError> {
        let entries: Vec<RateEntry> =
            serde_json::from_slice(bytes).map_err(|e| RateError::StorageRead(e.to_string()))?;
        let count = entries.len();
        let snapshot = Self::from_entries(entries)
            .map_err(|e| RateError::StorageRead(e.to_string()))?;
        if snapshot.len() != count {
            return Err(RateError::StorageRead(
                "stored rates contain duplicate currency codes".to_string(),
            ));
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str, rate: f64) -> RateEntry {
        RateEntry {
            country: format!("{code} land"),
            currency_code: code.to_string(),
            rate,
            last_update: "Sun, 18 Oct 2026 11:55:01 GMT".to_string(),
        }
    }

    #[test]
    fn test_from_entries_sorts_ascending_by_rate() {
        let snapshot = RateSnapshot::from_entries(vec![
            entry("JPY", 148.5),
            entry("EUR", 0.92),
            entry("INR", 83.1),
        ])
        .unwrap();

        let codes: Vec<&str> = snapshot
            .entries()
            .iter()
            .map(|e| e.currency_code.as_str())
            .collect();
        assert_eq!(codes, vec!["EUR", "INR", "JPY"]);
    }

    #[test]
    fn test_from_entries_last_seen_code_wins() {
        let mut newer = entry("EUR", 0.95);
        newer.country = "Euro Area".to_string();
        let snapshot =
            RateSnapshot::from_entries(vec![entry("EUR", 0.92), entry("GBP", 0.79), newer])
                .unwrap();

        assert_eq!(snapshot.len(), 2);
        let eur = snapshot.get("eur").unwrap();
        assert_eq!(eur.rate, 0.95);
        assert_eq!(eur.country, "Euro Area");
    }

    #[test]
    fn test_equal_rates_ordered_by_code() {
        let snapshot =
            RateSnapshot::from_entries(vec![entry("XCD", 2.7), entry("AED", 2.7)]).unwrap();
        assert_eq!(snapshot.entries()[0].currency_code, "AED");
        assert_eq!(snapshot.entries()[1].currency_code, "XCD");
    }

    #[test]
    fn test_invalid_entry_rejects_whole_set() {
        let result = RateSnapshot::from_entries(vec![entry("EUR", 0.92), entry("BAD", 0.0)]);
        assert!(matches!(result, Err(RateError::Parse(_))));

        let result = RateSnapshot::from_entries(vec![entry("NAN", f64::NAN)]);
        assert!(result.is_err());

        let mut nameless = entry("EUR", 0.92);
        nameless.country = " ".to_string();
        assert!(RateSnapshot::from_entries(vec![nameless]).is_err());
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let snapshot = RateSnapshot::from_entries(vec![entry("EUR", 0.92)]).unwrap();
        let json = String::from_utf8(snapshot.to_json().unwrap()).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains("\"currencyCode\":\"EUR\""));
        assert!(json.contains("\"lastUpdate\""));

        let restored = RateSnapshot::from_json(json.as_bytes()).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_from_json_rejects_corrupt_data() {
        assert!(matches!(
            RateSnapshot::from_json(b"{not json"),
            Err(RateError::StorageRead(_))
        ));
        assert!(RateSnapshot::from_json(br#"{"eur": 1}"#).is_err());

        let dup = r#"[
            {"country":"A","currencyCode":"EUR","rate":0.9,"lastUpdate":"x"},
            {"country":"B","currencyCode":"EUR","rate":0.8,"lastUpdate":"y"}
        ]"#;
        assert!(RateSnapshot::from_json(dup.as_bytes()).is_err());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = RateSnapshot::empty();
        assert!(snapshot.is_empty());
        assert!(snapshot.get("EUR").is_none());
        assert_eq!(RateSnapshot::from_json(b"[]").unwrap(), snapshot);
    }
}
