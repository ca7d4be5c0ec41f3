use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Loosely-typed scalar carried by a [`CompanyProfile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ProfileValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }
}

impl Display for ProfileValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for ProfileValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ProfileValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ProfileValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ProfileValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ProfileValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Sparse, provider-defined company metadata keyed by provider field name
/// (`sector`, `marketCap`, `trailingPE`, ...).
///
/// Missing keys are normal. Every read goes through an accessor returning
/// `Option`, so callers decide the placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyProfile(BTreeMap<String, ProfileValue>);

impl CompanyProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ProfileValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ProfileValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ProfileValue> {
        self.0.get(key)
    }

    /// Numeric value for `key`; text, booleans and non-finite floats read as absent.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ProfileValue::as_f64)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            ProfileValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K, V> FromIterator<(K, V)> for CompanyProfile
where
    K: Into<String>,
    V: Into<ProfileValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// One line item of a financial statement, one value per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// Income statement table: columns are fiscal period end dates, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub columns: Vec<String>,
    pub rows: Vec<StatementRow>,
}

impl FinancialStatement {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }
}

/// Analyst recommendation counts for one period (`0m`, `-1m`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub period: String,
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_accessor_ignores_text_and_nan() {
        let profile = CompanyProfile::new()
            .with("marketCap", 2_500_000_000_i64)
            .with("trailingPE", 28.5)
            .with("sector", "Technology")
            .with("beta", f64::NAN);

        assert_eq!(profile.get_number("marketCap"), Some(2_500_000_000.0));
        assert_eq!(profile.get_number("trailingPE"), Some(28.5));
        assert_eq!(profile.get_number("sector"), None);
        assert_eq!(profile.get_number("beta"), None);
        assert_eq!(profile.get_number("missing"), None);
    }

    #[test]
    fn text_accessor_only_returns_text() {
        let profile: CompanyProfile = [("sector", ProfileValue::from("Energy"))]
            .into_iter()
            .collect();

        assert_eq!(profile.get_text("sector"), Some("Energy"));
        assert_eq!(profile.get_text("industry"), None);
    }

    #[test]
    fn deserializes_mixed_json_values() {
        let profile: CompanyProfile = serde_json::from_str(
            r#"{"sector":"Technology","marketCap":3000000000000,"trailingEps":6.43,"isEsgPopulated":false}"#,
        )
        .expect("profile should parse");

        assert_eq!(profile.get("marketCap"), Some(&ProfileValue::Integer(3_000_000_000_000)));
        assert_eq!(profile.get("trailingEps"), Some(&ProfileValue::Float(6.43)));
        assert_eq!(profile.get("isEsgPopulated"), Some(&ProfileValue::Bool(false)));
        assert_eq!(profile.len(), 4);
    }

    #[test]
    fn statement_without_rows_is_empty() {
        let statement = FinancialStatement {
            columns: vec![String::from("2023-09-30")],
            rows: Vec::new(),
        };
        assert!(statement.is_empty());
        assert!(FinancialStatement::empty().is_empty());
    }
}
