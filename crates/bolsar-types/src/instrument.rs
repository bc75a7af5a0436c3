//! Instrument reference metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Record field holding the instrument symbol.
pub const SYMBOL_FIELD: &str = "stock";

/// Reference metadata for one instrument.
///
/// Seeded with the symbol and extended with whatever fields the metadata
/// queries return. A record missing a field group is still a valid record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentRecord {
    fields: Map<String, Value>,
}

impl InstrumentRecord {
    /// Creates a record holding only the symbol.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(SYMBOL_FIELD.to_string(), Value::String(symbol.into()));
        Self { fields }
    }

    /// Returns the instrument symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        self.fields
            .get(SYMBOL_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Sets a single field.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Merges every field of a JSON object into the record.
    ///
    /// Non-object values are ignored.
    pub fn merge(&mut self, value: Value) {
        if let Value::Object(object) = value {
            self.fields.extend(object);
        }
    }

    /// Returns all fields.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns true if the record holds nothing beyond the symbol.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.fields.len() == 1
    }
}

/// Issuer name and nominal value shown on an instrument's info page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuerSummary {
    /// Instrument symbol.
    pub symbol: String,
    /// Issuing company, empty when the page does not list one.
    pub issuer: String,
    /// Nominal value, zero when the page does not list one.
    pub nominal_value: f64,
}
