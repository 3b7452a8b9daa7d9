//! Structured records extracted from business documents.
//!
//! Field names follow the Lithuanian JSON schema the extraction prompts pin
//! down. Every field is optional on input: text fields default to `""` and
//! numeric fields default to `"0"`. Values stay strings so the model's own
//! formatting (decimal point, units) is kept as written.

use crate::error::{Error, Result};
use crate::types::DocumentType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ZERO: &str = "0";

/// Seller block of an invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seller {
    pub pavadinimas: String,
    pub imones_kodas: String,
    pub pvm_kodas: String,
    pub adresas: String,
    pub bankas: String,
    pub saskaitos_numeris: String,
}

/// Buyer block of an invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Buyer {
    pub pavadinimas: String,
    pub imones_kodas: String,
    pub pvm_kodas: String,
    pub adresas: String,
}

/// A single invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    pub pavadinimas: String,
    pub vezimas: String,
    pub kiekis_t: String,
    pub vieneto_kaina_eur: String,
    pub viso_eur: String,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            pavadinimas: String::new(),
            vezimas: String::new(),
            kiekis_t: ZERO.to_string(),
            vieneto_kaina_eur: ZERO.to_string(),
            viso_eur: ZERO.to_string(),
        }
    }
}

/// Invoice totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totals {
    pub viso_be_pvm_eur: String,
    pub pvm_suma_eur: String,
    pub viso_su_pvm_eur: String,
}

impl Default for Totals {
    fn default() -> Self {
        Self {
            viso_be_pvm_eur: ZERO.to_string(),
            pvm_suma_eur: ZERO.to_string(),
            viso_su_pvm_eur: ZERO.to_string(),
        }
    }
}

/// VAT invoice ("PVM sąskaita faktūra").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceRecord {
    pub dokumento_tipas: String,
    pub numeris: String,
    pub data: String,
    pub pardavejas: Seller,
    pub gavejas: Buyer,
    pub prekes: Vec<LineItem>,
    pub sumos: Totals,
    pub apmoketi_iki: String,
}

/// One party of a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractParty {
    pub pavadinimas: String,
    pub imones_kodas: String,
    pub adresas: String,
}

/// Contract ("Sutartis").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractRecord {
    pub dokumento_tipas: String,
    pub numeris: String,
    pub sudarymo_data: String,
    pub sutarties_tipas: String,
    pub salis_a: ContractParty,
    pub salis_b: ContractParty,
    pub galiojimo_terminas: String,
    pub bendra_suma_eur: String,
    pub mokestis_uz_paslaugas: String,
}

impl Default for ContractRecord {
    fn default() -> Self {
        Self {
            dokumento_tipas: String::new(),
            numeris: String::new(),
            sudarymo_data: String::new(),
            sutarties_tipas: String::new(),
            salis_a: ContractParty::default(),
            salis_b: ContractParty::default(),
            galiojimo_terminas: String::new(),
            bendra_suma_eur: ZERO.to_string(),
            mokestis_uz_paslaugas: String::new(),
        }
    }
}

/// A structured record of either supported variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DocumentRecord {
    Invoice(InvoiceRecord),
    Contract(ContractRecord),
}

impl DocumentRecord {
    /// Build a record of the given type from loosely-typed JSON.
    ///
    /// Numbers and booleans are converted to their text form and `null`
    /// values are treated as absent, so the defaults apply.
    pub fn from_value(doc_type: DocumentType, mut value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidRecord(format!(
                "expected a JSON object for {}, got {}",
                doc_type,
                json_kind(&value)
            )));
        }

        normalize_scalars(&mut value);

        let record = match doc_type {
            DocumentType::Invoice => DocumentRecord::Invoice(
                serde_json::from_value(value).map_err(|e| Error::InvalidRecord(e.to_string()))?,
            ),
            DocumentType::Contract => DocumentRecord::Contract(
                serde_json::from_value(value).map_err(|e| Error::InvalidRecord(e.to_string()))?,
            ),
        };

        Ok(record)
    }

    /// Parse a record of the given type from JSON text.
    pub fn from_json_str(doc_type: DocumentType, json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(doc_type, value)
    }

    pub fn document_type(&self) -> DocumentType {
        match self {
            DocumentRecord::Invoice(_) => DocumentType::Invoice,
            DocumentRecord::Contract(_) => DocumentType::Contract,
        }
    }

    /// Pretty-printed JSON with non-ASCII characters kept literally.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Compact JSON, as stored in collection metadata.
    pub fn to_compact_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn normalize_scalars(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let nulls: Vec<String> = map
                .iter()
                .filter(|(_, v)| v.is_null())
                .map(|(k, _)| k.clone())
                .collect();
            for key in nulls {
                map.remove(&key);
            }
            normalize_map(map);
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_scalars),
        _ => {}
    }
}

fn normalize_map(map: &mut Map<String, Value>) {
    for field in map.values_mut() {
        match field {
            Value::Number(n) => *field = Value::String(n.to_string()),
            Value::Bool(b) => *field = Value::String(b.to_string()),
            Value::Object(_) | Value::Array(_) => normalize_scalars(field),
            _ => {}
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
