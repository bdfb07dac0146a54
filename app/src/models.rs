use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Company details as published by the directory.
///
/// Optional fields are `None` when the page has no matching row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyRecord {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub website: Option<String>,
    pub employees: Option<u32>,
    /// Social insurance (Sodra) insurer code, as the whitespace-separated tokens shown.
    pub sodracode: Option<Vec<String>>,
    pub averagesalary: Option<Decimal>,
    pub turnoveryear: Option<String>,
    pub turnoverrange: Option<String>,
    pub cardate: Option<String>,
    pub cars: Option<u32>,
    pub regaddress: Option<String>,
    pub regdate: Option<String>,
    pub legalform: Option<String>,
    pub status: Option<String>,
    pub industry: String,
}

impl CompanyRecord {
    /// JSON with keys in lexicographic order and four-space indentation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        // serde_json::Map is a BTreeMap here, which gives the key order.
        let value = serde_json::to_value(self)?;

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer)?;
        // serde_json only ever writes UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
