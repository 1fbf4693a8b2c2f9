use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::io::Read;

use super::types::{ImportedLead, LeadType};

const PHONE_COLUMNS: [&str; 4] = ["phone", "phone_no", "contact", "contact_no"];

/// Header lookup keyed by the trimmed, lowercased column name.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut index = HashMap::new();
        for (position, header) in headers.iter().enumerate() {
            let key = header.trim_start_matches('\u{feff}').trim().to_lowercase();
            index.entry(key).or_insert(position);
        }
        Self(index)
    }

    fn get<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
        self.0
            .get(column)
            .and_then(|&position| record.get(position))
            .map(str::trim)
            .unwrap_or("")
    }
}

fn map_record(columns: &Columns, record: &StringRecord) -> Option<ImportedLead> {
    let name = columns.get(record, "name");
    if name.is_empty() {
        return None;
    }

    let phone = PHONE_COLUMNS
        .iter()
        .map(|column| columns.get(record, column))
        .find(|value| !value.is_empty())
        .unwrap_or("");

    Some(ImportedLead {
        name: name.to_string(),
        email: columns.get(record, "email").to_string(),
        phone: phone.to_string(),
        date: columns.get(record, "date").to_string(),
        language: columns.get(record, "language").to_string(),
        location: columns.get(record, "location").to_string(),
        lead_type: LeadType::from_import(columns.get(record, "type")),
    })
}

/// Parses an uploaded CSV (header row required) into lead rows.
/// Rows without a name are dropped.
pub fn parse_leads_csv<R: Read>(reader: R) -> Result<Vec<ImportedLead>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(reader.headers()?);
    let mut leads = Vec::new();
    for record in reader.records() {
        if let Some(lead) = map_record(&columns, &record?) {
            leads.push(lead);
        }
    }
    Ok(leads)
}
