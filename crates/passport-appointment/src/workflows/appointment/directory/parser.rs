use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) struct OfficeRecord {
    pub(crate) line: u64,
    pub(crate) region: String,
    pub(crate) country: String,
    pub(crate) key: String,
    pub(crate) name: String,
    pub(crate) address: String,
    pub(crate) contact_number: Option<String>,
    pub(crate) map_reference: Option<String>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<OfficeRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for result in csv_reader.records() {
        let raw = result?;
        let line = raw.position().map(|position| position.line()).unwrap_or_default();
        let row: OfficeRow = raw.deserialize(Some(&headers))?;
        records.push(row.into_record(line));
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct OfficeRow {
    #[serde(rename = "Region")]
    region: String,
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Office Key")]
    key: String,
    #[serde(rename = "Name", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(rename = "Address")]
    address: String,
    #[serde(
        rename = "Contact Number",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    contact_number: Option<String>,
    #[serde(
        rename = "Map Reference",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    map_reference: Option<String>,
}

impl OfficeRow {
    fn into_record(self, line: u64) -> OfficeRecord {
        // Rows without a display name fall back to their selection key.
        let name = self.name.unwrap_or_else(|| self.key.clone());
        OfficeRecord {
            line,
            region: self.region,
            country: self.country,
            key: self.key,
            name,
            address: self.address,
            contact_number: self.contact_number,
            map_reference: self.map_reference,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
