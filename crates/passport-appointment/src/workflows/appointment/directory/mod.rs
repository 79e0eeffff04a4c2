//! Catalog of bookable offices, grouped region → country → office.
//!
//! Office keys double as the values submitted by the location step, so the
//! loader keeps rows in source order and refuses duplicate keys within a
//! country instead of silently overwriting them.

mod parser;

use serde::Serialize;
use std::io::Read;
use std::path::Path;

use parser::OfficeRecord;

const EMBEDDED_OFFICES: &str = include_str!("../../../../data/offices.csv");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Office {
    pub name: String,
    pub address: String,
    pub contact_number: Option<String>,
    pub map_reference: Option<String>,
}

/// Office paired with the key used to select it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OfficeListing<'a> {
    pub key: &'a str,
    #[serde(flatten)]
    pub office: &'a Office,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to read office table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid office table: {0}")]
    Csv(#[from] csv::Error),
    #[error("office table line {line} is missing a value for {column}")]
    MissingValue { line: u64, column: &'static str },
    #[error("office key '{key}' appears more than once under {region} / {country}")]
    DuplicateOffice {
        region: String,
        country: String,
        key: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct LocationDirectory {
    regions: Vec<RegionEntry>,
}

#[derive(Debug, Clone)]
struct RegionEntry {
    key: String,
    countries: Vec<CountryEntry>,
}

#[derive(Debug, Clone)]
struct CountryEntry {
    key: String,
    offices: Vec<(String, Office)>,
}

impl LocationDirectory {
    /// Directory built from the office table shipped with the crate.
    pub fn standard() -> Result<Self, DirectoryError> {
        Self::from_reader(EMBEDDED_OFFICES.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        let mut directory = Self::default();
        for record in parser::parse_records(reader)? {
            directory.insert(record)?;
        }
        Ok(directory)
    }

    fn insert(&mut self, record: OfficeRecord) -> Result<(), DirectoryError> {
        let OfficeRecord {
            line,
            region,
            country,
            key,
            name,
            address,
            contact_number,
            map_reference,
        } = record;

        for (column, value) in [
            ("Region", &region),
            ("Country", &country),
            ("Office Key", &key),
            ("Address", &address),
        ] {
            if value.trim().is_empty() {
                return Err(DirectoryError::MissingValue { line, column });
            }
        }

        let region_index = match self.regions.iter().position(|entry| entry.key == region) {
            Some(index) => index,
            None => {
                self.regions.push(RegionEntry {
                    key: region.clone(),
                    countries: Vec::new(),
                });
                self.regions.len() - 1
            }
        };
        let countries = &mut self.regions[region_index].countries;

        let country_index = match countries.iter().position(|entry| entry.key == country) {
            Some(index) => index,
            None => {
                countries.push(CountryEntry {
                    key: country.clone(),
                    offices: Vec::new(),
                });
                countries.len() - 1
            }
        };
        let offices = &mut countries[country_index].offices;

        if offices.iter().any(|(existing, _)| *existing == key) {
            return Err(DirectoryError::DuplicateOffice {
                region,
                country,
                key,
            });
        }

        offices.push((
            key,
            Office {
                name,
                address,
                contact_number,
                map_reference,
            },
        ));
        Ok(())
    }

    pub fn regions(&self) -> Vec<&str> {
        self.regions.iter().map(|entry| entry.key.as_str()).collect()
    }

    /// Countries under `region`; empty when the region is unknown.
    pub fn sub_regions(&self, region: &str) -> Vec<&str> {
        self.region(region)
            .map(|entry| {
                entry
                    .countries
                    .iter()
                    .map(|country| country.key.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn offices(&self, region: &str, country: &str) -> Vec<OfficeListing<'_>> {
        self.country(region, country)
            .map(|entry| {
                entry
                    .offices
                    .iter()
                    .map(|(key, office)| OfficeListing {
                        key: key.as_str(),
                        office,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn find(&self, region: &str, country: &str, key: &str) -> Option<&Office> {
        self.country(region, country)?
            .offices
            .iter()
            .find(|(office_key, _)| office_key == key)
            .map(|(_, office)| office)
    }

    pub fn office_count(&self) -> usize {
        self.regions
            .iter()
            .flat_map(|region| region.countries.iter())
            .map(|country| country.offices.len())
            .sum()
    }

    fn region(&self, region: &str) -> Option<&RegionEntry> {
        self.regions.iter().find(|entry| entry.key == region)
    }

    fn country(&self, region: &str, country: &str) -> Option<&CountryEntry> {
        self.region(region)?
            .countries
            .iter()
            .find(|entry| entry.key == country)
    }
}
