//! Flattened, all-text record rows shared by the csv and xlsx adapters.
//!
//! Rows carry every field as written on disk. Conversion into the model
//! parses scalars and keeps relationship fields as raw ids.

use census_core::fields::{join_ids, optional_id, split_ids};
use census_core::{Address, AddressId, MAX_AGE, Person, PersonId, Workplace, WorkplaceId};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRow {
    pub id: String,
    pub name: String,
    pub age: String,
    pub male: String,
    pub workplace: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkplaceRow {
    pub id: String,
    pub name: String,
    pub location: String,
    pub employees: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRow {
    pub id: String,
    pub street: String,
    pub city: String,
    pub country: String,
    pub resident: String,
}

impl PersonRow {
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.id,
            &self.name,
            &self.age,
            &self.male,
            &self.workplace,
            &self.address,
        ]
    }
}

impl WorkplaceRow {
    pub fn cells(&self) -> [&str; 4] {
        [&self.id, &self.name, &self.location, &self.employees]
    }
}

impl AddressRow {
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.id,
            &self.street,
            &self.city,
            &self.country,
            &self.resident,
        ]
    }
}

impl From<&Person> for PersonRow {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id.to_string(),
            name: person.name.clone(),
            age: person.age.to_string(),
            male: person.male.to_string(),
            workplace: person
                .workplace
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            address: person
                .address
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

impl From<&Workplace> for WorkplaceRow {
    fn from(workplace: &Workplace) -> Self {
        Self {
            id: workplace.id.to_string(),
            name: workplace.name.clone(),
            location: workplace.location.clone(),
            employees: join_ids(&workplace.employees),
        }
    }
}

impl From<&Address> for AddressRow {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            street: address.street.clone(),
            city: address.city.clone(),
            country: address.country.clone(),
            resident: address
                .resident
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

impl TryFrom<PersonRow> for Person {
    type Error = StoreError;

    fn try_from(row: PersonRow) -> StoreResult<Self> {
        let id = required_id(&row.id, "person")?;
        let person = Person {
            age: parse_age(&row.age, &id)?,
            male: parse_bool(&row.male, &id)?,
            id: PersonId::new(id),
            name: row.name,
            workplace: optional_id::<WorkplaceId>(&row.workplace),
            address: optional_id::<AddressId>(&row.address),
        };
        person.validate().map_err(invalid_record)?;
        Ok(person)
    }
}

impl TryFrom<WorkplaceRow> for Workplace {
    type Error = StoreError;

    fn try_from(row: WorkplaceRow) -> StoreResult<Self> {
        let id = required_id(&row.id, "workplace")?;
        let workplace = Workplace {
            id: WorkplaceId::new(id),
            name: row.name,
            location: row.location,
            employees: split_ids::<PersonId>(&row.employees),
        };
        workplace.validate().map_err(invalid_record)?;
        Ok(workplace)
    }
}

impl TryFrom<AddressRow> for Address {
    type Error = StoreError;

    fn try_from(row: AddressRow) -> StoreResult<Self> {
        let id = required_id(&row.id, "address")?;
        let address = Address {
            id: AddressId::new(id),
            street: row.street,
            city: row.city,
            country: row.country,
            resident: optional_id::<PersonId>(&row.resident),
        };
        address.validate().map_err(invalid_record)?;
        Ok(address)
    }
}

fn required_id(value: &str, kind: &str) -> StoreResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::Format(format!("{kind} record without id")));
    }
    Ok(value.to_string())
}

/// Parse an age cell. Spreadsheets hand integral numbers back as `42` or
/// `42.0`; both are accepted.
pub(crate) fn parse_age(value: &str, id: &str) -> StoreResult<u8> {
    let value = value.trim();
    let age = match value.parse::<u8>() {
        Ok(age) => Some(age),
        Err(_) => value
            .parse::<f64>()
            .ok()
            .filter(|age| age.fract() == 0.0 && (0.0..=f64::from(MAX_AGE)).contains(age))
            .map(|age| age as u8),
    };
    match age {
        Some(age) if age <= MAX_AGE => Ok(age),
        _ => Err(StoreError::Format(format!(
            "person {id}: age '{value}' is not an integer between 0 and {MAX_AGE}"
        ))),
    }
}

pub(crate) fn parse_bool(value: &str, id: &str) -> StoreResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(StoreError::Format(format!(
            "person {id}: male flag '{other}' is not a boolean"
        ))),
    }
}

fn invalid_record(err: census_core::Error) -> StoreError {
    StoreError::Format(err.to_string())
}
