use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::fields::optional_id;
use crate::ids::{AddressId, EntityId, PersonId, WorkplaceId};

/// Highest age a person may carry.
pub const MAX_AGE: u8 = 100;

/// A generated or loaded person.
///
/// `workplace` is always set on generated people; loaded records may lack it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub age: u8,
    pub male: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub workplace: Option<WorkplaceId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub address: Option<AddressId>,
}

impl Person {
    /// Check the scalar fields against their semantic ranges.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(Error::InvalidRecord("person id is empty".to_string()));
        }
        if self.age > MAX_AGE {
            return Err(Error::InvalidRecord(format!(
                "person {}: age {} exceeds {}",
                self.id, self.age, MAX_AGE
            )));
        }
        Ok(())
    }
}

/// A workplace and the ids of the people employed there, in hiring order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workplace {
    pub id: WorkplaceId,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub employees: Vec<PersonId>,
}

impl Workplace {
    pub fn new(id: WorkplaceId, name: String, location: String) -> Self {
        Self {
            id,
            name,
            location,
            employees: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(Error::InvalidRecord("workplace id is empty".to_string()));
        }
        Ok(())
    }
}

/// An address with at most one resident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub street: String,
    pub city: String,
    pub country: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub resident: Option<PersonId>,
}

impl Address {
    pub fn new(id: AddressId, street: String, city: String, country: String) -> Self {
        Self {
            id,
            street,
            city,
            country,
            resident: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(Error::InvalidRecord("address id is empty".to_string()));
        }
        Ok(())
    }
}

// A blank reference reads as absent, matching the flat formats.
fn empty_as_none<'de, D, I>(deserializer: D) -> std::result::Result<Option<I>, D::Error>
where
    D: Deserializer<'de>,
    I: EntityId,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(optional_id))
}

// Records compare, order and hash by id alone.
macro_rules! identity_by_id {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    self.id == other.id
                }
            }

            impl Eq for $ty {}

            impl PartialOrd for $ty {
                fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                    Some(self.cmp(other))
                }
            }

            impl Ord for $ty {
                fn cmp(&self, other: &Self) -> Ordering {
                    self.id.cmp(&other.id)
                }
            }

            impl Hash for $ty {
                fn hash<H: Hasher>(&self, state: &mut H) {
                    self.id.hash(state);
                }
            }
        )+
    };
}

identity_by_id!(Person, Workplace, Address);
