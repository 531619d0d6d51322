use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::error::{Error, Result};
use crate::ids::{AddressId, EntityId, EntityKind, PersonId, WorkplaceId};
use crate::model::{Address, Person, Workplace};

static ID_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(P|WP|A)-(\d{6,})$").ok());

/// A relationship invariant broken by a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityViolation {
    #[error("{kind} id '{id}' does not match the {kind} id pattern")]
    MalformedId { kind: EntityKind, id: String },
    #[error("person {person} has no workplace")]
    MissingWorkplace { person: PersonId },
    #[error("person {person} references unknown {kind} '{target}'")]
    DanglingReference {
        person: PersonId,
        kind: EntityKind,
        target: String,
    },
    #[error("workplace {workplace} lists unknown employee {person}")]
    UnknownEmployee {
        workplace: WorkplaceId,
        person: PersonId,
    },
    #[error("person {person} is listed by workplace {listed_by} but works at {works_at}")]
    EmployeeMismatch {
        person: PersonId,
        listed_by: WorkplaceId,
        works_at: String,
    },
    #[error("person {person} appears {count} times across employee lists")]
    EmployeeCount { person: PersonId, count: usize },
    #[error("address {address} and its resident {person} disagree")]
    ResidentMismatch {
        address: AddressId,
        person: PersonId,
    },
}

/// Record counts of a dataset, used for run summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub people: usize,
    pub workplaces: usize,
    pub addresses: usize,
    pub people_without_address: usize,
    pub vacant_addresses: usize,
}

/// The closed graph produced by one generation run.
///
/// Records are stored in creation order next to id indexes; relationships are
/// id-valued fields resolved through those indexes.
#[derive(Debug, Clone)]
pub struct Dataset {
    people: Vec<Person>,
    workplaces: Vec<Workplace>,
    addresses: Vec<Address>,
    people_by_id: BTreeMap<PersonId, usize>,
    workplaces_by_id: BTreeMap<WorkplaceId, usize>,
    addresses_by_id: BTreeMap<AddressId, usize>,
}

impl Dataset {
    /// Build a dataset, rejecting duplicate ids within a kind.
    pub fn new(
        people: Vec<Person>,
        workplaces: Vec<Workplace>,
        addresses: Vec<Address>,
    ) -> Result<Self> {
        let people_by_id = index_by_id(people.iter().map(|p| &p.id))?;
        let workplaces_by_id = index_by_id(workplaces.iter().map(|w| &w.id))?;
        let addresses_by_id = index_by_id(addresses.iter().map(|a| &a.id))?;
        Ok(Self {
            people,
            workplaces,
            addresses,
            people_by_id,
            workplaces_by_id,
            addresses_by_id,
        })
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn workplaces(&self) -> &[Workplace] {
        &self.workplaces
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.people_by_id.get(id).map(|&idx| &self.people[idx])
    }

    pub fn workplace(&self, id: &WorkplaceId) -> Option<&Workplace> {
        self.workplaces_by_id.get(id).map(|&idx| &self.workplaces[idx])
    }

    pub fn address(&self, id: &AddressId) -> Option<&Address> {
        self.addresses_by_id.get(id).map(|&idx| &self.addresses[idx])
    }

    pub fn workplace_of(&self, person: &Person) -> Option<&Workplace> {
        person.workplace.as_ref().and_then(|id| self.workplace(id))
    }

    pub fn address_of(&self, person: &Person) -> Option<&Address> {
        person.address.as_ref().and_then(|id| self.address(id))
    }

    pub fn employees_of<'a>(
        &'a self,
        workplace: &'a Workplace,
    ) -> impl Iterator<Item = &'a Person> + 'a {
        workplace.employees.iter().filter_map(|id| self.person(id))
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            people: self.people.len(),
            workplaces: self.workplaces.len(),
            addresses: self.addresses.len(),
            people_without_address: self.people.iter().filter(|p| p.address.is_none()).count(),
            vacant_addresses: self.addresses.iter().filter(|a| a.resident.is_none()).count(),
        }
    }

    /// Check the relationship invariants a freshly generated dataset holds.
    pub fn verify_integrity(&self) -> std::result::Result<(), IntegrityViolation> {
        for id in self.people_by_id.keys() {
            check_pattern(id)?;
        }
        for id in self.workplaces_by_id.keys() {
            check_pattern(id)?;
        }
        for id in self.addresses_by_id.keys() {
            check_pattern(id)?;
        }

        for person in &self.people {
            let Some(workplace) = &person.workplace else {
                return Err(IntegrityViolation::MissingWorkplace {
                    person: person.id.clone(),
                });
            };
            if self.workplace(workplace).is_none() {
                return Err(IntegrityViolation::DanglingReference {
                    person: person.id.clone(),
                    kind: EntityKind::Workplace,
                    target: workplace.to_string(),
                });
            }
            if let Some(address) = &person.address {
                let Some(found) = self.address(address) else {
                    return Err(IntegrityViolation::DanglingReference {
                        person: person.id.clone(),
                        kind: EntityKind::Address,
                        target: address.to_string(),
                    });
                };
                if found.resident.as_ref() != Some(&person.id) {
                    return Err(IntegrityViolation::ResidentMismatch {
                        address: found.id.clone(),
                        person: person.id.clone(),
                    });
                }
            }
        }

        let mut listings: BTreeMap<&PersonId, usize> = BTreeMap::new();
        for workplace in &self.workplaces {
            for employee in &workplace.employees {
                let Some(person) = self.person(employee) else {
                    return Err(IntegrityViolation::UnknownEmployee {
                        workplace: workplace.id.clone(),
                        person: employee.clone(),
                    });
                };
                if person.workplace.as_ref() != Some(&workplace.id) {
                    return Err(IntegrityViolation::EmployeeMismatch {
                        person: person.id.clone(),
                        listed_by: workplace.id.clone(),
                        works_at: person
                            .workplace
                            .as_ref()
                            .map(ToString::to_string)
                            .unwrap_or_default(),
                    });
                }
                *listings.entry(employee).or_insert(0) += 1;
            }
        }
        for person in &self.people {
            let count = listings.get(&person.id).copied().unwrap_or(0);
            if count != 1 {
                return Err(IntegrityViolation::EmployeeCount {
                    person: person.id.clone(),
                    count,
                });
            }
        }

        for address in &self.addresses {
            if let Some(resident) = &address.resident {
                let lives_here = self
                    .person(resident)
                    .is_some_and(|person| person.address.as_ref() == Some(&address.id));
                if !lives_here {
                    return Err(IntegrityViolation::ResidentMismatch {
                        address: address.id.clone(),
                        person: resident.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Records read back from storage. Relationship fields hold the raw ids that
/// were stored; nothing is resolved against the other collections.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadedRecords {
    pub people: Vec<Person>,
    pub workplaces: Vec<Workplace>,
    pub addresses: Vec<Address>,
}

impl LoadedRecords {
    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.workplaces.is_empty() && self.addresses.is_empty()
    }
}

fn index_by_id<'a, I>(ids: impl Iterator<Item = &'a I>) -> Result<BTreeMap<I, usize>>
where
    I: EntityId + 'a,
{
    let mut index = BTreeMap::new();
    for (position, id) in ids.enumerate() {
        if index.insert(id.clone(), position).is_some() {
            return Err(Error::InvalidArgument(format!(
                "duplicate {} id '{}'",
                I::KIND,
                id
            )));
        }
    }
    Ok(index)
}

fn check_pattern<I: EntityId>(id: &I) -> std::result::Result<(), IntegrityViolation> {
    let matches_kind = ID_PATTERN
        .as_ref()
        .and_then(|re| re.captures(id.raw()))
        .and_then(|caps| caps.get(1))
        .is_some_and(|prefix| prefix.as_str() == I::KIND.prefix());
    if matches_kind {
        Ok(())
    } else {
        Err(IntegrityViolation::MalformedId {
            kind: I::KIND,
            id: id.raw().to_string(),
        })
    }
}
