use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use census_core::{
    Address, AddressId, Dataset, EntityId, IdAllocator, MAX_AGE, Person, PersonId, Workplace,
    WorkplaceId,
};

use crate::errors::GenerationError;
use crate::locales::LocaleKey;
use crate::model::{AddressOptions, DatasetRequest, PeopleOptions, WorkplaceOptions};
use crate::text::{FakerTextSource, TextField, TextSource, UniqueScope};

/// Builds workplaces, addresses and people from one seeded random source.
///
/// Every call restarts id numbering at 1 for the kinds it creates and runs a
/// single pass; the same seed, text source and call sequence reproduce the
/// same records.
pub struct Generator {
    rng: ChaCha8Rng,
    text: Box<dyn TextSource>,
}

impl Generator {
    /// Generator with the faker-backed text source.
    pub fn new(seed: u64) -> Self {
        Self::with_text_source(seed, Box::new(FakerTextSource))
    }

    pub fn with_text_source(seed: u64, text: Box<dyn TextSource>) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            text,
        }
    }

    pub fn generate_workplaces(
        &mut self,
        count: usize,
        options: &WorkplaceOptions,
    ) -> Result<Vec<Workplace>, GenerationError> {
        require_count(count, "workplace")?;

        let mut ids: IdAllocator<WorkplaceId> = IdAllocator::new();
        let mut scope = UniqueScope::new(options.unique);
        let mut workplaces = Vec::with_capacity(count);
        for _ in 0..count {
            let name = self.draw(&mut scope, TextField::Company, options.locale)?;
            let location = match &options.location {
                Some(location) => location.clone(),
                None => self.draw(&mut scope, TextField::City, options.locale)?,
            };
            workplaces.push(Workplace::new(ids.next_id(), name, location));
        }

        info!(
            count,
            locale = %options.locale,
            unique = options.unique,
            "workplaces generated"
        );
        Ok(workplaces)
    }

    pub fn generate_addresses(
        &mut self,
        count: usize,
        options: &AddressOptions,
    ) -> Result<Vec<Address>, GenerationError> {
        require_count(count, "address")?;

        let mut ids: IdAllocator<AddressId> = IdAllocator::new();
        let mut scope = UniqueScope::new(options.unique);
        let mut addresses = Vec::with_capacity(count);
        for _ in 0..count {
            let street = self.draw(&mut scope, TextField::StreetAddress, options.locale)?;
            let city = self.draw(&mut scope, TextField::City, options.locale)?;
            let country = match &options.country {
                Some(country) => country.clone(),
                None => self.draw(&mut scope, TextField::Country, options.locale)?,
            };
            addresses.push(Address::new(ids.next_id(), street, city, country));
        }

        info!(
            count,
            locale = %options.locale,
            unique = options.unique,
            "addresses generated"
        );
        Ok(addresses)
    }

    /// Generate `count` people and wire them into the workplace and address
    /// pools.
    ///
    /// Without a workplace pool, 1..=`count` workplaces are generated first.
    /// Without an address pool, `count` addresses are generated. A supplied
    /// address pool shorter than `count` is used as-is and the remaining
    /// people get no address.
    ///
    /// Workplaces are drawn without replacement until each has one employee,
    /// then uniformly among those already used. Person `i` lives at address
    /// `i`. The returned dataset holds the people in creation order together
    /// with both pools, back-references filled in.
    pub fn generate_people(
        &mut self,
        count: usize,
        workplaces: Option<Vec<Workplace>>,
        addresses: Option<Vec<Address>>,
        options: &PeopleOptions,
    ) -> Result<Dataset, GenerationError> {
        validate_people(count, workplaces.as_deref(), addresses.as_deref(), options)?;

        let mut workplaces = match workplaces {
            Some(pool) => pool,
            None => {
                let pool_size = self.rng.random_range(1..=count);
                let pool_options = WorkplaceOptions {
                    locale: options.locale,
                    ..WorkplaceOptions::default()
                };
                self.generate_workplaces(pool_size, &pool_options)?
            }
        };
        let mut addresses = match addresses {
            Some(pool) => pool,
            None => {
                let pool_options = AddressOptions {
                    locale: options.locale,
                    ..AddressOptions::default()
                };
                self.generate_addresses(count, &pool_options)?
            }
        };

        info!(
            count,
            workplaces = workplaces.len(),
            addresses = addresses.len(),
            male_ratio = options.male_ratio,
            min_age = options.min_age,
            max_age = options.max_age,
            "generating people"
        );

        let mut ids: IdAllocator<PersonId> = IdAllocator::new();
        let mut scope = UniqueScope::new(options.unique);
        let mut unassigned: Vec<usize> = (0..workplaces.len()).collect();
        let mut used: Vec<usize> = Vec::with_capacity(workplaces.len());
        let mut people = Vec::with_capacity(count);

        for i in 0..count {
            let workplace_idx = if unassigned.is_empty() {
                used[self.rng.random_range(0..used.len())]
            } else {
                let idx = unassigned.remove(self.rng.random_range(0..unassigned.len()));
                used.push(idx);
                idx
            };
            let address_idx = (i < addresses.len()).then_some(i);

            let male = self.rng.random_bool(options.male_ratio);
            let field = if male {
                TextField::MaleName
            } else {
                TextField::FemaleName
            };
            let name = self.draw(&mut scope, field, options.locale)?;
            let age = self.rng.random_range(options.min_age..=options.max_age);

            let id = ids.next_id();
            let workplace = &mut workplaces[workplace_idx];
            workplace.employees.push(id.clone());
            let address = address_idx.map(|idx| {
                let address = &mut addresses[idx];
                address.resident = Some(id.clone());
                address.id.clone()
            });

            debug!(
                person = %id,
                workplace = %workplace.id,
                address = address.as_ref().map(EntityId::raw).unwrap_or(""),
                "person assigned"
            );

            people.push(Person {
                id,
                name,
                age,
                male,
                workplace: Some(workplace.id.clone()),
                address,
            });
        }

        let dataset = Dataset::new(people, workplaces, addresses)?;
        let summary = dataset.summary();
        info!(
            people = summary.people,
            workplaces = summary.workplaces,
            addresses = summary.addresses,
            people_without_address = summary.people_without_address,
            "people generated"
        );
        Ok(dataset)
    }

    /// Workplaces, then addresses, then people over both pools.
    pub fn generate_dataset(&mut self, request: &DatasetRequest) -> Result<Dataset, GenerationError> {
        validate_people(request.people, None, None, &request.people_options)?;
        if let Some(count) = request.workplaces {
            require_count(count, "workplace")?;
        }
        if let Some(count) = request.addresses {
            require_count(count, "address")?;
        }

        let workplace_count = match request.workplaces {
            Some(count) => count,
            None => self.rng.random_range(1..=request.people),
        };
        let workplaces = self.generate_workplaces(workplace_count, &request.workplace_options)?;
        let address_count = request.addresses.unwrap_or(request.people);
        let addresses = self.generate_addresses(address_count, &request.address_options)?;
        self.generate_people(
            request.people,
            Some(workplaces),
            Some(addresses),
            &request.people_options,
        )
    }

    fn draw(
        &mut self,
        scope: &mut UniqueScope,
        field: TextField,
        locale: LocaleKey,
    ) -> Result<String, GenerationError> {
        scope.draw(self.text.as_mut(), field, locale, &mut self.rng)
    }
}

fn require_count(count: usize, kind: &str) -> Result<(), GenerationError> {
    if count == 0 {
        return Err(GenerationError::InvalidArgument(format!(
            "{kind} count must be at least 1"
        )));
    }
    Ok(())
}

fn validate_people(
    count: usize,
    workplaces: Option<&[Workplace]>,
    addresses: Option<&[Address]>,
    options: &PeopleOptions,
) -> Result<(), GenerationError> {
    require_count(count, "person")?;
    if !(0.0..=1.0).contains(&options.male_ratio) {
        return Err(GenerationError::InvalidArgument(format!(
            "male_ratio must be within [0, 1], got {}",
            options.male_ratio
        )));
    }
    if options.min_age > options.max_age || options.max_age > MAX_AGE {
        return Err(GenerationError::InvalidArgument(format!(
            "ages must satisfy 0 <= min_age <= max_age <= {MAX_AGE}, got {}..={}",
            options.min_age, options.max_age
        )));
    }
    if let Some(pool) = workplaces {
        if pool.is_empty() {
            return Err(GenerationError::InvalidArgument(
                "workplace pool must not be empty".to_string(),
            ));
        }
        require_distinct(pool.iter().map(|w| &w.id))?;
    }
    if let Some(pool) = addresses {
        require_distinct(pool.iter().map(|a| &a.id))?;
    }
    Ok(())
}

fn require_distinct<'a, I: EntityId + 'a>(
    ids: impl Iterator<Item = &'a I>,
) -> Result<(), GenerationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.raw()) {
            return Err(GenerationError::InvalidArgument(format!(
                "duplicate {} id '{}' in supplied pool",
                I::KIND,
                id
            )));
        }
    }
    Ok(())
}
