use std::collections::{HashMap, HashSet};
use std::fmt;

use fake::Fake;
use fake::faker::address::raw::{BuildingNumber, CityName, CountryName, StreetName};
use fake::faker::company::raw::CompanyName;
use fake::faker::name::raw::LastName;
use fake::faker::impls::address::CityNameGenFn;
use fake::locales::{EN, FR_FR, PT_BR};
use rand::{Rng, RngCore};

use crate::errors::GenerationError;
use crate::locales::LocaleKey;
use crate::names::first_names;

/// Redraws allowed before a unique field is declared exhausted.
pub const MAX_UNIQUE_ATTEMPTS: u32 = 1000;

/// Kinds of realistic text the generator asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextField {
    MaleName,
    FemaleName,
    Company,
    City,
    StreetAddress,
    Country,
}

impl TextField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MaleName => "male name",
            Self::FemaleName => "female name",
            Self::Company => "company",
            Self::City => "city",
            Self::StreetAddress => "street address",
            Self::Country => "country",
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of locale-aware names, companies and places.
///
/// Implementations draw all randomness from `rng` so a seeded generator stays
/// reproducible.
pub trait TextSource {
    fn text(
        &mut self,
        field: TextField,
        locale: LocaleKey,
        rng: &mut dyn RngCore,
    ) -> Result<String, GenerationError>;
}

/// Default text source backed by the `fake` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakerTextSource;

impl TextSource for FakerTextSource {
    fn text(
        &mut self,
        field: TextField,
        locale: LocaleKey,
        rng: &mut dyn RngCore,
    ) -> Result<String, GenerationError> {
        let value = match locale {
            LocaleKey::EnUs => draw(EN, locale, field, rng),
            LocaleKey::PtBr => draw(PT_BR, locale, field, rng),
            LocaleKey::FrFr => draw(FR_FR, locale, field, rng),
        };
        Ok(value)
    }
}

fn draw<L: CityNameGenFn>(
    data: L,
    locale: LocaleKey,
    field: TextField,
    rng: &mut dyn RngCore,
) -> String {
    match field {
        TextField::MaleName | TextField::FemaleName => {
            let names = first_names(locale, field == TextField::MaleName);
            let first = names[rng.random_range(0..names.len())];
            let last: String = LastName(data).fake_with_rng(rng);
            format!("{first} {last}")
        }
        TextField::Company => CompanyName(data).fake_with_rng(rng),
        TextField::City => CityName(data).fake_with_rng(rng),
        TextField::StreetAddress => {
            let number: String = BuildingNumber(data).fake_with_rng(rng);
            let street: String = StreetName(data).fake_with_rng(rng);
            format!("{number} {street}")
        }
        TextField::Country => CountryName(data).fake_with_rng(rng),
    }
}

/// Per-call memory of values already handed out for each field.
#[derive(Debug, Default)]
pub(crate) struct UniqueScope {
    enabled: bool,
    seen: HashMap<TextField, HashSet<String>>,
}

impl UniqueScope {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            seen: HashMap::new(),
        }
    }

    pub(crate) fn draw(
        &mut self,
        source: &mut dyn TextSource,
        field: TextField,
        locale: LocaleKey,
        rng: &mut dyn RngCore,
    ) -> Result<String, GenerationError> {
        if !self.enabled {
            return source.text(field, locale, rng);
        }

        let seen = self.seen.entry(field).or_default();
        for _ in 0..MAX_UNIQUE_ATTEMPTS {
            let value = source.text(field, locale, rng)?;
            if !seen.contains(&value) {
                seen.insert(value.clone());
                return Ok(value);
            }
        }
        Err(GenerationError::NameSpaceExhausted {
            field,
            attempts: MAX_UNIQUE_ATTEMPTS,
        })
    }
}
