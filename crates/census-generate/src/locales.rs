use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// Locales the default text source can draw from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LocaleKey {
    #[default]
    EnUs,
    PtBr,
    FrFr,
}

impl LocaleKey {
    pub const ALL: [LocaleKey; 3] = [Self::EnUs, Self::PtBr, Self::FrFr];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en_US" => Some(Self::EnUs),
            "pt_BR" => Some(Self::PtBr),
            "fr_FR" => Some(Self::FrFr),
            _ => None,
        }
    }

    /// Like [`LocaleKey::parse`], failing with `UnsupportedLocale`.
    pub fn resolve(value: &str) -> Result<Self, GenerationError> {
        Self::parse(value).ok_or_else(|| GenerationError::UnsupportedLocale(value.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::PtBr => "pt_BR",
            Self::FrFr => "fr_FR",
        }
    }
}

impl fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for LocaleKey {
    type Error = GenerationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::resolve(&value)
    }
}

impl From<LocaleKey> for String {
    fn from(locale: LocaleKey) -> Self {
        locale.as_str().to_string()
    }
}
