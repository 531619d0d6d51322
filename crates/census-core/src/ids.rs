use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minimum number of digits in the numeric part of an id.
pub const ID_WIDTH: usize = 6;

/// The three entity kinds, each with its own id namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Workplace,
    Address,
}

impl EntityKind {
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Person => "P",
            Self::Workplace => "WP",
            Self::Address => "A",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Workplace => "workplace",
            Self::Address => "address",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render the id for the `sequence`-th entity (1-based) of `kind`.
///
/// Sequences up to 999 999 are zero-padded to six digits, so lexicographic
/// order matches creation order. Larger sequences widen the numeric part and
/// stay unique.
pub fn format_id(kind: EntityKind, sequence: u64) -> Result<String> {
    if sequence == 0 {
        return Err(Error::InvalidArgument(format!(
            "{kind} id sequence starts at 1"
        )));
    }
    Ok(render(kind, sequence))
}

fn render(kind: EntityKind, sequence: u64) -> String {
    format!("{}-{:0width$}", kind.prefix(), sequence, width = ID_WIDTH)
}

/// Typed identifier of one entity kind.
pub trait EntityId: Clone + Ord + fmt::Display {
    const KIND: EntityKind;

    /// Wrap an id string as read from storage. No pattern check is applied.
    fn from_raw(raw: String) -> Self;

    fn raw(&self) -> &str;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl EntityId for $name {
            const KIND: EntityKind = $kind;

            fn from_raw(raw: String) -> Self {
                Self(raw)
            }

            fn raw(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a person (`P-000001`).
    PersonId => EntityKind::Person
);
entity_id!(
    /// Identifier of a workplace (`WP-000001`).
    WorkplaceId => EntityKind::Workplace
);
entity_id!(
    /// Identifier of an address (`A-000001`).
    AddressId => EntityKind::Address
);

/// Sequential id source for one entity kind. Every allocator starts at 1.
#[derive(Debug)]
pub struct IdAllocator<I> {
    next: u64,
    _kind: PhantomData<I>,
}

impl<I: EntityId> IdAllocator<I> {
    pub fn new() -> Self {
        Self {
            next: 1,
            _kind: PhantomData,
        }
    }

    pub fn next_id(&mut self) -> I {
        let id = I::from_raw(render(I::KIND, self.next));
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl<I: EntityId> Default for IdAllocator<I> {
    fn default() -> Self {
        Self::new()
    }
}
