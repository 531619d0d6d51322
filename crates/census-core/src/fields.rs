//! Canonical flattened field names shared by every storage format.

use crate::ids::EntityId;

pub const PERSON_FIELDS: [&str; 6] = ["id", "name", "age", "male", "workplace", "address"];
pub const WORKPLACE_FIELDS: [&str; 4] = ["id", "name", "location", "employees"];
pub const ADDRESS_FIELDS: [&str; 5] = ["id", "street", "city", "country", "resident"];

/// Separator for id lists stored in a single text field.
pub const LIST_SEPARATOR: char = ',';

/// Join ids into one field value (`P-000001,P-000002`).
pub fn join_ids<I: EntityId>(ids: &[I]) -> String {
    ids.iter()
        .map(EntityId::raw)
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}

/// Split a joined field back into ids, dropping blank entries.
pub fn split_ids<I: EntityId>(value: &str) -> Vec<I> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| I::from_raw(part.to_string()))
        .collect()
}

/// Map an empty field to an absent reference.
pub fn optional_id<I: EntityId>(value: &str) -> Option<I> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(I::from_raw(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PersonId;

    #[test]
    fn split_ignores_blanks_and_whitespace() {
        let ids: Vec<PersonId> = split_ids(" P-000001, ,P-000002,");
        assert_eq!(ids, vec![PersonId::new("P-000001"), PersonId::new("P-000002")]);
        assert!(split_ids::<PersonId>("").is_empty());
    }

    #[test]
    fn join_uses_comma() {
        let ids = vec![PersonId::new("P-000001"), PersonId::new("P-000002")];
        assert_eq!(join_ids(&ids), "P-000001,P-000002");
    }
}
