//! Identifier checks
//!
//! Table and field names end up inside statement text, so they are checked
//! once, when a repository or statement is built, and carried around as
//! validated newtypes afterwards.

use std::fmt;
use thiserror::Error;

/// What a checked name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identifier {
    Table,
    Field,
    Statement,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Identifier::Table => "table",
            Identifier::Field => "field",
            Identifier::Statement => "statement",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} name is empty")]
    Empty(Identifier),

    #[error("{kind} name '{name}' is {length} characters long, limit is {limit}")]
    TooLong {
        kind: Identifier,
        name: String,
        length: usize,
        limit: usize,
    },

    #[error("{kind} name '{name}' must begin with an ASCII letter")]
    BadLeadingCharacter { kind: Identifier, name: String },

    #[error("{kind} name '{name}' may only hold ASCII letters, digits and '_'")]
    InvalidCharacters { kind: Identifier, name: String },

    #[error("{kind} name '{name}' collides with a query keyword")]
    ReservedKeyword { kind: Identifier, name: String },
}

const TABLE_NAME_LIMIT: usize = 256;
const FIELD_NAME_LIMIT: usize = 64;

// Words the query dialect reserves in identifier position
const KEYWORDS: &[&str] = &[
    "AND", "AS", "ASC", "BY", "COUNT", "DECLARE", "DELETE", "DESC", "EXISTS", "FALSE", "FROM",
    "GROUP", "IN", "INSERT", "INTO", "LIMIT", "NESTED", "NOT", "NULL", "OFFSET", "OR", "ORDER",
    "RETURNING", "SELECT", "SET", "TABLES", "TRUE", "UPDATE", "UPSERT", "VALUES", "WHERE",
];

fn check_length(kind: Identifier, name: &str, limit: usize) -> Result<(), ValidationError> {
    if name.len() > limit {
        return Err(ValidationError::TooLong {
            kind,
            name: name.to_string(),
            length: name.len(),
            limit,
        });
    }
    Ok(())
}

/// One dot-free identifier: a letter, then letters, digits or underscores
fn check_component(kind: Identifier, name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(ValidationError::Empty(kind));
    };

    if !first.is_ascii_alphabetic() {
        return Err(ValidationError::BadLeadingCharacter {
            kind,
            name: name.to_string(),
        });
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidCharacters {
            kind,
            name: name.to_string(),
        });
    }
    if KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name)) {
        return Err(ValidationError::ReservedKeyword {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Table name safe to embed in a statement
///
/// Child tables use dotted names (`orders.items`); every component must be a
/// valid identifier on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedTableName(String);

impl ValidatedTableName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        check_length(Identifier::Table, name, TABLE_NAME_LIMIT)?;
        name.split('.')
            .try_for_each(|part| check_component(Identifier::Table, part))?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parent table of a child table, if any
    pub fn parent(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(parent, _)| parent)
    }
}

impl fmt::Display for ValidatedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Field name safe to embed in a statement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedFieldName(String);

impl ValidatedFieldName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        check_length(Identifier::Field, name, FIELD_NAME_LIMIT)?;
        check_component(Identifier::Field, name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_names_accepted() {
        for name in ["sensors", "Audit_Log", "t1", "orders.items", "a.b.c"] {
            let table = ValidatedTableName::new(name)
                .unwrap_or_else(|e| panic!("{} rejected: {}", name, e));
            assert_eq!(table.to_string(), name);
        }
    }

    #[test]
    fn test_table_names_rejected() {
        assert_eq!(
            ValidatedTableName::new(""),
            Err(ValidationError::Empty(Identifier::Table))
        );
        assert_eq!(
            ValidatedTableName::new("orders..items"),
            Err(ValidationError::Empty(Identifier::Table))
        );
        assert!(matches!(
            ValidatedTableName::new("9lives"),
            Err(ValidationError::BadLeadingCharacter { .. })
        ));
        assert!(matches!(
            ValidatedTableName::new("orders._hidden"),
            Err(ValidationError::BadLeadingCharacter { .. })
        ));
        assert!(matches!(
            ValidatedTableName::new("orders; DROP"),
            Err(ValidationError::InvalidCharacters { .. })
        ));
        assert!(matches!(
            ValidatedTableName::new("orders.Values"),
            Err(ValidationError::ReservedKeyword { .. })
        ));
    }

    #[test]
    fn test_table_parent() {
        let child = ValidatedTableName::new("orders.items").unwrap();
        assert_eq!(child.parent(), Some("orders"));
        assert_eq!(ValidatedTableName::new("orders").unwrap().parent(), None);
    }

    #[test]
    fn test_field_name_length_limit() {
        assert!(ValidatedFieldName::new(&"k".repeat(FIELD_NAME_LIMIT)).is_ok());

        let err = ValidatedFieldName::new(&"k".repeat(FIELD_NAME_LIMIT + 1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "field name '{}' is 65 characters long, limit is 64",
                "k".repeat(65)
            )
        );
    }

    #[test]
    fn test_field_names_cannot_be_dotted_or_keywords() {
        assert!(matches!(
            ValidatedFieldName::new("address.city"),
            Err(ValidationError::InvalidCharacters {
                kind: Identifier::Field,
                ..
            })
        ));
        assert!(matches!(
            ValidatedFieldName::new("limit"),
            Err(ValidationError::ReservedKeyword { .. })
        ));
    }
}
