//! Statement construction
//!
//! A [`Statement`] renders to deterministic text, and that text is the key
//! under which the prepared form is cached.

use crate::query_builder::ordering::{Sort, SortOrder};
use crate::validation::{Identifier, ValidatedFieldName, ValidatedTableName, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Count,
    Delete,
    /// Caller-supplied statement text, passed to the driver untouched
    Native,
}

/// A statement the store can prepare and execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    kind: StatementKind,
    table: Option<ValidatedTableName>,
    order_by: Vec<(ValidatedFieldName, SortOrder)>,
    limit: Option<u64>,
    offset: Option<u64>,
    native: Option<String>,
}

impl Statement {
    fn for_table(kind: StatementKind, table: &ValidatedTableName) -> Self {
        Self {
            kind,
            table: Some(table.clone()),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            native: None,
        }
    }

    /// Select every row of a table
    pub fn select_all(table: &ValidatedTableName) -> Self {
        Self::for_table(StatementKind::Select, table)
    }

    /// Count rows of a table
    pub fn count(table: &ValidatedTableName) -> Self {
        Self::for_table(StatementKind::Count, table)
    }

    /// Delete every row of a table
    pub fn delete_all(table: &ValidatedTableName) -> Self {
        Self::for_table(StatementKind::Delete, table)
    }

    /// Named or hand-written statement
    pub fn native(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::Empty(Identifier::Statement));
        }
        Ok(Self {
            kind: StatementKind::Native,
            table: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            native: Some(text),
        })
    }

    /// Append sort keys; every field name is validated
    pub fn order_by(mut self, sort: &Sort) -> Result<Self, ValidationError> {
        for order in sort.orders() {
            let field = ValidatedFieldName::new(&order.field)?;
            self.order_by.push((field, order.direction));
        }
        Ok(self)
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn table(&self) -> Option<&ValidatedTableName> {
        self.table.as_ref()
    }

    pub fn sort_keys(&self) -> &[(ValidatedFieldName, SortOrder)] {
        &self.order_by
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// Render the statement text
    pub fn text(&self) -> String {
        if let Some(native) = &self.native {
            return native.clone();
        }

        let table = self.table.as_ref().map(|t| t.as_str()).unwrap_or_default();
        let mut text = match self.kind {
            StatementKind::Select => format!("SELECT * FROM {}", table),
            StatementKind::Count => format!("SELECT count(*) AS count FROM {}", table),
            StatementKind::Delete => format!("DELETE FROM {}", table),
            StatementKind::Native => String::new(),
        };

        if self.kind == StatementKind::Select {
            if !self.order_by.is_empty() {
                let keys: Vec<String> = self
                    .order_by
                    .iter()
                    .map(|(field, order)| format!("{} {}", field, order.to_sql()))
                    .collect();
                text.push_str(" ORDER BY ");
                text.push_str(&keys.join(", "));
            }
            if let Some(limit) = self.limit {
                text.push_str(&format!(" LIMIT {}", limit));
            }
            if let Some(offset) = self.offset {
                text.push_str(&format!(" OFFSET {}", offset));
            }
        }

        text
    }
}
