//! Sort specifications
//!
//! This module provides ordering for statement-backed reads.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A single sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: SortOrder,
}

/// Ordered list of sort keys, first key most significant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(field: impl Into<String>, direction: SortOrder) -> Self {
        Self::unsorted().and(field, direction)
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::by(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::by(field, SortOrder::Desc)
    }

    /// Add a lower-priority sort key
    pub fn and(mut self, field: impl Into<String>, direction: SortOrder) -> Self {
        self.orders.push(Order {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }
}
