//! Statement building
//!
//! This module provides statements, sorting and paging for repository reads.

pub mod builder;
pub mod ordering;
pub mod pagination;

#[cfg(test)]
mod tests;

pub use builder::{Statement, StatementKind};
pub use ordering::{Order, Sort, SortOrder};
pub use pagination::{Page, PageRequest};
