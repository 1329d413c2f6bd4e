//! Entity contract
//!
//! Mapped types describe where they live and how their primary key is read.
//! Rows travel to the driver as JSON objects.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

pub trait NosqlEntity:
    Clone + Send + Sync + Debug + Serialize + DeserializeOwned + 'static
{
    /// Primary key type
    type Id: Clone + Send + Sync + Debug + Serialize + 'static;

    fn table_name() -> &'static str;

    /// Key under which per-entity defaults are registered
    fn entity_name() -> &'static str {
        Self::table_name()
    }

    fn primary_key_field() -> &'static str {
        "id"
    }

    /// Primary key of this instance, `None` when not yet assigned
    fn id(&self) -> Option<Self::Id>;
}
