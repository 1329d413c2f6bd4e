//! Non-blocking repository variant
//!
//! Multi-value operations produce streams instead of collected vectors.
//! Option resolution and query caching are the same as for
//! [`CrudRepository`].

use crate::traits::core::CrudRepository;
use crate::RepositoryError;
use futures::stream::BoxStream;

pub trait ReactiveCrudRepository: CrudRepository {
    fn find_all_stream(&self) -> BoxStream<'_, Result<Self::Model, RepositoryError>>;

    /// Found entities in key order; missing keys produce no item
    fn find_all_by_id_stream(
        &self,
        ids: Vec<Self::Id>,
    ) -> BoxStream<'_, Result<Self::Model, RepositoryError>>;

    /// Saves each entity as it arrives
    fn save_all_stream<'a>(
        &'a self,
        entities: BoxStream<'a, Self::Model>,
    ) -> BoxStream<'a, Result<Self::Model, RepositoryError>>;
}
