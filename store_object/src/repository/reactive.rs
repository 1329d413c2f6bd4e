use super::core::NosqlRepository;
use crate::errors::RepositoryError;
use crate::traits::{CrudRepository, NosqlEntity, ReactiveCrudRepository};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};

impl<T: NosqlEntity> ReactiveCrudRepository for NosqlRepository<T> {
    fn find_all_stream(&self) -> BoxStream<'_, Result<T, RepositoryError>> {
        stream::once(self.find_all())
            .flat_map(|result| match result {
                Ok(entities) => stream::iter(entities.into_iter().map(Ok)).boxed(),
                Err(e) => stream::once(future::ready(Err(e))).boxed(),
            })
            .boxed()
    }

    fn find_all_by_id_stream(
        &self,
        ids: Vec<T::Id>,
    ) -> BoxStream<'_, Result<T, RepositoryError>> {
        stream::iter(ids)
            .then(move |id| async move { self.find_by_id(&id).await })
            .filter_map(|result| future::ready(result.transpose()))
            .boxed()
    }

    fn save_all_stream<'a>(
        &'a self,
        entities: BoxStream<'a, T>,
    ) -> BoxStream<'a, Result<T, RepositoryError>> {
        entities.then(move |entity| self.save(entity)).boxed()
    }
}
