#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    CatalogRecord, CatalogRow, CatalogScope, InMemoryRepository, ItemRepository,
    ResultRepository, ResultRow, Storage, StorageError,
};
