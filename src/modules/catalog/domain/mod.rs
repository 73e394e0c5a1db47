pub mod entities;
pub mod repository;
pub mod value_objects;

#[cfg(test)]
pub use repository::MockCatalogRepository;
