//! Cached catalog of titles, people and their children, plus the
//! read-through resolver that front-ends it.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::resolver::CatalogService;
pub use domain::entities::{
    Alias, Credit, CreditWithPerson, CreditWithTitle, Episode, Genre, MovieDetail, Person,
    PersonDetails, Season, SeriesDetail, Title, TitleDetails,
};
pub use domain::repository::CatalogRepository;
pub use domain::value_objects::{AliasEntityKind, AliasOwner, RoleType};
pub use infrastructure::repository::CatalogRepositoryImpl;
