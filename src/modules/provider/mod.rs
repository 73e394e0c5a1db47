//! External metadata provider integration.
//!
//! The engine consumes the provider through the `MetadataProvider` trait;
//! `TvdbClient` is the production implementation against TVDB v4.

pub mod domain;
pub mod infrastructure;

pub use domain::client::MetadataProvider;
pub use domain::payload::{
    AliasPayload, CharacterPayload, EpisodePayload, GenrePayload, PersonPayload, SearchResult,
    SeasonPayload, SeasonTypePayload, TitlePayload,
};
pub use infrastructure::tvdb::TvdbClient;
