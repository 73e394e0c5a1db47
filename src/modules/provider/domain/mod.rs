pub mod client;
pub mod payload;

pub use client::MetadataProvider;
#[cfg(test)]
pub use client::MockMetadataProvider;
