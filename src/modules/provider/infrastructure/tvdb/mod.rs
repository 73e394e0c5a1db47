mod client;

pub use client::TvdbClient;
