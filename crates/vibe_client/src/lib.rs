//! Fetch, cache and invalidate board data over the HTTP API.

mod cache;
pub use cache::{QueryCache, QueryState};

mod client;
pub use client::{BoardClient, ClientEvent};

mod error;
pub use error::ClientError;

mod keys;
pub use keys::QueryKey;
