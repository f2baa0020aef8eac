pub mod api;
pub mod client;
pub mod error;
pub mod models;
pub mod retry;

pub use api::StatsApi;
pub use client::PubgClient;
pub use error::PubgError;
pub use retry::RetryPolicy;
