//! Upstream provider adapters.
//!
//! Both adapters switch to deterministic synthetic data when built on a mock
//! transport (see [`crate::HttpClient::is_mock`]).

mod fred;
mod yahoo;

pub use fred::{FredAdapter, FRED_API_KEY_ENV};
pub use yahoo::YahooAdapter;
