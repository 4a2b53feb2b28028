//! Data acquisition: the BLS client and response reshaping.

pub mod bls;
pub mod shape;

pub use bls::{BlsClient, BlsResponse, SeriesSource, api_key_from_env};
pub use shape::{LongRow, flatten, period_to_date, pivot};
