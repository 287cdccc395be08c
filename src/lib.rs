pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod filter;
pub mod http_client;
pub mod persist;
pub mod source;
pub mod synthetic;

pub use aggregate::Dashboard;
pub use dataset::{Dataset, Match, RefereeRecord};
pub use error::DatasetShapeError;
pub use filter::{DateRange, FilterState, filter_matches};
