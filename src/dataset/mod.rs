mod models;
mod schema;
mod seed;
mod store;

#[cfg(test)]
pub(crate) mod fixtures;

pub use models::*;
pub use schema::{ARTISTS_TABLE, DATASET_TABLES, TRACKS_TABLE};
pub use seed::write_dataset;
pub use store::{DatasetCounts, DatasetError, DatasetSession, DatasetStore};
