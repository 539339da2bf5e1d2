//! Aggregate queries over the filtered `tracks JOIN artists` join.
//!
//! Every query takes the session connection and a [`CompiledPredicate`]
//! explicitly and returns its own record type. Zero matching rows is a valid
//! state: counts come back as zero, lists as empty and scalars as `None`.
//!
//! [`CompiledPredicate`]: crate::filter::CompiledPredicate

mod engine;
mod models;

pub use engine::{Aggregator, QUANTILES, TOP_GENRES_LIMIT};
pub use models::*;
