//! User filter selection and its compilation into a SQL predicate.

mod compiler;
mod options;
mod predicate;
mod spec;

pub use compiler::compile;
pub use options::{FilterOptions, DEFAULT_MAX_YEAR, DEFAULT_MIN_YEAR};
pub use predicate::{CompiledPredicate, FilterParam};
pub use spec::{ExplicitChoice, FilterSpec, POPULARITY_MAX, POPULARITY_MIN};
