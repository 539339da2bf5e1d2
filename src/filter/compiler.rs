use super::predicate::{CompiledPredicate, FilterParam};
use super::spec::FilterSpec;

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

/// Compiles a [`FilterSpec`] into a predicate over `tracks t JOIN artists a`.
///
/// Clauses are appended in a fixed order (genres, album types, popularity,
/// release year, explicit) and parameters follow the same order. Popularity
/// and year bounds are always present; because `BETWEEN` never matches NULL,
/// tracks without a release year are excluded by every compiled predicate.
pub fn compile(spec: &FilterSpec) -> CompiledPredicate {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if !spec.genres.is_empty() {
        clauses.push(format!(
            "a.primary_genre IN ({})",
            placeholders(spec.genres.len())
        ));
        params.extend(spec.genres.iter().cloned().map(FilterParam::Text));
    }

    if !spec.album_types.is_empty() {
        clauses.push(format!(
            "t.album_type IN ({})",
            placeholders(spec.album_types.len())
        ));
        params.extend(spec.album_types.iter().cloned().map(FilterParam::Text));
    }

    let (pop_min, pop_max) = spec.popularity_range;
    clauses.push("t.track_popularity BETWEEN ? AND ?".to_string());
    params.push(FilterParam::Integer(pop_min));
    params.push(FilterParam::Integer(pop_max));

    let (year_min, year_max) = spec.year_range;
    clauses.push("t.release_year BETWEEN ? AND ?".to_string());
    params.push(FilterParam::Integer(year_min));
    params.push(FilterParam::Integer(year_max));

    if let Some(flag) = spec.explicit.required_flag() {
        clauses.push("t.explicit = ?".to_string());
        params.push(FilterParam::Integer(flag as i64));
    }

    CompiledPredicate::from_clauses(clauses, params)
}
