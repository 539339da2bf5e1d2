use super::options::FilterOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const POPULARITY_MIN: i64 = 0;
pub const POPULARITY_MAX: i64 = 100;

/// Restriction on the explicit flag of tracks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplicitChoice {
    #[default]
    All,
    ExplicitOnly,
    NonExplicitOnly,
}

impl ExplicitChoice {
    /// The value the `explicit` column must equal, if any.
    pub fn required_flag(&self) -> Option<bool> {
        match self {
            ExplicitChoice::All => None,
            ExplicitChoice::ExplicitOnly => Some(true),
            ExplicitChoice::NonExplicitOnly => Some(false),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExplicitChoice::All => "All",
            ExplicitChoice::ExplicitOnly => "Explicit only",
            ExplicitChoice::NonExplicitOnly => "Non-explicit only",
        }
    }
}

impl fmt::Display for ExplicitChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ExplicitChoice {
    type Err = String;

    /// Accepts the display labels as well as kebab/snake case identifiers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "all" => Ok(ExplicitChoice::All),
            "explicit only" | "explicit" => Ok(ExplicitChoice::ExplicitOnly),
            "non explicit only" | "non explicit" | "clean" => Ok(ExplicitChoice::NonExplicitOnly),
            _ => Err(format!(
                "Invalid explicit choice '{}'. Valid choices are: all, explicit-only, non-explicit-only",
                s
            )),
        }
    }
}

/// The user's current narrowing criteria.
///
/// Ranges are inclusive on both ends. An empty genre or album type set means
/// that dimension is not restricted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub year_range: (i64, i64),
    pub popularity_range: (i64, i64),
    pub genres: BTreeSet<String>,
    pub album_types: BTreeSet<String>,
    pub explicit: ExplicitChoice,
    /// Drops the 'Unknown' genre from the genre rankings only.
    pub exclude_unknown_genre: bool,
}

impl FilterSpec {
    /// The initial selection: every year and popularity, no set restriction.
    pub fn unrestricted(options: &FilterOptions) -> Self {
        FilterSpec {
            year_range: (options.min_year, options.max_year),
            popularity_range: (POPULARITY_MIN, POPULARITY_MAX),
            genres: BTreeSet::new(),
            album_types: BTreeSet::new(),
            explicit: ExplicitChoice::All,
            exclude_unknown_genre: true,
        }
    }
}
