use rusqlite::types::ToSqlOutput;
use rusqlite::ToSql;
use serde::Serialize;

/// A positional value bound to one `?` placeholder of a predicate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterParam {
    Text(String),
    Integer(i64),
}

impl ToSql for FilterParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FilterParam::Text(value) => value.to_sql(),
            FilterParam::Integer(value) => value.to_sql(),
        }
    }
}

/// A conjunctive WHERE clause over the `tracks t JOIN artists a` join, plus
/// the parameters for its placeholders in order.
///
/// `where_sql` is either empty or starts with `WHERE `. Every query built from
/// a predicate splices it after the join and binds `params` positionally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompiledPredicate {
    pub where_sql: String,
    pub params: Vec<FilterParam>,
}

impl CompiledPredicate {
    /// A predicate matching every row.
    pub fn unrestricted() -> Self {
        CompiledPredicate {
            where_sql: String::new(),
            params: Vec::new(),
        }
    }

    pub fn from_clauses(clauses: Vec<String>, params: Vec<FilterParam>) -> Self {
        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        CompiledPredicate { where_sql, params }
    }

    pub fn is_empty(&self) -> bool {
        self.where_sql.is_empty()
    }

    pub fn placeholder_count(&self) -> usize {
        self.where_sql.matches('?').count()
    }

    /// The WHERE clause with additional conditions appended.
    ///
    /// The extra conditions must not contain placeholders, so `params` still
    /// lines up with the result.
    pub fn with_conditions(&self, conditions: &[&str]) -> String {
        if conditions.is_empty() {
            return self.where_sql.clone();
        }
        let extra = conditions.join(" AND ");
        if self.is_empty() {
            format!("WHERE {}", extra)
        } else {
            format!("{} AND {}", self.where_sql, extra)
        }
    }

    pub fn sql_params(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p as &dyn ToSql).collect()
    }
}
