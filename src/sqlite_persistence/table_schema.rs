use anyhow::Result;
use rusqlite::{params, Connection};

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // Allow unused_mut because the variable is only mutated when optional
            // field assignments are passed to the macro (e.g., `is_primary_key = true`)
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub foreign_key: Option<&'static ForeignKey>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indices: &'static [(&'static str, &'static str)],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut create_sql = format!("CREATE TABLE {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(&format!("{} {}", column.name, column.sql_type.as_sql()));
            if column.is_primary_key {
                create_sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
            if let Some(foreign_key) = column.foreign_key {
                create_sql.push_str(&format!(
                    " REFERENCES {}({})",
                    foreign_key.foreign_table, foreign_key.foreign_column
                ));
            }
        }
        create_sql.push_str(");");
        conn.execute(&create_sql, params![])?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                params![],
            )?;
        }
        Ok(())
    }

    /// Returns true if the table exists in the connected database.
    pub fn exists(&self, conn: &Connection) -> rusqlite::Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            params![self.name],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }

    /// Lists the declared columns that the actual table does not have.
    ///
    /// Datasets are produced by external tooling, so extra columns and
    /// declared types are tolerated; only absent columns are reported.
    pub fn missing_columns(&self, conn: &Connection) -> rusqlite::Result<Vec<&'static str>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual_columns: Vec<String> = stmt
            .query_map(params![], |row| row.get::<usize, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(self
            .columns
            .iter()
            .map(|c| c.name)
            .filter(|name| !actual_columns.iter().any(|a| a.eq_ignore_ascii_case(name)))
            .collect())
    }

    /// Counts NULLs in each column declared `non_null`, listing only the
    /// columns that have any.
    pub fn null_counts(&self, conn: &Connection) -> rusqlite::Result<Vec<(&'static str, u64)>> {
        let mut counts = Vec::new();
        for column in self.columns.iter().filter(|c| c.non_null) {
            let nulls: i64 = conn.query_row(
                &format!(
                    "SELECT COUNT(*) FROM {} WHERE {} IS NULL",
                    self.name, column.name
                ),
                params![],
                |r| r.get(0),
            )?;
            if nulls > 0 {
                counts.push((column.name, nulls as u64));
            }
        }
        Ok(counts)
    }
}
