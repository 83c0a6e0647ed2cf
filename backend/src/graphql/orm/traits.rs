//! Core traits for the GraphQL ORM layer
//!
//! These traits are implemented by the `#[derive(GraphQLEntity)]` macro from
//! `fruits-macros`.

use sqlx::sqlite::SqliteRow;

/// Column definition for schema generation.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Column name in the database
    pub name: &'static str,
    /// SQLite column type (TEXT, INTEGER, REAL, BLOB)
    pub sql_type: &'static str,
    /// Whether the column can be NULL
    pub nullable: bool,
    /// Whether this is the primary key
    pub is_primary_key: bool,
    /// Default value expression (e.g., "datetime('now')")
    pub default: Option<&'static str>,
    /// Foreign key target (e.g., "colors(id)")
    pub references: Option<&'static str>,
    /// Foreign key delete action (e.g., "CASCADE")
    pub on_delete: Option<&'static str>,
}

impl ColumnDef {
    /// Generate the column definition SQL
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);

        if self.is_primary_key {
            sql.push_str(" PRIMARY KEY");
        }

        if !self.nullable && !self.is_primary_key {
            sql.push_str(" NOT NULL");
        }

        if let Some(default) = self.default {
            sql.push_str(&format!(" DEFAULT {}", default));
        }

        sql.push_str(&self.references_sql());

        sql
    }

    /// The ` REFERENCES ... ON DELETE ...` suffix, empty for plain columns.
    pub fn references_sql(&self) -> String {
        let Some(references) = self.references else {
            return String::new();
        };
        let mut sql = format!(" REFERENCES {}", references);
        if let Some(action) = self.on_delete {
            sql.push_str(&format!(" ON DELETE {}", action));
        }
        sql
    }
}

/// Trait for database schema generation and migration.
///
/// Implemented by `#[derive(GraphQLEntity)]` macro.
pub trait DatabaseSchema: DatabaseEntity {
    /// Get all column definitions for this entity's table
    fn columns() -> &'static [ColumnDef];

    /// Generate CREATE TABLE IF NOT EXISTS SQL
    fn create_table_sql() -> String {
        let column_defs: Vec<String> = Self::columns().iter().map(|c| c.to_sql()).collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            Self::TABLE_NAME,
            column_defs.join(",\n  ")
        )
    }

    /// CREATE INDEX statements for every foreign key column
    fn index_sql() -> Vec<String> {
        Self::columns()
            .iter()
            .filter(|c| c.references.is_some())
            .map(|c| {
                format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table} ({column})",
                    table = Self::TABLE_NAME,
                    column = c.name
                )
            })
            .collect()
    }
}

/// Metadata about a database entity (table).
///
/// Implemented by `#[derive(GraphQLEntity)]` macro.
pub trait DatabaseEntity: Sized + Send + Sync {
    /// The SQL table name (e.g., "fruits")
    const TABLE_NAME: &'static str;

    /// The GraphQL plural name (e.g., "Fruits")
    const PLURAL_NAME: &'static str;

    /// The primary key column name (e.g., "id")
    const PRIMARY_KEY: &'static str;

    /// Default sort column for list queries (e.g., "id")
    const DEFAULT_SORT: &'static str;

    /// Default sort direction
    const DEFAULT_SORT_DIR: &'static str = "ASC";

    /// List of all column names in the table
    fn column_names() -> &'static [&'static str];

    /// Value of the primary key column
    fn primary_key(&self) -> i64;

    /// Build a SELECT query for all columns
    fn select_sql() -> String {
        let columns = Self::column_names().join(", ");
        format!("SELECT {} FROM {}", columns, Self::TABLE_NAME)
    }
}

/// Trait for applying filters to a SQL query.
///
/// Implemented by the generated `*WhereInput` structs.
pub trait DatabaseFilter: Send + Sync {
    /// Return the WHERE clause fragments (with `?` placeholders) and the
    /// values to bind, in placeholder order.
    fn to_sql_conditions(&self) -> (Vec<String>, Vec<SqlValue>);

    /// Check if the filter has any conditions
    fn is_empty(&self) -> bool;
}

/// Trait for applying sort order to a SQL query.
///
/// Implemented by the generated `*OrderByInput` structs.
pub trait DatabaseOrderBy: Send + Sync {
    /// Get the ORDER BY clause fragment (e.g., "name ASC, id DESC")
    fn to_sql_order(&self) -> Option<String>;
}

/// Trait for decoding a database row into an entity.
///
/// Implemented by `#[derive(GraphQLEntity)]` macro.
pub trait FromSqlRow: Sized {
    /// Decode a SQLite row into this entity type
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error>;
}

/// Sort direction for ORDER BY clauses.
#[derive(async_graphql::Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
#[graphql(name = "SortDirection")]
pub enum OrderDirection {
    /// Ascending order (A-Z, 1-9)
    #[default]
    Asc,
    /// Descending order (Z-A, 9-1)
    Desc,
}

impl OrderDirection {
    /// Convert to SQL order string
    pub fn to_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// Represents a SQL value that can be bound to a query.
///
/// Used by filters to collect values for parameterized queries.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    Int(i64),
    Null,
}

impl SqlValue {
    /// Bind this value to a sqlx query
    pub fn bind_to_query<'q>(
        &'q self,
        query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        match self {
            SqlValue::String(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Null => query.bind(None::<String>),
        }
    }

    /// Bind this value to a sqlx scalar query
    pub fn bind_to_scalar<'q, O>(
        &'q self,
        query: sqlx::query::QueryScalar<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::QueryScalar<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
        match self {
            SqlValue::String(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Null => query.bind(None::<String>),
        }
    }
}

/// Pagination input for offset-based pagination.
#[derive(async_graphql::InputObject, Default, Clone, Debug)]
#[graphql(name = "PageInput")]
pub struct PageInput {
    /// Maximum number of items to return (default: 25, max: 100)
    pub limit: Option<i32>,

    /// Number of items to skip
    pub offset: Option<i64>,
}

impl PageInput {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(25).clamp(0, 100) as i64
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_sql() {
        let pk = ColumnDef {
            name: "id",
            sql_type: "INTEGER",
            nullable: false,
            is_primary_key: true,
            default: None,
            references: None,
            on_delete: None,
        };
        assert_eq!(pk.to_sql(), "id INTEGER PRIMARY KEY");

        let fk = ColumnDef {
            name: "color_id",
            sql_type: "INTEGER",
            nullable: true,
            is_primary_key: false,
            default: None,
            references: Some("colors(id)"),
            on_delete: Some("CASCADE"),
        };
        assert_eq!(
            fk.to_sql(),
            "color_id INTEGER REFERENCES colors(id) ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_page_input_bounds() {
        let page = PageInput::default();
        assert_eq!((page.limit(), page.offset()), (25, 0));

        let page = PageInput {
            limit: Some(500),
            offset: Some(-3),
        };
        assert_eq!((page.limit(), page.offset()), (100, 0));
    }
}
