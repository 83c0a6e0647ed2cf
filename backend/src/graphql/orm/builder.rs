//! SQL Query Builder for GraphQL ORM
//!
//! Provides a type-safe query builder that works with `DatabaseEntity` types
//! and uses parameterized queries via sqlx to prevent SQL injection.

use sqlx::SqlitePool;

use super::traits::{
    DatabaseEntity, DatabaseFilter, DatabaseOrderBy, FromSqlRow, PageInput, SqlValue,
};

/// A query builder for database entities.
///
/// Builds parameterized SQL queries for SELECT operations with
/// filtering, sorting, and pagination support.
pub struct EntityQuery<E: DatabaseEntity> {
    _phantom: std::marker::PhantomData<E>,
    where_clauses: Vec<String>,
    values: Vec<SqlValue>,
    order_clauses: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    param_counter: usize,
}

impl<E: DatabaseEntity + FromSqlRow> EntityQuery<E> {
    /// Create a new query builder for the entity type.
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
            where_clauses: Vec::new(),
            values: Vec::new(),
            order_clauses: Vec::new(),
            limit: None,
            offset: None,
            param_counter: 0,
        }
    }

    /// Add a filter to the query.
    pub fn filter<F: DatabaseFilter>(mut self, filter: &F) -> Self {
        if !filter.is_empty() {
            let (conditions, values) = filter.to_sql_conditions();
            for condition in conditions {
                let rewritten = self.rewrite_params(&condition);
                self.where_clauses.push(rewritten);
            }
            self.values.extend(values);
        }
        self
    }

    /// Add a raw WHERE clause condition with a single `?` placeholder.
    pub fn where_clause(mut self, condition: &str, value: SqlValue) -> Self {
        let rewritten = self.rewrite_params(condition);
        self.where_clauses.push(rewritten);
        self.values.push(value);
        self
    }

    /// Restrict `column` to the given integer keys.
    ///
    /// An empty key list matches nothing.
    pub fn where_in(mut self, column: &str, keys: &[i64]) -> Self {
        if keys.is_empty() {
            self.where_clauses.push("1 = 0".to_string());
            return self;
        }
        let placeholders = vec!["?"; keys.len()].join(", ");
        let rewritten = self.rewrite_params(&format!("{} IN ({})", column, placeholders));
        self.where_clauses.push(rewritten);
        self.values.extend(keys.iter().map(|k| SqlValue::Int(*k)));
        self
    }

    /// Add sorting to the query. Repeated calls append sort keys.
    pub fn order_by<O: DatabaseOrderBy>(mut self, order: &O) -> Self {
        if let Some(order_sql) = order.to_sql_order() {
            self.order_clauses.push(order_sql);
        }
        self
    }

    /// Add default sorting if no order is specified.
    pub fn default_order(mut self) -> Self {
        if self.order_clauses.is_empty() {
            self.order_clauses
                .push(format!("{} {}", E::DEFAULT_SORT, E::DEFAULT_SORT_DIR));
        }
        self
    }

    /// Apply offset-based pagination.
    pub fn paginate(mut self, page: &PageInput) -> Self {
        self.limit = Some(page.limit());
        self.offset = Some(page.offset());
        self
    }

    /// Set limit directly.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Rewrite each bare `?` to the next sequential `?N` placeholder.
    fn rewrite_params(&mut self, condition: &str) -> String {
        let mut result = String::with_capacity(condition.len() + 4);
        let mut chars = condition.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '?' && !chars.peek().is_some_and(|next| next.is_ascii_digit()) {
                self.param_counter += 1;
                result.push_str(&format!("?{}", self.param_counter));
            } else {
                result.push(c);
            }
        }
        result
    }

    fn where_sql(&self) -> String {
        if self.where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.where_clauses.join(" AND "))
        }
    }

    /// Build the SQL query string.
    pub fn build_sql(&self) -> String {
        let mut sql = E::select_sql();
        sql.push_str(&self.where_sql());

        if !self.order_clauses.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_clauses.join(", "));
        }

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) if offset > 0 => {
                sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));
            }
            (Some(limit), _) => sql.push_str(&format!(" LIMIT {}", limit)),
            _ => {}
        }

        sql
    }

    /// Build a COUNT query string.
    pub fn build_count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM {}{}", E::TABLE_NAME, self.where_sql())
    }

    /// Build a DELETE query string and bind values for bulk delete by filter.
    /// Returns `(sql, values)` so the caller can run it with `execute_with_binds`.
    pub fn build_delete_sql(&self) -> (String, Vec<SqlValue>) {
        (
            format!("DELETE FROM {}{}", E::TABLE_NAME, self.where_sql()),
            self.values.clone(),
        )
    }

    /// Execute the query and return all matching entities.
    pub async fn fetch_all(self, pool: &SqlitePool) -> Result<Vec<E>, sqlx::Error> {
        let sql = self.build_sql();
        tracing::debug!(sql = %sql, "Executing entity query");

        let mut query = sqlx::query(&sql);
        for value in &self.values {
            query = value.bind_to_query(query);
        }

        let rows = query.fetch_all(pool).await?;
        rows.iter().map(E::from_row).collect()
    }

    /// Execute the query and return a single entity.
    pub async fn fetch_one(self, pool: &SqlitePool) -> Result<Option<E>, sqlx::Error> {
        let single = self.limit(1);
        let sql = single.build_sql();
        tracing::debug!(sql = %sql, "Executing entity query (one)");

        let mut query = sqlx::query(&sql);
        for value in &single.values {
            query = value.bind_to_query(query);
        }

        match query.fetch_optional(pool).await? {
            Some(row) => Ok(Some(E::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Execute a COUNT query.
    pub async fn count(&self, pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let sql = self.build_count_sql();
        tracing::debug!(sql = %sql, "Executing count query");

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &self.values {
            query = value.bind_to_scalar(query);
        }

        query.fetch_one(pool).await
    }
}

impl<E: DatabaseEntity + FromSqlRow> Default for EntityQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute an INSERT/UPDATE/DELETE query with bound values.
pub async fn execute_with_binds(
    sql: &str,
    values: &[SqlValue],
    pool: &SqlitePool,
) -> Result<sqlx::sqlite::SqliteQueryResult, sqlx::Error> {
    tracing::debug!(sql = %sql, "Executing statement");
    let mut query = sqlx::query(sql);
    for value in values {
        query = value.bind_to_query(query);
    }
    query.execute(pool).await
}
