//! GraphQL filter input types for flexible querying
//!
//! These types enable ORM-style filtering on GraphQL queries with operators like:
//! - eq, ne (equals, not equals)
//! - lt, lte, gt, gte (comparisons)
//! - contains, startsWith, endsWith (string matching)
//! - in, notIn (list membership)
//! - isNull (null checks)
//!
//! Each filter renders to SQL fragments with `?` placeholders; the query
//! builder renumbers them and binds the values in order.

use async_graphql::InputObject;

use crate::graphql::orm::SqlValue;

/// Filter for string fields
#[derive(InputObject, Default, Clone, Debug)]
#[graphql(name = "StringFilter")]
pub struct StringFilter {
    /// Equals
    pub eq: Option<String>,
    /// Not equals
    pub ne: Option<String>,
    /// Contains substring (case-insensitive)
    pub contains: Option<String>,
    /// Starts with (case-insensitive)
    pub starts_with: Option<String>,
    /// Ends with (case-insensitive)
    pub ends_with: Option<String>,
    /// In list
    #[graphql(name = "in")]
    pub in_list: Option<Vec<String>>,
    /// Not in list
    pub not_in: Option<Vec<String>>,
    /// Is null
    pub is_null: Option<bool>,
}

/// Filter for integer fields
#[derive(InputObject, Default, Clone, Debug)]
#[graphql(name = "IntFilter")]
pub struct IntFilter {
    /// Equals
    pub eq: Option<i64>,
    /// Not equals
    pub ne: Option<i64>,
    /// Less than
    pub lt: Option<i64>,
    /// Less than or equal
    pub lte: Option<i64>,
    /// Greater than
    pub gt: Option<i64>,
    /// Greater than or equal
    pub gte: Option<i64>,
    /// In list
    #[graphql(name = "in")]
    pub in_list: Option<Vec<i64>>,
    /// Not in list
    pub not_in: Option<Vec<i64>>,
    /// Is null
    pub is_null: Option<bool>,
}

// ============================================================================
// SQL Generation Utilities
// ============================================================================

/// Escape LIKE wildcards so user input matches literally (paired with `ESCAPE '\'`).
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn null_check(column: &str, is_null: Option<bool>, conditions: &mut Vec<String>) {
    match is_null {
        Some(true) => conditions.push(format!("{} IS NULL", column)),
        Some(false) => conditions.push(format!("{} IS NOT NULL", column)),
        None => {}
    }
}

impl StringFilter {
    /// Check if filter has any conditions
    pub fn is_empty(&self) -> bool {
        self.eq.is_none()
            && self.ne.is_none()
            && self.contains.is_none()
            && self.starts_with.is_none()
            && self.ends_with.is_none()
            && self.in_list.is_none()
            && self.not_in.is_none()
            && self.is_null.is_none()
    }

    /// Create an equals filter
    #[cfg(test)]
    pub fn eq(value: impl Into<String>) -> Self {
        Self {
            eq: Some(value.into()),
            ..Default::default()
        }
    }

    /// Create a contains filter (case-insensitive)
    #[cfg(test)]
    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            contains: Some(value.into()),
            ..Default::default()
        }
    }

    /// Render conditions on `column`.
    ///
    /// An empty `in` list matches nothing; an empty `notIn` list matches everything.
    pub fn to_sql_conditions(&self, column: &str) -> (Vec<String>, Vec<SqlValue>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(ref v) = self.eq {
            conditions.push(format!("{} = ?", column));
            values.push(SqlValue::String(v.clone()));
        }
        if let Some(ref v) = self.ne {
            conditions.push(format!("{} != ?", column));
            values.push(SqlValue::String(v.clone()));
        }
        if let Some(ref v) = self.contains {
            conditions.push(format!("{} LIKE ? ESCAPE '\\'", column));
            values.push(SqlValue::String(format!("%{}%", escape_like(v))));
        }
        if let Some(ref v) = self.starts_with {
            conditions.push(format!("{} LIKE ? ESCAPE '\\'", column));
            values.push(SqlValue::String(format!("{}%", escape_like(v))));
        }
        if let Some(ref v) = self.ends_with {
            conditions.push(format!("{} LIKE ? ESCAPE '\\'", column));
            values.push(SqlValue::String(format!("%{}", escape_like(v))));
        }
        if let Some(ref list) = self.in_list {
            if list.is_empty() {
                conditions.push("1 = 0".to_string());
            } else {
                conditions.push(format!("{} IN ({})", column, placeholders(list.len())));
                values.extend(list.iter().cloned().map(SqlValue::String));
            }
        }
        if let Some(ref list) = self.not_in {
            if !list.is_empty() {
                conditions.push(format!("{} NOT IN ({})", column, placeholders(list.len())));
                values.extend(list.iter().cloned().map(SqlValue::String));
            }
        }
        null_check(column, self.is_null, &mut conditions);

        (conditions, values)
    }
}

impl IntFilter {
    /// Check if filter has any conditions
    pub fn is_empty(&self) -> bool {
        self.eq.is_none()
            && self.ne.is_none()
            && self.lt.is_none()
            && self.lte.is_none()
            && self.gt.is_none()
            && self.gte.is_none()
            && self.in_list.is_none()
            && self.not_in.is_none()
            && self.is_null.is_none()
    }

    /// Create an equals filter
    #[cfg(test)]
    pub fn eq(value: i64) -> Self {
        Self {
            eq: Some(value),
            ..Default::default()
        }
    }

    /// Render conditions on `column`.
    pub fn to_sql_conditions(&self, column: &str) -> (Vec<String>, Vec<SqlValue>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        let comparisons = [
            ("=", self.eq),
            ("!=", self.ne),
            ("<", self.lt),
            ("<=", self.lte),
            (">", self.gt),
            (">=", self.gte),
        ];
        for (op, value) in comparisons {
            if let Some(v) = value {
                conditions.push(format!("{} {} ?", column, op));
                values.push(SqlValue::Int(v));
            }
        }
        if let Some(ref list) = self.in_list {
            if list.is_empty() {
                conditions.push("1 = 0".to_string());
            } else {
                conditions.push(format!("{} IN ({})", column, placeholders(list.len())));
                values.extend(list.iter().copied().map(SqlValue::Int));
            }
        }
        if let Some(ref list) = self.not_in {
            if !list.is_empty() {
                conditions.push(format!("{} NOT IN ({})", column, placeholders(list.len())));
                values.extend(list.iter().copied().map(SqlValue::Int));
            }
        }
        null_check(column, self.is_null, &mut conditions);

        (conditions, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_string_filter_sql() {
        let filter = StringFilter {
            contains: Some("50%_off".to_string()),
            in_list: Some(vec!["a".to_string(), "b".to_string()]),
            ..Default::default()
        };
        let (conditions, values) = filter.to_sql_conditions("name");
        assert_eq!(
            conditions,
            vec!["name LIKE ? ESCAPE '\\'".to_string(), "name IN (?, ?)".to_string()]
        );
        assert_eq!(
            values,
            vec![
                SqlValue::String("%50\\%\\_off%".to_string()),
                SqlValue::String("a".to_string()),
                SqlValue::String("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_int_filter_sql() {
        let filter = IntFilter {
            gte: Some(2),
            lt: Some(10),
            is_null: Some(false),
            ..Default::default()
        };
        let (conditions, values) = filter.to_sql_conditions("color_id");
        assert_eq!(
            conditions,
            vec!["color_id < ?", "color_id >= ?", "color_id IS NOT NULL"]
        );
        assert_eq!(values, vec![SqlValue::Int(10), SqlValue::Int(2)]);
    }

    #[test]
    fn test_empty_lists() {
        let none = IntFilter {
            in_list: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(none.to_sql_conditions("id").0, vec!["1 = 0"]);

        let all = StringFilter {
            not_in: Some(vec![]),
            ..Default::default()
        };
        assert!(!all.is_empty());
        assert!(all.to_sql_conditions("name").0.is_empty());
    }

    #[test]
    fn test_constructors() {
        assert!(StringFilter::default().is_empty());
        assert_eq!(StringFilter::eq("kiwi").eq.as_deref(), Some("kiwi"));
        assert_eq!(IntFilter::eq(3).eq, Some(3));
    }
}
