use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlRow;

use crate::error::ApiError;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    I64(i64),
    U64(u64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Decimal(Decimal),
    Null,
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_owned())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::U64(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::DateTime(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

/// Binds a list of [`SqlValue`]s onto any sqlx query type in order. MySQL
/// uses positional `?` placeholders, so the order of the list is the only
/// bookkeeping there is.
macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        let mut q = $query;
        for value in $values {
            q = match value {
                SqlValue::Text(v) => q.bind(v),
                SqlValue::I64(v) => q.bind(v),
                SqlValue::U64(v) => q.bind(v),
                SqlValue::Bool(v) => q.bind(v),
                SqlValue::Date(v) => q.bind(v),
                SqlValue::DateTime(v) => q.bind(v),
                SqlValue::Decimal(v) => q.bind(v),
                SqlValue::Null => q.bind(None::<String>),
            };
        }
        q
    }};
}

/// ===============================
/// Dynamic UPDATE builder
/// ===============================
///
/// Collects `column = ?` assignments for the fields actually present in a
/// patch request. `updated_at` is always refreshed.
#[derive(Debug)]
pub struct UpdateBuilder {
    table: &'static str,
    assignments: Vec<(&'static str, SqlValue)>,
}

#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
        }
    }

    pub fn set(&mut self, column: &'static str, value: impl Into<SqlValue>) -> &mut Self {
        self.assignments.push((column, value.into()));
        self
    }

    /// Adds the assignment only when the patch carries the field.
    pub fn set_if(&mut self, column: &'static str, value: Option<impl Into<SqlValue>>) -> &mut Self {
        if let Some(value) = value {
            self.set(column, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn build(self, id_column: &str, id: u64) -> Result<SqlUpdate, ApiError> {
        if self.assignments.is_empty() {
            return Err(ApiError::InvalidArgument("no fields to update".into()));
        }

        let set_clause = self
            .assignments
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "UPDATE {} SET {}, updated_at = CURRENT_TIMESTAMP WHERE {} = ?",
            self.table, set_clause, id_column
        );

        let mut values: Vec<SqlValue> = self.assignments.into_iter().map(|(_, v)| v).collect();
        values.push(SqlValue::U64(id));

        Ok(SqlUpdate { sql, values })
    }
}

/// ===============================
/// Dynamic WHERE builder
/// ===============================
#[derive(Debug, Default)]
pub struct QueryFilter {
    clauses: Vec<String>,
    values: Vec<SqlValue>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.clauses.push(format!("{} = ?", column));
        self.values.push(value.into());
        self
    }

    /// Empty string when no predicates were added, otherwise a leading
    /// ` WHERE a = ? AND b = ?` fragment.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn values(&self) -> Vec<SqlValue> {
        self.values.clone()
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// Treats the `"all"` sentinel (and blank strings) as "no filter".
pub fn filter_value(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != "all")
}

/// ===============================
/// Execution helpers
/// ===============================
pub async fn execute(
    pool: &MySqlPool,
    sql: &str,
    values: Vec<SqlValue>,
) -> Result<u64, sqlx::Error> {
    let query = bind_values!(sqlx::query(sql), values);
    Ok(query.execute(pool).await?.rows_affected())
}

/// Runs an INSERT and returns the generated id.
pub async fn insert(
    pool: &MySqlPool,
    sql: &str,
    values: Vec<SqlValue>,
) -> Result<u64, sqlx::Error> {
    let query = bind_values!(sqlx::query(sql), values);
    Ok(query.execute(pool).await?.last_insert_id())
}

pub async fn fetch_all_as<T>(
    pool: &MySqlPool,
    sql: &str,
    values: Vec<SqlValue>,
) -> Result<Vec<T>, sqlx::Error>
where
    T: for<'r> sqlx::FromRow<'r, MySqlRow> + Send + Unpin,
{
    let query = bind_values!(sqlx::query_as::<_, T>(sql), values);
    query.fetch_all(pool).await
}

pub async fn fetch_optional_as<T>(
    pool: &MySqlPool,
    sql: &str,
    values: Vec<SqlValue>,
) -> Result<Option<T>, sqlx::Error>
where
    T: for<'r> sqlx::FromRow<'r, MySqlRow> + Send + Unpin,
{
    let query = bind_values!(sqlx::query_as::<_, T>(sql), values);
    query.fetch_optional(pool).await
}

pub async fn fetch_scalar_i64(
    pool: &MySqlPool,
    sql: &str,
    values: Vec<SqlValue>,
) -> Result<i64, sqlx::Error> {
    let query = bind_values!(sqlx::query_scalar::<_, i64>(sql), values);
    query.fetch_one(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_builder_rejects_empty_patch() {
        let builder = UpdateBuilder::new("employees");
        let err = builder.build("id", 7).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn update_builder_appends_updated_at_and_id() {
        let mut builder = UpdateBuilder::new("employees");
        builder.set("nama", "BUDI").set("posisi", "Jointer");
        let update = builder.build("id", 42).unwrap();

        assert_eq!(
            update.sql,
            "UPDATE employees SET nama = ?, posisi = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        );
        assert_eq!(
            update.values,
            vec![
                SqlValue::Text("BUDI".into()),
                SqlValue::Text("Jointer".into()),
                SqlValue::U64(42),
            ]
        );
    }

    #[test]
    fn set_if_skips_absent_fields() {
        let mut builder = UpdateBuilder::new("users");
        builder
            .set_if("username", None::<String>)
            .set_if("email", Some("a@b.c"))
            .set_if("is_active", Some(true));
        let update = builder.build("id", 1).unwrap();

        assert_eq!(
            update.sql,
            "UPDATE users SET email = ?, is_active = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        );
        assert_eq!(update.values.len(), 3);
    }

    #[test]
    fn placeholder_count_matches_value_count() {
        let mut builder = UpdateBuilder::new("employees");
        builder.set("nama", "A").set("agama", "Islam").set("alamat", SqlValue::Null);
        let update = builder.build("id", 9).unwrap();
        let placeholders = update.sql.matches('?').count();
        assert_eq!(placeholders, update.values.len());
    }

    #[test]
    fn empty_filter_yields_no_where_clause() {
        let filter = QueryFilter::new();
        assert_eq!(filter.where_clause(), "");
        assert!(filter.values().is_empty());
    }

    #[test]
    fn filter_joins_predicates_with_and() {
        let mut filter = QueryFilter::new();
        filter.equals("lokasi_kerja", "PS").equals("posisi", "Jointer");
        assert_eq!(filter.where_clause(), " WHERE lokasi_kerja = ? AND posisi = ?");
        assert_eq!(
            filter.into_values(),
            vec![SqlValue::Text("PS".into()), SqlValue::Text("Jointer".into())]
        );
    }

    #[test]
    fn all_sentinel_means_no_filter() {
        assert_eq!(filter_value(Some("all")), None);
        assert_eq!(filter_value(Some("")), None);
        assert_eq!(filter_value(None), None);
        assert_eq!(filter_value(Some("PS")), Some("PS"));
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(SqlValue::from(None::<u64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(3_u64)), SqlValue::U64(3));
    }
}
