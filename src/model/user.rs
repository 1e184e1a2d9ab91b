use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Administrative user account. The password hash never leaves the store
/// through this shape.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "admin")]
    pub username: String,

    #[schema(example = "admin@company.com")]
    pub email: String,

    #[schema(example = "admin")]
    pub role: String,

    /// Weak reference to an employee profile, if the account belongs to one.
    pub employee_id: Option<u64>,

    pub is_active: bool,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub last_login: Option<DateTime<Utc>>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}
