use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// Invoice row; read-only from the API surface. `amount` is a DECIMAL(12,2)
/// column and serializes as a decimal string so monetary values never pass
/// through a float.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: u64,

    #[schema(example = "INV-2024-001")]
    pub invoice_number: String,

    pub employee_id: u64,

    #[schema(value_type = String, example = "350.75")]
    pub amount: Decimal,

    pub description: Option<String>,

    #[schema(value_type = String, format = "date")]
    pub issue_date: NaiveDate,

    #[schema(value_type = String, format = "date")]
    pub due_date: NaiveDate,

    /// pending / paid
    #[schema(example = "pending")]
    pub status: String,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub paid_at: Option<DateTime<Utc>>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}
