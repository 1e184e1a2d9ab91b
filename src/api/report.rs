use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    model::{attendance::Attendance, employee::Employee, invoice::Invoice, leave_request::LeaveRequest},
    utils::query::{QueryFilter, SqlValue, fetch_all_as, filter_value},
};

/// Shared body for the three report endpoints. The date bounds are
/// inclusive. `format` is accepted for client compatibility; the server
/// always responds with JSON.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[schema(value_type = String, format = "date", example = "2024-01-01")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date", example = "2024-12-31")]
    pub end_date: NaiveDate,
    pub employee_id: Option<u64>,
    /// "all" or absent means every location.
    pub lokasi_kerja: Option<String>,
    #[schema(example = "json")]
    pub format: Option<String>,
}

impl ReportRequest {
    /// Employee-level predicates; the date range lives in the join
    /// condition so employees without child rows keep their zero counts.
    fn employee_filter(&self) -> QueryFilter {
        let mut filter = QueryFilter::new();
        if let Some(id) = self.employee_id {
            filter.equals("e.id", id);
        }
        if let Some(lokasi) = filter_value(self.lokasi_kerja.as_deref()) {
            filter.equals("e.lokasi_kerja", lokasi);
        }
        filter
    }

    /// Join params first, then the employee predicates, in clause order.
    fn summary_values(&self) -> Vec<SqlValue> {
        let mut values: Vec<SqlValue> = vec![self.start_date.into(), self.end_date.into()];
        values.extend(self.employee_filter().into_values());
        values
    }

    fn detail_values(&self, employee_id: u64) -> Vec<SqlValue> {
        vec![
            employee_id.into(),
            self.start_date.into(),
            self.end_date.into(),
        ]
    }
}

// -------------------- Attendance --------------------

#[derive(Debug, sqlx::FromRow)]
struct AttendanceSummaryRow {
    #[sqlx(flatten)]
    employee: Employee,
    total_days: i64,
    present_days: i64,
    absent_days: i64,
    late_days: i64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub employee: Employee,
    pub total_days: i64,
    pub present_days: i64,
    pub absent_days: i64,
    pub late_days: i64,
    pub attendance_records: Vec<Attendance>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceReportResponse {
    pub reports: Vec<AttendanceReport>,
}

/// Attendance Report
#[utoipa::path(
    post,
    path = "/reports/attendance",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Per-employee attendance summary and detail", body = AttendanceReportResponse)
    ),
    tag = "Reports"
)]
pub async fn attendance_report(
    pool: web::Data<MySqlPool>,
    payload: web::Json<ReportRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = payload.into_inner();

    let summary_sql = format!(
        "SELECT e.id, e.nip, e.nama, e.posisi, e.agama, e.lokasi_kerja, e.mulai_bergabung, \
                e.created_at, e.updated_at, \
                COUNT(a.id) AS total_days, \
                COUNT(CASE WHEN a.status = 'present' THEN 1 END) AS present_days, \
                COUNT(CASE WHEN a.status = 'absent' THEN 1 END) AS absent_days, \
                COUNT(CASE WHEN a.status = 'late' THEN 1 END) AS late_days \
         FROM employees e \
         LEFT JOIN attendance a ON e.id = a.employee_id AND a.date BETWEEN ? AND ?\
         {} GROUP BY e.id ORDER BY e.nama",
        req.employee_filter().where_clause()
    );
    debug!(sql = %summary_sql, "attendance report summary");

    let summaries =
        fetch_all_as::<AttendanceSummaryRow>(pool.get_ref(), &summary_sql, req.summary_values())
            .await?;

    let mut reports = Vec::with_capacity(summaries.len());
    for row in summaries {
        let attendance_records = fetch_all_as::<Attendance>(
            pool.get_ref(),
            "SELECT id, employee_id, date, check_in, check_out, status, notes, created_at, updated_at \
             FROM attendance WHERE employee_id = ? AND date BETWEEN ? AND ? ORDER BY date DESC",
            req.detail_values(row.employee.id),
        )
        .await?;

        reports.push(AttendanceReport {
            employee: row.employee,
            total_days: row.total_days,
            present_days: row.present_days,
            absent_days: row.absent_days,
            late_days: row.late_days,
            attendance_records,
        });
    }

    Ok(HttpResponse::Ok().json(AttendanceReportResponse { reports }))
}

// -------------------- Leave --------------------

#[derive(Debug, sqlx::FromRow)]
struct LeaveSummaryRow {
    #[sqlx(flatten)]
    employee: Employee,
    total_requests: i64,
    approved_requests: i64,
    pending_requests: i64,
    rejected_requests: i64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveReport {
    pub employee: Employee,
    pub total_requests: i64,
    pub approved_requests: i64,
    pub pending_requests: i64,
    pub rejected_requests: i64,
    pub leave_records: Vec<LeaveRequest>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveReportResponse {
    pub reports: Vec<LeaveReport>,
}

/// Leave Report
#[utoipa::path(
    post,
    path = "/reports/leave",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Per-employee leave summary and detail", body = LeaveReportResponse)
    ),
    tag = "Reports"
)]
pub async fn leave_report(
    pool: web::Data<MySqlPool>,
    payload: web::Json<ReportRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = payload.into_inner();

    let summary_sql = format!(
        "SELECT e.id, e.nip, e.nama, e.posisi, e.agama, e.lokasi_kerja, e.mulai_bergabung, \
                e.created_at, e.updated_at, \
                COUNT(lr.id) AS total_requests, \
                COUNT(CASE WHEN lr.status = 'approved' THEN 1 END) AS approved_requests, \
                COUNT(CASE WHEN lr.status = 'pending' THEN 1 END) AS pending_requests, \
                COUNT(CASE WHEN lr.status = 'rejected' THEN 1 END) AS rejected_requests \
         FROM employees e \
         LEFT JOIN leave_requests lr ON e.id = lr.employee_id \
             AND lr.start_date >= ? AND lr.end_date <= ?\
         {} GROUP BY e.id ORDER BY e.nama",
        req.employee_filter().where_clause()
    );
    debug!(sql = %summary_sql, "leave report summary");

    let summaries =
        fetch_all_as::<LeaveSummaryRow>(pool.get_ref(), &summary_sql, req.summary_values()).await?;

    let mut reports = Vec::with_capacity(summaries.len());
    for row in summaries {
        let leave_records = fetch_all_as::<LeaveRequest>(
            pool.get_ref(),
            "SELECT id, employee_id, leave_type, start_date, end_date, days_requested, reason, \
                    status, approved_by, approved_at, created_at, updated_at \
             FROM leave_requests \
             WHERE employee_id = ? AND start_date >= ? AND end_date <= ? \
             ORDER BY start_date DESC",
            req.detail_values(row.employee.id),
        )
        .await?;

        reports.push(LeaveReport {
            employee: row.employee,
            total_requests: row.total_requests,
            approved_requests: row.approved_requests,
            pending_requests: row.pending_requests,
            rejected_requests: row.rejected_requests,
            leave_records,
        });
    }

    Ok(HttpResponse::Ok().json(LeaveReportResponse { reports }))
}

// -------------------- Invoice --------------------

#[derive(Debug, sqlx::FromRow)]
struct InvoiceSummaryRow {
    #[sqlx(flatten)]
    employee: Employee,
    total_invoices: i64,
    total_amount: Decimal,
    paid_amount: Decimal,
    pending_amount: Decimal,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceReport {
    pub employee: Employee,
    pub total_invoices: i64,
    #[schema(value_type = String, example = "350.75")]
    pub total_amount: Decimal,
    #[schema(value_type = String, example = "300.75")]
    pub paid_amount: Decimal,
    #[schema(value_type = String, example = "50.00")]
    pub pending_amount: Decimal,
    pub invoice_records: Vec<Invoice>,
}

#[derive(Serialize, ToSchema)]
pub struct InvoiceReportResponse {
    pub reports: Vec<InvoiceReport>,
}

/// Invoice Report
///
/// Amount aggregates stay in DECIMAL end to end; no float arithmetic.
#[utoipa::path(
    post,
    path = "/reports/invoice",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Per-employee invoice summary and detail", body = InvoiceReportResponse)
    ),
    tag = "Reports"
)]
pub async fn invoice_report(
    pool: web::Data<MySqlPool>,
    payload: web::Json<ReportRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = payload.into_inner();

    let summary_sql = format!(
        "SELECT e.id, e.nip, e.nama, e.posisi, e.agama, e.lokasi_kerja, e.mulai_bergabung, \
                e.created_at, e.updated_at, \
                COUNT(i.id) AS total_invoices, \
                CAST(COALESCE(SUM(i.amount), 0) AS DECIMAL(14,2)) AS total_amount, \
                CAST(COALESCE(SUM(CASE WHEN i.status = 'paid' THEN i.amount ELSE 0 END), 0) AS DECIMAL(14,2)) AS paid_amount, \
                CAST(COALESCE(SUM(CASE WHEN i.status = 'pending' THEN i.amount ELSE 0 END), 0) AS DECIMAL(14,2)) AS pending_amount \
         FROM employees e \
         LEFT JOIN invoices i ON e.id = i.employee_id \
             AND i.issue_date >= ? AND i.issue_date <= ?\
         {} GROUP BY e.id ORDER BY e.nama",
        req.employee_filter().where_clause()
    );
    debug!(sql = %summary_sql, "invoice report summary");

    let summaries =
        fetch_all_as::<InvoiceSummaryRow>(pool.get_ref(), &summary_sql, req.summary_values())
            .await?;

    let mut reports = Vec::with_capacity(summaries.len());
    for row in summaries {
        let invoice_records = fetch_all_as::<Invoice>(
            pool.get_ref(),
            "SELECT id, invoice_number, employee_id, amount, description, issue_date, due_date, \
                    status, paid_at, created_at, updated_at \
             FROM invoices \
             WHERE employee_id = ? AND issue_date >= ? AND issue_date <= ? \
             ORDER BY issue_date DESC",
            req.detail_values(row.employee.id),
        )
        .await?;

        reports.push(InvoiceReport {
            employee: row.employee,
            total_invoices: row.total_invoices,
            total_amount: row.total_amount,
            paid_amount: row.paid_amount,
            pending_amount: row.pending_amount,
            invoice_records,
        });
    }

    Ok(HttpResponse::Ok().json(InvoiceReportResponse { reports }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(employee_id: Option<u64>, lokasi_kerja: Option<&str>) -> ReportRequest {
        ReportRequest {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            employee_id,
            lokasi_kerja: lokasi_kerja.map(str::to_owned),
            format: None,
        }
    }

    #[test]
    fn no_filters_means_no_where_clause() {
        let req = request(None, None);
        assert_eq!(req.employee_filter().where_clause(), "");
        assert_eq!(req.summary_values().len(), 2);
    }

    #[test]
    fn all_sentinel_is_ignored() {
        let req = request(None, Some("all"));
        assert_eq!(req.employee_filter().where_clause(), "");
    }

    #[test]
    fn both_filters_land_after_the_join_params() {
        let req = request(Some(7), Some("PS"));
        assert_eq!(
            req.employee_filter().where_clause(),
            " WHERE e.id = ? AND e.lokasi_kerja = ?"
        );

        let values = req.summary_values();
        assert_eq!(values.len(), 4);
        assert_eq!(values[2], SqlValue::U64(7));
        assert_eq!(values[3], SqlValue::Text("PS".into()));
    }

    #[test]
    fn detail_values_scope_to_one_employee_and_the_range() {
        let req = request(None, None);
        let values = req.detail_values(42);
        assert_eq!(values[0], SqlValue::U64(42));
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn decimal_sums_carry_no_rounding_drift() {
        let amounts = [dec!(100.50), dec!(200.25), dec!(50.00)];
        let total: Decimal = amounts.iter().copied().sum();
        assert_eq!(total, dec!(350.75));
        assert_eq!(total.to_string(), "350.75");
    }

    #[test]
    fn report_request_accepts_camel_case_body() {
        let req: ReportRequest = serde_json::from_value(serde_json::json!({
            "startDate": "2024-01-01",
            "endDate": "2024-12-31",
            "lokasiKerja": "PS",
            "format": "excel"
        }))
        .unwrap();
        assert_eq!(req.lokasi_kerja.as_deref(), Some("PS"));
        assert_eq!(req.employee_id, None);
        // format is accepted but has no server-side effect
        assert_eq!(req.format.as_deref(), Some("excel"));
    }
}
