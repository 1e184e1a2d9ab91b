use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{ApiError, is_unique_violation},
    model::employee::Employee,
    utils::query::{
        QueryFilter, SqlValue, UpdateBuilder, execute, fetch_all_as, fetch_optional_as,
        fetch_scalar_i64, filter_value, insert,
    },
};

/// Full column set, used by the single-row endpoints.
const EMPLOYEE_COLUMNS: &str = "id, nip, nama, posisi, agama, lokasi_kerja, mulai_bergabung, \
     alamat, foto, fotocopy_identitas, created_at, updated_at";

/// List/report column set; leaves the inline base64 blobs behind.
const EMPLOYEE_LIST_COLUMNS: &str =
    "id, nip, nama, posisi, agama, lokasi_kerja, mulai_bergabung, created_at, updated_at";

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    #[schema(example = "68190007")]
    pub nip: String,
    #[schema(example = "KOK HAI")]
    pub nama: String,
    #[schema(example = "FO Leader")]
    pub posisi: String,
    #[schema(example = "Buddha")]
    pub agama: String,
    #[schema(example = "PS")]
    pub lokasi_kerja: String,
    #[schema(example = "2019-05-01", value_type = String, format = "date")]
    pub mulai_bergabung: NaiveDate,
    pub alamat: Option<String>,
    pub foto: Option<String>,
    pub fotocopy_identitas: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQuery {
    /// Page size, default 50.
    pub limit: Option<u32>,
    /// Rows to skip, default 0.
    pub offset: Option<u32>,
    /// Work-location filter; "all" or absent means no filter.
    pub lokasi_kerja: Option<String>,
    /// Position filter; "all" or absent means no filter.
    pub posisi: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub employees: Vec<Employee>,
    /// Full matching count, independent of the limit/offset window.
    #[schema(example = 17)]
    pub total: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    pub nama: Option<String>,
    pub posisi: Option<String>,
    pub agama: Option<String>,
    pub lokasi_kerja: Option<String>,
    #[schema(value_type = Option<String>, format = "date")]
    pub mulai_bergabung: Option<NaiveDate>,
    pub alamat: Option<String>,
    pub foto: Option<String>,
    pub fotocopy_identitas: Option<String>,
}

impl UpdateEmployee {
    fn into_update(self) -> UpdateBuilder {
        let mut builder = UpdateBuilder::new("employees");
        builder
            .set_if("nama", self.nama)
            .set_if("posisi", self.posisi)
            .set_if("agama", self.agama)
            .set_if("lokasi_kerja", self.lokasi_kerja)
            .set_if("mulai_bergabung", self.mulai_bergabung)
            .set_if("alamat", self.alamat)
            .set_if("foto", self.foto)
            .set_if("fotocopy_identitas", self.fotocopy_identitas);
        builder
    }
}

async fn fetch_employee(pool: &MySqlPool, id: u64) -> Result<Option<Employee>, sqlx::Error> {
    let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);
    fetch_optional_as::<Employee>(pool, &sql, vec![id.into()]).await
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/employees",
    request_body = CreateEmployee,
    responses(
        (status = 200, description = "Employee created", body = Employee),
        (status = 409, description = "NIP already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();

    let result = insert(
        pool.get_ref(),
        "INSERT INTO employees \
         (nip, nama, posisi, agama, lokasi_kerja, mulai_bergabung, alamat, foto, fotocopy_identitas) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        vec![
            payload.nip.into(),
            payload.nama.into(),
            payload.posisi.into(),
            payload.agama.into(),
            payload.lokasi_kerja.into(),
            payload.mulai_bergabung.into(),
            payload.alamat.into(),
            payload.foto.into(),
            payload.fotocopy_identitas.into(),
        ],
    )
    .await;

    let id = match result {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::AlreadyExists(
                "employee with this NIP already exists".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let employee = fetch_employee(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::Internal("failed to create employee".into()))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employee list with total count", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ApiError> {
    let limit = query.limit.unwrap_or(50);
    let offset = query.offset.unwrap_or(0);

    let mut filter = QueryFilter::new();
    if let Some(lokasi) = filter_value(query.lokasi_kerja.as_deref()) {
        filter.equals("lokasi_kerja", lokasi);
    }
    if let Some(posisi) = filter_value(query.posisi.as_deref()) {
        filter.equals("posisi", posisi);
    }
    let where_clause = filter.where_clause();

    let count_sql = format!("SELECT COUNT(*) FROM employees{}", where_clause);
    let total = fetch_scalar_i64(pool.get_ref(), &count_sql, filter.values()).await?;

    let data_sql = format!(
        "SELECT {} FROM employees{} ORDER BY mulai_bergabung DESC, nama ASC LIMIT ? OFFSET ?",
        EMPLOYEE_LIST_COLUMNS, where_clause
    );
    debug!(sql = %data_sql, limit, offset, "fetching employees");

    let mut values = filter.into_values();
    values.push(SqlValue::I64(limit as i64));
    values.push(SqlValue::I64(offset as i64));

    let employees = fetch_all_as::<Employee>(pool.get_ref(), &data_sql, values).await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse { employees, total }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let employee = fetch_employee(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("employee not found".into()))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee (partial)
#[utoipa::path(
    put,
    path = "/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Empty patch"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let update = payload.into_inner().into_update().build("id", id)?;
    debug!(sql = %update.sql, id, "updating employee");

    execute(pool.get_ref(), &update.sql, update.values).await?;

    // Fetch-after-update doubles as the existence check: MySQL reports zero
    // affected rows for a same-value write, so rows_affected cannot
    // distinguish "missing" from "unchanged".
    let employee = fetch_employee(pool.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("employee not found".into()))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee
///
/// Deletion is refused while attendance, leave or invoice rows still
/// reference the employee.
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted"),
        (status = 400, description = "Employee still has dependent records"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let dependents = fetch_scalar_i64(
        pool.get_ref(),
        "SELECT (SELECT COUNT(*) FROM attendance WHERE employee_id = ?) \
         + (SELECT COUNT(*) FROM leave_requests WHERE employee_id = ?) \
         + (SELECT COUNT(*) FROM invoices WHERE employee_id = ?)",
        vec![id.into(), id.into(), id.into()],
    )
    .await?;

    if dependents > 0 {
        return Err(ApiError::InvalidArgument(
            "employee has attendance, leave or invoice records and cannot be deleted".into(),
        ));
    }

    let affected = execute(
        pool.get_ref(),
        "DELETE FROM employees WHERE id = ?",
        vec![id.into()],
    )
    .await?;

    if affected == 0 {
        return Err(ApiError::NotFound("employee not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}

// -------------------- Bulk upload --------------------

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkEmployeeRow {
    #[serde(default)]
    pub nip: String,
    #[serde(default)]
    pub nama: String,
    #[serde(default)]
    pub posisi: String,
    #[serde(default)]
    pub agama: String,
    #[serde(default)]
    pub lokasi_kerja: String,
    /// Kept as a raw string so one malformed date stays a per-row error
    /// instead of failing deserialization of the whole batch.
    #[schema(format = "date", example = "2023-01-09")]
    pub mulai_bergabung: Option<String>,
    pub alamat: Option<String>,
    pub foto: Option<String>,
    pub fotocopy_identitas: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkUploadRequest {
    pub employees: Vec<BulkEmployeeRow>,
}

#[derive(Serialize, ToSchema)]
pub struct BulkUploadResponse {
    pub success: u32,
    pub failed: u32,
    /// One human-readable entry per failed row, tagged by NIP.
    pub errors: Vec<String>,
}

/// Returns the parsed start date when all required fields are present and
/// well-formed.
fn validate_row(row: &BulkEmployeeRow) -> Result<NaiveDate, String> {
    let nip = if row.nip.trim().is_empty() {
        "unknown"
    } else {
        row.nip.as_str()
    };

    let complete = !row.nip.trim().is_empty()
        && !row.nama.trim().is_empty()
        && !row.posisi.trim().is_empty()
        && !row.agama.trim().is_empty()
        && !row.lokasi_kerja.trim().is_empty();

    let date = row
        .mulai_bergabung
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    match (complete, date) {
        (true, Some(raw)) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| format!("NIP {}: Invalid mulaiBergabung date '{}'", nip, raw)),
        _ => Err(format!("Row with NIP {}: Missing required fields", nip)),
    }
}

/// Bulk Upload Employees
///
/// Never fails the request for a bad row: invalid or duplicate rows become
/// entries in `errors` and processing continues.
#[utoipa::path(
    post,
    path = "/employees/bulk-upload",
    request_body = BulkUploadRequest,
    responses(
        (status = 200, description = "Per-row results", body = BulkUploadResponse)
    ),
    tag = "Employee"
)]
pub async fn bulk_upload(
    pool: web::Data<MySqlPool>,
    payload: web::Json<BulkUploadRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut success: u32 = 0;
    let mut failed: u32 = 0;
    let mut errors: Vec<String> = Vec::new();

    for row in payload.into_inner().employees {
        let mulai_bergabung = match validate_row(&row) {
            Ok(date) => date,
            Err(message) => {
                errors.push(message);
                failed += 1;
                continue;
            }
        };

        let existing = match fetch_scalar_i64(
            pool.get_ref(),
            "SELECT COUNT(*) FROM employees WHERE nip = ?",
            vec![row.nip.as_str().into()],
        )
        .await
        {
            Ok(count) => count,
            Err(e) => {
                errors.push(format!("NIP {}: {}", row.nip, e));
                failed += 1;
                continue;
            }
        };

        if existing > 0 {
            errors.push(format!("NIP {}: Already exists", row.nip));
            failed += 1;
            continue;
        }

        let result = insert(
            pool.get_ref(),
            "INSERT INTO employees \
             (nip, nama, posisi, agama, lokasi_kerja, mulai_bergabung, alamat, foto, fotocopy_identitas) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            vec![
                row.nip.as_str().into(),
                row.nama.into(),
                row.posisi.into(),
                row.agama.into(),
                row.lokasi_kerja.into(),
                mulai_bergabung.into(),
                row.alamat.into(),
                row.foto.into(),
                row.fotocopy_identitas.into(),
            ],
        )
        .await;

        match result {
            Ok(_) => success += 1,
            Err(e) => {
                errors.push(format!("NIP {}: {}", row.nip, e));
                failed += 1;
            }
        }
    }

    Ok(HttpResponse::Ok().json(BulkUploadResponse {
        success,
        failed,
        errors,
    }))
}

// -------------------- Seed --------------------

/// Fixed reference dataset for demo/reset use.
const SEED_EMPLOYEES: &[(&str, &str, &str, &str, &str, &str)] = &[
    ("68190007", "KOK HAI", "FO Leader", "Buddha", "PS", "2019-05-01"),
    ("84190008", "JIMMI ANDRE MARK MANIK", "Jointer", "Kristen", "PS", "2019-05-01"),
    ("90200055", "RICI AFRIYADI", "Field Enggeneer", "Islam", "TGR", "2020-06-26"),
    ("01210104", "WAHYU ADITYA ANANDA", "Field Enggeneer", "Islam", "MDN", "2021-07-01"),
    ("82210116", "DIONESIUS HOKBIBIN BERUTU", "Field Enggeneer", "Kristen", "PS", "2021-09-20"),
    ("96210124", "KUSNADI", "Jointer", "Islam", "TGR", "2021-11-26"),
    ("00220142", "AYEIN MAULANA", "General Administration", "Islam", "MDN", "2022-06-15"),
    ("01220144", "SOPIAN HADI", "Field Enggeneer", "Islam", "BKS", "2022-06-26"),
    ("99220147", "FIRMAN RAHMADANI", "Jointer", "Islam", "BKS", "2022-07-05"),
    ("89220152", "IMAM KHOLIDIN", "FO Leader", "Islam", "TGR", "2022-09-19"),
    ("88220154", "ZAINUR ROHMAN", "FO Leader", "Islam", "BKS", "2022-10-03"),
    ("92230160", "ANGGER", "Field Enggeneer", "Islam", "PS", "2023-01-09"),
    ("85230162", "RIZA RIA WIRASARI", "General Administration", "Islam", "MDN", "2023-03-03"),
    ("02230171", "BENTENG DANDI SAPUTRA", "Field Enggeneer", "Islam", "BKS", "2023-06-05"),
    ("73240183", "IMAM WAHYUDI", "Operational General Manager", "Islam", "TGR", "2024-04-01"),
    ("05240194", "DIMAS ADE SAPUTRA", "Field Enggeneer", "Islam", "BKS", "2024-08-12"),
    ("01240195", "ANDRE IRFAN SAPUTRA", "Field Enggeneer", "Islam", "TGR", "2024-09-21"),
];

/// Seed Employees
///
/// Destructive: replaces all employee rows with the reference dataset. The
/// delete and the inserts run inside one transaction.
#[utoipa::path(
    post,
    path = "/employees/seed",
    responses(
        (status = 200, description = "Database seeded"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn seed(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let mut tx = pool.get_ref().begin().await?;

    sqlx::query("DELETE FROM employees")
        .execute(&mut *tx)
        .await?;

    for (nip, nama, posisi, agama, lokasi_kerja, mulai_bergabung) in SEED_EMPLOYEES {
        let date = NaiveDate::parse_from_str(mulai_bergabung, "%Y-%m-%d")
            .map_err(|e| ApiError::Internal(format!("invalid seed date {mulai_bergabung}: {e}")))?;

        sqlx::query(
            "INSERT INTO employees (nip, nama, posisi, agama, lokasi_kerja, mulai_bergabung) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(nip)
        .bind(nama)
        .bind(posisi)
        .bind(agama)
        .bind(lokasi_kerja)
        .bind(date)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Database seeded successfully",
        "count": SEED_EMPLOYEES.len()
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn patch_is_table_driven() {
        let patch = UpdateEmployee {
            posisi: Some("Jointer".into()),
            lokasi_kerja: Some("TGR".into()),
            ..Default::default()
        };
        let update = patch.into_update().build("id", 5).unwrap();
        assert_eq!(
            update.sql,
            "UPDATE employees SET posisi = ?, lokasi_kerja = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        );
    }

    #[test]
    fn empty_patch_is_invalid_argument() {
        let err = UpdateEmployee::default()
            .into_update()
            .build("id", 5)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn missing_required_fields_fail_validation() {
        let row = BulkEmployeeRow {
            nip: "12345678".into(),
            nama: "BUDI".into(),
            ..Default::default()
        };
        let err = validate_row(&row).unwrap_err();
        assert_eq!(err, "Row with NIP 12345678: Missing required fields");
    }

    #[test]
    fn missing_nip_is_tagged_unknown() {
        let row = BulkEmployeeRow::default();
        let err = validate_row(&row).unwrap_err();
        assert_eq!(err, "Row with NIP unknown: Missing required fields");
    }

    #[test]
    fn complete_row_passes_validation() {
        let row = BulkEmployeeRow {
            nip: "12345678".into(),
            nama: "BUDI".into(),
            posisi: "Jointer".into(),
            agama: "Islam".into(),
            lokasi_kerja: "PS".into(),
            mulai_bergabung: Some("2023-01-09".into()),
            ..Default::default()
        };
        assert_eq!(
            validate_row(&row).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 9).unwrap()
        );
    }

    #[test]
    fn malformed_date_is_a_row_error_not_a_request_error() {
        // a batch with one bad date must still deserialize as a whole
        let req: BulkUploadRequest = serde_json::from_value(serde_json::json!({
            "employees": [
                {
                    "nip": "11111111",
                    "nama": "ANDI",
                    "posisi": "Jointer",
                    "agama": "Islam",
                    "lokasiKerja": "PS",
                    "mulaiBergabung": "31/12/2024"
                },
                {
                    "nip": "22222222",
                    "nama": "BUDI",
                    "posisi": "Jointer",
                    "agama": "Islam",
                    "lokasiKerja": "PS",
                    "mulaiBergabung": "2024-12-31"
                }
            ]
        }))
        .unwrap();

        let err = validate_row(&req.employees[0]).unwrap_err();
        assert_eq!(err, "NIP 11111111: Invalid mulaiBergabung date '31/12/2024'");

        // the well-formed sibling row is unaffected
        assert!(validate_row(&req.employees[1]).is_ok());
    }

    #[test]
    fn blank_date_counts_as_missing_not_malformed() {
        let row = BulkEmployeeRow {
            nip: "33333333".into(),
            nama: "CITRA".into(),
            posisi: "Jointer".into(),
            agama: "Islam".into(),
            lokasi_kerja: "PS".into(),
            mulai_bergabung: Some("  ".into()),
            ..Default::default()
        };
        let err = validate_row(&row).unwrap_err();
        assert_eq!(err, "Row with NIP 33333333: Missing required fields");
    }

    #[test]
    fn seed_dataset_has_unique_nips_and_valid_dates() {
        let nips: HashSet<_> = SEED_EMPLOYEES.iter().map(|e| e.0).collect();
        assert_eq!(nips.len(), SEED_EMPLOYEES.len());
        assert_eq!(SEED_EMPLOYEES.len(), 17);
        for (_, _, _, _, _, date) in SEED_EMPLOYEES {
            assert!(NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
        }
    }
}
