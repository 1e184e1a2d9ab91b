use crate::api::employee::{
    BulkEmployeeRow, BulkUploadRequest, BulkUploadResponse, CreateEmployee, EmployeeListResponse,
    EmployeeQuery, UpdateEmployee,
};
use crate::api::report::{
    AttendanceReport, AttendanceReportResponse, InvoiceReport, InvoiceReportResponse, LeaveReport,
    LeaveReportResponse, ReportRequest,
};
use crate::api::settings::{SettingListResponse, UpdateSetting};
use crate::api::users::{CreateUser, UpdateUser, UserListResponse};
use crate::model::attendance::Attendance;
use crate::model::employee::Employee;
use crate::model::invoice::Invoice;
use crate::model::leave_request::LeaveRequest;
use crate::model::role::UserRole;
use crate::model::setting::Setting;
use crate::model::user::User;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Karyawan API",
        version = "1.0.0",
        description = r#"
## Employee Records Service

Backend for an employee records web application.

### Features
- **Employee Management** — create, list, view, update and delete employee
  profiles, plus bulk upload with per-row error reporting and a demo seed.
- **Administration** — user accounts and key/value settings.
- **Reports** — attendance, leave and invoice reports per employee over a
  date range.

### Response format
JSON only; report `format` values other than JSON are rendered client-side.

---
Built with **Rust**, **Actix Web** and **SQLx**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::bulk_upload,
        crate::api::employee::seed,

        crate::api::users::list_users,
        crate::api::users::create_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,

        crate::api::settings::list_settings,
        crate::api::settings::get_setting,
        crate::api::settings::update_setting,

        crate::api::report::attendance_report,
        crate::api::report::leave_report,
        crate::api::report::invoice_report
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            UpdateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            BulkEmployeeRow,
            BulkUploadRequest,
            BulkUploadResponse,
            User,
            UserRole,
            CreateUser,
            UpdateUser,
            UserListResponse,
            Setting,
            UpdateSetting,
            SettingListResponse,
            Attendance,
            LeaveRequest,
            Invoice,
            ReportRequest,
            AttendanceReport,
            AttendanceReportResponse,
            LeaveReport,
            LeaveReportResponse,
            InvoiceReport,
            InvoiceReportResponse
        )
    ),
    tags(
        (name = "Employee", description = "Employee record management APIs"),
        (name = "Admin", description = "User and setting administration APIs"),
        (name = "Reports", description = "Attendance, leave and invoice reports"),
    )
)]
pub struct ApiDoc;
