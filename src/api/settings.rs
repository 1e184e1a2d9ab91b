use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    model::setting::Setting,
    utils::query::{execute, fetch_all_as, fetch_optional_as, insert},
};

// `key` is a reserved word in MySQL, hence the backticks everywhere.
const SETTING_COLUMNS: &str = "id, `key`, value, description, created_at, updated_at";

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSetting {
    pub value: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SettingListResponse {
    pub settings: Vec<Setting>,
}

async fn fetch_setting(pool: &MySqlPool, key: &str) -> Result<Option<Setting>, sqlx::Error> {
    let sql = format!("SELECT {} FROM settings WHERE `key` = ?", SETTING_COLUMNS);
    fetch_optional_as::<Setting>(pool, &sql, vec![key.into()]).await
}

/// List Settings
#[utoipa::path(
    get,
    path = "/admin/settings",
    responses(
        (status = 200, description = "All settings ordered by key", body = SettingListResponse)
    ),
    tag = "Admin"
)]
pub async fn list_settings(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let sql = format!("SELECT {} FROM settings ORDER BY `key`", SETTING_COLUMNS);
    let settings = fetch_all_as::<Setting>(pool.get_ref(), &sql, Vec::new()).await?;

    Ok(HttpResponse::Ok().json(SettingListResponse { settings }))
}

/// Get Setting by key
#[utoipa::path(
    get,
    path = "/admin/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Setting found", body = Setting),
        (status = 404, description = "Setting not found")
    ),
    tag = "Admin"
)]
pub async fn get_setting(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let key = path.into_inner();

    let setting = fetch_setting(pool.get_ref(), &key)
        .await?
        .ok_or_else(|| ApiError::NotFound("setting not found".into()))?;

    Ok(HttpResponse::Ok().json(setting))
}

/// Update Setting (upsert)
///
/// Updating a key that does not exist creates it.
#[utoipa::path(
    put,
    path = "/admin/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    request_body = UpdateSetting,
    responses(
        (status = 200, description = "Resulting setting row", body = Setting)
    ),
    tag = "Admin"
)]
pub async fn update_setting(
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<UpdateSetting>,
) -> Result<HttpResponse, ApiError> {
    let key = path.into_inner();
    let value = payload.into_inner().value;

    let affected = execute(
        pool.get_ref(),
        "UPDATE settings SET value = ?, updated_at = CURRENT_TIMESTAMP WHERE `key` = ?",
        vec![value.clone().into(), key.as_str().into()],
    )
    .await?;

    if affected == 0 {
        // Either the key is new or the UPDATE was a same-value write (MySQL
        // reports those as zero affected rows); ON DUPLICATE KEY covers both.
        insert(
            pool.get_ref(),
            "INSERT INTO settings (`key`, value) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE value = VALUES(value), updated_at = CURRENT_TIMESTAMP",
            vec![key.as_str().into(), value.into()],
        )
        .await?;
    }

    let setting = fetch_setting(pool.get_ref(), &key)
        .await?
        .ok_or_else(|| ApiError::Internal("failed to create setting".into()))?;

    Ok(HttpResponse::Ok().json(setting))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_setting_body_allows_null_value() {
        let req: UpdateSetting = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(req.value, None);

        let req: UpdateSetting = serde_json::from_str(r#"{"value": "PT Contoh"}"#).unwrap();
        assert_eq!(req.value.as_deref(), Some("PT Contoh"));
    }
}
