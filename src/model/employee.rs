use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single employee profile row.
///
/// `alamat`, `foto` and `fotocopy_identitas` hold inline base64 payloads and
/// are only selected by the single-row endpoints; list and report queries
/// leave them out, and they disappear from the JSON when absent.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    /// Business-unique employee identification number.
    #[schema(example = "68190007")]
    pub nip: String,

    #[schema(example = "KOK HAI")]
    pub nama: String,

    #[schema(example = "FO Leader")]
    pub posisi: String,

    #[schema(example = "Buddha")]
    pub agama: String,

    /// Work-location code (short site abbreviation).
    #[schema(example = "PS")]
    pub lokasi_kerja: String,

    #[schema(example = "2019-05-01", value_type = String, format = "date")]
    pub mulai_bergabung: NaiveDate,

    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alamat: Option<String>,

    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foto: Option<String>,

    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fotocopy_identitas: Option<String>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Employee {
        Employee {
            id: 1,
            nip: "68190007".into(),
            nama: "KOK HAI".into(),
            posisi: "FO Leader".into(),
            agama: "Buddha".into(),
            lokasi_kerja: "PS".into(),
            mulai_bergabung: NaiveDate::from_ymd_opt(2019, 5, 1).unwrap(),
            alamat: None,
            foto: None,
            fotocopy_identitas: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn boundary_fields_are_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("lokasiKerja"));
        assert!(obj.contains_key("mulaiBergabung"));
        assert!(obj.contains_key("createdAt"));
        assert!(obj.contains_key("updatedAt"));
        assert!(!obj.contains_key("lokasi_kerja"));
    }

    #[test]
    fn absent_blob_columns_are_omitted() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("alamat"));
        assert!(!obj.contains_key("foto"));
        assert!(!obj.contains_key("fotocopyIdentitas"));
    }
}
