//! Database models for the key/value settings store.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Database model for one setting row.
#[derive(
    Insertable, Queryable, Identifiable, AsChangeset, Selectable, PartialEq, Serialize,
    Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::app_settings)]
#[diesel(primary_key(setting_key))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct AppSettingDB {
    pub setting_key: String,
    pub setting_value: String,
}
