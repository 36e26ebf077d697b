use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use payvest_core::settings::SettingsRepositoryTrait;
use payvest_core::{Error, Result};
use payvest_core::errors::DatabaseError;

use super::model::AppSettingDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::app_settings;

pub struct SettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SettingsRepository { pool, writer }
    }
}

#[async_trait]
impl SettingsRepositoryTrait for SettingsRepository {
    fn get_setting(&self, setting_key: &str) -> Result<String> {
        let mut conn = get_connection(&self.pool)?;
        let row: Option<AppSettingDB> = app_settings::table
            .find(setting_key)
            .first::<AppSettingDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(|r| r.setting_value)
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(setting_key.to_string())))
    }

    async fn update_setting(&self, setting_key: &str, setting_value: &str) -> Result<()> {
        let row = AppSettingDB {
            setting_key: setting_key.to_string(),
            setting_value: setting_value.to_string(),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(app_settings::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
