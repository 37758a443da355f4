// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::settings::{BusinessSettings, UpdateSettingsRequest},
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// An unconfigured business reads as all-empty settings.
    pub async fn get_settings<'e, E>(&self, executor: E) -> Result<BusinessSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, BusinessSettings>(
            r#"
            SELECT business_name, gstin, state_code, address, phone, upi_id, updated_at
            FROM business_settings WHERE id = 1
            "#,
        )
        .fetch_optional(executor)
        .await?;

        Ok(settings.unwrap_or_default())
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        input: &UpdateSettingsRequest,
    ) -> Result<BusinessSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, BusinessSettings>(
            r#"
            INSERT INTO business_settings (id, business_name, gstin, state_code, address, phone, upi_id, updated_at)
            VALUES (1, $1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                business_name = EXCLUDED.business_name,
                gstin = EXCLUDED.gstin,
                state_code = EXCLUDED.state_code,
                address = EXCLUDED.address,
                phone = EXCLUDED.phone,
                upi_id = EXCLUDED.upi_id,
                updated_at = NOW()
            RETURNING business_name, gstin, state_code, address, phone, upi_id, updated_at
            "#,
        )
        .bind(&input.business_name)
        .bind(input.gstin.as_deref().map(str::to_uppercase))
        .bind(&input.state_code)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.upi_id)
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }

    pub async fn current(&self) -> Result<BusinessSettings, AppError> {
        self.get_settings(&self.pool).await
    }
}
