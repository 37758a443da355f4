// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSettings {
    #[schema(example = "Shiv Shakti Scrap Traders")]
    pub business_name: Option<String>,

    #[schema(example = "27AAPFU0939F1ZV")]
    pub gstin: Option<String>,

    /// Two-digit GST state code; decides between CGST+SGST and IGST.
    #[schema(example = "27")]
    pub state_code: Option<String>,

    #[schema(example = "Plot 14, MIDC Taloja, Navi Mumbai")]
    pub address: Option<String>,

    #[schema(example = "+91 98200 00000")]
    pub phone: Option<String>,

    #[schema(example = "shivshakti@okaxis")]
    pub upi_id: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl BusinessSettings {
    /// The configured state code, or the one embedded in the GSTIN.
    pub fn effective_state_code(&self) -> Option<String> {
        self.state_code
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.gstin.as_deref().and_then(crate::common::bookkeeping::gstin_state_code))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[schema(example = "Shiv Shakti Scrap Traders")]
    pub business_name: Option<String>,

    #[validate(length(equal = 15, message = "GSTIN must have 15 characters."))]
    pub gstin: Option<String>,

    #[validate(length(equal = 2, message = "State code must have 2 digits."))]
    pub state_code: Option<String>,

    pub address: Option<String>,
    pub phone: Option<String>,
    pub upi_id: Option<String>,
}
