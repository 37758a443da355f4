// src/models/ai.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Increasing,
    Stable,
    Decreasing,
}

// --- Price suggestion ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceSuggestionRequest {
    #[validate(length(min = 1, message = "Material is required."))]
    #[schema(example = "Aluminium extrusion scrap")]
    pub material: String,

    #[schema(example = "6063, clean, no paint")]
    pub grade: Option<String>,

    #[validate(custom(function = "crate::common::validation::validate_positive"))]
    #[schema(example = "1200")]
    pub quantity: Decimal,

    #[serde(default = "default_unit")]
    #[schema(example = "kg")]
    pub unit: String,

    #[schema(example = "Pune")]
    pub location: Option<String>,

    /// When set, recent purchase and sale rates of this item are given to the model.
    pub item_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceSuggestion {
    #[schema(example = "182.50")]
    pub suggested_price: Decimal,
    #[schema(example = "175.00")]
    pub min_price: Decimal,
    #[schema(example = "190.00")]
    pub max_price: Decimal,
    #[serde(default = "default_currency")]
    #[schema(example = "INR")]
    pub currency: String,
    pub confidence: Confidence,
    pub reasoning: String,
}

impl PriceSuggestion {
    /// Rejects answers that parse but make no sense.
    pub fn check(&self) -> Result<(), String> {
        if self.min_price.is_sign_negative()
            || self.max_price.is_sign_negative()
            || self.suggested_price.is_sign_negative()
        {
            return Err("prices must not be negative".into());
        }
        if self.min_price > self.max_price {
            return Err("minPrice is greater than maxPrice".into());
        }
        if self.suggested_price < self.min_price || self.suggested_price > self.max_price {
            return Err("suggestedPrice is outside [minPrice, maxPrice]".into());
        }
        if self.reasoning.trim().is_empty() {
            return Err("reasoning is empty".into());
        }
        Ok(())
    }
}

// --- Demand forecast ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    #[schema(example = "2025-01")]
    pub period: String,
    #[schema(example = "3400")]
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemandForecastRequest {
    #[validate(length(min = 1, message = "Material is required."))]
    #[schema(example = "Copper wire (bare bright)")]
    pub material: String,

    #[validate(range(min = 1, max = 12, message = "Horizon must be between 1 and 12 months."))]
    #[serde(default = "default_horizon")]
    #[schema(example = 3)]
    pub horizon_months: u32,

    /// Monthly quantities sold. Read from the sales ledger when empty and `itemId` is set.
    #[serde(default)]
    pub history: Vec<HistoryPoint>,

    pub item_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    #[schema(example = "2025-04")]
    pub period: String,
    #[schema(example = "3650")]
    pub predicted_quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemandForecast {
    pub forecasts: Vec<ForecastPoint>,
    pub trend: Trend,
    pub confidence: Confidence,
    pub summary: String,
}

impl DemandForecast {
    pub fn check(&self, horizon_months: u32) -> Result<(), String> {
        if self.forecasts.len() != horizon_months as usize {
            return Err(format!(
                "expected {} forecast periods, got {}",
                horizon_months,
                self.forecasts.len()
            ));
        }
        if let Some(p) = self.forecasts.iter().find(|p| p.predicted_quantity.is_sign_negative()) {
            return Err(format!("negative quantity for period {}", p.period));
        }
        if self.summary.trim().is_empty() {
            return Err("summary is empty".into());
        }
        Ok(())
    }
}

fn default_unit() -> String {
    "kg".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_horizon() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn suggestion(min: Decimal, suggested: Decimal, max: Decimal) -> PriceSuggestion {
        PriceSuggestion {
            suggested_price: suggested,
            min_price: min,
            max_price: max,
            currency: "INR".into(),
            confidence: Confidence::Medium,
            reasoning: "LME copper up 2% this week".into(),
        }
    }

    #[test]
    fn suggestion_inside_range_passes() {
        assert!(suggestion(d("700"), d("712.5"), d("730")).check().is_ok());
    }

    #[test]
    fn suggestion_outside_range_fails() {
        let err = suggestion(d("700"), d("750"), d("730")).check().unwrap_err();
        assert!(err.contains("outside"));
    }

    #[test]
    fn inverted_range_fails() {
        assert!(suggestion(d("800"), d("750"), d("730")).check().is_err());
    }

    #[test]
    fn negative_prices_fail() {
        assert!(suggestion(d("-1"), d("0"), d("10")).check().is_err());
    }

    #[test]
    fn suggestion_parses_from_model_json() {
        let raw = r#"{"suggestedPrice": 182.5, "minPrice": 175, "maxPrice": 190,
                      "confidence": "HIGH", "reasoning": "Stable demand"}"#;
        let parsed: PriceSuggestion = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.currency, "INR");
        assert_eq!(parsed.confidence, Confidence::High);
        assert!(parsed.check().is_ok());
    }

    #[test]
    fn forecast_length_must_match_horizon() {
        let forecast = DemandForecast {
            forecasts: vec![ForecastPoint { period: "2025-04".into(), predicted_quantity: d("10") }],
            trend: Trend::Stable,
            confidence: Confidence::Low,
            summary: "Flat".into(),
        };
        assert!(forecast.check(1).is_ok());
        assert!(forecast.check(3).unwrap_err().contains("expected 3"));
    }

    #[test]
    fn forecast_rejects_negative_quantities() {
        let forecast = DemandForecast {
            forecasts: vec![ForecastPoint { period: "2025-04".into(), predicted_quantity: d("-5") }],
            trend: Trend::Decreasing,
            confidence: Confidence::Low,
            summary: "Falling".into(),
        };
        assert!(forecast.check(1).unwrap_err().contains("2025-04"));
    }

    #[test]
    fn forecast_request_defaults_horizon_and_history() {
        let req: DemandForecastRequest =
            serde_json::from_str(r#"{"material": "Brass"}"#).unwrap();
        assert_eq!(req.horizon_months, 3);
        assert!(req.history.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn price_request_requires_positive_quantity() {
        let req: PriceSuggestionRequest =
            serde_json::from_str(r#"{"material": "Brass", "quantity": 0}"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
    }
}
