// src/services/dashboard_service.rs

use chrono::{Datelike, NaiveDate, Utc};

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::dashboard::DashboardSummary,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn get_summary(&self) -> Result<DashboardSummary, AppError> {
        let (from, to) = month_to_date(Utc::now().date_naive());
        self.repo.get_summary(self.repo.pool(), from, to).await
    }
}

fn first_of_month(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

/// Inclusive bounds of the current month up to today.
fn month_to_date(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (first_of_month(today), today)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_starts_on_the_first() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        assert_eq!(first_of_month(day), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        let first = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(first_of_month(first), first);
    }

    #[test]
    fn month_to_date_stops_at_today() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let (from, to) = month_to_date(today);
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(to, today);
        assert!(NaiveDate::from_ymd_opt(2025, 3, 20).unwrap() > to);
    }
}
