// src/services/staff_service.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        bookkeeping::{earned_wage, paid_days, round_money, wage_payment_effects},
        error::AppError,
    },
    db::{staff_repo::StaffFields, StaffRepository},
    models::{
        balances::BalanceAccount,
        staff::{
            AttendanceFilter, AttendanceRecord, AttendanceStatus, AttendanceTally, StaffFilter,
            StaffMember, WagePayment, WageSummaryEntry,
        },
    },
    services::posting::Posting,
};

#[derive(Clone)]
pub struct StaffService {
    staff_repo: StaffRepository,
    posting: Posting,
    pool: PgPool,
}

impl StaffService {
    pub fn new(staff_repo: StaffRepository, posting: Posting, pool: PgPool) -> Self {
        Self { staff_repo, posting, pool }
    }

    // --- STAFF ---

    pub async fn list_staff(&self, filter: &StaffFilter) -> Result<Vec<StaffMember>, AppError> {
        self.staff_repo.list(filter).await
    }

    pub async fn get_staff(&self, id: Uuid) -> Result<StaffMember, AppError> {
        self.staff_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("staff_member"))
    }

    pub async fn create_staff(&self, fields: &StaffFields<'_>) -> Result<StaffMember, AppError> {
        self.staff_repo.create(&self.pool, fields).await
    }

    pub async fn update_staff(&self, id: Uuid, fields: &StaffFields<'_>) -> Result<StaffMember, AppError> {
        self.staff_repo.update(&self.pool, id, fields).await
    }

    /// Members are never deleted: their attendance and wage history stays.
    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<StaffMember, AppError> {
        self.staff_repo.set_active(&self.pool, id, active).await
    }

    // --- ATTENDANCE ---

    pub async fn mark_attendance(
        &self,
        staff_id: Uuid,
        date: NaiveDate,
        status: AttendanceStatus,
        notes: Option<&str>,
    ) -> Result<AttendanceRecord, AppError> {
        self.staff_repo
            .upsert_attendance(&self.pool, staff_id, date, status, notes)
            .await
    }

    /// Marks one day for many members. All or nothing.
    pub async fn mark_bulk(
        &self,
        date: NaiveDate,
        marks: &[(Uuid, AttendanceStatus)],
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut records = Vec::with_capacity(marks.len());
        for (staff_id, status) in marks {
            let record = self
                .staff_repo
                .upsert_attendance(&mut *tx, *staff_id, date, *status, None)
                .await?;
            records.push(record);
        }
        tx.commit().await?;
        Ok(records)
    }

    pub async fn list_attendance(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>, AppError> {
        self.staff_repo.list_attendance(filter).await
    }

    // --- WAGES ---

    pub async fn wage_summary(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<WageSummaryEntry>, AppError> {
        let staff = self
            .staff_repo
            .list(&StaffFilter { kind: None, active: Some(true) })
            .await?;
        let tallies = self.staff_repo.attendance_tallies(from, to).await?;
        let paid = self.staff_repo.paid_in_period(from, to).await?;

        Ok(build_wage_summary(&staff, &tallies, &paid))
    }

    pub async fn list_wage_payments(
        &self,
        staff_id: Option<Uuid>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<WagePayment>, AppError> {
        self.staff_repo.list_wage_payments(staff_id, from, to).await
    }

    pub async fn record_wage_payment(
        &self,
        staff_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
        amount: Decimal,
        paid_on: NaiveDate,
        paid_from: BalanceAccount,
        notes: Option<&str>,
    ) -> Result<WagePayment, AppError> {
        let mut tx = self.pool.begin().await?;

        let payment = self
            .staff_repo
            .create_wage_payment(
                &mut *tx,
                staff_id,
                period_start,
                period_end,
                round_money(amount),
                paid_on,
                paid_from,
                notes,
            )
            .await?;
        self.posting
            .apply(&mut tx, &wage_payment_effects(payment.paid_from, payment.amount), Some(payment.id), None)
            .await?;

        tx.commit().await?;
        Ok(payment)
    }

    pub async fn delete_wage_payment(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let payment = self
            .staff_repo
            .find_wage_payment_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("wage_payment"))?;

        self.staff_repo.delete_wage_payment(&mut *tx, id).await?;
        self.posting
            .apply(
                &mut tx,
                &wage_payment_effects(payment.paid_from, payment.amount).reversed(),
                Some(payment.id),
                None,
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// One row per member. Members without attendance get zero days; `due` never goes below zero.
pub fn build_wage_summary(
    staff: &[StaffMember],
    tallies: &[AttendanceTally],
    paid: &[(Uuid, Decimal)],
) -> Vec<WageSummaryEntry> {
    let tallies: HashMap<Uuid, &AttendanceTally> = tallies.iter().map(|t| (t.staff_id, t)).collect();
    let paid: HashMap<Uuid, Decimal> = paid.iter().copied().collect();

    staff
        .iter()
        .map(|member| {
            let tally = tallies.get(&member.id).copied().cloned().unwrap_or_default();
            let days = paid_days(tally.present, tally.half_days);
            let earned = earned_wage(member.wage_basis, member.wage_rate, days);
            let already_paid = paid.get(&member.id).copied().unwrap_or(Decimal::ZERO);

            WageSummaryEntry {
                staff_id: member.id,
                name: member.name.clone(),
                kind: member.kind,
                wage_basis: member.wage_basis,
                wage_rate: member.wage_rate,
                present_days: tally.present,
                half_days: tally.half_days,
                absent_days: tally.absent,
                leave_days: tally.leave,
                paid_days: days,
                earned,
                already_paid,
                due: (earned - already_paid).max(Decimal::ZERO),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::staff::{StaffKind, WageBasis};
    use chrono::Utc;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn member(name: &str, basis: WageBasis, rate: &str) -> StaffMember {
        StaffMember {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: None,
            kind: StaffKind::Labourer,
            designation: None,
            wage_basis: basis,
            wage_rate: d(rate),
            joined_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn daily_and_monthly_wages_with_payments() {
        let raju = member("Raju", WageBasis::Daily, "650");
        let meena = member("Meena", WageBasis::Monthly, "15000");

        let tallies = vec![
            AttendanceTally { staff_id: raju.id, present: 20, half_days: 2, absent: 3, leave: 1 },
            AttendanceTally { staff_id: meena.id, present: 26, half_days: 0, absent: 0, leave: 4 },
        ];
        let paid = vec![(raju.id, d("5000"))];

        let summary = build_wage_summary(&[raju.clone(), meena.clone()], &tallies, &paid);

        assert_eq!(summary[0].paid_days, d("21"));
        assert_eq!(summary[0].earned, d("13650"));
        assert_eq!(summary[0].already_paid, d("5000"));
        assert_eq!(summary[0].due, d("8650"));
        assert_eq!(summary[0].leave_days, 1);

        // 15000 / 30 × 26
        assert_eq!(summary[1].earned, d("13000"));
        assert_eq!(summary[1].due, d("13000"));
    }

    #[test]
    fn no_attendance_means_nothing_earned() {
        let raju = member("Raju", WageBasis::Daily, "650");
        let summary = build_wage_summary(&[raju], &[], &[]);
        assert_eq!(summary[0].paid_days, Decimal::ZERO);
        assert_eq!(summary[0].earned, Decimal::ZERO);
        assert_eq!(summary[0].due, Decimal::ZERO);
    }

    #[test]
    fn overpayment_does_not_produce_negative_due() {
        let raju = member("Raju", WageBasis::Daily, "500");
        let tallies = vec![AttendanceTally { staff_id: raju.id, present: 2, ..Default::default() }];
        let summary = build_wage_summary(&[raju.clone()], &tallies, &[(raju.id, d("2000"))]);
        assert_eq!(summary[0].earned, d("1000"));
        assert_eq!(summary[0].due, Decimal::ZERO);
    }
}
