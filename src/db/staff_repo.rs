// src/db/staff_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        balances::BalanceAccount,
        staff::{
            AttendanceFilter, AttendanceRecord, AttendanceStatus, AttendanceTally, StaffFilter,
            StaffKind, StaffMember, WageBasis, WagePayment,
        },
    },
};

#[derive(Debug, Clone)]
pub struct StaffFields<'a> {
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub kind: StaffKind,
    pub designation: Option<&'a str>,
    pub wage_basis: WageBasis,
    pub wage_rate: Decimal,
    pub joined_on: NaiveDate,
}

// Staff members, their attendance and the wages paid to them
#[derive(Clone)]
pub struct StaffRepository {
    pool: PgPool,
}

impl StaffRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Staff
    // ---

    pub async fn list(&self, filter: &StaffFilter) -> Result<Vec<StaffMember>, AppError> {
        let staff = sqlx::query_as::<_, StaffMember>(
            r#"
            SELECT * FROM staff_members
            WHERE ($1::staff_kind IS NULL OR kind = $1)
              AND ($2::boolean IS NULL OR is_active = $2)
            ORDER BY name ASC
            "#,
        )
        .bind(filter.kind)
        .bind(filter.active)
        .fetch_all(&self.pool)
        .await?;
        Ok(staff)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<StaffMember>, AppError> {
        let member = sqlx::query_as::<_, StaffMember>("SELECT * FROM staff_members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    pub async fn create<'e, E>(&self, executor: E, fields: &StaffFields<'_>) -> Result<StaffMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, StaffMember>(
            r#"
            INSERT INTO staff_members (name, phone, kind, designation, wage_basis, wage_rate, joined_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(fields.name)
        .bind(fields.phone)
        .bind(fields.kind)
        .bind(fields.designation)
        .bind(fields.wage_basis)
        .bind(fields.wage_rate)
        .bind(fields.joined_on)
        .fetch_one(executor)
        .await?;
        Ok(member)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        fields: &StaffFields<'_>,
    ) -> Result<StaffMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StaffMember>(
            r#"
            UPDATE staff_members
            SET name = $2, phone = $3, kind = $4, designation = $5, wage_basis = $6,
                wage_rate = $7, joined_on = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.name)
        .bind(fields.phone)
        .bind(fields.kind)
        .bind(fields.designation)
        .bind(fields.wage_basis)
        .bind(fields.wage_rate)
        .bind(fields.joined_on)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("staff_member"))
    }

    pub async fn set_active<'e, E>(&self, executor: E, id: Uuid, active: bool) -> Result<StaffMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, StaffMember>(
            "UPDATE staff_members SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("staff_member"))
    }

    // ---
    // Attendance
    // ---

    /// One record per member and day; marking again overwrites the status.
    pub async fn upsert_attendance<'e, E>(
        &self,
        executor: E,
        staff_id: Uuid,
        attendance_date: NaiveDate,
        status: AttendanceStatus,
        notes: Option<&str>,
    ) -> Result<AttendanceRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance_records (staff_id, attendance_date, status, notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (staff_id, attendance_date)
            DO UPDATE SET status = EXCLUDED.status, notes = EXCLUDED.notes, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(staff_id)
        .bind(attendance_date)
        .bind(status)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("staff_member");
                }
            }
            e.into()
        })
    }

    pub async fn list_attendance(&self, filter: &AttendanceFilter) -> Result<Vec<AttendanceRecord>, AppError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT * FROM attendance_records
            WHERE ($1::uuid IS NULL OR staff_id = $1)
              AND ($2::date IS NULL OR attendance_date >= $2)
              AND ($3::date IS NULL OR attendance_date <= $3)
            ORDER BY attendance_date DESC, staff_id
            "#,
        )
        .bind(filter.staff_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    pub async fn attendance_tallies(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceTally>, AppError> {
        let tallies = sqlx::query_as::<_, AttendanceTally>(
            r#"
            SELECT staff_id,
                   COUNT(*) FILTER (WHERE status = 'PRESENT')  AS present,
                   COUNT(*) FILTER (WHERE status = 'HALF_DAY') AS half_days,
                   COUNT(*) FILTER (WHERE status = 'ABSENT')   AS absent,
                   COUNT(*) FILTER (WHERE status = 'LEAVE')    AS leave
            FROM attendance_records
            WHERE attendance_date BETWEEN $1 AND $2
            GROUP BY staff_id
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(tallies)
    }

    // ---
    // Wage payments
    // ---

    pub async fn list_wage_payments(
        &self,
        staff_id: Option<Uuid>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<WagePayment>, AppError> {
        let payments = sqlx::query_as::<_, WagePayment>(
            r#"
            SELECT * FROM wage_payments
            WHERE ($1::uuid IS NULL OR staff_id = $1)
              AND ($2::date IS NULL OR paid_on >= $2)
              AND ($3::date IS NULL OR paid_on <= $3)
            ORDER BY paid_on DESC, created_at DESC
            "#,
        )
        .bind(staff_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    /// Sum paid per member for payments whose period lies inside `[from, to]`.
    pub async fn paid_in_period(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(Uuid, Decimal)>, AppError> {
        let paid = sqlx::query_as::<_, (Uuid, Decimal)>(
            r#"
            SELECT staff_id, SUM(amount)
            FROM wage_payments
            WHERE period_start >= $1 AND period_end <= $2
            GROUP BY staff_id
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(paid)
    }

    pub async fn create_wage_payment<'e, E>(
        &self,
        executor: E,
        staff_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
        amount: Decimal,
        paid_on: NaiveDate,
        paid_from: BalanceAccount,
        notes: Option<&str>,
    ) -> Result<WagePayment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, WagePayment>(
            r#"
            INSERT INTO wage_payments (staff_id, period_start, period_end, amount, paid_on, paid_from, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(staff_id)
        .bind(period_start)
        .bind(period_end)
        .bind(amount)
        .bind(paid_on)
        .bind(paid_from)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("staff_member");
                }
            }
            e.into()
        })
    }

    pub async fn find_wage_payment_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<WagePayment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, WagePayment>(
            "SELECT * FROM wage_payments WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(payment)
    }

    pub async fn delete_wage_payment<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM wage_payments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("wage_payment"));
        }
        Ok(())
    }
}
