//! Plan Builder: splits an approved, granted amount into a fixed number of
//! evenly-spaced installments.
//!
//! Grounded on `domain/entities/plan.py`'s `Plan.create()`, but using
//! integer-cent division with the remainder folded into the final
//! installment, so the installments always sum exactly to the granted
//! amount (the original's float division could drift by a cent).

use chrono::{DateTime, Utc};

pub const DEFAULT_INSTALLMENTS_COUNT: i32 = 4;
pub const DEFAULT_DAYS_BETWEEN_INSTALLMENTS: i32 = 14;

#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentSchedule {
    pub due_date: DateTime<Utc>,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanSchedule {
    pub total_cents: i64,
    pub installments_count: i32,
    pub days_between_installments: i32,
    pub installments: Vec<InstallmentSchedule>,
}

pub struct PlanBuilder;

impl PlanBuilder {
    /// Builds a schedule of `installments_count` installments spaced
    /// `days_between_installments` apart, starting `days_between_installments`
    /// after `created_at` (the first installment is never due immediately).
    /// Any remainder from integer division is added to the last installment
    /// so the total always reconciles exactly.
    pub fn build(
        total_cents: i64,
        created_at: DateTime<Utc>,
        installments_count: i32,
        days_between_installments: i32,
    ) -> PlanSchedule {
        let count = installments_count.max(1);
        let base_amount = total_cents / count as i64;
        let remainder = total_cents - base_amount * count as i64;

        let mut installments = Vec::with_capacity(count as usize);
        for i in 1..=count {
            let amount_cents = if i == count {
                base_amount + remainder
            } else {
                base_amount
            };
            let due_date = created_at + chrono::Duration::days((days_between_installments * i) as i64);
            installments.push(InstallmentSchedule {
                due_date,
                amount_cents,
            });
        }

        PlanSchedule {
            total_cents,
            installments_count: count,
            days_between_installments,
            installments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installments_sum_exactly_to_total() {
        let created_at: DateTime<Utc> = "2026-07-28T00:00:00Z".parse().unwrap();
        let schedule = PlanBuilder::build(10_001, created_at, 4, 14);
        let sum: i64 = schedule.installments.iter().map(|i| i.amount_cents).sum();
        assert_eq!(sum, 10_001);
    }

    #[test]
    fn remainder_is_folded_into_last_installment() {
        let created_at: DateTime<Utc> = "2026-07-28T00:00:00Z".parse().unwrap();
        let schedule = PlanBuilder::build(10, created_at, 3, 14);
        assert_eq!(schedule.installments[0].amount_cents, 3);
        assert_eq!(schedule.installments[1].amount_cents, 3);
        assert_eq!(schedule.installments[2].amount_cents, 4);
    }

    #[test]
    fn due_dates_are_evenly_spaced() {
        let created_at: DateTime<Utc> = "2026-07-28T00:00:00Z".parse().unwrap();
        let schedule = PlanBuilder::build(4000, created_at, 4, 14);
        assert_eq!(schedule.installments[0].due_date, created_at + chrono::Duration::days(14));
        assert_eq!(schedule.installments[3].due_date, created_at + chrono::Duration::days(56));
    }

    #[test]
    fn zero_installments_is_clamped_to_one() {
        let created_at: DateTime<Utc> = "2026-07-28T00:00:00Z".parse().unwrap();
        let schedule = PlanBuilder::build(500, created_at, 0, 14);
        assert_eq!(schedule.installments_count, 1);
        assert_eq!(schedule.installments.len(), 1);
        assert_eq!(schedule.installments[0].amount_cents, 500);
    }
}
