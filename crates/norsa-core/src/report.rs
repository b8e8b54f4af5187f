//! # Daily Reconciliation
//!
//! Aggregation behind the end-of-day report and the once-per-day gate.
//!
//! ## Daily Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Terminal opens                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  is_daily_report_due(last_printed, now)?                               │
//! │       │                                                                 │
//! │       ├── yes → expense / retour / balance blocked                     │
//! │       │         operator prints the daily report                        │
//! │       │         last_printed := now                                     │
//! │       │                                                                 │
//! │       └── no  → transactions allowed until local midnight               │
//! │                                                                         │
//! │  Daily total = Σ expense − Σ retour (order independent)                │
//! │  Print order = date_time ascending                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, TimeZone, Utc};

use crate::money::Money;
use crate::types::{DailyTransaction, TransactionType};

/// Signed sum of a day's transactions: expenses add, retours subtract.
pub fn daily_total(transactions: &[DailyTransaction]) -> Money {
    transactions.iter().map(|t| t.kind.signed(t.amount)).sum()
}

/// The day's transactions in print order with their totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySummary {
    /// Sorted by `date_time` ascending; ties keep backend order.
    pub transactions: Vec<DailyTransaction>,
    pub expense_total: Money,
    pub retour_total: Money,
    pub total: Money,
}

impl DailySummary {
    pub fn new(mut transactions: Vec<DailyTransaction>) -> Self {
        transactions.sort_by_key(|t| t.date_time);

        let sum_of = |kind: TransactionType| -> Money {
            transactions
                .iter()
                .filter(|t| t.kind == kind)
                .map(|t| t.amount)
                .sum()
        };
        let expense_total = sum_of(TransactionType::Expense);
        let retour_total = sum_of(TransactionType::Retour);

        DailySummary {
            total: expense_total - retour_total,
            transactions,
            expense_total,
            retour_total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// True when no daily report has been printed on `now`'s local calendar day.
///
/// `last_printed` is stored in UTC; it is converted into `now`'s zone before
/// the dates are compared, so a report printed at 23:30 local time does not
/// unlock the next morning.
pub fn is_daily_report_due<Tz: TimeZone>(last_printed: Option<DateTime<Utc>>, now: &DateTime<Tz>) -> bool {
    match last_printed {
        None => true,
        Some(printed) => {
            let printed_local = printed.with_timezone(&now.timezone());
            printed_local.date_naive() != now.date_naive()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use proptest::prelude::*;

    fn tx(client: &str, cents: i64, kind: TransactionType, minute: u32) -> DailyTransaction {
        DailyTransaction {
            client_id: client.to_string(),
            amount: Money::from_cents(cents),
            kind,
            date_time: Utc.with_ymd_and_hms(2024, 5, 10, 14, minute, 0).unwrap(),
        }
    }

    #[test]
    fn test_daily_total_signed() {
        let txs = vec![
            tx("a", 1000, TransactionType::Expense, 1),
            tx("b", 250, TransactionType::Retour, 2),
            tx("c", 500, TransactionType::Expense, 3),
        ];
        assert_eq!(daily_total(&txs).cents(), 1250);
        assert_eq!(daily_total(&[]).cents(), 0);
    }

    #[test]
    fn test_summary_sorts_ascending() {
        let summary = DailySummary::new(vec![
            tx("late", 100, TransactionType::Expense, 50),
            tx("early", 100, TransactionType::Retour, 5),
            tx("mid", 300, TransactionType::Expense, 20),
        ]);

        let order: Vec<&str> = summary.transactions.iter().map(|t| t.client_id.as_str()).collect();
        assert_eq!(order, vec!["early", "mid", "late"]);
        assert_eq!(summary.expense_total.cents(), 400);
        assert_eq!(summary.retour_total.cents(), 100);
        assert_eq!(summary.total.cents(), 300);
    }

    #[test]
    fn test_report_due_on_first_run() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();
        assert!(is_daily_report_due(None, &now));
    }

    #[test]
    fn test_report_due_uses_local_calendar_day() {
        // Curaçao is UTC-4
        let zone = FixedOffset::west_opt(4 * 3600).unwrap();

        // Printed 23:30 local on the 9th (03:30 UTC on the 10th)
        let printed = Utc.with_ymd_and_hms(2024, 5, 10, 3, 30, 0).unwrap();

        let same_evening = zone.with_ymd_and_hms(2024, 5, 9, 23, 45, 0).unwrap();
        let next_morning = zone.with_ymd_and_hms(2024, 5, 10, 7, 0, 0).unwrap();

        assert!(!is_daily_report_due(Some(printed), &same_evening));
        assert!(is_daily_report_due(Some(printed), &next_morning));
    }

    fn arb_tx() -> impl Strategy<Value = DailyTransaction> {
        (0i64..1_000_000, any::<bool>(), 0u32..60).prop_map(|(cents, retour, minute)| {
            let kind = if retour {
                TransactionType::Retour
            } else {
                TransactionType::Expense
            };
            tx("p", cents, kind, minute)
        })
    }

    proptest! {
        #[test]
        fn prop_total_is_order_independent(mut txs in prop::collection::vec(arb_tx(), 0..40)) {
            let forward = daily_total(&txs);
            txs.reverse();
            prop_assert_eq!(forward, daily_total(&txs));

            let summary = DailySummary::new(txs.clone());
            prop_assert_eq!(summary.total, forward);
            prop_assert!(summary
                .transactions
                .windows(2)
                .all(|w| w[0].date_time <= w[1].date_time));
        }
    }
}
