//! Property-based tests for balance computation.
//!
//! - Additivity: available = earnings - withdrawn - pending, exactly
//! - Gate: a snapshot covers exactly the amounts up to its available balance
//! - Status filtering: only completed earnings count
//! - Determinism: the same inputs always give the same snapshot

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tandem_shared::types::{BookingId, JobApplicationId, UserId, WithdrawalId};
use uuid::Uuid;

use super::balance::BalanceSnapshot;
use super::earning::{CompletionRule, EarningRecord, EarningStatus};
use super::withdrawal::{WithdrawalRecord, WithdrawalStatus};
use crate::payout::PayoutService;

/// XAF-scale amounts, up to 10,000,000.00 with two decimal places.
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn earning_status() -> impl Strategy<Value = EarningStatus> {
    prop_oneof![
        Just(EarningStatus::Pending),
        Just(EarningStatus::Confirmed),
        Just(EarningStatus::Completed),
        Just(EarningStatus::Cancelled),
        Just(EarningStatus::Unset),
    ]
}

fn withdrawal_status() -> impl Strategy<Value = WithdrawalStatus> {
    prop_oneof![
        Just(WithdrawalStatus::Pending),
        Just(WithdrawalStatus::Requested),
        Just(WithdrawalStatus::Completed),
        Just(WithdrawalStatus::Rejected),
    ]
}

fn earning() -> impl Strategy<Value = EarningRecord> {
    (amount(), earning_status(), any::<bool>()).prop_map(|(amount, status, is_booking)| {
        if is_booking {
            EarningRecord::booking(BookingId::new(), amount, status)
        } else {
            EarningRecord {
                status,
                ..EarningRecord::accepted_job(JobApplicationId::new(), amount)
            }
        }
    })
}

fn withdrawal() -> impl Strategy<Value = WithdrawalRecord> {
    (amount(), withdrawal_status()).prop_map(|(amount, status)| {
        let now = Utc::now();
        WithdrawalRecord {
            id: WithdrawalId::new(),
            user_id: UserId::from_uuid(Uuid::nil()),
            amount,
            status,
            service: PayoutService::Mtn,
            receiver: "670000000".to_string(),
            gateway_reference: None,
            needs_reconciliation: false,
            created_at: now,
            updated_at: now,
        }
    })
}

fn sum_where<T>(items: &[T], keep: impl Fn(&T) -> bool, value: impl Fn(&T) -> Decimal) -> Decimal {
    items.iter().filter(|i| keep(i)).map(value).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_available_balance_is_additive(
        earnings in prop::collection::vec(earning(), 0..20),
        withdrawals in prop::collection::vec(withdrawal(), 0..20),
    ) {
        let snapshot = BalanceSnapshot::compute(&earnings, &withdrawals, CompletionRule::STRICT);

        let earned = sum_where(&earnings, |e| e.status == EarningStatus::Completed, |e| e.amount);
        let withdrawn = sum_where(
            &withdrawals,
            |w| w.status == WithdrawalStatus::Completed,
            |w| w.amount,
        );
        let pending = sum_where(&withdrawals, |w| w.status.is_in_flight(), |w| w.amount);

        prop_assert_eq!(snapshot.total_earnings, earned);
        prop_assert_eq!(snapshot.total_withdrawn, withdrawn);
        prop_assert_eq!(snapshot.pending_withdrawals, pending);
        prop_assert_eq!(snapshot.available_balance, earned - withdrawn - pending);
    }

    #[test]
    fn prop_gate_boundary_is_exact(
        earnings in prop::collection::vec(earning(), 1..20),
        withdrawals in prop::collection::vec(withdrawal(), 0..10),
    ) {
        let snapshot = BalanceSnapshot::compute(&earnings, &withdrawals, CompletionRule::STRICT);
        let available = snapshot.available_balance;

        if available > Decimal::ZERO {
            prop_assert!(snapshot.covers(available));
        }
        prop_assert!(!snapshot.covers(available + Decimal::new(1, 2)));
    }

    #[test]
    fn prop_incomplete_earnings_never_count(
        earnings in prop::collection::vec(earning(), 0..20),
    ) {
        let snapshot = BalanceSnapshot::compute(&earnings, &[], CompletionRule::STRICT);
        let only_incomplete: Vec<_> = earnings
            .iter()
            .filter(|e| matches!(
                e.status,
                EarningStatus::Pending | EarningStatus::Cancelled | EarningStatus::Unset
            ))
            .cloned()
            .collect();

        let from_incomplete =
            BalanceSnapshot::compute(&only_incomplete, &[], CompletionRule::STRICT);
        prop_assert_eq!(from_incomplete.total_earnings, Decimal::ZERO);

        // Relaxing the rule only ever adds confirmed bookings.
        let relaxed = BalanceSnapshot::compute(
            &earnings,
            &[],
            CompletionRule { count_confirmed_bookings: true },
        );
        prop_assert!(relaxed.total_earnings >= snapshot.total_earnings);
        let relaxed_incomplete = BalanceSnapshot::compute(
            &only_incomplete,
            &[],
            CompletionRule { count_confirmed_bookings: true },
        );
        prop_assert_eq!(relaxed_incomplete.total_earnings, Decimal::ZERO);
    }

    #[test]
    fn prop_compute_is_deterministic(
        earnings in prop::collection::vec(earning(), 0..20),
        withdrawals in prop::collection::vec(withdrawal(), 0..20),
    ) {
        let first = BalanceSnapshot::compute(&earnings, &withdrawals, CompletionRule::STRICT);
        let second = BalanceSnapshot::compute(&earnings, &withdrawals, CompletionRule::STRICT);
        prop_assert_eq!(first, second);
    }
}
