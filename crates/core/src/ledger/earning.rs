//! Earning records and the completion predicate.
//!
//! Earnings come from two tables the ledger does not own: consultation bookings
//! (as the service provider) and accepted job applications (as the applicant).
//! Both are projected into one [`EarningRecord`] shape so a single rule decides
//! what counts toward the withdrawable total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tandem_shared::LedgerConfig;
use tandem_shared::types::{BookingId, JobApplicationId};

/// Where an earning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EarningSource {
    /// A paid consultation booking.
    Booking(BookingId),
    /// An accepted application to a job posting.
    Job(JobApplicationId),
}

/// Normalized lifecycle status of an earning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarningStatus {
    /// Work not yet confirmed.
    Pending,
    /// Work confirmed but not yet delivered.
    Confirmed,
    /// Work delivered; the earning is withdrawable.
    Completed,
    /// Work cancelled or application withdrawn.
    Cancelled,
    /// Source row carries no usable status.
    Unset,
}

/// A unit of paid work that may entitle its recipient to withdraw funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningRecord {
    /// Origin of the earning.
    pub source: EarningSource,
    /// Earned amount.
    pub amount: Decimal,
    /// Normalized status.
    pub status: EarningStatus,
}

impl EarningRecord {
    /// Projects a booking into an earning.
    #[must_use]
    pub const fn booking(id: BookingId, amount: Decimal, status: EarningStatus) -> Self {
        Self {
            source: EarningSource::Booking(id),
            amount,
            status,
        }
    }

    /// Projects an accepted job application into an earning.
    ///
    /// Acceptance is the completion signal for job work.
    #[must_use]
    pub const fn accepted_job(id: JobApplicationId, amount: Decimal) -> Self {
        Self {
            source: EarningSource::Job(id),
            amount,
            status: EarningStatus::Completed,
        }
    }
}

/// Decides which earnings count toward the withdrawable total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionRule {
    /// Count bookings that are confirmed but not yet completed.
    pub count_confirmed_bookings: bool,
}

impl CompletionRule {
    /// Only `completed` earnings count.
    pub const STRICT: Self = Self {
        count_confirmed_bookings: false,
    };

    /// Returns true if the earning contributes to the withdrawable total.
    #[must_use]
    pub fn is_complete(self, record: &EarningRecord) -> bool {
        match record.status {
            EarningStatus::Completed => true,
            EarningStatus::Confirmed => {
                self.count_confirmed_bookings
                    && matches!(record.source, EarningSource::Booking(_))
            }
            EarningStatus::Pending | EarningStatus::Cancelled | EarningStatus::Unset => false,
        }
    }
}

impl From<&LedgerConfig> for CompletionRule {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            count_confirmed_bookings: config.count_confirmed_bookings,
        }
    }
}
