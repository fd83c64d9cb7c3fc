//! Earnings read from bookings and job applications.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tandem_core::ledger::{EarningRecord, EarningRepository, EarningStatus, LedgerError};
use tandem_shared::types::{BookingId, JobApplicationId, UserId};
use tracing::warn;

use crate::entities::{
    job_applications, jobs,
    sea_orm_active_enums::{ApplicationStatus, BookingStatus, PaymentStatus},
    service_bookings,
};

/// Earning source backed by the marketplace tables.
#[derive(Debug, Clone)]
pub struct DbEarningRepository {
    db: DatabaseConnection,
}

impl DbEarningRepository {
    /// Creates a new earning repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl EarningRepository for DbEarningRepository {
    async fn booking_earnings(&self, user_id: UserId) -> Result<Vec<EarningRecord>, LedgerError> {
        let rows = service_bookings::Entity::find()
            .filter(service_bookings::Column::ProviderId.eq(user_id.into_inner()))
            .filter(
                service_bookings::Column::Status
                    .is_in([BookingStatus::Confirmed, BookingStatus::Completed]),
            )
            .filter(service_bookings::Column::PaymentStatus.eq(PaymentStatus::Paid))
            .all(&self.db)
            .await
            .map_err(fetch_error)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                EarningRecord::booking(
                    BookingId::from_uuid(row.id),
                    row.price,
                    booking_status_to_core(row.status),
                )
            })
            .collect())
    }

    async fn job_earnings(&self, user_id: UserId) -> Result<Vec<EarningRecord>, LedgerError> {
        let rows = job_applications::Entity::find()
            .filter(job_applications::Column::ApplicantId.eq(user_id.into_inner()))
            .filter(job_applications::Column::Status.eq(ApplicationStatus::Accepted))
            .find_also_related(jobs::Entity)
            .all(&self.db)
            .await
            .map_err(fetch_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|(application, job)| match job.and_then(|j| j.budget) {
                Some(budget) => Some(EarningRecord::accepted_job(
                    JobApplicationId::from_uuid(application.id),
                    budget,
                )),
                None => {
                    warn!(
                        user_id = %user_id,
                        application_id = %application.id,
                        job_id = ?application.job_id,
                        "Accepted application has no job budget, skipping"
                    );
                    None
                }
            })
            .collect())
    }
}

fn fetch_error(err: DbErr) -> LedgerError {
    LedgerError::DataFetch(err.to_string())
}

/// Converts a nullable database booking status to the ledger's status.
fn booking_status_to_core(status: Option<BookingStatus>) -> EarningStatus {
    match status {
        Some(BookingStatus::Pending) => EarningStatus::Pending,
        Some(BookingStatus::Confirmed) => EarningStatus::Confirmed,
        Some(BookingStatus::Completed) => EarningStatus::Completed,
        Some(BookingStatus::Cancelled) => EarningStatus::Cancelled,
        None => EarningStatus::Unset,
    }
}
