//! `SeaORM` active enums mirroring the `PostgreSQL` enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `booking_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "booking_status")]
pub enum BookingStatus {
    /// Awaiting provider confirmation.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Provider confirmed the session.
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Session delivered.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Session cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// `payment_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
pub enum PaymentStatus {
    /// Client has not paid.
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    /// Client paid.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Payment returned to the client.
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

/// `application_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "application_status")]
pub enum ApplicationStatus {
    /// Under review.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Applicant got the job.
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Poster declined.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Applicant withdrew.
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

/// `withdrawal_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "withdrawal_status")]
pub enum WithdrawalStatus {
    /// Accepted by the gateway, settlement outstanding.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Recorded before submission.
    #[sea_orm(string_value = "requested")]
    Requested,
    /// Paid out.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Not paid out.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// `payout_service`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payout_service")]
pub enum PayoutService {
    /// MTN Mobile Money.
    #[sea_orm(string_value = "MTN")]
    Mtn,
    /// Orange Money.
    #[sea_orm(string_value = "ORANGE")]
    Orange,
}
