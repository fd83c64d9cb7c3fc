//! `SeaORM` entities.

pub mod prelude;

pub mod job_applications;
pub mod jobs;
pub mod profiles;
pub mod sea_orm_active_enums;
pub mod service_bookings;
pub mod withdrawals;
