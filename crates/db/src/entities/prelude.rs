//! `SeaORM` entity prelude.

pub use super::job_applications::Entity as JobApplications;
pub use super::jobs::Entity as Jobs;
pub use super::profiles::Entity as Profiles;
pub use super::service_bookings::Entity as ServiceBookings;
pub use super::withdrawals::Entity as Withdrawals;
