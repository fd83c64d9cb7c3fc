//! Marketplace tables the wallet derives earnings from.
//!
//! Profiles, consultation bookings, job postings and job applications. The
//! ledger only reads these; they are owned by the booking and jobs features.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(PROFILES_SQL).await?;
        db.execute_unprepared(SERVICE_BOOKINGS_SQL).await?;
        db.execute_unprepared(JOBS_SQL).await?;
        db.execute_unprepared(JOB_APPLICATIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE booking_status AS ENUM ('pending', 'confirmed', 'completed', 'cancelled');

CREATE TYPE payment_status AS ENUM ('unpaid', 'paid', 'refunded');

CREATE TYPE application_status AS ENUM ('pending', 'accepted', 'rejected', 'withdrawn');
";

const PROFILES_SQL: &str = r"
CREATE TABLE profiles (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    full_name VARCHAR(255) NOT NULL,
    phone VARCHAR(20),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const SERVICE_BOOKINGS_SQL: &str = r"
CREATE TABLE service_bookings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    provider_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    client_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    price NUMERIC(14, 2) NOT NULL CHECK (price >= 0),
    -- NULL for legacy rows created before statuses were tracked
    status booking_status,
    payment_status payment_status NOT NULL DEFAULT 'unpaid',
    scheduled_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Earnings lookup: provider's paid bookings
CREATE INDEX idx_service_bookings_provider ON service_bookings(provider_id, payment_status);
";

const JOBS_SQL: &str = r"
CREATE TABLE jobs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    poster_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    budget NUMERIC(14, 2) CHECK (budget IS NULL OR budget >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const JOB_APPLICATIONS_SQL: &str = r"
CREATE TABLE job_applications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    -- Survives job deletion so accepted work stays auditable
    job_id UUID REFERENCES jobs(id) ON DELETE SET NULL,
    applicant_id UUID NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    status application_status NOT NULL DEFAULT 'pending',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Earnings lookup: applicant's accepted applications
CREATE INDEX idx_job_applications_applicant ON job_applications(applicant_id, status);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS job_applications CASCADE;
DROP TABLE IF EXISTS jobs CASCADE;
DROP TABLE IF EXISTS service_bookings CASCADE;
DROP TABLE IF EXISTS profiles CASCADE;
DROP TYPE IF EXISTS application_status;
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS booking_status;
";
