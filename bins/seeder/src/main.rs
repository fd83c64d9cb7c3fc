//! Database seeder for wallet development and testing.
//!
//! Seeds a provider with one paid consultation, one accepted job and two
//! withdrawals, so that their balance reads:
//!
//! ```text
//! earnings 80,000  withdrawn 20,000  pending 10,000  available 50,000
//! ```
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use tandem_db::entities::{
    job_applications, jobs, profiles,
    sea_orm_active_enums::{
        ApplicationStatus, BookingStatus, PaymentStatus, PayoutService, WithdrawalStatus,
    },
    service_bookings, withdrawals,
};
use uuid::Uuid;

/// Provider whose wallet is seeded (consistent across runs).
const PROVIDER_ID: &str = "00000000-0000-0000-0000-000000000101";
/// Client who books and posts jobs.
const CLIENT_ID: &str = "00000000-0000-0000-0000-000000000102";
const BOOKING_ID: &str = "00000000-0000-0000-0000-000000000201";
const JOB_ID: &str = "00000000-0000-0000-0000-000000000301";
const APPLICATION_ID: &str = "00000000-0000-0000-0000-000000000302";
const COMPLETED_WITHDRAWAL_ID: &str = "00000000-0000-0000-0000-000000000401";
const PENDING_WITHDRAWAL_ID: &str = "00000000-0000-0000-0000-000000000402";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = tandem_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let provider = id(PROVIDER_ID)?;
    let client = id(CLIENT_ID)?;

    println!("Seeding profiles...");
    seed_profile(&db, provider, "Amina Researcher", Some("670123456")).await?;
    seed_profile(&db, client, "Boris Client", None).await?;

    println!("Seeding earnings...");
    seed_booking(&db, provider, client).await?;
    seed_job(&db, provider, client).await?;

    println!("Seeding withdrawals...");
    seed_withdrawal(
        &db,
        id(COMPLETED_WITHDRAWAL_ID)?,
        provider,
        Decimal::from(20_000),
        WithdrawalStatus::Completed,
        Some("MS-SEED-1"),
    )
    .await?;
    seed_withdrawal(
        &db,
        id(PENDING_WITHDRAWAL_ID)?,
        provider,
        Decimal::from(10_000),
        WithdrawalStatus::Pending,
        None,
    )
    .await?;

    println!("Seeding complete! Provider wallet: {provider}");
    Ok(())
}

fn id(raw: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("Invalid seed id {raw}"))
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

/// Reports a duplicate row as skipped and any other error as fatal.
fn skip_duplicate(result: Result<(), DbErr>, what: &str) -> anyhow::Result<()> {
    match result {
        Ok(()) => {
            println!("  Inserted {what}");
            Ok(())
        }
        Err(e) if e.to_string().contains("duplicate key") => {
            println!("  {what} already exists, skipping...");
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to insert {what}")),
    }
}

async fn seed_profile(
    db: &DatabaseConnection,
    id: Uuid,
    full_name: &str,
    phone: Option<&str>,
) -> anyhow::Result<()> {
    let result = profiles::ActiveModel {
        id: Set(id),
        full_name: Set(full_name.to_string()),
        phone: Set(phone.map(str::to_string)),
        created_at: Set(now()),
        updated_at: Set(now()),
    }
    .insert(db)
    .await
    .map(|_| ());

    skip_duplicate(result, &format!("profile {full_name}"))
}

async fn seed_booking(db: &DatabaseConnection, provider: Uuid, client: Uuid) -> anyhow::Result<()> {
    let result = service_bookings::ActiveModel {
        id: Set(id(BOOKING_ID)?),
        provider_id: Set(provider),
        client_id: Set(client),
        price: Set(Decimal::from(50_000)),
        status: Set(Some(BookingStatus::Completed)),
        payment_status: Set(PaymentStatus::Paid),
        scheduled_at: Set(Some((Utc::now() - Duration::days(7)).into())),
        created_at: Set(now()),
        updated_at: Set(now()),
    }
    .insert(db)
    .await
    .map(|_| ());

    skip_duplicate(result, "completed paid booking of 50,000")
}

async fn seed_job(db: &DatabaseConnection, provider: Uuid, client: Uuid) -> anyhow::Result<()> {
    let job_id = id(JOB_ID)?;

    if jobs::Entity::find_by_id(job_id).one(db).await?.is_none() {
        jobs::ActiveModel {
            id: Set(job_id),
            poster_id: Set(client),
            title: Set("Literature review on malaria vector control".to_string()),
            budget: Set(Some(Decimal::from(30_000))),
            created_at: Set(now()),
            updated_at: Set(now()),
        }
        .insert(db)
        .await
        .context("Failed to insert job")?;
    }

    let result = job_applications::ActiveModel {
        id: Set(id(APPLICATION_ID)?),
        job_id: Set(Some(job_id)),
        applicant_id: Set(provider),
        status: Set(ApplicationStatus::Accepted),
        created_at: Set(now()),
        updated_at: Set(now()),
    }
    .insert(db)
    .await
    .map(|_| ());

    skip_duplicate(result, "accepted application on a 30,000 job")
}

async fn seed_withdrawal(
    db: &DatabaseConnection,
    id: Uuid,
    provider: Uuid,
    amount: Decimal,
    status: WithdrawalStatus,
    reference: Option<&str>,
) -> anyhow::Result<()> {
    let what = format!("{status:?} withdrawal of {amount}");
    let result = withdrawals::ActiveModel {
        id: Set(id),
        user_id: Set(provider),
        amount: Set(amount),
        status: Set(status),
        service: Set(PayoutService::Mtn),
        receiver: Set("670123456".to_string()),
        gateway_reference: Set(reference.map(str::to_string)),
        needs_reconciliation: Set(false),
        created_at: Set(now()),
        updated_at: Set(now()),
    }
    .insert(db)
    .await
    .map(|_| ());

    skip_duplicate(result, &what)
}
