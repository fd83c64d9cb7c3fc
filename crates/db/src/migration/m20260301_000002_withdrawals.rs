//! Withdrawals table.
//!
//! One row per payout attempt. Rows in `pending` or `requested` reserve funds;
//! `rejected` rows are kept for audit only.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(WITHDRAWALS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS withdrawals CASCADE;
             DROP TYPE IF EXISTS payout_service;
             DROP TYPE IF EXISTS withdrawal_status;",
        )
        .await?;
        Ok(())
    }
}

const WITHDRAWALS_SQL: &str = r"
CREATE TYPE withdrawal_status AS ENUM ('pending', 'requested', 'completed', 'rejected');

CREATE TYPE payout_service AS ENUM ('MTN', 'ORANGE');

CREATE TABLE withdrawals (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES profiles(id) ON DELETE RESTRICT,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    status withdrawal_status NOT NULL,
    service payout_service NOT NULL,
    receiver VARCHAR(20) NOT NULL,
    gateway_reference VARCHAR(128),
    needs_reconciliation BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_reconciliation_in_flight
        CHECK (NOT needs_reconciliation OR status IN ('pending', 'requested'))
);

-- Balance and history lookups
CREATE INDEX idx_withdrawals_user ON withdrawals(user_id, created_at DESC);

-- Reconciliation queue
CREATE INDEX idx_withdrawals_reconciliation ON withdrawals(created_at)
    WHERE needs_reconciliation;
";
