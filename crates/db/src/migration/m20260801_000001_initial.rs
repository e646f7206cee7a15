//! Initial schema: members, products, company accounts, loans, and the ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS loan_repayments, loan_disbursements, loans, \
             account_transactions, company_accounts, interest_products, loan_products, \
             members CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Borrowers
CREATE TABLE members (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    first_name VARCHAR(100) NOT NULL,
    last_name VARCHAR(100) NOT NULL,
    phone VARCHAR(32),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Interest pricing: percent per cycle
CREATE TABLE interest_products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    rate NUMERIC(8, 4) NOT NULL,
    period_type VARCHAR(16) NOT NULL DEFAULT 'monthly',
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_interest_rate_nonneg CHECK (rate >= 0),
    CONSTRAINT chk_interest_period_type CHECK (period_type IN ('monthly', 'daily'))
);

CREATE TABLE loan_products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    description TEXT,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Funding accounts holding company money
CREATE TABLE company_accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    account_number VARCHAR(64),
    balance NUMERIC(15, 2) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Append-only ledger: one row per money movement
CREATE TABLE account_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_account_id UUID NOT NULL REFERENCES company_accounts(id),
    direction VARCHAR(3) NOT NULL,
    source_type VARCHAR(32) NOT NULL,
    source_id UUID,
    tx_date DATE NOT NULL,
    description TEXT NOT NULL,
    amount NUMERIC(15, 2) NOT NULL,
    balance_before NUMERIC(15, 2) NOT NULL,
    balance_after NUMERIC(15, 2) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_tx_direction CHECK (direction IN ('IN', 'OUT')),
    CONSTRAINT chk_tx_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_account_tx_account ON account_transactions(company_account_id, tx_date, created_at);
CREATE INDEX idx_account_tx_source ON account_transactions(source_type, source_id);

CREATE TABLE loans (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    member_id UUID NOT NULL REFERENCES members(id),
    loan_product_id UUID REFERENCES loan_products(id),
    interest_product_id UUID NOT NULL REFERENCES interest_products(id),
    principal_amount NUMERIC(15, 2) NOT NULL,
    term_periods INTEGER NOT NULL,
    period_type VARCHAR(16) NOT NULL DEFAULT 'monthly',
    payment_per_period NUMERIC(15, 2),
    release_date DATE,
    first_payment_date DATE,
    disburse_method VARCHAR(32) NOT NULL DEFAULT 'cash',
    company_account_id UUID REFERENCES company_accounts(id),
    purpose TEXT,
    remarks TEXT,
    status VARCHAR(16) NOT NULL DEFAULT 'pending',
    created_by UUID,
    approved_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_loan_principal_positive CHECK (principal_amount > 0),
    CONSTRAINT chk_loan_term_positive CHECK (term_periods > 0),
    CONSTRAINT chk_loan_status CHECK (
        status IN ('pending', 'approved', 'disbursed', 'closed', 'cancelled')
    ),
    CONSTRAINT chk_loan_period_type CHECK (period_type IN ('monthly', 'daily')),
    CONSTRAINT chk_loan_disburse_method CHECK (
        disburse_method IN ('cash', 'company_account', 'mobile_wallet')
    )
);

CREATE INDEX idx_loans_member ON loans(member_id, created_at DESC);
CREATE INDEX idx_loans_status ON loans(status);

-- At most one disbursement per loan
CREATE TABLE loan_disbursements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    loan_id UUID NOT NULL REFERENCES loans(id),
    company_account_id UUID NOT NULL REFERENCES company_accounts(id),
    disburse_date DATE NOT NULL,
    amount NUMERIC(15, 2) NOT NULL,
    method VARCHAR(16) NOT NULL DEFAULT 'cash',
    notes TEXT,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_disbursement_loan UNIQUE (loan_id),
    CONSTRAINT chk_disbursement_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_disbursement_method CHECK (method IN ('cash', 'bank', 'mobile'))
);

CREATE TABLE loan_repayments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    loan_id UUID NOT NULL REFERENCES loans(id),
    company_account_id UUID NOT NULL REFERENCES company_accounts(id),
    payment_date DATE NOT NULL,
    amount NUMERIC(15, 2) NOT NULL,
    interest_amount NUMERIC(15, 2) NOT NULL DEFAULT 0,
    principal_amount NUMERIC(15, 2) NOT NULL DEFAULT 0,
    principal_balance_after NUMERIC(15, 2) NOT NULL DEFAULT 0,
    mode VARCHAR(16) NOT NULL,
    method VARCHAR(16) NOT NULL DEFAULT 'cash',
    notes TEXT,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_repayment_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_repayment_split CHECK (interest_amount + principal_amount = amount),
    CONSTRAINT chk_repayment_mode CHECK (mode IN ('interest_only', 'full', 'partial')),
    CONSTRAINT chk_repayment_method CHECK (method IN ('cash', 'bank', 'mobile'))
);

CREATE INDEX idx_repayments_loan ON loan_repayments(loan_id, payment_date, created_at);
";
