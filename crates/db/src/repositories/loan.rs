//! Loan repository: intake, the approval workflow, disbursement, repayment
//! and cycle quoting.
//!
//! Disburse and repay are the money-moving operations. Each one runs in a
//! single database transaction holding exclusive locks on the loan row and
//! the funding account row, so the read-validate-write sequence cannot
//! interleave with a concurrent operation on the same loan or account.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use salama_core::ledger::{TxDirection, TxSource};
use salama_core::loan::{
    AccrualCalculator, CycleQuote, DisburseMethod, DisbursementHandler, LoanError, LoanStatus,
    LoanTerms, PaymentMethod, PeriodType, RepaymentAllocator, RepaymentMode, RepaymentRecord,
};

use super::{AccountRepository, RepoError, recorder};
use crate::entities::{interest_products, loan_disbursements, loan_repayments, loans, members};

/// Input for registering a loan application.
#[derive(Debug, Clone)]
pub struct CreateLoanInput {
    /// Borrowing member.
    pub member_id: Uuid,
    /// Optional loan product for reporting.
    pub loan_product_id: Option<Uuid>,
    /// Interest product supplying the cycle rate.
    pub interest_product_id: Uuid,
    /// Principal applied for.
    pub principal_amount: Decimal,
    /// Number of periods applied for.
    pub term_periods: i32,
    /// Period unit.
    pub period_type: PeriodType,
    /// Informational flat-schedule figure.
    pub payment_per_period: Option<Decimal>,
    /// Due date for the first cycle, when agreed at intake.
    pub first_payment_date: Option<NaiveDate>,
    /// How the money will be handed over.
    pub disburse_method: DisburseMethod,
    /// What the loan is for.
    pub purpose: Option<String>,
    /// Free-form notes.
    pub remarks: Option<String>,
    /// Operator registering the application.
    pub created_by: Option<Uuid>,
}

/// Filter options for listing loans.
#[derive(Debug, Clone, Default)]
pub struct LoanFilter {
    /// Filter by status.
    pub status: Option<LoanStatus>,
    /// Filter by member.
    pub member_id: Option<Uuid>,
}

/// Input for disbursing an approved loan.
#[derive(Debug, Clone)]
pub struct DisburseLoanInput {
    /// Loan to disburse.
    pub loan_id: Uuid,
    /// Funding account the money leaves.
    pub company_account_id: Uuid,
    /// Amount handed to the member.
    pub amount: Decimal,
    /// Disbursement date; becomes the first cycle's release date.
    pub disburse_date: NaiveDate,
    /// Payment channel.
    pub method: PaymentMethod,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Operator performing the disbursement.
    pub created_by: Option<Uuid>,
}

/// Input for registering a repayment.
#[derive(Debug, Clone)]
pub struct RepayLoanInput {
    /// Loan being repaid.
    pub loan_id: Uuid,
    /// Funding account the money enters.
    pub company_account_id: Uuid,
    /// Amount the member paid.
    pub amount: Decimal,
    /// Repayment mode the operator chose.
    pub mode: RepaymentMode,
    /// Date the payment was made.
    pub payment_date: NaiveDate,
    /// Payment channel.
    pub method: PaymentMethod,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Operator registering the payment.
    pub created_by: Option<Uuid>,
}

/// A loan together with its current cycle quote.
#[derive(Debug, Clone)]
pub struct LoanWithQuote {
    /// The loan row.
    pub loan: loans::Model,
    /// Quote for the loan's current billing cycle.
    pub quote: CycleQuote,
}

/// Repository for loans and their money-moving operations.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    db: DatabaseConnection,
}

impl LoanRepository {
    /// Creates a new loan repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a loan application in `pending` status.
    ///
    /// # Errors
    ///
    /// Returns an error if the member or interest product is missing, the
    /// principal or term is not positive, or the database operation fails.
    pub async fn create(&self, input: CreateLoanInput) -> Result<loans::Model, RepoError> {
        if input.principal_amount <= Decimal::ZERO {
            return Err(LoanError::InvalidAmount.into());
        }
        if input.term_periods <= 0 {
            return Err(LoanError::InvalidTerm.into());
        }

        members::Entity::find_by_id(input.member_id)
            .one(&self.db)
            .await?
            .ok_or(RepoError::MemberNotFound(input.member_id))?;
        interest_products::Entity::find_by_id(input.interest_product_id)
            .one(&self.db)
            .await?
            .ok_or(RepoError::InterestProductNotFound(input.interest_product_id))?;

        let now = Utc::now().into();
        let loan = loans::ActiveModel {
            id: Set(Uuid::new_v4()),
            member_id: Set(input.member_id),
            loan_product_id: Set(input.loan_product_id),
            interest_product_id: Set(input.interest_product_id),
            principal_amount: Set(input.principal_amount),
            term_periods: Set(input.term_periods),
            period_type: Set(input.period_type.as_str().to_owned()),
            payment_per_period: Set(input.payment_per_period),
            release_date: Set(None),
            first_payment_date: Set(input.first_payment_date),
            disburse_method: Set(input.disburse_method.as_str().to_owned()),
            company_account_id: Set(None),
            purpose: Set(input.purpose),
            remarks: Set(input.remarks),
            status: Set(LoanStatus::Pending.as_str().to_owned()),
            created_by: Set(input.created_by),
            approved_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(loan_id = %loan.id, member_id = %loan.member_id, "loan registered");
        Ok(loan)
    }

    /// Finds a loan by id.
    ///
    /// # Errors
    ///
    /// Returns `LoanNotFound` if no such loan exists.
    pub async fn find(&self, loan_id: Uuid) -> Result<loans::Model, RepoError> {
        loans::Entity::find_by_id(loan_id)
            .one(&self.db)
            .await?
            .ok_or(RepoError::LoanNotFound(loan_id))
    }

    /// Lists loans with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, filter: LoanFilter) -> Result<Vec<loans::Model>, RepoError> {
        let mut query = loans::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(loans::Column::Status.eq(status.as_str()));
        }
        if let Some(member_id) = filter.member_id {
            query = query.filter(loans::Column::MemberId.eq(member_id));
        }
        let loans = query
            .order_by_desc(loans::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(loans)
    }

    /// Approves a pending loan.
    ///
    /// # Errors
    ///
    /// Returns an error if the loan is missing, not pending, or the database
    /// operation fails.
    pub async fn approve(
        &self,
        loan_id: Uuid,
        approved_by: Option<Uuid>,
    ) -> Result<loans::Model, RepoError> {
        let loan = self
            .transition(loan_id, LoanStatus::Approved, |active| {
                active.approved_by = Set(approved_by);
            })
            .await?;
        tracing::info!(loan_id = %loan.id, "loan approved");
        Ok(loan)
    }

    /// Rejects a pending loan, moving it to `cancelled`.
    ///
    /// No actor is recorded for a rejection.
    ///
    /// # Errors
    ///
    /// Returns an error if the loan is missing, not pending, or the database
    /// operation fails.
    pub async fn reject(&self, loan_id: Uuid) -> Result<loans::Model, RepoError> {
        let loan = self.transition(loan_id, LoanStatus::Cancelled, |_| {}).await?;
        tracing::info!(loan_id = %loan.id, "loan rejected");
        Ok(loan)
    }

    /// Pays an approved loan out of a funding account.
    ///
    /// One atomic unit: validates against locked rows, records the
    /// disbursement, writes the OUT ledger entry, moves the account balance,
    /// and anchors the first billing cycle on the loan.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails (wrong status, repeat
    /// disbursement, insufficient funds) or the database operation fails.
    pub async fn disburse(
        &self,
        input: DisburseLoanInput,
    ) -> Result<loan_disbursements::Model, RepoError> {
        let txn = self.db.begin().await?;

        let loan = Self::find_for_update(&txn, input.loan_id).await?;
        let status = Self::status_of(&loan)?;

        let account = AccountRepository::find_for_update(&txn, input.company_account_id).await?;
        if !account.is_active {
            return Err(RepoError::AccountInactive(account.id));
        }

        let has_disbursement = loan_disbursements::Entity::find()
            .filter(loan_disbursements::Column::LoanId.eq(loan.id))
            .count(&txn)
            .await?
            > 0;

        DisbursementHandler::validate(status, has_disbursement, input.amount, account.balance)?;

        let now = Utc::now().into();
        let disbursement = loan_disbursements::ActiveModel {
            id: Set(Uuid::new_v4()),
            loan_id: Set(loan.id),
            company_account_id: Set(account.id),
            disburse_date: Set(input.disburse_date),
            amount: Set(input.amount),
            method: Set(input.method.as_str().to_owned()),
            notes: Set(input.notes),
            created_by: Set(input.created_by),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        recorder::post(
            &txn,
            recorder::Entry {
                direction: TxDirection::Out,
                source: TxSource::LoanDisbursement,
                source_id: Some(disbursement.id),
                tx_date: input.disburse_date,
                description: format!("Loan disbursement - loan {}", loan.id),
                amount: input.amount,
                created_by: input.created_by,
                account: &account,
            },
        )
        .await?;

        let cycle = DisbursementHandler::first_cycle(input.disburse_date, loan.first_payment_date);
        let mut active: loans::ActiveModel = loan.into();
        active.status = Set(LoanStatus::Disbursed.as_str().to_owned());
        active.release_date = Set(Some(cycle.release_date));
        active.first_payment_date = Set(Some(cycle.first_payment_date));
        active.company_account_id = Set(Some(account.id));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await.map_err(RepoError::from_commit)?;

        tracing::info!(
            loan_id = %disbursement.loan_id,
            account_id = %account.id,
            amount = %disbursement.amount,
            "loan disbursed"
        );
        Ok(disbursement)
    }

    /// Registers a repayment against a disbursed loan.
    ///
    /// One atomic unit: allocates the amount against locked rows, records
    /// the repayment, writes the IN ledger entry, moves the account balance,
    /// and applies the cycle action (renewal or closure) to the loan.
    ///
    /// # Errors
    ///
    /// Returns an error if the allocator rejects the amount for the chosen
    /// mode, the loan or account is missing, or the database operation fails.
    pub async fn repay(
        &self,
        input: RepayLoanInput,
    ) -> Result<loan_repayments::Model, RepoError> {
        let txn = self.db.begin().await?;

        let loan = Self::find_for_update(&txn, input.loan_id).await?;
        let status = Self::status_of(&loan)?;

        let account = AccountRepository::find_for_update(&txn, input.company_account_id).await?;
        if !account.is_active {
            return Err(RepoError::AccountInactive(account.id));
        }

        let rate = Self::cycle_rate(&txn, &loan).await?;
        let terms = Self::terms_for(&loan, rate);
        let history = Self::history(&txn, loan.id, Some(input.payment_date)).await?;

        let allocation = RepaymentAllocator::allocate(
            status,
            &terms,
            &history,
            input.amount,
            input.mode,
            input.payment_date,
        )?;

        let now = Utc::now().into();
        let repayment = loan_repayments::ActiveModel {
            id: Set(Uuid::new_v4()),
            loan_id: Set(loan.id),
            company_account_id: Set(account.id),
            payment_date: Set(input.payment_date),
            amount: Set(input.amount),
            interest_amount: Set(allocation.interest_amount),
            principal_amount: Set(allocation.principal_amount),
            principal_balance_after: Set(allocation.principal_balance_after),
            mode: Set(input.mode.as_str().to_owned()),
            method: Set(input.method.as_str().to_owned()),
            notes: Set(input.notes),
            created_by: Set(input.created_by),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        recorder::post(
            &txn,
            recorder::Entry {
                direction: TxDirection::In,
                source: TxSource::LoanRepayment,
                source_id: Some(repayment.id),
                tx_date: input.payment_date,
                description: format!("Loan repayment - loan {}", loan.id),
                amount: input.amount,
                created_by: input.created_by,
                account: &account,
            },
        )
        .await?;

        let mut active: loans::ActiveModel = loan.into();
        if allocation.closes_loan {
            status.validate_transition(LoanStatus::Closed)?;
            active.status = Set(LoanStatus::Closed.as_str().to_owned());
        }
        if let Some(cycle) = allocation.renews_cycle {
            active.release_date = Set(Some(cycle.release_date));
            active.first_payment_date = Set(Some(cycle.first_payment_date));
        }
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await.map_err(RepoError::from_commit)?;

        tracing::info!(
            loan_id = %repayment.loan_id,
            mode = input.mode.as_str(),
            amount = %repayment.amount,
            interest = %repayment.interest_amount,
            principal = %repayment.principal_amount,
            closed = allocation.closes_loan,
            "loan repayment registered"
        );
        Ok(repayment)
    }

    /// Quotes a loan's current billing cycle without touching any state.
    ///
    /// When `as_of` is given, only payments on or before that date count.
    ///
    /// # Errors
    ///
    /// Returns an error if the loan or its interest product is missing.
    pub async fn quote_cycle(
        &self,
        loan_id: Uuid,
        as_of: Option<NaiveDate>,
    ) -> Result<LoanWithQuote, RepoError> {
        let loan = self.find(loan_id).await?;
        let rate = {
            let product = interest_products::Entity::find_by_id(loan.interest_product_id)
                .one(&self.db)
                .await?
                .ok_or(RepoError::InterestProductNotFound(loan.interest_product_id))?;
            product.rate
        };
        let terms = Self::terms_for(&loan, rate);

        let mut query = loan_repayments::Entity::find()
            .filter(loan_repayments::Column::LoanId.eq(loan.id));
        if let Some(cutoff) = as_of {
            query = query.filter(loan_repayments::Column::PaymentDate.lte(cutoff));
        }
        let rows = query
            .order_by_asc(loan_repayments::Column::PaymentDate)
            .order_by_asc(loan_repayments::Column::CreatedAt)
            .all(&self.db)
            .await?;
        let history: Vec<RepaymentRecord> = rows
            .iter()
            .map(Self::record_of)
            .collect::<Result<_, _>>()?;

        let quote = AccrualCalculator::quote(&terms, &history);
        Ok(LoanWithQuote { loan, quote })
    }

    /// Lists a loan's repayments in payment order.
    ///
    /// # Errors
    ///
    /// Returns `LoanNotFound` if no such loan exists.
    pub async fn list_repayments(
        &self,
        loan_id: Uuid,
    ) -> Result<Vec<loan_repayments::Model>, RepoError> {
        self.find(loan_id).await?;
        let rows = loan_repayments::Entity::find()
            .filter(loan_repayments::Column::LoanId.eq(loan_id))
            .order_by_asc(loan_repayments::Column::PaymentDate)
            .order_by_asc(loan_repayments::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    /// Applies a workflow transition under an exclusive lock on the loan row.
    async fn transition(
        &self,
        loan_id: Uuid,
        to: LoanStatus,
        set_extra: impl FnOnce(&mut loans::ActiveModel),
    ) -> Result<loans::Model, RepoError> {
        let txn = self.db.begin().await?;

        let loan = Self::find_for_update(&txn, loan_id).await?;
        let status = Self::status_of(&loan)?;
        status.validate_transition(to)?;

        let mut active: loans::ActiveModel = loan.into();
        active.status = Set(to.as_str().to_owned());
        active.updated_at = Set(Utc::now().into());
        set_extra(&mut active);
        let updated = active.update(&txn).await?;

        txn.commit().await.map_err(RepoError::from_commit)?;
        Ok(updated)
    }

    /// Loads a loan row under an exclusive lock.
    async fn find_for_update(
        txn: &DatabaseTransaction,
        loan_id: Uuid,
    ) -> Result<loans::Model, RepoError> {
        loans::Entity::find_by_id(loan_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(RepoError::LoanNotFound(loan_id))
    }

    /// Parses the stored status string.
    fn status_of(loan: &loans::Model) -> Result<LoanStatus, RepoError> {
        LoanStatus::parse(&loan.status).ok_or_else(|| RepoError::CorruptValue {
            table: "loans",
            column: "status",
            value: loan.status.clone(),
        })
    }

    /// The cycle rate from the loan's interest product.
    async fn cycle_rate(
        txn: &DatabaseTransaction,
        loan: &loans::Model,
    ) -> Result<Decimal, RepoError> {
        let product = interest_products::Entity::find_by_id(loan.interest_product_id)
            .one(txn)
            .await?
            .ok_or(RepoError::InterestProductNotFound(loan.interest_product_id))?;
        Ok(product.rate)
    }

    fn terms_for(loan: &loans::Model, rate: Decimal) -> LoanTerms {
        LoanTerms {
            principal_amount: loan.principal_amount,
            interest_rate: rate,
            release_date: loan.release_date,
            first_payment_date: loan.first_payment_date,
        }
    }

    /// Maps a stored repayment row into the calculator's record form.
    fn record_of(row: &loan_repayments::Model) -> Result<RepaymentRecord, RepoError> {
        let mode = RepaymentMode::parse(&row.mode).ok_or_else(|| RepoError::CorruptValue {
            table: "loan_repayments",
            column: "mode",
            value: row.mode.clone(),
        })?;
        Ok(RepaymentRecord {
            payment_date: row.payment_date,
            amount: row.amount,
            interest_amount: row.interest_amount,
            principal_amount: row.principal_amount,
            mode,
        })
    }

    /// Loads repayment history in `(payment_date, created_at)` order,
    /// optionally cut off at a date.
    async fn history(
        txn: &DatabaseTransaction,
        loan_id: Uuid,
        up_to: Option<NaiveDate>,
    ) -> Result<Vec<RepaymentRecord>, RepoError> {
        let mut query =
            loan_repayments::Entity::find().filter(loan_repayments::Column::LoanId.eq(loan_id));
        if let Some(cutoff) = up_to {
            query = query.filter(loan_repayments::Column::PaymentDate.lte(cutoff));
        }
        let rows = query
            .order_by_asc(loan_repayments::Column::PaymentDate)
            .order_by_asc(loan_repayments::Column::CreatedAt)
            .all(txn)
            .await?;
        rows.iter().map(Self::record_of).collect()
    }
}
