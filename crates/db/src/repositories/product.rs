//! Product repository: interest products and loan products.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use salama_core::loan::{LoanError, PeriodType};

use super::RepoError;
use crate::entities::{interest_products, loan_products};

/// Input for creating an interest product.
#[derive(Debug, Clone)]
pub struct CreateInterestProductInput {
    /// Display name, e.g. "Standard 10% monthly".
    pub name: String,
    /// Percent charged per cycle.
    pub rate: Decimal,
    /// Period unit the rate applies to.
    pub period_type: PeriodType,
}

/// Input for creating a loan product.
#[derive(Debug, Clone)]
pub struct CreateLoanProductInput {
    /// Display name.
    pub name: String,
    /// What the product is for.
    pub description: Option<String>,
}

/// Repository for the product catalogue.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an interest product.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is negative or the database operation
    /// fails.
    pub async fn create_interest_product(
        &self,
        input: CreateInterestProductInput,
    ) -> Result<interest_products::Model, RepoError> {
        if input.rate < Decimal::ZERO {
            return Err(LoanError::InvalidAmount.into());
        }

        let product = interest_products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            rate: Set(input.rate),
            period_type: Set(input.period_type.as_str().to_owned()),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(product_id = %product.id, rate = %product.rate, "interest product created");
        Ok(product)
    }

    /// Creates a loan product.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_loan_product(
        &self,
        input: CreateLoanProductInput,
    ) -> Result<loan_products::Model, RepoError> {
        let product = loan_products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(product_id = %product.id, "loan product created");
        Ok(product)
    }

    /// Lists active interest products, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_interest_products(
        &self,
    ) -> Result<Vec<interest_products::Model>, RepoError> {
        let products = interest_products::Entity::find()
            .filter(interest_products::Column::IsActive.eq(true))
            .order_by_desc(interest_products::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(products)
    }

    /// Lists active loan products, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_loan_products(&self) -> Result<Vec<loan_products::Model>, RepoError> {
        let products = loan_products::Entity::find()
            .filter(loan_products::Column::IsActive.eq(true))
            .order_by_desc(loan_products::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(products)
    }
}
