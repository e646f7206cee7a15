//! Member repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::RepoError;
use crate::entities::members;

/// Input for registering a member.
#[derive(Debug, Clone)]
pub struct CreateMemberInput {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone number.
    pub phone: Option<String>,
}

/// Repository for borrowing members.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    db: DatabaseConnection,
}

impl MemberRepository {
    /// Creates a new member repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(&self, input: CreateMemberInput) -> Result<members::Model, RepoError> {
        let now = Utc::now().into();
        let member = members::ActiveModel {
            id: Set(Uuid::new_v4()),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            phone: Set(input.phone),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(member_id = %member.id, "member registered");
        Ok(member)
    }

    /// Finds a member by id.
    ///
    /// # Errors
    ///
    /// Returns `MemberNotFound` if no such member exists.
    pub async fn find(&self, member_id: Uuid) -> Result<members::Model, RepoError> {
        members::Entity::find_by_id(member_id)
            .one(&self.db)
            .await?
            .ok_or(RepoError::MemberNotFound(member_id))
    }

    /// Lists active members, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_active(&self) -> Result<Vec<members::Model>, RepoError> {
        let members = members::Entity::find()
            .filter(members::Column::IsActive.eq(true))
            .order_by_desc(members::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(members)
    }
}
