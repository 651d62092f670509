//! Tag repository.

use chrono::Utc;
use ledgerly_core::ledger::LedgerError;
use ledgerly_core::tags::Tag;
use ledgerly_shared::types::TagId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};

use super::mapping::{store_err, tag_from_model};
use crate::entities::tags;

/// Input for creating a tag.
#[derive(Debug, Clone)]
pub struct CreateTagInput {
    /// Unique tag name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional display color.
    pub color: Option<String>,
}

/// Tag repository.
#[derive(Debug, Clone)]
pub struct TagRepository {
    db: DatabaseConnection,
}

impl TagRepository {
    /// Creates a new tag repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a tag.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEntry` for a blank or already used name.
    pub async fn create_tag(&self, input: CreateTagInput) -> Result<Tag, LedgerError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(LedgerError::InvalidEntry("tag name must not be empty".to_string()));
        }

        let result = tags::ActiveModel {
            id: Set(TagId::new().into_inner()),
            name: Set(name.clone()),
            description: Set(input.description),
            color: Set(input.color),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(model) => Ok(tag_from_model(model)),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                LedgerError::InvalidEntry(format!("tag '{name}' already exists")),
            ),
            Err(err) => Err(store_err(err)),
        }
    }

    /// Finds a tag by ID.
    pub async fn find_by_id(&self, id: TagId) -> Result<Option<Tag>, LedgerError> {
        Ok(tags::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map(tag_from_model))
    }

    /// Finds a tag by its unique name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, LedgerError> {
        Ok(tags::Entity::find()
            .filter(tags::Column::Name.eq(name.trim()))
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map(tag_from_model))
    }

    /// Lists every tag by name.
    pub async fn list(&self) -> Result<Vec<Tag>, LedgerError> {
        Ok(tags::Entity::find()
            .order_by_asc(tags::Column::Name)
            .all(&self.db)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(tag_from_model)
            .collect())
    }
}
