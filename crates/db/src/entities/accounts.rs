//! `SeaORM` Entity for accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AccountType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub account_type: AccountType,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction_entries::Entity")]
    TransactionEntries,
    #[sea_orm(has_many = "super::tag_balances::Entity")]
    TagBalances,
}

impl Related<super::transaction_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionEntries.def()
    }
}

impl Related<super::tag_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TagBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
