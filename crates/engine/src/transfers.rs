//! Transfers.
//!
//! A [`Transfer`] records that `amount` minor units moved from one account to
//! another. The row is written once, in the same database transaction as its
//! two entries and both balance updates.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransferParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

/// Selects transfers touching the given accounts.
///
/// A transfer matches when its `from_account_id` equals `from_account_id`
/// **or** its `to_account_id` equals `to_account_id`. An empty filter
/// matches every transfer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFilter {
    pub from_account_id: Option<i64>,
    pub to_account_id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::FromAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    FromAccount,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::ToAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ToAccount,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<CreateTransferParams> for ActiveModel {
    fn from(params: CreateTransferParams) -> Self {
        Self {
            id: ActiveValue::NotSet,
            from_account_id: ActiveValue::Set(params.from_account_id),
            to_account_id: ActiveValue::Set(params.to_account_id),
            amount: ActiveValue::Set(params.amount),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

impl From<Model> for Transfer {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            from_account_id: model.from_account_id,
            to_account_id: model.to_account_id,
            amount: model.amount,
            created_at: model.created_at,
        }
    }
}
