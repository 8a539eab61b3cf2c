//! Accounts.
//!
//! An [`Account`] holds a balance in signed integer **minor units** of its
//! [`Currency`]. Rows are created up front and afterwards only their
//! `balance` column changes, always through an atomic increment issued by a
//! transfer (see [`Queries::add_account_balance`](crate::Queries::add_account_balance)).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountParams {
    pub owner: String,
    pub balance: i64,
    pub currency: Currency,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAccountBalanceParams {
    pub account_id: i64,
    /// Signed change applied to the stored balance.
    pub delta: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CreateAccountParams> for ActiveModel {
    fn from(params: &CreateAccountParams) -> Self {
        Self {
            id: ActiveValue::NotSet,
            owner: ActiveValue::Set(params.owner.clone()),
            balance: ActiveValue::Set(params.balance),
            currency: ActiveValue::Set(params.currency.code().to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let currency = Currency::try_from(model.currency.as_str())?;
        Ok(Self {
            id: model.id,
            owner: model.owner,
            balance: model.balance,
            currency,
            created_at: model.created_at,
        })
    }
}
