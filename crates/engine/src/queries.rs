//! Row accessors shared by auto-commit calls and transactions.
//!
//! [`Queries`] wraps anything implementing [`ConnectionTrait`]: a
//! `DatabaseConnection` runs each statement on its own, a
//! `DatabaseTransaction` makes every statement part of that transaction.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};
use serde::{Deserialize, Serialize};

use crate::{
    Account, AddAccountBalanceParams, CreateAccountParams, CreateEntryParams,
    CreateTransferParams, Entry, EngineError, ResultEngine, Transfer, TransferFilter, accounts,
    entries, transfers,
};

/// Limit/offset pagination for list accessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

#[derive(Debug)]
pub struct Queries<'c, C> {
    conn: &'c C,
}

impl<C> Clone for Queries<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Queries<'_, C> {}

impl<'c, C> Queries<'c, C>
where
    C: ConnectionTrait,
{
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub async fn create_account(&self, params: &CreateAccountParams) -> ResultEngine<Account> {
        let model = accounts::ActiveModel::from(params).insert(self.conn).await?;
        Account::try_from(model)
    }

    pub async fn account(&self, id: i64) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("account {id}")))?;
        Account::try_from(model)
    }

    /// Adds `delta` to the stored balance and returns the updated row.
    ///
    /// Runs as a single `UPDATE .. SET balance = balance + delta .. RETURNING`
    /// so concurrent writers cannot lose each other's updates. Inside a
    /// transaction the row stays locked until commit or rollback.
    pub async fn add_account_balance(
        &self,
        params: AddAccountBalanceParams,
    ) -> ResultEngine<Account> {
        let AddAccountBalanceParams { account_id, delta } = params;
        let model = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(delta),
            )
            .filter(accounts::Column::Id.eq(account_id))
            .exec_with_returning(self.conn)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::KeyNotFound(format!("account {account_id}")))?;
        Account::try_from(model)
    }

    pub async fn create_entry(&self, params: CreateEntryParams) -> ResultEngine<Entry> {
        let model = entries::ActiveModel::from(params).insert(self.conn).await?;
        Ok(model.into())
    }

    pub async fn entry(&self, id: i64) -> ResultEngine<Entry> {
        entries::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(Entry::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("entry {id}")))
    }

    pub async fn list_entries(&self, account_id: i64, page: Page) -> ResultEngine<Vec<Entry>> {
        let models = entries::Entity::find()
            .filter(entries::Column::AccountId.eq(account_id))
            .order_by_asc(entries::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(self.conn)
            .await?;
        Ok(models.into_iter().map(Entry::from).collect())
    }

    pub async fn create_transfer(&self, params: CreateTransferParams) -> ResultEngine<Transfer> {
        let model = transfers::ActiveModel::from(params)
            .insert(self.conn)
            .await?;
        Ok(model.into())
    }

    pub async fn transfer(&self, id: i64) -> ResultEngine<Transfer> {
        transfers::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(Transfer::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("transfer {id}")))
    }

    pub async fn list_transfers(
        &self,
        filter: TransferFilter,
        page: Page,
    ) -> ResultEngine<Vec<Transfer>> {
        let mut query = transfers::Entity::find();
        match (filter.from_account_id, filter.to_account_id) {
            (Some(from), Some(to)) => {
                query = query.filter(
                    transfers::Column::FromAccountId
                        .eq(from)
                        .or(transfers::Column::ToAccountId.eq(to)),
                );
            }
            (Some(from), None) => {
                query = query.filter(transfers::Column::FromAccountId.eq(from));
            }
            (None, Some(to)) => {
                query = query.filter(transfers::Column::ToAccountId.eq(to));
            }
            (None, None) => {}
        }
        let models = query
            .order_by_asc(transfers::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(self.conn)
            .await?;
        Ok(models.into_iter().map(Transfer::from).collect())
    }
}
