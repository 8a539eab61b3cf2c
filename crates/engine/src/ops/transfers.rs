use serde::{Deserialize, Serialize};

use crate::{
    Account, AddAccountBalanceParams, CreateEntryParams, CreateTransferParams, Engine,
    EngineError, Entry, Page, ResultEngine, Transfer, TransferFilter,
    lock_order::{Side, transfer_lock_order},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Minor units, must be > 0.
    pub amount: i64,
}

/// Everything a committed transfer wrote.
///
/// `from_account` and `to_account` are the rows as returned by the balance
/// updates, so they include every transfer committed before this one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxResult {
    pub transfer: Transfer,
    pub from_entry: Entry,
    pub to_entry: Entry,
    pub from_account: Account,
    pub to_account: Account,
}

fn validate_transfer(params: &TransferTxParams) -> ResultEngine<()> {
    if params.amount <= 0 {
        return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
    }
    if params.from_account_id == params.to_account_id {
        return Err(EngineError::InvalidTransfer(
            "from_account_id and to_account_id must differ".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Moves `amount` from one account to another in a single transaction.
    ///
    /// Writes the transfer row, a debit entry, a credit entry and both
    /// balance updates. Either all of them commit or none do. The balance
    /// updates are issued lowest account id first (see
    /// [`lock_order`](crate::lock_order)).
    ///
    /// Conflicts reported by the store are returned as-is; the call is not
    /// retried and is not idempotent.
    pub async fn transfer_tx(&self, params: TransferTxParams) -> ResultEngine<TransferTxResult> {
        validate_transfer(&params)?;
        let TransferTxParams {
            from_account_id,
            to_account_id,
            amount,
        } = params;

        let result = self
            .exec_tx(move |q| {
                Box::pin(async move {
                    let transfer = q
                        .create_transfer(CreateTransferParams {
                            from_account_id,
                            to_account_id,
                            amount,
                        })
                        .await?;
                    let from_entry = q
                        .create_entry(CreateEntryParams {
                            account_id: from_account_id,
                            amount: -amount,
                        })
                        .await?;
                    let to_entry = q
                        .create_entry(CreateEntryParams {
                            account_id: to_account_id,
                            amount,
                        })
                        .await?;

                    let mut from_account = None;
                    let mut to_account = None;
                    for side in transfer_lock_order(from_account_id, to_account_id) {
                        match side {
                            Side::From => {
                                from_account = Some(
                                    q.add_account_balance(AddAccountBalanceParams {
                                        account_id: from_account_id,
                                        delta: -amount,
                                    })
                                    .await?,
                                );
                            }
                            Side::To => {
                                to_account = Some(
                                    q.add_account_balance(AddAccountBalanceParams {
                                        account_id: to_account_id,
                                        delta: amount,
                                    })
                                    .await?,
                                );
                            }
                        }
                    }
                    let (Some(from_account), Some(to_account)) = (from_account, to_account)
                    else {
                        return Err(EngineError::KeyNotFound(
                            "transfer accounts not updated".to_string(),
                        ));
                    };

                    Ok(TransferTxResult {
                        transfer,
                        from_entry,
                        to_entry,
                        from_account,
                        to_account,
                    })
                })
            })
            .await?;

        tracing::info!(
            transfer_id = result.transfer.id,
            from_account_id,
            to_account_id,
            amount,
            "transfer committed"
        );
        Ok(result)
    }

    pub async fn transfer(&self, id: i64) -> ResultEngine<Transfer> {
        self.queries().transfer(id).await
    }

    pub async fn list_transfers(
        &self,
        filter: TransferFilter,
        page: Page,
    ) -> ResultEngine<Vec<Transfer>> {
        self.queries().list_transfers(filter, page).await
    }
}
