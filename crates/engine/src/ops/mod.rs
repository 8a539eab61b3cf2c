use std::{future::Future, pin::Pin, time::Duration};

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::{EngineError, Queries, ResultEngine};

mod accounts;
mod transfers;

pub use transfers::{TransferTxParams, TransferTxResult};

/// Future returned by a unit of work passed to [`Engine::exec_tx`].
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = ResultEngine<T>> + Send + 'c>>;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    tx_timeout: Option<Duration>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Accessors that run each statement outside any explicit transaction.
    pub fn queries(&self) -> Queries<'_, DatabaseConnection> {
        Queries::new(&self.database)
    }

    /// Runs `work` inside a database transaction.
    ///
    /// Commits when `work` returns `Ok`, rolls back when it returns `Err`.
    /// If the rollback fails too, both failures are reported through
    /// [`EngineError::Rollback`].
    ///
    /// With a configured timeout the whole begin/work/commit sequence must
    /// finish in time. Otherwise the in-flight transaction is dropped, which
    /// rolls it back, and [`EngineError::Timeout`] is returned. Dropping the
    /// returned future has the same effect.
    ///
    /// ```no_run
    /// # use engine::{Engine, CreateAccountParams, Currency, ResultEngine};
    /// # async fn run(engine: &Engine) -> ResultEngine<()> {
    /// let params = CreateAccountParams {
    ///     owner: "alice".to_string(),
    ///     balance: 0,
    ///     currency: Currency::Usd,
    /// };
    /// let _account = engine
    ///     .exec_tx(|q| Box::pin(async move { q.create_account(&params).await }))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn exec_tx<T, F>(&self, work: F) -> ResultEngine<T>
    where
        T: Send,
        F: for<'c> FnOnce(Queries<'c, DatabaseTransaction>) -> TxFuture<'c, T> + Send,
    {
        match self.tx_timeout {
            Some(limit) => tokio::time::timeout(limit, self.run_tx(work))
                .await
                .map_err(|_| {
                    tracing::warn!(timeout = ?limit, "transaction deadline elapsed, rolled back");
                    EngineError::Timeout(limit)
                })?,
            None => self.run_tx(work).await,
        }
    }

    async fn run_tx<T, F>(&self, work: F) -> ResultEngine<T>
    where
        T: Send,
        F: for<'c> FnOnce(Queries<'c, DatabaseTransaction>) -> TxFuture<'c, T> + Send,
    {
        let db_tx = self.database.begin().await?;
        tracing::debug!("transaction started");

        let outcome = work(Queries::new(&db_tx)).await;
        match outcome {
            Ok(value) => {
                db_tx.commit().await?;
                tracing::debug!("transaction committed");
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(error = %err, "rolling back transaction");
                match db_tx.rollback().await {
                    Ok(()) => Err(err),
                    Err(rollback) => {
                        tracing::error!(error = %err, rollback = %rollback, "rollback failed");
                        Err(EngineError::Rollback {
                            source: Box::new(err),
                            rollback,
                        })
                    }
                }
            }
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    tx_timeout: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Deadline applied to every transaction run by the engine.
    pub fn tx_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.tx_timeout = Some(timeout);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            tx_timeout: self.tx_timeout,
        })
    }
}
