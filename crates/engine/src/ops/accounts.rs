use crate::{Account, CreateAccountParams, Engine, Entry, Page, ResultEngine};

impl Engine {
    pub async fn create_account(&self, params: CreateAccountParams) -> ResultEngine<Account> {
        let account = self.queries().create_account(&params).await?;
        tracing::debug!(account_id = account.id, owner = %account.owner, "account created");
        Ok(account)
    }

    pub async fn account(&self, id: i64) -> ResultEngine<Account> {
        self.queries().account(id).await
    }

    pub async fn entry(&self, id: i64) -> ResultEngine<Entry> {
        self.queries().entry(id).await
    }

    pub async fn list_entries(&self, account_id: i64, page: Page) -> ResultEngine<Vec<Entry>> {
        self.queries().list_entries(account_id, page).await
    }
}
