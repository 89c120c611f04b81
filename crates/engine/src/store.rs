//! Persistence backends.
//!
//! The engine keeps the authoritative state in memory and writes through to
//! exactly one [`LedgerStore`] before reporting success to the caller. The
//! SQL backend wraps every operation in a database transaction; the JSON
//! backend rewrites whole files and swaps them in atomically. Either way a
//! failed save means a failed operation: the in-memory state is only touched
//! after the backend commits.

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use crate::json_store::JsonStore;
use crate::{
    Account, Client, NewClient, ResultEngine, Transaction, TransactionFilter, accounts, clients,
    transactions,
};

/// The selected persistence backend.
pub enum LedgerStore {
    Sql(SqlStore),
    Json(JsonStore),
}

impl LedgerStore {
    /// A relational backend on an already connected (and migrated) database.
    pub fn sql(db: DatabaseConnection) -> Self {
        Self::Sql(SqlStore { db })
    }

    /// A file backend rooted at `dir`, loading any existing data files.
    pub async fn json(dir: impl Into<std::path::PathBuf>) -> ResultEngine<Self> {
        Ok(Self::Json(JsonStore::open(dir.into()).await?))
    }

    pub(crate) async fn load_accounts(&self) -> ResultEngine<Vec<Account>> {
        match self {
            Self::Sql(store) => store.load_accounts().await,
            Self::Json(store) => Ok(store.load_accounts().await),
        }
    }

    pub(crate) async fn max_transaction_id(&self) -> ResultEngine<i64> {
        match self {
            Self::Sql(store) => store.max_transaction_id().await,
            Self::Json(store) => Ok(store.max_transaction_id().await),
        }
    }

    /// Persists the balance update(s) and the transaction that caused them as
    /// one unit.
    pub(crate) async fn persist_operation(
        &self,
        updates: &[Account],
        tx: &Transaction,
    ) -> ResultEngine<()> {
        match self {
            Self::Sql(store) => store.persist_operation(updates, tx).await,
            Self::Json(store) => store.persist_operation(updates, tx).await,
        }
    }

    pub(crate) async fn insert_account(&self, account: &Account) -> ResultEngine<()> {
        match self {
            Self::Sql(store) => store.insert_account(account).await,
            Self::Json(store) => store.insert_account(account).await,
        }
    }

    pub(crate) async fn update_account(&self, account: &Account) -> ResultEngine<()> {
        match self {
            Self::Sql(store) => store.update_account(account).await,
            Self::Json(store) => store.update_account(account).await,
        }
    }

    pub(crate) async fn transaction(&self, id: i64) -> ResultEngine<Option<Transaction>> {
        match self {
            Self::Sql(store) => store.transaction(id).await,
            Self::Json(store) => Ok(store.transaction(id).await),
        }
    }

    pub(crate) async fn transactions(
        &self,
        filter: &TransactionFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        match self {
            Self::Sql(store) => store.transactions(filter).await,
            Self::Json(store) => Ok(store.transactions(filter).await),
        }
    }

    pub(crate) async fn insert_client(&self, client: NewClient) -> ResultEngine<Client> {
        match self {
            Self::Sql(store) => store.insert_client(client).await,
            Self::Json(store) => store.insert_client(client).await,
        }
    }

    pub(crate) async fn client(&self, id: i64) -> ResultEngine<Option<Client>> {
        match self {
            Self::Sql(store) => store.client(id).await,
            Self::Json(store) => Ok(store.client(id).await),
        }
    }

    pub(crate) async fn clients(&self) -> ResultEngine<Vec<Client>> {
        match self {
            Self::Sql(store) => store.clients().await,
            Self::Json(store) => Ok(store.clients().await),
        }
    }

    pub(crate) async fn client_exists(&self, id: i64) -> ResultEngine<bool> {
        Ok(self.client(id).await?.is_some())
    }
}

/// sea-orm backend.
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    async fn load_accounts(&self) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find().all(&self.db).await?;
        models.into_iter().map(Account::try_from).collect()
    }

    async fn max_transaction_id(&self) -> ResultEngine<i64> {
        let latest = transactions::Entity::find()
            .order_by_desc(transactions::Column::Id)
            .one(&self.db)
            .await?;
        Ok(latest.map(|model| model.id).unwrap_or(0))
    }

    async fn persist_operation(&self, updates: &[Account], tx: &Transaction) -> ResultEngine<()> {
        let db_tx = self.db.begin().await?;

        for account in updates {
            let model = accounts::ActiveModel {
                number: ActiveValue::Set(account.number.clone()),
                balance_minor: ActiveValue::Set(account.balance.cents()),
                ..Default::default()
            };
            model.update(&db_tx).await?;
        }
        transactions::ActiveModel::from(tx).insert(&db_tx).await?;

        db_tx.commit().await?;
        Ok(())
    }

    async fn insert_account(&self, account: &Account) -> ResultEngine<()> {
        accounts::ActiveModel::from(account).insert(&self.db).await?;
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> ResultEngine<()> {
        accounts::ActiveModel::from(account).update(&self.db).await?;
        Ok(())
    }

    async fn transaction(&self, id: i64) -> ResultEngine<Option<Transaction>> {
        let model = transactions::Entity::find_by_id(id).one(&self.db).await?;
        model.map(Transaction::try_from).transpose()
    }

    async fn transactions(&self, filter: &TransactionFilter) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find().order_by_asc(transactions::Column::Id);

        if let Some(account) = &filter.account {
            query = query.filter(
                Condition::any()
                    .add(transactions::Column::SourceAccount.eq(account.as_str()))
                    .add(transactions::Column::DestinationAccount.eq(account.as_str())),
            );
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let models = query.all(&self.db).await?;
        models.into_iter().map(Transaction::try_from).collect()
    }

    async fn insert_client(&self, client: NewClient) -> ResultEngine<Client> {
        let model = clients::ActiveModel::from(&client).insert(&self.db).await?;
        Ok(Client::from(model))
    }

    async fn client(&self, id: i64) -> ResultEngine<Option<Client>> {
        let model = clients::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Client::from))
    }

    async fn clients(&self) -> ResultEngine<Vec<Client>> {
        let models = clients::Entity::find()
            .order_by_asc(clients::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Client::from).collect())
    }
}
