//! JSON file backend.
//!
//! Three files in a data directory, mirroring the legacy layout:
//! `cuentas.json`, `transacciones.json`, `clientes.json`. Every mutation
//! rewrites the affected file(s) to a temporary path and renames over the
//! old one, and only then updates the in-process copy, so readers never see
//! a partially written file and memory never runs ahead of disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::{
    Account, Client, EngineError, NewClient, ResultEngine, Transaction, TransactionFilter,
};

const ACCOUNTS_FILE: &str = "cuentas.json";
const TRANSACTIONS_FILE: &str = "transacciones.json";
const CLIENTS_FILE: &str = "clientes.json";

#[derive(Default)]
struct JsonState {
    accounts: HashMap<String, Account>,
    transactions: Vec<Transaction>,
    clients: Vec<Client>,
}

pub struct JsonStore {
    dir: PathBuf,
    state: RwLock<JsonState>,
}

impl JsonStore {
    pub(crate) async fn open(dir: PathBuf) -> ResultEngine<Self> {
        tokio::fs::create_dir_all(&dir).await?;

        let accounts: Vec<Account> = read_or_default(&dir.join(ACCOUNTS_FILE)).await?;
        let transactions: Vec<Transaction> = read_or_default(&dir.join(TRANSACTIONS_FILE)).await?;
        let clients: Vec<Client> = read_or_default(&dir.join(CLIENTS_FILE)).await?;

        let state = JsonState {
            accounts: accounts
                .into_iter()
                .map(|account| (account.number.clone(), account))
                .collect(),
            transactions,
            clients,
        };
        Ok(Self {
            dir,
            state: RwLock::new(state),
        })
    }

    /// Serializes `value` next to the target file; the rename is the commit.
    async fn stage_file<T: Serialize>(&self, name: &str, value: &T) -> ResultEngine<PathBuf> {
        let tmp = self.dir.join(format!("{name}.tmp"));
        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&tmp, bytes).await?;
        Ok(tmp)
    }

    async fn commit_file(&self, name: &str, tmp: PathBuf) -> ResultEngine<()> {
        tokio::fs::rename(tmp, self.dir.join(name)).await?;
        Ok(())
    }

    async fn write_file<T: Serialize>(&self, name: &str, value: &T) -> ResultEngine<()> {
        let tmp = self.stage_file(name, value).await?;
        self.commit_file(name, tmp).await
    }

    fn account_rows(accounts: &HashMap<String, Account>) -> Vec<&Account> {
        let mut rows: Vec<&Account> = accounts.values().collect();
        rows.sort_by(|a, b| a.number.cmp(&b.number));
        rows
    }

    pub(crate) async fn load_accounts(&self) -> Vec<Account> {
        self.state.read().await.accounts.values().cloned().collect()
    }

    pub(crate) async fn max_transaction_id(&self) -> i64 {
        self.state
            .read()
            .await
            .transactions
            .iter()
            .map(|tx| tx.id)
            .max()
            .unwrap_or(0)
    }

    pub(crate) async fn persist_operation(
        &self,
        updates: &[Account],
        tx: &Transaction,
    ) -> ResultEngine<()> {
        let mut state = self.state.write().await;

        let mut accounts = state.accounts.clone();
        for account in updates {
            accounts.insert(account.number.clone(), account.clone());
        }
        let mut transactions = state.transactions.clone();
        transactions.push(tx.clone());

        // Stage both files before renaming either, so a write failure leaves
        // the pair untouched.
        let staged_accounts = self
            .stage_file(ACCOUNTS_FILE, &Self::account_rows(&accounts))
            .await?;
        let staged_transactions = self.stage_file(TRANSACTIONS_FILE, &transactions).await?;
        self.commit_file(ACCOUNTS_FILE, staged_accounts).await?;
        self.commit_file(TRANSACTIONS_FILE, staged_transactions)
            .await?;

        state.accounts = accounts;
        state.transactions = transactions;
        Ok(())
    }

    pub(crate) async fn insert_account(&self, account: &Account) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        if state.accounts.contains_key(&account.number) {
            return Err(EngineError::DuplicateAccount(account.number.clone()));
        }

        let mut accounts = state.accounts.clone();
        accounts.insert(account.number.clone(), account.clone());
        self.write_file(ACCOUNTS_FILE, &Self::account_rows(&accounts))
            .await?;

        state.accounts = accounts;
        Ok(())
    }

    pub(crate) async fn update_account(&self, account: &Account) -> ResultEngine<()> {
        let mut state = self.state.write().await;
        if !state.accounts.contains_key(&account.number) {
            return Err(EngineError::AccountNotFound(account.number.clone()));
        }

        let mut accounts = state.accounts.clone();
        accounts.insert(account.number.clone(), account.clone());
        self.write_file(ACCOUNTS_FILE, &Self::account_rows(&accounts))
            .await?;

        state.accounts = accounts;
        Ok(())
    }

    pub(crate) async fn transaction(&self, id: i64) -> Option<Transaction> {
        self.state
            .read()
            .await
            .transactions
            .iter()
            .find(|tx| tx.id == id)
            .cloned()
    }

    pub(crate) async fn transactions(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        let state = self.state.read().await;
        let mut rows: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|tx| match &filter.account {
                Some(number) => {
                    tx.source_account == *number
                        || tx.destination_account.as_deref() == Some(number.as_str())
                }
                None => true,
            })
            .filter(|tx| filter.kind.is_none_or(|kind| tx.kind == kind))
            .cloned()
            .collect();
        rows.sort_by_key(|tx| tx.id);
        if let Some(limit) = filter.limit {
            rows.truncate(limit as usize);
        }
        rows
    }

    pub(crate) async fn insert_client(&self, client: NewClient) -> ResultEngine<Client> {
        let mut state = self.state.write().await;

        let id = state.clients.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let client = client.into_client(id, chrono::Utc::now());

        let mut clients = state.clients.clone();
        clients.push(client.clone());
        self.write_file(CLIENTS_FILE, &clients).await?;

        state.clients = clients;
        Ok(client)
    }

    pub(crate) async fn client(&self, id: i64) -> Option<Client> {
        self.state
            .read()
            .await
            .clients
            .iter()
            .find(|client| client.id == id)
            .cloned()
    }

    pub(crate) async fn clients(&self) -> Vec<Client> {
        self.state.read().await.clients.clone()
    }
}

async fn read_or_default<T: DeserializeOwned>(path: &Path) -> ResultEngine<Vec<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(err.into()),
    }
}
