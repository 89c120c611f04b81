//! Account ledger core.
//!
//! The [`Engine`] is the only component that moves money. Every operation is
//! validated and applied under per-account locks, recorded in the append-only
//! transaction log, and written through to the persistence backend before the
//! caller sees success.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

pub use accounts::{Account, AccountFilter, AccountKind, AccountStatus, DEFAULT_CREDIT_LIMIT};
pub use clients::{Client, NewClient};
pub use error::EngineError;
pub use money::Money;
pub use store::LedgerStore;
pub use transactions::{Transaction, TransactionFilter, TransactionKind};

mod accounts;
mod clients;
mod error;
mod json_store;
mod money;
mod store;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

/// How long an operation waits for an account lock before giving up with
/// [`EngineError::OperationTimeout`].
const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(5);

/// How many account numbers to generate before giving up on a unique one.
const MAX_NUMBER_ATTEMPTS: u32 = 16;

/// Balance movement on one account, as observed by the operation that caused
/// it.
#[derive(Clone, Debug)]
pub struct BalanceChange {
    pub account: String,
    pub previous: Money,
    pub current: Money,
}

/// Result of a successful ledger operation: the recorded transaction plus a
/// before/after snapshot for every account touched (source first, destination
/// second for transfers).
#[derive(Clone, Debug)]
pub struct OperationReceipt {
    pub transaction: Transaction,
    pub changes: Vec<BalanceChange>,
}

pub struct Engine {
    /// Authoritative in-memory state; one async mutex per account so
    /// independent accounts operate in parallel.
    accounts: DashMap<String, Arc<Mutex<Account>>>,
    store: LedgerStore,
    /// Next transaction id. Held across the write-through append, so ids are
    /// unique, gapless and assigned in append order.
    next_tx_id: Mutex<i64>,
    lock_wait: Duration,
}

impl Engine {
    /// Return a builder for `Engine`.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Acquires exclusive access to an account, bounded by the configured
    /// lock wait.
    async fn lock_account(&self, number: &str) -> ResultEngine<OwnedMutexGuard<Account>> {
        let cell = self
            .accounts
            .get(number)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| EngineError::AccountNotFound(number.to_string()))?;
        tokio::time::timeout(self.lock_wait, cell.lock_owned())
            .await
            .map_err(|_| EngineError::OperationTimeout(number.to_string()))
    }

    /// Allocates the next transaction id, persists the operation, and only
    /// then advances the counter. A failed save consumes no id.
    async fn record(
        &self,
        updates: &[Account],
        build: impl FnOnce(i64) -> Transaction,
    ) -> ResultEngine<Transaction> {
        let mut next_id = self.next_tx_id.lock().await;
        let tx = build(*next_id);
        self.store.persist_operation(updates, &tx).await?;
        *next_id += 1;
        Ok(tx)
    }

    /// Credits `amount` to an account.
    pub async fn deposit(
        &self,
        number: &str,
        amount: Money,
        description: Option<String>,
    ) -> ResultEngine<OperationReceipt> {
        if !amount.is_positive() {
            return Err(EngineError::non_positive_amount());
        }

        let mut account = self.lock_account(number).await?;
        account.ensure_active()?;

        let previous = account.balance;
        let current = account.credited(amount)?;

        let mut updated = account.clone();
        updated.balance = current;
        let tx = self
            .record(std::slice::from_ref(&updated), |id| Transaction {
                id,
                source_account: account.number.clone(),
                destination_account: None,
                kind: TransactionKind::Consignacion,
                amount,
                description: description
                    .unwrap_or_else(|| TransactionKind::Consignacion.default_description().into()),
                created_at: Utc::now(),
            })
            .await?;

        account.balance = current;
        Ok(OperationReceipt {
            transaction: tx,
            changes: vec![BalanceChange {
                account: account.number.clone(),
                previous,
                current,
            }],
        })
    }

    /// Debits `amount` from an account, honoring the account floor
    /// (zero, or the overdraft limit for credit accounts).
    pub async fn withdraw(
        &self,
        number: &str,
        amount: Money,
        description: Option<String>,
    ) -> ResultEngine<OperationReceipt> {
        if !amount.is_positive() {
            return Err(EngineError::non_positive_amount());
        }

        let mut account = self.lock_account(number).await?;
        account.ensure_active()?;

        let previous = account.balance;
        let current = account.debited(amount)?;

        let mut updated = account.clone();
        updated.balance = current;
        let tx = self
            .record(std::slice::from_ref(&updated), |id| Transaction {
                id,
                source_account: account.number.clone(),
                destination_account: None,
                kind: TransactionKind::Retiro,
                amount,
                description: description
                    .unwrap_or_else(|| TransactionKind::Retiro.default_description().into()),
                created_at: Utc::now(),
            })
            .await?;

        account.balance = current;
        Ok(OperationReceipt {
            transaction: tx,
            changes: vec![BalanceChange {
                account: account.number.clone(),
                previous,
                current,
            }],
        })
    }

    /// Moves `amount` from `source` to `destination`. Both balance changes
    /// are applied as one unit: either both are visible or neither is.
    pub async fn transfer(
        &self,
        source: &str,
        destination: &str,
        amount: Money,
        description: Option<String>,
    ) -> ResultEngine<OperationReceipt> {
        if source == destination {
            return Err(EngineError::SameAccountTransfer);
        }
        if !amount.is_positive() {
            return Err(EngineError::non_positive_amount());
        }

        // Always lock in ascending account-number order so two transfers over
        // the same pair in opposite directions cannot deadlock.
        let (first, second) = if source < destination {
            (source, destination)
        } else {
            (destination, source)
        };
        let guard_first = self.lock_account(first).await?;
        let guard_second = self.lock_account(second).await?;
        let (mut src, mut dst) = if first == source {
            (guard_first, guard_second)
        } else {
            (guard_second, guard_first)
        };

        src.ensure_active()?;
        dst.ensure_active()?;

        let src_previous = src.balance;
        let dst_previous = dst.balance;
        let src_current = src.debited(amount)?;
        let dst_current = dst.credited(amount)?;

        let mut updated_src = src.clone();
        updated_src.balance = src_current;
        let mut updated_dst = dst.clone();
        updated_dst.balance = dst_current;
        let tx = self
            .record(&[updated_src, updated_dst], |id| Transaction {
                id,
                source_account: src.number.clone(),
                destination_account: Some(dst.number.clone()),
                kind: TransactionKind::Transferencia,
                amount,
                description: description
                    .unwrap_or_else(|| TransactionKind::Transferencia.default_description().into()),
                created_at: Utc::now(),
            })
            .await?;

        src.balance = src_current;
        dst.balance = dst_current;
        Ok(OperationReceipt {
            transaction: tx,
            changes: vec![
                BalanceChange {
                    account: src.number.clone(),
                    previous: src_previous,
                    current: src_current,
                },
                BalanceChange {
                    account: dst.number.clone(),
                    previous: dst_previous,
                    current: dst_current,
                },
            ],
        })
    }

    /// Opens a new account for an existing client. The account number is
    /// generated; generation retries on collision.
    pub async fn create_account(
        &self,
        client_id: i64,
        kind: AccountKind,
        initial_balance: Money,
        limit: Option<Money>,
    ) -> ResultEngine<Account> {
        if initial_balance.is_negative() {
            return Err(EngineError::InvalidAmount(
                "el saldo inicial no puede ser negativo".to_string(),
            ));
        }
        if !self.store.client_exists(client_id).await? {
            return Err(EngineError::ClientNotFound(client_id));
        }

        let mut last_number = String::new();
        for _ in 0..MAX_NUMBER_ATTEMPTS {
            let number = accounts::generate_number();
            if self.accounts.contains_key(&number) {
                last_number = number;
                continue;
            }

            let account = Account::new(
                number.clone(),
                client_id,
                kind,
                initial_balance,
                limit,
                Utc::now(),
            );
            match self.store.insert_account(&account).await {
                Ok(()) => {
                    self.accounts
                        .insert(number, Arc::new(Mutex::new(account.clone())));
                    return Ok(account);
                }
                // Lost a race for the same number against a concurrent
                // creation; generate another.
                Err(EngineError::DuplicateAccount(number)) => last_number = number,
                Err(err) => return Err(err),
            }
        }
        Err(EngineError::DuplicateAccount(last_number))
    }

    /// Changes an account status. Deactivation is the soft delete and
    /// requires the balance to be exactly zero so no funds are orphaned.
    pub async fn set_status(
        &self,
        number: &str,
        status: AccountStatus,
    ) -> ResultEngine<Account> {
        let mut account = self.lock_account(number).await?;
        if status == AccountStatus::Inactiva && !account.balance.is_zero() {
            return Err(EngineError::NonZeroBalance {
                number: account.number.clone(),
                balance: account.balance,
            });
        }

        let mut updated = account.clone();
        updated.status = status;
        self.store.update_account(&updated).await?;

        *account = updated.clone();
        Ok(updated)
    }

    /// Soft delete.
    pub async fn deactivate(&self, number: &str) -> ResultEngine<Account> {
        self.set_status(number, AccountStatus::Inactiva).await
    }

    /// Returns a snapshot of one account.
    pub async fn account(&self, number: &str) -> ResultEngine<Account> {
        let account = self.lock_account(number).await?;
        Ok(account.clone())
    }

    /// Returns account snapshots matching `filter`, ordered by number.
    pub async fn accounts(&self, filter: &AccountFilter) -> ResultEngine<Vec<Account>> {
        // Collect the cells first: awaiting while iterating would pin DashMap
        // shards across suspension points.
        let cells: Vec<Arc<Mutex<Account>>> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut out = Vec::new();
        for cell in cells {
            let account = cell.lock().await;
            if filter.matches(&account) {
                out.push(account.clone());
            }
        }
        out.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(out)
    }

    /// Looks up one transaction by id.
    pub async fn transaction(&self, id: i64) -> ResultEngine<Transaction> {
        self.store
            .transaction(id)
            .await?
            .ok_or(EngineError::TransactionNotFound(id))
    }

    /// Lists transactions matching `filter`, ordered by id ascending.
    pub async fn transactions(&self, filter: &TransactionFilter) -> ResultEngine<Vec<Transaction>> {
        self.store.transactions(filter).await
    }

    /// Registers a new client in the directory.
    pub async fn create_client(&self, client: NewClient) -> ResultEngine<Client> {
        self.store.insert_client(client).await
    }

    /// Looks up one client by id.
    pub async fn client(&self, id: i64) -> ResultEngine<Client> {
        self.store
            .client(id)
            .await?
            .ok_or(EngineError::ClientNotFound(id))
    }

    /// Lists all clients.
    pub async fn clients(&self) -> ResultEngine<Vec<Client>> {
        self.store.clients().await
    }
}

/// The builder for `Engine`.
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<LedgerStore>,
    lock_wait: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required persistence backend.
    pub fn store(mut self, store: LedgerStore) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    /// Override the bounded wait for account locks.
    pub fn lock_wait(mut self, wait: Duration) -> EngineBuilder {
        self.lock_wait = Some(wait);
        self
    }

    /// Construct `Engine`, hydrating the in-memory state from the backend.
    pub async fn build(self) -> ResultEngine<Engine> {
        let store = self
            .store
            .ok_or_else(|| EngineError::Storage("no persistence backend configured".to_string()))?;

        let accounts = DashMap::new();
        for account in store.load_accounts().await? {
            accounts.insert(account.number.clone(), Arc::new(Mutex::new(account)));
        }
        let next_tx_id = store.max_transaction_id().await? + 1;

        Ok(Engine {
            accounts,
            store,
            next_tx_id: Mutex::new(next_tx_id),
            lock_wait: self.lock_wait.unwrap_or(DEFAULT_LOCK_WAIT),
        })
    }
}
