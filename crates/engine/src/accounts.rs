//! Account domain model and its storage row.
//!
//! Balances only change through the ledger operations in [`crate::Engine`];
//! this module owns the validation math (withdrawal floors, credit limits)
//! and the sea-orm entity for the SQL backend.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, util};

/// Default limit for credit accounts when the caller does not provide one,
/// matching the longstanding backend behavior (1,000,000.00).
pub const DEFAULT_CREDIT_LIMIT: Money = Money::from_cents(100_000_000);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Savings account ("ahorro"): balance never goes below zero.
    Ahorro,
    /// Checking account ("corriente"): balance never goes below zero.
    Corriente,
    /// Credit account ("credito"): balance may go negative down to the limit.
    Credito,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ahorro => "ahorro",
            Self::Corriente => "corriente",
            Self::Credito => "credito",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "ahorro" => Ok(Self::Ahorro),
            "corriente" => Ok(Self::Corriente),
            "credito" => Ok(Self::Credito),
            other => Err(EngineError::InvalidAmount(format!(
                "tipo de cuenta inválido: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Activa,
    Inactiva,
    Bloqueada,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activa => "activa",
            Self::Inactiva => "inactiva",
            Self::Bloqueada => "bloqueada",
        }
    }
}

impl TryFrom<&str> for AccountStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "activa" => Ok(Self::Activa),
            "inactiva" => Ok(Self::Inactiva),
            "bloqueada" => Ok(Self::Bloqueada),
            other => Err(EngineError::InvalidAmount(format!(
                "estado de cuenta inválido: {other}"
            ))),
        }
    }
}

/// A bank account.
///
/// The account number is generated at creation and immutable afterwards.
/// Accounts are soft-deleted (status change) and never physically removed,
/// so recorded transactions always resolve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub number: String,
    pub client_id: i64,
    pub kind: AccountKind,
    pub balance: Money,
    /// Overdraft limit, `Some` only for credit accounts.
    pub limit: Option<Money>,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        number: String,
        client_id: i64,
        kind: AccountKind,
        balance: Money,
        limit: Option<Money>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let limit = match kind {
            AccountKind::Credito => Some(limit.unwrap_or(DEFAULT_CREDIT_LIMIT)),
            _ => None,
        };
        Self {
            number,
            client_id,
            kind,
            balance,
            limit,
            status: AccountStatus::Activa,
            created_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Activa
    }

    pub(crate) fn ensure_active(&self) -> ResultEngine<()> {
        if self.is_active() {
            return Ok(());
        }
        Err(EngineError::AccountInactive {
            number: self.number.clone(),
            status: self.status.as_str().to_string(),
        })
    }

    /// Lowest balance this account may reach: zero, or `-limit` for credit.
    fn floor(&self) -> Money {
        match self.limit {
            Some(limit) => -limit,
            None => Money::ZERO,
        }
    }

    /// Balance after crediting `amount`, or an error; does not mutate.
    pub(crate) fn credited(&self, amount: Money) -> ResultEngine<Money> {
        self.balance
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidAmount("monto demasiado grande".to_string()))
    }

    /// Balance after debiting `amount`, or `InsufficientFunds` when the
    /// result would cross the account floor; does not mutate.
    pub(crate) fn debited(&self, amount: Money) -> ResultEngine<Money> {
        let new_balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| EngineError::InvalidAmount("monto demasiado grande".to_string()))?;
        if new_balance < self.floor() {
            return Err(EngineError::InsufficientFunds {
                number: self.number.clone(),
                available: self
                    .balance
                    .checked_sub(self.floor())
                    .unwrap_or(self.balance),
                requested: amount,
            });
        }
        Ok(new_balance)
    }
}

/// Criteria for account listings.
#[derive(Clone, Debug, Default)]
pub struct AccountFilter {
    /// Account kind, matched case- and accent-insensitively
    /// ("Crédito" matches `credito`).
    pub kind: Option<String>,
    /// Account status, matched the same way.
    pub status: Option<String>,
    pub client_id: Option<i64>,
    /// When false (the default), soft-deleted accounts are hidden unless
    /// `status` explicitly asks for them.
    pub include_inactive: bool,
}

impl AccountFilter {
    pub fn by_client(client_id: i64) -> Self {
        Self {
            client_id: Some(client_id),
            include_inactive: true,
            ..Self::default()
        }
    }

    pub(crate) fn matches(&self, account: &Account) -> bool {
        if let Some(kind) = &self.kind
            && util::normalize_filter(kind) != account.kind.as_str()
        {
            return false;
        }
        if let Some(status) = &self.status {
            if util::normalize_filter(status) != account.status.as_str() {
                return false;
            }
        } else if !self.include_inactive && account.status == AccountStatus::Inactiva {
            return false;
        }
        if let Some(client_id) = self.client_id
            && account.client_id != client_id
        {
            return false;
        }
        true
    }
}

/// Generates a candidate account number: `100` followed by 7 digits.
///
/// Uniqueness is enforced by the caller (retry on collision).
pub(crate) fn generate_number() -> String {
    let digits = Uuid::new_v4().as_u128() % 10_000_000;
    format!("100{digits:07}")
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub number: String,
    pub client_id: i64,
    pub kind: String,
    pub balance_minor: i64,
    pub limit_minor: Option<i64>,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Clients,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            number: ActiveValue::Set(account.number.clone()),
            client_id: ActiveValue::Set(account.client_id),
            kind: ActiveValue::Set(account.kind.as_str().to_string()),
            balance_minor: ActiveValue::Set(account.balance.cents()),
            limit_minor: ActiveValue::Set(account.limit.map(Money::cents)),
            status: ActiveValue::Set(account.status.as_str().to_string()),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            number: model.number,
            client_id: model.client_id,
            kind: AccountKind::try_from(model.kind.as_str())?,
            balance: Money::from_cents(model.balance_minor),
            limit: model.limit_minor.map(Money::from_cents),
            status: AccountStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn savings(balance_cents: i64) -> Account {
        Account::new(
            "1001234567".to_string(),
            1,
            AccountKind::Ahorro,
            Money::from_cents(balance_cents),
            None,
            Utc::now(),
        )
    }

    #[test]
    fn savings_cannot_go_negative() {
        let account = savings(100_000);
        assert_eq!(
            account.debited(Money::from_cents(100_000)).unwrap(),
            Money::ZERO
        );
        assert!(matches!(
            account.debited(Money::from_cents(100_001)),
            Err(EngineError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn credit_can_overdraw_to_its_limit() {
        let account = Account::new(
            "1009999999".to_string(),
            1,
            AccountKind::Credito,
            Money::ZERO,
            Some(Money::from_cents(50_000)),
            Utc::now(),
        );
        assert_eq!(
            account.debited(Money::from_cents(50_000)).unwrap(),
            Money::from_cents(-50_000)
        );
        assert!(matches!(
            account.debited(Money::from_cents(50_001)),
            Err(EngineError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn credit_gets_default_limit() {
        let account = Account::new(
            "1000000001".to_string(),
            1,
            AccountKind::Credito,
            Money::ZERO,
            None,
            Utc::now(),
        );
        assert_eq!(account.limit, Some(DEFAULT_CREDIT_LIMIT));

        // Non-credit accounts ignore a supplied limit.
        let account = Account::new(
            "1000000002".to_string(),
            1,
            AccountKind::Ahorro,
            Money::ZERO,
            Some(Money::from_cents(1)),
            Utc::now(),
        );
        assert_eq!(account.limit, None);
    }

    #[test]
    fn generated_numbers_have_the_bank_prefix() {
        let number = generate_number();
        assert_eq!(number.len(), 10);
        assert!(number.starts_with("100"));
        assert!(number.bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn filter_hides_soft_deleted_unless_asked() {
        let mut account = savings(0);
        account.status = AccountStatus::Inactiva;

        assert!(!AccountFilter::default().matches(&account));

        let explicit = AccountFilter {
            status: Some("Inactiva".to_string()),
            ..AccountFilter::default()
        };
        assert!(explicit.matches(&account));

        let by_kind = AccountFilter {
            kind: Some("Ahorro".to_string()),
            include_inactive: true,
            ..AccountFilter::default()
        };
        assert!(by_kind.matches(&account));
    }

    #[test]
    fn inactive_accounts_are_rejected() {
        let mut account = savings(0);
        account.status = AccountStatus::Bloqueada;
        assert!(matches!(
            account.ensure_active(),
            Err(EngineError::AccountInactive { ref status, .. }) if status == "bloqueada"
        ));
    }
}
