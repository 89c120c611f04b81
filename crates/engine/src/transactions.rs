//! Transaction primitives.
//!
//! A `Transaction` is the immutable record of a completed ledger operation.
//! Records are only ever appended, never updated or deleted; ids are `i64`,
//! unique and strictly increasing in append order.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Deposit ("consignacion"): credits the source account.
    Consignacion,
    /// Withdrawal ("retiro"): debits the source account.
    Retiro,
    /// Transfer ("transferencia"): debits source, credits destination.
    Transferencia,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Consignacion => "consignacion",
            Self::Retiro => "retiro",
            Self::Transferencia => "transferencia",
        }
    }

    /// Default description recorded when the caller supplies none.
    pub fn default_description(self) -> &'static str {
        match self {
            Self::Consignacion => "Consignación",
            Self::Retiro => "Retiro",
            Self::Transferencia => "Transferencia entre cuentas",
        }
    }

    /// Parses a user-supplied filter value, tolerating case and accents
    /// ("Consignación" matches `consignacion`).
    pub fn from_filter(value: &str) -> Option<Self> {
        match util::normalize_filter(value).as_str() {
            "consignacion" => Some(Self::Consignacion),
            "retiro" => Some(Self::Retiro),
            "transferencia" => Some(Self::Transferencia),
            _ => None,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "consignacion" => Ok(Self::Consignacion),
            "retiro" => Ok(Self::Retiro),
            "transferencia" => Ok(Self::Transferencia),
            other => Err(EngineError::InvalidAmount(format!(
                "tipo de transacción inválido: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub source_account: String,
    /// Present only for transfers.
    pub destination_account: Option<String>,
    pub kind: TransactionKind,
    /// Always strictly positive; the direction is implied by `kind`.
    pub amount: Money,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Criteria for the read-only transaction queries.
///
/// Results are always ordered by id ascending; a fresh query re-reads the
/// committed state.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    /// Matches source **or** destination account.
    pub account: Option<String>,
    pub kind: Option<TransactionKind>,
    pub limit: Option<u64>,
}

impl TransactionFilter {
    pub fn by_account(number: impl Into<String>) -> Self {
        Self {
            account: Some(number.into()),
            ..Self::default()
        }
    }

    pub fn by_kind(kind: TransactionKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub source_account: String,
    pub destination_account: Option<String>,
    pub kind: String,
    pub amount_minor: i64,
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::SourceAccount",
        to = "super::accounts::Column::Number",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            source_account: ActiveValue::Set(tx.source_account.clone()),
            destination_account: ActiveValue::Set(tx.destination_account.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            description: ActiveValue::Set(tx.description.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            source_account: model.source_account,
            destination_account: model.destination_account,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: Money::from_cents(model.amount_minor),
            description: model.description,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            TransactionKind::Consignacion,
            TransactionKind::Retiro,
            TransactionKind::Transferencia,
        ] {
            assert_eq!(TransactionKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(TransactionKind::try_from("pago").is_err());
    }

    #[test]
    fn filter_parsing_ignores_case_and_accents() {
        assert_eq!(
            TransactionKind::from_filter("Consignación"),
            Some(TransactionKind::Consignacion)
        );
        assert_eq!(
            TransactionKind::from_filter("RETIRO"),
            Some(TransactionKind::Retiro)
        );
        assert_eq!(TransactionKind::from_filter("prestamo"), None);
    }
}
