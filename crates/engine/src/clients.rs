//! Client directory.
//!
//! Clients own accounts; the ledger only ever *reads* this directory
//! (existence checks on account creation). Client records are created and
//! listed through the engine but never touched by money operations.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub document_number: String,
    /// Document kind: CC, CE, TI, ...
    pub document_kind: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a client; the store allocates the id.
#[derive(Clone, Debug)]
pub struct NewClient {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub document_number: String,
    pub document_kind: String,
}

impl NewClient {
    pub(crate) fn into_client(self, id: i64, created_at: DateTime<Utc>) -> Client {
        Client {
            id,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            document_number: self.document_number,
            document_kind: self.document_kind,
            active: true,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub document_number: String,
    pub document_kind: String,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&NewClient> for ActiveModel {
    fn from(client: &NewClient) -> Self {
        Self {
            id: ActiveValue::NotSet,
            full_name: ActiveValue::Set(client.full_name.clone()),
            email: ActiveValue::Set(client.email.clone()),
            phone: ActiveValue::Set(client.phone.clone()),
            document_number: ActiveValue::Set(client.document_number.clone()),
            document_kind: ActiveValue::Set(client.document_kind.clone()),
            active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

impl From<Model> for Client {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name,
            email: model.email,
            phone: model.phone,
            document_number: model.document_number,
            document_kind: model.document_kind,
            active: model.active,
            created_at: model.created_at,
        }
    }
}
