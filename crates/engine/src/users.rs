//! Wallet users.
//!
//! A user owns exactly one balance. The balance column is only ever changed
//! through the ledger helpers (`ops::ledger`), which pair every change with a
//! transaction record.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Customer,
    Agent,
    Admin,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl TryFrom<&str> for AccountType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "customer" => Ok(Self::Customer),
            "agent" => Ok(Self::Agent),
            "admin" => Ok(Self::Admin),
            other => Err(EngineError::InvalidId(format!(
                "invalid account type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub display_name: String,
    pub phone_number: String,
    pub balance: i64,
    pub account_type: AccountType,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub display_name: String,
    #[sea_orm(unique)]
    pub phone_number: String,
    pub password_hash: String,
    pub balance: i64,
    pub account_type: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            display_name: model.display_name,
            phone_number: model.phone_number,
            balance: model.balance,
            account_type: AccountType::try_from(model.account_type.as_str())?,
            created_at: model.created_at,
        })
    }
}

pub(crate) fn new_active_model(
    id: Uuid,
    display_name: String,
    phone_number: String,
    password_hash: String,
    account_type: AccountType,
    created_at: DateTime<Utc>,
) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(id.to_string()),
        display_name: ActiveValue::Set(display_name),
        phone_number: ActiveValue::Set(phone_number),
        password_hash: ActiveValue::Set(password_hash),
        balance: ActiveValue::Set(0),
        account_type: ActiveValue::Set(account_type.as_str().to_string()),
        created_at: ActiveValue::Set(created_at),
    }
}
