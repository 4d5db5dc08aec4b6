//! Card categories: a denomination sold at a fixed price within a network.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCategory {
    pub id: Uuid,
    pub network_id: Uuid,
    pub name: String,
    pub price: i64,
    /// Cards still available for sale. Filled in by listings only.
    pub available: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "card_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub network_id: String,
    pub name: String,
    pub price: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::networks::Entity",
        from = "Column::NetworkId",
        to = "super::networks::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Networks,
    #[sea_orm(has_many = "super::network_cards::Entity")]
    NetworkCards,
}

impl Related<super::networks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Networks.def()
    }
}

impl Related<super::network_cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkCards.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CardCategory> for ActiveModel {
    fn from(category: &CardCategory) -> Self {
        Self {
            id: ActiveValue::Set(category.id.to_string()),
            network_id: ActiveValue::Set(category.network_id.to_string()),
            name: ActiveValue::Set(category.name.clone()),
            price: ActiveValue::Set(category.price),
            created_at: ActiveValue::Set(category.created_at),
        }
    }
}

impl CardCategory {
    pub(crate) fn from_model(model: Model, available: u64) -> Result<Self, EngineError> {
        Ok(Self {
            id: parse_uuid(&model.id, "card category")?,
            network_id: parse_uuid(&model.network_id, "network")?,
            name: model.name,
            price: model.price,
            available,
            created_at: model.created_at,
        })
    }
}
