//! Card networks (the operator a prepaid card belongs to).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "networks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::card_categories::Entity")]
    CardCategories,
}

impl Related<super::card_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CardCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Network> for ActiveModel {
    fn from(network: &Network) -> Self {
        Self {
            id: ActiveValue::Set(network.id.to_string()),
            name: ActiveValue::Set(network.name.clone()),
            created_at: ActiveValue::Set(network.created_at),
        }
    }
}

impl TryFrom<Model> for Network {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "network")?,
            name: model.name,
            created_at: model.created_at,
        })
    }
}
