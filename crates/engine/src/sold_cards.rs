use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A card handed to a buyer, with the code they paid for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldCard {
    pub id: Uuid,
    pub card_id: Uuid,
    pub category_id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub serial: Option<String>,
    pub price: i64,
    pub commission: i64,
    pub transaction_id: Uuid,
    pub sold_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sold_cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub card_id: String,
    pub category_id: String,
    pub user_id: String,
    pub code: String,
    pub serial: Option<String>,
    pub price: i64,
    pub commission: i64,
    pub transaction_id: String,
    pub sold_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SoldCard> for ActiveModel {
    fn from(card: &SoldCard) -> Self {
        Self {
            id: ActiveValue::Set(card.id.to_string()),
            card_id: ActiveValue::Set(card.card_id.to_string()),
            category_id: ActiveValue::Set(card.category_id.to_string()),
            user_id: ActiveValue::Set(card.user_id.to_string()),
            code: ActiveValue::Set(card.code.clone()),
            serial: ActiveValue::Set(card.serial.clone()),
            price: ActiveValue::Set(card.price),
            commission: ActiveValue::Set(card.commission),
            transaction_id: ActiveValue::Set(card.transaction_id.to_string()),
            sold_at: ActiveValue::Set(card.sold_at),
        }
    }
}

impl TryFrom<Model> for SoldCard {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "sold card")?,
            card_id: parse_uuid(&model.card_id, "card")?,
            category_id: parse_uuid(&model.category_id, "card category")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            code: model.code,
            serial: model.serial,
            price: model.price,
            commission: model.commission,
            transaction_id: parse_uuid(&model.transaction_id, "transaction")?,
            sold_at: model.sold_at,
        })
    }
}
