//! Prepaid card inventory. A card only ever goes `available -> sold`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    Available,
    Sold,
}

impl CardStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Sold => "sold",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "network_cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub category_id: String,
    #[sea_orm(unique)]
    pub code: String,
    pub serial: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub sold_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::card_categories::Entity",
        from = "Column::CategoryId",
        to = "super::card_categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CardCategories,
}

impl Related<super::card_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CardCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn new_active_model(
    category_id: Uuid,
    code: String,
    serial: Option<String>,
    created_at: DateTime<Utc>,
) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        category_id: ActiveValue::Set(category_id.to_string()),
        code: ActiveValue::Set(code),
        serial: ActiveValue::Set(serial),
        status: ActiveValue::Set(CardStatus::Available.as_str().to_string()),
        created_at: ActiveValue::Set(created_at),
        sold_at: ActiveValue::Set(None),
    }
}
