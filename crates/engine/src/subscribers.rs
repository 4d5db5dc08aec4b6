//! Saved subscriber numbers ("my numbers"), one row per user and service.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, services::ProviderService, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: String,
    pub phone_number: String,
    pub service: ProviderService,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "subscribers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub label: String,
    pub phone_number: String,
    pub service: String,
    pub created_at: DateTimeUtc,
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

impl From<&Subscriber> for ActiveModel {
    fn from(subscriber: &Subscriber) -> Self {
        Self {
            id: ActiveValue::Set(subscriber.id.to_string()),
            user_id: ActiveValue::Set(subscriber.user_id.to_string()),
            label: ActiveValue::Set(subscriber.label.clone()),
            phone_number: ActiveValue::Set(subscriber.phone_number.clone()),
            service: ActiveValue::Set(subscriber.service.as_str().to_string()),
            created_at: ActiveValue::Set(subscriber.created_at),
        }
    }
}

impl TryFrom<Model> for Subscriber {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "subscriber")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            label: model.label,
            phone_number: model.phone_number,
            service: ProviderService::try_from(model.service.as_str())?,
            created_at: model.created_at,
        })
    }
}
