use chrono::Utc;
use sea_orm::{ActiveModelTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ProviderService, ResultEngine, Subscriber, subscribers,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Saves a subscriber number for quick renewals and bill payments.
    pub async fn add_subscriber(
        &self,
        user_id: Uuid,
        label: &str,
        service: ProviderService,
        number: &str,
    ) -> ResultEngine<Subscriber> {
        let label = normalize_required_name(label, "subscriber")?;
        let number = service.normalize_subscriber(number)?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let existing = subscribers::Entity::find()
                .filter(subscribers::Column::UserId.eq(user_id.to_string()))
                .filter(subscribers::Column::Service.eq(service.as_str()))
                .filter(subscribers::Column::PhoneNumber.eq(number.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "{number} for {}",
                    service.as_str()
                )));
            }
            let subscriber = Subscriber {
                id: Uuid::new_v4(),
                user_id,
                label,
                phone_number: number,
                service,
                created_at: Utc::now(),
            };
            subscribers::ActiveModel::from(&subscriber)
                .insert(&db_tx)
                .await?;
            Ok(subscriber)
        })
    }

    pub async fn list_subscribers(&self, user_id: Uuid) -> ResultEngine<Vec<Subscriber>> {
        subscribers::Entity::find()
            .filter(subscribers::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(subscribers::Column::Label)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Subscriber::try_from)
            .collect()
    }

    pub async fn remove_subscriber(&self, user_id: Uuid, subscriber_id: Uuid) -> ResultEngine<()> {
        let deleted = subscribers::Entity::delete_many()
            .filter(subscribers::Column::Id.eq(subscriber_id.to_string()))
            .filter(subscribers::Column::UserId.eq(user_id.to_string()))
            .exec(&self.database)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("subscriber not exists".to_string()));
        }
        Ok(())
    }
}
