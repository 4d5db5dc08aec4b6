use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{AccountType, EngineError, ResultEngine, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(super) async fn require_user_by_phone(
        &self,
        db: &DatabaseTransaction,
        phone_number: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone_number))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {phone_number}")))
    }

    /// Load `user_id` and fail with `Forbidden` unless it is an administrator.
    pub(super) async fn require_admin(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        let user = self.require_user(db, user_id).await?;
        if !AccountType::try_from(user.account_type.as_str())?.is_admin() {
            return Err(EngineError::Forbidden(
                "administrator account required".to_string(),
            ));
        }
        Ok(user)
    }
}
