use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{EngineError, Notification, ResultEngine, notifications};

use super::{Engine, with_tx};

/// Queue a notification for `user_id` in the caller's transaction.
pub(super) async fn notify(
    db: &DatabaseTransaction,
    user_id: Uuid,
    title: impl Into<String>,
    body: impl Into<String>,
) -> ResultEngine<Notification> {
    let notification = Notification::new(user_id, title, body);
    notifications::ActiveModel::from(&notification)
        .insert(db)
        .await?;
    tracing::debug!(%user_id, title = %notification.title, "notification queued");
    Ok(notification)
}

impl Engine {
    /// Notifications of a user, newest first.
    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> ResultEngine<Vec<Notification>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let mut query = notifications::Entity::find()
                .filter(notifications::Column::UserId.eq(user_id.to_string()));
            if unread_only {
                query = query.filter(notifications::Column::Read.eq(false));
            }
            query
                .order_by_desc(notifications::Column::CreatedAt)
                .order_by_desc(notifications::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Notification::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let updated = notifications::Entity::update_many()
                .col_expr(notifications::Column::Read, Expr::value(true))
                .filter(notifications::Column::Id.eq(notification_id.to_string()))
                .filter(notifications::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            if updated.rows_affected == 0 {
                return Err(EngineError::KeyNotFound(
                    "notification not exists".to_string(),
                ));
            }
            Ok(())
        })
    }
}
