use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    AccountType, EngineError, NewUserCmd, PhoneNumber, RequestStatus, ResultEngine, User,
    notifications, requests, sold_cards, subscribers, transactions, users,
    util::{hash_password, normalize_required_name, parse_uuid},
};

use super::{Engine, SYSTEM_RESOLVER, with_tx};

const MIN_PASSWORD_LEN: usize = 4;

impl Engine {
    /// Registers a user with a zero balance.
    ///
    /// The phone number is the login and must be unique.
    pub async fn new_user(&self, cmd: NewUserCmd) -> ResultEngine<User> {
        let display_name = normalize_required_name(&cmd.display_name, "user")?;
        let phone = PhoneNumber::parse(&cmd.phone_number)?;
        if cmd.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(EngineError::InvalidId(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::PhoneNumber.eq(phone.as_str()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(phone.to_string()));
            }

            let model = users::new_active_model(
                Uuid::new_v4(),
                display_name,
                phone.to_string(),
                hash_password(&cmd.password),
                cmd.account_type,
                Utc::now(),
            )
            .insert(&db_tx)
            .await?;
            tracing::info!(phone = %phone, account_type = cmd.account_type.as_str(), "user created");
            User::try_from(model)
        })
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            User::try_from(model)
        })
    }

    pub async fn user_by_phone(&self, phone_number: &str) -> ResultEngine<User> {
        let phone = PhoneNumber::parse(phone_number)?;
        with_tx!(self, |db_tx| {
            let model = self.require_user_by_phone(&db_tx, phone.as_str()).await?;
            User::try_from(model)
        })
    }

    /// Checks `phone_number`/`password` and returns the account.
    ///
    /// Unknown numbers and wrong passwords fail the same way.
    pub async fn authenticate(&self, phone_number: &str, password: &str) -> ResultEngine<User> {
        let denied = || EngineError::Forbidden("invalid credentials".to_string());
        let phone = PhoneNumber::parse(phone_number).map_err(|_| denied())?;

        let model = users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone.as_str()))
            .one(&self.database)
            .await?
            .ok_or_else(denied)?;
        if model.password_hash != hash_password(password) {
            return Err(denied());
        }
        User::try_from(model)
    }

    pub async fn list_users(&self, admin_id: Uuid) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin_id).await?;
            users::Entity::find()
                .order_by_asc(users::Column::CreatedAt)
                .order_by_asc(users::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(User::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub async fn set_account_type(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        account_type: AccountType,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin_id).await?;
            self.require_user(&db_tx, user_id).await?;
            users::Entity::update_many()
                .col_expr(
                    users::Column::AccountType,
                    Expr::value(account_type.as_str()),
                )
                .filter(users::Column::Id.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            tracing::info!(%user_id, account_type = account_type.as_str(), "account type changed");
            let model = self.require_user(&db_tx, user_id).await?;
            User::try_from(model)
        })
    }

    /// Removes a user together with everything that belongs to them.
    ///
    /// Pending requests are rejected first as the system resolver, so held
    /// funds are settled and reserved store stock goes back on sale.
    pub async fn delete_user(&self, admin_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        if admin_id == user_id {
            return Err(EngineError::Forbidden(
                "administrators cannot delete their own account".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin_id).await?;
            self.require_user(&db_tx, user_id).await?;
            let pending = requests::Entity::find()
                .filter(requests::Column::RequesterId.eq(user_id.to_string()))
                .filter(requests::Column::Status.eq(RequestStatus::Pending.as_str()))
                .all(&db_tx)
                .await?;
            for request in pending {
                let request_id = parse_uuid(&request.id, "request")?;
                self.resolve_in(
                    &db_tx,
                    request_id,
                    RequestStatus::Rejected,
                    SYSTEM_RESOLVER,
                    Some("account deleted"),
                )
                .await?;
            }
            delete_owned_rows(&db_tx, user_id).await?;
            users::Entity::delete_by_id(user_id.to_string())
                .exec(&db_tx)
                .await?;
            tracing::info!(%user_id, %admin_id, "user deleted");
            Ok(())
        })
    }
}

async fn delete_owned_rows(db: &DatabaseTransaction, user_id: Uuid) -> ResultEngine<()> {
    let id = user_id.to_string();
    transactions::Entity::delete_many()
        .filter(transactions::Column::UserId.eq(id.clone()))
        .exec(db)
        .await?;
    notifications::Entity::delete_many()
        .filter(notifications::Column::UserId.eq(id.clone()))
        .exec(db)
        .await?;
    subscribers::Entity::delete_many()
        .filter(subscribers::Column::UserId.eq(id.clone()))
        .exec(db)
        .await?;
    sold_cards::Entity::delete_many()
        .filter(sold_cards::Column::UserId.eq(id.clone()))
        .exec(db)
        .await?;
    requests::Entity::delete_many()
        .filter(requests::Column::RequesterId.eq(id))
        .exec(db)
        .await?;
    Ok(())
}
