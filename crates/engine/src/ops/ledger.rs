//! Balance mutations.
//!
//! Balances are never read, modified and written back: every change is a
//! single `UPDATE ... SET balance = balance ± amount`, and debits carry
//! `balance >= amount` in the `WHERE` clause. Callers run these inside
//! `with_tx!` together with the matching [`Transaction`] record.

use sea_orm::{ActiveModelTrait, DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine, Transaction, transactions, users};

/// Take `amount` from `user_id`, failing when the balance does not cover it.
pub(super) async fn debit(
    db: &DatabaseTransaction,
    user_id: Uuid,
    amount: i64,
) -> ResultEngine<()> {
    if amount == 0 {
        return Ok(());
    }
    let updated = users::Entity::update_many()
        .col_expr(
            users::Column::Balance,
            Expr::col(users::Column::Balance).sub(amount),
        )
        .filter(users::Column::Id.eq(user_id.to_string()))
        .filter(users::Column::Balance.gte(amount))
        .exec(db)
        .await?;

    if updated.rows_affected == 0 {
        let user = users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        return Err(EngineError::InsufficientFunds(format!(
            "balance {}, required {}",
            Money::new(user.balance),
            Money::new(amount)
        )));
    }
    Ok(())
}

pub(super) async fn credit(
    db: &DatabaseTransaction,
    user_id: Uuid,
    amount: i64,
) -> ResultEngine<()> {
    if amount == 0 {
        return Ok(());
    }
    let updated = users::Entity::update_many()
        .col_expr(
            users::Column::Balance,
            Expr::col(users::Column::Balance).add(amount),
        )
        .filter(users::Column::Id.eq(user_id.to_string()))
        .exec(db)
        .await?;

    if updated.rows_affected == 0 {
        return Err(EngineError::KeyNotFound("user not exists".to_string()));
    }
    Ok(())
}

/// Append a transaction record.
pub(super) async fn record(
    db: &DatabaseTransaction,
    tx: Transaction,
) -> ResultEngine<Transaction> {
    transactions::ActiveModel::from(&tx).insert(db).await?;
    tracing::info!(
        user_id = %tx.user_id,
        amount = tx.amount,
        kind = %tx.transaction_type,
        request_id = ?tx.request_id,
        "ledger entry recorded"
    );
    Ok(tx)
}
