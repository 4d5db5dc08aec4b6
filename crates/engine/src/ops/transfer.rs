use chrono::Utc;
use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    EngineError, Money, PhoneNumber, ResultEngine, Transaction, TransactionKind,
    util::{normalize_optional_text, parse_uuid, require_positive},
};

use super::{Engine, ledger, notifications::notify, with_tx};

impl Engine {
    /// Moves `amount` from `payer_id` to the user registered with
    /// `target_phone`, immediately.
    ///
    /// The payer is charged `amount` plus the transfer fee. Returns the payer's
    /// transaction record.
    pub async fn transfer(
        &self,
        payer_id: Uuid,
        target_phone: &str,
        amount: i64,
        note: Option<&str>,
    ) -> ResultEngine<Transaction> {
        require_positive(amount, "amount")?;
        let phone = PhoneNumber::parse(target_phone)?;
        let fee = self.pricing.transfer_rate.commission(amount)?;
        let total = amount
            .checked_add(fee)
            .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
        let note = normalize_optional_text(note);

        with_tx!(self, |db_tx| {
            let payer = self.require_user(&db_tx, payer_id).await?;
            let payee = self.require_user_by_phone(&db_tx, phone.as_str()).await?;
            if payee.id == payer.id {
                return Err(EngineError::InvalidPhone(
                    "cannot transfer to yourself".to_string(),
                ));
            }
            let payee_id = parse_uuid(&payee.id, "user")?;
            let now = Utc::now();

            ledger::debit(&db_tx, payer_id, total).await?;
            ledger::credit(&db_tx, payee_id, amount).await?;

            let payer_notes = match &note {
                Some(note) => format!("to {phone}: {note}"),
                None => format!("to {phone}"),
            };
            let out = ledger::record(
                &db_tx,
                Transaction::new(payer_id, -total, TransactionKind::TransferOut, now)
                    .notes(Some(payer_notes)),
            )
            .await?;
            ledger::record(
                &db_tx,
                Transaction::new(payee_id, amount, TransactionKind::TransferIn, now)
                    .notes(Some(format!("from {}", payer.phone_number))),
            )
            .await?;
            notify(
                &db_tx,
                payee_id,
                "Money received",
                format!(
                    "You received {} from {}.",
                    Money::new(amount),
                    payer.display_name
                ),
            )
            .await?;
            Ok(out)
        })
    }
}
