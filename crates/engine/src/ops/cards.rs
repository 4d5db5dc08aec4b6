//! Prepaid card catalog and sales.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    CardCategory, CardStatus, EngineError, Money, Network, NewCard, ResultEngine, SoldCard,
    Transaction, TransactionKind, card_categories, network_cards, networks, sold_cards,
    util::{normalize_required_name, parse_uuid, require_positive},
};

use super::{Engine, ledger, with_tx};

impl Engine {
    pub async fn new_network(&self, admin_id: Uuid, name: &str) -> ResultEngine<Network> {
        let name = normalize_required_name(name, "network")?;
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin_id).await?;
            let existing = networks::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(name));
            }
            let network = Network {
                id: Uuid::new_v4(),
                name,
                created_at: Utc::now(),
            };
            networks::ActiveModel::from(&network).insert(&db_tx).await?;
            tracing::info!(network_id = %network.id, name = %network.name, "network created");
            Ok(network)
        })
    }

    pub async fn list_networks(&self) -> ResultEngine<Vec<Network>> {
        networks::Entity::find()
            .order_by_asc(networks::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Network::try_from)
            .collect()
    }

    pub async fn new_card_category(
        &self,
        admin_id: Uuid,
        network_id: Uuid,
        name: &str,
        price: i64,
    ) -> ResultEngine<CardCategory> {
        let name = normalize_required_name(name, "card category")?;
        require_positive(price, "price")?;
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin_id).await?;
            networks::Entity::find_by_id(network_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("network not exists".to_string()))?;
            let existing = card_categories::Entity::find()
                .filter(card_categories::Column::NetworkId.eq(network_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(name));
            }

            let category = CardCategory {
                id: Uuid::new_v4(),
                network_id,
                name,
                price,
                available: 0,
                created_at: Utc::now(),
            };
            card_categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;
            tracing::info!(category_id = %category.id, price, "card category created");
            Ok(category)
        })
    }

    /// Card categories of a network with the number of cards left.
    pub async fn list_card_categories(&self, network_id: Uuid) -> ResultEngine<Vec<CardCategory>> {
        with_tx!(self, |db_tx| {
            let models = card_categories::Entity::find()
                .filter(card_categories::Column::NetworkId.eq(network_id.to_string()))
                .order_by_asc(card_categories::Column::Price)
                .order_by_asc(card_categories::Column::Name)
                .all(&db_tx)
                .await?;
            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let available = available_cards(&db_tx, &model.id).await?;
                out.push(CardCategory::from_model(model, available)?);
            }
            Ok(out)
        })
    }

    /// Loads cards into a category. The whole batch is rejected if any code
    /// is repeated or already stocked.
    pub async fn add_cards(
        &self,
        admin_id: Uuid,
        category_id: Uuid,
        cards: Vec<NewCard>,
    ) -> ResultEngine<u64> {
        let mut seen = HashSet::with_capacity(cards.len());
        let mut clean = Vec::with_capacity(cards.len());
        for card in cards {
            let code = card.code.trim().to_string();
            if code.is_empty() {
                return Err(EngineError::InvalidId("card code must not be empty".to_string()));
            }
            if !seen.insert(code.clone()) {
                return Err(EngineError::ExistingKey(format!("card {code}")));
            }
            let serial = card
                .serial
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            clean.push((code, serial));
        }
        if clean.is_empty() {
            return Ok(0);
        }

        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin_id).await?;
            self.require_card_category(&db_tx, category_id).await?;

            let codes: Vec<String> = clean.iter().map(|(code, _)| code.clone()).collect();
            let duplicate = network_cards::Entity::find()
                .filter(network_cards::Column::Code.is_in(codes))
                .one(&db_tx)
                .await?;
            if let Some(duplicate) = duplicate {
                return Err(EngineError::ExistingKey(format!("card {}", duplicate.code)));
            }

            let now = Utc::now();
            let count = clean.len() as u64;
            network_cards::Entity::insert_many(clean.into_iter().map(|(code, serial)| {
                network_cards::new_active_model(category_id, code, serial, now)
            }))
            .exec(&db_tx)
            .await?;
            tracing::info!(%category_id, count, "cards stocked");
            Ok(count)
        })
    }

    /// Sells the oldest available card of `category_id` to `user_id`.
    ///
    /// The card is claimed with a conditional `available -> sold` update; if
    /// another buyer claimed it first the next candidate is tried. Fails with
    /// `SoldOut` when no card is left.
    pub async fn purchase_card(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<SoldCard> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let category = self.require_card_category(&db_tx, category_id).await?;
            let commission = self.pricing.card_rate.commission(category.price)?;
            let total = category
                .price
                .checked_add(commission)
                .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;

            let card = claim_card(&db_tx, category_id).await?;
            let now = Utc::now();

            ledger::debit(&db_tx, user_id, total).await?;
            let tx = ledger::record(
                &db_tx,
                Transaction::new(user_id, -total, TransactionKind::CardPurchase, now)
                    .notes(Some(format!("{} card", category.name))),
            )
            .await?;

            let sold = SoldCard {
                id: Uuid::new_v4(),
                card_id: parse_uuid(&card.id, "card")?,
                category_id,
                user_id,
                code: card.code,
                serial: card.serial,
                price: category.price,
                commission,
                transaction_id: tx.id,
                sold_at: now,
            };
            sold_cards::ActiveModel::from(&sold).insert(&db_tx).await?;
            tracing::info!(
                %user_id,
                %category_id,
                price = %Money::new(total),
                "card sold"
            );
            Ok(sold)
        })
    }

    /// Cards bought by a user, newest first.
    pub async fn list_sold_cards(&self, user_id: Uuid) -> ResultEngine<Vec<SoldCard>> {
        sold_cards::Entity::find()
            .filter(sold_cards::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(sold_cards::Column::SoldAt)
            .order_by_desc(sold_cards::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(SoldCard::try_from)
            .collect()
    }

    async fn require_card_category(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultEngine<card_categories::Model> {
        card_categories::Entity::find_by_id(category_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("card category not exists".to_string()))
    }
}

async fn available_cards(db: &DatabaseTransaction, category_id: &str) -> ResultEngine<u64> {
    network_cards::Entity::find()
        .filter(network_cards::Column::CategoryId.eq(category_id))
        .filter(network_cards::Column::Status.eq(CardStatus::Available.as_str()))
        .count(db)
        .await
        .map_err(Into::into)
}

async fn claim_card(
    db: &DatabaseTransaction,
    category_id: Uuid,
) -> ResultEngine<network_cards::Model> {
    loop {
        let candidate = network_cards::Entity::find()
            .filter(network_cards::Column::CategoryId.eq(category_id.to_string()))
            .filter(network_cards::Column::Status.eq(CardStatus::Available.as_str()))
            .order_by_asc(network_cards::Column::CreatedAt)
            .order_by_asc(network_cards::Column::Id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::SoldOut("no card left in this category".to_string()))?;

        let claimed = network_cards::Entity::update_many()
            .col_expr(
                network_cards::Column::Status,
                Expr::value(CardStatus::Sold.as_str()),
            )
            .col_expr(network_cards::Column::SoldAt, Expr::value(Utc::now()))
            .filter(network_cards::Column::Id.eq(candidate.id.clone()))
            .filter(network_cards::Column::Status.eq(CardStatus::Available.as_str()))
            .exec(db)
            .await?;
        if claimed.rows_affected == 1 {
            return Ok(candidate);
        }
        tracing::debug!(card_id = %candidate.id, "card claimed by another buyer, retrying");
    }
}
