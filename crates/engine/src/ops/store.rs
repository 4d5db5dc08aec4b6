use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, LedgerRequest, NewProductCmd, Product, RequestKind, ResultEngine, products,
    util::{normalize_optional_text, normalize_required_name, require_positive},
};

use super::{Engine, with_tx};

impl Engine {
    pub async fn new_product(&self, admin_id: Uuid, cmd: NewProductCmd) -> ResultEngine<Product> {
        let name = normalize_required_name(&cmd.name, "product")?;
        require_positive(cmd.price, "price")?;
        if cmd.stock.is_some_and(|s| s < 0) {
            return Err(EngineError::InvalidAmount("stock must be >= 0".to_string()));
        }
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin_id).await?;
            let product = Product {
                id: Uuid::new_v4(),
                name,
                description: normalize_optional_text(cmd.description.as_deref()),
                price: cmd.price,
                stock: cmd.stock,
                active: true,
                created_at: Utc::now(),
            };
            products::ActiveModel::from(&product).insert(&db_tx).await?;
            tracing::info!(product_id = %product.id, price = product.price, "product created");
            Ok(product)
        })
    }

    pub async fn set_product_active(
        &self,
        admin_id: Uuid,
        product_id: Uuid,
        active: bool,
    ) -> ResultEngine<Product> {
        with_tx!(self, |db_tx| {
            self.require_admin(&db_tx, admin_id).await?;
            self.require_product(&db_tx, product_id).await?;
            products::Entity::update_many()
                .col_expr(products::Column::Active, Expr::value(active))
                .filter(products::Column::Id.eq(product_id.to_string()))
                .exec(&db_tx)
                .await?;
            let model = self.require_product(&db_tx, product_id).await?;
            Product::try_from(model)
        })
    }

    /// Products on sale. Administrators may include inactive ones.
    pub async fn list_products(&self, include_inactive: bool) -> ResultEngine<Vec<Product>> {
        let mut query = products::Entity::find();
        if !include_inactive {
            query = query.filter(products::Column::Active.eq(true));
        }
        query
            .order_by_asc(products::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    /// Orders `quantity` units of a product.
    ///
    /// Creates a pending `store_order` request charged `price × quantity`.
    /// Counted stock is reserved with a conditional decrement and put back if
    /// the order is rejected.
    pub async fn place_order(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i64,
        note: Option<&str>,
    ) -> ResultEngine<LedgerRequest> {
        require_positive(quantity, "quantity")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let product = Product::try_from(self.require_product(&db_tx, product_id).await?)?;
            if !product.active {
                return Err(EngineError::KeyNotFound("product not available".to_string()));
            }
            let amount = product
                .price
                .checked_mul(quantity)
                .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;

            if product.stock.is_some() {
                let reserved = products::Entity::update_many()
                    .col_expr(
                        products::Column::Stock,
                        Expr::col(products::Column::Stock).sub(quantity),
                    )
                    .filter(products::Column::Id.eq(product_id.to_string()))
                    .filter(products::Column::Stock.gte(quantity))
                    .exec(&db_tx)
                    .await?;
                if reserved.rows_affected == 0 {
                    return Err(EngineError::SoldOut(format!(
                        "not enough {} in stock",
                        product.name
                    )));
                }
            }

            let mut request = LedgerRequest::pending(RequestKind::StoreOrder, user_id, amount);
            request.target = Some(product.id.to_string());
            request.quantity = Some(quantity);
            request.details = Some(match normalize_optional_text(note) {
                Some(note) => format!("{quantity} x {}: {note}", product.name),
                None => format!("{quantity} x {}", product.name),
            });
            self.insert_pending(&db_tx, request).await
        })
    }

    async fn require_product(
        &self,
        db: &DatabaseTransaction,
        product_id: Uuid,
    ) -> ResultEngine<products::Model> {
        products::Entity::find_by_id(product_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("product not exists".to_string()))
    }
}
