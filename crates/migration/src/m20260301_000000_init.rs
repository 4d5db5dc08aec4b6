//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: wallet accounts and their balances
//! - `transactions`: append-only balance change records
//! - `ledger_requests`: operations awaiting resolution
//! - `notifications`: messages shown to users
//! - `networks`, `card_categories`, `network_cards`, `sold_cards`: prepaid cards
//! - `products`: store catalog
//! - `subscribers`: saved subscriber numbers

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    DisplayName,
    PhoneNumber,
    PasswordHash,
    Balance,
    AccountType,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    UserId,
    TransactionDate,
    Amount,
    TransactionType,
    Notes,
    RequestId,
}

#[derive(Iden)]
enum LedgerRequests {
    Table,
    Id,
    Kind,
    Status,
    RequesterId,
    Target,
    Service,
    Amount,
    Fee,
    Debited,
    Quantity,
    Details,
    RequestedAt,
    ResolvedAt,
    ResolvedBy,
    ResolutionNote,
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Title,
    Body,
    CreatedAt,
    Read,
}

#[derive(Iden)]
enum Networks {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum CardCategories {
    Table,
    Id,
    NetworkId,
    Name,
    Price,
    CreatedAt,
}

#[derive(Iden)]
enum NetworkCards {
    Table,
    Id,
    CategoryId,
    Code,
    Serial,
    Status,
    CreatedAt,
    SoldAt,
}

#[derive(Iden)]
enum SoldCards {
    Table,
    Id,
    CardId,
    CategoryId,
    UserId,
    Code,
    Serial,
    Price,
    Commission,
    TransactionId,
    SoldAt,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
    Name,
    Description,
    Price,
    Stock,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum Subscribers {
    Table,
    Id,
    UserId,
    Label,
    PhoneNumber,
    Service,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(Users::PhoneNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::AccountType)
                            .string()
                            .not_null()
                            .default("customer"),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .check(Expr::col(Users::Balance).gte(0))
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::TransactionDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::TransactionType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Notes).string())
                    .col(ColumnDef::new(Transactions::RequestId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-user_id")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-transaction_date")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::TransactionDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-request_id")
                    .table(Transactions::Table)
                    .col(Transactions::RequestId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Ledger requests
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerRequests::Kind).string().not_null())
                    .col(
                        ColumnDef::new(LedgerRequests::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(LedgerRequests::RequesterId).string().not_null())
                    .col(ColumnDef::new(LedgerRequests::Target).string())
                    .col(ColumnDef::new(LedgerRequests::Service).string())
                    .col(ColumnDef::new(LedgerRequests::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(LedgerRequests::Fee)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LedgerRequests::Debited)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(LedgerRequests::Quantity).big_integer())
                    .col(ColumnDef::new(LedgerRequests::Details).string())
                    .col(
                        ColumnDef::new(LedgerRequests::RequestedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerRequests::ResolvedAt).timestamp())
                    .col(ColumnDef::new(LedgerRequests::ResolvedBy).string())
                    .col(ColumnDef::new(LedgerRequests::ResolutionNote).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_requests-requester_id")
                            .from(LedgerRequests::Table, LedgerRequests::RequesterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_requests-status-requested_at")
                    .table(LedgerRequests::Table)
                    .col(LedgerRequests::Status)
                    .col(LedgerRequests::RequestedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_requests-requester_id")
                    .table(LedgerRequests::Table)
                    .col(LedgerRequests::RequesterId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Notifications
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::UserId).string().not_null())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Body).string().not_null())
                    .col(ColumnDef::new(Notifications::CreatedAt).timestamp().not_null())
                    .col(
                        ColumnDef::new(Notifications::Read)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notifications-user_id")
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-notifications-user_id")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Card networks and categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Networks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Networks::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Networks::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Networks::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CardCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CardCategories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CardCategories::NetworkId).string().not_null())
                    .col(ColumnDef::new(CardCategories::Name).string().not_null())
                    .col(ColumnDef::new(CardCategories::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(CardCategories::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-card_categories-network_id")
                            .from(CardCategories::Table, CardCategories::NetworkId)
                            .to(Networks::Table, Networks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-card_categories-network_id-name-unique")
                    .table(CardCategories::Table)
                    .col(CardCategories::NetworkId)
                    .col(CardCategories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Card inventory
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(NetworkCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NetworkCards::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NetworkCards::CategoryId).string().not_null())
                    .col(
                        ColumnDef::new(NetworkCards::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(NetworkCards::Serial).string())
                    .col(
                        ColumnDef::new(NetworkCards::Status)
                            .string()
                            .not_null()
                            .default("available"),
                    )
                    .col(ColumnDef::new(NetworkCards::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(NetworkCards::SoldAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-network_cards-category_id")
                            .from(NetworkCards::Table, NetworkCards::CategoryId)
                            .to(CardCategories::Table, CardCategories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-network_cards-category_id-status")
                    .table(NetworkCards::Table)
                    .col(NetworkCards::CategoryId)
                    .col(NetworkCards::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SoldCards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SoldCards::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(SoldCards::CardId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SoldCards::CategoryId).string().not_null())
                    .col(ColumnDef::new(SoldCards::UserId).string().not_null())
                    .col(ColumnDef::new(SoldCards::Code).string().not_null())
                    .col(ColumnDef::new(SoldCards::Serial).string())
                    .col(ColumnDef::new(SoldCards::Price).big_integer().not_null())
                    .col(ColumnDef::new(SoldCards::Commission).big_integer().not_null())
                    .col(ColumnDef::new(SoldCards::TransactionId).string().not_null())
                    .col(ColumnDef::new(SoldCards::SoldAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sold_cards-card_id")
                            .from(SoldCards::Table, SoldCards::CardId)
                            .to(NetworkCards::Table, NetworkCards::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sold_cards-user_id")
                            .from(SoldCards::Table, SoldCards::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sold_cards-user_id")
                    .table(SoldCards::Table)
                    .col(SoldCards::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Store products
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Products::Name).string().not_null())
                    .col(ColumnDef::new(Products::Description).string())
                    .col(ColumnDef::new(Products::Price).big_integer().not_null())
                    .col(ColumnDef::new(Products::Stock).big_integer())
                    .col(
                        ColumnDef::new(Products::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Saved subscribers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Subscribers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subscribers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subscribers::UserId).string().not_null())
                    .col(ColumnDef::new(Subscribers::Label).string().not_null())
                    .col(ColumnDef::new(Subscribers::PhoneNumber).string().not_null())
                    .col(ColumnDef::new(Subscribers::Service).string().not_null())
                    .col(ColumnDef::new(Subscribers::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subscribers-user_id")
                            .from(Subscribers::Table, Subscribers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-subscribers-user_id-service-phone-unique")
                    .table(Subscribers::Table)
                    .col(Subscribers::UserId)
                    .col(Subscribers::Service)
                    .col(Subscribers::PhoneNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Subscribers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SoldCards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NetworkCards::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CardCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Networks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
