//! Migration: Create the invoices table.
//!
//! `status` is restricted to `pending`/`paid` by a check constraint and
//! `customer_id` references `customers`.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_customers_table::Customers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Invoices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Invoices::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Invoices::Amount).integer().not_null())
                    .col(
                        ColumnDef::new(Invoices::Status)
                            .string_len(255)
                            .not_null()
                            .check(Expr::col(Invoices::Status).is_in(["pending", "paid"])),
                    )
                    .col(ColumnDef::new(Invoices::Date).date().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoices_customer_id")
                            .from(Invoices::Table, Invoices::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing orders by date; joins go through customer_id
        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_customer_id")
                    .table(Invoices::Table)
                    .col(Invoices::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_date")
                    .table(Invoices::Table)
                    .col(Invoices::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    CustomerId,
    Amount,
    Status,
    Date,
}
