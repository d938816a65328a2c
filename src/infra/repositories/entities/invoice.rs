//! Invoice database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Invoice, InvoiceStatus};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    /// Cents
    pub amount: i32,
    pub status: String,
    pub date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for Invoice {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status = InvoiceStatus::parse(&model.status).ok_or_else(|| {
            AppError::internal(format!(
                "invoice {} has unknown status {:?}",
                model.id, model.status
            ))
        })?;

        Ok(Invoice {
            id: model.id,
            customer_id: model.customer_id,
            amount: model.amount,
            status,
            date: model.date,
        })
    }
}
