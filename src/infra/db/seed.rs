//! Placeholder data for development databases.
//!
//! Customers and the demo user are inserted with `ON CONFLICT DO NOTHING`;
//! invoices are only inserted into an empty table, so seeding twice is a
//! no-op.

use chrono::NaiveDate;
use sea_orm::{
    sea_query::OnConflict, DatabaseConnection, EntityTrait, PaginatorTrait, Set,
};
use uuid::{uuid, Uuid};

use crate::domain::{InvoiceStatus, Password};
use crate::errors::{AppError, AppResult};
use crate::infra::repositories::entities::{customer, invoice, user};

const DEMO_USER_ID: Uuid = uuid!("410544b2-4001-4271-9855-fec4b6a6442a");
const DEMO_USER_EMAIL: &str = "user@nextmail.com";
const DEMO_USER_PASSWORD: &str = "123456";

const EVIL_RABBIT: Uuid = uuid!("d6e15727-9fe1-4961-8c5b-ea44a9bd81aa");
const DELBA: Uuid = uuid!("3958dc9e-712f-4377-85e9-fec4b6a6442a");
const LEE: Uuid = uuid!("3958dc9e-742f-4377-85e9-fec4b6a6442a");
const MICHAEL: Uuid = uuid!("76d65c26-f784-44a2-ac19-586678f7c2f2");
const AMY: Uuid = uuid!("cc27c14a-0acf-4f4a-a6c9-d45682c144b9");
const BALAZS: Uuid = uuid!("13d07535-c59e-4157-a011-f8d2ef4e0cbb");

const CUSTOMERS: &[(Uuid, &str, &str, &str)] = &[
    (EVIL_RABBIT, "Evil Rabbit", "evil@rabbit.com", "/customers/evil-rabbit.png"),
    (DELBA, "Delba de Oliveira", "delba@oliveira.com", "/customers/delba-de-oliveira.png"),
    (LEE, "Lee Robinson", "lee@robinson.com", "/customers/lee-robinson.png"),
    (MICHAEL, "Michael Novotny", "michael@novotny.com", "/customers/michael-novotny.png"),
    (AMY, "Amy Burns", "amy@burns.com", "/customers/amy-burns.png"),
    (BALAZS, "Balazs Orban", "balazs@orban.com", "/customers/balazs-orban.png"),
];

/// (customer, cents, status, date)
const INVOICES: &[(Uuid, i32, InvoiceStatus, &str)] = &[
    (EVIL_RABBIT, 15795, InvoiceStatus::Pending, "2022-12-06"),
    (DELBA, 20348, InvoiceStatus::Pending, "2022-11-14"),
    (AMY, 3040, InvoiceStatus::Paid, "2022-10-29"),
    (MICHAEL, 44800, InvoiceStatus::Paid, "2023-09-10"),
    (BALAZS, 34577, InvoiceStatus::Pending, "2023-08-05"),
    (LEE, 54246, InvoiceStatus::Pending, "2023-07-16"),
    (EVIL_RABBIT, 666, InvoiceStatus::Pending, "2023-06-27"),
    (MICHAEL, 32545, InvoiceStatus::Paid, "2023-06-09"),
    (AMY, 1250, InvoiceStatus::Paid, "2023-06-17"),
    (BALAZS, 8546, InvoiceStatus::Paid, "2023-06-07"),
    (DELBA, 500, InvoiceStatus::Paid, "2023-08-19"),
    (BALAZS, 8945, InvoiceStatus::Paid, "2023-06-03"),
    (LEE, 1000, InvoiceStatus::Paid, "2022-06-05"),
];

/// Rows inserted by one seeding run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: u64,
    pub customers: u64,
    pub invoices: u64,
}

/// Insert the placeholder data.
pub async fn run(db: &DatabaseConnection) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();

    let demo_user = user::ActiveModel {
        id: Set(DEMO_USER_ID),
        name: Set("User".to_string()),
        email: Set(DEMO_USER_EMAIL.to_string()),
        password: Set(Password::new(DEMO_USER_PASSWORD)?.into_string()),
    };
    report.users = user::Entity::insert(demo_user)
        .on_conflict(OnConflict::column(user::Column::Email).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    let customers = CUSTOMERS.iter().map(|(id, name, email, image_url)| customer::ActiveModel {
        id: Set(*id),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        image_url: Set(image_url.to_string()),
    });
    report.customers = customer::Entity::insert_many(customers)
        .on_conflict(OnConflict::column(customer::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    if invoice::Entity::find().count(db).await? == 0 {
        let invoices = INVOICES
            .iter()
            .map(|(customer_id, amount, status, date)| {
                let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|e| AppError::internal(format!("bad seed date {}: {}", date, e)))?;
                Ok(invoice::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    customer_id: Set(*customer_id),
                    amount: Set(*amount),
                    status: Set(status.as_str().to_string()),
                    date: Set(date),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        report.invoices = invoice::Entity::insert_many(invoices)
            .exec_without_returning(db)
            .await?;
    }

    tracing::info!(
        users = report.users,
        customers = report.customers,
        invoices = report.invoices,
        "Seed data inserted"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_invoices_reference_seed_customers() {
        for (customer_id, amount, _, date) in INVOICES {
            assert!(CUSTOMERS.iter().any(|(id, ..)| id == customer_id));
            assert!(*amount > 0);
            assert!(NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
        }
    }
}
