//! HTTP client example for nqorm
//!
//! Run with: cargo run --example http_client -p nqorm
//!
//! Configure via environment:
//! NEUROQUANTUM_URL=http://localhost:8080/api/v1
//! NEUROQUANTUM_API_KEY=nq_live_...
//!
//! Install a `tracing` subscriber to see `nqorm.sql`, `nqorm.http` and
//! `nqorm.tx` events.

use nqorm::{ClientConfig, NqClient, NqError, Op, Record};

#[tokio::main]
async fn main() -> Result<(), NqError> {
    let client = NqClient::connect(ClientConfig::from_env()?)?;

    // Insert through /tables/insert
    let inserted = client
        .table("products")?
        .insert([
            Record::new().set("name", "Desk lamp").set("price", 35).set("stock", 10),
            Record::new().set("name", "Stool").set("price", 60).set("stock", 3),
        ])
        .await?;
    println!("inserted {} rows ({} failed)", inserted.inserted_count, inserted.failed_count);

    // Read through /tables/query
    let cheap = client
        .table("products")?
        .where_("price", Op::LessThan, 50)
        .order_by_asc("price")
        .get()
        .await?;
    println!("cheap products: {cheap:?}");

    let names = client.table("products")?.pluck("name").await?;
    println!("names: {names:?}");

    // COUNT(*) through /query
    let in_stock = client
        .table("products")?
        .where_("stock", Op::GreaterThan, 0)
        .count()
        .await?;
    println!("in stock: {in_stock}");

    // A transaction: both statements or neither
    let result = client
        .transaction(async || {
            client
                .query(r#"UPDATE "products" SET "stock" = "stock" - 1 WHERE "name" = 'Stool'"#)
                .await?;
            client
                .query(r#"INSERT INTO "orders" ("product", "qty") VALUES ('Stool', 1)"#)
                .await?;
            Ok::<_, NqError>(())
        })
        .await;
    match result {
        Ok(()) => println!("order placed"),
        Err(e) => println!("order rolled back: {e}"),
    }

    // Update and delete through /tables/*
    let updated = client
        .table("products")?
        .where_eq("name", "Desk lamp")
        .update_set([("price", 30)])
        .await?;
    println!("updated {} rows", updated.updated_count);

    let deleted = client
        .table("products")?
        .where_in("name", ["Desk lamp", "Stool"])
        .delete_rows()
        .await?;
    println!("deleted {} rows", deleted.deleted_count);

    Ok(())
}
