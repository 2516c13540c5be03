//! Query builder example for nqorm
//!
//! Run with: cargo run --example builder -p nqorm
//!
//! Renders each builder in both forms without contacting a server.

use nqorm::qb::{self, SqlQb};
use nqorm::{ConflictResolution, NqError, Op, Record};

fn main() -> Result<(), NqError> {
    // ============================================
    // SELECT
    // ============================================
    println!("=== SELECT ===\n");

    let q = qb::select("products")?
        .select(["id", "name", "price"])
        .where_("price", Op::LessThan, 100)
        .where_in("category", ["lamps", "chairs"])
        .where_not_null("published_at")
        .order_by_desc("price")
        .paginate(2, 25);

    println!("SQL:     {}", q.to_sql());
    let (sql, bindings) = q.to_parameterized_sql();
    println!("$N SQL:  {sql}");
    println!("binds:   {bindings:?}");
    println!("payload: {}", serde_json::to_string_pretty(&q.to_array()?)?);
    println!("count:   {}\n", q.to_count_sql());

    // Operator given as a string, e.g. from a request parameter.
    let q = qb::select("memories")?.where_op("embedding", "NEUROMATCH", "sunny beach")?;
    println!("SQL:     {}\n", q.to_sql());

    // ============================================
    // INSERT
    // ============================================
    println!("=== INSERT ===\n");

    let q = qb::insert("products")?
        .record(Record::new().set("name", "Desk lamp").set("price", 35))
        .record(Record::new().set("name", "Stool").set("category", "chairs"))
        .on_conflict(ConflictResolution::Ignore);

    println!("SQL:     {}", q.to_sql());
    println!("payload: {}\n", serde_json::to_string_pretty(&q.to_array()?)?);

    // ============================================
    // UPDATE
    // ============================================
    println!("=== UPDATE ===\n");

    let q = qb::update("products")?
        .set("category", "lighting")
        .decrement("stock", 1)
        .where_eq("id", 7)
        .optimistic_lock_version(4);

    println!("SQL:     {}", q.to_sql());
    println!("payload: {}\n", serde_json::to_string_pretty(&q.to_array()?)?);

    // ============================================
    // DELETE
    // ============================================
    println!("=== DELETE ===\n");

    let q = qb::delete("products")?
        .where_("name", Op::StartsWith, "Old %")
        .cascade(true);

    println!("SQL:     {}", q.to_sql());
    println!("payload: {}\n", serde_json::to_string_pretty(&q.to_array()?)?);

    // ============================================
    // Invalid builders
    // ============================================
    println!("=== Validation ===\n");

    match qb::update("products")?.where_eq("id", 1).validate() {
        Ok(()) => println!("unexpected: valid"),
        Err(e) => println!("UPDATE without SET: {e}"),
    }
    match qb::select("") {
        Ok(_) => println!("unexpected: valid"),
        Err(e) => println!("empty table: {e}"),
    }

    Ok(())
}
