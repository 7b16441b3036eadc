use stockledger_core::db::open_db;
use stockledger_core::{LedgerError, LedgerRepository, Product, SqliteLedgerRepository};
use std::sync::{Arc, Barrier};
use std::thread;

/// Two sellers race for the same stock. With quantity 5 and two requests of 3,
/// exactly one must succeed; the loser must observe the committed decrement
/// and be rejected, leaving stock at 2 and never negative.
#[test]
fn concurrent_sales_cannot_overdraw_stock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");

    let seed_conn = open_db(&path).unwrap();
    let pen = Product::new("Pen", "Stationery", 10.0, 5);
    {
        let repo = SqliteLedgerRepository::try_new(&seed_conn).unwrap();
        repo.add_product(&pen).unwrap();
    }
    drop(seed_conn);

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for _ in 0..2 {
        let barrier = Arc::clone(&barrier);
        let path = path.clone();
        handles.push(thread::spawn(move || {
            let conn = open_db(&path).unwrap();
            let repo = SqliteLedgerRepository::try_new(&conn).unwrap();
            barrier.wait();
            repo.record_sale("Pen", 3)
        }));
    }

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let rejections = outcomes
        .iter()
        .filter(|outcome| {
            matches!(
                outcome,
                Err(LedgerError::InsufficientStock {
                    requested: 3,
                    available: 2,
                })
            )
        })
        .count();
    assert_eq!(successes, 1, "exactly one sale must win: {outcomes:?}");
    assert_eq!(rejections, 1, "the loser must be rejected: {outcomes:?}");

    let conn = open_db(&path).unwrap();
    let repo = SqliteLedgerRepository::try_new(&conn).unwrap();
    let remaining = repo.get_product(pen.uuid).unwrap().unwrap().quantity;
    assert_eq!(remaining, 2);
    assert_eq!(repo.list_sales().unwrap().len(), 1);
}

/// Readers on a separate connection must never observe a decrement without
/// its sale row. Sampled after the writer finishes, the two tables agree.
#[test]
fn stock_and_sale_log_agree_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("consistency.db");

    let writer_conn = open_db(&path).unwrap();
    let pen = Product::new("Pen", "Stationery", 10.0, 50);
    let writer = SqliteLedgerRepository::try_new(&writer_conn).unwrap();
    writer.add_product(&pen).unwrap();

    for _ in 0..5 {
        writer.record_sale("Pen", 4).unwrap();
    }

    let reader_conn = open_db(&path).unwrap();
    let reader = SqliteLedgerRepository::try_new(&reader_conn).unwrap();
    let product = reader.get_product(pen.uuid).unwrap().unwrap();
    let sold: u32 = reader
        .list_sales()
        .unwrap()
        .iter()
        .map(|sale| sale.quantity_sold)
        .sum();
    assert_eq!(product.quantity + sold, 50);
}
