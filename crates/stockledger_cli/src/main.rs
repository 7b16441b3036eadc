//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `stockledger_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use stockledger_core::db::migrations::latest_version;
use stockledger_core::db::open_db_in_memory;
use stockledger_core::{SqliteLedgerRepository, StockLedger};

fn main() {
    println!("stockledger_core version={}", stockledger_core::core_version());
    println!("stockledger_core schema_version={}", latest_version());

    // Tiny in-memory probe to validate migrations and repository wiring
    // independently from any UI runtime.
    match open_db_in_memory() {
        Ok(conn) => match SqliteLedgerRepository::try_new(&conn) {
            Ok(repo) => {
                let ledger = StockLedger::new(repo);
                match ledger.query_stock() {
                    Ok(products) => println!("stockledger_core probe=ok products={}", products.len()),
                    Err(err) => eprintln!("stockledger_core probe=error error={err}"),
                }
            }
            Err(err) => eprintln!("stockledger_core probe=error error={err}"),
        },
        Err(err) => eprintln!("stockledger_core probe=error error={err}"),
    }
}
