//! Concurrent stock movements on the same products.

mod common;

use std::path::PathBuf;

use common::{new_product, new_user, setup, Harness};
use medstock_core::StockChange;
use medstock_db::{Database, DbConfig};
use uuid::Uuid;

#[tokio::test]
async fn test_concurrent_adds_are_not_lost() {
    let h = setup().await;
    let product_id = h.product("Paracetamol 500mg", 0, 10, 500).await.id;

    let mut handles = Vec::new();
    for i in 0..25 {
        let inventory = h.inventory.clone();
        let user_id = h.user_id;
        handles.push(tokio::spawn(async move {
            inventory
                .add_stock(StockChange::new(product_id, user_id, 1 + i % 4))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let expected: i64 = (0..25).map(|i| 1 + i % 4).sum();
    assert_eq!(h.stock_of(product_id).await, expected);
    assert_eq!(h.movement_count().await, 25);
    h.assert_consistent().await;
}

async fn file_database() -> (Harness, PathBuf) {
    let path = std::env::temp_dir().join(format!("medstock-test-{}.db", Uuid::new_v4()));
    let db = Database::new(DbConfig::new(&path).max_connections(4))
        .await
        .unwrap();
    let inventory = db.inventory();
    let user = inventory
        .create_user(new_user("Night Shift", "night@clinic.org"))
        .await
        .unwrap();

    (
        Harness {
            db,
            inventory,
            user_id: user.id,
        },
        path,
    )
}

async fn cleanup(h: Harness, path: PathBuf) {
    h.db.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_movements_across_connections() {
    let (h, path) = file_database().await;

    let busy = h
        .inventory
        .create_product(new_product("Amoxicillin 250mg", 100, 10, 800), h.user_id)
        .await
        .unwrap()
        .id;

    let mut handles = Vec::new();
    for i in 0..40 {
        let inventory = h.inventory.clone();
        let user_id = h.user_id;
        handles.push(tokio::spawn(async move {
            // 20 adds of 5 and 20 removes of 3; removals never exceed the
            // opening 100 whatever the interleaving
            if i % 2 == 0 {
                inventory
                    .add_stock(StockChange::new(busy, user_id, 5))
                    .await
            } else {
                inventory
                    .remove_stock(StockChange::new(busy, user_id, 3))
                    .await
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(h.stock_of(busy).await, 100 + 20 * 5 - 20 * 3);
    assert_eq!(
        h.db.movements().ledger_balance(busy).await.unwrap(),
        h.stock_of(busy).await
    );
    h.assert_consistent().await;

    cleanup(h, path).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_removals_never_oversell() {
    let (h, path) = file_database().await;

    let scarce = h
        .inventory
        .create_product(new_product("Antivenom Vial", 10, 2, 15_000), h.user_id)
        .await
        .unwrap()
        .id;

    let mut handles = Vec::new();
    for _ in 0..30 {
        let inventory = h.inventory.clone();
        let user_id = h.user_id;
        handles.push(tokio::spawn(async move {
            inventory
                .remove_stock(StockChange::new(scarce, user_id, 1))
                .await
        }));
    }

    let mut succeeded = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(product) => {
                assert!(product.stock >= 0);
                succeeded += 1;
            }
            Err(e) => {
                assert!(e.is_insufficient_stock(), "unexpected error: {e}");
                refused += 1;
            }
        }
    }

    assert_eq!(succeeded, 10);
    assert_eq!(refused, 20);
    assert_eq!(h.stock_of(scarce).await, 0);

    let stats = h.inventory.get_stats().await.unwrap();
    assert_eq!(stats.total_out_of_stock, 1);
    assert_eq!(stats.total_stocks_removed, 10);
    assert_eq!(stats.total_stocks_removed_value_cents, 150_000);
    h.assert_consistent().await;

    cleanup(h, path).await;
}
