#![allow(dead_code)]

use medstock_core::{NewProduct, NewUser, Product, Role, Stats};
use medstock_db::{Database, DbConfig, InventoryService};

pub struct Harness {
    pub db: Database,
    pub inventory: InventoryService,
    pub user_id: i64,
}

/// Fresh in-memory database with one staff user.
pub async fn setup() -> Harness {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let inventory = db.inventory();
    let user = inventory
        .create_user(new_user("Amina Odhiambo", "amina@clinic.org"))
        .await
        .unwrap();

    Harness {
        db,
        inventory,
        user_id: user.id,
    }
}

pub fn new_user(name: &str, email: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        phone_number: "+254711000000".to_string(),
        role: Role::Staff,
    }
}

pub fn new_product(name: &str, stock: i64, threshold: i64, price_cents: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: None,
        price_cents,
        stock,
        low_stock_threshold: threshold,
        category: "General".to_string(),
        unit: "box".to_string(),
    }
}

impl Harness {
    pub async fn product(&self, name: &str, stock: i64, threshold: i64, price_cents: i64) -> Product {
        self.inventory
            .create_product(new_product(name, stock, threshold, price_cents), self.user_id)
            .await
            .unwrap()
    }

    pub async fn stock_of(&self, product_id: i64) -> i64 {
        self.inventory.get_product(product_id).await.unwrap().stock
    }

    pub async fn movement_count(&self) -> i64 {
        self.db.movements().count(None).await.unwrap()
    }

    /// Every counter recomputed from the tables, independent of the
    /// incremental bookkeeping.
    pub async fn recount(&self) -> Stats {
        sqlx::query_as::<_, Stats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE deleted = 0) AS total_users,
                (SELECT COUNT(*) FROM products WHERE deleted = 0) AS total_products,
                (SELECT COUNT(*) FROM products
                    WHERE deleted = 0 AND stock > 0 AND stock <= low_stock_threshold)
                    AS total_low_stock,
                (SELECT COUNT(*) FROM products WHERE deleted = 0 AND stock <= 0)
                    AS total_out_of_stock,
                (SELECT COALESCE(SUM(quantity), 0) FROM movements WHERE movement_type = 'ADD')
                    AS total_stocks_added,
                (SELECT COALESCE(SUM(quantity * price_cents), 0) FROM movements
                    WHERE movement_type = 'ADD') AS total_stocks_added_value_cents,
                (SELECT COALESCE(SUM(quantity), 0) FROM movements WHERE movement_type = 'REMOVE')
                    AS total_stocks_removed,
                (SELECT COALESCE(SUM(quantity * price_cents), 0) FROM movements
                    WHERE movement_type = 'REMOVE') AS total_stocks_removed_value_cents,
                (SELECT COALESCE(SUM(stock * price_cents), 0) FROM products WHERE deleted = 0)
                    AS total_value_cents
            "#,
        )
        .fetch_one(self.db.pool())
        .await
        .unwrap()
    }

    /// Level counters and value must always equal a recount; cumulative
    /// counters must equal the ledger totals.
    pub async fn assert_consistent(&self) {
        let stats = self.inventory.get_stats().await.unwrap();
        assert_eq!(stats, self.recount().await);
    }
}
