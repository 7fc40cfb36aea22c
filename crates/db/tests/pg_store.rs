//! PostgreSQL store semantics. Needs `DATABASE_URL`; run with
//! `cargo test -p ipa-db -- --ignored`.

use std::collections::BTreeMap;

use serde_json::json;
use sqlx::PgPool;

use ipa_db::{PgStore, RecordStore};

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn set_get_and_replace(pool: PgPool) {
    let store = PgStore::new(pool);
    store
        .set("proyectos/b_1/k_1", json!({"alumno": "Ana", "años": [2024], "proyectos": {}}))
        .await
        .unwrap();
    store.set("proyectos/b_10/k", json!({"alumno": "Pau"})).await.unwrap();

    assert_eq!(
        store.get("proyectos/b_1").await.unwrap(),
        Some(json!({"k_1": {"alumno": "Ana", "años": [2024], "proyectos": {}}}))
    );

    store.set("proyectos/b_1/k_1", json!({"alumno": "Ana P"})).await.unwrap();
    assert_eq!(
        store.get("proyectos/b_1/k_1").await.unwrap(),
        Some(json!({"alumno": "Ana P"}))
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn leaf_ancestor_is_replaced(pool: PgPool) {
    let store = PgStore::new(pool);
    store.set("a", json!(1)).await.unwrap();
    store.set("a/b", json!(2)).await.unwrap();
    assert_eq!(store.get("a").await.unwrap(), Some(json!({"b": 2})));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn remove_prunes_and_update_is_atomic(pool: PgPool) {
    let store = PgStore::new(pool);
    store.set("p/b/k", json!({"alumno": "Ana"})).await.unwrap();
    store.remove("p/b/k").await.unwrap();
    assert_eq!(store.get("p").await.unwrap(), None);

    let entries = BTreeMap::from([
        ("k0".to_string(), json!({"alumno": "A"})),
        ("k1".to_string(), json!({"alumno": "B"})),
    ]);
    store.update("p/b", entries).await.unwrap();
    assert_eq!(
        store.get("p/b").await.unwrap(),
        Some(json!({"k0": {"alumno": "A"}, "k1": {"alumno": "B"}}))
    );

    store.health_check().await.unwrap();
}
