mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use common::*;
use ipa_db::repositories::CatalogRepo;
use ipa_db::MemoryStore;

#[tokio::test]
async fn templates_get_consecutive_ids() {
    let store = Arc::new(MemoryStore::new());
    let app = build_test_app(Arc::clone(&store));
    let token = profesor_token();

    for nombre in ["Robot", "Hort", "Web"] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/catalogo",
            json!({ "nombre": nombre, "profesor": "Marta" }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = delete_auth(app.clone(), "/api/v1/catalogo/proyecto_2", &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/catalogo",
        json!({ "nombre": "Radio", "profesor": "Jordi" }),
        &token,
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"], "proyecto_4");

    let response = get_auth(app, "/api/v1/catalogo", &token).await;
    let rows = body_json(response).await["data"].clone();
    let ids: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["proyecto_1", "proyecto_3", "proyecto_4"]);
    assert_eq!(rows[2]["nombre"], "Radio");
    assert_eq!(rows[2]["profesor"], "Jordi");
}

#[tokio::test]
async fn update_and_missing_template() {
    let store = Arc::new(MemoryStore::new());
    let app = build_test_app(Arc::clone(&store));
    let token = profesor_token();

    post_json_auth(
        app.clone(),
        "/api/v1/catalogo",
        json!({ "nombre": "Robot", "profesor": "Marta" }),
        &token,
    )
    .await;

    let response = put_json_auth(
        app.clone(),
        "/api/v1/catalogo/proyecto_1",
        json!({ "nombre": "Robòtica", "profesor": "Marta" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let template = CatalogRepo::find(store.as_ref(), "proyecto_1").await.unwrap().unwrap();
    assert_eq!(template.nombre, "Robòtica");

    let response = put_json_auth(
        app.clone(),
        "/api/v1/catalogo/proyecto_9",
        json!({ "nombre": "Radio", "profesor": "Jordi" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        app,
        "/api/v1/catalogo",
        json!({ "nombre": "  ", "profesor": "Jordi" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn csv_import_accepts_header_synonyms() {
    let store = Arc::new(MemoryStore::new());
    let app = build_test_app(Arc::clone(&store));
    let token = profesor_token();

    post_json_auth(
        app.clone(),
        "/api/v1/catalogo",
        json!({ "nombre": "Robot", "profesor": "Marta" }),
        &token,
    )
    .await;

    let csv = "\u{feff}Nom Projecte;Nom Creador\nHort;Jordi\n;Laia\nWeb;Marta\n";
    let response = post_text_auth(app, "/api/v1/catalogo/importar", csv, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["imported"], 2);
    assert_eq!(body["data"]["ids"], json!(["proyecto_2", "proyecto_3"]));

    let templates = CatalogRepo::list(store.as_ref()).await.unwrap();
    assert_eq!(templates.len(), 3);
    assert_eq!(templates[2].1.nombre, "Web");
    assert_eq!(templates[2].1.profesor, "Marta");
}

#[tokio::test]
async fn csv_import_without_valid_rows_fails() {
    let store = Arc::new(MemoryStore::new());
    let app = build_test_app(Arc::clone(&store));
    let token = profesor_token();

    let response = post_text_auth(
        app.clone(),
        "/api/v1/catalogo/importar",
        "projecte;profesor\n;Marta\n",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_text_auth(app, "/api/v1/catalogo/importar", "titol;autor\nRobot;Marta\n", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(CatalogRepo::list(store.as_ref()).await.unwrap().is_empty());
}

#[tokio::test]
async fn encoded_slash_in_template_id_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let app = build_test_app(Arc::clone(&store));
    let token = profesor_token();

    post_json_auth(
        app.clone(),
        "/api/v1/catalogo",
        json!({ "nombre": "Robot", "profesor": "Marta" }),
        &token,
    )
    .await;

    let response = delete_auth(app.clone(), "/api/v1/catalogo/proyecto_1%2Fprofesor", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = put_json_auth(
        app,
        "/api/v1/catalogo/proyecto_1%2Fprofesor",
        json!({ "nombre": "Hort", "profesor": "Jordi" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let template = CatalogRepo::find(store.as_ref(), "proyecto_1").await.unwrap().unwrap();
    assert_eq!(template.nombre, "Robot");
    assert_eq!(template.profesor, "Marta");
}
