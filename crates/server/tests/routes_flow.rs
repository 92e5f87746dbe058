use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use service::{FileRecordStore, PORTFOLIO_COLLECTIONS};
use tower::ServiceExt;
use uuid::Uuid;

use server::routes::{self, ServerState};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

async fn build_app() -> anyhow::Result<(Router, std::path::PathBuf)> {
    let dir = std::env::temp_dir().join(format!("portfolio_routes_{}", Uuid::new_v4()));
    let store = FileRecordStore::open(&dir, PORTFOLIO_COLLECTIONS).await?;
    let state = ServerState { store };
    Ok((routes::build_router(state, cors()), dir))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&b)?))?,
        None => builder.body(Body::empty())?,
    };
    let res = app.clone().oneshot(req).await?;
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

#[tokio::test]
async fn list_collection_crud_flow() -> anyhow::Result<()> {
    let (app, dir) = build_app().await?;

    let (status, body) = send(&app, "GET", "/projetos", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // nested `item` payload, client id ignored
    let (status, body) = send(&app, "POST", "/projetos", Some(json!({"item": {"titulo": "X", "id": 50}}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 1, "titulo": "X"}));

    // raw body payload
    let (status, body) = send(&app, "POST", "/projetos", Some(json!({"titulo": "Y"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 2);

    let (status, body) = send(&app, "GET", "/projetos/2", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 2, "titulo": "Y"}));

    let (status, body) = send(&app, "PUT", "/projetos/2", Some(json!({"item": {"titulo": "Z", "id": 9}}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item updated");
    assert_eq!(body["item"], json!({"id": 2, "titulo": "Z"}));

    let (status, body) = send(&app, "DELETE", "/projetos/1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Item deleted"}));

    let (status, _) = send(&app, "GET", "/projetos/1", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let on_disk: Value = serde_json::from_slice(&tokio::fs::read(dir.join("projetos.json")).await?)?;
    assert_eq!(on_disk, json!([{"id": 2, "titulo": "Z"}]));

    let _ = tokio::fs::remove_dir_all(&dir).await;
    Ok(())
}

#[tokio::test]
async fn missing_ids_are_404_with_message() -> anyhow::Result<()> {
    let (app, dir) = build_app().await?;

    for (method, uri, body) in [
        ("GET", "/cursos/7", None),
        ("GET", "/cursos/abc", None),
        ("PUT", "/competencias/5", Some(json!({"nome": "Rust"}))),
        ("DELETE", "/cursos/1", None),
    ] {
        let (status, body) = send(&app, method, uri, body).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body["error"], "Not Found");
        assert!(body["message"].is_string());
    }

    // the failed update did not touch the file
    let text = tokio::fs::read_to_string(dir.join("competencias.json")).await?;
    assert_eq!(text, "[]");

    let _ = tokio::fs::remove_dir_all(&dir).await;
    Ok(())
}

#[tokio::test]
async fn singletons_replace_wholesale() -> anyhow::Result<()> {
    let (app, dir) = build_app().await?;

    let (status, body) = send(&app, "PUT", "/basicos", Some(json!({"item": {"nome": "Ana", "cidade": "Recife"}}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"nome": "Ana", "cidade": "Recife"}));

    let (_, _) = send(&app, "PUT", "/basicos", Some(json!({"item": {"nome": "Ana"}}))).await?;
    let (status, body) = send(&app, "GET", "/basicos", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"nome": "Ana"}));

    let (status, _) = send(&app, "PUT", "/redes", Some(json!({"github": "ana"}))).await?;
    assert_eq!(status, StatusCode::OK);

    // singletons have no id routes and accept no POST
    let (status, _) = send(&app, "POST", "/redes", Some(json!({"github": "x"}))).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, snapshot) = send(&app, "GET", "/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["dadosBasicos"], json!({"nome": "Ana"}));
    assert_eq!(snapshot["redesSociais"], json!({"github": "ana"}));
    assert_eq!(snapshot["cursos"], json!([]));

    let _ = tokio::fs::remove_dir_all(&dir).await;
    Ok(())
}

#[tokio::test]
async fn non_object_payload_is_bad_request() -> anyhow::Result<()> {
    let (app, dir) = build_app().await?;

    let (status, body) = send(&app, "POST", "/cursos", Some(json!(["a", "b"]))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, body) = send(&app, "GET", "/cursos", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let _ = tokio::fs::remove_dir_all(&dir).await;
    Ok(())
}

async fn send_raw(app: &Router, method: &str, uri: &str, content_type: Option<&str>, body: &'static str) -> anyhow::Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    let res = app.clone().oneshot(builder.body(Body::from(body))?).await?;
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn unreadable_bodies_get_json_validation_errors() -> anyhow::Result<()> {
    let (app, dir) = build_app().await?;

    let (status, body) = send_raw(&app, "POST", "/projetos", Some("application/json"), "{not json").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
    assert!(body["message"].is_string());

    // no content-type at all
    let (status, body) = send_raw(&app, "PUT", "/basicos", None, r#"{"nome":"A"}"#).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (status, body) = send_raw(&app, "PUT", "/projetos/1", Some("text/plain"), r#"{"nome":"A"}"#).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");

    let (_, body) = send(&app, "GET", "/projetos", None).await?;
    assert_eq!(body, json!([]));
    let (_, body) = send(&app, "GET", "/basicos", None).await?;
    assert_eq!(body, json!({}));

    let _ = tokio::fs::remove_dir_all(&dir).await;
    Ok(())
}

#[tokio::test]
async fn health_ok()-> anyhow::Result<()> {
    let (app, dir) = build_app().await?;
    let (status, body) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    let _ = tokio::fs::remove_dir_all(&dir).await;
    Ok(())
}
