//! HTTP-level tests for the REST surface, driven through the router with
//! `oneshot` against an in-memory database.

#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rusqlite::Connection;
use serde_json::{json, Value};
use std::io::Write;
use swift_registry::api::{build_router, AppState};
use swift_registry::{create_swift_code, setup_database, Config, NewSwiftCode};
use tempfile::TempDir;
use tower::ServiceExt;

// ── Test app builder ───────────────────────────────────────────

fn record(code: &str, bank: &str, iso2: &str, country: &str) -> NewSwiftCode {
    NewSwiftCode {
        swift_code: code.to_string(),
        bank_name: bank.to_string(),
        address: Some(format!("{bank} street 1")),
        country_iso2: iso2.to_string(),
        country_name: country.to_string(),
        is_headquarter: None,
    }
}

fn seeded_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    setup_database(&conn).unwrap();

    for input in [
        record("AAAAPLPWXXX", "Alpha Bank", "PL", "POLAND"),
        record("AAAAPLPWKRK", "Alpha Bank Krakow", "PL", "POLAND"),
        record("AAAAPLPWGDN", "Alpha Bank Gdansk", "PL", "POLAND"),
        record("BBBBPLPWXXX", "Beta Bank", "PL", "POLAND"),
        record("CCCCDEFFXXX", "Gamma Bank", "DE", "GERMANY"),
    ] {
        create_swift_code(&conn, input).unwrap();
    }

    conn
}

fn app_with(conn: Connection, config: Config) -> axum::Router {
    build_router(AppState::new(conn, config))
}

fn app() -> axum::Router {
    app_with(seeded_connection(), Config::default())
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    // Non-JSON bodies come back as a string so contract tests can fail cleanly.
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ── Service endpoints ──────────────────────────────────────────

#[tokio::test]
async fn test_root_and_health() {
    let (status, body) = send(app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to the SWIFT Codes API.");

    let (status, body) = send(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ── Lookup ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_headquarters_embeds_branches() {
    let (status, body) = send(app(), get("/v1/swift-codes/AAAAPLPWXXX")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["swift_code"], "AAAAPLPWXXX");
    assert_eq!(body["is_headquarter"], true);
    assert_eq!(body["country_name"], "POLAND");

    let branches = body["branches"].as_array().unwrap();
    let codes: Vec<&str> = branches
        .iter()
        .map(|b| b["swift_code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["AAAAPLPWGDN", "AAAAPLPWKRK"]);
    assert!(branches[0].get("country_name").is_none());
    assert_eq!(branches[0]["is_headquarter"], false);
}

#[tokio::test]
async fn test_get_headquarters_without_branches_has_empty_list() {
    let (status, body) = send(app(), get("/v1/swift-codes/BBBBPLPWXXX")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["branches"], json!([]));
}

#[tokio::test]
async fn test_get_branch_has_no_branches_key() {
    let (status, body) = send(app(), get("/v1/swift-codes/AAAAPLPWKRK")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_headquarter"], false);
    assert!(body.get("branches").is_none());
}

#[tokio::test]
async fn test_get_unknown_code_is_404() {
    let (status, body) = send(app(), get("/v1/swift-codes/ZZZZPLPWXXX")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "SWIFT code not found");
}

#[tokio::test]
async fn test_get_malformed_code_is_422() {
    for code in ["SHORT", "TOOLONGCODE12", "INV%40LIDX", "aaaaplpwxxx"] {
        let (status, body) = send(app(), get(&format!("/v1/swift-codes/{code}"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "code {code}");
        assert!(body["detail"].is_string());
    }
}

// ── Country listing ────────────────────────────────────────────

#[tokio::test]
async fn test_country_listing() {
    let (status, body) = send(app(), get("/v1/swift-codes/country/PL")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country_iso2"], "PL");
    assert_eq!(body["country_name"], "POLAND");

    let codes: Vec<&str> = body["swift_codes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["swift_code"].as_str().unwrap())
        .collect();
    assert_eq!(
        codes,
        vec!["AAAAPLPWGDN", "AAAAPLPWKRK", "AAAAPLPWXXX", "BBBBPLPWXXX"]
    );
}

#[tokio::test]
async fn test_country_unknown_is_404() {
    let (status, body) = send(app(), get("/v1/swift-codes/country/FR")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Country ISO2 code not found in database");
}

#[tokio::test]
async fn test_country_malformed_is_422() {
    for iso2 in ["P", "POL", "pl", "P1"] {
        let (status, _) = send(app(), get(&format!("/v1/swift-codes/country/{iso2}"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "iso2 {iso2}");
    }
}

#[tokio::test]
async fn test_country_pagination() {
    let (status, body) = send(app(), get("/v1/swift-codes/country/PL?skip=1&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body["swift_codes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["swift_code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["AAAAPLPWKRK", "AAAAPLPWXXX"]);

    // Past the end is still a known country.
    let (status, body) = send(app(), get("/v1/swift-codes/country/PL?skip=50")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country_name"], "POLAND");
    assert_eq!(body["swift_codes"], json!([]));
}

#[tokio::test]
async fn test_country_bad_page_is_422() {
    for query in ["skip=-1", "limit=0", "limit=1001", "skip=abc"] {
        let uri = format!("/v1/swift-codes/country/PL?{query}");
        let (status, _) = send(app(), get(&uri)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "query {query}");
    }
}

// ── Create ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_then_get() {
    let conn = seeded_connection();
    let router = app_with(conn, Config::default());

    let payload = json!({
        "swift_code": "ddddusnyxxx",
        "bank_name": "Delta Bank",
        "address": "1 Wall St",
        "country_iso2": "us",
        "country_name": "united states",
        "is_headquarter": false
    });

    let (status, body) = send(router.clone(), post_json("/v1/swift-codes", &payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "SWIFT code 'DDDDUSNYXXX' created successfully.");

    let (status, body) = send(router, get("/v1/swift-codes/DDDDUSNYXXX")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country_iso2"], "US");
    assert_eq!(body["country_name"], "UNITED STATES");
    // Derived from the code, not taken from the request.
    assert_eq!(body["is_headquarter"], true);
}

#[tokio::test]
async fn test_create_duplicate_is_409() {
    let payload = json!({
        "swift_code": "AAAAPLPWXXX",
        "bank_name": "Someone Else",
        "country_iso2": "PL",
        "country_name": "POLAND"
    });

    let router = app();
    let (status, body) = send(router.clone(), post_json("/v1/swift-codes", &payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "SWIFT code 'AAAAPLPWXXX' already exists.");

    let (_, body) = send(router, get("/v1/swift-codes/AAAAPLPWXXX")).await;
    assert_eq!(body["bank_name"], "Alpha Bank");
}

#[tokio::test]
async fn test_create_invalid_is_422() {
    let payload = json!({
        "swift_code": "BAD",
        "bank_name": "Bad Bank",
        "country_iso2": "POL",
        "country_name": "POLAND"
    });

    let (status, body) = send(app(), post_json("/v1/swift-codes", &payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("swift_code"));
    assert!(detail.contains("country_iso2"));
}

#[tokio::test]
async fn test_create_missing_field_is_422_with_detail() {
    let payload = json!({
        "swift_code": "AAAAPLPWXXX",
        "country_iso2": "PL",
        "country_name": "POLAND"
    });

    let (status, body) = send(app(), post_json("/v1/swift-codes", &payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("body: "));
    assert!(detail.contains("bank_name"));
}

#[tokio::test]
async fn test_create_malformed_json_is_422_with_detail() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/swift-codes")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let router = app();
    let (status, body) = send(router.clone(), request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (_, body) = send(router, get("/v1/swift-codes/country/PL")).await;
    assert_eq!(body["swift_codes"].as_array().unwrap().len(), 4);
}

// ── Delete ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_then_lookup_is_404() {
    let router = app();

    let (status, body) = send(router.clone(), delete("/v1/swift-codes/AAAAPLPWKRK")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "SWIFT code 'AAAAPLPWKRK' deleted successfully.");

    let (status, _) = send(router.clone(), get("/v1/swift-codes/AAAAPLPWKRK")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(router.clone(), get("/v1/swift-codes/AAAAPLPWXXX")).await;
    assert_eq!(body["branches"].as_array().unwrap().len(), 1);

    let (status, body) = send(router, delete("/v1/swift-codes/AAAAPLPWKRK")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "SWIFT code not found or error during deletion.");
}

#[tokio::test]
async fn test_delete_malformed_is_422() {
    let (status, _) = send(app(), delete("/v1/swift-codes/NOPE")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ── Bulk load ──────────────────────────────────────────────────

const LOAD_CSV: &str = "\
COUNTRY ISO2 CODE,SWIFT CODE,CODE TYPE,NAME,ADDRESS,TOWN NAME,COUNTRY NAME,TIME ZONE
PL,AAAAPLPWXXX,BIC11,Alpha Bank,Warsaw,WARSZAWA,POLAND,Europe/Warsaw
CL,EEEECLRMXXX,BIC11,Epsilon Bank,Santiago,SANTIAGO,chile,Pacific/Easter
CL,EEEECLRMSCL,BIC11,Epsilon Bank Branch,,SANTIAGO,chile,Pacific/Easter
FR,INVALID,BIC11,Invalid Bank,,PARIS,France,Europe/Paris
";

#[tokio::test]
async fn test_load_data_imports_configured_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("swift_codes.csv");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(LOAD_CSV.as_bytes())
        .unwrap();

    let config = Config {
        data_path: path,
        ..Config::default()
    };
    let router = app_with(seeded_connection(), config);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/load-data")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router.clone(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Data loading complete. Added: 2, Skipped (existing or validation error): 1, DB Errors: 0."
    );

    let (status, body) = send(router, get("/v1/swift-codes/EEEECLRMXXX")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["country_name"], "CHILE");
    assert_eq!(body["branches"][0]["swift_code"], "EEEECLRMSCL");
}

#[tokio::test]
async fn test_load_data_missing_file_is_400() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        data_path: dir.path().join("missing.xlsx"),
        ..Config::default()
    };

    let request = Request::builder()
        .method("POST")
        .uri("/v1/load-data")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app_with(seeded_connection(), config), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("missing.xlsx"));
}
