//! # GasDepot Back-Office API
//!
//! HTTP JSON surface through which POS terminals record transactions and
//! read them back.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Back-Office API                                 │
//! │                                                                         │
//! │  Terminal ──► axum Router ──► Principal (x-store-id, x-staff-id)        │
//! │                    │                                                    │
//! │                    ├── POST /api/transactions ──► TransactionRecorder   │
//! │                    ├── GET  /api/transactions ───┐                      │
//! │                    ├── GET  …/summary ───────────┼─► TransactionHistory │
//! │                    ├── GET  …/{id} ──────────────┘                      │
//! │                    └── GET  /health ───────────────► Database           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]. `GASDEPOT_CONFIG` names the TOML file; `GASDEPOT_*`
//! variables override it.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use gasdepot_db::{Database, DbResult, TransactionRecorder};

pub use config::ServerConfig;
pub use error::{ApiError, ErrorCode};

use crate::config::HistoryConfig;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub recorder: TransactionRecorder,
    pub history: HistoryConfig,
}

impl AppState {
    pub fn new(db: Database, config: &ServerConfig) -> Self {
        let recorder = db.recorder(config.engine);
        AppState {
            db,
            recorder,
            history: config.history,
        }
    }

    /// Opens the database described by `config` and wires the engine.
    pub async fn connect(config: &ServerConfig) -> DbResult<Self> {
        let db = Database::new(config.db_config()).await?;
        Ok(AppState::new(db, config))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/transactions",
            post(routes::transactions::create).get(routes::transactions::list),
        )
        .route("/api/transactions/summary", get(routes::transactions::summary))
        .route("/api/transactions/{id}", get(routes::transactions::get))
        .route("/health", get(routes::health::check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use gasdepot_core::{CounterpartyKind, Money, OversellPolicy, TransactionRecord};
    use gasdepot_db::{DbConfig, NewCounterparty, NewInventoryItem};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const STORE: &str = "store-1";

    async fn app_with(config: ServerConfig) -> (Router, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.inventory()
            .create(&NewInventoryItem::cylinder(STORE, "LPG-12KG", "", 10, 0))
            .await
            .unwrap();
        db.counterparties()
            .create(&NewCounterparty::new(CounterpartyKind::Customer, STORE, "Ayesha").with_id("C1"))
            .await
            .unwrap();

        let state = AppState::new(db.clone(), &config);
        (router(state), db)
    }

    async fn app() -> (Router, Database) {
        app_with(ServerConfig::default()).await
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header(auth::STORE_HEADER, STORE)
            .header(auth::STAFF_HEADER, "ST-001")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str, store: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(auth::STORE_HEADER, store)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(res: axum::response::Response) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn sale(quantity: i64, paid: i64) -> Value {
        json!({
            "type": "SALE",
            "paymentMethod": "CASH",
            "paidAmount": paid,
            "items": [
                { "itemRef": "LPG-12KG", "kind": "CYLINDER", "quantity": quantity, "unitPrice": 1500 }
            ]
        })
    }

    #[tokio::test]
    async fn test_create_returns_201_and_record() {
        let (app, db) = app().await;

        let res = app
            .oneshot(post_json("/api/transactions", sale(2, 3000)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let record: TransactionRecord = serde_json::from_value(body_json(res).await).unwrap();
        assert_eq!(record.total_amount, Money::from_minor(3000));
        assert_eq!(record.staff_id.as_deref(), Some("ST-001"));
        assert!(record.due_amount.is_zero());

        let counters = db.inventory().get(STORE, "LPG-12KG", "").await.unwrap().unwrap();
        assert_eq!(counters.full, 8);
    }

    #[tokio::test]
    async fn test_create_due_sale_updates_balance() {
        let (app, db) = app().await;

        let mut body = sale(1, 500);
        body["customerId"] = json!("C1");
        body["paymentMethod"] = json!("DUE");
        let res = app.oneshot(post_json("/api/transactions", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let json = body_json(res).await;
        assert_eq!(json["dueAmount"], 1000);

        let customer = db
            .counterparties()
            .get(STORE, CounterpartyKind::Customer, "C1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.total_due.minor(), 1000);
    }

    #[tokio::test]
    async fn test_due_payment_without_items_reduces_balance() {
        let (app, db) = app().await;

        let mut body = sale(1, 500);
        body["customerId"] = json!("C1");
        body["paymentMethod"] = json!("DUE");
        let res = app
            .clone()
            .oneshot(post_json("/api/transactions", body))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let payment = json!({
            "type": "DUE_PAYMENT",
            "paymentMethod": "CASH",
            "paidAmount": 400,
            "customerId": "C1"
        });
        let res = app.oneshot(post_json("/api/transactions", payment)).await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let json = body_json(res).await;
        assert_eq!(json["type"], "DUE_PAYMENT");
        assert_eq!(json["items"], json!([]));

        let customer = db
            .counterparties()
            .get(STORE, CounterpartyKind::Customer, "C1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.total_due.minor(), 600);

        let counters = db.inventory().get(STORE, "LPG-12KG", "").await.unwrap().unwrap();
        assert_eq!(counters.full, 9);
    }

    #[tokio::test]
    async fn test_missing_store_header_is_400() {
        let (app, _db) = app().await;

        let req = Request::builder()
            .method("POST")
            .uri("/api/transactions")
            .header("content-type", "application/json")
            .body(Body::from(sale(1, 1500).to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_enum_is_validation_error() {
        let (app, _db) = app().await;

        let mut body = sale(1, 1500);
        body["type"] = json!("GIFT");
        let res = app.oneshot(post_json("/api/transactions", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_sku_is_404_and_nothing_recorded() {
        let (app, db) = app().await;

        let mut body = sale(1, 1500);
        body["items"][0]["itemRef"] = json!("LPG-99KG");
        let res = app.oneshot(post_json("/api/transactions", body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let page = db
            .transactions()
            .list(STORE, &Default::default())
            .await
            .unwrap();
        assert_eq!(page.meta.total, 0);
    }

    #[tokio::test]
    async fn test_rejected_oversell_is_422() {
        let mut config = ServerConfig::default();
        config.engine = config.engine.with_oversell(OversellPolicy::Reject);
        let (app, _db) = app_with(config).await;

        let res = app
            .oneshot(post_json("/api/transactions", sale(11, 16_500)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(res).await["code"], "INSUFFICIENT_STOCK");
    }

    #[tokio::test]
    async fn test_list_get_and_summary() {
        let (app, _db) = app().await;

        let mut ids = Vec::new();
        for qty in [1, 2, 3] {
            let res = app
                .clone()
                .oneshot(post_json("/api/transactions", sale(qty, qty * 1500)))
                .await
                .unwrap();
            ids.push(body_json(res).await["id"].as_str().unwrap().to_string());
        }

        let res = app
            .clone()
            .oneshot(get_req("/api/transactions?limit=2&sortBy=finalAmount&sortOrder=asc", STORE))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let page = body_json(res).await;
        assert_eq!(page["meta"]["total"], 3);
        assert_eq!(page["meta"]["totalPages"], 2);
        assert_eq!(page["data"][0]["finalAmount"], 1500);
        assert_eq!(page["data"][1]["finalAmount"], 3000);

        let res = app
            .clone()
            .oneshot(get_req(&format!("/api/transactions/{}", ids[2]), STORE))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["totalAmount"], 4500);

        let res = app
            .clone()
            .oneshot(get_req("/api/transactions/summary?type=SALE", STORE))
            .await
            .unwrap();
        let summary = body_json(res).await;
        assert_eq!(summary["totalSales"], 9000);
        assert_eq!(summary["count"], 3);

        // other stores see nothing
        let res = app
            .clone()
            .oneshot(get_req(&format!("/api/transactions/{}", ids[0]), "store-2"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app
            .oneshot(get_req("/api/transactions", "store-2"))
            .await
            .unwrap();
        assert_eq!(body_json(res).await["meta"]["total"], 0);
    }

    #[tokio::test]
    async fn test_bad_query_is_400() {
        let (app, _db) = app().await;

        let res = app
            .clone()
            .oneshot(get_req("/api/transactions?sortBy=colour", STORE))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = app
            .oneshot(get_req("/api/transactions?minAmount=500&maxAmount=100", STORE))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_summary_ignores_limit() {
        let (app, _db) = app().await;

        app.clone()
            .oneshot(post_json("/api/transactions", sale(1, 1500)))
            .await
            .unwrap();

        let res = app
            .oneshot(get_req("/api/transactions/summary?limit=500", STORE))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["count"], 1);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _db) = app().await;

        let res = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["database"], true);
    }
}
