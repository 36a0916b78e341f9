//! Stand-in for the marketplace API gateway.
//!
//! Serves the five routes the journey calls with data shaped like the real services. Any path can
//! be overridden with a canned status and body, and every request is counted per route.
use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::debug;

pub const PRODUCTS: &str = "/product-service/api/products";
pub const PRODUCT: &str = "/product-service/api/products/:id";
pub const FAVOURITES: &str = "/favourite-service/api/favourites";
pub const SHIPPINGS: &str = "/shipping-service/api/shippings";
pub const PAYMENTS: &str = "/payment-service/api/payments";

#[derive(Debug, Clone)]
struct Fixture {
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct Inner {
    overrides: RwLock<HashMap<String, Fixture>>,
    hits: Mutex<HashMap<&'static str, u64>>,
}

/// Shared handle to the gateway's fixtures and hit counters.
#[derive(Clone, Default)]
pub struct GatewayState {
    inner: Arc<Inner>,
}

impl GatewayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for the exact `path` with `status` and a raw body.
    pub fn set(&self, path: &str, status: u16, body: impl Into<String>) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.inner
            .overrides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                path.to_string(),
                Fixture {
                    status,
                    body: body.into(),
                },
            );
    }

    pub fn set_json(&self, path: &str, status: u16, body: Value) {
        self.set(path, status, body.to_string());
    }

    /// Drop all overrides and hit counts.
    pub fn reset(&self) {
        self.inner
            .overrides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.inner
            .hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Requests served for a route template such as [PRODUCT].
    pub fn hits(&self, route: &str) -> u64 {
        self.inner
            .hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(route)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_hits(&self) -> u64 {
        self.inner
            .hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    fn hit(&self, route: &'static str) {
        *self
            .inner
            .hits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(route)
            .or_default() += 1;
    }

    fn respond(&self, route: &'static str, uri: &Uri, default: impl FnOnce() -> Response) -> Response {
        self.hit(route);

        let fixture = self
            .inner
            .overrides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri.path())
            .cloned();

        match fixture {
            Some(fixture) => {
                debug!("Serving override for {}", uri.path());
                (
                    fixture.status,
                    [(header::CONTENT_TYPE, "application/json")],
                    fixture.body,
                )
                    .into_response()
            }
            None => default(),
        }
    }
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route(PRODUCTS, get(products))
        .route(PRODUCT, get(product))
        .route(FAVOURITES, get(favourites))
        .route(SHIPPINGS, get(shippings))
        .route(PAYMENTS, get(payments))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(listener: TcpListener, state: GatewayState) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn run(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, GatewayState::new()).await
}

/// Start a gateway on an ephemeral local port in the background.
pub async fn spawn(state: GatewayState) -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(err) = serve(listener, state).await {
            tracing::error!("Mock gateway stopped: {err}");
        }
    });
    Ok(addr)
}

async fn products(State(state): State<GatewayState>, uri: Uri) -> Response {
    state.respond(PRODUCTS, &uri, || {
        json_response(StatusCode::OK, json!({ "collection": catalogue() }))
    })
}

async fn product(State(state): State<GatewayState>, Path(id): Path<String>, uri: Uri) -> Response {
    state.respond(PRODUCT, &uri, || {
        let found = id.parse::<i64>().ok().and_then(|id| {
            catalogue()
                .into_iter()
                .find(|product| product["productId"] == json!(id))
        });
        match found {
            Some(product) => json_response(StatusCode::OK, product),
            None => json_response(
                StatusCode::NOT_FOUND,
                json!({ "msg": format!("Product with id: {id} not found") }),
            ),
        }
    })
}

async fn favourites(State(state): State<GatewayState>, uri: Uri) -> Response {
    state.respond(FAVOURITES, &uri, || {
        json_response(
            StatusCode::OK,
            json!({ "collection": [
                {
                    "userId": 1,
                    "productId": 1,
                    "likeDate": "17-10-2024__13:14:22:000000",
                    "user": { "userId": 1, "firstName": "selim", "lastName": "horri" },
                    "product": { "productId": 1, "productTitle": "asus" }
                },
                {
                    "userId": 2,
                    "productId": 2,
                    "likeDate": "18-10-2024__09:01:45:000000",
                    "user": { "userId": 2, "firstName": "amine", "lastName": "ladjimi" },
                    "product": { "productId": 2, "productTitle": "hp" }
                }
            ]}),
        )
    })
}

async fn shippings(State(state): State<GatewayState>, uri: Uri) -> Response {
    state.respond(SHIPPINGS, &uri, || {
        json_response(
            StatusCode::OK,
            json!({ "collection": [
                {
                    "productId": 1,
                    "orderId": 1,
                    "orderedQuantity": 2,
                    "order": { "orderId": 1, "orderDesc": "init", "orderFee": 5000.0 },
                    "product": { "productId": 1, "productTitle": "asus" }
                }
            ]}),
        )
    })
}

async fn payments(State(state): State<GatewayState>, uri: Uri) -> Response {
    state.respond(PAYMENTS, &uri, || {
        json_response(
            StatusCode::OK,
            json!({ "collection": [
                {
                    "paymentId": 1,
                    "isPayed": false,
                    "paymentStatus": "IN_PROGRESS",
                    "order": { "orderId": 1, "orderDesc": "init", "orderFee": 5000.0 }
                }
            ]}),
        )
    })
}

fn catalogue() -> Vec<Value> {
    vec![
        json!({
            "productId": 1,
            "productTitle": "asus",
            "imageUrl": "xxx",
            "sku": "dfqejklejrkn",
            "priceUnit": 0.0,
            "quantity": 50,
            "category": { "categoryId": 1, "categoryTitle": "Computer" }
        }),
        json!({
            "productId": 2,
            "productTitle": "hp",
            "imageUrl": "xxx",
            "sku": "dfqejklejrkn",
            "priceUnit": 0.0,
            "quantity": 50,
            "category": { "categoryId": 1, "categoryTitle": "Computer" }
        }),
        json!({
            "productId": 3,
            "productTitle": "Armani",
            "imageUrl": "xxx",
            "sku": "fjdvf",
            "priceUnit": 0.0,
            "quantity": 50,
            "category": { "categoryId": 2, "categoryTitle": "Mode" }
        }),
    ]
}

fn json_response(status: StatusCode, body: Value) -> Response {
    (status, axum::Json(body)).into_response()
}
