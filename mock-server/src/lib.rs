//! In-memory product backend speaking the API's wire conventions.
//!
//! snake_case JSON bodies, `422 {"errors": {field: [message, ...]}}` for
//! invalid input, and `403` for mutations carrying the wrong bearer token
//! (`401` when none is sent at all).

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Token accepted for mutations by `app()`.
pub const DEFAULT_WRITE_TOKEN: &str = "mock-write-token";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub product_name: String,
    pub price_cents: u64,
    pub in_stock: bool,
}

#[derive(Deserialize)]
pub struct CreateProduct {
    pub product_name: String,
    pub price_cents: u64,
    #[serde(default)]
    pub in_stock: bool,
}

#[derive(Deserialize)]
pub struct UpdateProduct {
    pub product_name: Option<String>,
    pub price_cents: Option<u64>,
    pub in_stock: Option<bool>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Product>>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    write_token: Arc<str>,
}

pub fn app() -> Router {
    app_with_token(DEFAULT_WRITE_TOKEN)
}

pub fn app_with_token(write_token: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(HashMap::new())),
        write_token: Arc::from(write_token),
    };
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_token(listener: TcpListener, write_token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(write_token)).await
}

/// Field-keyed validation messages, serialized in insertion order.
#[derive(Default)]
struct ValidationErrors(Map<String, Value>);

impl ValidationErrors {
    fn add(&mut self, field: &str, message: &str) {
        let messages = self
            .0
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = messages {
            list.push(Value::String(message.to_string()));
        }
    }

    fn into_result(self) -> Result<(), Response> {
        if self.0.is_empty() {
            return Ok(());
        }
        Err(self.into_response())
    }

    fn into_response(self) -> Response {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": self.0 })),
        )
            .into_response()
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return Err(message(StatusCode::UNAUTHORIZED, "missing bearer token"));
    };
    if value.strip_prefix("Bearer ") != Some(&*state.write_token) {
        debug!("rejecting mutation with wrong bearer token");
        return Err(message(StatusCode::FORBIDDEN, "forbidden"));
    }
    Ok(())
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload.map(|Json(input)| input).map_err(|rejection| {
        let mut errors = ValidationErrors::default();
        errors.add("body", &rejection.body_text());
        errors.into_response()
    })
}

fn validate_name(errors: &mut ValidationErrors, name: &str) {
    if name.trim().is_empty() {
        errors.add("product_name", "must not be blank");
    }
}

fn validate_price(errors: &mut ValidationErrors, price_cents: u64) {
    if price_cents == 0 {
        errors.add("price_cents", "must be greater than zero");
    }
}

async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    let products = state.db.read().await;
    Json(products.values().cloned().collect())
}

async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), Response> {
    authorize(&state, &headers)?;
    let input = body(payload)?;

    let mut errors = ValidationErrors::default();
    validate_name(&mut errors, &input.product_name);
    validate_price(&mut errors, input.price_cents);
    errors.into_result()?;

    let product = Product {
        id: Uuid::new_v4(),
        product_name: input.product_name,
        price_cents: input.price_cents,
        in_stock: input.in_stock,
    };
    info!(id = %product.id, "created product");
    state.db.write().await.insert(product.id, product.clone());
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, Response> {
    let products = state.db.read().await;
    products
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| message(StatusCode::NOT_FOUND, "product not found"))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    payload: Result<Json<UpdateProduct>, JsonRejection>,
) -> Result<Json<Product>, Response> {
    authorize(&state, &headers)?;
    let input = body(payload)?;

    let mut errors = ValidationErrors::default();
    if let Some(name) = &input.product_name {
        validate_name(&mut errors, name);
    }
    if let Some(price_cents) = input.price_cents {
        validate_price(&mut errors, price_cents);
    }
    errors.into_result()?;

    let mut products = state.db.write().await;
    let product = products
        .get_mut(&id)
        .ok_or_else(|| message(StatusCode::NOT_FOUND, "product not found"))?;
    if let Some(name) = input.product_name {
        product.product_name = name;
    }
    if let Some(price_cents) = input.price_cents {
        product.price_cents = price_cents;
    }
    if let Some(in_stock) = input.in_stock {
        product.in_stock = in_stock;
    }
    Ok(Json(product.clone()))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, Response> {
    authorize(&state, &headers)?;
    let mut products = state.db.write().await;
    products
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| message(StatusCode::NOT_FOUND, "product not found"))
}
