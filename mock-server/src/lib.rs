//! Mock implementation of the teachable account-and-order service.
//!
//! In-memory accounts and orders behind a shared `RwLock`, exposed through
//! the same routes, status codes, and body shapes as the live service —
//! including its oddities: the token field is serialized as `tokens`, and
//! order creation answers 200 rather than 201.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Fixed timestamp for every record; clients treat these as opaque.
const TIMESTAMP: &str = "2016-09-01T12:00:00.000Z";

/// A registered account. Identity responses serialize everything except
/// the password; `tokens` is the wire name the live service uses.
#[derive(Clone, Debug, Serialize)]
pub struct Account {
    pub id: u64,
    pub email: String,
    pub tokens: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip)]
    pub password: String,
}

/// An order owned by an account.
#[derive(Clone, Debug, Serialize)]
pub struct OrderRecord {
    pub id: u64,
    pub number: String,
    pub special_instructions: Option<String>,
    pub total: String,
    pub total_quantity: u32,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip)]
    pub owner: String,
}

#[derive(Default)]
pub struct Store {
    accounts: HashMap<String, Account>,
    orders: BTreeMap<u64, OrderRecord>,
    next_account_id: u64,
    next_order_id: u64,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

#[derive(Deserialize)]
pub struct SignInInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `email`/`token` query pairs carried by authenticated endpoints.
#[derive(Deserialize)]
pub struct AuthParams {
    #[serde(default)]
    pub email: String,
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateOrderInput {
    pub total: Option<String>,
    pub total_quantity: Option<u32>,
    pub special_instructions: Option<String>,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/users", post(register))
        .route("/users/sign_in", post(sign_in))
        .route("/api/users/current_user/edit", get(current_user))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{id}", delete(delete_order))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn register(State(db): State<Db>, Json(input): Json<RegisterInput>) -> Response {
    let mut store = db.write().await;
    let mut errors: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    if input.email.is_empty() {
        errors.entry("email").or_default().push("can't be blank");
    } else if store.accounts.contains_key(&input.email) {
        errors.entry("email").or_default().push("has already been taken");
    }
    if input.password.is_empty() {
        errors.entry("password").or_default().push("can't be blank");
    }
    if input.password_confirmation != input.password {
        errors
            .entry("password_confirmation")
            .or_default()
            .push("doesn't match Password");
    }
    if !errors.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": errors })),
        )
            .into_response();
    }

    store.next_account_id += 1;
    let account = Account {
        id: store.next_account_id,
        email: input.email.clone(),
        tokens: Uuid::new_v4().simple().to_string(),
        created_at: TIMESTAMP.to_string(),
        updated_at: TIMESTAMP.to_string(),
        password: input.password,
    };
    store.accounts.insert(input.email, account.clone());
    (StatusCode::CREATED, Json(account)).into_response()
}

async fn sign_in(State(db): State<Db>, Json(input): Json<SignInInput>) -> Response {
    let store = db.read().await;
    match store.accounts.get(&input.email) {
        Some(account) if account.password == input.password => {
            (StatusCode::CREATED, Json(account.clone())).into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid email or password." })),
        )
            .into_response(),
    }
}

async fn current_user(State(db): State<Db>, Query(params): Query<AuthParams>) -> Response {
    let store = db.read().await;
    match authenticated(&store, &params) {
        Some(account) => Json(account.clone()).into_response(),
        None => sign_in_required(),
    }
}

async fn list_orders(State(db): State<Db>, Query(params): Query<AuthParams>) -> Response {
    let store = db.read().await;
    let Some(account) = authenticated(&store, &params) else {
        return sign_in_required();
    };
    let orders: Vec<&OrderRecord> = store
        .orders
        .values()
        .filter(|order| order.owner == account.email)
        .collect();
    Json(orders).into_response()
}

async fn create_order(
    State(db): State<Db>,
    Query(params): Query<AuthParams>,
    Json(input): Json<CreateOrderInput>,
) -> Response {
    let mut store = db.write().await;
    let Some(account) = authenticated(&store, &params) else {
        return sign_in_required();
    };
    let owner = account.email.clone();

    let mut errors = Vec::new();
    if input.total.is_none() {
        errors.push(json!({ "title": "Total can't be blank" }));
    }
    if input.total_quantity.is_none() {
        errors.push(json!({ "title": "Total quantity can't be blank" }));
    }
    if input.special_instructions.is_none() {
        errors.push(json!({ "title": "Special instructions can't be blank" }));
    }
    if !errors.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "errors": errors })),
        )
            .into_response();
    }

    store.next_order_id += 1;
    let order = OrderRecord {
        id: store.next_order_id,
        number: format!("R{:09}", store.next_order_id),
        special_instructions: input.special_instructions,
        total: input.total.unwrap_or_default(),
        total_quantity: input.total_quantity.unwrap_or_default(),
        created_at: TIMESTAMP.to_string(),
        updated_at: TIMESTAMP.to_string(),
        owner,
    };
    store.orders.insert(order.id, order.clone());
    // The live service answers 200 here, not 201.
    (StatusCode::OK, Json(order)).into_response()
}

async fn delete_order(
    State(db): State<Db>,
    Query(params): Query<AuthParams>,
    Path(id): Path<u64>,
) -> Response {
    let mut store = db.write().await;
    let Some(account) = authenticated(&store, &params) else {
        return sign_in_required();
    };
    let owner = account.email.clone();
    let owned = store.orders.get(&id).is_some_and(|order| order.owner == owner);
    if owned {
        store.orders.remove(&id);
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

fn authenticated<'a>(store: &'a Store, params: &AuthParams) -> Option<&'a Account> {
    let token = params.token.as_deref()?;
    let account = store.accounts.get(&params.email)?;
    (account.tokens == token).then_some(account)
}

fn sign_in_required() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "You need to sign in or sign up before continuing." })),
    )
        .into_response()
}
