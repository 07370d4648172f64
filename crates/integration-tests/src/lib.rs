//! Test support: an in-process stub of the storefront backend.
//!
//! The stub speaks just enough of the backend's REST contract for the
//! session and cart stores to run end to end over real HTTP: canned
//! credentials, canned products, and switches to force specific endpoints
//! to fail.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use url::Url;

use wealthproxies_client::ClientConfig;

/// Credentials the stub accepts.
pub const TEST_EMAIL: &str = "jane@example.com";
/// Password paired with [`TEST_EMAIL`].
pub const TEST_PASSWORD: &str = "correct-horse";
/// Bearer token issued on successful authentication.
pub const TEST_TOKEN: &str = "tok_stub_1";

/// Mutable switches shared between a test and the running stub.
#[derive(Debug, Default)]
pub struct StubState {
    /// When set, `POST /api/auth/logout` answers 500.
    pub fail_logout: AtomicBool,
    /// When set, `POST /api/auth/refresh` answers 401.
    pub fail_refresh: AtomicBool,
    /// Number of times `GET /api/products` has been served.
    pub products_calls: AtomicUsize,
}

/// A stub backend bound to an ephemeral localhost port.
pub struct StubBackend {
    base_url: Url,
    /// Switches controlling endpoint behavior.
    pub state: Arc<StubState>,
}

impl StubBackend {
    /// Bind and serve the stub on `127.0.0.1:0`.
    pub async fn spawn() -> Self {
        let state = Arc::new(StubState::default());

        let router = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/logout", post(logout))
            .route("/api/auth/google", get(google_redirect))
            .route("/api/auth/discord", get(discord_redirect))
            .route("/api/auth/callback/{provider}", get(oauth_callback))
            .route("/api/auth/refresh", post(refresh))
            .route("/api/auth/get-session", get(get_session))
            .route("/api/auth/verify-email", post(verify_email))
            .route("/api/products", get(products))
            .route("/api/order", post(create_order))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve stub");
        });

        let base_url = Url::parse(&format!("http://{addr}")).expect("stub base url");
        Self { base_url, state }
    }

    /// Base URL of the running stub.
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Client configuration pointing at the stub, with a fresh storage dir.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url(), fresh_storage_dir())
    }
}

/// A unique temp directory for one test's durable storage.
#[must_use]
pub fn fresh_storage_dir() -> PathBuf {
    std::env::temp_dir().join(format!("wp-it-{}", uuid::Uuid::new_v4()))
}

/// The canned user as the backend would serialize it.
#[must_use]
pub fn stub_user() -> Value {
    json!({
        "id": "usr_1",
        "email": TEST_EMAIL,
        "name": "Jane",
        "username": "jane",
        "role": "user",
        "emailVerified": true,
        "createdAt": "2025-01-15T10:00:00Z",
        "updatedAt": "2025-01-15T10:00:00Z"
    })
}

fn auth_response() -> Value {
    json!({
        "user": stub_user(),
        "session": {
            "id": "ses_1",
            "userId": "usr_1",
            "expiresAt": "2025-12-31T00:00:00Z"
        },
        "token": TEST_TOKEN
    })
}

// =============================================================================
// Handlers
// =============================================================================

async fn login(Json(body): Json<Value>) -> Response {
    let email = body.get("email").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);

    if email == Some(TEST_EMAIL) && password == Some(TEST_PASSWORD) {
        Json(auth_response()).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body.get("email").and_then(Value::as_str) == Some("taken@example.com") {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "Email already taken"})),
        )
            .into_response();
    }
    // Registration returns the same shape as login; the client must not
    // adopt it until the email is verified.
    Json(auth_response()).into_response()
}

async fn logout(State(state): State<Arc<StubState>>) -> Response {
    if state.fail_logout.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "session backend down"}})),
        )
            .into_response();
    }
    Json(json!({"message": "Logged out"})).into_response()
}

async fn google_redirect() -> Json<Value> {
    Json(json!({"redirectUrl": "https://accounts.google.com/o/oauth2/auth?client_id=stub"}))
}

async fn discord_redirect() -> Json<Value> {
    Json(json!({"url": "https://discord.com/oauth2/authorize?client_id=stub"}))
}

#[derive(Debug, serde::Deserialize)]
struct CallbackQuery {
    code: String,
    #[serde(default)]
    state: Option<String>,
}

async fn oauth_callback(
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if provider != "google" && provider != "discord" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "unknown provider"})),
        )
            .into_response();
    }
    if query.code != "good-code" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Code expired"})),
        )
            .into_response();
    }
    let _ = query.state;
    Json(auth_response()).into_response()
}

async fn refresh(State(state): State<Arc<StubState>>) -> Response {
    if state.fail_refresh.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Session expired"})),
        )
            .into_response();
    }
    Json(auth_response()).into_response()
}

async fn get_session() -> Json<Value> {
    Json(json!({
        "user": stub_user(),
        "session": {
            "id": "ses_1",
            "userId": "usr_1",
            "expiresAt": "2025-12-31T00:00:00Z"
        }
    }))
}

async fn verify_email(Json(body): Json<Value>) -> Response {
    if body.get("token").and_then(Value::as_str) == Some("good-token") {
        Json(json!({"message": "Email verified"})).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid verification token"})),
        )
            .into_response()
    }
}

async fn products(State(state): State<Arc<StubState>>) -> Json<Value> {
    state.products_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        {
            "id": "prod_res",
            "name": "Residential Proxies",
            "description": "Rotating residential pool",
            "productType": "residential",
            "provider": "acme",
            "whatsIncluded": ["Unlimited threads", "City targeting"],
            "color": "blue",
            "polygon": "triangle",
            "isActive": true,
            "minimumQuantity": 1,
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z",
            "variants": [
                {
                    "id": "var_5gb",
                    "productId": "prod_res",
                    "isActive": true,
                    "name": "5 GB",
                    "price": 4500,
                    "bandwidthGb": 5,
                    "stripeProductId": "prod_stripe_1",
                    "createdAt": "2025-01-01T00:00:00Z",
                    "updatedAt": "2025-01-01T00:00:00Z"
                },
                {
                    "id": "var_10gb",
                    "productId": "prod_res",
                    "isActive": true,
                    "name": "10 GB",
                    "price": 8000,
                    "bandwidthGb": 10,
                    "stripeProductId": "prod_stripe_2",
                    "createdAt": "2025-01-01T00:00:00Z",
                    "updatedAt": "2025-01-01T00:00:00Z"
                }
            ]
        },
        {
            "id": "prod_isp",
            "name": "ISP Proxies",
            "description": "Static ISP addresses",
            "productType": "isp",
            "provider": "acme",
            "whatsIncluded": ["Dedicated IPs"],
            "color": "green",
            "polygon": "circle",
            "isActive": true,
            "minimumQuantity": 1,
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z",
            "variants": [
                {
                    "id": "var_10ip",
                    "productId": "prod_isp",
                    "isActive": true,
                    "name": "10 IPs",
                    "price": 12000,
                    "bandwidthGb": 0,
                    "stripeProductId": "prod_stripe_3",
                    "createdAt": "2025-01-01T00:00:00Z",
                    "updatedAt": "2025-01-01T00:00:00Z"
                }
            ]
        }
    ]))
}

async fn create_order(Json(body): Json<Value>) -> Response {
    let Some(items) = body.get("items").and_then(Value::as_array) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "items required"})),
        )
            .into_response();
    };
    if items.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "cart is empty"})),
        )
            .into_response();
    }
    Json(json!({"url": "https://checkout.stripe.com/pay/cs_stub"})).into_response()
}
