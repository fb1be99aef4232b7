use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::config::{AppConfig, SecurityConfig};
use crate::database::models::{NewUser, Role};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_admin, require_user};
use crate::state::AppState;

/// Complete router: public, user and admin route groups plus global layers
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .merge(elevated_routes(state.clone()))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    match cors_layer(security) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(public::register))
        .route("/login", post(public::login))
        .route("/products", get(public::products_get))
        .route("/product/:productId", get(public::product_get))
        .route("/reviews/:productId", get(public::reviews_get))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{address, cart, review, wishlist};

    Router::new()
        .route("/profile", put(protected::profile_put))
        .route(
            "/cart",
            get(cart::cart_get).post(cart::cart_post).delete(cart::cart_delete),
        )
        .route("/cart/:productId", get(cart::cart_item_get))
        .route(
            "/wishlist",
            get(wishlist::wishlist_get)
                .post(wishlist::wishlist_post)
                .delete(wishlist::wishlist_delete),
        )
        .route(
            "/wishlist/:wishlistId",
            put(wishlist::wishlist_entry_put).delete(wishlist::wishlist_entry_delete),
        )
        .route(
            "/address",
            get(address::addresses_get)
                .post(address::address_post)
                .put(address::address_put),
        )
        .route(
            "/address/:addressId",
            get(address::address_get)
                .put(address::address_entry_put)
                .delete(address::address_delete),
        )
        .route("/review", post(review::review_post))
        .route(
            "/review/:reviewId",
            put(review::review_put).delete(review::review_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, require_user))
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    use elevated::{products, users};

    Router::new()
        .route("/users", get(users::users_list))
        .route("/user/role", put(users::user_role_put))
        .route("/user/:userId", delete(users::user_delete))
        .route("/product", post(products::product_create))
        .route(
            "/product/:productId",
            put(products::product_update).delete(products::product_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if security.cors_origins.iter().any(|o| o == "*") {
        if crate::is_production!() {
            tracing::warn!("Wildcard CORS origin configured in production");
        }
        return Some(base.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(base.allow_origin(AllowOrigin::list(origins)))
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Shopfront API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/register, /login (public)",
                "catalog": "/products, /product/:productId, /reviews/:productId (public)",
                "account": "/profile, /cart, /wishlist, /address, /review (user)",
                "admin": "/users, /user/role, /user/:userId, /product[/:productId] (admin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend_name();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "store": backend }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "SERVICE_UNAVAILABLE",
                    "message": "store unavailable",
                    "data": { "status": "degraded", "timestamp": now, "store": backend }
                })),
            )
        }
    }
}

/// Creates the configured administrator when no account uses that email.
/// An existing account with that email is promoted instead. Without
/// `ADMIN_MOBILE` the new account gets a generated mobile placeholder, since
/// mobile numbers are unique.
pub async fn bootstrap_admin(state: &AppState, config: &AppConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (
        config.bootstrap.admin_email.as_deref(),
        config.bootstrap.admin_password.as_deref(),
    ) else {
        return Ok(());
    };
    let email = email.trim().to_lowercase();

    if let Some(user) = state.store.users.find_by_email(&email).await? {
        if !user.is_admin() {
            state.store.users.set_role(user.id, Role::Admin).await?;
            tracing::info!("Promoted existing user {} to admin", user.id);
        }
        return Ok(());
    }

    let mobile = match config.bootstrap.admin_mobile.as_deref() {
        Some(mobile) => mobile.to_string(),
        None => format!("admin-{}", Uuid::new_v4().simple()),
    };

    let password_hash = state.passwords.hash(password).await?;
    let user = state
        .store
        .users
        .insert(NewUser {
            email,
            mobile,
            password_hash,
            firstname: "Admin".to_string(),
            lastname: "User".to_string(),
            role: Role::Admin,
        })
        .await?;

    tracing::info!("Created bootstrap admin {}", user.id);
    Ok(())
}

/// Bind and serve until ctrl-c
pub async fn serve(state: AppState, config: &AppConfig) -> anyhow::Result<()> {
    bootstrap_admin(&state, config).await?;

    let app = app(state, &config.security);
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Shopfront API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
