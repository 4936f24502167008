use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisteredUser},
        extractors::{AuthUser, SessionToken, AUTH_COOKIE},
        jwt::ttl_secs,
    },
    config::AppConfig,
    errors::AppError,
    extract::AppJson,
    response::Success,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(get_me))
}

fn session_cookie(config: &AppConfig, token: String) -> Cookie<'static> {
    let max_age = time::Duration::seconds(ttl_secs(config.jwt.ttl));
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(max_age)
        .build()
}

/// Always emitted, whether or not the client sent the cookie.
fn expired_cookie(config: &AppConfig) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .build()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(mut payload): AppJson<RegisterRequest>,
) -> Result<Success<RegisteredUser>, AppError> {
    payload.validate()?;
    let user = state
        .auth
        .register(&payload.username, &payload.email, &payload.password)
        .await?;
    Ok(Success::created("User registered successfully", user))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(mut payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Success<LoginResponse>), AppError> {
    payload.validate()?;
    let session = state.auth.login(&payload.username, &payload.password).await?;
    let jar = jar.add(session_cookie(&state.config, session.access_token.clone()));
    Ok((jar, Success::ok("Login successful", session)))
}

/// Clears the client cookie only; the token itself stays valid until it expires.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Success<()>) {
    let jar = jar.add(expired_cookie(&state.config));
    (jar, Success::empty("Logout successful"))
}

#[instrument(skip_all)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    SessionToken(token): SessionToken,
) -> Result<(CookieJar, Success<LoginResponse>), AppError> {
    let session = state.auth.refresh(&token)?;
    let jar = jar.add(session_cookie(&state.config, session.access_token.clone()));
    Ok((jar, Success::ok("Token refreshed successfully", session)))
}

#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Success<PublicUser>, AppError> {
    let me = state.auth.current_user(user.id).await?;
    Ok(Success::ok("User retrieved successfully", me))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use serde_json::json;

    use crate::test_support::{empty_request, json_request, send, test_app};

    async fn register(app: &axum::Router, username: &str) -> crate::test_support::TestResponse {
        send(
            app,
            json_request(
                "POST",
                "/api/v1/auth/register",
                json!({
                    "username": username,
                    "email": format!(" {}@Mail.com ", username.to_uppercase()),
                    "password": "pw123456"
                }),
                None,
            ),
        )
        .await
    }

    #[tokio::test]
    async fn register_returns_identity_in_envelope() {
        let app = test_app();
        let res = register(&app, "user-1").await;

        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["code"], 201);
        assert_eq!(res.body["message"], "User registered successfully");
        assert_eq!(res.body["data"]["username"], "user-1");
        assert!(res.body["data"].get("password_hash").is_none());
        assert!(res.body["meta"]["timestamp"].is_string());
        assert!(res.headers.contains_key("x-trace-id"));

        let dup = register(&app, "user-1").await;
        assert_eq!(dup.status, StatusCode::CONFLICT);
        assert_eq!(dup.body["success"], false);
        assert_eq!(dup.body["error"]["code"], "USERNAME_EXISTS");
    }

    #[tokio::test]
    async fn register_reports_validation_details() {
        let app = test_app();
        let res = send(
            &app,
            json_request(
                "POST",
                "/api/v1/auth/register",
                json!({ "username": "abc", "email": "nope", "password": "pw" }),
                None,
            ),
        )
        .await;

        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"]["code"], "VALIDATION_ERROR");
        let fields: Vec<_> = res.body["error"]["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(fields, ["username", "email", "password"]);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = test_app();
        let req = axum::http::Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();
        let res = send(&app, req).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn login_sets_cookie_and_token_works_for_me() {
        let app = test_app();
        register(&app, "user-1").await;

        let res = send(
            &app,
            json_request(
                "POST",
                "/api/v1/auth/login",
                json!({ "username": "user-1", "password": "pw123456" }),
                None,
            ),
        )
        .await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["message"], "Login successful");

        let token = res.body["data"]["access_token"].as_str().unwrap().to_string();
        assert_eq!(res.auth_cookie().as_deref(), Some(token.as_str()));
        let set_cookie = res.headers[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Strict"));

        let me = send(&app, empty_request("GET", "/api/v1/auth/me", Some(&token))).await;
        assert_eq!(me.status, StatusCode::OK);
        assert_eq!(me.body["data"]["username"], "user-1");
        assert_eq!(me.body["data"]["email"], "user-1@mail.com");

        let by_cookie = axum::http::Request::builder()
            .uri("/api/v1/auth/me")
            .header(header::COOKIE, format!("auth_token={token}"))
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(send(&app, by_cookie).await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn bad_credentials_share_one_body() {
        let app = test_app();
        register(&app, "user-1").await;

        let login = |username: &'static str, password: &'static str| {
            json_request(
                "POST",
                "/api/v1/auth/login",
                json!({ "username": username, "password": password }),
                None,
            )
        };
        let unknown = send(&app, login("nobody", "pw123456")).await;
        let wrong = send(&app, login("user-1", "wrong")).await;

        assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status, wrong.status);
        assert_eq!(unknown.body["message"], wrong.body["message"]);
        assert_eq!(unknown.body["error"], wrong.body["error"]);
        assert_eq!(unknown.body["error"]["code"], "INVALID_CREDENTIALS");
        assert!(unknown.auth_cookie().is_none());
    }

    #[tokio::test]
    async fn me_requires_a_valid_token() {
        let app = test_app();

        let missing = send(&app, empty_request("GET", "/api/v1/auth/me", None)).await;
        assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
        assert_eq!(missing.body["error"]["code"], "UNAUTHENTICATED");

        let bogus = send(&app, empty_request("GET", "/api/v1/auth/me", Some("a.b.c"))).await;
        assert_eq!(bogus.status, StatusCode::UNAUTHORIZED);
        assert_eq!(bogus.body["error"]["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn refresh_and_logout_manage_the_cookie() {
        let app = test_app();
        register(&app, "user-1").await;
        let login = send(
            &app,
            json_request(
                "POST",
                "/api/v1/auth/login",
                json!({ "username": "user-1", "password": "pw123456" }),
                None,
            ),
        )
        .await;
        let token = login.body["data"]["access_token"].as_str().unwrap().to_string();

        let refreshed = send(&app, empty_request("POST", "/api/v1/auth/refresh", Some(&token))).await;
        assert_eq!(refreshed.status, StatusCode::OK);
        assert_eq!(refreshed.body["data"]["username"], "user-1");
        assert!(refreshed.auth_cookie().is_some_and(|c| !c.is_empty()));

        let no_token = send(&app, empty_request("POST", "/api/v1/auth/refresh", None)).await;
        assert_eq!(no_token.status, StatusCode::UNAUTHORIZED);

        let logout = send(&app, empty_request("POST", "/api/v1/auth/logout", None)).await;
        assert_eq!(logout.status, StatusCode::OK);
        assert_eq!(logout.body["message"], "Logout successful");
        assert_eq!(logout.auth_cookie().as_deref(), Some(""));
        let set_cookie = logout.headers[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn inbound_trace_id_is_echoed() {
        let app = test_app();
        let req = axum::http::Request::builder()
            .uri("/api/v1/health")
            .header("x-trace-id", "trace-123")
            .body(axum::body::Body::empty())
            .unwrap();
        let res = send(&app, req).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.headers["x-trace-id"], "trace-123");
        assert_eq!(res.body["meta"]["trace_id"], "trace-123");
    }

    fn expired_token_for(user_id: &str, username: &str) -> String {
        let issued = time::OffsetDateTime::now_utc() - time::Duration::hours(48);
        crate::auth::jwt::test_tokens()
            .issue_at(user_id.parse().unwrap(), username, issued)
            .unwrap()
    }

    #[tokio::test]
    async fn expired_token_is_rejected_by_me_but_refreshable() {
        let app = test_app();
        let registered = register(&app, "user-1").await;
        let stale = expired_token_for(registered.body["data"]["id"].as_str().unwrap(), "user-1");

        let me = send(&app, empty_request("GET", "/api/v1/auth/me", Some(&stale))).await;
        assert_eq!(me.status, StatusCode::UNAUTHORIZED);
        assert_eq!(me.body["error"]["code"], "EXPIRED_TOKEN");

        let refreshed = send(&app, empty_request("POST", "/api/v1/auth/refresh", Some(&stale))).await;
        assert_eq!(refreshed.status, StatusCode::OK);
        let fresh = refreshed.body["data"]["access_token"].as_str().unwrap().to_string();
        assert_ne!(fresh, stale);
        assert_eq!(refreshed.auth_cookie().as_deref(), Some(fresh.as_str()));

        let me = send(&app, empty_request("GET", "/api/v1/auth/me", Some(&fresh))).await;
        assert_eq!(me.status, StatusCode::OK);
        assert_eq!(me.body["data"]["username"], "user-1");
    }

    #[tokio::test]
    async fn tampered_token_cannot_be_refreshed() {
        let app = test_app();
        let registered = register(&app, "user-1").await;
        let stale = expired_token_for(registered.body["data"]["id"].as_str().unwrap(), "user-1");
        let forged = format!("{stale}x");

        let res = send(&app, empty_request("POST", "/api/v1/auth/refresh", Some(&forged))).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.body["error"]["code"], "INVALID_TOKEN");
        assert!(res.auth_cookie().is_none());
    }

    #[tokio::test]
    async fn duplicate_key_at_insert_is_an_opaque_500() {
        let app = crate::test_support::test_app_with_users(std::sync::Arc::new(
            crate::test_support::DuplicateOnInsertStore,
        ));
        let res = register(&app, "user-1").await;

        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(res.body["message"], "Internal server error");
        let body = res.body.to_string();
        assert!(!body.contains("duplicate"));
        assert!(!body.contains("users_username_key"));
    }
}
