#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use esgconnect::auth::hash_password;
use esgconnect::config::Config;
use esgconnect::entities::Role;
use esgconnect::store::{self, accounts::NewAccount};
use esgconnect::{create_app, AppState};
use http_body_util::BodyExt; // For Response body handling
use serde_json::{json, Value};
use std::sync::Once;
use tower::ServiceExt; // For oneshot
use uuid::Uuid;

// For initializing tracing once
static INIT: Once = Once::new();

fn setup() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// A signed-in account.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub token: String,
}

/// The full router over a fresh in-memory database.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        setup();
        let config = Config::for_tests();
        let db = store::connect(&config.database_url)
            .await
            .expect("in-memory database");
        let state = AppState::new(db, &config);
        let app = create_app(state.clone(), &config);
        Self { app, state }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", uri, token, None).await
    }

    /// Registers through the public endpoint.
    pub async fn register(&self, name: &str, email: &str, role: &str) -> Actor {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({ "name": name, "email": email, "password": "password123", "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        Actor {
            id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Inserts an account directly, for roles that cannot self-register.
    pub async fn seed_account(&self, name: &str, email: &str, role: Role) -> Actor {
        let account = store::accounts::create(
            &self.state.db,
            NewAccount {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: hash_password("password123").unwrap(),
                role,
            },
        )
        .await
        .unwrap();
        Actor {
            id: account.id,
            token: self.state.jwt.create_token(account.id, role).unwrap(),
        }
    }

    pub async fn owner(&self) -> Actor {
        self.register("Olivia Owner", "owner@example.com", "business_owner").await
    }

    pub async fn investor(&self) -> Actor {
        self.register("Ivan Investor", "investor@example.com", "investor").await
    }

    pub async fn admin(&self) -> Actor {
        self.seed_account("Ada Admin", "admin@example.com", Role::Admin).await
    }

    pub async fn superadmin(&self) -> Actor {
        self.seed_account("Sam Super", "super@example.com", Role::Superadmin).await
    }

    /// Creates a pending post and returns its id.
    pub async fn create_post(&self, owner: &Actor, title: &str) -> String {
        let (status, body) = self
            .post(
                "/api/posts/create",
                Some(&owner.token),
                json!({
                    "title": title,
                    "description": "Regenerative agriculture",
                    "industry": "Agriculture",
                    "location": "Nairobi",
                    "investmentNeeded": 5000
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn review(&self, reviewer: &Actor, post_id: &str, body: Value) -> (StatusCode, Value) {
        self.put(
            &format!("/api/posts/admin/review/{}", post_id),
            Some(&reviewer.token),
            body,
        )
        .await
    }

    /// Creates and approves a post.
    pub async fn approved_post(&self, owner: &Actor, admin: &Actor, title: &str) -> String {
        let id = self.create_post(owner, title).await;
        let (status, body) = self.review(admin, &id, json!({ "status": "approved" })).await;
        assert_eq!(status, StatusCode::OK, "approve failed: {}", body);
        id
    }

    pub async fn public_titles(&self) -> Vec<String> {
        let (status, body) = self.get("/api/posts?limit=100", None).await;
        assert_eq!(status, StatusCode::OK);
        body["posts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap().to_string())
            .collect()
    }
}
