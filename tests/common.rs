use helpdesk_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::ports::EmailService,
    domain::services::auth_service::AuthService,
    domain::services::notifications::NotificationService,
    error::AppError,
    infra::factory::load_templates,
    infra::repositories::{
        sqlite_comment_repo::SqliteCommentRepo,
        sqlite_service_repo::SqliteServiceRepo,
        sqlite_ticket_repo::SqliteTicketRepo,
        sqlite_user_repo::SqliteUserRepo,
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::{json, Value};

#[derive(Clone, Debug)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

/// Mock mailer that records every send so tests can assert on notification
/// side effects and harvest the tokens embedded in the bodies.
#[derive(Default)]
pub struct RecordingEmailService {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingEmailService {
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub mailer: Arc<RecordingEmailService>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret: "test-secret".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_from_name: "Digital Help Desk".to_string(),
            smtp_from_email: "noreply@helpdesk.local".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
        };

        let mailer = Arc::new(RecordingEmailService::default());
        let templates = Arc::new(load_templates());
        let auth_service = Arc::new(AuthService::new(&config));
        let email_service: Arc<dyn EmailService> = mailer.clone();
        let notifier = Arc::new(NotificationService::new(
            email_service,
            templates,
            config.frontend_url.clone(),
        ));

        let state = Arc::new(AppState {
            config: config.clone(),
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            ticket_repo: Arc::new(SqliteTicketRepo::new(pool.clone())),
            service_repo: Arc::new(SqliteServiceRepo::new(pool.clone())),
            comment_repo: Arc::new(SqliteCommentRepo::new(pool.clone())),
            auth_service,
            notifier,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            mailer,
        }
    }

    pub async fn api(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn register(&self, name: &str, email: &str, password: &str, role: &str) {
        let response = self.api("POST", "/api/auth/register", None, Some(json!({
            "name": name,
            "email": email,
            "password": password,
            "role": role
        }))).await;

        if !response.status().is_success() {
            panic!("Register failed in test helper: status {}", response.status());
        }
    }

    /// Pulls the newest recorded email for `recipient` and extracts the
    /// `token=` value from the embedded link.
    pub fn last_token_for(&self, recipient: &str) -> String {
        let sent = self.mailer.sent();
        let mail = sent.iter().rev()
            .find(|m| m.recipient == recipient)
            .expect("No email recorded for recipient");

        let idx = mail.html_body.find("token=").expect("No token link in email body");
        mail.html_body[idx + 6..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect()
    }

    pub async fn verify_email(&self, email: &str) {
        let token = self.last_token_for(email);
        let response = self.api("POST", "/api/auth/verify-email", None, Some(json!({ "token": token }))).await;

        if !response.status().is_success() {
            panic!("Email verification failed in test helper: status {}", response.status());
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self.api("POST", "/api/auth/login", None, Some(json!({
            "email": email,
            "password": password
        }))).await;

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        body["token"].as_str().expect("No token in login response").to_string()
    }

    /// Full onboarding: register, verify via the captured email, log in.
    pub async fn register_and_login(&self, name: &str, email: &str, password: &str, role: &str) -> String {
        self.register(name, email, password, role).await;
        self.verify_email(email).await;
        self.login(email, password).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
