use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::EmailService;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::notifications::NotificationService;
use crate::infra::email::smtp_email_service::SmtpEmailService;
use crate::infra::repositories::{
    postgres_comment_repo::PostgresCommentRepo, postgres_service_repo::PostgresServiceRepo,
    postgres_ticket_repo::PostgresTicketRepo, postgres_user_repo::PostgresUserRepo,
    sqlite_comment_repo::SqliteCommentRepo, sqlite_service_repo::SqliteServiceRepo,
    sqlite_ticket_repo::SqliteTicketRepo, sqlite_user_repo::SqliteUserRepo,
};

pub fn load_templates() -> Tera {
    let mut tera = Tera::default();
    tera.add_raw_template("verification.html", include_str!("../templates/verification.html"))
        .expect("Failed to load verification template");
    tera.add_raw_template("welcome.html", include_str!("../templates/welcome.html"))
        .expect("Failed to load welcome template");
    tera.add_raw_template("assignment.html", include_str!("../templates/assignment.html"))
        .expect("Failed to load assignment template");
    tera.add_raw_template("password_reset.html", include_str!("../templates/password_reset.html"))
        .expect("Failed to load password reset template");
    tera
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let email_service: Arc<dyn EmailService> = Arc::new(SmtpEmailService::new(config));
    let templates = Arc::new(load_templates());

    let auth_service = Arc::new(AuthService::new(config));
    let notifier = Arc::new(NotificationService::new(
        email_service,
        templates,
        config.frontend_url.clone(),
    ));

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        AppState {
            config: config.clone(),
            user_repo: Arc::new(PostgresUserRepo::new(pool.clone())),
            ticket_repo: Arc::new(PostgresTicketRepo::new(pool.clone())),
            service_repo: Arc::new(PostgresServiceRepo::new(pool.clone())),
            comment_repo: Arc::new(PostgresCommentRepo::new(pool.clone())),
            auth_service,
            notifier,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        AppState {
            config: config.clone(),
            user_repo: Arc::new(SqliteUserRepo::new(pool.clone())),
            ticket_repo: Arc::new(SqliteTicketRepo::new(pool.clone())),
            service_repo: Arc::new(SqliteServiceRepo::new(pool.clone())),
            comment_repo: Arc::new(SqliteCommentRepo::new(pool.clone())),
            auth_service,
            notifier,
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
