use crate::config::Config;
use crate::domain::ports::EmailService;
use crate::error::AppError;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::{authentication::Credentials, PoolConfig},
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use tracing::error;

pub struct SmtpEmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_mailbox: Mailbox,
}

impl SmtpEmailService {
    pub fn new(config: &Config) -> Self {
        let credentials = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .expect("Failed to configure SMTP relay")
            .port(config.smtp_port)
            .credentials(credentials)
            .pool_config(PoolConfig::default())
            .build();

        let from_mailbox = format!("{} <{}>", config.smtp_from_name, config.smtp_from_email)
            .parse()
            .expect("Invalid SMTP from address");

        Self { mailer, from_mailbox }
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        let to_mailbox: Mailbox = recipient
            .parse()
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid recipient address: {}", e)))?;

        let message = Message::builder()
            .from(self.from_mailbox.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| AppError::InternalWithMsg(format!("Failed to build email: {}", e)))?;

        self.mailer.send(message).await.map_err(|e| {
            let msg = format!("Failed to send email: {}", e);
            error!("{}", msg);
            AppError::InternalWithMsg(msg)
        })?;

        Ok(())
    }
}
