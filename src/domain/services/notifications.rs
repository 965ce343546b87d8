use std::sync::Arc;
use crate::domain::models::ticket::Ticket;
use crate::domain::ports::EmailService;
use crate::error::AppError;
use tera::{Context, Tera};

/// Renders the HTML mail bodies and hands them to the configured
/// `EmailService`. Callers decide whether a failure is fatal; every send in
/// this system is best-effort.
pub struct NotificationService {
    email: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    frontend_url: String,
}

impl NotificationService {
    pub fn new(email: Arc<dyn EmailService>, templates: Arc<Tera>, frontend_url: String) -> Self {
        Self { email, templates, frontend_url }
    }

    pub async fn send_verification_email(&self, to: &str, name: &str, raw_token: &str) -> Result<(), AppError> {
        let mut ctx = Context::new();
        ctx.insert("name", name);
        ctx.insert("verification_url", &format!("{}/verify-email?token={}", self.frontend_url, raw_token));

        let html = self.render("verification.html", &ctx)?;
        self.email.send(to, "Verify Your Email - Digital Help Desk", &html).await
    }

    pub async fn send_welcome_email(&self, to: &str, name: &str) -> Result<(), AppError> {
        let mut ctx = Context::new();
        ctx.insert("name", name);

        let html = self.render("welcome.html", &ctx)?;
        self.email.send(to, "Welcome to Digital Help Desk!", &html).await
    }

    pub async fn send_assignment_email(&self, to: &str, staff_name: &str, ticket: &Ticket, client_name: &str) -> Result<(), AppError> {
        let mut ctx = Context::new();
        ctx.insert("staff_name", staff_name);
        ctx.insert("ticket_id", &ticket.id);
        ctx.insert("title", &ticket.title);
        ctx.insert("description", &ticket.description);
        ctx.insert("priority", &ticket.priority);
        ctx.insert("client_name", client_name);
        ctx.insert("dashboard_url", &format!("{}/dashboard/tickets/{}", self.frontend_url, ticket.id));

        let subject = format!("New Ticket Assigned: #{} - {}", ticket.id, ticket.title);
        let html = self.render("assignment.html", &ctx)?;
        self.email.send(to, &subject, &html).await
    }

    pub async fn send_password_reset_email(&self, to: &str, name: &str, raw_token: &str) -> Result<(), AppError> {
        let mut ctx = Context::new();
        ctx.insert("name", name);
        ctx.insert("reset_url", &format!("{}/reset-password?token={}", self.frontend_url, raw_token));

        let html = self.render("password_reset.html", &ctx)?;
        self.email.send(to, "Reset Your Password - Digital Help Desk", &html).await
    }

    fn render(&self, template: &str, ctx: &Context) -> Result<String, AppError> {
        self.templates.render(template, ctx)
            .map_err(|e| AppError::InternalWithMsg(format!("Template render error: {:?}", e)))
    }
}
