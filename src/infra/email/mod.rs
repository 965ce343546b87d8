pub mod smtp_email_service;
