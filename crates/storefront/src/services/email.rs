//! Email delivery for password resets.
//!
//! SMTP via lettre. The mailer is optional at runtime: without SMTP
//! configuration the forgot-password endpoint reports that mail could not be
//! sent, and nothing else in the store depends on email.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::SmtpConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("invalid email address: {0}")]
    InvalidAddress(String),
}

/// Transactional mailer.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    base_url: String,
}

impl Mailer {
    /// Create a mailer from SMTP configuration.
    ///
    /// `base_url` is used to build links back into the storefront.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &SmtpConfig, base_url: &str) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_owned(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Send a password reset link.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or delivered.
    #[instrument(skip(self, token))]
    pub async fn send_password_reset(&self, to: &str, token: &str) -> Result<(), MailError> {
        let reset_link = format!("{}/reset-password?token={token}", self.base_url);

        let body = format!(
            "You have requested to reset your Farmgate password.\n\
             \n\
             Open the following link to choose a new one:\n\
             {reset_link}\n\
             \n\
             The link expires in one hour. If you did not request this,\n\
             you can safely ignore this email.\n"
        );

        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| MailError::InvalidAddress(to.to_owned()))?)
            .subject("Farmgate password reset request")
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(body),
            )?;

        self.transport.send(email).await?;
        info!(to, "password reset email sent");
        Ok(())
    }
}
