use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::config::SmtpConfig;
use crate::models::Product;
use crate::utils::error::{AppError, Result};

const SEPARATOR: &str = "==================================================";

/// Anything that can deliver an alert. The runner only cares about
/// success or failure; a failed notify blocks the seen-set update so the
/// same items retry next run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<()>;
}

/// SMTP email notifier.
pub struct EmailNotifier {
    config: SmtpConfig,
}

impl EmailNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        else {
            return Err(AppError::Notify("SMTP credentials are not configured".to_string()));
        };
        let Some(sender) = self.config.sender_address() else {
            return Err(AppError::Notify("no sender address configured".to_string()));
        };
        let recipients = self.config.recipient_list();
        if recipients.is_empty() {
            return Err(AppError::Notify("no recipients configured".to_string()));
        }

        let mut builder = Message::builder()
            .from(format!("{} <{}>", self.config.from_name, sender).parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for recipient in &recipients {
            builder = builder.to(recipient.parse()?);
        }
        let email = builder.body(body.to_string())?;

        debug!(host = %self.config.host, "connecting to SMTP server");
        let transport = if self.config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
        }
        .port(self.config.port)
        .credentials(Credentials::new(username.clone(), password.clone()))
        .build();

        transport.send(email).await?;
        debug!("email sent");
        Ok(())
    }
}

/// Standard new-items body: intro, numbered title/price/link entries, the
/// search page, and a reminder that only new items alert.
pub fn build_email_body(intro: &str, products: &[Product], search_url: &str) -> String {
    let mut lines = vec![intro.to_string(), SEPARATOR.to_string(), String::new()];

    for (i, product) in products.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, product.title));
        lines.push(format!("   Price: {}", product.price_display()));
        lines.push(format!("   Link: {}", product.url));
        lines.push(String::new());
    }

    lines.push(SEPARATOR.to_string());
    lines.push(format!("\nSearch page: {search_url}"));
    lines.push("\n(You will only be notified about NEW items)".to_string());

    lines.join("\n")
}

/// Restock-alert body: like the standard body but with a stock status
/// line per item and a re-alert note instead of the new-items one.
pub fn build_restock_body(intro: &str, products: &[Product], store_url: &str) -> String {
    let mut lines = vec![intro.to_string(), SEPARATOR.to_string(), String::new()];

    for (i, product) in products.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, product.title));
        lines.push(format!("   Price: {}", product.price_display()));
        lines.push(format!("   Link: {}", product.url));
        let status = match product.available {
            Some(true) => "✅ IN STOCK",
            _ => "❌ Sold Out",
        };
        lines.push(format!("   Status: {status}"));
        lines.push(String::new());
    }

    lines.push(SEPARATOR.to_string());
    lines.push(format!("\nStore: {store_url}"));
    lines.push("\n(You will be re-alerted every 2 hours while items remain in stock)".to_string());

    lines.join("\n")
}
