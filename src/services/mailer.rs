//! Best-effort outbound mail.
//!
//! Confirmation mail must never decide a request's outcome: a committed
//! registration stays committed even if the notification fails. Delivery goes
//! through a JSON webhook (an external relay turns it into real mail), which
//! keeps SMTP out of the process. Disabled by default.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::MailConfig;

#[derive(Debug, Serialize)]
struct OutboundMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: String,
}

#[derive(Clone)]
pub struct Mailer {
    config: MailConfig,
    client: reqwest::Client,
}

impl Mailer {
    #[must_use]
    pub fn new(config: MailConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Mails the one-shot verification link a new account must visit before
    /// it can log in. Failures are logged and swallowed.
    pub async fn send_verification_email(&self, to: &str, name: &str, token: &str) {
        let name = html_escape::encode_text(name);
        let link = format!(
            "{}/api/auth/verify?token={token}",
            self.config.site_url.trim_end_matches('/')
        );
        let body = format!(
            "<h2>Verify your email</h2>\
             <p>Hi {name},</p>\
             <p>Thanks for registering. Please confirm your address by visiting \
             <a href=\"{link}\">{link}</a>.</p>\
             <p>If you did not create an account, you can ignore this mail.</p>"
        );

        self.deliver(to, "Verify your email address", body).await;
    }

    /// Sends a registration confirmation. Failures are logged and swallowed.
    pub async fn send_registration_confirmation(
        &self,
        to: &str,
        name: &str,
        event_title: &str,
        event_date: &str,
        event_time: &str,
    ) {
        let name = html_escape::encode_text(name);
        let title = html_escape::encode_text(event_title);
        let body = format!(
            "<h2>Registration confirmed</h2>\
             <p>Hi {name},</p>\
             <p>Your seat for <strong>{title}</strong> on {event_date} at {event_time} \
             is confirmed. See you at the café!</p>"
        );

        self.deliver(to, "Event registration confirmed", body).await;
    }

    /// Acknowledges a contact-form submission. Failures are logged and swallowed.
    pub async fn send_contact_acknowledgement(&self, to: &str, name: &str) {
        let name = html_escape::encode_text(name);
        let body = format!(
            "<h2>We got your message</h2>\
             <p>Hi {name},</p>\
             <p>Thanks for reaching out. We usually reply within two days.</p>"
        );

        self.deliver(to, "Thanks for contacting us", body).await;
    }

    async fn deliver(&self, to: &str, subject: &str, html_body: String) {
        if !self.config.enabled || self.config.webhook_url.is_empty() {
            debug!("Mail disabled, skipping '{}' to {}", subject, to);
            return;
        }

        let mail = OutboundMail {
            from: &self.config.from_address,
            to,
            subject,
            html_body,
        };

        match self
            .client
            .post(&self.config.webhook_url)
            .json(&mail)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!("Mail '{}' delivered to {}", subject, to);
            }
            Ok(response) => {
                warn!(
                    "Mail relay returned {} for '{}' to {}",
                    response.status(),
                    subject,
                    to
                );
            }
            Err(e) => {
                warn!("Mail delivery failed for '{}' to {}: {}", subject, to, e);
            }
        }
    }
}
