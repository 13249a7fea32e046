use super::NotificationTemplates;
use crate::error::CollaboratorError;
use crate::store::Coordinates;
use async_trait::async_trait;
use sendgrid::SGClient;
use sendgrid::{Destination, Mail};
use tracing::{info, warn};

/// Everything the owner needs to know after a finder reached out.
#[derive(Clone, Debug)]
pub struct FoundNotice {
    pub owner_email: String,
    pub owner_name: Option<String>,
    pub pet_code: String,
    pub pet_name: String,
    pub pet_species: String,
    pub pet_sex: String,
    pub pet_color: String,
    pub pet_breed: Option<String>,
    pub finder_name: String,
    pub finder_phone: String,
    pub finder_message: Option<String>,
    pub position: Option<Coordinates>,
    pub address: Option<String>,
    pub reported_at: chrono::DateTime<chrono::Utc>,
}

/// How an owner e-mail left the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the mail provider.
    Sent,
    /// No provider configured; the message was only written to the log.
    Logged,
}

#[async_trait]
pub trait OwnerNotifier: Send + Sync {
    async fn notify_found(&self, notice: &FoundNotice) -> Result<Delivery, CollaboratorError>;
}

#[derive(Clone)]
pub struct SendgridNotifier {
    api_key: Option<String>,
    email_from: String,
}

impl SendgridNotifier {
    pub fn new(api_key: Option<String>, email_from: impl Into<String>) -> Self {
        if api_key.is_none() {
            warn!("SendGrid API key not found. Owner e-mails will only be logged.");
        }
        Self {
            api_key,
            email_from: email_from.into(),
        }
    }

    /// The SendGrid client blocks, so each send runs on the blocking pool.
    pub async fn send_email(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        body: &str,
    ) -> Result<Delivery, CollaboratorError> {
        let Some(api_key) = self.api_key.clone() else {
            info!(to = to_email, subject, body_len = body.len(), "(mock) owner e-mail");
            return Ok(Delivery::Logged);
        };

        let email_from = self.email_from.clone();
        let to_email_owned = to_email.to_string();
        let to_name = to_name.to_string();
        let subject = subject.to_string();
        let body = body.to_string();

        let sent = tokio::task::spawn_blocking(move || {
            let client = SGClient::new(api_key);
            let mail_info = Mail::new()
                .add_to(Destination {
                    address: &to_email_owned,
                    name: &to_name,
                })
                .add_from(&email_from)
                .add_subject(&subject)
                .add_html(&body);
            client.send(mail_info).map(|response| response.status())
        })
        .await;

        match sent {
            Ok(Ok(status)) if status.is_success() => {
                info!(to = to_email, "owner e-mail sent");
                Ok(Delivery::Sent)
            }
            Ok(Ok(status)) => Err(CollaboratorError::Rejected {
                collaborator: "email",
                message: status.to_string(),
            }),
            Ok(Err(e)) => Err(CollaboratorError::Http {
                collaborator: "email",
                message: e.to_string(),
            }),
            Err(e) => Err(CollaboratorError::Http {
                collaborator: "email",
                message: format!("Task Join Error: {}", e),
            }),
        }
    }
}

#[async_trait]
impl OwnerNotifier for SendgridNotifier {
    async fn notify_found(&self, notice: &FoundNotice) -> Result<Delivery, CollaboratorError> {
        let subject = NotificationTemplates::pet_found_subject(&notice.pet_name);
        let body = NotificationTemplates::pet_found_email(notice);
        let to_name = notice.owner_name.as_deref().unwrap_or("Pet Owner");
        self.send_email(&notice.owner_email, to_name, &subject, &body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn without_a_key_mail_is_only_logged() {
        let notifier = SendgridNotifier::new(None, "alerts@pettag.local");
        let delivery = notifier
            .send_email("ana@example.org", "Ana", "Luna", "<p>Hola</p>")
            .await
            .unwrap();
        assert_eq!(delivery, Delivery::Logged);
    }

    #[tokio::test]
    async fn keyed_send_runs_off_the_async_runtime() {
        // The bogus key is refused by the provider or the network is
        // unreachable; either way the call returns instead of panicking.
        let notifier =
            SendgridNotifier::new(Some("SG.not-a-real-key".into()), "alerts@pettag.local");
        let outcome = notifier
            .send_email("ana@example.org", "Ana", "Luna", "<p>Hola</p>")
            .await;
        assert!(outcome.is_err());
    }
}
