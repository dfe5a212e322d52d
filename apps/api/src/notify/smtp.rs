use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::SmtpConfig;
use crate::models::contact::ContactMessageRow;
use crate::notify::{Notifier, NotifyError};

/// Emails the site owner about each new contact message over STARTTLS.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// Builds the transport once; bad addresses fail at startup, not per request.
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let from: Mailbox = config.from.parse()?;
        let to: Mailbox = config.to.parse()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .timeout(Some(config.timeout));

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
            to,
        })
    }
}

pub(crate) fn render_subject(message: &ContactMessageRow) -> String {
    format!("New Contact Form Submission: {}", message.subject)
}

pub(crate) fn render_body(message: &ContactMessageRow) -> String {
    format!(
        "New contact message\n\n\
         Name: {}\n\
         Email: {}\n\
         Subject: {}\n\
         Received: {}\n\n\
         {}\n\n\
         --\n\
         Sent from the portfolio website contact form.",
        message.name,
        message.email,
        message.subject,
        message.date_created.to_rfc3339(),
        message.message,
    )
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_contact(&self, message: &ContactMessageRow) -> Result<(), NotifyError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(render_subject(message))
            .header(ContentType::TEXT_PLAIN);

        // The form's email rule is looser than RFC 5322; skip reply-to if it won't parse.
        if let Ok(reply_to) = message.email.parse::<Mailbox>() {
            builder = builder.reply_to(reply_to);
        }

        let email = builder
            .body(render_body(message))
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        self.mailer.send(email).await?;

        info!(contact_id = %message.id, "Contact notification email sent");
        Ok(())
    }
}
