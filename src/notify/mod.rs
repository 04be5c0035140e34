//! Outbound notification emails.
//!
//! Each accepted submission triggers two messages: one to the site owner and a
//! confirmation to the sender. Delivery is best-effort: failures are logged and
//! never reach the HTTP client.

use crate::{app::config::MailConfig, models::message::contact_message::ContactMessage, util::html_escape};
use lettre::{
  AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
  message::{Mailbox, header::ContentType},
  transport::{smtp::authentication::Credentials, stub::AsyncStubTransport},
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{error, info, warn};

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);
pub const CONFIRMATION_SUBJECT: &str = "Thank you for contacting me!";

#[derive(Debug, Error)]
pub enum NotifyError {
  #[error("invalid address {value:?}: {source}")]
  Address {
    value: String,
    #[source]
    source: lettre::address::AddressError,
  },

  #[error("failed to build email: {0}")]
  Build(#[from] lettre::error::Error),

  #[error("smtp: {0}")]
  Smtp(#[from] lettre::transport::smtp::Error),

  #[error("stub transport: {0}")]
  Stub(#[from] lettre::transport::stub::Error),
}

/// Where messages actually go.
pub enum Transport {
  Smtp(AsyncSmtpTransport<Tokio1Executor>),
  /// In-process transport that accepts (or rejects) everything; used by tests.
  Stub(AsyncStubTransport),
}

impl Transport {
  async fn send(&self, email: Message) -> Result<(), NotifyError> {
    match self {
      Transport::Smtp(t) => {
        t.send(email).await?;
      }
      Transport::Stub(t) => t.send(email).await?,
    }
    Ok(())
  }
}

struct Inner {
  transport: Transport,
  sender: Mailbox,
  admin: Mailbox,
  signature: String,
}

/// Cheap to clone; shared through the router state.
#[derive(Clone, Default)]
pub struct Notifier {
  inner: Option<Arc<Inner>>,
}

fn parse_mailbox(value: &str) -> Result<Mailbox, NotifyError> {
  value.parse().map_err(|source| NotifyError::Address {
    value: value.to_string(),
    source,
  })
}

impl Notifier {
  /// A notifier that only logs that email is not configured.
  pub fn disabled() -> Self {
    Self { inner: None }
  }

  /// Build an SMTP-backed notifier, or a disabled one when credentials are missing.
  pub fn from_config(cfg: &MailConfig) -> Result<Self, NotifyError> {
    let (Some(user), Some(pass)) = (cfg.username.clone(), cfg.password.clone()) else {
      return Ok(Self::disabled());
    };
    let builder = if cfg.use_ssl {
      AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.server)?
    } else if cfg.use_tls {
      AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.server)?
    } else {
      AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(cfg.server.as_str())
    };
    let transport = builder
      .port(cfg.port)
      .credentials(Credentials::new(user, pass))
      .timeout(Some(SMTP_TIMEOUT))
      .build();
    Self::with_transport(cfg, Transport::Smtp(transport))
  }

  /// Use an explicit transport. Sender and admin addresses come from `cfg`.
  pub fn with_transport(cfg: &MailConfig, transport: Transport) -> Result<Self, NotifyError> {
    let admin = cfg.admin_recipient().unwrap_or(cfg.default_sender.as_str());
    Ok(Self {
      inner: Some(Arc::new(Inner {
        transport,
        sender: parse_mailbox(&cfg.default_sender)?,
        admin: parse_mailbox(admin)?,
        signature: cfg.signature.clone(),
      })),
    })
  }

  pub fn is_enabled(&self) -> bool {
    self.inner.is_some()
  }

  /// Send the owner notification and the sender confirmation.
  ///
  /// Returns how many of the two messages were handed to the transport.
  pub async fn notify(&self, msg: &ContactMessage) -> usize {
    let Some(inner) = self.inner.as_deref() else {
      warn!("Email not configured. Skipping email notification.");
      return 0;
    };

    let mut sent = 0;
    match inner.send_admin(msg).await {
      Ok(()) => sent += 1,
      Err(e) => error!(message_id = msg.id, "failed to send admin notification: {e}"),
    }
    match inner.send_confirmation(msg).await {
      Ok(()) => sent += 1,
      Err(e) => error!(message_id = msg.id, "failed to send confirmation email: {e}"),
    }
    if sent == 2 {
      info!(message_id = msg.id, "email notifications sent");
    }
    sent
  }
}

impl Inner {
  async fn send_admin(&self, msg: &ContactMessage) -> Result<(), NotifyError> {
    let mut builder = Message::builder()
      .from(self.sender.clone())
      .to(self.admin.clone())
      .subject(admin_subject(msg))
      .header(ContentType::TEXT_HTML);
    // A submitter address lettre cannot parse still lets the owner get the message.
    if let Ok(reply_to) = parse_mailbox(&msg.email) {
      builder = builder.reply_to(reply_to);
    }
    let email = builder.body(render_admin_html(msg))?;
    self.transport.send(email).await
  }

  async fn send_confirmation(&self, msg: &ContactMessage) -> Result<(), NotifyError> {
    let email = Message::builder()
      .from(self.sender.clone())
      .to(parse_mailbox(&msg.email)?)
      .subject(CONFIRMATION_SUBJECT)
      .header(ContentType::TEXT_HTML)
      .body(render_confirmation_html(msg, &self.signature))?;
    self.transport.send(email).await
  }
}

pub fn admin_subject(msg: &ContactMessage) -> String {
  format!(
    "New Portfolio Contact: {}",
    msg.subject.as_deref().unwrap_or("(no subject)")
  )
}

fn paragraphs(text: &str) -> String {
  html_escape(text).replace('\n', "<br>\n")
}

/// HTML body for the site owner.
pub fn render_admin_html(msg: &ContactMessage) -> String {
  format!(
    r#"<!doctype html>
<html lang="en"><head><meta charset="utf-8" />
<style>
  body {{ font-family: system-ui, sans-serif; color: #222; }}
  th {{ text-align: left; padding-right: 1rem; vertical-align: top; }}
  .message {{ margin-top: 1rem; padding: 1rem; background: #f5f5f5; border-left: 4px solid #4f46e5; }}
</style>
</head>
<body>
  <h2>New contact form submission</h2>
  <table>
    <tr><th>Name</th><td>{name}</td></tr>
    <tr><th>Email</th><td><a href="mailto:{email}">{email}</a></td></tr>
    <tr><th>Subject</th><td>{subject}</td></tr>
    <tr><th>Received</th><td>{received}</td></tr>
  </table>
  <div class="message">{message}</div>
  <p><small>Message #{id}</small></p>
</body></html>
"#,
    name = html_escape(&msg.name),
    email = html_escape(&msg.email),
    subject = html_escape(msg.subject.as_deref().unwrap_or("(no subject)")),
    received = msg.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
    message = paragraphs(&msg.message),
    id = msg.id,
  )
}

/// HTML body for the person who filled in the form.
pub fn render_confirmation_html(msg: &ContactMessage, signature: &str) -> String {
  format!(
    r#"<h2>Thank you for reaching out!</h2>
<p>Hi {name},</p>
<p>I've received your message and will get back to you as soon as possible.</p>
<p><strong>Your Message:</strong></p>
<p>{message}</p>
<br>
<p>Best regards,</p>
<p>{signature}</p>
"#,
    name = html_escape(&msg.name),
    message = paragraphs(&msg.message),
    signature = html_escape(signature),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{TimeZone, Utc};

  fn sample() -> ContactMessage {
    ContactMessage {
      id: 7,
      name: "Eve <script>".to_string(),
      email: "eve@example.org".to_string(),
      subject: Some("Hi & bye".to_string()),
      message: "line one {NAME}\nline <b>two</b>".to_string(),
      created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
      is_read: false,
    }
  }

  fn mail_config() -> MailConfig {
    MailConfig {
      username: Some("bot@example.org".into()),
      password: Some("secret".into()),
      default_sender: "Site <noreply@example.org>".into(),
      signature: "Ada".into(),
      ..MailConfig::default()
    }
  }

  #[test]
  fn admin_html_escapes_user_input() {
    let html = render_admin_html(&sample());
    assert!(html.contains("Eve &lt;script&gt;"));
    assert!(html.contains("Hi &amp; bye"));
    assert!(!html.contains("<b>two</b>"));
    assert!(html.contains("line one {NAME}<br>"));
    assert!(html.contains("2024-05-01 09:30:00 UTC"));
    assert!(html.contains("Message #7"));
  }

  #[test]
  fn confirmation_html_greets_and_signs() {
    let html = render_confirmation_html(&sample(), "Ada");
    assert!(html.contains("Hi Eve &lt;script&gt;,"));
    assert!(html.contains("line &lt;b&gt;two&lt;/b&gt;"));
    assert!(html.contains("<p>Ada</p>"));
  }

  #[test]
  fn admin_subject_includes_form_subject() {
    assert_eq!(admin_subject(&sample()), "New Portfolio Contact: Hi & bye");
    let mut m = sample();
    m.subject = None;
    assert_eq!(admin_subject(&m), "New Portfolio Contact: (no subject)");
  }

  #[test]
  fn missing_credentials_disable_notifications() {
    let n = Notifier::from_config(&MailConfig::default()).unwrap();
    assert!(!n.is_enabled());
  }

  #[test]
  fn bad_sender_address_is_rejected() {
    let cfg = MailConfig {
      default_sender: "not an address".into(),
      ..mail_config()
    };
    let err = Notifier::with_transport(&cfg, Transport::Stub(AsyncStubTransport::new_ok()));
    assert!(matches!(err, Err(NotifyError::Address { .. })));
  }

  #[tokio::test]
  async fn disabled_notifier_sends_nothing() {
    assert_eq!(Notifier::disabled().notify(&sample()).await, 0);
  }

  fn recipients(envelope: &lettre::address::Envelope) -> Vec<String> {
    envelope.to().iter().map(|a| a.to_string()).collect()
  }

  #[tokio::test]
  async fn admin_and_confirmation_are_addressed_correctly() {
    let stub = AsyncStubTransport::new_ok();
    let cfg = MailConfig {
      admin_email: Some("owner@example.org".into()),
      ..mail_config()
    };
    let n = Notifier::with_transport(&cfg, Transport::Stub(stub.clone())).unwrap();
    assert!(n.is_enabled());
    assert_eq!(n.notify(&sample()).await, 2);

    let sent = stub.messages().await;
    assert_eq!(sent.len(), 2);

    let (admin_env, admin_raw) = &sent[0];
    assert_eq!(recipients(admin_env), ["owner@example.org"]);
    assert!(admin_raw.contains("Subject: New Portfolio Contact: Hi & bye"));
    assert!(admin_raw.contains("Reply-To: eve@example.org"));

    let (user_env, user_raw) = &sent[1];
    assert_eq!(recipients(user_env), ["eve@example.org"]);
    assert!(user_raw.contains("Subject: Thank you for contacting me!"));
    assert!(!user_raw.contains("Reply-To:"));
  }

  #[tokio::test]
  async fn unparseable_submitter_still_reaches_the_owner() {
    let stub = AsyncStubTransport::new_ok();
    let n = Notifier::with_transport(&mail_config(), Transport::Stub(stub.clone())).unwrap();
    let msg = ContactMessage {
      email: "a..b@example.org".to_string(),
      ..sample()
    };
    assert!(crate::validation::is_valid_email(&msg.email));
    assert_eq!(n.notify(&msg).await, 1);

    let sent = stub.messages().await;
    assert_eq!(sent.len(), 1);
    let (env, raw) = &sent[0];
    assert_eq!(recipients(env), ["bot@example.org"]);
    assert!(raw.contains("Subject: New Portfolio Contact:"));
    assert!(!raw.contains("Reply-To:"));
  }

  #[tokio::test]
  async fn transport_failures_are_swallowed() {
    let n = Notifier::with_transport(
      &mail_config(),
      Transport::Stub(AsyncStubTransport::new_error()),
    )
    .unwrap();
    assert_eq!(n.notify(&sample()).await, 0);
  }
}
