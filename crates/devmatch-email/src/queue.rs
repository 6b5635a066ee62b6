// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded email queue and its delivery task.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use devmatch_core::{DevmatchError, EmailQueue, TrialEndingNotice};

use crate::template;

/// Email delivery parameters.
///
/// Mirrors `EmailConfig` from `devmatch-config`.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub enabled: bool,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub from_address: Option<String>,
    pub queue_size: usize,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from_address: None,
            queue_size: 100,
        }
    }
}

fn email_err(message: impl Into<String>) -> DevmatchError {
    DevmatchError::Email {
        message: message.into(),
        source: None,
    }
}

enum Delivery {
    /// Log and discard.
    Disabled,
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
}

impl Delivery {
    fn from_settings(settings: &EmailSettings) -> Result<Self, DevmatchError> {
        if !settings.enabled {
            return Ok(Self::Disabled);
        }
        let host = settings
            .smtp_host
            .as_deref()
            .ok_or_else(|| email_err("email is enabled but smtp_host is not set"))?;
        let from: Mailbox = settings
            .from_address
            .as_deref()
            .ok_or_else(|| email_err("email is enabled but from_address is not set"))?
            .parse()
            .map_err(|e| DevmatchError::Email {
                message: "invalid from_address".to_string(),
                source: Some(Box::new(e)),
            })?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| DevmatchError::Email {
                message: format!("invalid smtp relay `{host}`"),
                source: Some(Box::new(e)),
            })?
            .port(settings.smtp_port);
        if let (Some(user), Some(pass)) = (&settings.smtp_username, &settings.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self::Smtp {
            transport: builder.build(),
            from,
        })
    }

    async fn deliver(&self, notice: &TrialEndingNotice) -> Result<(), DevmatchError> {
        let (subject, body) = template::trial_ending(notice);
        let Self::Smtp { transport, from } = self else {
            info!(to = %notice.email, %subject, "email delivery disabled, dropping notice");
            return Ok(());
        };

        let to: Mailbox = notice.email.parse().map_err(|e| DevmatchError::Email {
            message: format!("invalid recipient `{}`", notice.email),
            source: Some(Box::new(e)),
        })?;
        let message = Message::builder()
            .from(from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| DevmatchError::Email {
                message: "failed to build message".to_string(),
                source: Some(Box::new(e)),
            })?;
        transport
            .send(message)
            .await
            .map_err(|e| DevmatchError::Email {
                message: "smtp delivery failed".to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }
}

/// Fire-and-forget email queue.
#[derive(Clone)]
pub struct SmtpEmailQueue {
    tx: mpsc::Sender<TrialEndingNotice>,
}

impl SmtpEmailQueue {
    /// Validates `settings` and spawns the delivery task.
    ///
    /// The task stops when `cancel` fires; notices still queued are dropped.
    pub fn start(
        settings: &EmailSettings,
        cancel: CancellationToken,
    ) -> Result<(Self, JoinHandle<()>), DevmatchError> {
        let delivery = Delivery::from_settings(settings)?;
        let (tx, rx) = mpsc::channel(settings.queue_size.max(1));
        let handle = tokio::spawn(deliver_loop(delivery, rx, cancel));
        Ok((Self { tx }, handle))
    }
}

impl EmailQueue for SmtpEmailQueue {
    fn queue_notify_free_trial_ending(
        &self,
        notice: TrialEndingNotice,
    ) -> Result<(), DevmatchError> {
        self.tx.try_send(notice).map_err(|e| match e {
            TrySendError::Full(n) => email_err(format!("email queue full, dropping notice for {}", n.email)),
            TrySendError::Closed(_) => DevmatchError::QueueClosed("email"),
        })
    }
}

async fn deliver_loop(
    delivery: Delivery,
    mut rx: mpsc::Receiver<TrialEndingNotice>,
    cancel: CancellationToken,
) {
    loop {
        let notice = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            notice = rx.recv() => match notice {
                Some(notice) => notice,
                None => break,
            },
        };
        match delivery.deliver(&notice).await {
            Ok(()) => debug!(to = %notice.email, "trial reminder delivered"),
            Err(e) => warn!(to = %notice.email, error = %e, "trial reminder not delivered"),
        }
    }
    if !rx.is_empty() {
        warn!(abandoned = rx.len(), "email queue stopped with undelivered notices");
    }
    debug!("email delivery task stopped");
}
