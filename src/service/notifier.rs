//! Fanout orchestrator: durable log, live push, email side channel.

use std::sync::Arc;

use crate::domain::{NotificationEvent, Recipient, SessionRegistry};
use crate::error::GatewayError;
use crate::mailer::SideChannel;
use crate::persistence::NotificationLog;

/// Orchestrates notification fanout across the three delivery paths.
///
/// For each recipient, independently: append to the durable log (the
/// delivery guarantee, sequenced before any push for that recipient),
/// push to every live session, then send a kind-specific email whose
/// outcome is logged and deliberately discarded. Push and side-channel
/// failures never escalate; a storage failure aborts the whole call.
#[derive(Debug)]
pub struct Notifier<L, M> {
    log: Arc<L>,
    registry: Arc<SessionRegistry>,
    mailer: Arc<M>,
}

impl<L, M> Notifier<L, M>
where
    L: NotificationLog,
    M: SideChannel,
{
    /// Creates a new `Notifier`.
    #[must_use]
    pub fn new(log: Arc<L>, registry: Arc<SessionRegistry>, mailer: Arc<M>) -> Self {
        Self {
            log,
            registry,
            mailer,
        }
    }

    /// Fans one event out to every recipient.
    ///
    /// Returns `Ok` once the durable log append has completed for all
    /// recipients, regardless of push or side-channel outcomes. An empty
    /// recipient list is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] when a log append fails; the
    /// durability guarantee is broken, so the whole operation aborts and
    /// the caller must surface the failure.
    pub async fn notify(
        &self,
        recipients: &[Recipient],
        event: &NotificationEvent,
    ) -> Result<(), GatewayError> {
        for recipient in recipients {
            // Durability before push: the append is the critical path.
            let record = self.log.append(recipient.id, event).await?;
            tracing::debug!(
                recipient = %recipient.id,
                record_id = record.id,
                kind = event.kind().as_str(),
                "notification logged"
            );

            // A handle that vanished between resolve and send is skipped;
            // remaining handles and recipients are unaffected.
            for (handle, sender) in self.registry.resolve(recipient.id).await {
                if sender.send(event.clone()).is_err() {
                    tracing::debug!(%handle, "push skipped: connection gone");
                }
            }

            // Best-effort side channel: outcome logged, then discarded.
            let (subject, body) = email_content(event, recipient);
            if let Err(err) = self.mailer.send(&recipient.email, &subject, &body).await {
                tracing::warn!(
                    recipient = %recipient.id,
                    error = %err,
                    "side-channel delivery failed"
                );
            }
        }
        Ok(())
    }
}

/// Builds the kind-specific email subject and body for one recipient.
fn email_content(event: &NotificationEvent, recipient: &Recipient) -> (String, String) {
    match event {
        NotificationEvent::NewSubject {
            subject_name,
            subject_email,
            ..
        } => (
            format!("New subject registered: {subject_name}"),
            format!("A new subject signed up: {subject_name} ({subject_email})."),
        ),
        NotificationEvent::NewPlan { title, .. } => (
            format!("New workout plan available: {title}"),
            format!(
                "Hi {}, your supervisor assigned a new workout plan: {title}. \
                 Open the app to see the details.",
                recipient.name
            ),
        ),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, PrincipalId};
    use crate::persistence::NOTIFICATION_FETCH_LIMIT;
    use crate::persistence::models::NotificationRecord;
    use chrono::Utc;
    use std::sync::atomic::{AtomicI64, Ordering};
    use tokio::sync::{Mutex, mpsc};

    /// In-memory stand-in for the durable log.
    #[derive(Debug, Default)]
    struct MemoryLog {
        records: Mutex<Vec<NotificationRecord>>,
        next_id: AtomicI64,
    }

    impl NotificationLog for MemoryLog {
        async fn append(
            &self,
            recipient: PrincipalId,
            event: &NotificationEvent,
        ) -> Result<NotificationRecord, GatewayError> {
            let record = NotificationRecord {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                recipient_id: recipient,
                kind: event.kind().as_str().to_string(),
                payload: event.payload_json(),
                read: false,
                created_at: Utc::now(),
            };
            self.records.lock().await.push(record.clone());
            Ok(record)
        }

        async fn list_recent(
            &self,
            recipient: PrincipalId,
        ) -> Result<Vec<NotificationRecord>, GatewayError> {
            let records = self.records.lock().await;
            let mut recent: Vec<NotificationRecord> = records
                .iter()
                .filter(|r| r.recipient_id == recipient)
                .cloned()
                .collect();
            recent.sort_by(|a, b| b.id.cmp(&a.id));
            recent.truncate(NOTIFICATION_FETCH_LIMIT);
            Ok(recent)
        }

        async fn mark_read(&self, id: i64, recipient: PrincipalId) -> Result<bool, GatewayError> {
            let mut records = self.records.lock().await;
            match records
                .iter_mut()
                .find(|r| r.id == id && r.recipient_id == recipient)
            {
                Some(record) => {
                    record.read = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    /// Side channel that records every send.
    #[derive(Debug, Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl SideChannel for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), GatewayError> {
            self.sent
                .lock()
                .await
                .push((to.to_string(), subject.to_string()));
            Ok(())
        }
    }

    /// Side channel that always fails.
    #[derive(Debug)]
    struct FailingMailer;

    impl SideChannel for FailingMailer {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), GatewayError> {
            Err(GatewayError::Delivery("smtp relay down".to_string()))
        }
    }

    fn recipient(id: i64) -> Recipient {
        Recipient {
            id: PrincipalId::new(id),
            name: format!("user-{id}"),
            email: format!("user-{id}@example.com"),
        }
    }

    fn plan_event() -> NotificationEvent {
        NotificationEvent::NewPlan {
            plan_id: 1,
            title: "Leg day".to_string(),
            subject_id: PrincipalId::new(3),
            supervisor_id: PrincipalId::new(1),
        }
    }

    fn subject_event() -> NotificationEvent {
        NotificationEvent::NewSubject {
            subject_id: PrincipalId::new(3),
            subject_name: "Rui".to_string(),
            subject_email: "rui@example.com".to_string(),
        }
    }

    fn notifier<M: SideChannel>(
        mailer: M,
    ) -> (Notifier<MemoryLog, M>, Arc<MemoryLog>, Arc<SessionRegistry>) {
        let log = Arc::new(MemoryLog::default());
        let registry = Arc::new(SessionRegistry::new());
        let notifier = Notifier::new(Arc::clone(&log), Arc::clone(&registry), Arc::new(mailer));
        (notifier, log, registry)
    }

    #[tokio::test]
    async fn durable_record_exists_without_live_connections() {
        let (notifier, log, _registry) = notifier(RecordingMailer::default());

        let result = notifier.notify(&[recipient(3)], &plan_event()).await;
        assert!(result.is_ok());

        let records = log.records.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records.first().map(|r| r.kind.as_str()), Some("NEW_PLAN"));
        assert_eq!(records.first().map(|r| r.read), Some(false));
    }

    #[tokio::test]
    async fn live_sessions_receive_push() {
        let (notifier, _log, registry) = notifier(RecordingMailer::default());
        let principal = PrincipalId::new(3);
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(principal, ConnectionId::new(), tx).await;

        let event = plan_event();
        let result = notifier.notify(&[recipient(3)], &event).await;
        assert!(result.is_ok());

        let pushed = rx.recv().await;
        assert_eq!(pushed, Some(event));
    }

    #[tokio::test]
    async fn offline_recipients_are_logged_but_not_pushed() {
        // Scenario: two live supervisors, one offline; all three get a
        // durable record, the live two get a push.
        let (notifier, log, registry) = notifier(RecordingMailer::default());
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        registry
            .register(PrincipalId::new(1), ConnectionId::new(), tx_a)
            .await;
        registry
            .register(PrincipalId::new(2), ConnectionId::new(), tx_b)
            .await;

        let event = subject_event();
        let supervisors = [recipient(1), recipient(2), recipient(3)];
        let result = notifier.notify(&supervisors, &event).await;
        assert!(result.is_ok());

        assert_eq!(log.records.lock().await.len(), 3);
        assert_eq!(rx_a.recv().await, Some(event.clone()));
        assert_eq!(rx_b.recv().await, Some(event));
    }

    #[tokio::test]
    async fn log_preserves_notify_order_per_recipient() {
        let (notifier, log, _registry) = notifier(RecordingMailer::default());

        let first = plan_event();
        let second = subject_event();
        let target = [recipient(3)];
        let Ok(()) = notifier.notify(&target, &first).await else {
            panic!("first notify failed");
        };
        let Ok(()) = notifier.notify(&target, &second).await else {
            panic!("second notify failed");
        };

        let records = log.records.lock().await;
        let kinds: Vec<&str> = records.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(kinds, vec!["NEW_PLAN", "NEW_SUBJECT"]);
        assert!(records.first().map(|r| r.id) < records.last().map(|r| r.id));
    }

    #[tokio::test]
    async fn side_channel_failure_does_not_affect_log_or_other_recipients() {
        let (notifier, log, _registry) = notifier(FailingMailer);

        let result = notifier
            .notify(&[recipient(1), recipient(2)], &subject_event())
            .await;
        assert!(result.is_ok());
        assert_eq!(log.records.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn vanished_connection_is_skipped() {
        // Scenario: the receiver half is dropped before the push lands.
        let (notifier, log, registry) = notifier(RecordingMailer::default());
        let principal = PrincipalId::new(3);
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(principal, ConnectionId::new(), tx).await;
        drop(rx);

        let result = notifier.notify(&[recipient(3)], &plan_event()).await;
        assert!(result.is_ok());
        assert_eq!(log.records.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn zero_recipients_is_a_noop() {
        let (notifier, log, _registry) = notifier(RecordingMailer::default());
        let result = notifier.notify(&[], &plan_event()).await;
        assert!(result.is_ok());
        assert!(log.records.lock().await.is_empty());
    }

    #[tokio::test]
    async fn mark_read_is_idempotent() {
        let log = MemoryLog::default();
        let recipient = PrincipalId::new(3);
        let Ok(record) = log.append(recipient, &plan_event()).await else {
            panic!("append failed");
        };

        assert_eq!(log.mark_read(record.id, recipient).await.ok(), Some(true));
        assert_eq!(log.mark_read(record.id, recipient).await.ok(), Some(true));

        let Ok(recent) = log.list_recent(recipient).await else {
            panic!("list_recent failed");
        };
        assert_eq!(recent.first().map(|r| r.read), Some(true));
    }

    #[tokio::test]
    async fn mark_read_is_scoped_to_the_owner() {
        let log = MemoryLog::default();
        let owner = PrincipalId::new(3);
        let other = PrincipalId::new(4);
        let Ok(record) = log.append(owner, &plan_event()).await else {
            panic!("append failed");
        };

        assert_eq!(log.mark_read(record.id, other).await.ok(), Some(false));
        assert_eq!(log.mark_read(record.id + 1, owner).await.ok(), Some(false));

        let Ok(recent) = log.list_recent(owner).await else {
            panic!("list_recent failed");
        };
        assert_eq!(recent.first().map(|r| r.read), Some(false));
    }

    #[tokio::test]
    async fn list_recent_is_newest_first_and_capped() {
        let log = MemoryLog::default();
        let recipient = PrincipalId::new(3);
        let other = PrincipalId::new(9);
        let event = plan_event();
        for _ in 0..=NOTIFICATION_FETCH_LIMIT {
            let Ok(_) = log.append(recipient, &event).await else {
                panic!("append failed");
            };
        }
        let Ok(_) = log.append(other, &event).await else {
            panic!("append failed");
        };

        let Ok(recent) = log.list_recent(recipient).await else {
            panic!("list_recent failed");
        };
        assert_eq!(recent.len(), NOTIFICATION_FETCH_LIMIT);
        // 101 appends, ids 0..=100: the cap drops the oldest record.
        assert_eq!(recent.first().map(|r| r.id), Some(100));
        assert_eq!(recent.last().map(|r| r.id), Some(1));
        assert!(recent.iter().all(|r| r.recipient_id == recipient));
    }

    #[tokio::test]
    async fn side_channel_receives_kind_specific_message() {
        let mailer_sent = {
            let (notifier, _log, _registry) = notifier(RecordingMailer::default());
            let Ok(()) = notifier.notify(&[recipient(3)], &plan_event()).await else {
                panic!("notify failed");
            };
            let sent = notifier.mailer.sent.lock().await;
            sent.clone()
        };
        assert_eq!(mailer_sent.len(), 1);
        let Some((to, subject)) = mailer_sent.first() else {
            panic!("no mail recorded");
        };
        assert_eq!(to, "user-3@example.com");
        assert!(subject.contains("Leg day"));
    }
}
