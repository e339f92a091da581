//! Expiry scan service.
//!
//! One scan pass selects the clients holding due licenses, and for each
//! candidate renders the message, records the notification and its dedup
//! markers, and sends a single batched email. Store access and the email
//! transport sit behind traits so the scan logic runs against Postgres in
//! production and against in-memory fakes in tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::{Client, License, NewLicenseNotification, Notification};
use crate::services::expiry::classify;
use crate::services::templates::render_expiry_email;

/// Subject line of every expiry notification email.
pub const EXPIRY_EMAIL_SUBJECT: &str = "License expiry info";

/// Errors surfaced by a store backing the scan.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Errors surfaced by an email transport.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("email transport failed: {0}")]
    Transport(String),
}

/// Errors that abort a scan pass.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A candidate client together with exactly its due licenses.
#[derive(Debug, Clone)]
pub struct ExpiryCandidate {
    pub client: Client,
    pub expiring_licenses: Vec<License>,
}

/// Store operations required by the scan.
///
/// `candidates` applies the due windows of
/// [`due_window`](crate::services::expiry::due_window) together with the
/// per-tier dedup markers. `record_license_notifications` must suppress
/// duplicate (license, tier) pairs rather than fail, and report how many
/// markers were actually recorded.
#[async_trait]
pub trait ExpiryStore: Send + Sync {
    async fn candidates(&self, now: DateTime<Utc>) -> Result<Vec<ExpiryCandidate>, StoreError>;

    async fn create_notification(
        &self,
        client_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Notification, StoreError>;

    async fn record_license_notifications(
        &self,
        notification_id: i64,
        markers: &[NewLicenseNotification],
    ) -> Result<u64, StoreError>;
}

/// Email transport used by the scan. Implementations must fail loudly:
/// a transport problem is an `Err`, never a silently dropped message.
#[async_trait]
pub trait ExpiryMailer: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), MailError>;
}

/// A notification created by a scan pass, annotated for serialization.
#[derive(Debug, Clone)]
pub struct ScanNotification {
    pub notification: Notification,
    pub client_name: String,
    pub expiring_license_count: usize,
}

/// Result of one scan pass.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub notifications: Vec<ScanNotification>,
    pub failed_emails: usize,
}

/// Runs expiry scans: candidate selection, then dispatch per candidate.
pub struct ExpiryScanService {
    store: Arc<dyn ExpiryStore>,
    mailer: Arc<dyn ExpiryMailer>,
}

impl ExpiryScanService {
    pub fn new(store: Arc<dyn ExpiryStore>, mailer: Arc<dyn ExpiryMailer>) -> Self {
        Self { store, mailer }
    }

    /// Run one scan pass at the given instant.
    ///
    /// Idempotent for a fixed `now` and unchanged data: every dispatched
    /// tier is marked before the send attempt, so a rerun selects nothing.
    /// Markers are not rolled back when the send fails, making delivery
    /// at-most-once; failed sends are logged, counted in the outcome, and
    /// do not block the remaining candidates.
    pub async fn run_scan(&self, now: DateTime<Utc>) -> Result<ScanOutcome, ScanError> {
        let candidates = self.store.candidates(now).await?;
        info!(
            clients = candidates.len(),
            "expiry scan selected candidate clients"
        );

        let mut outcome = ScanOutcome::default();

        for candidate in candidates {
            let bodies = render_expiry_email(&candidate.client, &candidate.expiring_licenses);

            let notification = self
                .store
                .create_notification(candidate.client.id, now)
                .await?;

            // Markers carry the tier re-derived by the classifier at
            // dispatch time, not the tier of the window that selected the
            // license. The two disagree near some boundaries; see the
            // expiry module.
            let markers: Vec<NewLicenseNotification> = candidate
                .expiring_licenses
                .iter()
                .map(|license| NewLicenseNotification {
                    license_id: license.id,
                    tier: classify(license.expires_at, now),
                })
                .collect();

            let recorded = self
                .store
                .record_license_notifications(notification.id, &markers)
                .await?;

            if recorded == 0 {
                // A concurrent scan won the race on every marker.
                warn!(
                    client = %candidate.client.client_name,
                    "all tiers already recorded elsewhere, suppressing duplicate email"
                );
                continue;
            }

            if let Err(e) = self
                .mailer
                .send(
                    &candidate.client.poc_contact_email,
                    EXPIRY_EMAIL_SUBJECT,
                    &bodies.text,
                    &bodies.html,
                )
                .await
            {
                error!(
                    client = %candidate.client.client_name,
                    recipient = %candidate.client.poc_contact_email,
                    error = %e,
                    "failed to send expiry notification email"
                );
                outcome.failed_emails += 1;
            } else {
                info!(
                    client = %candidate.client.client_name,
                    licenses = candidate.expiring_licenses.len(),
                    "expiry notification sent"
                );
            }

            outcome.notifications.push(ScanNotification {
                notification,
                client_name: candidate.client.client_name.clone(),
                expiring_license_count: candidate.expiring_licenses.len(),
            });
        }

        Ok(outcome)
    }
}

/// A sent email captured by [`MockMailer`].
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Mock email transport for development and testing.
///
/// Records every message instead of sending it; can simulate transport
/// failures.
#[derive(Debug, Default)]
pub struct MockMailer {
    simulate_failure: bool,
    sent: std::sync::Mutex<Vec<SentEmail>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock transport whose every send fails.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            sent: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Messages captured so far.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().expect("mock mailer lock poisoned").clone()
    }
}

#[async_trait]
impl ExpiryMailer for MockMailer {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        if self.simulate_failure {
            warn!(recipient = %recipient, "mock mailer simulating transport failure");
            return Err(MailError::Transport("simulated failure".to_string()));
        }

        info!(recipient = %recipient, subject = %subject, "mock mailer captured email");
        self.sent
            .lock()
            .expect("mock mailer lock poisoned")
            .push(SentEmail {
                recipient: recipient.to_string(),
                subject: subject.to_string(),
                text_body: text_body.to_string(),
                html_body: html_body.to_string(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LicenseKind, NotificationTier, Package};
    use crate::services::expiry::due_window;
    use chrono::{Duration, Months, TimeZone};
    use std::sync::Mutex;

    /// In-memory store mirroring the Postgres store's selection rules.
    #[derive(Default)]
    struct MemoryStore {
        state: Mutex<MemoryState>,
    }

    #[derive(Default)]
    struct MemoryState {
        clients: Vec<Client>,
        licenses: Vec<License>,
        notifications: Vec<Notification>,
        markers: Vec<(i64, NotificationTier)>,
        next_id: i64,
    }

    impl MemoryState {
        fn has_marker(&self, license_id: i64, tier: NotificationTier) -> bool {
            self.markers.contains(&(license_id, tier))
        }
    }

    impl MemoryStore {
        fn add_client(&self, name: &str, email: &str) -> i64 {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let id = state.next_id;
            state.clients.push(Client {
                id,
                client_name: name.to_string(),
                poc_contact_name: format!("{name} Admin"),
                poc_contact_email: email.to_string(),
                admin_owner: "admin@portal.example.com".to_string(),
            });
            id
        }

        fn add_license(
            &self,
            client_id: i64,
            package: Package,
            expires_at: DateTime<Utc>,
        ) -> i64 {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let id = state.next_id;
            state.licenses.push(License {
                id,
                client_id,
                package,
                kind: LicenseKind::Production,
                created_at: expires_at - Duration::days(90),
                expires_at,
            });
            id
        }

        fn set_license_expiry(&self, license_id: i64, expires_at: DateTime<Utc>) {
            let mut state = self.state.lock().unwrap();
            let license = state
                .licenses
                .iter_mut()
                .find(|l| l.id == license_id)
                .unwrap();
            license.expires_at = expires_at;
        }

        fn notification_count(&self) -> usize {
            self.state.lock().unwrap().notifications.len()
        }

        fn marker_count(&self) -> usize {
            self.state.lock().unwrap().markers.len()
        }

        fn markers_for(&self, license_id: i64) -> Vec<NotificationTier> {
            self.state
                .lock()
                .unwrap()
                .markers
                .iter()
                .filter(|(id, _)| *id == license_id)
                .map(|(_, tier)| *tier)
                .collect()
        }
    }

    #[async_trait]
    impl ExpiryStore for MemoryStore {
        async fn candidates(
            &self,
            now: DateTime<Utc>,
        ) -> Result<Vec<ExpiryCandidate>, StoreError> {
            let state = self.state.lock().unwrap();
            let mut out = Vec::new();
            for client in &state.clients {
                let due: Vec<License> = state
                    .licenses
                    .iter()
                    .filter(|l| l.client_id == client.id)
                    .filter(|l| {
                        matches!(due_window(l.expires_at, now),
                            Some(tier) if !state.has_marker(l.id, tier))
                    })
                    .cloned()
                    .collect();
                if !due.is_empty() {
                    out.push(ExpiryCandidate {
                        client: client.clone(),
                        expiring_licenses: due,
                    });
                }
            }
            Ok(out)
        }

        async fn create_notification(
            &self,
            client_id: i64,
            now: DateTime<Utc>,
        ) -> Result<Notification, StoreError> {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let notification = Notification {
                id: state.next_id,
                client_id,
                created_at: now,
            };
            state.notifications.push(notification.clone());
            Ok(notification)
        }

        async fn record_license_notifications(
            &self,
            _notification_id: i64,
            markers: &[NewLicenseNotification],
        ) -> Result<u64, StoreError> {
            let mut state = self.state.lock().unwrap();
            let mut recorded = 0;
            for marker in markers {
                if !state.has_marker(marker.license_id, marker.tier) {
                    state.markers.push((marker.license_id, marker.tier));
                    recorded += 1;
                }
            }
            Ok(recorded)
        }
    }

    fn saturday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 2, 18, 15, 0, 0).unwrap()
    }

    fn monday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 2, 20, 15, 0, 0).unwrap()
    }

    struct Fixtures {
        store: Arc<MemoryStore>,
        license_a1: i64,
        license_a2: i64,
        license_a3: i64,
    }

    /// Client A holds licenses at ~4 months, 1 month minus an hour, and
    /// 6 days out; client B holds one license 5 months out.
    fn init_fixtures(now: DateTime<Utc>) -> Fixtures {
        let store = Arc::new(MemoryStore::default());
        let client_a = store.add_client("Client A", "poc@clienta.example.com");
        let client_b = store.add_client("Client B", "poc@clientb.example.com");

        let license_a1 = store.add_license(client_a, Package::SdkIos, now + Months::new(4));
        let license_a2 = store.add_license(
            client_a,
            Package::SdkAndroid,
            now + Months::new(1) - Duration::hours(1),
        );
        let license_a3 = store.add_license(client_a, Package::SdkJs, now + Duration::days(6));
        store.add_license(client_b, Package::SdkIos, now + Months::new(5));

        Fixtures {
            store,
            license_a1,
            license_a2,
            license_a3,
        }
    }

    fn service(store: Arc<MemoryStore>, mailer: Arc<MockMailer>) -> ExpiryScanService {
        ExpiryScanService::new(store, mailer)
    }

    #[tokio::test]
    async fn test_scan_on_saturday_skips_one_month_license() {
        let now = saturday();
        let fixtures = init_fixtures(now);
        let mailer = Arc::new(MockMailer::new());
        let scan = service(fixtures.store.clone(), mailer.clone());

        let candidates = fixtures.store.candidates(now).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].expiring_licenses.len(), 2);

        let outcome = scan.run_scan(now).await.unwrap();
        assert_eq!(outcome.notifications.len(), 1);
        assert_eq!(outcome.notifications[0].client_name, "Client A");
        assert_eq!(outcome.notifications[0].expiring_license_count, 2);
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(fixtures.store.notification_count(), 1);
        assert_eq!(fixtures.store.marker_count(), 2);

        // Second pass with unchanged data dispatches nothing.
        let outcome = scan.run_scan(now).await.unwrap();
        assert!(outcome.notifications.is_empty());
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(fixtures.store.notification_count(), 1);
        assert_eq!(fixtures.store.marker_count(), 2);

        // Moving the one-month license into the one-week window triggers a
        // second notification for it alone.
        fixtures
            .store
            .set_license_expiry(fixtures.license_a2, now + Duration::days(6));

        let outcome = scan.run_scan(now).await.unwrap();
        assert_eq!(outcome.notifications.len(), 1);
        assert_eq!(outcome.notifications[0].expiring_license_count, 1);
        assert_eq!(mailer.sent().len(), 2);
        assert_eq!(fixtures.store.notification_count(), 2);
        assert_eq!(fixtures.store.marker_count(), 3);
    }

    #[tokio::test]
    async fn test_scan_on_monday_includes_one_month_license() {
        let now = monday();
        let fixtures = init_fixtures(now);
        let mailer = Arc::new(MockMailer::new());
        let scan = service(fixtures.store.clone(), mailer.clone());

        let candidates = fixtures.store.candidates(now).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].expiring_licenses.len(), 3);

        let outcome = scan.run_scan(now).await.unwrap();
        assert_eq!(outcome.notifications.len(), 1);
        assert_eq!(outcome.notifications[0].expiring_license_count, 3);
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(fixtures.store.notification_count(), 1);
        assert_eq!(fixtures.store.marker_count(), 3);

        let outcome = scan.run_scan(now).await.unwrap();
        assert!(outcome.notifications.is_empty());
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(fixtures.store.marker_count(), 3);
    }

    #[tokio::test]
    async fn test_dedup_marker_recorded_at_most_once_per_tier() {
        let now = monday();
        let fixtures = init_fixtures(now);
        let mailer = Arc::new(MockMailer::new());
        let scan = service(fixtures.store.clone(), mailer.clone());

        scan.run_scan(now).await.unwrap();
        scan.run_scan(now).await.unwrap();
        scan.run_scan(now).await.unwrap();

        for license_id in [fixtures.license_a1, fixtures.license_a2, fixtures.license_a3] {
            assert_eq!(fixtures.store.markers_for(license_id).len(), 1);
        }
    }

    #[tokio::test]
    async fn test_marker_tier_comes_from_dispatch_time_classification() {
        let now = saturday();
        let fixtures = init_fixtures(now);
        let mailer = Arc::new(MockMailer::new());
        let scan = service(fixtures.store.clone(), mailer.clone());

        scan.run_scan(now).await.unwrap();

        assert_eq!(
            fixtures.store.markers_for(fixtures.license_a1),
            vec![NotificationTier::FourMonth]
        );
        assert_eq!(
            fixtures.store.markers_for(fixtures.license_a3),
            vec![NotificationTier::OneWeek]
        );
    }

    #[tokio::test]
    async fn test_client_without_due_licenses_gets_no_email() {
        let now = saturday();
        let fixtures = init_fixtures(now);
        let mailer = Arc::new(MockMailer::new());
        let scan = service(fixtures.store.clone(), mailer.clone());

        scan.run_scan(now).await.unwrap();

        let recipients: Vec<String> =
            mailer.sent().into_iter().map(|m| m.recipient).collect();
        assert_eq!(recipients, vec!["poc@clienta.example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_email_batches_all_due_licenses_for_client() {
        let now = monday();
        let fixtures = init_fixtures(now);
        let mailer = Arc::new(MockMailer::new());
        let scan = service(fixtures.store.clone(), mailer.clone());

        scan.run_scan(now).await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, EXPIRY_EMAIL_SUBJECT);
        assert!(sent[0].html_body.contains("iOS SDK"));
        assert!(sent[0].html_body.contains("Android SDK"));
        assert!(sent[0].html_body.contains("JavaScript SDK"));
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_block_other_clients() {
        let now = saturday();
        let store = Arc::new(MemoryStore::default());
        let client_a = store.add_client("Client A", "poc@clienta.example.com");
        let client_b = store.add_client("Client B", "poc@clientb.example.com");
        store.add_license(client_a, Package::SdkJs, now + Duration::days(6));
        store.add_license(client_b, Package::SdkIos, now + Duration::days(3));

        let mailer = Arc::new(MockMailer::failing());
        let scan = service(store.clone(), mailer.clone());

        let outcome = scan.run_scan(now).await.unwrap();
        assert_eq!(outcome.notifications.len(), 2);
        assert_eq!(outcome.failed_emails, 2);
        // Markers persist even though nothing was delivered: at-most-once.
        assert_eq!(store.marker_count(), 2);

        let working = Arc::new(MockMailer::new());
        let scan = service(store.clone(), working.clone());
        let outcome = scan.run_scan(now).await.unwrap();
        assert!(outcome.notifications.is_empty());
        assert!(working.sent().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_marker_suppresses_email() {
        let now = saturday();
        let store = Arc::new(MemoryStore::default());
        let client_a = store.add_client("Client A", "poc@clienta.example.com");
        // Exactly seven days out: the one-week window selects the license,
        // while the dispatch-time classifier derives one_month.
        let license = store.add_license(client_a, Package::SdkJs, now + Duration::days(7));

        // The classifier's tier was already recorded by an earlier pass.
        store
            .record_license_notifications(
                0,
                &[NewLicenseNotification {
                    license_id: license,
                    tier: NotificationTier::OneMonth,
                }],
            )
            .await
            .unwrap();

        let mailer = Arc::new(MockMailer::new());
        let scan = service(store.clone(), mailer.clone());

        // The selector still sees the license as due (no one_week marker),
        // but the marker insert records nothing, so the email is suppressed.
        let outcome = scan.run_scan(now).await.unwrap();
        assert!(outcome.notifications.is_empty());
        assert!(mailer.sent().is_empty());
        assert_eq!(store.marker_count(), 1);
        assert_eq!(store.notification_count(), 1);
    }
}
