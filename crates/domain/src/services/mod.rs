//! Domain services for the License Portal.
//!
//! Services contain business logic that operates on domain models.

pub mod expiry;
pub mod scan;
pub mod templates;

pub use expiry::{classify, due_window};
pub use scan::{
    ExpiryCandidate, ExpiryMailer, ExpiryScanService, ExpiryStore, MailError, MockMailer,
    ScanError, ScanNotification, ScanOutcome, SentEmail, StoreError, EXPIRY_EMAIL_SUBJECT,
};
pub use templates::{render_expiry_email, EmailBodies};
