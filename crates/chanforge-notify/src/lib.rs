pub mod alerting;
pub mod error;
pub mod publisher;

pub use alerting::{AlertingSink, HttpAlertingSink, LoggingAlertingSink};
pub use error::NotifyError;
pub use publisher::{HttpNotificationPublisher, LoggingNotificationPublisher, NotificationPublisher, PlaybackReadyNotification};
