use async_trait::async_trait;
use serde::Serialize;

pub mod templates;

/// Payload emitted after a reservation commits.
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub attendee_email: String,
    pub attendee_name: String,
    pub event_name: String,
    pub event_date: String,
    pub event_time: String,
    pub event_location: String,
    pub ticket_code: String,
}

/// Payload emitted after a cancellation commits.
#[derive(Debug, Clone, Serialize)]
pub struct BookingCancellation {
    pub attendee_email: String,
    pub attendee_name: String,
    pub event_name: String,
}

/// Outbound notification sink. Fire-and-forget from the engine's standpoint:
/// the engine emits after the durable write commits and never lets a
/// delivery failure surface to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn booking_confirmed(&self, confirmation: BookingConfirmation) -> anyhow::Result<()>;
    async fn booking_cancelled(&self, cancellation: BookingCancellation) -> anyhow::Result<()>;
}

/// Default notifier: renders the mail templates and logs them. Actual SMTP
/// delivery is handled by an external collaborator, out of scope here.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn booking_confirmed(&self, confirmation: BookingConfirmation) -> anyhow::Result<()> {
        let mail = templates::booking_confirmation(&confirmation);
        tracing::info!(
            to = %confirmation.attendee_email,
            subject = %mail.subject,
            ticket_code = %confirmation.ticket_code,
            "Booking confirmation queued"
        );
        tracing::debug!(body = %mail.body, "Confirmation mail body");
        Ok(())
    }

    async fn booking_cancelled(&self, cancellation: BookingCancellation) -> anyhow::Result<()> {
        let mail = templates::booking_cancellation(&cancellation);
        tracing::info!(
            to = %cancellation.attendee_email,
            subject = %mail.subject,
            "Cancellation notice queued"
        );
        tracing::debug!(body = %mail.body, "Cancellation mail body");
        Ok(())
    }
}
