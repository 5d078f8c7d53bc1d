//! User-facing notifications.
//!
//! Toasts disappear after a short delay. Page alerts are dismissed after a
//! longer one, except warnings, which stay until the user closes them.
//! Failures of the clipboard, geolocation and API collaborators all end up
//! here as danger toasts instead of propagating.

use std::time::{Duration, Instant};

use serde::Serialize;
use strum::{Display, EnumString};

use crate::config::NotificationConfig;
use crate::geo::{Coordinates, GeoError};

pub const NO_RESPONSE_MESSAGE: &str = "No response from server";
pub const COPIED_MESSAGE: &str = "Copied to clipboard!";
pub const COPY_FAILED_MESSAGE: &str = "Failed to copy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ToastKind {
    Success,
    Danger,
    Warning,
    Info,
}

impl ToastKind {
    pub fn style_class(self) -> String {
        format!("bg-{self}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: String,
    pub message: String,
    pub kind: ToastKind,
    pub created_at: Instant,
    pub delay: Duration,
}

impl Toast {
    pub fn expires_at(&self) -> Instant {
        self.created_at.checked_add(self.delay).unwrap_or(self.created_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: String,
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: Instant,
    /// `None` keeps the alert until it is dismissed by hand.
    pub dismiss_after: Option<Duration>,
}

/// Failure reported by the HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with an error status.
    Response { status: u16, message: Option<String> },
    /// The request went out but nothing came back.
    NoResponse,
    /// The request could not be built or sent.
    Request(String),
}

#[derive(Debug)]
pub struct Notifier {
    toast_delay: Duration,
    alert_dismiss: Duration,
    toasts: Vec<Toast>,
    alerts: Vec<Alert>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(&NotificationConfig::default())
    }
}

impl Notifier {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            toast_delay: config.toast_delay,
            alert_dismiss: config.alert_dismiss,
            toasts: Vec::new(),
            alerts: Vec::new(),
        }
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn toast(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) -> &Toast {
        let toast = Toast {
            id: next_id("toast"),
            message: message.into(),
            kind,
            created_at: now,
            delay: self.toast_delay,
        };
        tracing::debug!(id = %toast.id, %kind, "toast shown");
        self.toasts.push(toast);
        &self.toasts[self.toasts.len() - 1]
    }

    pub fn alert(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) -> &Alert {
        let dismiss_after = match kind {
            ToastKind::Warning => None,
            _ => Some(self.alert_dismiss),
        };
        self.alerts.push(Alert {
            id: next_id("alert"),
            message: message.into(),
            kind,
            shown_at: now,
            dismiss_after,
        });
        &self.alerts[self.alerts.len() - 1]
    }

    /// Removes toasts and alerts whose time is up and returns their ids.
    pub fn expire(&mut self, now: Instant) -> Vec<String> {
        let mut expired = Vec::new();
        self.toasts.retain(|toast| {
            let keep = now < toast.expires_at();
            if !keep {
                expired.push(toast.id.clone());
            }
            keep
        });
        self.alerts.retain(|alert| {
            let keep = match alert.dismiss_after {
                Some(after) => now.saturating_duration_since(alert.shown_at) < after,
                None => true,
            };
            if !keep {
                expired.push(alert.id.clone());
            }
            keep
        });
        expired
    }

    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.toasts.len() + self.alerts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.alerts.retain(|alert| alert.id != id);
        before != self.toasts.len() + self.alerts.len()
    }

    pub fn report_api_error(
        &mut self,
        err: &ApiError,
        default_message: &str,
        now: Instant,
    ) -> &Toast {
        tracing::warn!(?err, "api error");
        let message = match err {
            ApiError::Response {
                message: Some(message),
                ..
            } => message.as_str(),
            ApiError::Response { message: None, .. } => default_message,
            ApiError::NoResponse => NO_RESPONSE_MESSAGE,
            ApiError::Request(_) => default_message,
        };
        let message = message.to_string();
        self.toast(message, ToastKind::Danger, now)
    }

    pub fn report_clipboard<E>(
        &mut self,
        result: std::result::Result<(), E>,
        now: Instant,
    ) -> &Toast
    where
        E: std::fmt::Debug,
    {
        match result {
            Ok(()) => self.toast(COPIED_MESSAGE, ToastKind::Success, now),
            Err(err) => {
                tracing::warn!(?err, "failed to copy");
                self.toast(COPY_FAILED_MESSAGE, ToastKind::Danger, now)
            }
        }
    }

    /// Surfaces a failed position lookup. A successful one shows nothing.
    pub fn report_location(
        &mut self,
        result: &std::result::Result<Coordinates, GeoError>,
        now: Instant,
    ) -> Option<&Toast> {
        let err = result.as_ref().err()?;
        tracing::warn!(%err, "location lookup failed");
        Some(self.toast(err.to_string(), ToastKind::Danger, now))
    }
}

fn next_id(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}
