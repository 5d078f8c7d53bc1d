//! Expiry badges.
//!
//! [`classify`] is a priority chain over the day offset; the first matching
//! row wins, so the ranges never overlap.

use serde::Serialize;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum UrgencyTier {
    Expired,
    DueToday,
    DueTomorrow,
    Soon,
    Upcoming,
    None,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Severity {
    None,
    Info,
    Warning,
    Danger,
}

impl Severity {
    pub fn style_class(self) -> &'static str {
        match self {
            Severity::Danger => "bg-danger",
            Severity::Warning => "bg-warning",
            Severity::Info => "bg-info",
            Severity::None => "",
        }
    }
}

impl UrgencyTier {
    pub fn severity(self) -> Severity {
        match self {
            UrgencyTier::Expired | UrgencyTier::DueToday => Severity::Danger,
            UrgencyTier::DueTomorrow | UrgencyTier::Soon => Severity::Warning,
            UrgencyTier::Upcoming => Severity::Info,
            UrgencyTier::None => Severity::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub tier: UrgencyTier,
    pub label: String,
    pub style_class: &'static str,
}

impl Badge {
    fn new(tier: UrgencyTier, label: String) -> Self {
        Self {
            tier,
            label,
            style_class: tier.severity().style_class(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.tier.severity()
    }

    pub fn is_visible(&self) -> bool {
        self.tier != UrgencyTier::None
    }

    /// Markup for the page renderer. Badges without a tier render nothing.
    pub fn to_html(&self) -> String {
        if !self.is_visible() {
            return String::new();
        }
        format!(
            r#"<span class="badge {}">{}</span>"#,
            self.style_class, self.label
        )
    }
}

pub fn classify(days: i64) -> Badge {
    match days {
        d if d < 0 => Badge::new(UrgencyTier::Expired, "Expired".to_string()),
        0 => Badge::new(UrgencyTier::DueToday, "Expires Today".to_string()),
        1 => Badge::new(UrgencyTier::DueTomorrow, "Expires Tomorrow".to_string()),
        2..=3 => Badge::new(UrgencyTier::Soon, days_left(days)),
        4..=7 => Badge::new(UrgencyTier::Upcoming, days_left(days)),
        _ => Badge::new(UrgencyTier::None, String::new()),
    }
}

/// Float-tolerant variant of [`classify`].
///
/// Anything below zero, negative infinity included, is expired. Fractions
/// fall into the range that contains them and keep their fractional label.
/// NaN and positive infinity produce no badge.
pub fn classify_f64(days: f64) -> Badge {
    if days.is_nan() {
        return Badge::new(UrgencyTier::None, String::new());
    }
    if days < 0.0 {
        Badge::new(UrgencyTier::Expired, "Expired".to_string())
    } else if days == 0.0 {
        Badge::new(UrgencyTier::DueToday, "Expires Today".to_string())
    } else if days == 1.0 {
        Badge::new(UrgencyTier::DueTomorrow, "Expires Tomorrow".to_string())
    } else if days <= 3.0 {
        Badge::new(UrgencyTier::Soon, days_left(days))
    } else if days <= 7.0 {
        Badge::new(UrgencyTier::Upcoming, days_left(days))
    } else {
        Badge::new(UrgencyTier::None, String::new())
    }
}

fn days_left(days: impl std::fmt::Display) -> String {
    format!("{days} Days Left")
}

/// Coarse urgency used to rank donations in listings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
    Expired,
}

impl UrgencyLevel {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d <= 0 => UrgencyLevel::Expired,
            1 => UrgencyLevel::Critical,
            2..=3 => UrgencyLevel::High,
            4..=7 => UrgencyLevel::Medium,
            _ => UrgencyLevel::Low,
        }
    }
}
