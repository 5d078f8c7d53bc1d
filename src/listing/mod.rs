//! Donation board rows.
//!
//! Combines the expiry, urgency and distance helpers into the view a
//! volunteer sees: one row per available donation, nearest first when their
//! own location is known. [`stats`] gives the per-status counts a donor sees.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::{Date, OffsetDateTime};

use crate::config::DateStyle;
use crate::expiry::{days_until, format_iso, format_long, is_expired};
use crate::filter::{Row, Table};
use crate::geo::{distance_between, sort_by_distance, Coordinates};
use crate::urgency::{classify, Badge, UrgencyLevel};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DonationStatus {
    #[default]
    Available,
    Claimed,
    Completed,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub item_name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub quantity: u32,
    #[serde(with = "iso_date")]
    pub expiry_date: Date,
    #[serde(default)]
    pub status: DonationStatus,
    #[serde(default)]
    pub location: Option<Coordinates>,
}

impl Donation {
    pub fn days_until_expiry(&self, now: OffsetDateTime) -> i64 {
        days_until(self.expiry_date, now)
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        is_expired(self.expiry_date, now)
    }

    pub fn urgency_level(&self, now: OffsetDateTime) -> UrgencyLevel {
        UrgencyLevel::from_days(self.days_until_expiry(now))
    }

    /// Marks an available donation expired once its date has passed.
    /// Claimed and completed donations keep their status.
    pub fn refresh_status(&mut self, now: OffsetDateTime) -> bool {
        if self.status == DonationStatus::Available && self.is_expired(now) {
            tracing::debug!(item = %self.item_name, "donation expired");
            self.status = DonationStatus::Expired;
            return true;
        }
        false
    }
}

/// Marks every available donation whose date has passed. Returns how many
/// changed.
pub fn refresh_all(donations: &mut [Donation], now: OffsetDateTime) -> usize {
    donations
        .iter_mut()
        .map(|donation| donation.refresh_status(now))
        .filter(|changed| *changed)
        .count()
}

/// Which donations a board lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Available,
    Claimed,
    Completed,
    Expired,
    All,
}

impl StatusFilter {
    pub fn matches(self, status: DonationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Available => status == DonationStatus::Available,
            StatusFilter::Claimed => status == DonationStatus::Claimed,
            StatusFilter::Completed => status == DonationStatus::Completed,
            StatusFilter::Expired => status == DonationStatus::Expired,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DonationStats {
    pub total: usize,
    pub available: usize,
    pub claimed: usize,
    pub completed: usize,
    pub expired: usize,
}

impl fmt::Display for DonationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total {}, available {}, claimed {}, completed {}, expired {}",
            self.total, self.available, self.claimed, self.completed, self.expired
        )
    }
}

/// Counts donations by their recorded status.
pub fn stats(donations: &[Donation]) -> DonationStats {
    let mut stats = DonationStats {
        total: donations.len(),
        ..DonationStats::default()
    };
    for donation in donations {
        match donation.status {
            DonationStatus::Available => stats.available += 1,
            DonationStatus::Claimed => stats.claimed += 1,
            DonationStatus::Completed => stats.completed += 1,
            DonationStatus::Expired => stats.expired += 1,
        }
    }
    stats
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonationView {
    pub donation: Donation,
    pub days_left: i64,
    pub badge: Badge,
    pub level: UrgencyLevel,
    pub distance_km: Option<f64>,
}

pub fn build_views(
    donations: &[Donation],
    now: OffsetDateTime,
    origin: Option<Coordinates>,
    status: StatusFilter,
) -> Vec<DonationView> {
    let mut views: Vec<DonationView> = donations
        .iter()
        .filter_map(|donation| {
            let mut donation = donation.clone();
            donation.refresh_status(now);
            if !status.matches(donation.status) {
                return None;
            }
            let days_left = donation.days_until_expiry(now);
            Some(DonationView {
                distance_km: distance_between(origin, donation.location),
                badge: classify(days_left),
                level: UrgencyLevel::from_days(days_left),
                days_left,
                donation,
            })
        })
        .collect();
    if origin.is_some() {
        sort_by_distance(&mut views, |view| view.distance_km);
    }
    views
}

pub const HEADER: [&str; 7] = [
    "Item", "Category", "Qty", "Expires", "Urgency", "Status", "Distance",
];

/// Renders views into a table the filter can work on. The badge label
/// trails the expiry date and the urgency level has its own column, so
/// queries like "tomorrow" or "critical" match.
pub fn to_table(views: &[DonationView], style: DateStyle) -> Table {
    let mut table = Table::new(Row::new(HEADER));
    for view in views {
        let donation = &view.donation;
        let date = match style {
            DateStyle::Long => format_long(donation.expiry_date),
            DateStyle::Iso => format_iso(donation.expiry_date),
        };
        let expires = if view.badge.is_visible() {
            format!("{date} ({})", view.badge.label)
        } else {
            date
        };
        let distance = view
            .distance_km
            .map(|km| format!("{km:.1} km"))
            .unwrap_or_else(|| "-".to_string());
        table.push(Row::new([
            donation.item_name.clone(),
            donation.category.clone().unwrap_or_default(),
            donation.quantity.to_string(),
            expires,
            view.level.to_string(),
            donation.status.to_string(),
            distance,
        ]));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_rows;
    use crate::urgency::UrgencyTier;
    use time::macros::{date, datetime};

    fn donation(name: &str, expiry: Date, location: Option<Coordinates>) -> Donation {
        Donation {
            item_name: name.to_string(),
            category: Some("bakery".to_string()),
            quantity: 4,
            expiry_date: expiry,
            status: DonationStatus::Available,
            location,
        }
    }

    fn at(lat: f64, lng: f64) -> Option<Coordinates> {
        Some(Coordinates::new(lat, lng).unwrap())
    }

    #[test]
    fn deserializes_from_json() {
        let raw = r#"[{"item_name":"Bagels","quantity":12,"expiry_date":"2026-10-20","location":{"lat":52.5,"lng":13.4}}]"#;
        let donations: Vec<Donation> = serde_json::from_str(raw).unwrap();
        assert_eq!(donations[0].expiry_date, date!(2026 - 10 - 20));
        assert_eq!(donations[0].status, DonationStatus::Available);
        assert!(donations[0].category.is_none());
    }

    #[test]
    fn status_refresh_only_touches_available() {
        let now = datetime!(2026-10-19 09:00 UTC);
        let mut stale = donation("Rolls", date!(2026 - 10 - 18), None);
        assert!(stale.refresh_status(now));
        assert_eq!(stale.status, DonationStatus::Expired);

        let mut claimed = donation("Rolls", date!(2026 - 10 - 18), None);
        claimed.status = DonationStatus::Claimed;
        assert!(!claimed.refresh_status(now));
        assert_eq!(claimed.status, DonationStatus::Claimed);

        let mut today = donation("Rolls", date!(2026 - 10 - 19), None);
        assert!(!today.refresh_status(now));
    }

    #[test]
    fn views_are_sorted_nearest_first() {
        let now = datetime!(2026-10-19 09:00 UTC);
        let donations = vec![
            donation("Far", date!(2026 - 10 - 25), at(48.85, 2.35)),
            donation("Nowhere", date!(2026 - 10 - 20), None),
            donation("Near", date!(2026 - 10 - 21), at(52.51, 13.40)),
        ];
        let views = build_views(&donations, now, at(52.52, 13.405), StatusFilter::Available);
        let names: Vec<_> = views.iter().map(|v| v.donation.item_name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Far", "Nowhere"]);
        assert_eq!(views[0].badge.tier, UrgencyTier::Soon);
        assert_eq!(views[0].level, UrgencyLevel::High);
        assert_eq!(views[2].badge.tier, UrgencyTier::DueTomorrow);
    }

    #[test]
    fn views_keep_input_order_without_origin() {
        let now = datetime!(2026-10-19 09:00 UTC);
        let donations = vec![
            donation("A", date!(2026 - 10 - 25), at(48.85, 2.35)),
            donation("B", date!(2026 - 10 - 20), at(52.51, 13.40)),
        ];
        let views = build_views(&donations, now, None, StatusFilter::Available);
        assert_eq!(views[0].donation.item_name, "A");
        assert!(views.iter().all(|v| v.distance_km.is_none()));
    }

    #[test]
    fn table_rows_are_filterable() {
        let now = datetime!(2026-10-19 09:00 UTC);
        let donations = vec![
            donation("Sourdough", date!(2026 - 10 - 20), None),
            donation("Croissants", date!(2026 - 11 - 30), None),
        ];
        let views = build_views(&donations, now, None, StatusFilter::Available);
        let mut table = to_table(&views, DateStyle::Long);
        assert_eq!(table.rows[1].cells[3], "October 20, 2026 (Expires Tomorrow)");
        assert_eq!(table.rows[2].cells[3], "November 30, 2026");

        let report = filter_rows("tomorrow", &mut table.rows);
        assert_eq!(report.visible, vec![true, true, false]);
    }

    #[test]
    fn iso_dates_and_distances() {
        let now = datetime!(2026-10-19 09:00 UTC);
        let donations = vec![donation("Milk", date!(2026 - 10 - 17), at(0.0, 1.0))];
        let views = build_views(&donations, now, at(0.0, 0.0), StatusFilter::All);
        let table = to_table(&views, DateStyle::Iso);
        let row = &table.rows[1];
        assert_eq!(row.cells[3], "2026-10-17 (Expired)");
        assert_eq!(row.cells[4], "expired");
        assert_eq!(row.cells[5], "expired");
        assert_eq!(row.cells[6], "111.2 km");
    }

    #[test]
    fn urgency_column_is_searchable() {
        let now = datetime!(2026-10-19 09:00 UTC);
        let donations = vec![
            donation("Sourdough", date!(2026 - 10 - 20), None),
            donation("Croissants", date!(2026 - 10 - 24), None),
            donation("Crackers", date!(2026 - 12 - 01), None),
        ];
        let views = build_views(&donations, now, None, StatusFilter::Available);
        let mut table = to_table(&views, DateStyle::Iso);
        assert_eq!(table.rows[0].cells[4], "Urgency");
        let levels: Vec<_> = table.rows[1..].iter().map(|r| r.cells[4].as_str()).collect();
        assert_eq!(levels, vec!["critical", "medium", "low"]);

        let report = filter_rows("critical", &mut table.rows);
        assert_eq!(report.visible, vec![true, true, false, false]);
    }

    fn board() -> Vec<Donation> {
        let mut claimed = donation("Bagels", date!(2026 - 10 - 22), None);
        claimed.status = DonationStatus::Claimed;
        let mut completed = donation("Pretzels", date!(2026 - 10 - 10), None);
        completed.status = DonationStatus::Completed;
        vec![
            donation("Rolls", date!(2026 - 10 - 21), None),
            claimed,
            completed,
            donation("Stale", date!(2026 - 10 - 18), None),
            donation("Rye", date!(2026 - 10 - 30), None),
        ]
    }

    #[test]
    fn only_available_donations_are_listed_by_default() {
        let now = datetime!(2026-10-19 09:00 UTC);
        let donations = board();
        let names = |filter: StatusFilter| -> Vec<String> {
            build_views(&donations, now, None, filter)
                .into_iter()
                .map(|v| v.donation.item_name)
                .collect()
        };
        assert_eq!(names(StatusFilter::default()), vec!["Rolls", "Rye"]);
        assert_eq!(names(StatusFilter::Claimed), vec!["Bagels"]);
        assert_eq!(names(StatusFilter::Completed), vec!["Pretzels"]);
        // A past date on an available donation counts as expired.
        assert_eq!(names(StatusFilter::Expired), vec!["Stale"]);
        assert_eq!(names(StatusFilter::All).len(), 5);
        assert_eq!("claimed".parse::<StatusFilter>().unwrap(), StatusFilter::Claimed);
        assert!("pending".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn stats_count_each_status() {
        let now = datetime!(2026-10-19 09:00 UTC);
        let mut donations = board();
        let before = stats(&donations);
        assert_eq!(before.total, 5);
        assert_eq!(before.available, 3);
        assert_eq!(before.expired, 0);

        assert_eq!(refresh_all(&mut donations, now), 1);
        let after = stats(&donations);
        assert_eq!(
            after,
            DonationStats {
                total: 5,
                available: 2,
                claimed: 1,
                completed: 1,
                expired: 1,
            }
        );
        assert_eq!(
            after.to_string(),
            "total 5, available 2, claimed 1, completed 1, expired 1"
        );
        assert_eq!(stats(&[]), DonationStats::default());
    }
}
