//! Expiry rule engine: tier classification and due-window matching.
//!
//! Two deliberately distinct rule sets operate on a license expiration:
//!
//! - [`classify`] maps remaining time to a tier and is re-applied at
//!   dispatch time to tag the recorded dedup markers.
//! - [`due_window`] decides whether a license is picked up by the current
//!   scan pass. Its windows are coarser than the classifier boundaries
//!   (batch-job tolerance), and the one-month window only opens on Mondays
//!   to throttle the least urgent tier to a weekly cadence.
//!
//! The two rule sets disagree near some boundaries (e.g. a license at
//! exactly seven days out is selected by the one-week window but classified
//! as one_month). That asymmetry is inherited behavior; the unique
//! (license, tier) constraint in the store keeps the dedup invariant intact
//! either way. Do not unify the boundaries without auditing both callers.

use chrono::{DateTime, Datelike, Duration, Months, Utc, Weekday};

use crate::models::NotificationTier;

/// Remaining time above which a license is classified as four_month.
pub const FOUR_MONTH_CUTOFF_DAYS: i64 = 32;

/// Remaining time below which a license is classified as one_week.
pub const ONE_WEEK_CUTOFF_DAYS: i64 = 7;

/// Classify a license by time remaining until expiry.
///
/// Total over all deltas; an already expired license classifies as
/// one_week. Pure, no side effects.
pub fn classify(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> NotificationTier {
    let remaining = expires_at - now;
    if remaining > Duration::days(FOUR_MONTH_CUTOFF_DAYS) {
        NotificationTier::FourMonth
    } else if remaining < Duration::days(ONE_WEEK_CUTOFF_DAYS) {
        NotificationTier::OneWeek
    } else {
        NotificationTier::OneMonth
    }
}

/// Match a license expiration against the scan's due windows.
///
/// Returns the tier whose window contains `expires_at`, or `None` when no
/// window matches. Windows are mutually disjoint:
///
/// - four_month: within one day either side of `now + 4 months`
/// - one_week: at most 7 days out (including already expired)
/// - one_month: strictly between 7 days and one calendar month out,
///   matched only when `now` falls on a Monday
///
/// Whether a matched license is actually due also depends on the dedup
/// markers, which the store checks per tier.
pub fn due_window(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<NotificationTier> {
    let four_months_out = now + Months::new(4);
    let one_month_out = now + Months::new(1);
    let one_week_out = now + Duration::days(ONE_WEEK_CUTOFF_DAYS);

    if expires_at > four_months_out - Duration::days(1)
        && expires_at < four_months_out + Duration::days(1)
    {
        Some(NotificationTier::FourMonth)
    } else if expires_at <= one_week_out {
        Some(NotificationTier::OneWeek)
    } else if now.weekday() == Weekday::Mon && expires_at < one_month_out {
        Some(NotificationTier::OneMonth)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Fixtures match the notification scenarios: a Saturday and the
    // following Monday.
    fn saturday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 2, 18, 15, 0, 0).unwrap()
    }

    fn monday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 2, 20, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_classify_above_cutoff_is_four_month() {
        let now = saturday();
        assert_eq!(
            classify(now + Duration::days(33), now),
            NotificationTier::FourMonth
        );
        assert_eq!(
            classify(now + Duration::days(32) + Duration::seconds(1), now),
            NotificationTier::FourMonth
        );
        assert_eq!(
            classify(now + Months::new(4), now),
            NotificationTier::FourMonth
        );
    }

    #[test]
    fn test_classify_exactly_32_days_is_one_month() {
        let now = saturday();
        assert_eq!(
            classify(now + Duration::days(32), now),
            NotificationTier::OneMonth
        );
    }

    #[test]
    fn test_classify_below_week_is_one_week() {
        let now = saturday();
        assert_eq!(
            classify(now + Duration::days(6), now),
            NotificationTier::OneWeek
        );
        assert_eq!(
            classify(now + Duration::days(7) - Duration::seconds(1), now),
            NotificationTier::OneWeek
        );
    }

    #[test]
    fn test_classify_expired_license_is_one_week() {
        let now = saturday();
        assert_eq!(
            classify(now - Duration::days(10), now),
            NotificationTier::OneWeek
        );
    }

    #[test]
    fn test_classify_exactly_seven_days_is_one_month() {
        // The classifier's lower bound is exclusive; the selector's
        // one-week window claims this same license (see below).
        let now = saturday();
        assert_eq!(
            classify(now + Duration::days(7), now),
            NotificationTier::OneMonth
        );
    }

    #[test]
    fn test_classify_mid_range_is_one_month() {
        let now = saturday();
        assert_eq!(
            classify(now + Duration::days(20), now),
            NotificationTier::OneMonth
        );
    }

    #[test]
    fn test_window_four_month_within_one_day() {
        let now = saturday();
        let four_months = now + Months::new(4);
        assert_eq!(
            due_window(four_months, now),
            Some(NotificationTier::FourMonth)
        );
        assert_eq!(
            due_window(four_months + Duration::hours(23), now),
            Some(NotificationTier::FourMonth)
        );
        assert_eq!(
            due_window(four_months - Duration::hours(23), now),
            Some(NotificationTier::FourMonth)
        );
    }

    #[test]
    fn test_window_four_month_bounds_are_exclusive() {
        let now = saturday();
        let four_months = now + Months::new(4);
        assert_eq!(due_window(four_months + Duration::days(1), now), None);
        assert_eq!(due_window(four_months - Duration::days(1), now), None);
    }

    #[test]
    fn test_window_exactly_seven_days_claimed_by_one_week() {
        // Boundary: not one_month, not four_month, even on a Monday.
        let exactly_week_sat = saturday() + Duration::days(7);
        assert_eq!(
            due_window(exactly_week_sat, saturday()),
            Some(NotificationTier::OneWeek)
        );
        let exactly_week_mon = monday() + Duration::days(7);
        assert_eq!(
            due_window(exactly_week_mon, monday()),
            Some(NotificationTier::OneWeek)
        );
    }

    #[test]
    fn test_window_one_week_includes_expired() {
        assert_eq!(
            due_window(saturday() - Duration::days(3), saturday()),
            Some(NotificationTier::OneWeek)
        );
    }

    #[test]
    fn test_window_one_month_gated_to_mondays() {
        let remaining = Duration::days(20);
        assert_eq!(due_window(saturday() + remaining, saturday()), None);
        assert_eq!(
            due_window(monday() + remaining, monday()),
            Some(NotificationTier::OneMonth)
        );
    }

    #[test]
    fn test_window_one_month_upper_bound_exclusive() {
        let now = monday();
        let one_month = now + Months::new(1);
        assert_eq!(due_window(one_month, now), None);
        assert_eq!(
            due_window(one_month - Duration::hours(1), now),
            Some(NotificationTier::OneMonth)
        );
    }

    #[test]
    fn test_window_no_match_outside_all_windows() {
        // Two months out falls between the one-month and four-month windows.
        assert_eq!(due_window(saturday() + Months::new(2), saturday()), None);
        assert_eq!(due_window(monday() + Months::new(2), monday()), None);
        // Five months out is beyond every window.
        assert_eq!(due_window(saturday() + Months::new(5), saturday()), None);
    }
}
