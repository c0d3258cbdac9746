use chrono::{DateTime, Utc};
use thiserror::Error;

/// Discount shape of a promo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoKind {
    Percent,
    Fixed,
}

impl PromoKind {
    pub fn parse(s: &str) -> Option<PromoKind> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PERCENT" => Some(PromoKind::Percent),
            "FIXED" => Some(PromoKind::Fixed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PromoKind::Percent => "PERCENT",
            PromoKind::Fixed => "FIXED",
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PromoRejection {
    #[error("Promo code is inactive")]
    Inactive,
    #[error("Promo code is not active yet")]
    NotYetActive,
    #[error("Promo code has expired")]
    Expired,
}

/// Checks the activity flag and the optional validity window against `now`.
/// A code with a future `starts_at` is rejected even when `active` is set.
pub fn usable_at(
    active: bool,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), PromoRejection> {
    if !active {
        return Err(PromoRejection::Inactive);
    }
    if let Some(starts_at) = starts_at {
        if now < starts_at {
            return Err(PromoRejection::NotYetActive);
        }
    }
    if let Some(ends_at) = ends_at {
        if now > ends_at {
            return Err(PromoRejection::Expired);
        }
    }
    Ok(())
}

/// Computes the discount for a subtotal, clamped to `[0, subtotal]` so it is
/// never negative and never exceeds what is being bought.
pub fn discount_amount(kind: PromoKind, value: f32, subtotal: f32) -> f32 {
    let raw = match kind {
        PromoKind::Percent => subtotal * value / 100.0,
        PromoKind::Fixed => value,
    };
    raw.clamp(0.0, subtotal.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn percent_discount_is_a_fraction_of_the_subtotal() {
        assert_eq!(discount_amount(PromoKind::Percent, 10.0, 250.0), 25.0);
        assert_eq!(discount_amount(PromoKind::Percent, 100.0, 250.0), 250.0);
        assert_eq!(discount_amount(PromoKind::Percent, 10.0, 0.0), 0.0);
    }

    #[test]
    fn fixed_discount_never_exceeds_the_subtotal() {
        assert_eq!(discount_amount(PromoKind::Fixed, 50.0, 30.0), 30.0);
        assert_eq!(discount_amount(PromoKind::Fixed, 50.0, 200.0), 50.0);
    }

    #[test]
    fn discount_is_never_negative() {
        assert_eq!(discount_amount(PromoKind::Fixed, -10.0, 100.0), 0.0);
        assert_eq!(discount_amount(PromoKind::Percent, -5.0, 100.0), 0.0);
    }

    #[test]
    fn inactive_codes_are_rejected() {
        assert_eq!(
            usable_at(false, None, None, Utc::now()),
            Err(PromoRejection::Inactive)
        );
    }

    #[test]
    fn future_start_rejects_even_when_active() {
        let now = Utc::now();
        let starts = now + TimeDelta::hours(1);
        assert_eq!(
            usable_at(true, Some(starts), None, now),
            Err(PromoRejection::NotYetActive)
        );
    }

    #[test]
    fn past_end_rejects() {
        let now = Utc::now();
        let ends = now - TimeDelta::hours(1);
        assert_eq!(
            usable_at(true, None, Some(ends), now),
            Err(PromoRejection::Expired)
        );
    }

    #[test]
    fn open_window_accepts_active_codes() {
        let now = Utc::now();
        assert_eq!(usable_at(true, None, None, now), Ok(()));
        assert_eq!(
            usable_at(
                true,
                Some(now - TimeDelta::hours(1)),
                Some(now + TimeDelta::hours(1)),
                now
            ),
            Ok(())
        );
    }

    #[test]
    fn kind_parse_accepts_canonical_strings_only() {
        assert_eq!(PromoKind::parse("percent"), Some(PromoKind::Percent));
        assert_eq!(PromoKind::parse("FIXED"), Some(PromoKind::Fixed));
        assert_eq!(PromoKind::parse("BOGOF"), None);
    }
}
