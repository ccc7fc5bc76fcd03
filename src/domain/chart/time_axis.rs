use super::metrics::MetricsY;
use super::value_objects::RangeIndex;
use crate::domain::market_data::QuoteStore;
use crate::time_utils::{format_time_label, from_local, to_local};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const MONTH: f64 = 30.0 * DAY;
const YEAR: f64 = 365.0 * DAY;

/// Safety net against pathological spans.
const MAX_TICKS: usize = 512;

/// How consecutive ticks are spaced. Months and years have variable
/// length and step on the calendar, everything else is a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickStep {
    Calendar { months: u32 },
    Fixed { seconds: i64 },
}

impl TickStep {
    fn advance(&self, local: NaiveDateTime) -> Option<NaiveDateTime> {
        match *self {
            TickStep::Calendar { months } => local.checked_add_months(Months::new(months)),
            TickStep::Fixed { seconds } => local.checked_add_signed(Duration::seconds(seconds)),
        }
    }
}

/// Boundary the first tick is aligned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Snap {
    Years(i32),
    Month,
    Monday,
    Day,
    Hours(u32),
    Minutes(u32),
    Unaligned,
}

impl Snap {
    fn apply(&self, local: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = local.date();
        let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0);
        match *self {
            Snap::Years(every) => {
                let year = date.year() - date.year().rem_euclid(every);
                NaiveDate::from_ymd_opt(year, 1, 1).and_then(midnight)
            }
            Snap::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).and_then(midnight),
            Snap::Monday => {
                let back = date.weekday().num_days_from_monday() as i64;
                date.checked_sub_signed(Duration::days(back)).and_then(midnight)
            }
            Snap::Day => midnight(date),
            Snap::Hours(every) => date.and_hms_opt(local.hour() - local.hour() % every, 0, 0),
            Snap::Minutes(every) => {
                date.and_hms_opt(local.hour(), local.minute() - local.minute() % every, 0)
            }
            Snap::Unaligned => Some(local),
        }
    }
}

/// One row of the granularity table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickTier {
    /// Chosen when the visible period is strictly longer than this.
    pub threshold: f64,
    pub step: TickStep,
    pub name: &'static str,
    pub pattern: &'static str,
    snap: Snap,
}

const fn tier(threshold: f64, step: TickStep, name: &'static str, pattern: &'static str, snap: Snap) -> TickTier {
    TickTier {
        threshold,
        step,
        name,
        pattern,
        snap,
    }
}

const fn months(months: u32) -> TickStep {
    TickStep::Calendar { months }
}

const fn seconds(seconds: i64) -> TickStep {
    TickStep::Fixed { seconds }
}

static TIERS: [TickTier; 19] = [
    tier(10.0 * YEAR, months(60), "5 years", "%Y", Snap::Years(5)),
    tier(3.0 * YEAR, months(12), "1 year", "%Y", Snap::Years(1)),
    tier(YEAR, months(12), "1 year", "%Y", Snap::Years(1)),
    tier(3.0 * MONTH, months(2), "2 months", "%b %Y", Snap::Month),
    tier(2.0 * MONTH, months(1), "1 month", "%b %Y", Snap::Month),
    tier(MONTH, seconds(7 * 86_400), "7 days", "%d %b", Snap::Day),
    tier(10.0 * DAY, seconds(7 * 86_400), "7 days", "%d %b", Snap::Monday),
    tier(5.0 * DAY, seconds(86_400), "1 day", "%d %b", Snap::Hours(1)),
    tier(DAY, seconds(6 * 3600), "6 hours", "%H:%M", Snap::Hours(6)),
    tier(6.0 * HOUR, seconds(3 * 3600), "3 hours", "%H:%M", Snap::Hours(3)),
    tier(3.0 * HOUR, seconds(3600), "1 hour", "%H:%M", Snap::Hours(1)),
    tier(HOUR, seconds(30 * 60), "30 minutes", "%H:%M", Snap::Minutes(30)),
    tier(30.0 * MINUTE, seconds(10 * 60), "10 minutes", "%H:%M", Snap::Minutes(10)),
    tier(10.0 * MINUTE, seconds(5 * 60), "5 minutes", "%H:%M", Snap::Minutes(5)),
    tier(5.0 * MINUTE, seconds(60), "1 minute", "%H:%M", Snap::Minutes(1)),
    tier(MINUTE, seconds(30), "30 seconds", "%H:%M:%S", Snap::Unaligned),
    tier(30.0, seconds(10), "10 seconds", "%H:%M:%S", Snap::Unaligned),
    tier(10.0, seconds(2), "2 seconds", "%H:%M:%S", Snap::Unaligned),
    tier(1.0, seconds(1), "1 second", "%H:%M:%S", Snap::Unaligned),
];

/// Coarsest tier whose threshold is below `period`, finest as fallback.
/// Depends on the period only.
pub fn tier_for_period(period: f64) -> &'static TickTier {
    TIERS
        .iter()
        .find(|tier| tier.threshold < period)
        .unwrap_or(&TIERS[TIERS.len() - 1])
}

/// A labelled tick bound to the first quote at or after its time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickPoint {
    pub value: f64,
    pub label: String,
    /// Content pixels
    pub pixel_x: f64,
    pub quote_index: usize,
    pub tick_index: usize,
}

/// Time axis plan for one visible range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsX {
    pub ticks: Vec<TickPoint>,
    pub step: TickStep,
    pub step_name: &'static str,
    pub visible_period: f64,
    /// Visible range the plan was computed for
    pub covered: RangeIndex,
}

impl MetricsX {
    pub fn plan(store: &QuoteStore, metrics: &MetricsY, utc_offset_seconds: i32) -> Self {
        let range = metrics.range;
        let (first, last) = match (store.get(range.start), store.get(range.end)) {
            (Some(first), Some(last)) if !metrics.is_empty() => (first.timestamp, last.timestamp),
            _ => (0.0, 0.0),
        };
        let visible_period = last - first;
        let tier = tier_for_period(visible_period);
        let mut plan = Self {
            ticks: Vec::new(),
            step: tier.step,
            step_name: tier.name,
            visible_period,
            covered: range,
        };
        if visible_period <= 0.0 {
            return plan;
        }

        let Some(mut tick) = to_local(first, utc_offset_seconds).and_then(|local| tier.snap.apply(local)) else {
            return plan;
        };
        let mut previous_quote = None;
        while plan.ticks.len() < MAX_TICKS {
            let value = from_local(tick, utc_offset_seconds);
            if value >= last {
                break;
            }
            if value > first {
                if let Some(quote) = store.quote_at_or_after(value, range) {
                    if previous_quote != Some(quote.index) {
                        previous_quote = Some(quote.index);
                        plan.ticks.push(TickPoint {
                            value,
                            label: format_time_label(value, utc_offset_seconds, tier.pattern),
                            pixel_x: metrics.x_pos(quote.index),
                            quote_index: quote.index,
                            tick_index: plan.ticks.len(),
                        });
                    }
                }
            }
            match tier.step.advance(tick) {
                Some(next) if next > tick => tick = next,
                _ => break,
            }
        }
        plan
    }

    /// Whether this plan still describes `range`.
    pub fn covers(&self, range: RangeIndex) -> bool {
        self.covered.contains_range(&range)
    }
}
