use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Offset, TimeZone, Utc};

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

pub const MS_PER_MINUTE: i64 = 60 * 1000;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Fractional hours elapsed from `from` to `to`; negative when `to` is earlier.
pub fn hours_between(from: Millis, to: Millis) -> f64 {
    to.saturating_sub(from) as f64 / MS_PER_HOUR as f64
}

/// Converts fractional hours to whole milliseconds, truncating toward zero.
pub fn hours_to_millis(hours: f64) -> Millis {
    (hours * MS_PER_HOUR as f64) as Millis
}

/// Saturates at the ends of the `Millis` range.
pub fn minutes_to_millis(minutes: i64) -> Millis {
    minutes.saturating_mul(MS_PER_MINUTE)
}

pub fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}

fn offset(utc_offset_hours: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_hours * 3600)
        .unwrap_or_else(|| Utc.fix())
}

fn to_local(at: Millis, utc_offset_hours: i32) -> Option<DateTime<FixedOffset>> {
    Utc.timestamp_millis_opt(at)
        .single()
        .map(|dt| dt.with_timezone(&offset(utc_offset_hours)))
}

/// Local midnight (at the given fixed offset) of the day containing `at`.
pub fn day_start(at: Millis, utc_offset_hours: i32) -> Option<Millis> {
    let local = to_local(at, utc_offset_hours)?;
    let midnight = local.date_naive().and_time(NaiveTime::MIN);
    offset(utc_offset_hours)
        .from_local_datetime(&midnight)
        .single()
        .map(|dt| dt.timestamp_millis())
}

/// The next `hour:00` local time strictly after `now`. When today's has
/// already come (or is exactly `now`) the same hour tomorrow is returned.
pub fn next_daily_at(now: Millis, hour: u32, utc_offset_hours: i32) -> Option<Millis> {
    let local = to_local(now, utc_offset_hours)?;
    let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
    let today = offset(utc_offset_hours)
        .from_local_datetime(&local.date_naive().and_time(time))
        .single()?;

    let next = if today.timestamp_millis() <= now {
        today.checked_add_signed(Duration::days(1))?
    } else {
        today
    };
    Some(next.timestamp_millis())
}

/// Formats an instant as `YYYY-MM-DD HH:MM:SS` in the given fixed offset.
pub fn format_local(at: Millis, utc_offset_hours: i32) -> String {
    match to_local(at, utc_offset_hours) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => at.to_string(),
    }
}
