use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use shared::error::{PrayerError, PrayerResult};

/// Step used to walk past a daylight-saving gap at midnight.
const GAP_STEP_MINUTES: i64 = 15;

/// Start of a local calendar day together with the UTC offset of its wall clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalMidnight {
    pub instant: DateTime<Tz>,
    /// Offset that makes `instant == date 00:00 - offset`, in minutes.
    pub offset_minutes: i64,
}

pub struct LocalClock;

impl LocalClock {
    /// First instant of `date` in `tz`.
    ///
    /// Zones that start daylight saving at 00:00 have no local midnight on that
    /// day; the first existing local time is used instead and the reported
    /// offset is the one in force before the jump. An ambiguous midnight
    /// resolves to the earlier instant.
    pub fn local_midnight(date: NaiveDate, tz: Tz) -> PrayerResult<LocalMidnight> {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| PrayerError::date_out_of_range(format!("No midnight on {}", date)))?;

        let mut local = midnight;
        for _ in 0..(24 * 60 / GAP_STEP_MINUTES) {
            let instant = match tz.from_local_datetime(&local) {
                LocalResult::Single(dt) => dt,
                LocalResult::Ambiguous(earliest, _) => earliest,
                LocalResult::None => {
                    local += Duration::minutes(GAP_STEP_MINUTES);
                    continue;
                }
            };
            let offset_minutes = (midnight - instant.naive_utc()).num_minutes();
            return Ok(LocalMidnight {
                instant,
                offset_minutes,
            });
        }

        Err(PrayerError::date_out_of_range(format!(
            "No valid local time on {} in {}",
            date,
            tz.name()
        )))
    }

    /// Current calendar date in `tz`.
    pub fn today(tz: Tz) -> NaiveDate {
        Utc::now().with_timezone(&tz).date_naive()
    }
}
