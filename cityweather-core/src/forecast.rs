//! Folding 3-hour forecast samples into per-day records.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use std::collections::HashMap;

use crate::model::{Forecast, ForecastDay, ForecastSample};

/// Number of days shown in the outlook.
pub const DAYS_SHOWN: usize = 5;

pub const TODAY_LABEL: &str = "Today";

/// Group samples by local calendar date.
///
/// The first sample of a date seeds the record; later samples of that date
/// only widen `temp_max`/`temp_min`. Records come out in order of first
/// appearance.
pub fn aggregate_daily(samples: &[ForecastSample], offset: FixedOffset) -> Vec<ForecastDay> {
    let mut days: Vec<ForecastDay> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for sample in samples {
        let local = sample.time.with_timezone(&offset);
        let date = local.date_naive();

        match index.get(&date) {
            Some(&i) => {
                let day = &mut days[i];
                if sample.temp_max > day.temp_max {
                    day.temp_max = sample.temp_max;
                }
                if sample.temp_min < day.temp_min {
                    day.temp_min = sample.temp_min;
                }
            }
            None => {
                index.insert(date, days.len());
                days.push(ForecastDay {
                    date,
                    weekday: local.format("%A").to_string(),
                    temp_max: sample.temp_max,
                    temp_min: sample.temp_min,
                    description: sample.description.clone(),
                    icon: sample.icon.clone(),
                    category: sample.category,
                    humidity: sample.humidity,
                    wind_speed: sample.wind_speed,
                    precipitation: sample.pop * 100.0,
                });
            }
        }
    }

    days
}

/// Aggregate a provider forecast using its own UTC offset.
pub fn daily_from_forecast(forecast: &Forecast) -> Vec<ForecastDay> {
    let offset = FixedOffset::east_opt(forecast.utc_offset_secs).unwrap_or_else(|| {
        tracing::warn!(
            offset = forecast.utc_offset_secs,
            "forecast UTC offset out of range, grouping by UTC date"
        );
        Utc.fix()
    });
    aggregate_daily(&forecast.samples, offset)
}

/// The first [`DAYS_SHOWN`] days, labelled for display.
pub fn outlook(days: &[ForecastDay]) -> Vec<(&str, &ForecastDay)> {
    days.iter()
        .take(DAYS_SHOWN)
        .enumerate()
        .map(|(i, day)| {
            let label = if i == 0 { TODAY_LABEL } else { day.weekday.as_str() };
            (label, day)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeatherCategory;
    use chrono::{DateTime, TimeZone};

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    fn sample(time: DateTime<Utc>, max: f64, min: f64, description: &str) -> ForecastSample {
        ForecastSample {
            time,
            temp_max: max,
            temp_min: min,
            humidity: 60,
            wind_speed: 3.0,
            description: description.to_string(),
            icon: format!("{description}-icon"),
            category: WeatherCategory::Clouds,
            pop: 0.25,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn same_day_samples_widen_the_range() {
        let samples = vec![
            sample(at(2024, 1, 1, 0), 10.0, 2.0, "first"),
            sample(at(2024, 1, 1, 3), 15.0, -1.0, "second"),
            sample(at(2024, 1, 2, 0), 8.0, 0.0, "third"),
        ];

        let days = aggregate_daily(&samples, utc());

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(days[0].temp_max, 15.0);
        assert_eq!(days[0].temp_min, -1.0);
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(days[1].temp_max, 8.0);
        assert_eq!(days[1].temp_min, 0.0);
    }

    #[test]
    fn later_samples_never_replace_description_or_icon() {
        let samples = vec![
            sample(at(2024, 1, 1, 0), 10.0, 2.0, "clear sky"),
            sample(at(2024, 1, 1, 3), 12.0, 1.0, "heavy rain"),
        ];

        let days = aggregate_daily(&samples, utc());

        assert_eq!(days[0].description, "clear sky");
        assert_eq!(days[0].icon, "clear sky-icon");
    }

    #[test]
    fn narrower_later_samples_leave_range_alone() {
        let samples = vec![
            sample(at(2024, 1, 1, 0), 10.0, 2.0, "a"),
            sample(at(2024, 1, 1, 3), 9.0, 3.0, "b"),
        ];

        let days = aggregate_daily(&samples, utc());

        assert_eq!(days[0].temp_max, 10.0);
        assert_eq!(days[0].temp_min, 2.0);
    }

    #[test]
    fn precipitation_is_percent_of_seed_sample() {
        let days = aggregate_daily(&[sample(at(2024, 1, 1, 0), 1.0, 0.0, "a")], utc());
        assert_eq!(days[0].precipitation, 25.0);
    }

    #[test]
    fn grouping_uses_local_date() {
        // 23:00 UTC on Jan 1 is already Jan 2 at UTC+2.
        let samples = vec![
            sample(at(2024, 1, 1, 20), 5.0, 1.0, "a"),
            sample(at(2024, 1, 1, 23), 6.0, 0.0, "b"),
        ];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let days = aggregate_daily(&samples, plus_two);

        assert_eq!(days.len(), 2);
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(days[1].weekday, "Tuesday");
    }

    #[test]
    fn outlook_shows_five_days_starting_with_today() {
        let samples: Vec<_> = (1..=6)
            .map(|d| sample(at(2024, 1, d, 12), 1.0, 0.0, "x"))
            .collect();
        let days = aggregate_daily(&samples, utc());

        let shown = outlook(&days);

        assert_eq!(shown.len(), DAYS_SHOWN);
        assert_eq!(shown[0].0, TODAY_LABEL);
        assert_eq!(shown[1].0, "Tuesday");
        assert_eq!(shown[4].1.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let forecast = Forecast {
            utc_offset_secs: i32::MAX,
            samples: vec![sample(at(2024, 1, 1, 23), 1.0, 0.0, "x")],
        };

        let days = daily_from_forecast(&forecast);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
