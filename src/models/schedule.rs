use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use near_sdk::serde::{Deserialize, Serialize};
use thiserror::Error;

// === Error Hierarchy ===
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum ScheduleError {
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: String, end: String },
    #[error("weekly schedule needs at least one weekday")]
    EmptyWeekdays,
    #[error("schedule spans {days} days, at most {max} allowed")]
    SpanTooLong { days: i64, max: u32 },
    #[error("no valid dates produced")]
    NoValidDates,
}

// === Core Data Structures ===
#[derive(Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd,
    Debug, JsonSchema)]
#[serde(crate = "near_sdk::serde", rename_all = "lowercase")]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Weekday::Sun,
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(crate = "near_sdk::serde", tag = "frequency", rename_all = "snake_case")]
pub enum Schedule {
    // a missing end means start only
    Daily {
        #[schemars(with = "String")]
        start: NaiveDate,
        #[schemars(with = "Option<String>")]
        #[serde(default)]
        end: Option<NaiveDate>,
    },
    Weekly {
        #[schemars(with = "String")]
        start: NaiveDate,
        #[schemars(with = "String")]
        end: NaiveDate,
        weekdays: Vec<Weekday>,
    },
    Once {
        #[schemars(with = "String")]
        date: NaiveDate,
    },
    ExplicitDates {
        #[schemars(with = "Vec<String>")]
        dates: Vec<NaiveDate>,
    },
}

// === Core Implementations ===
impl Schedule {
    pub fn expand(&self, max_span_days: u32) -> Result<Vec<NaiveDate>, ScheduleError> {
        let dates: Vec<NaiveDate> = match self {
            Schedule::Daily { start, end } => {
                let end = end.unwrap_or(*start);
                check_span(*start, end, max_span_days)?;
                start.iter_days().take_while(|day| *day <= end).collect()
            },
            Schedule::Weekly { start, end, weekdays } => {
                if weekdays.is_empty() {
                    return Err(ScheduleError::EmptyWeekdays);
                }
                check_span(*start, *end, max_span_days)?;
                start.iter_days()
                    .take_while(|day| day <= end)
                    .filter(|day| weekdays.contains(&Weekday::from(day.weekday())))
                    .collect()
            },
            Schedule::Once { date } => vec![*date],
            Schedule::ExplicitDates { dates } => {
                let mut unique = dates.clone();
                unique.sort();
                unique.dedup();
                unique
            },
        };

        if dates.is_empty() {
            return Err(ScheduleError::NoValidDates);
        }
        Ok(dates)
    }
}

fn check_span(start: NaiveDate, end: NaiveDate, max_span_days: u32) -> Result<(), ScheduleError> {
    if end < start {
        return Err(ScheduleError::EndBeforeStart {
            start: start.to_string(),
            end: end.to_string(),
        });
    }
    // inclusive of both ends
    let days = end.signed_duration_since(start).num_days() + 1;
    if days > max_span_days as i64 {
        return Err(ScheduleError::SpanTooLong { days, max: max_span_days });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use proptest::prelude::*;

    const SPAN: u32 = 366;
    const WEEK: [Weekday; 7] = [
        Weekday::Sun, Weekday::Mon, Weekday::Tue, Weekday::Wed,
        Weekday::Thu, Weekday::Fri, Weekday::Sat,
    ];

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn dates(list: &[&str]) -> Vec<NaiveDate> {
        list.iter().map(|s| date(s)).collect()
    }

    #[test]
    fn daily_range_is_inclusive() {
        let schedule = Schedule::Daily { start: date("2025-01-01"), end: Some(date("2025-01-03")) };
        assert_eq!(
            schedule.expand(SPAN).unwrap(),
            dates(&["2025-01-01", "2025-01-02", "2025-01-03"])
        );
    }

    #[test]
    fn daily_without_end_defaults_to_start() {
        let schedule = Schedule::Daily { start: date("2025-03-10"), end: None };
        assert_eq!(schedule.expand(SPAN).unwrap(), vec![date("2025-03-10")]);
    }

    #[test]
    fn daily_crosses_month_and_leap_day() {
        let schedule = Schedule::Daily { start: date("2024-02-28"), end: Some(date("2024-03-01")) };
        assert_eq!(
            schedule.expand(SPAN).unwrap(),
            dates(&["2024-02-28", "2024-02-29", "2024-03-01"])
        );
    }

    #[test]
    fn weekly_picks_selected_weekdays() {
        let schedule = Schedule::Weekly {
            start: date("2025-01-01"),
            end: date("2025-01-14"),
            weekdays: vec![Weekday::Mon, Weekday::Wed],
        };
        assert_eq!(
            schedule.expand(SPAN).unwrap(),
            dates(&["2025-01-01", "2025-01-06", "2025-01-08", "2025-01-13"])
        );
    }

    #[test]
    fn weekly_without_weekdays_is_rejected() {
        let schedule = Schedule::Weekly {
            start: date("2025-01-01"),
            end: date("2025-01-14"),
            weekdays: vec![],
        };
        assert_eq!(schedule.expand(SPAN), Err(ScheduleError::EmptyWeekdays));
    }

    #[test]
    fn weekly_with_no_matching_day_produces_nothing() {
        // Wed..Fri never contains a Sunday
        let schedule = Schedule::Weekly {
            start: date("2025-01-01"),
            end: date("2025-01-03"),
            weekdays: vec![Weekday::Sun],
        };
        assert_eq!(schedule.expand(SPAN), Err(ScheduleError::NoValidDates));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let schedule = Schedule::Daily { start: date("2025-01-05"), end: Some(date("2025-01-01")) };
        assert!(matches!(schedule.expand(SPAN), Err(ScheduleError::EndBeforeStart { .. })));
    }

    #[test]
    fn span_limit_is_enforced() {
        let schedule = Schedule::Daily { start: date("2025-01-01"), end: Some(date("2025-01-31")) };
        assert_eq!(schedule.expand(31).unwrap().len(), 31);
        assert_eq!(
            schedule.expand(30),
            Err(ScheduleError::SpanTooLong { days: 31, max: 30 })
        );
    }

    #[test]
    fn once_yields_its_date() {
        let schedule = Schedule::Once { date: date("2025-08-05") };
        assert_eq!(schedule.expand(SPAN).unwrap(), vec![date("2025-08-05")]);
    }

    #[test]
    fn explicit_dates_are_sorted_and_deduplicated() {
        let schedule = Schedule::ExplicitDates {
            dates: dates(&["2025-02-10", "2025-01-03", "2025-02-10", "2025-01-01"]),
        };
        assert_eq!(
            schedule.expand(SPAN).unwrap(),
            dates(&["2025-01-01", "2025-01-03", "2025-02-10"])
        );
    }

    #[test]
    fn empty_explicit_dates_produce_nothing() {
        let schedule = Schedule::ExplicitDates { dates: vec![] };
        let err = schedule.expand(SPAN).unwrap_err();
        assert_eq!(err, ScheduleError::NoValidDates);
        assert_eq!(err.to_string(), "no valid dates produced");
    }

    #[test]
    fn schedules_parse_from_tagged_json() {
        let weekly: Schedule = serde_json::from_str(
            r#"{"frequency":"weekly","start":"2025-01-01","end":"2025-01-14","weekdays":["mon","wed"]}"#
        ).unwrap();
        assert_eq!(weekly, Schedule::Weekly {
            start: date("2025-01-01"),
            end: date("2025-01-14"),
            weekdays: vec![Weekday::Mon, Weekday::Wed],
        });

        let daily: Schedule = serde_json::from_str(
            r#"{"frequency":"daily","start":"2025-01-01"}"#
        ).unwrap();
        assert_eq!(daily, Schedule::Daily { start: date("2025-01-01"), end: None });

        let explicit: Schedule = serde_json::from_str(
            r#"{"frequency":"explicit_dates","dates":["2025-01-02"]}"#
        ).unwrap();
        assert_eq!(explicit, Schedule::ExplicitDates { dates: vec![date("2025-01-02")] });
    }

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (0u64..3_650).prop_map(|offset| date("2020-01-01") + Days::new(offset))
    }

    fn any_weekdays() -> impl Strategy<Value = Vec<Weekday>> {
        proptest::sample::subsequence(WEEK.to_vec(), 1..=7)
    }

    proptest! {
        #[test]
        fn prop_daily_equal_bounds_yield_one_date(start in any_date()) {
            let schedule = Schedule::Daily { start, end: Some(start) };
            prop_assert_eq!(schedule.expand(SPAN), Ok(vec![start]));
        }

        #[test]
        fn prop_daily_covers_every_day(start in any_date(), days in 1u64..=SPAN as u64) {
            let end = start + Days::new(days - 1);
            let result = Schedule::Daily { start, end: Some(end) }.expand(SPAN).unwrap();

            prop_assert_eq!(result.len() as u64, days);
            prop_assert_eq!(result.first(), Some(&start));
            prop_assert_eq!(result.last(), Some(&end));
            prop_assert!(result.windows(2).all(|pair| pair[0] < pair[1]));
        }

        #[test]
        fn prop_weekly_stays_inside_bounds_and_weekdays(
            start in any_date(),
            days in 1u64..=SPAN as u64,
            weekdays in any_weekdays(),
        ) {
            let end = start + Days::new(days - 1);
            let schedule = Schedule::Weekly { start, end, weekdays: weekdays.clone() };

            match schedule.expand(SPAN) {
                Ok(result) => {
                    for day in &result {
                        prop_assert!(*day >= start && *day <= end);
                        prop_assert!(weekdays.contains(&Weekday::from(day.weekday())));
                    }
                    prop_assert!(result.windows(2).all(|pair| pair[0] < pair[1]));
                    // every full week contributes each selected weekday once
                    prop_assert!(result.len() as u64 >= days / 7 * weekdays.len() as u64);
                },
                Err(err) => {
                    prop_assert_eq!(err, ScheduleError::NoValidDates);
                    prop_assert!(days < 7);
                },
            }
        }

        #[test]
        fn prop_expansion_is_repeatable(
            start in any_date(),
            days in 1u64..=SPAN as u64,
            weekdays in any_weekdays(),
        ) {
            let schedule = Schedule::Weekly { start, end: start + Days::new(days - 1), weekdays };
            prop_assert_eq!(schedule.expand(SPAN), schedule.expand(SPAN));
        }
    }
}
