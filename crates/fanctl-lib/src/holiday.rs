//! Weekend and public-holiday policy
//!
//! The weekend check uses the local calendar only. Public holidays come from
//! a remote lookup keyed by date; when that lookup fails for any reason a
//! fixed table of national holidays is consulted instead. Resolution never
//! fails.

use chrono::{Datelike, NaiveDate, Weekday};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::error::{FanError, Result};

/// Fixed national holidays as `(month, day)`, used when the lookup fails
pub const FALLBACK_HOLIDAYS: &[(u32, u32)] = &[
    (1, 1),
    (1, 2),
    (1, 3),
    (4, 4),
    (4, 5),
    (5, 1),
    (5, 2),
    (5, 3),
    (10, 1),
    (10, 2),
    (10, 3),
    (10, 4),
    (10, 5),
];

/// Classification of a calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    Workday,
    Weekend,
    Holiday,
}

/// Where the day classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Remote,
    Fallback,
}

/// Outcome of the day-off policy for one date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayDecision {
    pub date: NaiveDate,
    /// Saturday or Sunday on the local calendar
    pub weekend: bool,
    pub day_kind: DayKind,
    pub source: DecisionSource,
}

impl HolidayDecision {
    /// BMCs are handed back to auto mode on days off
    pub fn is_day_off(&self) -> bool {
        self.weekend || self.day_kind != DayKind::Workday
    }
}

/// `{ "status": 0|1, "type": 0|1|2 }`
#[derive(Debug, Deserialize)]
struct HolidayApiResponse {
    #[serde(default)]
    status: Option<i64>,
    #[serde(rename = "type", default)]
    day_type: Option<i64>,
}

impl HolidayApiResponse {
    fn day_kind(&self) -> DayKind {
        match (self.status, self.day_type) {
            (Some(1), Some(2)) => DayKind::Holiday,
            (Some(1), Some(1)) => DayKind::Weekend,
            _ => DayKind::Workday,
        }
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_fixed_holiday(date: NaiveDate) -> bool {
    FALLBACK_HOLIDAYS.contains(&(date.month(), date.day()))
}

/// Resolves whether a date is a day off
pub struct HolidayResolver {
    client: Client,
    api_url: String,
}

impl HolidayResolver {
    /// Create a resolver querying `api_url` with a short request timeout
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    /// Classify `date`, degrading to the fixed table on lookup failure
    pub async fn resolve(&self, date: NaiveDate) -> HolidayDecision {
        let weekend = is_weekend(date);

        match self.lookup(date).await {
            Ok(day_kind) => {
                info!(%date, ?day_kind, "Holiday lookup answered");
                HolidayDecision {
                    date,
                    weekend,
                    day_kind,
                    source: DecisionSource::Remote,
                }
            }
            Err(e) => {
                warn!(%date, error = %e, "Holiday lookup failed, using built-in holiday table");
                let day_kind = if is_fixed_holiday(date) {
                    info!(%date, "Built-in holiday table: public holiday");
                    DayKind::Holiday
                } else {
                    info!(%date, "Built-in holiday table: not a holiday");
                    DayKind::Workday
                };
                HolidayDecision {
                    date,
                    weekend,
                    day_kind,
                    source: DecisionSource::Fallback,
                }
            }
        }
    }

    async fn lookup(&self, date: NaiveDate) -> Result<DayKind> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| FanError::Config(format!("invalid holiday API URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("d", &date.format("%Y%m%d").to_string())
            .append_pair("info", "1");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FanError::Request { status, body });
        }

        let body: HolidayApiResponse = response
            .json()
            .await
            .map_err(|e| FanError::Protocol(format!("unreadable holiday response: {}", e)))?;

        Ok(body.day_kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn resolver(url: String) -> HolidayResolver {
        HolidayResolver::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_weekend_detection() {
        // 2026-10-17 is a Saturday
        assert!(is_weekend(date(2026, 10, 17)));
        assert!(is_weekend(date(2026, 10, 18)));
        assert!(!is_weekend(date(2026, 10, 16)));
    }

    #[test]
    fn test_fixed_holiday_table() {
        assert!(is_fixed_holiday(date(2030, 10, 3)));
        assert!(is_fixed_holiday(date(2026, 5, 2)));
        assert!(!is_fixed_holiday(date(2026, 10, 6)));
        assert!(!is_fixed_holiday(date(2026, 12, 25)));
    }

    #[test]
    fn test_api_response_interpretation() {
        let parse = |s: &str| serde_json::from_str::<HolidayApiResponse>(s).unwrap().day_kind();
        assert_eq!(parse(r#"{"status":1,"type":2}"#), DayKind::Holiday);
        assert_eq!(parse(r#"{"status":1,"type":1}"#), DayKind::Weekend);
        assert_eq!(parse(r#"{"status":1,"type":0}"#), DayKind::Workday);
        assert_eq!(parse(r#"{"status":0,"type":2}"#), DayKind::Workday);
        assert_eq!(parse(r#"{}"#), DayKind::Workday);
    }

    #[tokio::test]
    async fn test_remote_holiday() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/jiari/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("d".into(), "20261001".into()),
                Matcher::UrlEncoded("info".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":1,"type":2}"#)
            .create_async()
            .await;

        let decision = resolver(format!("{}/jiari/", server.url()))
            .resolve(date(2026, 10, 1))
            .await;

        mock.assert_async().await;
        assert_eq!(decision.day_kind, DayKind::Holiday);
        assert_eq!(decision.source, DecisionSource::Remote);
        assert!(decision.is_day_off());
    }

    #[tokio::test]
    async fn test_remote_workday_overrides_table() {
        let mut server = mockito::Server::new_async().await;
        let _lookup = server
            .mock("GET", "/jiari/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":1,"type":0}"#)
            .create_async()
            .await;

        // Listed in the fixed table, but the lookup says otherwise
        let decision = resolver(format!("{}/jiari/", server.url()))
            .resolve(date(2026, 10, 5))
            .await;

        assert_eq!(decision.source, DecisionSource::Remote);
        assert!(!decision.is_day_off());
    }

    #[tokio::test]
    async fn test_server_error_falls_back_to_table() {
        let mut server = mockito::Server::new_async().await;
        let _lookup = server
            .mock("GET", "/jiari/")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let decision = resolver(format!("{}/jiari/", server.url()))
            .resolve(date(2026, 10, 2))
            .await;

        assert_eq!(decision.source, DecisionSource::Fallback);
        assert_eq!(decision.day_kind, DayKind::Holiday);
        assert!(decision.is_day_off());
    }

    #[tokio::test]
    async fn test_garbage_body_falls_back_to_table() {
        let mut server = mockito::Server::new_async().await;
        let _lookup = server
            .mock("GET", "/jiari/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let decision = resolver(format!("{}/jiari/", server.url()))
            .resolve(date(2026, 10, 14))
            .await;

        assert_eq!(decision.source, DecisionSource::Fallback);
        assert!(!decision.is_day_off());
    }

    #[tokio::test]
    async fn test_weekend_is_day_off_regardless_of_lookup() {
        let mut server = mockito::Server::new_async().await;
        let _lookup = server
            .mock("GET", "/jiari/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":1,"type":0}"#)
            .create_async()
            .await;

        let saturday = date(2026, 10, 17);
        let remote = resolver(format!("{}/jiari/", server.url()))
            .resolve(saturday)
            .await;
        assert!(remote.is_day_off());

        let unreachable = resolver("not a url".to_string()).resolve(saturday).await;
        assert_eq!(unreachable.source, DecisionSource::Fallback);
        assert!(unreachable.is_day_off());
    }
}
