use crate::errors::FetchError;
use crate::filters::FilterState;
use crate::models::StatisticsSnapshot;
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub trait StatisticsSource: Send + Sync {
    fn fetch(
        &self,
        filters: &FilterState,
    ) -> impl Future<Output = Result<StatisticsSnapshot, FetchError>> + Send;
}

#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: statistics_endpoint(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub fn statistics_endpoint(base_url: &str) -> String {
    format!("{}/statistics/", base_url.trim_end_matches('/'))
}

impl StatisticsSource for HttpSource {
    async fn fetch(&self, filters: &FilterState) -> Result<StatisticsSnapshot, FetchError> {
        let query = filters.query_pairs();
        debug!(endpoint = %self.endpoint, ?query, "fetching statistics");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let payload: Value = response.json().await?;
        Ok(StatisticsSnapshot::try_from(payload)?)
    }
}

pub async fn fetch_with_retry<S: StatisticsSource>(
    source: &S,
    filters: &FilterState,
    attempts: u32,
    backoff: Duration,
) -> Result<StatisticsSnapshot, FetchError> {
    let mut attempt = 1;
    loop {
        match source.fetch(filters).await {
            Ok(snapshot) => return Ok(snapshot),
            Err(err) if attempt < attempts => {
                warn!(attempt, attempts, "statistics fetch failed, retrying: {err}");
                tokio::time::sleep(backoff * attempt).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
    }

    impl StatisticsSource for FlakySource {
        async fn fetch(&self, _filters: &FilterState) -> Result<StatisticsSnapshot, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(FetchError::Status(503))
            } else {
                Ok(StatisticsSnapshot::default())
            }
        }
    }

    fn flaky(failures: u32) -> FlakySource {
        FlakySource {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    #[tokio::test]
    async fn retry_recovers_within_attempts() {
        let source = flaky(2);
        let result =
            fetch_with_retry(&source, &FilterState::default(), 3, Duration::from_millis(1)).await;
        assert!(result.is_ok());
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_gives_up_with_last_error() {
        let source = flaky(u32::MAX);
        let result =
            fetch_with_retry(&source, &FilterState::default(), 3, Duration::from_millis(1)).await;
        assert!(matches!(result, Err(FetchError::Status(503))));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn endpoint_normalises_trailing_slash() {
        assert_eq!(
            statistics_endpoint("http://helpdesk.local/"),
            "http://helpdesk.local/statistics/"
        );
        assert_eq!(
            statistics_endpoint("http://helpdesk.local"),
            "http://helpdesk.local/statistics/"
        );
    }
}
