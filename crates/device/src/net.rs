use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::DATE;
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::{ClockOffset, NetworkError, NetworkSync};

const USER_AGENT: &str = "keypad-macros/0.1 (clock sync)";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Syncs the clock from the `Date` header of an HTTP endpoint.
///
/// Must be driven from a blocking thread: requests run on the given runtime
/// via `Handle::block_on`.
pub struct HttpClockSync {
    url: Option<String>,
    offset: ClockOffset,
    handle: Handle,
    request_timeout: Duration,
    connect_timeout: Duration,
    client: Option<reqwest::Client>,
}

impl HttpClockSync {
    pub fn new(url: Option<String>, offset: ClockOffset, handle: Handle) -> Self {
        Self {
            url,
            offset,
            handle,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            client: None,
        }
    }

    /// Bounds every request so a stalled server cannot hold up boot.
    pub fn with_timeouts(mut self, request: Duration, connect: Duration) -> Self {
        self.request_timeout = request;
        self.connect_timeout = connect;
        self
    }

    fn url(&self) -> Result<&str, NetworkError> {
        self.url.as_deref().ok_or(NetworkError::NotConfigured)
    }

    fn build_client(&self) -> Result<reqwest::Client, NetworkError> {
        Ok(reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .build()?)
    }
}

impl NetworkSync for HttpClockSync {
    fn connect(&mut self) -> Result<(), NetworkError> {
        let url = self.url()?.to_string();
        let client = self.build_client()?;

        self.handle.block_on(async {
            client.head(&url).send().await?.error_for_status()?;
            Ok::<_, reqwest::Error>(())
        })?;

        info!(%url, "network reachable");
        self.client = Some(client);
        Ok(())
    }

    fn sync_clock(&mut self) -> Result<(), NetworkError> {
        let url = self.url()?.to_string();
        let client = match &self.client {
            Some(client) => client.clone(),
            None => self.build_client()?,
        };

        let header = self.handle.block_on(async {
            let resp = client.get(&url).send().await?.error_for_status()?;
            Ok::<_, reqwest::Error>(
                resp.headers()
                    .get(DATE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string),
            )
        })?;

        let header = header.ok_or(NetworkError::MissingDate)?;
        let remote = parse_http_date(&header)?;
        let delta = remote.signed_duration_since(Utc::now()).num_milliseconds();
        self.offset.set_millis(delta);
        debug!(%header, delta_ms = delta, "clock synced");
        Ok(())
    }
}

/// Parses an IMF-fixdate such as `Tue, 15 Nov 1994 08:12:31 GMT`.
pub(crate) fn parse_http_date(value: &str) -> Result<DateTime<Utc>, NetworkError> {
    DateTime::parse_from_rfc2822(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| NetworkError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_http_dates() {
        let t = parse_http_date("Tue, 15 Nov 1994 08:12:31 GMT").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(1994, 11, 15, 8, 12, 31).unwrap());
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(matches!(
            parse_http_date("yesterday"),
            Err(NetworkError::InvalidDate(_))
        ));
    }

    #[test]
    fn unconfigured_sync_fails_without_network() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let mut sync = HttpClockSync::new(None, ClockOffset::new(), rt.handle().clone());
        assert!(matches!(sync.connect(), Err(NetworkError::NotConfigured)));
        assert!(matches!(sync.sync_clock(), Err(NetworkError::NotConfigured)));
    }

    #[test]
    fn silent_server_times_out() {
        // Accepted by the OS backlog, never answered.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());

        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let mut sync = HttpClockSync::new(Some(url), ClockOffset::new(), rt.handle().clone())
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));

        let started = std::time::Instant::now();
        assert!(matches!(sync.connect(), Err(NetworkError::Request(_))));
        assert!(matches!(sync.sync_clock(), Err(NetworkError::Request(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(listener);
    }
}
