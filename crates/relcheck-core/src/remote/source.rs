//! Where remote records come from.

use std::time::Duration;

use url::Url;

use super::record::RemoteRecord;
use crate::config::RemoteConfig;
use crate::control::{CancelToken, Cancelled};

/// Body text the API returns for releases it does not know.
const NOT_FOUND_MARKER: &[u8] = b"The SRR file does not exist.";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid record api url {url}")]
    BadUrl { url: String },

    #[error("request {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: curl::Error,
    },

    #[error("{url} returned HTTP {code}")]
    Status { url: String, code: u32 },

    #[error("{url} does not exist")]
    NotFound { url: String },

    #[error("decode {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/// Lookup of the record for one release name.
pub trait RecordSource {
    fn fetch(&self, release: &str, cancel: &CancelToken) -> Result<RemoteRecord, FetchError>;
}

/// srrDB-style JSON API client (libcurl). `GET <api_url>/details/<release>`.
///
/// Blocking; call from `spawn_blocking` when used from async code.
#[derive(Debug, Clone)]
pub struct SrrDb {
    api_url: Url,
    timeout: Duration,
    connect_timeout: Duration,
}

impl SrrDb {
    pub fn new(config: &RemoteConfig) -> Result<Self, FetchError> {
        let api_url = Url::parse(&config.api_url).map_err(|_| FetchError::BadUrl {
            url: config.api_url.clone(),
        })?;
        if api_url.cannot_be_a_base() {
            return Err(FetchError::BadUrl {
                url: config.api_url.clone(),
            });
        }
        Ok(Self {
            api_url,
            timeout: config.timeout(),
            connect_timeout: config.connect_timeout(),
        })
    }

    /// Details URL for `release`; the name is escaped as one path segment.
    pub fn details_url(&self, release: &str) -> Result<Url, FetchError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::BadUrl {
                url: self.api_url.to_string(),
            })?
            .pop_if_empty()
            .push("details")
            .push(release);
        Ok(url)
    }

    /// Transfer timeout for one request, and whether it is the token's
    /// deadline rather than the configured timeout that bounds it.
    fn request_timeout(&self, cancel: &CancelToken) -> (Duration, bool) {
        match cancel.remaining() {
            Some(left) if left < self.timeout => (left.max(Duration::from_millis(1)), true),
            _ => (self.timeout, false),
        }
    }

    /// GET with the transfer aborted as soon as `cancel` fires.
    fn get(
        &self,
        url: &Url,
        cancel: &CancelToken,
        timeout: Duration,
    ) -> Result<(u32, Vec<u8>), curl::Error> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.useragent(concat!("relcheck/", env!("CARGO_PKG_VERSION")))?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(timeout)?;
        easy.progress(true)?;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
            transfer.perform()?;
        }
        let code = easy.response_code()?;
        Ok((code, body))
    }
}

impl RecordSource for SrrDb {
    fn fetch(&self, release: &str, cancel: &CancelToken) -> Result<RemoteRecord, FetchError> {
        cancel.check()?;
        let url = self.details_url(release)?;
        tracing::debug!(%url, "fetching record");

        let (timeout, deadline_bound) = self.request_timeout(cancel);
        let (code, body) = self
            .get(&url, cancel, timeout)
            .map_err(|source| transfer_error(&url, source, cancel.reason(), deadline_bound))?;

        if !(200..300).contains(&code) {
            return Err(FetchError::Status {
                url: url.to_string(),
                code,
            });
        }
        if is_not_found(&body) {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            });
        }
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Maps a failed transfer. An abort from the progress callback, or a timeout
/// while the token's deadline bounded the request, is cancellation. curl may
/// time out a moment before the deadline is observable on the token.
fn transfer_error(
    url: &Url,
    source: curl::Error,
    reason: Option<Cancelled>,
    deadline_bound: bool,
) -> FetchError {
    let stopped = source.is_aborted_by_callback() || source.is_operation_timedout();
    match reason {
        Some(reason) if stopped => FetchError::Cancelled(reason),
        None if deadline_bound && source.is_operation_timedout() => {
            FetchError::Cancelled(Cancelled::DeadlineExceeded)
        }
        _ => FetchError::Http {
            url: url.to_string(),
            source,
        },
    }
}

fn is_not_found(body: &[u8]) -> bool {
    let trimmed = body.trim_ascii();
    trimmed.is_empty()
        || trimmed == b"[]"
        || body
            .windows(NOT_FOUND_MARKER.len())
            .any(|w| w == NOT_FOUND_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> SrrDb {
        SrrDb::new(&RemoteConfig {
            api_url: api_url.to_string(),
            ..RemoteConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn details_url_escapes_release_name() {
        let db = client("https://api.srrdb.com/v1");
        assert_eq!(
            db.details_url("Some.Release-GRP").unwrap().as_str(),
            "https://api.srrdb.com/v1/details/Some.Release-GRP"
        );
        let db = client("http://127.0.0.1:8080/v1/");
        assert_eq!(
            db.details_url("a b/c?d").unwrap().as_str(),
            "http://127.0.0.1:8080/v1/details/a%20b%2Fc%3Fd"
        );
    }

    #[test]
    fn bad_api_url_is_rejected() {
        let cfg = RemoteConfig {
            api_url: "not a url".into(),
            ..RemoteConfig::default()
        };
        assert!(matches!(SrrDb::new(&cfg), Err(FetchError::BadUrl { .. })));
        let cfg = RemoteConfig {
            api_url: "mailto:someone@example.com".into(),
            ..RemoteConfig::default()
        };
        assert!(matches!(SrrDb::new(&cfg), Err(FetchError::BadUrl { .. })));
    }

    #[test]
    fn not_found_bodies() {
        assert!(is_not_found(b""));
        assert!(is_not_found(b"[]"));
        assert!(is_not_found(b" []\n"));
        assert!(is_not_found(b"<html>The SRR file does not exist.</html>"));
        assert!(!is_not_found(br#"{"name":"x"}"#));
    }

    const CURLE_OPERATION_TIMEDOUT: i32 = 28;
    const CURLE_COULDNT_CONNECT: i32 = 7;

    #[test]
    fn timeout_under_deadline_is_cancellation() {
        let url = Url::parse("http://127.0.0.1/v1/details/x").unwrap();
        let timed_out = || curl::Error::new(CURLE_OPERATION_TIMEDOUT as _);

        let err = transfer_error(&url, timed_out(), None, true);
        assert!(matches!(err, FetchError::Cancelled(Cancelled::DeadlineExceeded)));

        let err = transfer_error(&url, timed_out(), Some(Cancelled::DeadlineExceeded), true);
        assert!(matches!(err, FetchError::Cancelled(Cancelled::DeadlineExceeded)));

        // The configured timeout, not the deadline, bounded this one.
        let err = transfer_error(&url, timed_out(), None, false);
        assert!(matches!(err, FetchError::Http { .. }));

        let err = transfer_error(&url, curl::Error::new(CURLE_COULDNT_CONNECT as _), None, true);
        assert!(matches!(err, FetchError::Http { .. }));
    }

    #[test]
    fn deadline_shorter_than_timeout_bounds_request() {
        let db = client("http://127.0.0.1:9/v1");
        let (timeout, bound) = db.request_timeout(&CancelToken::new());
        assert_eq!(timeout, RemoteConfig::default().timeout());
        assert!(!bound);

        let (timeout, bound) =
            db.request_timeout(&CancelToken::with_timeout(Duration::from_millis(200)));
        assert!(timeout <= Duration::from_millis(200));
        assert!(bound);
    }

    #[test]
    fn cancelled_token_skips_request() {
        let db = client("http://127.0.0.1:9/v1");
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = db.fetch("x", &cancel).unwrap_err();
        assert!(matches!(err, FetchError::Cancelled(Cancelled::Canceled)));
    }
}
