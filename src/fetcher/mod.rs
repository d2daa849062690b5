//! 페처 모듈 - 대상 URL 단일 요청
//!
//! 봇 식별 User-Agent와 하드 타임아웃으로 GET 한 번만 보냅니다.
//! 재시도 없음: 실패는 해당 리포트 요청에 대해 최종입니다.
//!
//! 리다이렉트는 reqwest 기본 정책으로 따라가지만, HTTPS 여부는
//! 리다이렉트 후 URL이 아니라 *요청한* URL의 스킴으로 판단합니다.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::config::AppConfig;

// ============================================================================
// Types
// ============================================================================

/// 페치 결과 (생성 후 불변)
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// 응답 본문 원본
    pub raw_bytes: Vec<u8>,
    /// 전송 시작부터 본문 수신 완료까지 (초, 소수점 2자리)
    pub elapsed_seconds: f64,
    /// 요청한 URL
    pub requested_url: String,
    /// 리다이렉트 후 최종 URL
    pub final_url: String,
    /// HTTP 상태 코드
    pub status: u16,
    /// Content-Type 헤더 (charset 판단용)
    pub content_type: Option<String>,
    /// 요청한 URL이 https 스킴인지
    pub transport_is_secure: bool,
}

/// 페치 에러
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("site unreachable: {0}")]
    Unreachable(String),
}

// ============================================================================
// PageFetcher Trait
// ============================================================================

/// 페이지 페처 트레이트
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// URL 한 번 요청
    async fn fetch(&self, url: &str) -> std::result::Result<FetchResult, FetchError>;
}

// ============================================================================
// HttpFetcher
// ============================================================================

/// reqwest 기반 페처
///
/// `reqwest::Client`는 내부적으로 커넥션 풀을 관리하므로
/// 동시 리포트 요청 간에 별도 잠금 없이 공유됩니다.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// 설정으로 페처 생성
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .context("HTTP 클라이언트 생성 실패")?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Unreachable(describe(&err))
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<FetchResult, FetchError> {
        let target = parse_target(url)?;
        let transport_is_secure = target.scheme() == "https";

        tracing::info!("Fetching: {}", target);
        let start = Instant::now();

        let response = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let elapsed_seconds = round_seconds(start.elapsed());

        if !status.is_success() {
            tracing::warn!("{} answered {}", target, status);
        }
        tracing::info!(
            "Fetched {} ({} bytes, {:.2}s, status {})",
            final_url,
            body.len(),
            elapsed_seconds,
            status.as_u16()
        );

        Ok(FetchResult {
            raw_bytes: body.to_vec(),
            elapsed_seconds,
            requested_url: url.to_string(),
            final_url,
            status: status.as_u16(),
            content_type,
            transport_is_secure,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// 절대 http(s) URL만 허용
pub fn parse_target(url: &str) -> std::result::Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url.trim()).map_err(|e| invalid(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}

/// 요청 URL이 암호화 스킴인지 (도달 가능성과 무관)
pub fn is_secure_url(url: &str) -> bool {
    parse_target(url).is_ok_and(|u| u.scheme() == "https")
}

/// 초 단위, 소수점 2자리 반올림
pub fn round_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

/// 에러 체인을 한 줄로
fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn fetcher_with_timeout(timeout: Duration) -> HttpFetcher {
        let config = AppConfig::default().with_timeout(timeout);
        HttpFetcher::new(&config).expect("fetcher creation failed")
    }

    #[test]
    fn test_fetcher_creation() {
        let fetcher = HttpFetcher::new(&AppConfig::default());
        assert!(fetcher.is_ok());
        assert_eq!(fetcher.unwrap().timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_is_secure_url() {
        assert!(is_secure_url("https://unreachable.invalid/page"));
        assert!(!is_secure_url("http://unreachable.invalid/page"));
        assert!(!is_secure_url("not a url"));
    }

    #[test]
    fn test_round_seconds() {
        assert_eq!(round_seconds(Duration::from_millis(1234)), 1.23);
        assert_eq!(round_seconds(Duration::from_millis(1239)), 1.24);
        assert_eq!(round_seconds(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_parse_target_rejects_relative_and_other_schemes() {
        assert!(matches!(
            parse_target("/relative/path"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_target("ftp://example.com/file"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(parse_target("https://example.com").is_ok());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let url = test_support::serve_html(200, "<html><title>Hi</title></html>").await;
        let fetcher = fetcher_with_timeout(Duration::from_secs(5));

        let result = fetcher.fetch(&url).await.expect("fetch failed");
        assert_eq!(result.raw_bytes, b"<html><title>Hi</title></html>");
        assert_eq!(result.status, 200);
        assert_eq!(
            result.content_type.as_deref(),
            Some("text/html; charset=utf-8")
        );
        assert!(!result.transport_is_secure);
        assert!(result.elapsed_seconds >= 0.0);
        assert_eq!(result.requested_url, url);
    }

    #[tokio::test]
    async fn test_fetch_keeps_error_status_body() {
        let url = test_support::serve_html(404, "<h1>Not here</h1>").await;
        let fetcher = fetcher_with_timeout(Duration::from_secs(5));

        let result = fetcher.fetch(&url).await.expect("fetch failed");
        assert_eq!(result.status, 404);
        assert_eq!(result.raw_bytes, b"<h1>Not here</h1>");
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let url = test_support::serve_silent().await;
        let fetcher = fetcher_with_timeout(Duration::from_millis(300));

        let started = Instant::now();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let url = test_support::refused_url().await;
        let fetcher = fetcher_with_timeout(Duration::from_secs(5));

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Unreachable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_makes_no_request() {
        let fetcher = fetcher_with_timeout(Duration::from_secs(5));
        let err = fetcher.fetch("www.example.com").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
