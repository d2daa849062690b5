//! 리포트 서비스 - URL 하나에 대한 감사 파이프라인
//!
//! fetch → decode → parse → extract → compute → 헤딩 레코드 조립 순으로
//! 엄격히 순차 실행합니다. 부분 리포트는 없습니다: 전체 Report 또는 에러.
//!
//! 각 `build_report` 호출은 독립적입니다 (공유 캐시 없음).

use std::borrow::Cow;
use std::sync::Arc;

use anyhow::Result;
use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::extractor::{ContentExtractor, ReadabilityExtractor};
use crate::fetcher::{FetchError, FetchResult, HttpFetcher, PageFetcher};
use crate::metrics::{self, PageMetadata};
use crate::parser::{HeadingLevel, PageDocument};

// ============================================================================
// Types
// ============================================================================

/// 헤딩 레코드 (화면과 CSV 내보내기가 같은 레코드를 사용)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRecord {
    pub source_url: String,
    pub level: HeadingLevel,
    pub text: String,
    /// 레벨 내 1부터 시작하는 위치
    pub position: usize,
}

/// 감사 리포트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: PageMetadata,
    pub headings: Vec<HeadingRecord>,
    pub content: String,
}

/// 리포트 에러
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("fetch failed: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("response body is not valid {0} text")]
    DecodeFailed(&'static str),

    #[error("internal error: {0}")]
    Internal(String),
}

// ============================================================================
// ReportService
// ============================================================================

/// 리포트 서비스
pub struct ReportService<F = HttpFetcher> {
    fetcher: F,
    extractor: Arc<dyn ContentExtractor>,
}

impl ReportService<HttpFetcher> {
    /// 설정으로 기본 서비스 생성 (reqwest 페처 + readability 추출기)
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config)?;
        let extractor = ReadabilityExtractor::new()?;
        Ok(Self::new(fetcher, Arc::new(extractor)))
    }
}

impl<F: PageFetcher> ReportService<F> {
    pub fn new(fetcher: F, extractor: Arc<dyn ContentExtractor>) -> Self {
        Self { fetcher, extractor }
    }

    /// URL 하나에 대한 리포트 생성
    pub async fn build_report(&self, url: &str) -> std::result::Result<Report, ReportError> {
        let fetched = self.fetcher.fetch(url).await.map_err(|e| {
            tracing::warn!("Fetch failed for {}: {}", url, e);
            ReportError::FetchFailed(e)
        })?;

        // scraper 문서는 Send가 아니므로 파싱/추출은 블로킹 스레드에서 끝냄
        let extractor = Arc::clone(&self.extractor);
        let source_url = url.to_string();
        let report = tokio::task::spawn_blocking(move || {
            analyze(&fetched, extractor.as_ref(), &source_url)
        })
        .await
        .map_err(|e| ReportError::Internal(format!("analysis task failed: {e}")))??;

        tracing::info!(
            "Report ready for {}: {} headings, {} words",
            url,
            report.headings.len(),
            report.metadata.word_count
        );
        Ok(report)
    }
}

/// 페치 결과 분석 (동기)
pub fn analyze(
    fetched: &FetchResult,
    extractor: &dyn ContentExtractor,
    source_url: &str,
) -> std::result::Result<Report, ReportError> {
    let markup = decode_body(&fetched.raw_bytes, fetched.content_type.as_deref())?;

    let doc = PageDocument::parse(&markup);
    let content = extractor.extract_main_text(&markup);
    let metadata = metrics::compute(fetched, &doc, &content);

    let headings = doc
        .headings()
        .into_iter()
        .map(|heading| HeadingRecord {
            source_url: source_url.to_string(),
            level: heading.level,
            text: heading.text,
            position: heading.position,
        })
        .collect();

    Ok(Report {
        metadata,
        headings,
        content,
    })
}

/// 본문 디코딩
///
/// 인코딩 결정 순서: BOM → Content-Type charset → `<meta charset>` → UTF-8.
/// 결정된 인코딩으로 해석할 수 없는 바이트가 있으면 `DecodeFailed`입니다.
fn decode_body<'a>(
    bytes: &'a [u8],
    content_type: Option<&str>,
) -> std::result::Result<Cow<'a, str>, ReportError> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => {
            let declared = content_type
                .and_then(header_charset)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
                .or_else(|| meta_charset(bytes));
            (declared.unwrap_or(UTF_8), bytes)
        }
    };

    if encoding != UTF_8 {
        tracing::debug!("Decoding body as {}", encoding.name());
    }
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or(ReportError::DecodeFailed(encoding.name()))
}

/// `text/html; charset=ISO-8859-1` → `ISO-8859-1`
fn header_charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c: char| c == '"' || c == '\''))
    })
}

const META_CHARSET: &str = r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#;

/// 문서 앞부분 1024바이트의 `<meta charset>` / `http-equiv` 선언
fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let pattern = regex::bytes::Regex::new(META_CHARSET).ok()?;
    let head = &bytes[..bytes.len().min(1024)];
    let label = pattern.captures(head)?.get(1)?;
    // 문서 안의 UTF-16 선언은 UTF-8로 취급
    Encoding::for_label(label.as_bytes()).map(Encoding::output_encoding)
}
