//! seo-audit - 단일 페이지 SEO 플래시 감사
//!
//! 페이지 하나를 가져와 제목, 메타 디스크립션, Hn 구조, 본문,
//! 응답 시간, HTTPS 여부를 추출하고 점수화된 리포트와 CSV로 제공합니다.
//!
//! 파이프라인: fetcher → parser → extractor → metrics → report (→ export)

pub mod cli;
pub mod config;
pub mod export;
pub mod extractor;
pub mod fetcher;
pub mod metrics;
pub mod parser;
pub mod report;
pub mod server;

#[cfg(test)]
mod test_support;

// Re-exports
pub use config::AppConfig;
pub use export::{encode_csv, ExportError, RawHeadingRecord};
pub use extractor::{ContentExtractor, ExtractorConfig, ReadabilityExtractor};
pub use fetcher::{FetchError, FetchResult, HttpFetcher, PageFetcher};
pub use metrics::{compute, Assessment, PageMetadata, Verdict};
pub use parser::{HeadingLevel, PageDocument, ParsedHeading};
pub use report::{HeadingRecord, Report, ReportError, ReportService};
