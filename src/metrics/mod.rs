//! 지표 엔진 - 페치 타이밍, 구조 정보, 본문으로 감사 지표 계산
//!
//! 순수 함수만 있습니다 (I/O 없음). 입력이 없으면 0/false로 떨어지고 실패하지 않습니다.

use serde::{Deserialize, Serialize};

use crate::fetcher::FetchResult;
use crate::parser::PageDocument;

/// 응답 시간 양호 기준 (초, 미만)
pub const RESPONSE_TIME_GOOD_BELOW: f64 = 1.2;
/// 제목 길이 양호 하한 (초과)
pub const TITLE_LENGTH_GOOD_ABOVE: usize = 30;
/// 제목 길이 양호 상한 (미만)
pub const TITLE_LENGTH_GOOD_BELOW: usize = 65;
/// 단어 수 양호 기준 (초과)
pub const WORD_COUNT_GOOD_ABOVE: usize = 300;

/// 페이지 지표
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title_length: usize,
    pub description_length: usize,
    pub word_count: usize,
    pub response_time_seconds: f64,
    pub is_https: bool,
}

/// 지표 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Good,
    Bad,
    /// 참고용 (판정 없음)
    Info,
}

impl Verdict {
    fn from_bool(good: bool) -> Self {
        if good {
            Verdict::Good
        } else {
            Verdict::Bad
        }
    }
}

/// 지표별 판정 묶음
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub https: Verdict,
    pub response_time: Verdict,
    pub title: Verdict,
    pub description: Verdict,
    pub word_count: Verdict,
}

impl PageMetadata {
    /// 임계값 기준 판정
    pub fn assess(&self) -> Assessment {
        Assessment {
            https: Verdict::from_bool(self.is_https),
            response_time: Verdict::from_bool(
                self.response_time_seconds < RESPONSE_TIME_GOOD_BELOW,
            ),
            title: Verdict::from_bool(
                self.title_length > TITLE_LENGTH_GOOD_ABOVE
                    && self.title_length < TITLE_LENGTH_GOOD_BELOW,
            ),
            description: Verdict::Info,
            word_count: Verdict::from_bool(self.word_count > WORD_COUNT_GOOD_ABOVE),
        }
    }
}

/// 지표 계산
pub fn compute(fetch: &FetchResult, doc: &PageDocument, content: &str) -> PageMetadata {
    PageMetadata {
        title_length: doc.title().map_or(0, |t| t.chars().count()),
        description_length: doc.meta_description().map_or(0, |d| d.chars().count()),
        word_count: word_count(content),
        response_time_seconds: fetch.elapsed_seconds.max(0.0),
        is_https: fetch.transport_is_secure,
    }
}

/// 공백 기준 토큰 수
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}
