//! 구조 파서 모듈 - 제목, 메타 디스크립션, Hn 구조
//!
//! html5ever(scraper) 기반의 관대한 파서라 닫히지 않은 태그나
//! doctype 누락에도 실패하지 않고 최선의 트리를 만듭니다.

use std::fmt;
use std::str::FromStr;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

// ============================================================================
// Heading Level
// ============================================================================

/// 헤딩 레벨 (H1이 가장 중요)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    /// 문서 내 열거 순서
    pub const ALL: [HeadingLevel; 6] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
        HeadingLevel::H6,
    ];

    /// 소문자 태그 이름
    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
            HeadingLevel::H6 => "h6",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
            HeadingLevel::H4 => "H4",
            HeadingLevel::H5 => "H5",
            HeadingLevel::H6 => "H6",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeadingLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeadingLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown heading level '{s}'"))
    }
}

/// 파싱된 헤딩 (레벨 내 1부터 시작하는 위치)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHeading {
    pub level: HeadingLevel,
    pub text: String,
    pub position: usize,
}

// ============================================================================
// PageDocument
// ============================================================================

/// 파싱된 문서
pub struct PageDocument {
    html: Html,
}

impl PageDocument {
    /// 마크업 파싱 (실패하지 않음)
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// 첫 번째 `<title>` 텍스트 (원문 그대로, 공백 정리 없음)
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(|element| element.text().collect())
    }

    /// 첫 번째 `<meta name="description">`의 content 속성
    ///
    /// 속성값을 그대로 돌려줍니다. 요소는 있는데 content 속성이 없으면 빈 문자열입니다.
    pub fn meta_description(&self) -> Option<String> {
        let selector = Selector::parse("meta[name]").ok()?;
        self.html
            .select(&selector)
            .find(|element| {
                element
                    .value()
                    .attr("name")
                    .is_some_and(|name| name.trim().eq_ignore_ascii_case("description"))
            })
            .map(|element| {
                element
                    .value()
                    .attr("content")
                    .unwrap_or_default()
                    .to_string()
            })
    }

    /// H1..H6 순으로, 레벨 내에서는 문서 순서로 열거
    ///
    /// 위치는 레벨마다 1부터 다시 시작합니다.
    pub fn headings(&self) -> Vec<ParsedHeading> {
        let mut headings = Vec::new();

        for level in HeadingLevel::ALL {
            let Ok(selector) = Selector::parse(level.tag()) else {
                continue;
            };
            for (i, element) in self.html.select(&selector).enumerate() {
                headings.push(ParsedHeading {
                    level,
                    text: element_text(&element),
                    position: i + 1,
                });
            }
        }

        headings
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// 하위 태그를 평탄화한 텍스트 (공백 정리)
fn element_text(element: &ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// 연속 공백을 한 칸으로, 앞뒤 공백 제거
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
