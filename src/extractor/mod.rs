//! 본문 추출 모듈 - 보일러플레이트 제거
//!
//! 기본 구현은 `readability` 크레이트(Mozilla Readability 포팅)에 본문 선택을 맡기고,
//! 선택된 HTML을 문단 단위 평문으로 펼칩니다.
//! - 네비게이션, 사이드바, 푸터, script/style 서브트리는 텍스트 수집에서 건너뜀
//! - readability 결과가 비었거나 트리가 너무 깊으면 의미 기반 컨테이너로 대체
//!
//! 모든 DOM 순회는 명시적 스택으로 돌기 때문에 중첩 깊이와 무관하게 스택을 쓰지 않습니다.
//! 같은 입력에는 항상 같은 출력을 냅니다 (네트워크 호출 없음).

use anyhow::{Context, Result};
use readability::extractor;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::parser::collapse_whitespace;

// ============================================================================
// ContentExtractor Trait
// ============================================================================

/// 본문 추출 전략 트레이트
pub trait ContentExtractor: Send + Sync {
    /// 마크업에서 본문 평문 추출 (본문이 없으면 빈 문자열)
    fn extract_main_text(&self, markup: &str) -> String;

    /// 추출기 이름
    fn name(&self) -> &'static str;
}

// ============================================================================
// Extractor Configuration
// ============================================================================

/// 추출 설정
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// readability에 넘길 수 있는 최대 요소 중첩 깊이
    ///
    /// readability는 재귀로 트리를 돌기 때문에 이보다 깊은 문서는
    /// 대체 경로(반복 순회)로만 처리합니다.
    pub max_depth: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

// ============================================================================
// Tag Tables
// ============================================================================

/// 항상 건너뛰는 태그
const SKIP_TAGS: &[&str] = &[
    "head", "title", "script", "style", "noscript", "template", "nav", "header", "footer",
    "aside", "form", "button", "select", "textarea", "iframe", "object", "embed", "svg",
    "canvas", "menu", "dialog",
];

/// 보일러플레이트 ARIA role
const SKIP_ROLES: &[&str] = &[
    "navigation",
    "banner",
    "contentinfo",
    "complementary",
    "menu",
    "menubar",
    "dialog",
    "alert",
    "search",
];

/// class/id 힌트와 무관하게 보존하는 태그
const PROTECTED_TAGS: &[&str] = &["html", "body", "article", "main"];

/// 문단 경계를 만드는 블록 태그
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "ul", "ol", "li", "dl", "dt", "dd", "h1", "h2",
    "h3", "h4", "h5", "h6", "blockquote", "pre", "table", "thead", "tbody", "tr", "td", "th",
    "caption", "figure", "figcaption", "address", "hr", "details", "summary",
];

/// 대체 경로에서 본문 후보로 보는 컨테이너 (우선순위 순)
const CONTAINER_SELECTORS: &[&str] = &["main", "article", "[role=main]", "body"];

const UNLIKELY_HINTS: &str = r"(?i)-ad-|ad-break|advert|agegate|banner|breadcrumb|combx|comment|community|cookie|cover-wrap|disqus|extra|footer|gdpr|header|legends|menu|navbar|newsletter|pager|pagination|popup|promo|related|remark|replies|rss|share|shoutbox|sidebar|skyscraper|social|sponsor|supplemental|widget";
const MAYBE_HINTS: &str = r"(?i)and|article|body|column|content|main|shadow";

// ============================================================================
// ReadabilityExtractor
// ============================================================================

/// readability 기반 본문 추출기
#[derive(Debug, Clone)]
pub struct ReadabilityExtractor {
    config: ExtractorConfig,
    /// 본문 링크 보정용 기준 URL (텍스트만 쓰므로 고정값)
    base_url: Url,
    unlikely: Regex,
    maybe: Regex,
}

/// 반복 순회 단계
enum Visit<'a> {
    Open(ElementRef<'a>),
    /// 요소 닫힘 (블록 요소 여부)
    Close(bool),
    Text(&'a str),
}

impl ReadabilityExtractor {
    /// 기본 설정으로 생성
    pub fn new() -> Result<Self> {
        Self::with_config(ExtractorConfig::default())
    }

    /// 설정 지정 생성
    pub fn with_config(config: ExtractorConfig) -> Result<Self> {
        Ok(Self {
            config,
            base_url: Url::parse("http://localhost/").context("기준 URL 오류")?,
            unlikely: Regex::new(UNLIKELY_HINTS).context("unlikely 힌트 정규식 오류")?,
            maybe: Regex::new(MAYBE_HINTS).context("maybe 힌트 정규식 오류")?,
        })
    }

    /// 본문 블록 목록 추출
    pub fn extract_blocks(&self, markup: &str) -> Vec<String> {
        let html = Html::parse_document(markup);

        let depth = tree_depth(html.root_element());
        if depth <= self.config.max_depth {
            let blocks = self.readable_blocks(markup);
            if !blocks.is_empty() {
                return blocks;
            }
        } else {
            tracing::warn!(
                "Document nesting depth {} exceeds {}, skipping readability",
                depth,
                self.config.max_depth
            );
        }

        let container = semantic_container(&html);
        tracing::debug!("Falling back to <{}>", container.value().name());
        self.collect_blocks(container)
    }

    /// readability가 고른 본문 HTML을 문단으로 펼침
    fn readable_blocks(&self, markup: &str) -> Vec<String> {
        match extractor::extract(&mut markup.as_bytes(), &self.base_url) {
            Ok(product) => {
                let fragment = Html::parse_fragment(&product.content);
                self.collect_blocks(fragment.root_element())
            }
            Err(e) => {
                tracing::debug!("Readability extraction failed: {}", e);
                Vec::new()
            }
        }
    }

    /// 텍스트를 문단 단위로 수집 (명시적 스택, 문서 순서)
    fn collect_blocks(&self, root: ElementRef) -> Vec<String> {
        let mut blocks = Vec::new();
        let mut current = String::new();
        let mut stack = vec![Visit::Open(root)];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Text(text) => current.push_str(text),
                Visit::Close(true) => flush(&mut current, &mut blocks),
                Visit::Close(false) => current.push(' '),
                Visit::Open(element) => {
                    if self.is_boilerplate(&element) {
                        continue;
                    }
                    let name = element.value().name();
                    if name == "br" {
                        flush(&mut current, &mut blocks);
                        continue;
                    }
                    let block = BLOCK_TAGS.contains(&name);
                    if block {
                        flush(&mut current, &mut blocks);
                    } else {
                        current.push(' ');
                    }

                    stack.push(Visit::Close(block));
                    for child in element.children().rev() {
                        match child.value() {
                            Node::Text(text) => stack.push(Visit::Text(text)),
                            Node::Element(_) => {
                                if let Some(child) = ElementRef::wrap(child) {
                                    stack.push(Visit::Open(child));
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
        flush(&mut current, &mut blocks);

        blocks
    }

    /// 보일러플레이트 요소 여부
    fn is_boilerplate(&self, element: &ElementRef) -> bool {
        let value = element.value();
        let name = value.name();

        if SKIP_TAGS.contains(&name) {
            return true;
        }
        if value
            .attr("role")
            .is_some_and(|role| SKIP_ROLES.contains(&role.trim().to_ascii_lowercase().as_str()))
        {
            return true;
        }
        if value.attr("hidden").is_some() || value.attr("aria-hidden") == Some("true") {
            return true;
        }
        if PROTECTED_TAGS.contains(&name) {
            return false;
        }

        let hints = hint_text(element);
        self.unlikely.is_match(&hints) && !self.maybe.is_match(&hints)
    }
}

impl ContentExtractor for ReadabilityExtractor {
    fn extract_main_text(&self, markup: &str) -> String {
        self.extract_blocks(markup).join("\n")
    }

    fn name(&self) -> &'static str {
        "readability"
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// 요소 중첩 깊이 (루트 = 1)
fn tree_depth(root: ElementRef) -> usize {
    let mut deepest = 0;
    let mut stack = vec![(root, 1usize)];
    while let Some((element, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        stack.extend(
            element
                .children()
                .filter_map(ElementRef::wrap)
                .map(|child| (child, depth + 1)),
        );
    }
    deepest
}

/// 대체 경로의 본문 컨테이너
fn semantic_container(html: &Html) -> ElementRef<'_> {
    CONTAINER_SELECTORS
        .iter()
        .find_map(|selector| {
            let selector = Selector::parse(selector).ok()?;
            html.select(&selector).next()
        })
        .unwrap_or_else(|| html.root_element())
}

fn hint_text(element: &ElementRef) -> String {
    let value = element.value();
    format!(
        "{} {}",
        value.attr("class").unwrap_or_default(),
        value.attr("id").unwrap_or_default()
    )
}

/// 현재 문단을 공백 정리 후 확정
fn flush(current: &mut String, blocks: &mut Vec<String>) {
    let paragraph = collapse_whitespace(current);
    if !paragraph.is_empty() {
        blocks.push(paragraph);
    }
    current.clear();
}
