//! 내보내기 모듈 - 헤딩 레코드를 CSV로
//!
//! 컬럼 순서 고정: source_url, level, text, position.
//! 레코드가 없어도 헤더 행은 항상 씁니다. 줄 끝은 CRLF (RFC 4180).

use serde::Deserialize;
use thiserror::Error;

use crate::parser::HeadingLevel;
use crate::report::HeadingRecord;

/// CSV 헤더
pub const CSV_COLUMNS: [&str; 4] = ["source_url", "level", "text", "position"];

/// 내보내기 파일 이름
pub const EXPORT_FILENAME: &str = "audit_monsieur_click.csv";

/// 내보내기 에러
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("heading record #{index} is missing field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("heading record #{index} has invalid field '{field}': {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("CSV encoding failed: {0}")]
    Encode(String),
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Encode(err.to_string())
    }
}

// ============================================================================
// Loose input records
// ============================================================================

/// 클라이언트가 되돌려 보낸 헤딩 레코드 (모든 필드 선택적)
///
/// 누락 필드는 역직렬화 단계가 아니라 [`into_records`]에서
/// `ExportError::MissingField`로 보고합니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHeadingRecord {
    pub source_url: Option<String>,
    #[serde(alias = "type")]
    pub level: Option<String>,
    pub text: Option<String>,
    pub position: Option<u64>,
}

impl RawHeadingRecord {
    fn into_record(self, index: usize) -> Result<HeadingRecord, ExportError> {
        let missing = |field| ExportError::MissingField { index, field };

        let source_url = self.source_url.ok_or_else(|| missing("source_url"))?;
        let raw_level = self.level.ok_or_else(|| missing("level"))?;
        let text = self.text.ok_or_else(|| missing("text"))?;
        let position = self.position.ok_or_else(|| missing("position"))?;

        let level = raw_level
            .parse::<HeadingLevel>()
            .map_err(|reason| ExportError::InvalidField {
                index,
                field: "level",
                reason,
            })?;
        let position = usize::try_from(position).map_err(|e| ExportError::InvalidField {
            index,
            field: "position",
            reason: e.to_string(),
        })?;

        Ok(HeadingRecord {
            source_url,
            level,
            text,
            position,
        })
    }
}

/// 느슨한 레코드를 검증된 레코드로 (순서 유지)
pub fn into_records(raw: Vec<RawHeadingRecord>) -> Result<Vec<HeadingRecord>, ExportError> {
    raw.into_iter()
        .enumerate()
        .map(|(i, record)| record.into_record(i + 1))
        .collect()
}

// ============================================================================
// Encoder
// ============================================================================

/// 헤딩 레코드를 UTF-8 CSV 바이트로
pub fn encode_csv(records: &[HeadingRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(CSV_COLUMNS)?;

    for record in records {
        writer.write_record([
            record.source_url.as_str(),
            record.level.as_str(),
            record.text.as_str(),
            record.position.to_string().as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Encode(e.to_string()))
}
