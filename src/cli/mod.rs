//! CLI 모듈
//!
//! seo-audit CLI 명령어 정의 및 구현
//! - serve : HTTP 감사 서버
//! - audit : URL 하나 감사 후 출력
//! - export : URL 하나 감사 후 헤딩 CSV 저장

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::export;
use crate::metrics::{Assessment, Verdict};
use crate::report::{Report, ReportService};
use crate::server;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "seo-audit")]
#[command(version, about = "단일 페이지 SEO 플래시 감사", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// HTTP 감사 서버 실행
    Serve {
        /// 리스닝 포트 (기본: PORT 환경변수, 없으면 5000)
        #[arg(short, long)]
        port: Option<u16>,

        /// 바인딩 주소
        #[arg(long)]
        host: Option<IpAddr>,
    },

    /// URL 하나 감사
    Audit {
        /// 감사할 URL
        url: String,

        /// JSON으로 출력 (/api/extract 응답과 동일 + 판정)
        #[arg(long)]
        json: bool,
    },

    /// 헤딩 구조를 CSV로 내보내기
    Export {
        /// 감사할 URL
        url: String,

        /// 출력 파일 (생략 시 stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Serve { port, host } => cmd_serve(config, port, host).await,
        Commands::Audit { url, json } => cmd_audit(&config, &url, json).await,
        Commands::Export { url, output } => cmd_export(&config, &url, output).await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 서버 명령어 (serve)
async fn cmd_serve(mut config: AppConfig, port: Option<u16>, host: Option<IpAddr>) -> Result<()> {
    if let Some(port) = port {
        config = config.with_port(port);
    }
    if let Some(host) = host {
        config = config.with_host(host);
    }
    server::serve(config).await
}

/// JSON 출력 형태
#[derive(Serialize)]
struct AuditOutput<'a> {
    #[serde(flatten)]
    report: &'a Report,
    assessment: Assessment,
}

/// 감사 명령어 (audit)
async fn cmd_audit(config: &AppConfig, url: &str, json: bool) -> Result<()> {
    let report = build_report(config, url).await?;

    if json {
        let output = AuditOutput {
            report: &report,
            assessment: report.metadata.assess(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print!("{}", render_summary(url, &report));
    Ok(())
}

/// 내보내기 명령어 (export)
async fn cmd_export(config: &AppConfig, url: &str, output: Option<PathBuf>) -> Result<()> {
    let report = build_report(config, url).await?;
    let bytes = export::encode_csv(&report.headings).context("CSV 인코딩 실패")?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("파일 쓰기 실패: {:?}", path))?;
            println!(
                "[OK] 헤딩 {} 건 내보냄: {}",
                report.headings.len(),
                path.display()
            );
        }
        None => print!("{}", String::from_utf8_lossy(&bytes)),
    }

    Ok(())
}

async fn build_report(config: &AppConfig, url: &str) -> Result<Report> {
    let service = ReportService::from_config(config).context("ReportService 생성 실패")?;
    service
        .build_report(url)
        .await
        .with_context(|| format!("감사 실패: {url}"))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 사람이 읽는 요약
fn render_summary(url: &str, report: &Report) -> String {
    let meta = &report.metadata;
    let verdicts = meta.assess();
    let mut out = String::new();

    out.push_str(&format!("[OK] 감사 완료: {}\n\n", url));
    out.push_str(&format!(
        "  {} SSL          : {}\n",
        mark(verdicts.https),
        if meta.is_https { "OUI" } else { "NON" }
    ));
    out.push_str(&format!(
        "  {} Vitesse      : {:.2}s\n",
        mark(verdicts.response_time),
        meta.response_time_seconds
    ));
    out.push_str(&format!(
        "  {} Titre SEO    : {} car.\n",
        mark(verdicts.title),
        meta.title_length
    ));
    out.push_str(&format!(
        "  {} Description  : {} car.\n",
        mark(verdicts.description),
        meta.description_length
    ));
    out.push_str(&format!(
        "  {} Mots         : {}\n\n",
        mark(verdicts.word_count),
        meta.word_count
    ));

    out.push_str(&format!("[*] Structure Hn ({} 건):\n", report.headings.len()));
    for heading in &report.headings {
        out.push_str(&format!(
            "    {}#{:<3} {}\n",
            heading.level,
            heading.position,
            truncate_text(&heading.text, 80)
        ));
    }

    out.push_str(&format!(
        "\n[*] Contenu extrait: {}\n",
        truncate_text(&report.content, 200)
    ));
    out
}

fn mark(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Good => "[OK]",
        Verdict::Bad => "[!] ",
        Verdict::Info => "[*] ",
    }
}

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================
