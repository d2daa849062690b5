//! 설정 모듈 - 시작 시 한 번 생성되는 불변 설정
//!
//! 로고 URL, 리스닝 포트, 봇 식별자, 요청 타임아웃을 하나의 구조체로 묶습니다.
//! 코어 컴포넌트(fetcher, parser, extractor, metrics)는 환경변수를 직접 읽지 않고
//! 이 구조체를 명시적으로 전달받습니다.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use anyhow::{Context, Result};

/// 기본 리스닝 포트
pub const DEFAULT_PORT: u16 = 5000;

/// 요청 타임아웃 (초)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// 봇 식별 User-Agent
pub const DEFAULT_USER_AGENT: &str = "MC-Bot/1.0";

/// HTML 셸에 표시되는 로고
pub const DEFAULT_LOGO_URL: &str =
    "https://monsieurclick.com/wp-content/uploads/2023/05/logo-monsieur-click.png";

/// 포트 환경변수 이름
const PORT_ENV: &str = "PORT";

/// 애플리케이션 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// 바인딩 주소
    pub host: IpAddr,
    /// 리스닝 포트
    pub port: u16,
    /// HTML 셸 로고
    pub logo_url: String,
    /// 아웃바운드 요청 User-Agent
    pub user_agent: String,
    /// 아웃바운드 요청 타임아웃
    pub timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            logo_url: DEFAULT_LOGO_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// 환경변수에서 설정 로드 (`PORT`만 읽음)
    pub fn from_env() -> Result<Self> {
        let port = std::env::var(PORT_ENV).ok();
        Self::from_port_var(port.as_deref())
    }

    /// `PORT` 값으로 설정 생성 (없으면 기본값)
    fn from_port_var(value: Option<&str>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) {
            config.port = raw
                .parse()
                .with_context(|| format!("Invalid {PORT_ENV} value: {raw:?}"))?;
        }
        Ok(config)
    }

    /// 포트 덮어쓰기
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// 바인딩 주소 덮어쓰기
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// 타임아웃 덮어쓰기
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.user_agent, "MC-Bot/1.0");
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_port_from_var() {
        let config = AppConfig::from_port_var(Some("8080")).unwrap();
        assert_eq!(config.port, 8080);

        let config = AppConfig::from_port_var(Some("  ")).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);

        let config = AppConfig::from_port_var(None).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = AppConfig::from_port_var(Some("http")).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_builders() {
        let config = AppConfig::default()
            .with_port(9000)
            .with_host(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .with_timeout(Duration::from_millis(250));
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.timeout, Duration::from_millis(250));
    }
}
