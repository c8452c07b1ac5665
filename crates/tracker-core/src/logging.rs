//! 로깅 초기화.
//!
//! 레벨과 형식은 다음 순서로 결정됩니다 (뒤쪽이 우선):
//!
//! 1. 설정 파일 `[logging]` 섹션 (없으면 `info` / `pretty`)
//! 2. 환경 변수 `RUST_LOG`, `LOG_FORMAT`
//! 3. 명령행 `--log-level`
//!
//! 로그는 항상 stderr로 출력합니다. stdout은 차트/상관 분석 결과 전용입니다.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;
use crate::error::{TrackerError, TrackerResult};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    /// 로그 수집기용 한 줄 JSON
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

/// 해석이 끝난 로깅 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` 지시문 (예: "info", "tracker_analytics=debug")
    pub level: String,
    pub format: LogFormat,
    /// 파이프라인/자산 span의 시작과 종료도 기록
    pub span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from(&LoggingConfig::default())
    }
}

impl From<&LoggingConfig> for LogConfig {
    /// 알 수 없는 형식 문자열은 pretty로 취급합니다.
    fn from(section: &LoggingConfig) -> Self {
        Self {
            level: section.level.clone(),
            format: section.format.parse().unwrap_or_default(),
            span_events: section.span_events,
        }
    }
}

impl LogConfig {
    /// 값이 주어진 항목만 덮어씁니다. 빈 레벨과 해석할 수 없는 형식은 무시합니다.
    pub fn with_overrides(mut self, level: Option<&str>, format: Option<&str>) -> Self {
        if let Some(level) = level.map(str::trim).filter(|l| !l.is_empty()) {
            self.level = level.to_string();
        }
        if let Some(format) = format.and_then(|f| f.parse().ok()) {
            self.format = format;
        }
        self
    }

    /// `RUST_LOG`와 `LOG_FORMAT` 환경 변수를 적용합니다.
    pub fn with_env_overrides(self) -> Self {
        let level = std::env::var("RUST_LOG").ok();
        let format = std::env::var("LOG_FORMAT").ok();
        self.with_overrides(level.as_deref(), format.as_deref())
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let span_events = if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };

        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(span_events);

        match self.format {
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Json => layer.json().boxed(),
            LogFormat::Compact => layer.compact().boxed(),
        }
    }
}

/// 전역 subscriber를 설치합니다. 프로세스당 한 번만 성공합니다.
pub fn init_logging(config: &LogConfig) -> TrackerResult<()> {
    let filter = EnvFilter::try_new(&config.level).map_err(|e| {
        TrackerError::Config(format!("잘못된 로그 레벨 '{}': {}", config.level, e))
    })?;

    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(filter)
        .try_init()
        .map_err(|e| TrackerError::Internal(format!("로거 초기화 실패: {}", e)))?;

    tracing::debug!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(())
}

/// 자산 심볼이 포함된 span을 생성하는 매크로.
#[macro_export]
macro_rules! asset_span {
    ($name:expr, $symbol:expr) => {
        tracing::info_span!($name, symbol = %$symbol)
    };
    ($name:expr, $symbol:expr, $points:expr) => {
        tracing::info_span!($name, symbol = %$symbol, points = $points)
    };
}
