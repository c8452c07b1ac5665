//! 설정 관리.
//!
//! TOML 파일과 `TRACKER__` 접두사 환경 변수에서 애플리케이션 설정을 로드합니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::find_symbol_conflict;
use crate::error::{TrackerError, TrackerResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 분석 설정
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    /// 추적할 자산 목록 (표시 순서)
    #[serde(default)]
    pub assets: Vec<AssetConfig>,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// span 진입/종료 기록
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            span_events: false,
        }
    }
}

/// 분석 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyticsConfig {
    /// SMA 윈도우 (없으면 SMA와 리베이스를 생략)
    #[serde(default)]
    pub sma_window: Option<usize>,
    /// 가격 CSV 파일 디렉토리
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            sma_window: None,
            data_dir: default_data_dir(),
        }
    }
}

/// 자산 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetConfig {
    /// 심볼 (예: BTC, AMZN)
    pub symbol: String,
    /// 표시 이름
    #[serde(default)]
    pub display_name: Option<String>,
    /// 차트 색상
    #[serde(default = "default_color")]
    pub color: String,
    /// 연간 수수료 (%, 예: 0.25)
    #[serde(default)]
    pub yearly_fee_pct: Decimal,
    /// 가격 파일 이름 (기본: `<symbol>.csv`)
    #[serde(default)]
    pub file: Option<String>,
}

fn default_color() -> String {
    "#888888".to_string()
}

impl AssetConfig {
    /// 새 자산 설정을 생성합니다.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: None,
            color: default_color(),
            yearly_fee_pct: Decimal::ZERO,
            file: None,
        }
    }

    /// 표시 이름. 지정하지 않았으면 심볼을 사용합니다.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.symbol)
    }

    /// 연간 수수료를 f64 퍼센트로 반환합니다.
    pub fn fee_pct_f64(&self) -> f64 {
        self.yearly_fee_pct.to_f64().unwrap_or(0.0)
    }

    /// 데이터 디렉토리 기준 가격 파일 경로.
    pub fn price_file(&self, data_dir: impl AsRef<Path>) -> PathBuf {
        let name = self
            .file
            .clone()
            .unwrap_or_else(|| format!("{}.csv", self.symbol));
        data_dir.as_ref().join(name)
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> TrackerResult<Self> {
        let builder = config::Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("TRACKER")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> TrackerResult<Self> {
        Self::load("config/default.toml")
    }

    /// TOML 문자열에서 설정을 로드합니다 (환경 변수 오버라이드 없음).
    pub fn from_toml_str(toml: &str) -> TrackerResult<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 설정 값의 유효성을 검사합니다.
    pub fn validate(&self) -> TrackerResult<()> {
        if self.assets.is_empty() {
            return Err(TrackerError::Config("자산이 하나 이상 필요합니다".to_string()));
        }

        if self.analytics.sma_window == Some(0) {
            return Err(TrackerError::Config(
                "sma_window는 1 이상이어야 합니다".to_string(),
            ));
        }

        if let Some(conflict) = find_symbol_conflict(self.assets.iter().map(|a| a.symbol.as_str()))
        {
            return Err(TrackerError::Config(conflict));
        }

        for asset in &self.assets {
            if asset.symbol.trim().is_empty() {
                return Err(TrackerError::Config("빈 심볼이 있습니다".to_string()));
            }
            if asset.yearly_fee_pct < Decimal::ZERO {
                return Err(TrackerError::Config(format!(
                    "{}: 수수료는 음수일 수 없습니다 ({})",
                    asset.symbol, asset.yearly_fee_pct
                )));
            }
        }

        Ok(())
    }

    /// 심볼별 연간 수수료(%).
    pub fn fees(&self) -> HashMap<String, Decimal> {
        self.assets
            .iter()
            .map(|a| (a.symbol.clone(), a.yearly_fee_pct))
            .collect()
    }

    /// 심볼로 자산 설정을 찾습니다.
    pub fn asset(&self, symbol: &str) -> Option<&AssetConfig> {
        self.assets.iter().find(|a| a.symbol == symbol)
    }
}
