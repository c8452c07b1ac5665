//! CLI 명령어 구현 모듈.

pub mod chart;
pub mod correlate;
pub mod output;
pub mod prices;
pub mod summary;

use anyhow::Result;
use tracker_analytics::{PipelineOptions, PortfolioPipeline, PortfolioReport};
use tracker_core::AppConfig;

/// 명령어 공통 실행 옵션.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// 데이터 디렉토리 (설정 파일 값 대신 사용)
    pub data_dir: Option<String>,
    /// SMA 윈도우 (설정 파일 값 대신 사용)
    pub window: Option<usize>,
    /// SMA 비활성화
    pub no_sma: bool,
}

impl RunOptions {
    /// 설정 파일과 명령행 인자를 합쳐 파이프라인 옵션을 만듭니다.
    pub fn pipeline_options(&self, config: &AppConfig) -> PipelineOptions {
        if self.no_sma {
            return PipelineOptions::default();
        }
        match self.window {
            Some(window) => PipelineOptions::with_sma(window),
            None => PipelineOptions::from(config),
        }
    }
}

/// 가격을 로드하고 파이프라인을 실행합니다.
pub fn build_report(config: &AppConfig, options: &RunOptions) -> Result<PortfolioReport> {
    if options.window == Some(0) {
        anyhow::bail!("--window must be at least 1");
    }

    let inputs = prices::load_inputs(config, options.data_dir.as_deref())?;
    let pipeline = PortfolioPipeline::new(options.pipeline_options(config));
    Ok(pipeline.run(&inputs)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_options_precedence() {
        let config = AppConfig::from_toml_str(
            "[analytics]\nsma_window = 20\n\n[[assets]]\nsymbol = \"BTC\"\n",
        )
        .unwrap();

        let from_file = RunOptions::default();
        assert_eq!(from_file.pipeline_options(&config).sma_window, Some(20));

        let overridden = RunOptions {
            window: Some(5),
            ..Default::default()
        };
        assert_eq!(overridden.pipeline_options(&config).sma_window, Some(5));

        let disabled = RunOptions {
            window: Some(5),
            no_sma: true,
            ..Default::default()
        };
        assert_eq!(disabled.pipeline_options(&config).sma_window, None);
    }
}
