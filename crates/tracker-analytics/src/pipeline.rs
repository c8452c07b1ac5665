//! 포트폴리오 분석 파이프라인.
//!
//! 모든 자산의 가격을 가져온 뒤 대시보드가 수행하는 처리를 한 번에 실행합니다.
//!
//! ```text
//! 가격 시계열 → 수익률 → 수수료 반영 → (선택) SMA + 리베이스 + 워밍업 제거
//!            → 날짜 병합 차트 행
//!            → 일간 수익률 상관 분석
//! ```
//!
//! 각 단계는 순수 함수이며 입력을 변경하지 않습니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracker_core::{
    asset_span, find_symbol_conflict, AppConfig, AssetConfig, AssetSeries, PricePoint, TrackerError,
    TrackerResult,
};

use crate::correlation::{analyze_correlations, CorrelationAnalysis, CorrelationPair};
use crate::fees::apply_fees;
use crate::merge::{merge_series, MergedRow};
use crate::moving_average::apply_sma_and_rebase;
use crate::returns::calculate_returns_from_start;

/// 파이프라인 입력 자산.
#[derive(Debug, Clone)]
pub struct AssetInput {
    /// 심볼
    pub symbol: String,
    /// 표시 이름
    pub display_name: String,
    /// 차트 색상
    pub color: String,
    /// 연간 수수료 (%)
    pub yearly_fee_pct: f64,
    /// 가격 시계열 (워밍업 포함, 시간순)
    pub prices: Vec<PricePoint>,
}

impl AssetInput {
    /// 수수료 없는 입력을 생성합니다. 표시 이름은 심볼과 같습니다.
    pub fn new(symbol: impl Into<String>, prices: Vec<PricePoint>) -> Self {
        let symbol = symbol.into();
        Self {
            display_name: symbol.clone(),
            symbol,
            color: "#888888".to_string(),
            yearly_fee_pct: 0.0,
            prices,
        }
    }

    /// 연간 수수료를 설정합니다.
    pub fn with_fee(mut self, yearly_fee_pct: f64) -> Self {
        self.yearly_fee_pct = yearly_fee_pct;
        self
    }

    /// 자산 설정과 가격으로 입력을 생성합니다.
    pub fn from_config(config: &AssetConfig, prices: Vec<PricePoint>) -> Self {
        Self {
            symbol: config.symbol.clone(),
            display_name: config.display_name().to_string(),
            color: config.color.clone(),
            yearly_fee_pct: config.fee_pct_f64(),
            prices,
        }
    }
}

/// 파이프라인 옵션.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// SMA 윈도우. None이면 SMA/리베이스/워밍업 제거를 생략합니다.
    pub sma_window: Option<usize>,
}

impl PipelineOptions {
    /// SMA 윈도우를 지정한 옵션.
    pub fn with_sma(window: usize) -> Self {
        Self {
            sma_window: Some(window),
        }
    }
}

impl From<&AppConfig> for PipelineOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            sma_window: config.analytics.sma_window,
        }
    }
}

/// 범례/요약 표시용 자산 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    /// 심볼
    pub symbol: String,
    /// 표시 이름
    pub display_name: String,
    /// 차트 색상
    pub color: String,
    /// 표시 구간 시작일
    pub start_date: Option<NaiveDate>,
    /// 표시 구간 종료일
    pub end_date: Option<NaiveDate>,
    /// 표시 구간 총 수익률 (%)
    pub total_return_pct: Option<f64>,
    /// 최근 가격
    pub latest_price: Option<f64>,
    /// 최근 수익률 SMA (%)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_sma_return_pct: Option<f64>,
}

impl From<&AssetSeries> for AssetSummary {
    fn from(series: &AssetSeries) -> Self {
        let latest = series.latest();
        Self {
            symbol: series.symbol.clone(),
            display_name: series.display_name.clone(),
            color: series.color.clone(),
            start_date: series.first().map(|p| p.date),
            end_date: latest.map(|p| p.date),
            total_return_pct: series.total_return_pct(),
            latest_price: latest.map(|p| p.price),
            latest_sma_return_pct: latest.and_then(|p| p.sma_return_pct),
        }
    }
}

/// 파이프라인 실행 결과.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReport {
    /// 자산별 처리된 시계열 (입력 순서)
    pub series: Vec<AssetSeries>,
    /// 날짜 병합 차트 행
    pub rows: Vec<MergedRow>,
    /// 상관 분석
    pub correlation: CorrelationAnalysis,
    /// 자산별 요약
    pub summaries: Vec<AssetSummary>,
}

impl PortfolioReport {
    /// 자산 쌍별 상관관계.
    pub fn correlations(&self) -> &[CorrelationPair] {
        &self.correlation.pairs
    }
}

/// 포트폴리오 분석 파이프라인.
#[derive(Debug, Clone, Default)]
pub struct PortfolioPipeline {
    options: PipelineOptions,
}

impl PortfolioPipeline {
    /// 새 파이프라인을 생성합니다.
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// 파이프라인 옵션.
    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// 자산 하나의 수익률 시계열을 생성합니다.
    ///
    /// 수수료와 SMA는 워밍업을 포함한 전체 시계열에서 계산한 뒤 잘라냅니다.
    pub fn build_series(&self, input: &AssetInput) -> TrackerResult<AssetSeries> {
        let span = asset_span!("build_series", input.symbol, input.prices.len());
        let _enter = span.enter();

        if input.yearly_fee_pct < 0.0 || !input.yearly_fee_pct.is_finite() {
            return Err(TrackerError::InvalidInput(format!(
                "{}: 수수료는 0 이상이어야 합니다 ({})",
                input.symbol, input.yearly_fee_pct
            )));
        }

        let returns = calculate_returns_from_start(&input.prices)?;
        let net = apply_fees(&returns, input.yearly_fee_pct);

        let visible = match self.options.sma_window {
            Some(window) => apply_sma_and_rebase(&net, window)?,
            None => net,
        };

        tracing::debug!(
            fee = input.yearly_fee_pct,
            window = ?self.options.sma_window,
            visible = visible.len(),
            "자산 시계열 생성"
        );

        Ok(AssetSeries::new(
            input.symbol.clone(),
            input.display_name.clone(),
            input.color.clone(),
            visible,
        ))
    }

    /// 모든 자산의 시계열을 생성합니다 (입력 순서 유지).
    ///
    /// 병합 행은 심볼을 키로 쓰므로 중복 심볼이나 차트 키가 겹치는 심볼
    /// (`BTC`와 `BTC_price`)은 `InvalidInput`입니다.
    pub fn build_all(&self, inputs: &[AssetInput]) -> TrackerResult<Vec<AssetSeries>> {
        if let Some(conflict) = find_symbol_conflict(inputs.iter().map(|i| i.symbol.as_str())) {
            return Err(TrackerError::InvalidInput(conflict));
        }

        inputs.iter().map(|input| self.build_series(input)).collect()
    }

    /// 전체 파이프라인 실행.
    pub fn run(&self, inputs: &[AssetInput]) -> TrackerResult<PortfolioReport> {
        let span = tracing::info_span!("portfolio_pipeline", assets = inputs.len());
        let _enter = span.enter();

        let series = self.build_all(inputs)?;
        let rows = merge_series(&series);
        let correlation = analyze_correlations(&series);
        let summaries = series.iter().map(AssetSummary::from).collect();

        tracing::info!(
            rows = rows.len(),
            pairs = correlation.pairs.len(),
            "포트폴리오 분석 완료"
        );

        Ok(PortfolioReport {
            series,
            rows,
            correlation,
            summaries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(values: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(start + chrono::Duration::days(i as i64), p))
            .collect()
    }

    #[test]
    fn test_build_series_without_sma() {
        let pipeline = PortfolioPipeline::default();
        let series = pipeline
            .build_series(&AssetInput::new("BTC", prices(&[100.0, 110.0, 121.0])))
            .unwrap();

        assert_eq!(series.len(), 3);
        assert!((series.total_return_pct().unwrap() - 21.0).abs() < 1e-9);
        assert!(series.returns.iter().all(|r| r.sma_return_pct.is_none()));
    }

    #[test]
    fn test_build_series_fee_applied_before_trim() {
        let pipeline = PortfolioPipeline::new(PipelineOptions::with_sma(2));
        let input = AssetInput::new("BTC", prices(&[100.0, 110.0, 121.0, 133.1])).with_fee(36.5);
        let series = pipeline.build_series(&input).unwrap();

        // 워밍업 2개 제거 후 3일부터 표시
        assert_eq!(series.len(), 2);
        assert_eq!(series.returns[0].return_pct, 0.0);

        // 수수료는 원본 시계열 인덱스 기준으로 누적: 3일 (1-d)^2, 4일 (1-d)^3
        let d: f64 = 0.001;
        let expected = (1.331 * (1.0 - d).powi(3)) / (1.21 * (1.0 - d).powi(2)) - 1.0;
        assert!((series.returns[1].return_pct - expected * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_series_rejects_negative_fee() {
        let pipeline = PortfolioPipeline::default();
        let input = AssetInput::new("BTC", prices(&[100.0, 110.0])).with_fee(-1.0);
        assert!(pipeline.build_series(&input).is_err());
    }

    #[test]
    fn test_run_report() {
        let pipeline = PortfolioPipeline::default();
        let inputs = vec![
            AssetInput::new("BTC", prices(&[100.0, 110.0, 121.0, 115.0])),
            AssetInput::new("AMZN", prices(&[50.0, 49.0, 53.0, 52.0])),
        ];
        let report = pipeline.run(&inputs).unwrap();

        assert_eq!(report.series.len(), 2);
        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.correlations().len(), 1);
        assert_eq!(report.summaries[1].symbol, "AMZN");
        assert_eq!(report.summaries[1].latest_price, Some(52.0));
        assert_eq!(
            report.summaries[0].start_date,
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }

    #[test]
    fn test_run_rejects_duplicate_symbols() {
        let pipeline = PortfolioPipeline::default();
        let inputs = vec![
            AssetInput::new("BTC", prices(&[100.0, 110.0, 121.0])),
            AssetInput::new("BTC", prices(&[100.0, 90.0, 80.0])),
        ];

        assert!(matches!(
            pipeline.run(&inputs),
            Err(TrackerError::InvalidInput(_))
        ));
        assert!(pipeline.build_all(&inputs).is_err());
    }

    #[test]
    fn test_run_rejects_chart_key_collision() {
        let pipeline = PortfolioPipeline::default();
        let inputs = vec![
            AssetInput::new("BTC", prices(&[100.0, 110.0])),
            AssetInput::new("BTC_sma", prices(&[50.0, 51.0])),
        ];
        assert!(matches!(
            pipeline.run(&inputs),
            Err(TrackerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_options_from_config() {
        let config = AppConfig::from_toml_str(
            "[analytics]\nsma_window = 7\n\n[[assets]]\nsymbol = \"BTC\"\n",
        )
        .unwrap();
        assert_eq!(PipelineOptions::from(&config), PipelineOptions::with_sma(7));

        let input = AssetInput::from_config(&config.assets[0], Vec::new());
        assert_eq!(input.display_name, "BTC");
        assert_eq!(input.yearly_fee_pct, 0.0);
    }
}
