//! 포트폴리오 수익률 및 상관관계 분석.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 수익률 정규화 (기준 시점 대비 %)
//! - 연간 수수료의 일 단위 복리 차감
//! - 수익률 SMA, 리베이스, 워밍업 제거
//! - 거래 달력 교집합 기준 자산 병합
//! - 일간 수익률 상관관계 및 동일 가중 분산 기여도
//!
//! 모든 단계는 부수 효과 없는 순수 함수입니다.
//!
//! # Re-exports
//!
//! - [`pipeline`]: 전체 단계를 연결하는 `PortfolioPipeline`
//! - [`correlation`]: `CorrelationPair`, `CorrelationAnalysis`
//! - [`merge`]: 차트 행 `MergedRow`

pub mod correlation;
pub mod fees;
pub mod merge;
pub mod moving_average;
pub mod pipeline;
pub mod returns;

pub use correlation::{
    align_daily_returns, analyze_correlations, calculate_correlation, calculate_correlations,
    daily_returns, AlignedReturns, AssetVariance, CorrelationAnalysis, CorrelationMatrix,
    CorrelationPair,
};
pub use fees::{apply_fees, daily_fee_rate, fee_multiplier, DAYS_PER_YEAR};
pub use merge::{merge_series, MergedRow, MergedValue};
pub use moving_average::{apply_sma_and_rebase, calculate_sma, rebase, trim_warmup, warmup_len};
pub use pipeline::{
    AssetInput, AssetSummary, PipelineOptions, PortfolioPipeline, PortfolioReport,
};
pub use returns::{calculate_returns, calculate_returns_from_start};
