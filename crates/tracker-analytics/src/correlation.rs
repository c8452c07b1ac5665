//! 상관계수 계산 모듈.
//!
//! 자산 간 일간 수익률의 상관관계와 동일 가중 포트폴리오의 분산 기여도를 계산합니다.
//!
//! # 처리 순서
//!
//! 1. 자산별 일간 수익률 (연속된 `ReturnPoint` 간 복리 변화율)
//! 2. 모든 자산에 존재하는 날짜만 정렬 (병합과 같은 거래 달력 교집합 정책)
//! 3. 자산 쌍별 Pearson 상관계수
//! 4. 동일 가중(`w = 1/n`) 포트폴리오 분산을 자산별/쌍별 기여도(%)로 분해
//!
//! # 예시
//!
//! ```rust,ignore
//! use tracker_analytics::correlation::calculate_correlations;
//!
//! for pair in calculate_correlations(&series) {
//!     println!("{}-{}: {:.4}", pair.symbol_a, pair.symbol_b, pair.correlation);
//! }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracker_core::{AssetSeries, ReturnPoint};

/// 자산 쌍의 상관관계와 분산 기여도.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationPair {
    /// 첫 번째 심볼 (입력 순서상 앞)
    pub symbol_a: String,
    /// 두 번째 심볼
    pub symbol_b: String,
    /// 상관계수 (-1.0 ~ 1.0)
    pub correlation: f64,
    /// 쌍의 공분산 기여도 (총 분산 대비 %)
    pub variance_contribution: f64,
    /// A 자산 자체 분산 기여도 (%)
    pub variance_a: f64,
    /// B 자산 자체 분산 기여도 (%)
    pub variance_b: f64,
}

/// 자산 자체 분산 기여도 (대각 성분).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetVariance {
    /// 심볼
    pub symbol: String,
    /// 일간 수익률 분산
    pub variance: f64,
    /// 총 분산 대비 기여도 (%)
    pub contribution_pct: f64,
}

/// 상관 분석 결과.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationAnalysis {
    /// 자산 쌍 목록 (|상관계수| 내림차순)
    pub pairs: Vec<CorrelationPair>,
    /// 자산별 자체 분산 기여도 (입력 순서)
    pub assets: Vec<AssetVariance>,
    /// 동일 가중 포트폴리오 총 분산
    pub total_variance: f64,
    /// 공통 날짜 수 (일간 수익률 관측치)
    pub observation_count: usize,
}

/// 상관행렬 (N×N).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// 종목 목록 (행/열 순서)
    pub symbols: Vec<String>,
    /// 상관계수 행렬 (-1.0 ~ 1.0)
    pub matrix: Vec<Vec<f64>>,
    /// 분석 기간 (관측치 수)
    pub period: usize,
}

/// 공통 날짜 기준으로 정렬된 일간 수익률.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedReturns {
    /// 공통 날짜 (오름차순)
    pub dates: Vec<NaiveDate>,
    /// 자산별 일간 수익률 (입력 순서, 각 길이 = dates.len())
    pub returns: Vec<Vec<f64>>,
}

/// Pearson 상관계수 계산.
///
/// 두 수익률 시계열 간의 상관계수를 계산합니다.
///
/// # 반환
///
/// 상관계수 (-1.0 ~ 1.0), 길이 불일치/데이터 부족/변동 없음이면 None
pub fn calculate_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;

    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    // 표준편차가 0인 경우 (변동 없음)
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// 모분산 (n으로 나눔). 관측치가 없으면 0.
fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// 수익률 시계열을 일간 수익률(소수)로 변환.
///
/// `daily[i] = (1 + r[i]/100) / (1 + r[i-1]/100) - 1`, 키는 `r[i]`의 날짜.
/// 직전 총수익 배수가 0 이하인 구간은 건너뜁니다.
pub fn daily_returns(series: &[ReturnPoint]) -> BTreeMap<NaiveDate, f64> {
    series
        .windows(2)
        .filter_map(|w| {
            let prev = w[0].gross();
            if prev <= 0.0 {
                return None;
            }
            Some((w[1].date, w[1].gross() / prev - 1.0))
        })
        .collect()
}

/// 모든 자산에 일간 수익률이 있는 날짜만 남겨 정렬.
pub fn align_daily_returns(assets: &[AssetSeries]) -> AlignedReturns {
    let maps: Vec<BTreeMap<NaiveDate, f64>> =
        assets.iter().map(|a| daily_returns(&a.returns)).collect();

    let Some((first, rest)) = maps.split_first() else {
        return AlignedReturns::default();
    };

    let dates: Vec<NaiveDate> = first
        .keys()
        .filter(|d| rest.iter().all(|m| m.contains_key(d)))
        .copied()
        .collect();

    let returns = maps
        .iter()
        .map(|m| dates.iter().map(|d| m[d]).collect())
        .collect();

    AlignedReturns { dates, returns }
}

/// 상관관계 및 분산 기여도 분석.
///
/// 자산이 2개 미만이거나 공통 날짜가 없으면 빈 결과를 반환합니다.
/// 표준편차가 0인 자산이 포함된 쌍은 상관계수와 기여도가 0입니다.
/// 총 분산이 0이면 기여도를 정규화하지 않습니다.
pub fn analyze_correlations(assets: &[AssetSeries]) -> CorrelationAnalysis {
    if assets.len() < 2 {
        return CorrelationAnalysis::default();
    }

    let aligned = align_daily_returns(assets);
    if aligned.dates.is_empty() {
        tracing::debug!(assets = assets.len(), "공통 날짜가 없어 상관 분석 생략");
        return CorrelationAnalysis::default();
    }

    let weight = 1.0 / assets.len() as f64;
    let w2 = weight * weight;

    let variances: Vec<f64> = aligned
        .returns
        .iter()
        .map(|r| population_variance(r))
        .collect();
    let stds: Vec<f64> = variances.iter().map(|v| v.sqrt()).collect();

    let mut diagonal: Vec<AssetVariance> = assets
        .iter()
        .zip(&variances)
        .map(|(asset, &variance)| AssetVariance {
            symbol: asset.symbol.clone(),
            variance,
            contribution_pct: w2 * variance,
        })
        .collect();

    // (i, j, 상관계수, 공분산 기여도)
    let mut raw_pairs = Vec::new();
    for i in 0..assets.len() {
        for j in (i + 1)..assets.len() {
            let (correlation, contribution) = if stds[i] == 0.0 || stds[j] == 0.0 {
                (0.0, 0.0)
            } else {
                let corr = calculate_correlation(&aligned.returns[i], &aligned.returns[j])
                    .unwrap_or(0.0);
                (corr, 2.0 * w2 * corr * stds[i] * stds[j])
            };
            raw_pairs.push((i, j, correlation, contribution));
        }
    }

    let total_variance = diagonal.iter().map(|d| d.contribution_pct).sum::<f64>()
        + raw_pairs.iter().map(|p| p.3).sum::<f64>();

    let normalize = |raw: f64| {
        if total_variance > 0.0 {
            raw / total_variance * 100.0
        } else {
            raw
        }
    };

    for d in &mut diagonal {
        d.contribution_pct = normalize(d.contribution_pct);
    }

    let mut pairs: Vec<CorrelationPair> = raw_pairs
        .into_iter()
        .map(|(i, j, correlation, contribution)| CorrelationPair {
            symbol_a: assets[i].symbol.clone(),
            symbol_b: assets[j].symbol.clone(),
            correlation,
            variance_contribution: normalize(contribution),
            variance_a: diagonal[i].contribution_pct,
            variance_b: diagonal[j].contribution_pct,
        })
        .collect();

    pairs.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(Ordering::Equal)
    });

    tracing::debug!(
        assets = assets.len(),
        observations = aligned.dates.len(),
        pairs = pairs.len(),
        total_variance,
        "상관 분석 완료"
    );

    CorrelationAnalysis {
        pairs,
        assets: diagonal,
        total_variance,
        observation_count: aligned.dates.len(),
    }
}

/// 자산 쌍별 상관관계 (|상관계수| 내림차순).
pub fn calculate_correlations(assets: &[AssetSeries]) -> Vec<CorrelationPair> {
    analyze_correlations(assets).pairs
}

impl CorrelationAnalysis {
    /// 쌍 목록을 N×N 상관행렬로 변환합니다 (대각선 1.0).
    pub fn matrix(&self) -> CorrelationMatrix {
        let symbols: Vec<String> = self.assets.iter().map(|a| a.symbol.clone()).collect();
        let n = symbols.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = 1.0;
        }

        for pair in &self.pairs {
            let i = symbols.iter().position(|s| *s == pair.symbol_a);
            let j = symbols.iter().position(|s| *s == pair.symbol_b);
            if let (Some(i), Some(j)) = (i, j) {
                matrix[i][j] = pair.correlation;
                matrix[j][i] = pair.correlation; // 대칭
            }
        }

        CorrelationMatrix {
            symbols,
            matrix,
            period: self.observation_count,
        }
    }

    /// 자산 및 쌍 기여도의 합 (%). 총 분산이 양수이면 100.
    pub fn contribution_sum(&self) -> f64 {
        self.assets.iter().map(|a| a.contribution_pct).sum::<f64>()
            + self
                .pairs
                .iter()
                .map(|p| p.variance_contribution)
                .sum::<f64>()
    }
}
