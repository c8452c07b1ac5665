//! 수익률 정규화 모듈.
//!
//! 자산별 가격 시계열을 기준 시점 대비 수익률(%) 시계열로 변환합니다.
//!
//! # 예시
//!
//! ```rust,ignore
//! use tracker_analytics::returns::calculate_returns;
//!
//! // [100, 110, 121] → [0%, 10%, 21%]
//! let returns = calculate_returns(&prices, 0)?;
//! ```

use tracker_core::{PricePoint, ReturnPoint, TrackerError, TrackerResult};

/// 기준 시점 대비 수익률 시계열 계산.
///
/// `return_pct[i] = (price[i] - price[start]) / price[start] * 100`
///
/// # 인자
///
/// * `prices` - 가격 시계열 (시간순)
/// * `start_index` - 기준 시점 인덱스
///
/// # 반환
///
/// 입력과 같은 길이의 수익률 시계열. 빈 입력이면 빈 벡터.
///
/// # 에러
///
/// 비어 있지 않은 입력에서 `start_index`가 범위를 벗어나거나 기준 가격이
/// 양수가 아니면 `TrackerError::InvalidInput`.
pub fn calculate_returns(
    prices: &[PricePoint],
    start_index: usize,
) -> TrackerResult<Vec<ReturnPoint>> {
    if prices.is_empty() {
        return Ok(Vec::new());
    }

    let reference = prices.get(start_index).ok_or_else(|| {
        TrackerError::InvalidInput(format!(
            "start_index {} out of range (len {})",
            start_index,
            prices.len()
        ))
    })?;

    if !reference.has_valid_price() {
        return Err(TrackerError::InvalidInput(format!(
            "reference price must be positive, got {} on {}",
            reference.price, reference.date
        )));
    }

    let base = reference.price;
    let returns = prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            // 기준 시점은 부동소수점 오차 없이 정확히 0
            let return_pct = if i == start_index {
                0.0
            } else {
                (p.price - base) / base * 100.0
            };
            ReturnPoint::from_price(p, return_pct)
        })
        .collect();

    Ok(returns)
}

/// 첫 포인트를 기준으로 수익률 시계열 계산.
pub fn calculate_returns_from_start(prices: &[PricePoint]) -> TrackerResult<Vec<ReturnPoint>> {
    calculate_returns(prices, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn prices(values: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(start + chrono::Duration::days(i as i64), p))
            .collect()
    }

    #[test]
    fn test_returns_from_start() {
        let returns = calculate_returns(&prices(&[100.0, 110.0, 121.0]), 0).unwrap();
        assert_eq!(returns.len(), 3);
        assert_eq!(returns[0].return_pct, 0.0);
        assert!((returns[1].return_pct - 10.0).abs() < 1e-9);
        assert!((returns[2].return_pct - 21.0).abs() < 1e-9);
        assert_eq!(returns[2].price, 121.0);
        assert!(returns.iter().all(|r| r.sma_return_pct.is_none()));
    }

    #[test]
    fn test_returns_from_middle_reference() {
        let returns = calculate_returns(&prices(&[50.0, 49.0, 53.0]), 1).unwrap();
        assert!((returns[0].return_pct - (1.0 / 49.0 * 100.0)).abs() < 1e-9);
        assert_eq!(returns[1].return_pct, 0.0);
        assert!((returns[2].return_pct - (4.0 / 49.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        assert!(calculate_returns(&[], 0).unwrap().is_empty());
        // 빈 입력에서는 인덱스를 검사하지 않음
        assert!(calculate_returns(&[], 7).unwrap().is_empty());
    }

    #[test]
    fn test_start_index_out_of_range() {
        let result = calculate_returns(&prices(&[100.0, 101.0]), 2);
        assert!(matches!(result, Err(TrackerError::InvalidInput(_))));
    }

    #[test]
    fn test_non_positive_reference_price() {
        let result = calculate_returns(&prices(&[0.0, 101.0]), 0);
        assert!(matches!(result, Err(TrackerError::InvalidInput(_))));
    }

    #[test]
    fn test_dates_and_timestamps_preserved() {
        let input = prices(&[10.0, 20.0]);
        let returns = calculate_returns_from_start(&input).unwrap();
        for (p, r) in input.iter().zip(&returns) {
            assert_eq!(p.date, r.date);
            assert_eq!(p.timestamp, r.timestamp);
        }
    }

    proptest! {
        #[test]
        fn prop_reference_point_is_zero(
            values in prop::collection::vec(0.01f64..1_000_000.0, 1..60),
            pick in any::<prop::sample::Index>(),
        ) {
            let start = pick.index(values.len());
            let returns = calculate_returns(&prices(&values), start).unwrap();
            prop_assert_eq!(returns.len(), values.len());
            prop_assert_eq!(returns[start].return_pct, 0.0);
        }
    }
}
