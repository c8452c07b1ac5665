//! 수익률 이동평균 및 리베이스 모듈.
//!
//! 차트 표시 구간 앞에 워밍업 데이터를 추가로 받아 SMA가 표시 시작점부터
//! 채워지도록 하는 흐름을 처리합니다.
//!
//! 1. 전체 시계열(워밍업 + 표시 구간)에서 SMA 계산
//! 2. 표시 시작점을 0%로 리베이스 (수익률과 SMA 모두 곱셈 방식)
//! 3. 워밍업 구간 제거
//!
//! 수수료와 SMA는 잘라내기 전에 전체 시계열에서 계산해야 합니다. 표시 구간만으로
//! 계산하면 시작 부분의 SMA가 비거나 부정확해집니다.

use tracker_core::{ReturnPoint, TrackerError, TrackerResult};

/// 수익률 단순 이동평균 (SMA) 계산.
///
/// SMA = (R1 + R2 + ... + Rn) / n
///
/// # 인자
/// * `returns` - 수익률 시계열
/// * `window` - 이동평균 기간 (1 이상)
///
/// # 반환
/// `sma_return_pct`가 채워진 새 시계열 (처음 window-1개는 None).
/// 입력이 window보다 짧으면 모두 None.
pub fn calculate_sma(returns: &[ReturnPoint], window: usize) -> TrackerResult<Vec<ReturnPoint>> {
    if window == 0 {
        return Err(TrackerError::InvalidInput(
            "SMA 기간은 0보다 커야 합니다".to_string(),
        ));
    }

    let divisor = window as f64;
    let result = returns
        .iter()
        .enumerate()
        .map(|(i, point)| {
            if i + 1 < window {
                point.with_sma(None)
            } else {
                let sum: f64 = returns[i + 1 - window..=i]
                    .iter()
                    .map(|r| r.return_pct)
                    .sum();
                point.with_sma(Some(sum / divisor))
            }
        })
        .collect();

    Ok(result)
}

/// 퍼센트 값을 새 기준 배수로 리베이스.
#[inline]
fn rebase_value(value_pct: f64, base_factor: f64) -> f64 {
    ((1.0 + value_pct / 100.0) / base_factor - 1.0) * 100.0
}

/// `rebase_index` 시점을 0%로 하는 시계열로 리베이스.
///
/// `base = 1 + return_pct[rebase_index] / 100`이며 모든 `return_pct`와 정의된
/// `sma_return_pct`를 `((1 + v/100) / base - 1) * 100`으로 변환합니다.
/// 두 시점 간 총수익 배수의 비율은 유지됩니다.
///
/// # 에러
/// 비어 있지 않은 입력에서 인덱스가 범위를 벗어나거나 기준 배수가 양수가 아니면
/// `TrackerError::InvalidInput`.
pub fn rebase(returns: &[ReturnPoint], rebase_index: usize) -> TrackerResult<Vec<ReturnPoint>> {
    if returns.is_empty() {
        return Ok(Vec::new());
    }

    let anchor = returns.get(rebase_index).ok_or_else(|| {
        TrackerError::InvalidInput(format!(
            "rebase_index {} out of range (len {})",
            rebase_index,
            returns.len()
        ))
    })?;

    let base = anchor.gross();
    if !base.is_finite() || base <= 0.0 {
        return Err(TrackerError::InvalidInput(format!(
            "cannot rebase on {} ({}%)",
            anchor.date, anchor.return_pct
        )));
    }

    let rebased = returns
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let return_pct = if i == rebase_index {
                0.0
            } else {
                rebase_value(point.return_pct, base)
            };
            ReturnPoint {
                return_pct,
                sma_return_pct: point.sma_return_pct.map(|s| rebase_value(s, base)),
                ..*point
            }
        })
        .collect();

    Ok(rebased)
}

/// 워밍업 구간 길이: `min(window, len - 1)` (len이 0이면 0).
///
/// 항상 최소 한 개의 포인트가 표시 구간에 남습니다.
#[inline]
pub fn warmup_len(len: usize, window: usize) -> usize {
    window.min(len.saturating_sub(1))
}

/// 워밍업 구간을 제거한 표시 구간을 반환합니다.
pub fn trim_warmup(returns: &[ReturnPoint], window: usize) -> Vec<ReturnPoint> {
    returns[warmup_len(returns.len(), window)..].to_vec()
}

/// SMA 계산 → 표시 시작점 리베이스 → 워밍업 제거.
///
/// 표시 구간의 첫 포인트는 리베이스 기준점이므로 수익률이 정확히 0%입니다.
///
/// - 빈 입력 → 빈 출력
/// - 포인트 1개 → 그 포인트를 0%로 반환 (window가 1일 때만 SMA 존재)
/// - 길이가 window 이하 → 마지막 포인트만 0%로 남음
pub fn apply_sma_and_rebase(
    returns: &[ReturnPoint],
    window: usize,
) -> TrackerResult<Vec<ReturnPoint>> {
    let with_sma = calculate_sma(returns, window)?;
    if with_sma.is_empty() {
        return Ok(with_sma);
    }

    let anchor = warmup_len(with_sma.len(), window);
    let rebased = rebase(&with_sma, anchor)?;

    tracing::trace!(
        window,
        warmup = anchor,
        visible = rebased.len() - anchor,
        "SMA 리베이스 완료"
    );

    Ok(rebased[anchor..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use tracker_core::PricePoint;

    const EPS: f64 = 1e-9;

    fn series(values: &[f64]) -> Vec<ReturnPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                let date = start + chrono::Duration::days(i as i64);
                ReturnPoint::from_price(&PricePoint::new(date, 100.0 + r), r)
            })
            .collect()
    }

    #[test]
    fn test_sma_warmup_and_values() {
        let result = calculate_sma(&series(&[0.0, 10.0, 20.0, 30.0]), 3).unwrap();
        assert_eq!(result[0].sma_return_pct, None);
        assert_eq!(result[1].sma_return_pct, None);
        assert!((result[2].sma_return_pct.unwrap() - 10.0).abs() < EPS);
        assert!((result[3].sma_return_pct.unwrap() - 20.0).abs() < EPS);
    }

    #[test]
    fn test_sma_window_one_equals_returns() {
        let input = series(&[1.0, -2.0, 3.5]);
        let result = calculate_sma(&input, 1).unwrap();
        for (r, i) in result.iter().zip(&input) {
            assert_eq!(r.sma_return_pct, Some(i.return_pct));
        }
    }

    #[test]
    fn test_sma_shorter_than_window() {
        let result = calculate_sma(&series(&[1.0, 2.0]), 5).unwrap();
        assert!(result.iter().all(|r| r.sma_return_pct.is_none()));
    }

    #[test]
    fn test_sma_zero_window_rejected() {
        assert!(matches!(
            calculate_sma(&series(&[1.0]), 0),
            Err(TrackerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rebase_anchor_becomes_zero() {
        let input = calculate_sma(&series(&[0.0, 10.0, 21.0]), 2).unwrap();
        let rebased = rebase(&input, 1).unwrap();

        assert_eq!(rebased[1].return_pct, 0.0);
        assert!((rebased[2].return_pct - 10.0).abs() < EPS);
        assert!((rebased[0].return_pct - (1.0 / 1.1 - 1.0) * 100.0).abs() < EPS);
        // SMA도 같은 기준으로 리베이스: (1.05 / 1.1 - 1) * 100
        assert!((rebased[1].sma_return_pct.unwrap() - (1.05 / 1.1 - 1.0) * 100.0).abs() < EPS);
        assert_eq!(rebased[0].sma_return_pct, None);
    }

    #[test]
    fn test_rebase_errors() {
        assert!(rebase(&[], 3).unwrap().is_empty());
        assert!(rebase(&series(&[1.0]), 1).is_err());
        assert!(rebase(&series(&[-100.0, 5.0]), 0).is_err());
    }

    #[test]
    fn test_warmup_len_boundaries() {
        assert_eq!(warmup_len(0, 5), 0);
        assert_eq!(warmup_len(1, 5), 0);
        assert_eq!(warmup_len(3, 5), 2);
        assert_eq!(warmup_len(10, 5), 5);
        assert_eq!(warmup_len(10, 1), 1);
    }

    #[test]
    fn test_trim_warmup() {
        let trimmed = trim_warmup(&series(&[0.0, 1.0, 2.0, 3.0]), 2);
        assert_eq!(trimmed.len(), 2);
        assert_eq!(trimmed[0].return_pct, 2.0);
    }

    #[test]
    fn test_apply_sma_and_rebase_full() {
        let visible = apply_sma_and_rebase(&series(&[0.0, 10.0, 21.0, 33.1]), 2).unwrap();

        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(visible[0].return_pct, 0.0);
        assert!((visible[1].return_pct - 10.0).abs() < EPS);
        // 전체 시계열에서 계산된 SMA (10 + 21) / 2 = 15.5를 1.21 기준으로 리베이스
        let expected: f64 = (1.155 / 1.21 - 1.0) * 100.0;
        assert!((visible[0].sma_return_pct.unwrap() - expected).abs() < EPS);
    }

    #[test]
    fn test_apply_sma_and_rebase_empty() {
        assert!(apply_sma_and_rebase(&[], 3).unwrap().is_empty());
    }

    #[test]
    fn test_apply_sma_and_rebase_single_point() {
        let visible = apply_sma_and_rebase(&series(&[7.0]), 3).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].return_pct, 0.0);
        assert_eq!(visible[0].sma_return_pct, None);

        let visible = apply_sma_and_rebase(&series(&[7.0]), 1).unwrap();
        assert!(visible[0].sma_return_pct.unwrap().abs() < EPS);
    }

    #[test]
    fn test_apply_sma_and_rebase_shorter_than_window() {
        let visible = apply_sma_and_rebase(&series(&[0.0, 5.0, 10.0]), 5).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].return_pct, 0.0);
        assert_eq!(visible[0].sma_return_pct, None);

        // 길이 == window이면 마지막 포인트의 SMA가 존재
        let visible = apply_sma_and_rebase(&series(&[0.0, 5.0, 10.0]), 3).unwrap();
        assert_eq!(visible.len(), 1);
        assert!(visible[0].sma_return_pct.is_some());
    }

    proptest! {
        #[test]
        fn prop_rebase_at_zero_point_is_identity(
            values in prop::collection::vec(-80.0f64..400.0, 1..50),
        ) {
            // 첫 포인트를 0으로 만든 뒤 그 지점에서 리베이스
            let mut values = values;
            values[0] = 0.0;
            let input = calculate_sma(&series(&values), 3).unwrap();
            let rebased = rebase(&input, 0).unwrap();
            for (a, b) in rebased.iter().zip(&input) {
                prop_assert!((a.return_pct - b.return_pct).abs() < 1e-9);
                match (a.sma_return_pct, b.sma_return_pct) {
                    (Some(x), Some(y)) => prop_assert!((x - y).abs() < 1e-9),
                    (None, None) => {}
                    _ => prop_assert!(false, "SMA presence changed"),
                }
            }
        }

        #[test]
        fn prop_rebase_preserves_ratios(
            values in prop::collection::vec(-80.0f64..400.0, 2..50),
            pick in any::<prop::sample::Index>(),
            x in any::<prop::sample::Index>(),
            y in any::<prop::sample::Index>(),
        ) {
            let input = series(&values);
            let k = pick.index(values.len());
            let (x, y) = (x.index(values.len()), y.index(values.len()));
            let rebased = rebase(&input, k).unwrap();

            let old_ratio = input[x].gross() / input[y].gross();
            let new_ratio = rebased[x].gross() / rebased[y].gross();
            prop_assert!((old_ratio - new_ratio).abs() < 1e-9 * old_ratio.abs().max(1.0));
        }

        #[test]
        fn prop_sma_defined_after_warmup(
            values in prop::collection::vec(-50.0f64..200.0, 0..60),
            window in 1usize..20,
        ) {
            let result = calculate_sma(&series(&values), window).unwrap();
            for (i, point) in result.iter().enumerate() {
                if i + 1 < window {
                    prop_assert!(point.sma_return_pct.is_none());
                } else {
                    prop_assert!(point.sma_return_pct.map(f64::is_finite).unwrap_or(false));
                }
            }
        }

        #[test]
        fn prop_visible_starts_at_zero(
            values in prop::collection::vec(-50.0f64..200.0, 1..60),
            window in 1usize..20,
        ) {
            let visible = apply_sma_and_rebase(&series(&values), window).unwrap();
            prop_assert_eq!(visible.len(), values.len() - warmup_len(values.len(), window));
            prop_assert_eq!(visible[0].return_pct, 0.0);
        }
    }
}
