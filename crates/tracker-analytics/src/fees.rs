//! 수수료 반영 모듈.
//!
//! 연간 수수료(보수)를 일 단위 복리 차감으로 수익률 시계열에 반영합니다.
//! 시계열의 각 인덱스를 하루로 취급하므로 주말 등 비거래일이 빠진 시계열에서도
//! 인덱스 기준으로 차감됩니다.

use tracker_core::ReturnPoint;

/// 연간 일수 (달력 기준).
pub const DAYS_PER_YEAR: f64 = 365.0;

/// 연간 수수료(%)를 일간 수수료율(소수)로 변환.
///
/// `daily = yearly_fee_pct / 100 / 365`
#[inline]
pub fn daily_fee_rate(yearly_fee_pct: f64) -> f64 {
    yearly_fee_pct / 100.0 / DAYS_PER_YEAR
}

/// `index`일 경과 후 누적 수수료 배수 `(1 - daily_rate)^index`.
#[inline]
pub fn fee_multiplier(daily_rate: f64, index: usize) -> f64 {
    (1.0 - daily_rate).powf(index as f64)
}

/// 수익률 시계열에 수수료 차감 적용.
///
/// 인덱스 `i`(입력 시계열 시작부터 0)에서 총수익 배수에 `(1 - daily)^i`를 곱합니다.
/// 이후 리베이스 여부와 상관없이 첫 포인트부터 복리로 누적됩니다.
///
/// # 인자
///
/// * `returns` - 수익률 시계열
/// * `yearly_fee_pct` - 연간 수수료 (%, 0 이상)
///
/// # 반환
///
/// 같은 길이의 새 시계열. 수수료가 0이거나 입력이 비어 있으면 입력 복사본.
pub fn apply_fees(returns: &[ReturnPoint], yearly_fee_pct: f64) -> Vec<ReturnPoint> {
    if yearly_fee_pct == 0.0 || returns.is_empty() {
        return returns.to_vec();
    }

    let daily = daily_fee_rate(yearly_fee_pct);

    returns
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let net = point.gross() * fee_multiplier(daily, i);
            point.with_return((net - 1.0) * 100.0)
        })
        .collect()
}
