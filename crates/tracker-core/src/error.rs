//! 마켓 트래커의 에러 타입.
//!
//! 이 모듈은 분석 파이프라인 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 트래커 에러.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력 (호출자 전제조건 위반)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(String),

    /// 내부 에러 (로거 중복 초기화 등)
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 트래커 작업을 위한 Result 타입.
pub type TrackerResult<T> = Result<T, TrackerError>;

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Io(err.to_string())
    }
}

impl From<config::ConfigError> for TrackerError {
    fn from(err: config::ConfigError) -> Self {
        TrackerError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackerError::InvalidInput("start_index 5 out of range".to_string());
        assert_eq!(err.to_string(), "잘못된 입력: start_index 5 out of range");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "BTC.csv");
        let err: TrackerError = io.into();
        assert!(matches!(err, TrackerError::Io(_)));
    }
}
