//! # Tracker Core
//!
//! 마켓 트래커의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! - 가격/수익률 시계열 타입 (`PricePoint`, `ReturnPoint`, `AssetSeries`)
//! - 에러 타입
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
