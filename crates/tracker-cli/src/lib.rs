//! 포트폴리오 수익률 트래커 CLI 라이브러리.
//!
//! 바이너리(`tracker`)와 통합 테스트가 명령어 구현을 공유합니다.

pub mod commands;
