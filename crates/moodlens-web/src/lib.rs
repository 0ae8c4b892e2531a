//! # moodlens-web
//!
//! 감정 검출 웹 서버.
//! Axum 기반 `/predict` 엔드포인트 + 캡처 클라이언트 임베드.
//!
//! ## 기능
//! - 업로드 이미지 감정 검출 (`POST /predict`)
//! - 상태 확인 (`GET /health`)
//! - 캡처/오버레이 클라이언트 서빙 (`GET /`)

pub mod embedded;
pub mod error;
pub mod handlers;
pub mod routes;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use moodlens_core::config::WebConfig;
use moodlens_core::ports::detector::EmotionDetector;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// 포트 바인드 최대 시도 횟수
const MAX_PORT_ATTEMPTS: u16 = 10;

/// 웹 서버 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    /// 감정 검출기 (프로세스 전체 공유, 읽기 전용)
    pub detector: Arc<dyn EmotionDetector>,
    /// 요청당 검출 타임아웃
    pub detect_timeout: Duration,
}

/// 라우터 구성.
///
/// 업로드 한도는 `web.max_upload_bytes`로 제한한다.
/// 핸들러 패닉은 500 에러 본문으로 변환된다.
pub fn router(state: AppState, config: &WebConfig) -> Router {
    Router::new()
        .merge(routes::app_routes())
        .fallback(embedded::serve_static)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 감정 검출 웹 서버
pub struct WebServer {
    config: WebConfig,
    state: AppState,
}

impl WebServer {
    /// 새 웹 서버 생성
    pub fn new(
        detector: Arc<dyn EmotionDetector>,
        config: WebConfig,
        detect_timeout: Duration,
    ) -> Self {
        Self {
            config,
            state: AppState {
                detector,
                detect_timeout,
            },
        }
    }

    /// 서버 실행
    ///
    /// 기본 포트에서 시작하여, 포트가 이미 사용 중이면 다음 포트를 시도합니다.
    /// 최대 10개 포트를 시도한 후 실패하면 에러를 반환합니다.
    ///
    /// # Arguments
    /// * `shutdown_rx` - 종료 신호 수신 채널
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<(), std::io::Error> {
        let host = self.config.host();
        let app = router(self.state, &self.config);

        let base_port = self.config.port;
        let mut last_error = None;

        for attempt in 0..MAX_PORT_ATTEMPTS {
            // 포트 오버플로우 체크
            let Some(port) = base_port.checked_add(attempt) else {
                break;
            };

            let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
                Ok(a) => a,
                Err(e) => {
                    error!("잘못된 주소 {}:{}: {}", host, port, e);
                    continue;
                }
            };

            match TcpListener::bind(addr).await {
                Ok(listener) => {
                    if attempt > 0 {
                        warn!("포트 {} 사용 불가, 대체 포트 {} 사용", base_port, port);
                    }
                    info!("감정 검출 서버 시작: http://{}", addr);

                    axum::serve(listener, app)
                        .with_graceful_shutdown(async move {
                            loop {
                                if *shutdown_rx.borrow() {
                                    info!("웹 서버 종료 신호 수신");
                                    break;
                                }
                                if shutdown_rx.changed().await.is_err() {
                                    break;
                                }
                            }
                        })
                        .await?;

                    info!("감정 검출 서버 종료");
                    return Ok(());
                }
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::AddrInUse {
                        warn!("포트 {} 이미 사용 중, 다음 포트 시도...", port);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                format!(
                    "포트 {}-{} 모두 사용 불가",
                    base_port,
                    base_port.saturating_add(MAX_PORT_ATTEMPTS - 1)
                ),
            )
        }))
    }

    /// 서버 URL 반환
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.config.port)
    }
}
