//! # moodlens-app
//!
//! moodlens 바이너리 진입점.
//! 설정 로드, 검출기 생성(DI), 웹 서버 실행, 단일 이미지 검출.

mod lifecycle;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use moodlens_core::config::{AppConfig, DetectorBackend, DetectorConfig};
use moodlens_core::config_loader::{default_config_path, ConfigLoader};
use moodlens_core::error::CoreError;
use moodlens_core::overlay::OverlayPlan;
use moodlens_core::ports::detector::EmotionDetector;
use moodlens_network::remote_detector::RemoteEmotionDetector;
use moodlens_vision::annotate::save_annotated;
use moodlens_vision::decode::decode_image;
use moodlens_web::WebServer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::lifecycle::LifecycleManager;

/// 웹캠 실시간 감정 검출 서버
#[derive(Parser, Debug)]
#[command(name = "moodlens")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (JSON, 미지정 시 플랫폼 설정 디렉토리)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 감정 검출 서버 실행 (기본 동작)
    Serve(ServeArgs),
    /// 이미지 한 장에서 감정 검출
    Detect(DetectArgs),
}

#[derive(clap::Args, Debug, Default)]
struct ServeArgs {
    /// 서버 포트 (기본: 5000)
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// 외부 접근 허용 (0.0.0.0 바인드)
    #[arg(long)]
    allow_external: bool,

    /// 원격 검출 서비스 URL (지정 시 remote 백엔드 사용)
    #[arg(long)]
    detector_url: Option<String>,
}

#[derive(clap::Args, Debug)]
struct DetectArgs {
    /// 입력 이미지 경로
    image: PathBuf,

    /// 오버레이를 그린 이미지 저장 경로
    #[arg(long)]
    annotate: Option<PathBuf>,
}

/// 설정 로드 (기본값 → 설정 파일 → 환경변수)
fn load_config(explicit: Option<&PathBuf>) -> Result<AppConfig> {
    let loader = match explicit {
        Some(path) => ConfigLoader::new().with_file(path),
        None => match default_config_path() {
            Some(path) => ConfigLoader::new().with_optional_file(path),
            None => ConfigLoader::new(),
        },
    };
    Ok(loader.load()?)
}

/// 설정된 백엔드로 검출기 생성
fn build_detector(config: &DetectorConfig) -> Result<Arc<dyn EmotionDetector>> {
    match config.backend {
        DetectorBackend::Remote => {
            let detector = RemoteEmotionDetector::new(&config.remote, config.timeout())?;
            Ok(Arc::new(detector))
        }
        DetectorBackend::Onnx => build_onnx_detector(config),
    }
}

#[cfg(feature = "onnx")]
fn build_onnx_detector(config: &DetectorConfig) -> Result<Arc<dyn EmotionDetector>> {
    let detector = moodlens_vision::onnx_detector::OnnxEmotionDetector::new(&config.onnx)?;
    Ok(Arc::new(detector))
}

#[cfg(not(feature = "onnx"))]
fn build_onnx_detector(_config: &DetectorConfig) -> Result<Arc<dyn EmotionDetector>> {
    Err(anyhow!(
        "onnx 백엔드는 `onnx` feature로 빌드해야 합니다 (cargo build --features onnx)"
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // tracing 초기화 (stdout은 detect 결과용)
    let log_filter = [
        "moodlens",
        "moodlens_app",
        "moodlens_core",
        "moodlens_vision",
        "moodlens_network",
        "moodlens_web",
        "tower_http",
    ]
    .iter()
    .map(|target| format!("{}={}", target, args.log_level))
    .collect::<Vec<_>>()
    .join(",");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(args.config.as_ref())?;
    debug!(?config, "설정 로드 완료");

    match args.command {
        Some(Command::Detect(detect_args)) => detect(config, detect_args).await,
        Some(Command::Serve(serve_args)) => serve(config, serve_args).await,
        None => serve(config, ServeArgs::default()).await,
    }
}

/// 감정 검출 서버 실행
async fn serve(mut config: AppConfig, args: ServeArgs) -> Result<()> {
    // CLI 인자로 설정 오버라이드
    if let Some(port) = args.port {
        config.web.port = port;
    }
    if args.allow_external {
        config.web.allow_external = true;
    }
    if let Some(url) = args.detector_url {
        config.detector.backend = DetectorBackend::Remote;
        config.detector.remote.endpoint = url;
    }
    config.validate()?;

    info!("moodlens 시작");

    let detector = build_detector(&config.detector)?;
    info!(
        detector = detector.detector_name(),
        timeout_ms = config.detector.timeout_ms,
        "검출기 준비 완료"
    );

    let lifecycle = LifecycleManager::new();
    let server = WebServer::new(detector, config.web.clone(), config.detector.timeout());
    info!("클라이언트: {}", server.url());

    let mut web_handle = tokio::spawn(server.run(lifecycle.subscribe()));

    // 시그널 수신 또는 서버 조기 종료 (바인드 실패 등)
    let finished = tokio::select! {
        signal = lifecycle.wait_for_signal() => {
            signal.context("시그널 핸들러 등록 실패")?;
            None
        }
        result = &mut web_handle => Some(result),
    };

    let result = match finished {
        Some(result) => result,
        None => web_handle.await,
    };
    result
        .map_err(|e| anyhow!("웹 서버 태스크 실패: {}", e))?
        .context("웹 서버 실행 실패")?;

    info!("moodlens 종료");
    Ok(())
}

/// 이미지 한 장 검출: JSON 결과는 stdout, 요약은 stderr
async fn detect(config: AppConfig, args: DetectArgs) -> Result<()> {
    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("이미지 읽기 실패: {}", args.image.display()))?;

    let frame = tokio::task::spawn_blocking(move || decode_image(&bytes)).await??;
    let detector = build_detector(&config.detector)?;

    let detections = tokio::time::timeout(
        config.detector.timeout(),
        detector.detect_emotions(frame.clone()),
    )
    .await
    .map_err(|_| CoreError::Timeout {
        timeout_ms: config.detector.timeout_ms,
    })??;

    println!("{}", serde_json::to_string_pretty(&detections)?);

    let plan = OverlayPlan::from_detections(&detections);
    eprintln!("{}", plan.status);

    if let Some(out) = args.annotate {
        let annotate_path = out.clone();
        tokio::task::spawn_blocking(move || save_annotated(&frame, &plan, &annotate_path))
            .await??;
        info!(path = %out.display(), "주석 이미지 저장");
    }

    Ok(())
}
