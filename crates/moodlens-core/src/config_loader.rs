//! 설정 로드.
//!
//! 우선순위 (뒤가 앞을 덮어씀):
//! 1. 내장 기본값 ([`AppConfig::default`])
//! 2. JSON 설정 파일 (`--config` 지정 시 필수, 아니면 플랫폼 설정 디렉토리에서 선택적)
//! 3. 환경변수 `MOODLENS__<섹션>__<키>` (예: `MOODLENS__WEB__PORT=8080`)
//!
//! CLI 플래그는 바이너리에서 마지막으로 적용한다.

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::CoreError;

/// 환경변수 접두사
pub const ENV_PREFIX: &str = "MOODLENS";

/// 환경변수 구분자 (`MOODLENS__WEB__PORT`)
pub const ENV_SEPARATOR: &str = "__";

/// 설정 파일 이름
const CONFIG_FILE_NAME: &str = "config.json";

/// 환경변수 맵 (테스트에서 프로세스 환경 대신 주입)
pub type EnvMap = config::Map<String, String>;

/// 플랫폼별 기본 설정 파일 경로
///
/// - Linux: `~/.config/moodlens/config.json`
/// - macOS: `~/Library/Application Support/com.moodlens.moodlens/config.json`
/// - Windows: `%APPDATA%\moodlens\moodlens\config\config.json`
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "moodlens", "moodlens").map(|p| p.config_dir().join(CONFIG_FILE_NAME))
}

/// 설정 로더
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    file_required: bool,
    env: Option<EnvMap>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 명시적 설정 파일 (없으면 로드 실패)
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self.file_required = true;
        self
    }

    /// 선택적 설정 파일 (없으면 무시)
    pub fn with_optional_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self.file_required = false;
        self
    }

    /// 프로세스 환경 대신 사용할 환경변수 맵
    pub fn with_env(mut self, env: EnvMap) -> Self {
        self.env = Some(env);
        self
    }

    /// 소스를 병합하여 검증된 설정 반환
    pub fn load(self) -> Result<AppConfig, CoreError> {
        let defaults = Config::try_from(&AppConfig::default())
            .map_err(|e| CoreError::Config(format!("기본 설정 직렬화 실패: {}", e)))?;

        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = &self.file {
            debug!(path = %path.display(), required = self.file_required, "설정 파일 소스");
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Json)
                    .required(self.file_required),
            );
        }

        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(self.env);
        builder = builder.add_source(env);

        let config: AppConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CoreError::Config(format!("설정 로드 실패: {}", e)))?;

        config.validate()?;
        Ok(config)
    }
}
