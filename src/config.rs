use crate::defaults;
use crate::error::{DecoError, Result};
use crate::text::ChunkPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub transcription: TranscriptionConfig,
    pub cleanup: CleanupConfig,
    pub optimization: OptimizationConfig,
    pub speech_synthesis: SpeechSynthesisConfig,
    pub openai: OpenAiConfig,
}

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub model: String,
    pub output_file: Option<PathBuf>,
}

/// Cleanup stage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleanupConfig {
    pub skip: bool,
    pub prompt: String,
    pub model: String,
    pub output_file: Option<PathBuf>,
}

/// Optimization stage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptimizationConfig {
    pub skip: bool,
    pub prompt: String,
    pub model: String,
    pub output_file: Option<PathBuf>,
}

/// Speech synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechSynthesisConfig {
    pub skip: bool,
    /// Requested chunk size in bytes, clamped before use.
    pub chunk_size: usize,
    pub chunk_policy: ChunkPolicy,
    /// Path to the gcloud binary. A leading `~/` is expanded.
    pub gcloud_sdk_bin: String,
    /// Billing project. Asked from the SDK when unset.
    pub gcloud_project: Option<String>,
    pub voice: VoiceConfig,
}

/// Voice selection and audio settings for Google Cloud TTS
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoiceConfig {
    pub language_code: String,
    pub name: String,
    pub ssml_gender: SsmlVoiceGender,
    pub audio_encoding: AudioEncoding,
    pub speaking_rate: f64,
    pub pitch: f64,
    pub volume_gain_db: f64,
    pub sample_rate_hertz: u32,
}

/// Output encodings offered by Google Cloud TTS
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    /// 16-bit signed little-endian PCM
    Linear16,
    #[default]
    Mp3,
    OggOpus,
    Mulaw,
    Alaw,
}

/// Voice gender hint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SsmlVoiceGender {
    #[default]
    #[serde(rename = "SSML_VOICE_GENDER_UNSPECIFIED")]
    Unspecified,
    Male,
    Female,
    Neutral,
}

/// OpenAI API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: defaults::TRANSCRIPTION_MODEL.to_string(),
            output_file: None,
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            skip: false,
            prompt: defaults::CLEANUP_PROMPT.to_string(),
            model: defaults::CHAT_MODEL.to_string(),
            output_file: None,
        }
    }
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            skip: false,
            prompt: defaults::OPTIMIZATION_PROMPT.to_string(),
            model: defaults::CHAT_MODEL.to_string(),
            output_file: None,
        }
    }
}

impl Default for SpeechSynthesisConfig {
    fn default() -> Self {
        Self {
            skip: false,
            chunk_size: defaults::DEFAULT_CHUNK_BYTES,
            chunk_policy: ChunkPolicy::default(),
            gcloud_sdk_bin: defaults::GCLOUD_SDK_BIN.to_string(),
            gcloud_project: None,
            voice: VoiceConfig::default(),
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language_code: defaults::VOICE_LANGUAGE.to_string(),
            name: defaults::VOICE_NAME.to_string(),
            ssml_gender: SsmlVoiceGender::default(),
            audio_encoding: AudioEncoding::default(),
            speaking_rate: 1.0,
            pitch: 0.0,
            volume_gain_db: 0.0,
            sample_rate_hertz: defaults::VOICE_SAMPLE_RATE,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENAI_BASE_URL.to_string(),
            api_key_env: defaults::OPENAI_API_KEY_ENV.to_string(),
        }
    }
}

impl SpeechSynthesisConfig {
    /// Chunk size after clamping to the provider limits.
    pub fn max_chunk_bytes(&self) -> usize {
        defaults::clamp_chunk_bytes(self.chunk_size)
    }

    /// `gcloud_sdk_bin` with a leading `~/` expanded to the home directory.
    pub fn gcloud_sdk_bin_path(&self) -> PathBuf {
        expand_home(&self.gcloud_sdk_bin)
    }
}

impl VoiceConfig {
    /// Speaking rate limited to 0.25..=4.0.
    pub fn clamped_speaking_rate(&self) -> f64 {
        self.speaking_rate.clamp(0.25, 4.0)
    }

    /// Pitch limited to -20..=20 semitones.
    pub fn clamped_pitch(&self) -> f64 {
        self.pitch.clamp(-20.0, 20.0)
    }

    /// Volume gain limited to -96..=16 dB.
    pub fn clamped_volume_gain_db(&self) -> f64 {
        self.volume_gain_db.clamp(-96.0, 16.0)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(DecoError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Locate and load the configuration.
    ///
    /// An explicit path must exist. Otherwise `./deco.toml`, then the
    /// user config file, then built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = Path::new(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::load(local);
        }

        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - DECO_TRANSCRIPTION_MODEL → transcription.model
    /// - DECO_CLEANUP_MODEL → cleanup.model
    /// - DECO_OPTIMIZATION_MODEL → optimization.model
    /// - DECO_GCLOUD_PROJECT → speech_synthesis.gcloud_project
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(model) = non_empty_env("DECO_TRANSCRIPTION_MODEL") {
            self.transcription.model = model;
        }

        if let Some(model) = non_empty_env("DECO_CLEANUP_MODEL") {
            self.cleanup.model = model;
        }

        if let Some(model) = non_empty_env("DECO_OPTIMIZATION_MODEL") {
            self.optimization.model = model;
        }

        if let Some(project) = non_empty_env("DECO_GCLOUD_PROJECT") {
            self.speech_synthesis.gcloud_project = Some(project);
        }

        self
    }

    /// Point every capture file at `<trunk>-trans.txt`, `<trunk>-clean.txt`
    /// and `<trunk>-optim.txt`.
    pub fn with_extra_outputs(mut self, trunk: &Path) -> Self {
        let with_suffix = |suffix: &str| {
            let mut name = trunk.as_os_str().to_owned();
            name.push(suffix);
            PathBuf::from(name)
        };

        self.transcription.output_file = Some(with_suffix(defaults::TRANSCRIPT_SUFFIX));
        self.cleanup.output_file = Some(with_suffix(defaults::CLEANUP_SUFFIX));
        self.optimization.output_file = Some(with_suffix(defaults::OPTIMIZATION_SUFFIX));
        self
    }

    /// Reject values no provider would accept.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, message: &str| DecoError::ConfigInvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.openai.api_key_env.trim().is_empty() {
            return Err(invalid("openai.api_key_env", "must name an environment variable"));
        }
        if self.speech_synthesis.gcloud_sdk_bin.trim().is_empty() {
            return Err(invalid("speech_synthesis.gcloud_sdk_bin", "must not be empty"));
        }
        if !(8000..=48000).contains(&self.speech_synthesis.voice.sample_rate_hertz) {
            return Err(invalid(
                "speech_synthesis.voice.sample_rate_hertz",
                "must be between 8000 and 48000",
            ));
        }
        for (key, model) in [
            ("transcription.model", &self.transcription.model),
            ("cleanup.model", &self.cleanup.model),
            ("optimization.model", &self.optimization.model),
        ] {
            if model.trim().is_empty() {
                return Err(invalid(key, "must not be empty"));
            }
        }
        Ok(())
    }

    /// Default configuration rendered as TOML.
    pub fn dump_default() -> Result<String> {
        toml::to_string_pretty(&Config::default())
            .map_err(|e| DecoError::Other(format!("Failed to render config: {e}")))
    }

    /// Get the user configuration file path
    ///
    /// Returns ~/.config/deco/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("deco").join("config.toml"))
    }
}

/// Load `.env` from the working directory or one of its parents.
///
/// Returns the file that was read, or `None` when there is no such file.
/// Variables already present in the environment keep their values.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Load `KEY=value` lines from `path` into the process environment.
pub fn load_env_file(path: &Path) -> Result<()> {
    dotenvy::from_path(path)?;
    Ok(())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
