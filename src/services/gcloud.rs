//! Google Cloud Text-to-Speech over REST.
//!
//! Authentication borrows the gcloud SDK's application-default
//! credentials. The token and project are resolved on the first
//! synthesis call and reused for the rest of the run.

use crate::config::{AudioEncoding, SpeechSynthesisConfig, SsmlVoiceGender, VoiceConfig};
use crate::defaults::{GCLOUD_TOKEN_ENV, GCLOUD_TTS_URL, MAX_SYNTHESIS_BYTES};
use crate::error::{DecoError, Result};
use crate::services::synthesis::{SynthesisService, check_chunk};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tokio::sync::OnceCell;

const SERVICE: &str = "Google Cloud TTS";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: TextInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioSettings,
}

#[derive(Debug, Serialize)]
struct TextInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
    ssml_gender: SsmlVoiceGender,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioSettings {
    audio_encoding: AudioEncoding,
    speaking_rate: f64,
    pitch: f64,
    volume_gain_db: f64,
    sample_rate_hertz: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Bearer token and billing project for the REST call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcloudCredentials {
    pub token: String,
    pub project: String,
}

/// Speech synthesis through Google Cloud Text-to-Speech.
#[derive(Debug)]
pub struct GoogleTtsClient {
    http: reqwest::Client,
    endpoint: String,
    voice: VoiceConfig,
    sdk_bin: PathBuf,
    project: Option<String>,
    credentials: OnceCell<GcloudCredentials>,
}

impl GoogleTtsClient {
    pub fn new(config: &SpeechSynthesisConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: GCLOUD_TTS_URL.to_string(),
            voice: config.voice.clone(),
            sdk_bin: config.gcloud_sdk_bin_path(),
            project: config.gcloud_project.clone().filter(|p| !p.is_empty()),
            credentials: OnceCell::new(),
        }
    }

    /// Use fixed credentials instead of asking the SDK.
    pub fn with_credentials(self, credentials: GcloudCredentials) -> Self {
        Self {
            credentials: OnceCell::new_with(Some(credentials)),
            ..self
        }
    }

    /// Override the REST endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn credentials(&self) -> Result<&GcloudCredentials> {
        self.credentials
            .get_or_try_init(|| async {
                let token = match std::env::var(GCLOUD_TOKEN_ENV) {
                    Ok(token) if !token.is_empty() => token,
                    _ => {
                        run_sdk(
                            &self.sdk_bin,
                            &["auth", "application-default", "print-access-token"],
                        )
                        .await?
                    }
                };
                let project = match &self.project {
                    Some(project) => project.clone(),
                    None => run_sdk(&self.sdk_bin, &["config", "get-value", "project"]).await?,
                };
                Ok::<_, DecoError>(GcloudCredentials { token, project })
            })
            .await
    }

    fn request_body(&self, text: &str) -> Result<Vec<u8>> {
        let request = SynthesizeRequest {
            input: TextInput { text },
            voice: VoiceSelection {
                language_code: &self.voice.language_code,
                name: &self.voice.name,
                ssml_gender: self.voice.ssml_gender,
            },
            audio_config: AudioSettings {
                audio_encoding: self.voice.audio_encoding,
                speaking_rate: self.voice.clamped_speaking_rate(),
                pitch: self.voice.clamped_pitch(),
                volume_gain_db: self.voice.clamped_volume_gain_db(),
                sample_rate_hertz: self.voice.sample_rate_hertz,
            },
        };
        serde_json::to_vec(&request)
            .map_err(|e| DecoError::Other(format!("Failed to encode synthesis request: {e}")))
    }
}

/// Run a gcloud subcommand and return its trimmed stdout.
async fn run_sdk(bin: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new(bin)
        .args(args)
        .output()
        .await
        .map_err(|e| DecoError::MissingCredentials {
            service: SERVICE.to_string(),
            message: format!(
                "could not run {} ({e}); set {GCLOUD_TOKEN_ENV} or install the gcloud SDK",
                bin.display()
            ),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() || stdout.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DecoError::MissingCredentials {
            service: SERVICE.to_string(),
            message: format!(
                "`{} {}` failed: {}",
                bin.display(),
                args.join(" "),
                stderr.trim()
            ),
        });
    }
    Ok(stdout)
}

fn decode_audio(body: &str) -> Result<Vec<u8>> {
    let response: SynthesizeResponse = serde_json::from_str(body)
        .map_err(|e| DecoError::http(SERVICE, format!("Failed to parse response: {e}")))?;
    STANDARD
        .decode(response.audio_content.as_bytes())
        .map_err(|e| DecoError::http(SERVICE, format!("Invalid audioContent: {e}")))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl SynthesisService for GoogleTtsClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        check_chunk(text, MAX_SYNTHESIS_BYTES)?;

        let body = self.request_body(text)?;
        let credentials = self.credentials().await?;

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&credentials.token)
            .header("X-Goog-User-Project", &credentials.project)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| DecoError::http(SERVICE, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DecoError::http(SERVICE, format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(DecoError::provider(
                SERVICE,
                status.as_u16(),
                error_message(&text),
            ));
        }
        decode_audio(&text)
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleTtsClient {
        GoogleTtsClient::new(&SpeechSynthesisConfig::default()).with_credentials(
            GcloudCredentials {
                token: "token".to_string(),
                project: "project".to_string(),
            },
        )
    }

    #[test]
    fn request_body_uses_camel_case_and_clamps() {
        let mut config = SpeechSynthesisConfig::default();
        config.voice.speaking_rate = 10.0;
        config.voice.audio_encoding = AudioEncoding::Linear16;
        let client = GoogleTtsClient::new(&config);

        let body: serde_json::Value =
            serde_json::from_slice(&client.request_body("Hello.").unwrap()).unwrap();

        assert_eq!(body["input"]["text"], "Hello.");
        assert_eq!(body["voice"]["languageCode"], "en-US");
        assert_eq!(body["voice"]["name"], "en-US-Studio-M");
        assert_eq!(body["voice"]["ssmlGender"], "SSML_VOICE_GENDER_UNSPECIFIED");
        assert_eq!(body["audioConfig"]["audioEncoding"], "LINEAR16");
        assert_eq!(body["audioConfig"]["speakingRate"], 4.0);
        assert_eq!(body["audioConfig"]["sampleRateHertz"], 16000);
        assert_eq!(body["audioConfig"]["volumeGainDb"], 0.0);
    }

    #[test]
    fn decodes_audio_content() {
        let body = r#"{"audioContent": "SUQzBAA="}"#;
        assert_eq!(decode_audio(body).unwrap(), b"ID3\x04\x00".to_vec());
    }

    #[test]
    fn invalid_base64_is_error() {
        let body = r#"{"audioContent": "***"}"#;
        assert!(decode_audio(body).is_err());
    }

    #[test]
    fn error_message_reads_google_envelope() {
        let body = r#"{"error": {"code": 403, "message": "Permission denied", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(error_message(body), "Permission denied");
    }

    #[tokio::test]
    async fn oversized_chunk_fails_before_request() {
        let client = client().with_endpoint("http://127.0.0.1:9/unreachable");
        let result = client.synthesize(&"a".repeat(MAX_SYNTHESIS_BYTES + 1)).await;
        assert!(matches!(
            result,
            Err(DecoError::ChunkTooLarge {
                bytes: 5001,
                limit: 5000
            })
        ));
    }

    #[tokio::test]
    async fn preset_credentials_skip_sdk() {
        let client = client();
        let credentials = client.credentials().await.unwrap();
        assert_eq!(credentials.token, "token");
        assert_eq!(credentials.project, "project");
    }

    #[tokio::test]
    async fn missing_sdk_binary_is_credentials_error() {
        let err = run_sdk(Path::new("/nonexistent/gcloud-binary"), &["version"])
            .await
            .unwrap_err();
        assert!(matches!(err, DecoError::MissingCredentials { .. }));
    }
}
