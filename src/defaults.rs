//! Default configuration constants for deco.
//!
//! Shared by the configuration types, the chunk planner and the cloud
//! clients so the numbers live in exactly one place.

/// Hard ceiling on the UTF-8 size of one synthesis request.
///
/// Google Cloud Text-to-Speech rejects `input.text` above 5000 bytes.
pub const MAX_SYNTHESIS_BYTES: usize = 5000;

/// Smallest accepted chunk size.
///
/// Four bytes is the widest UTF-8 scalar, so every window holds at least
/// one character.
pub const MIN_CHUNK_BYTES: usize = 4;

/// Default chunk size in bytes for synthesis requests.
pub const DEFAULT_CHUNK_BYTES: usize = 1000;

/// Default transcription model.
pub const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Default chat-completion model for cleanup and optimization.
pub const CHAT_MODEL: &str = "gpt-4o-mini";

/// Default OpenAI-compatible API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable that short-circuits gcloud token acquisition.
pub const GCLOUD_TOKEN_ENV: &str = "GCLOUD_ACCESS_TOKEN";

/// Default location of the gcloud SDK binary.
pub const GCLOUD_SDK_BIN: &str = "gcloud";

/// Google Cloud Text-to-Speech endpoint.
pub const GCLOUD_TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

/// Default voice language.
pub const VOICE_LANGUAGE: &str = "en-US";

/// Default voice name.
pub const VOICE_NAME: &str = "en-US-Studio-M";

/// Default synthesis sample rate in Hz.
pub const VOICE_SAMPLE_RATE: u32 = 16000;

/// Marker that opens a numbered section in the optimization response.
pub const SECTION_MARKER: &str = "###";

/// Section holding the rewritten text in the optimization response.
pub const SECTION_ID: &str = "3";

/// Default system prompt for the cleanup stage.
pub const CLEANUP_PROMPT: &str = "You are an editor. The user message is a raw document or \
speech transcript. Fix transcription errors, remove filler words and false starts, and correct \
punctuation. Keep the wording and meaning otherwise unchanged. Reply with the cleaned text only.";

/// Default system prompt for the optimization stage.
///
/// The reply format must keep a `### 3` heading, the extractor keys on it.
pub const OPTIMIZATION_PROMPT: &str = "You rewrite documents so they sound natural when read \
aloud by a speech synthesizer. Answer in exactly three sections.\n\
### 1 Analysis\nList what makes the text hard to listen to.\n\
### 2 Plan\nDescribe the changes you will make.\n\
### 3 Result\nThe rewritten text, ready to be spoken, with no commentary after it.";

/// Project-local configuration file, checked before the user config.
pub const LOCAL_CONFIG_FILE: &str = "deco.toml";

/// Trunk for extra outputs when both input and output are streams.
pub const STREAM_TRUNK: &str = "deco";

/// Capture file suffix for the transcript when extra outputs are enabled.
pub const TRANSCRIPT_SUFFIX: &str = "-trans.txt";

/// Capture file suffix for the cleanup result.
pub const CLEANUP_SUFFIX: &str = "-clean.txt";

/// Capture file suffix for the optimization result.
pub const OPTIMIZATION_SUFFIX: &str = "-optim.txt";

/// Clamp a requested chunk size into the range the synthesizer accepts.
pub fn clamp_chunk_bytes(requested: usize) -> usize {
    requested.clamp(MIN_CHUNK_BYTES, MAX_SYNTHESIS_BYTES)
}
