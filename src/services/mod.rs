//! External collaborators: transcription, chat completion and speech
//! synthesis behind traits, plus the cloud clients that implement them.

pub mod chat;
pub mod format;
pub mod ingest;
pub mod synthesis;

#[cfg(feature = "cloud")]
pub mod gcloud;
#[cfg(feature = "cloud")]
pub mod openai;

pub use chat::{ChatCall, ChatService, Completion, MockChat};
pub use format::{AudioFormat, detect_audio_format};
pub use ingest::{AudioInput, IngestService, MockIngest};
pub use synthesis::{MockSynthesizer, SynthesisService, check_chunk};

#[cfg(feature = "cloud")]
pub use gcloud::{GcloudCredentials, GoogleTtsClient};
#[cfg(feature = "cloud")]
pub use openai::OpenAiClient;
