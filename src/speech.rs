//! Workout voice cues
//!
//! Text is turned into speech by an ordered list of providers: a hosted
//! text-to-speech endpoint first, then the platform's own voice. Hosted
//! audio is cached by voice and text. When every provider fails the cue is
//! skipped; speech never fails a workout flow.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use url::Url;

use crate::config::SpeechConfig;
use crate::error::AppResult;
use crate::store;

// ---------------------------------------------------------------------------
/// Error Types
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Serialize)]
pub enum SpeechError {
  #[error("Request failed: {0}")]
  Request(String),

  #[error("Provider error: {0}")]
  Provider(String),

  #[error("Decode error: {0}")]
  Decode(String),

  #[error("Speech unavailable: {0}")]
  Unavailable(String),
}

// ---------------------------------------------------------------------------
/// Requests and Results
// ---------------------------------------------------------------------------

/// What the cue is for; the hosted voice adjusts its delivery to it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechContext {
  Exercise,
  Countdown,
  Rest,
  #[default]
  General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechRequest {
  pub text: String,
  pub voice: String,
  pub speed: f32,
  pub user_id: String,
  pub context: SpeechContext,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechOutput {
  /// Encoded audio (MP3) for the caller to play
  Audio(Vec<u8>),
  /// The provider already spoke the text
  Spoken,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeechOutcome {
  Audio {
    provider: String,
    #[serde(serialize_with = "serialize_audio")]
    audio: Vec<u8>,
    cached: bool,
  },
  Spoken {
    provider: String,
  },
  Skipped,
}

/// Audio goes to the webview as a playable data URL
fn serialize_audio<S: serde::Serializer>(audio: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_str(&format!("data:audio/mpeg;base64,{}", STANDARD.encode(audio)))
}

#[async_trait]
pub trait SpeechProvider: Send + Sync {
  fn name(&self) -> &str;

  async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechOutput, SpeechError>;
}

// ---------------------------------------------------------------------------
/// Hosted Provider
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct HostedSpeechResponse {
  success: bool,
  audio_url: Option<String>,
  error: Option<String>,
}

/// Decode a `data:<mime>;base64,<payload>` URL
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, SpeechError> {
  let (header, payload) = data_url
    .strip_prefix("data:")
    .and_then(|rest| rest.split_once(','))
    .ok_or_else(|| SpeechError::Decode("not a data URL".to_string()))?;

  if !header.ends_with(";base64") {
    return Err(SpeechError::Decode(format!("unsupported data URL encoding: {}", header)));
  }

  STANDARD
    .decode(payload.trim())
    .map_err(|e| SpeechError::Decode(e.to_string()))
}

pub struct HostedSpeechProvider {
  client: Client,
  endpoint: Url,
  api_key: Option<String>,
}

impl HostedSpeechProvider {
  pub fn new(endpoint: Url, api_key: Option<String>) -> Self {
    Self {
      client: Client::new(),
      endpoint,
      api_key,
    }
  }

  /// None when no endpoint is configured
  pub fn from_config(config: &SpeechConfig) -> Option<Self> {
    config
      .endpoint
      .clone()
      .map(|endpoint| Self::new(endpoint, config.api_key.clone()))
  }
}

#[async_trait]
impl SpeechProvider for HostedSpeechProvider {
  fn name(&self) -> &str {
    "hosted"
  }

  async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechOutput, SpeechError> {
    let mut builder = self.client.post(self.endpoint.clone()).json(request);
    if let Some(key) = &self.api_key {
      builder = builder.bearer_auth(key);
    }

    let response = builder
      .send()
      .await
      .map_err(|e| SpeechError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| SpeechError::Request(e.to_string()))?;

    let parsed = serde_json::from_str::<HostedSpeechResponse>(&body);

    if !status.is_success() {
      let message = parsed
        .ok()
        .and_then(|r| r.error)
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body));
      return Err(SpeechError::Provider(message));
    }

    let parsed = parsed.map_err(|e| SpeechError::Decode(e.to_string()))?;

    if !parsed.success {
      return Err(SpeechError::Provider(
        parsed.error.unwrap_or_else(|| "speech generation failed".to_string()),
      ));
    }

    let audio_url = parsed
      .audio_url
      .ok_or_else(|| SpeechError::Decode("response has no audio_url".to_string()))?;

    decode_data_url(&audio_url).map(SpeechOutput::Audio)
  }
}

// ---------------------------------------------------------------------------
/// Platform Provider
// ---------------------------------------------------------------------------

/// The host's built-in speech engine (webview or OS voice)
pub trait SpeechSynthesisPort: Send + Sync {
  fn is_available(&self) -> bool;

  /// Speak `text` at `rate` (1.0 is normal speed)
  fn speak(&self, text: &str, rate: f32) -> Result<(), String>;
}

pub struct PlatformSpeechProvider<P: SpeechSynthesisPort> {
  port: P,
}

impl<P: SpeechSynthesisPort> PlatformSpeechProvider<P> {
  pub fn new(port: P) -> Self {
    Self { port }
  }
}

#[async_trait]
impl<P: SpeechSynthesisPort> SpeechProvider for PlatformSpeechProvider<P> {
  fn name(&self) -> &str {
    "platform"
  }

  async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechOutput, SpeechError> {
    if !self.port.is_available() {
      return Err(SpeechError::Unavailable("platform speech engine not present".to_string()));
    }

    self
      .port
      .speak(&request.text, request.speed)
      .map(|_| SpeechOutput::Spoken)
      .map_err(SpeechError::Provider)
  }
}

// ---------------------------------------------------------------------------
/// Audio Cache
// ---------------------------------------------------------------------------

#[async_trait]
pub trait KeyValueStore: Send + Sync {
  async fn get(&self, key: &str) -> AppResult<Option<String>>;
  async fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
  async fn get(&self, key: &str) -> AppResult<Option<String>> {
    let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
    Ok(entries.get(key).cloned())
  }

  async fn set(&self, key: &str, value: &str) -> AppResult<()> {
    let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
    entries.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

pub struct SqliteKeyValueStore {
  pool: SqlitePool,
}

impl SqliteKeyValueStore {
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
  async fn get(&self, key: &str) -> AppResult<Option<String>> {
    store::kv_get(&self.pool, key).await
  }

  async fn set(&self, key: &str, value: &str) -> AppResult<()> {
    store::kv_set(&self.pool, key, value).await
  }
}

/// `"{voice}_{base64(text)}"` with `/`, `+` and `=` stripped from the encoding
pub fn cache_key(voice: &str, text: &str) -> String {
  let encoded: String = STANDARD
    .encode(text)
    .chars()
    .filter(|c| !matches!(c, '/' | '+' | '='))
    .collect();
  format!("{}_{}", voice, encoded)
}

// ---------------------------------------------------------------------------
/// Provider Chain
// ---------------------------------------------------------------------------

pub struct SpeechChain {
  providers: Vec<Box<dyn SpeechProvider>>,
  cache: Option<Arc<dyn KeyValueStore>>,
}

impl SpeechChain {
  pub fn new(providers: Vec<Box<dyn SpeechProvider>>, cache: Option<Arc<dyn KeyValueStore>>) -> Self {
    Self { providers, cache }
  }

  pub fn provider_names(&self) -> Vec<&str> {
    self.providers.iter().map(|p| p.name()).collect()
  }

  async fn cached_audio(&self, cache: &dyn KeyValueStore, key: &str) -> Option<Vec<u8>> {
    match cache.get(key).await {
      Ok(Some(encoded)) => match STANDARD.decode(encoded) {
        Ok(audio) => Some(audio),
        Err(e) => {
          tracing::warn!(key, error = %e, "discarding unreadable cached audio");
          None
        }
      },
      Ok(None) => None,
      Err(e) => {
        tracing::warn!(key, error = %e, "speech cache lookup failed");
        None
      }
    }
  }

  /// Speak `request` with the first provider that succeeds
  pub async fn speak(&self, request: &SpeechRequest) -> SpeechOutcome {
    let key = cache_key(&request.voice, &request.text);

    if let Some(cache) = &self.cache {
      if let Some(audio) = self.cached_audio(cache.as_ref(), &key).await {
        tracing::debug!(key, "speech cache hit");
        return SpeechOutcome::Audio {
          provider: "cache".to_string(),
          audio,
          cached: true,
        };
      }
    }

    for provider in &self.providers {
      match provider.synthesize(request).await {
        Ok(SpeechOutput::Audio(audio)) => {
          if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&key, &STANDARD.encode(&audio)).await {
              tracing::warn!(key, error = %e, "failed to cache speech audio");
            }
          }
          return SpeechOutcome::Audio {
            provider: provider.name().to_string(),
            audio,
            cached: false,
          };
        }
        Ok(SpeechOutput::Spoken) => {
          return SpeechOutcome::Spoken {
            provider: provider.name().to_string(),
          };
        }
        Err(e) => {
          tracing::warn!(provider = provider.name(), error = %e, "speech provider failed, trying next");
        }
      }
    }

    tracing::info!(context = ?request.context, "no speech provider available, cue skipped");
    SpeechOutcome::Skipped
  }
}
