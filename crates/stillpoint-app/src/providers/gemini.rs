//! Gemini API provider
//!
//! Implementation of `MeditationModel` for the Google Generative Language
//! API (<https://ai.google.dev/>), using the REST `generateContent`
//! endpoints for text, image, and speech.

use crate::config::gemini::{API_BASE, DEFAULT_VOICE, IMAGE_MODEL, TEXT_MODEL, TTS_MODEL};
use crate::config::prompts::{IMAGE_PROMPT_SYSTEM, SCRIPT_SYSTEM, SPEECH_STYLE};
use crate::error::{AppError, Result};
use crate::network::HttpClient;

use super::traits::MeditationModel;
use super::types::GeneratedImage;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

// =============================================================================
// Internal API request/response types (serde)
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

// =============================================================================
// Response extraction helpers
// =============================================================================

impl GenerateResponse {
    /// First non-empty text part across all candidates, trimmed
    fn first_text(&self) -> Option<String> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .map(str::trim)
            .find(|text| !text.is_empty())
            .map(str::to_string)
    }

    /// First inline data part across all candidates
    fn first_inline_data(&self) -> Option<&InlineData> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .find_map(|part| part.inline_data.as_ref())
    }

    /// Block reason, if the prompt was rejected outright
    fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }
}

/// Build a user turn with a single text part
fn user_content(text: &str) -> Content {
    Content {
        role: Some("user".to_string()),
        parts: vec![Part {
            text: Some(text.to_string()),
            inline_data: None,
        }],
    }
}

/// Build a system instruction (no role, single text part)
fn system_content(text: &str) -> Content {
    Content {
        role: None,
        parts: vec![Part {
            text: Some(text.to_string()),
            inline_data: None,
        }],
    }
}

// =============================================================================
// GeminiProvider
// =============================================================================

/// Gemini API provider
///
/// Calls the hosted Gemini models over REST. Each session artifact uses a
/// dedicated model: a text model for scripts and image prompts, an image
/// model for the scene, and a TTS model for narration.
pub struct GeminiProvider {
    client: HttpClient,
    api_key: String,
    voice: String,
}

impl GeminiProvider {
    /// Create a provider with the given API key and the default voice
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            api_key: api_key.into(),
            voice: DEFAULT_VOICE.to_string(),
        })
    }

    /// Use a different prebuilt narration voice
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Build a generateContent URL for a model, with the API key attached
    fn url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            API_BASE, model, self.api_key
        )
    }

    /// POST a request and surface API-level rejections as provider errors
    fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        let resp: GenerateResponse = self.client.post_json(&self.url(model), request)?;
        if let Some(reason) = resp.block_reason() {
            return Err(AppError::Provider(format!("request blocked: {reason}")));
        }
        Ok(resp)
    }
}

impl MeditationModel for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn generate_script(&self, feeling: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![user_content(feeling)],
            system_instruction: Some(system_content(SCRIPT_SYSTEM)),
            generation_config: None,
        };
        let resp = self.generate(TEXT_MODEL, &request)?;
        resp.first_text()
            .ok_or_else(|| AppError::Provider("script response contained no text".to_string()))
    }

    fn generate_image(&self, script: &str) -> Result<GeneratedImage> {
        // Distill the script into a one-sentence scene description first,
        // then feed that to the image model.
        let prompt_request = GenerateRequest {
            contents: vec![user_content(script)],
            system_instruction: Some(system_content(IMAGE_PROMPT_SYSTEM)),
            generation_config: None,
        };
        let prompt = self
            .generate(TEXT_MODEL, &prompt_request)?
            .first_text()
            .ok_or_else(|| {
                AppError::Provider("image prompt response contained no text".to_string())
            })?;

        let image_request = GenerateRequest {
            contents: vec![user_content(&prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
                speech_config: None,
            }),
        };
        let resp = self.generate(IMAGE_MODEL, &image_request)?;
        let inline = resp.first_inline_data().ok_or_else(|| {
            AppError::Provider("image response contained no image data".to_string())
        })?;
        let bytes = STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| AppError::Provider(format!("image payload was not valid base64: {e}")))?;
        Ok(GeneratedImage::new(&inline.mime_type, bytes))
    }

    fn generate_speech(&self, script: &str) -> Result<String> {
        let text = format!("{}{}", SPEECH_STYLE, script);
        let request = GenerateRequest {
            contents: vec![user_content(&text)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO"],
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: self.voice.clone(),
                        },
                    },
                }),
            }),
        };
        let resp = self.generate(TTS_MODEL, &request)?;
        let inline = resp.first_inline_data().ok_or_else(|| {
            AppError::Provider("speech response contained no audio data".to_string())
        })?;
        Ok(inline.data.clone())
    }
}

// =============================================================================
// Tests
// =============================================================================
