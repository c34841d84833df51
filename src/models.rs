//! Data models and structures
//!
//! Defines the poster field catalogue, the request/response records exchanged
//! over HTTP, and the service configuration.

use crate::{fields, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Key under which the text model returns a theme it invented.
pub const SUGGESTED_THEME_KEY: &str = "suggested_theme";

/// One piece of poster copy the user can ask for.
///
/// Discriminants follow the canonical presentation order and index
/// [`FIELD_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PosterField {
    HeroHeadline = 0,
    HeroSubline = 1,
    Description = 2,
    Cta = 3,
    Testimonial = 4,
    SuccessMetrics = 5,
    TargetAudience = 6,
    CtaLink = 7,
}

/// Upper bound the text model is asked to respect for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthLimit {
    Tokens(u32),
    VeryShort,
}

/// Per-field metadata shared by both prompt composers.
#[derive(Debug)]
pub struct FieldSpec {
    pub field: PosterField,
    pub key: &'static str,
    pub limit: LengthLimit,
    pub shape: &'static str,
    pub zone: &'static str,
    pub treatment: &'static str,
}

pub static FIELD_TABLE: [FieldSpec; 8] = [
    FieldSpec {
        field: PosterField::HeroHeadline,
        key: "hero_headline",
        limit: LengthLimit::Tokens(12),
        shape: "short heading",
        zone: "Top center",
        treatment: "Large bold heading",
    },
    FieldSpec {
        field: PosterField::HeroSubline,
        key: "hero_subline",
        limit: LengthLimit::Tokens(15),
        shape: "short subheading",
        zone: "Just below the headline",
        treatment: "Smaller subheading",
    },
    FieldSpec {
        field: PosterField::Description,
        key: "description",
        limit: LengthLimit::Tokens(25),
        shape: "short paragraph",
        zone: "Center area",
        treatment: "Short paragraph",
    },
    FieldSpec {
        field: PosterField::Cta,
        key: "cta",
        limit: LengthLimit::VeryShort,
        shape: "short action phrase",
        zone: "Bottom center",
        treatment: "Button with the text",
    },
    FieldSpec {
        field: PosterField::Testimonial,
        key: "testimonial",
        limit: LengthLimit::Tokens(25),
        shape: "short single-quote remark",
        zone: "Lower section",
        treatment: "Italicized quote",
    },
    FieldSpec {
        field: PosterField::SuccessMetrics,
        key: "success_metrics",
        limit: LengthLimit::Tokens(20),
        shape: "pipe-separated stats",
        zone: "Bottom left",
        treatment: "Compact highlight of achievements",
    },
    FieldSpec {
        field: PosterField::TargetAudience,
        key: "target_audience",
        limit: LengthLimit::Tokens(15),
        shape: "short phrase",
        zone: "Bottom right",
        treatment: "Brief audience phrase",
    },
    FieldSpec {
        field: PosterField::CtaLink,
        key: "cta_link",
        limit: LengthLimit::VeryShort,
        shape: "short URL",
        zone: "Very bottom",
        treatment: "Minimal hyperlink",
    },
];

impl PosterField {
    /// All fields in canonical presentation order.
    pub const ALL: [PosterField; 8] = [
        PosterField::HeroHeadline,
        PosterField::HeroSubline,
        PosterField::Description,
        PosterField::Cta,
        PosterField::Testimonial,
        PosterField::SuccessMetrics,
        PosterField::TargetAudience,
        PosterField::CtaLink,
    ];

    pub fn spec(self) -> &'static FieldSpec {
        &FIELD_TABLE[self as usize]
    }

    /// Key used in provider replies and field mappings.
    pub fn key(self) -> &'static str {
        self.spec().key
    }

    /// Name of the request flag that selects this field.
    pub fn flag_key(self) -> String {
        format!("include_{}", self.key())
    }
}

impl fmt::Display for PosterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Flat field-name to text mapping produced by the text stage and consumed
/// by the image stage. A missing key means the field is left off the poster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(BTreeMap<String, String>);

impl FieldMapping {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn field(&self, field: PosterField) -> Option<&str> {
        self.get(field.key())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn suggested_theme(&self) -> Option<&str> {
        self.get(SUGGESTED_THEME_KEY)
    }
}

impl FromIterator<(String, String)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// How the text model should treat the poster's visual theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeDirective {
    /// Expand the user's rough theme into a detailed one.
    UserSupplied(String),
    /// Invent a theme from the main intent.
    Infer,
}

impl ThemeDirective {
    /// Blank or missing themes mean the model should infer one.
    pub fn from_optional(theme: Option<&str>) -> Self {
        match theme.map(str::trim) {
            Some(theme) if !theme.is_empty() => Self::UserSupplied(theme.to_string()),
            _ => Self::Infer,
        }
    }
}

/// Body of `POST /generate-fields`.
///
/// `include_*` flags are kept as raw JSON values because clients send them
/// loosely typed; they are coerced by [`fields::select_fields`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateFieldsRequest {
    pub main_prompt: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub custom_prompt: Option<String>,
    #[serde(flatten)]
    pub flags: serde_json::Map<String, serde_json::Value>,
}

/// Validated input to the text stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequest {
    main_intent: String,
    theme: ThemeDirective,
    fields: Vec<PosterField>,
    override_prompt: Option<String>,
}

impl FieldRequest {
    pub fn new(
        main_intent: impl Into<String>,
        theme: ThemeDirective,
        fields: Vec<PosterField>,
    ) -> Result<Self> {
        let main_intent = main_intent.into();
        if main_intent.trim().is_empty() {
            return Err(Error::Validation("main_prompt must not be empty".to_string()));
        }

        Ok(Self {
            main_intent,
            theme,
            fields,
            override_prompt: None,
        })
    }

    pub fn with_override_prompt(mut self, prompt: Option<String>) -> Self {
        self.override_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn main_intent(&self) -> &str {
        &self.main_intent
    }

    pub fn theme(&self) -> &ThemeDirective {
        &self.theme
    }

    pub fn fields(&self) -> &[PosterField] {
        &self.fields
    }

    /// Reserved; not used when composing prompts yet.
    pub fn override_prompt(&self) -> Option<&str> {
        self.override_prompt.as_deref()
    }
}

impl TryFrom<GenerateFieldsRequest> for FieldRequest {
    type Error = Error;

    fn try_from(request: GenerateFieldsRequest) -> Result<Self> {
        let selected = fields::select_fields(&request.flags);
        Ok(Self::new(
            request.main_prompt,
            ThemeDirective::from_optional(request.theme.as_deref()),
            selected,
        )?
        .with_override_prompt(request.custom_prompt))
    }
}

/// Body of `POST /generate-poster`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePosterRequest {
    pub fields: FieldMapping,
    #[serde(default)]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateFieldsResponse {
    pub status: String,
    pub data: FieldMapping,
    pub message: String,
}

impl GenerateFieldsResponse {
    pub fn success(data: FieldMapping) -> Self {
        Self {
            status: "success".to_string(),
            data,
            message: "Poster fields generated.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePosterResponse {
    pub status: String,
    pub image_base64: String,
    pub mime_type: String,
    pub message: String,
}

impl GeneratePosterResponse {
    pub fn success(image_base64: String, mime_type: &str) -> Self {
        Self {
            status: "success".to_string(),
            image_base64,
            mime_type: mime_type.to_string(),
            message: "Poster image generated successfully.".to_string(),
        }
    }
}

// Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Groq,
    OpenAi,
    Gemini,
}

impl AiProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            AiProvider::Groq => "groq",
            AiProvider::OpenAi => "openai",
            AiProvider::Gemini => "gemini",
        }
    }

    fn default_text_model(self) -> &'static str {
        match self {
            AiProvider::Groq => "llama3-70b-8192",
            AiProvider::OpenAi => "gpt-4o-mini",
            AiProvider::Gemini => "gemini-2.5-flash",
        }
    }

    fn default_image_model(self) -> Option<&'static str> {
        match self {
            AiProvider::Groq => None,
            AiProvider::OpenAi => Some("gpt-image-1"),
            AiProvider::Gemini => Some("gemini-2.5-flash-image"),
        }
    }

    fn api_key_var(self) -> &'static str {
        match self {
            AiProvider::Groq => "GROQ_API_KEY",
            AiProvider::OpenAi => "OPENAI_API_KEY",
            AiProvider::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(AiProvider::Groq),
            "openai" => Ok(AiProvider::OpenAi),
            "gemini" => Ok(AiProvider::Gemini),
            other => Err(Error::Config(format!(
                "Unknown AI provider '{}'. Expected one of: groq, openai, gemini",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub text_provider: AiProvider,
    pub text_model: String,
    pub text_temperature: f32,
    pub image_provider: AiProvider,
    pub image_model: String,
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("Invalid BIND_ADDR: {}", e)))?;

        let text_provider = match var("TEXT_PROVIDER") {
            Some(value) => value.parse()?,
            None => AiProvider::Groq,
        };
        let image_provider = match var("IMAGE_PROVIDER") {
            Some(value) => value.parse()?,
            None => AiProvider::Gemini,
        };

        let text_model =
            var("TEXT_MODEL").unwrap_or_else(|| text_provider.default_text_model().to_string());
        let default_image_model = image_provider.default_image_model().ok_or_else(|| {
            Error::Config(format!(
                "{} does not support image generation",
                image_provider
            ))
        })?;
        let image_model = var("IMAGE_MODEL").unwrap_or_else(|| default_image_model.to_string());

        let text_temperature = match var("TEXT_TEMPERATURE") {
            Some(value) => value
                .parse::<f32>()
                .map_err(|e| Error::Config(format!("Invalid TEXT_TEMPERATURE: {}", e)))?,
            None => 0.7,
        };

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty() && *origin != "*")
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let config = Self {
            bind_addr,
            text_provider,
            text_model,
            text_temperature,
            image_provider,
            image_model,
            groq_api_key: var("GROQ_API_KEY"),
            openai_api_key: var("OPENAI_API_KEY"),
            gemini_api_key: var("GEMINI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL"),
            cors_allowed_origins,
        };

        config.api_key_for(config.text_provider)?;
        config.api_key_for(config.image_provider)?;

        Ok(config)
    }

    pub fn api_key_for(&self, provider: AiProvider) -> Result<String> {
        let key = match provider {
            AiProvider::Groq => &self.groq_api_key,
            AiProvider::OpenAi => &self.openai_api_key,
            AiProvider::Gemini => &self.gemini_api_key,
        };
        key.clone()
            .ok_or_else(|| Error::Config(format!("{} not set", provider.api_key_var())))
    }
}
