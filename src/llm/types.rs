use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Openai,
    Anthropic,
    Gemini,
    AzureOpenai,
    Langdock,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Openai => "openai",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Gemini => "gemini",
            LlmProvider::AzureOpenai => "azure_openai",
            LlmProvider::Langdock => "langdock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureConfig {
    pub api_version: String,
    pub azure_endpoint: String,
    pub deployment_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LangdockRegion {
    Eu,
    Us,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangdockConfig {
    pub region: LangdockRegion,
}

/// Provider/credential configuration attached to every remote call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_config: Option<AzureConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub langdock_config: Option<LangdockConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFieldType {
    String,
    Number,
    Date,
    Boolean,
    ListStr,
    Enum,
    MultiSelect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FormFieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTemplate {
    pub id: String,
    pub name: String,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillFormRequest {
    #[serde(flatten)]
    pub llm: LlmConfig,
    pub transcript: String,
    pub fields: Vec<FormField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_values: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillFormResponse {
    pub values: Map<String, Value>,
}

/// The identity+text pair actually sent for evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionPrompt {
    pub id: String,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateQuestionsRequest {
    #[serde(flatten)]
    pub llm: LlmConfig,
    pub transcript: String,
    pub questions: Vec<QuestionPrompt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionEvaluation {
    pub id: String,
    pub answered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateQuestionsResponse {
    pub evaluations: Vec<QuestionEvaluation>,
}
