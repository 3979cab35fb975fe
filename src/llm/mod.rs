//! Remote LLM service boundary: wire types, the HTTP client, and
//! credential assembly from stored settings.

mod client;
mod credentials;
mod templates;
mod types;

pub use client::{HttpLlmService, LlmService};
pub use credentials::{
    azure_config_from_store, langdock_config_from_store, llm_config_from_store, model_from_store,
};
pub use templates::{find_template, load_templates, save_templates};
pub use types::{
    AzureConfig, EvaluateQuestionsRequest, EvaluateQuestionsResponse, FillFormRequest,
    FillFormResponse, FormField, FormFieldType, FormTemplate, LangdockConfig, LangdockRegion,
    LlmConfig, LlmProvider, QuestionEvaluation, QuestionPrompt,
};
