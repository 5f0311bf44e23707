use lexinsight_core::types::AnalysisProfile;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Body of an OpenAI-compatible streaming chat-completions request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// The user turn: the profile's prefix, a blank line, then the case.
pub fn build_user_prompt(profile: &AnalysisProfile, case_text: &str) -> String {
    if profile.user_prompt_prefix.is_empty() {
        return case_text.to_string();
    }
    format!("{}\n\n{}", profile.user_prompt_prefix, case_text)
}

pub fn build_request(profile: &AnalysisProfile, model: &str, case_text: &str) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(2);
    if !profile.system_prompt.is_empty() {
        messages.push(ChatMessage {
            role: "system".into(),
            content: profile.system_prompt.clone(),
        });
    }
    messages.push(ChatMessage {
        role: "user".into(),
        content: build_user_prompt(profile, case_text),
    });
    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        stream: true,
    }
}
