//! Typed response payloads for provider APIs.

pub mod gemini {
    use serde::Deserialize;

    /// Top-level `generateContent` response.
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Response {
        pub candidates: Option<Vec<Candidate>>,
        pub error: Option<ErrorInfo>,
        pub prompt_feedback: Option<PromptFeedback>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Candidate {
        pub content: Option<Content>,
        pub finish_reason: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Content {
        pub parts: Option<Vec<Part>>,
    }

    /// A content part in a Gemini response.
    #[derive(Debug, Deserialize)]
    pub struct Part {
        pub text: Option<String>,
        /// Whether this is thinking content
        #[serde(default)]
        pub thought: bool,
    }

    #[derive(Debug, Deserialize)]
    pub struct ErrorInfo {
        pub message: Option<String>,
    }

    impl ErrorInfo {
        #[must_use]
        pub fn message_or_default(&self) -> &str {
            self.message.as_deref().unwrap_or("Unknown error")
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PromptFeedback {
        pub block_reason: Option<String>,
    }
}
