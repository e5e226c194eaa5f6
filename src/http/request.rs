use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /v1/chat/completions`; always requests a streamed response.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    stream: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
        }
    }
}

#[cfg(test)]
mod request_tests {
    use serde_json::json;

    use super::{ChatMessage, ChatRequest};

    #[test]
    fn serializes_streaming_chat_body() {
        let request = ChatRequest::new(
            "demo",
            vec![ChatMessage::system("be brief"), ChatMessage::user("Say hi")],
        );
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "demo",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "Say hi"}
                ],
                "stream": true
            })
        );
    }
}
