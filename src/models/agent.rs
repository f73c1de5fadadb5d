use serde::{ Serialize, Deserialize };
use serde_json::Value;

/// Payload sent to the demo agent.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct AgentRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl AgentRequest {
    pub fn new(message: String, conversation_id: Option<String>) -> Self {
        Self {
            message,
            conversation_id: conversation_id.filter(|id| !id.is_empty()),
        }
    }
}

/// Successful agent answer. Both fields are relayed as whatever JSON the agent sent.
#[derive(Clone, Debug, Deserialize)]
pub struct AgentReply {
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub conversation_id: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AgentErrorBody {
    #[serde(default)]
    pub error: Option<AgentErrorDetail>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct AgentErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

impl AgentErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error
            .and_then(|e| e.message)
            .filter(|m| !m.is_empty())
    }
}
