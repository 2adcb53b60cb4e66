use serde::{Deserialize, Serialize};

/// Structured error report written by the verifier when a run fails.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorReport {
    #[serde(default)]
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    #[serde(default)]
    pub messages: Vec<ReportMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMessage {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ErrorReport {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn is_empty(&self) -> bool {
        self.topics.iter().all(|topic| topic.messages.is_empty())
    }

    /// All messages across topics, in report order.
    pub fn messages(&self) -> impl Iterator<Item = &ReportMessage> {
        self.topics.iter().flat_map(|topic| topic.messages.iter())
    }
}
