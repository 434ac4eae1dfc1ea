use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskType {
    Chat,
    Analysis,
    Generation,
    Extraction,
    Summary,
    Classification,
}


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseTime {
    Realtime,
    Fast,
    #[default]
    Normal,
    Batch,
}


/// What a caller needs from one AI request.
///
/// Built once with the `with_*` combinators and never mutated afterwards;
/// the router only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContext {
    task_type: TaskType,
    priority: Priority,
    requires_privacy: bool,
    expected_response_time: ResponseTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    estimated_tokens: Option<u32>,
}

impl TaskContext {

    pub fn new(task_type: TaskType) -> Self {
        Self {
            task_type,
            priority: Priority::default(),
            requires_privacy: false,
            expected_response_time: ResponseTime::default(),
            estimated_tokens: None,
        }
    }


    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Restricts the request to `local` providers, with no cloud fallback.
    #[must_use]
    pub fn with_privacy(mut self, requires_privacy: bool) -> Self {
        self.requires_privacy = requires_privacy;
        self
    }


    #[must_use]
    pub fn with_response_time(mut self, expected: ResponseTime) -> Self {
        self.expected_response_time = expected;
        self
    }


    #[must_use]
    pub fn with_estimated_tokens(mut self, tokens: u32) -> Self {
        self.estimated_tokens = Some(tokens);
        self
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn requires_privacy(&self) -> bool {
        self.requires_privacy
    }

    pub fn expected_response_time(&self) -> ResponseTime {
        self.expected_response_time
    }

    pub fn estimated_tokens(&self) -> Option<u32> {
        self.estimated_tokens
    }
}
