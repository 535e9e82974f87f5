use serde::{Deserialize, Serialize};

/// How a failure is reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Bad input; reported inline, the user re-selects.
    Validation,
    /// A capability rejected; reported, retried by repeating the action.
    Capability,
    /// Logged only; the previous or default display stays.
    SilentDegradation,
}

impl FailureClass {
    pub fn is_user_visible(self) -> bool {
        !matches!(self, Self::SilentDegradation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNotice {
    pub class: FailureClass,
    pub message: String,
}

impl UserNotice {
    pub fn new(class: FailureClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }
}
