//! Dispatch action names.

use std::fmt;
use std::str::FromStr;

use crate::error::ContentError;

/// An action recognised by [`ContentContext::run`](crate::ContentContext::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Scan,
    SaveConfig,
    Debug,
    AnalyzePage,
    PreviewSuggestion,
    ApplySuggestion,
    DismissSuggestion,
    Restore,
    /// Legacy action kept for old hosts; does nothing.
    Invert,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::Scan,
        Action::SaveConfig,
        Action::Debug,
        Action::AnalyzePage,
        Action::PreviewSuggestion,
        Action::ApplySuggestion,
        Action::DismissSuggestion,
        Action::Restore,
        Action::Invert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::SaveConfig => "save_config",
            Self::Debug => "debug",
            Self::AnalyzePage => "analyze_page",
            Self::PreviewSuggestion => "preview_suggestion",
            Self::ApplySuggestion => "apply_suggestion",
            Self::DismissSuggestion => "dismiss_suggestion",
            Self::Restore => "restore",
            Self::Invert => "invert",
        }
    }
}

impl FromStr for Action {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ContentError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_action() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = "explode".parse::<Action>().unwrap_err();
        assert!(matches!(err, ContentError::UnknownAction(name) if name == "explode"));
    }
}
