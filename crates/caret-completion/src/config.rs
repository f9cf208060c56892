//! Completion settings.

/// Settings for one completion contributor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionConfig {
    /// Invocation count at which qualified member accesses are synthesized.
    pub expansion_threshold: u32,

    /// Member name used to probe whether a candidate can be qualified.
    pub probe_suffix: String,

    /// Identifier inserted at the caret in the completion copy of a file.
    pub placeholder: String,

    /// Maximum candidates collected per request, `None` for no limit.
    pub max_candidates: Option<usize>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            expansion_threshold: 2,
            probe_suffix: "xxx".to_string(),
            placeholder: "CaretCompletionPlaceholder".to_string(),
            max_candidates: None,
        }
    }
}

impl CompletionConfig {
    pub fn with_expansion_threshold(mut self, threshold: u32) -> Self {
        self.expansion_threshold = threshold;
        self
    }

    pub fn with_probe_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.probe_suffix = suffix.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_max_candidates(mut self, max: usize) -> Self {
        self.max_candidates = Some(max);
        self
    }

    /// Whether an invocation of this strength asks for qualified expansion
    pub fn expands_at(&self, invocation_count: u32) -> bool {
        invocation_count >= self.expansion_threshold
    }
}
