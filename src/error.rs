//! Unified compiler error type used across all phases.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Flatten,
    Sort,
    Assemble,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Flatten => write!(f, "Flatten"),
            Phase::Sort => write!(f, "Sort"),
            Phase::Assemble => write!(f, "Assemble"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompileError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub node_id: Option<String>,
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(id) => write!(
                f,
                "[{}:{}] {} (node '{}')",
                self.phase, self.code, self.message, id
            ),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for CompileError {}

impl CompileError {
    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        CompileError {
            code: code.into(),
            phase: Phase::Parse,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn flatten(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        CompileError {
            code: code.into(),
            phase: Phase::Flatten,
            message: message.into(),
            node_id,
        }
    }

    pub fn sort(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        CompileError {
            code: code.into(),
            phase: Phase::Sort,
            message: message.into(),
            node_id,
        }
    }
}
