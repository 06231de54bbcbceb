/// Diagnostic kinds, grouped by the stage that reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Hard errors
    DivisionByZero,
    RepeatedAmongString,
    GateModeMismatch,
    UsedButNotDefined,
    GroupingDefinedInTermsOfItself,
    GroupingUndefined,
    EmptyGrouping,

    // Rewrites of constant expressions
    EmptyLiteral,
    AssignToDiscouraged,
    LoopNoOp,
    LoopOnce,
    AtLeastIsRepeat,
    HopNoOp,
    NegativeHop,

    // Signal analysis
    UnreachableAfterNot,
    UnreachableAfterFailure,
    UnreachableAfterSuccess,
    ConstantLoopBody,

    // Name table
    DeclaredButNotDefined,
    DeclaredButNotUsed,
    DefinedButNotUsed,
    NeverInitialised,
    SetButNeverUsed,
    UnreachableRoutine,

    // Notes
    NotLocalised,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::DivisionByZero
            | Self::RepeatedAmongString
            | Self::GateModeMismatch
            | Self::UsedButNotDefined
            | Self::GroupingDefinedInTermsOfItself
            | Self::GroupingUndefined
            | Self::EmptyGrouping => Severity::Error,
            Self::NotLocalised => Severity::Info,
            _ => Severity::Warning,
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::DivisionByZero => "division by zero",
            Self::RepeatedAmongString => "among(...) has repeated string",
            Self::GateModeMismatch => "routine mis-used in this mode",
            Self::UsedButNotDefined => "declared but not defined",
            Self::GroupingDefinedInTermsOfItself => "grouping defined in terms of itself",
            Self::GroupingUndefined => "grouping undefined",
            Self::EmptyGrouping => "empty grouping",

            Self::EmptyLiteral => "empty literal string is a no-op",
            Self::AssignToDiscouraged => {
                "Use of `=>` is not recommended, see \
                 https://snowballstem.org/compiler/snowman.html section 13.3 for details"
            }
            Self::LoopNoOp => "loop C is a no-op",
            Self::LoopOnce => "loop 1 C is just C",
            Self::AtLeastIsRepeat => "atleast C is just repeat C",
            Self::HopNoOp => "hop 0 is a no-op",
            Self::NegativeHop => {
                "negative hop now signals f (as was always documented) rather than \
                 moving the cursor in the opposite direction"
            }

            Self::UnreachableAfterNot => {
                "'not' always signals f here so following commands are unreachable"
            }
            Self::UnreachableAfterFailure => {
                "command always signals f here so rest of command list is unreachable"
            }
            Self::UnreachableAfterSuccess => {
                "command always signals t here so rest of 'or' is unreachable"
            }
            Self::ConstantLoopBody => "loop body always signals the same outcome",

            Self::DeclaredButNotDefined => "declared but not defined",
            Self::DeclaredButNotUsed => "declared but not used",
            Self::DefinedButNotUsed => "defined but not used",
            Self::NeverInitialised => "is never initialised",
            Self::SetButNeverUsed => "is set but never used",
            Self::UnreachableRoutine => "routine not reachable from any externals",

            Self::NotLocalised => "could not localise variable",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::RepeatedAmongString => "among(...) has repeated string '{}'".to_string(),
            Self::GateModeMismatch => "routine {}".to_string(),
            Self::GroupingDefinedInTermsOfItself => "{} defined in terms of itself".to_string(),
            Self::GroupingUndefined => "{} undefined".to_string(),

            Self::LoopNoOp => "loop {} C is a no-op".to_string(),
            Self::AtLeastIsRepeat => "atleast {} C is just repeat C".to_string(),
            Self::NegativeHop => "hop {} now signals f (as was always documented) rather than \
                 moving the cursor in the opposite direction"
                .to_string(),

            Self::UnreachableAfterFailure => {
                "command always signals f here so rest of {} is unreachable".to_string()
            }
            Self::ConstantLoopBody => "body of {}".to_string(),

            Self::UnreachableRoutine => "routine '{}' not reachable from any externals".to_string(),
            Self::NotLocalised => "Could not localise {}".to_string(),

            // `kind 'name'` followed by the fallback
            Self::UsedButNotDefined
            | Self::DeclaredButNotDefined
            | Self::DeclaredButNotUsed
            | Self::DefinedButNotUsed
            | Self::NeverInitialised
            | Self::SetButNeverUsed => format!("{{}} {}", self.fallback_message()),

            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) line: u32,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// Source line the diagnostic points at (1-based).
    pub(crate) line: u32,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
}

impl DiagnosticMessage {
    pub(crate) fn with_default_message(kind: DiagnosticKind, line: u32) -> Self {
        Self {
            kind,
            line,
            message: kind.fallback_message().to_string(),
            related: Vec::new(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.line, self.severity(), self.message)?;
        for related in &self.related {
            write!(f, " (related: {} at {})", related.message, related.line)?;
        }
        Ok(())
    }
}
