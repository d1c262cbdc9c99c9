/// Diagnostic kinds, errors first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Tag content the engine cannot use
    MissingParticleBitmap,
    MissingSpriteBitmap,
    OddStringLength,

    // Linkable, but probably not what the author meant
    MissingStringTerminator,
    ResourceMismatch,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::MissingStringTerminator | Self::ResourceMismatch => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Message used when no detail is given.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::MissingParticleBitmap => "particle has no bitmap",
            Self::MissingSpriteBitmap => "particle type has no sprite bitmap",
            Self::OddStringLength => "UTF-16 string has an odd byte length",
            Self::MissingStringTerminator => "UTF-16 string is not null-terminated",
            Self::ResourceMismatch => "resource map entry differs from tag data",
        }
    }

    /// Render the message, appending `detail` when given.
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => format!("{}: {detail}", self.fallback_message()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub kind: DiagnosticKind,
    /// Tag the message is about, as `path.extension`.
    pub tag: String,
    pub message: String,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, tag: impl Into<String>, message: String) -> Self {
        Self {
            kind,
            tag: tag.into(),
            message,
        }
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
        write!(f, "{}: {}: {}", self.severity(), self.tag, self.message)
    }
}
