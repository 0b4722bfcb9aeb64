use crate::token::Span;
use anyhow::Result;
use ariadne::{Color, Label, Report, ReportKind, Source};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    UnterminatedString(Span),
    UnterminatedComment(Span),
    IntegerOutOfRange(Span, String),
    UndefinedSymbol(Span, String),
    CursorExhausted(Span),
    ExpectedFound {
        span: Span,
        expected: String,
        found: String,
    },
    DuplicateSymbol {
        span: Span,
        name: String,
    },
    NestingTooDeep(Span),
}

impl Error {
    pub fn span(&self) -> &Span {
        match self {
            Self::UnterminatedString(span) => span,
            Self::UnterminatedComment(span) => span,
            Self::IntegerOutOfRange(span, _) => span,
            Self::UndefinedSymbol(span, _) => span,
            Self::CursorExhausted(span) => span,
            Self::ExpectedFound { span, .. } => span,
            Self::DuplicateSymbol { span, .. } => span,
            Self::NestingTooDeep(span) => span,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::UnterminatedString(_) => "unterminated string constant".to_string(),
            Self::UnterminatedComment(_) => "unterminated block comment".to_string(),
            Self::IntegerOutOfRange(_, text) => {
                format!("integer constant {text} is out of range")
            }
            Self::UndefinedSymbol(_, name) => format!("'{name}' is not defined"),
            Self::CursorExhausted(_) => "unexpected end of input".to_string(),
            Self::ExpectedFound {
                expected, found, ..
            } => format!("expected {expected} found '{found}'"),
            Self::DuplicateSymbol { name, .. } => format!("'{name}' is already defined"),
            Self::NestingTooDeep(_) => "nesting is too deep".to_string(),
        }
    }

    fn note(&self) -> Option<String> {
        match self {
            Self::IntegerOutOfRange(..) => Some(format!(
                "integer constants must be between 0 and {}",
                crate::token::MAX_INTEGER
            )),
            Self::UndefinedSymbol(..) => Some(
                "variables must be declared as a field, static, parameter or var before use"
                    .to_string(),
            ),
            Self::DuplicateSymbol { .. } => Some(
                "a name can only be declared once per class or per subroutine".to_string(),
            ),
            Self::NestingTooDeep(_) => Some(format!(
                "expressions and statement blocks can nest at most {} levels",
                crate::compiler::MAX_NESTING
            )),
            _ => None,
        }
    }

    pub fn report(&self, filename: &str, src: &str) -> Result<()> {
        let src = if src.is_empty() {
            " ".to_string()
        } else {
            src.to_string()
        };
        let mut report = Report::build(ReportKind::Error, (filename, self.span().clone()))
            .with_code(1)
            .with_message(self.message())
            .with_label(
                Label::new((filename, self.span().clone()))
                    .with_message(self.message())
                    .with_color(Color::Red),
            );
        if let Some(note) = self.note() {
            report = report.with_note(note);
        }
        report.finish().eprint((filename, Source::from(src)))?;
        Ok(())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let span = self.span();
        write!(f, "{}..{}: {}", span.start, span.end, self.message())
    }
}

impl std::error::Error for Error {}
