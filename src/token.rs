use crate::error::Error;
use crate::{KEYWORDS, SYMBOLS};

pub type Span = std::ops::Range<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Symbol,
    IntegerConstant,
    StringConstant,
    Identifier,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword => write!(f, "keyword"),
            Self::Symbol => write!(f, "symbol"),
            Self::IntegerConstant => write!(f, "integer constant"),
            Self::StringConstant => write!(f, "string constant"),
            Self::Identifier => write!(f, "identifier"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

impl Keyword {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "class" => Some(Self::Class),
            "constructor" => Some(Self::Constructor),
            "function" => Some(Self::Function),
            "method" => Some(Self::Method),
            "field" => Some(Self::Field),
            "static" => Some(Self::Static),
            "var" => Some(Self::Var),
            "int" => Some(Self::Int),
            "char" => Some(Self::Char),
            "boolean" => Some(Self::Boolean),
            "void" => Some(Self::Void),
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            "null" => Some(Self::Null),
            "this" => Some(Self::This),
            "let" => Some(Self::Let),
            "do" => Some(Self::Do),
            "if" => Some(Self::If),
            "else" => Some(Self::Else),
            "while" => Some(Self::While),
            "return" => Some(Self::Return),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Constructor => "constructor",
            Self::Function => "function",
            Self::Method => "method",
            Self::Field => "field",
            Self::Static => "static",
            Self::Var => "var",
            Self::Int => "int",
            Self::Char => "char",
            Self::Boolean => "boolean",
            Self::Void => "void",
            Self::True => "true",
            Self::False => "false",
            Self::Null => "null",
            Self::This => "this",
            Self::Let => "let",
            Self::Do => "do",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Return => "return",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A lexeme exactly as it appeared in the source.
///
/// The classification is never stored: [`Token::kind`] derives it from the
/// raw text every time, so a string constant keeps its quotes until
/// [`Token::as_string`] strips them.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    pub fn kind(&self) -> TokenKind {
        let text = self.text.as_str();
        if KEYWORDS.contains(&text) {
            TokenKind::Keyword
        } else if is_symbol_text(text) {
            TokenKind::Symbol
        } else if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            TokenKind::IntegerConstant
        } else if text.starts_with('"') {
            TokenKind::StringConstant
        } else {
            TokenKind::Identifier
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.text == keyword.as_str()
    }

    pub fn is_symbol(&self, symbol: char) -> bool {
        is_symbol_text(&self.text) && self.text.starts_with(symbol)
    }

    pub fn expected(&self, expected: impl Into<String>) -> Error {
        Error::ExpectedFound {
            span: self.span.clone(),
            expected: expected.into(),
            found: self.text.clone(),
        }
    }

    pub fn as_keyword(&self) -> Result<Keyword, Error> {
        Keyword::parse(&self.text).ok_or_else(|| self.expected("keyword"))
    }

    pub fn as_symbol(&self) -> Result<char, Error> {
        match self.kind() {
            TokenKind::Symbol => self.text.chars().next().ok_or_else(|| self.expected("symbol")),
            _ => Err(self.expected("symbol")),
        }
    }

    pub fn as_identifier(&self) -> Result<&str, Error> {
        match self.kind() {
            TokenKind::Identifier => Ok(&self.text),
            _ => Err(self.expected("identifier")),
        }
    }

    /// Integer constants are limited to the VM's non-negative word range.
    pub fn as_integer(&self) -> Result<u16, Error> {
        if self.kind() != TokenKind::IntegerConstant {
            return Err(self.expected("integer constant"));
        }
        match self.text.parse::<u16>() {
            Ok(value) if value <= MAX_INTEGER => Ok(value),
            _ => Err(Error::IntegerOutOfRange(self.span.clone(), self.text.clone())),
        }
    }

    /// The contents of a string constant without its surrounding quotes.
    pub fn as_string(&self) -> Result<&str, Error> {
        if self.kind() != TokenKind::StringConstant {
            return Err(self.expected("string constant"));
        }
        self.text
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .ok_or_else(|| Error::UnterminatedString(self.span.clone()))
    }
}

pub const MAX_INTEGER: u16 = 32767;

fn is_symbol_text(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if SYMBOLS.contains(&c))
}
