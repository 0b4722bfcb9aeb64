use crate::error::Error;
use crate::token::{Span, Token, TokenKind};
use crate::SYMBOLS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InString,
    InLineComment,
    InBlockComment,
}

/// Splits source text into raw lexemes.
///
/// A `/` is held back as a pending symbol until the next character decides
/// whether it opens a comment, so a comment opener is never emitted as a
/// division token.
#[derive(Debug)]
struct Lexer {
    state: State,
    tokens: Vec<Token>,
    buffer: String,
    buffer_start: usize,
    pending_slash: Option<usize>,
    comment_start: usize,
    previous_star: bool,
}

impl Lexer {
    fn new() -> Self {
        Self {
            state: State::Normal,
            tokens: Vec::new(),
            buffer: String::new(),
            buffer_start: 0,
            pending_slash: None,
            comment_start: 0,
            previous_star: false,
        }
    }

    fn run(mut self, src: &str) -> Result<Vec<Token>, Error> {
        for (at, c) in src.char_indices() {
            match self.state {
                State::Normal => self.normal(at, c)?,
                State::InString => self.string(at, c)?,
                State::InLineComment => {
                    if c == '\n' {
                        self.state = State::Normal;
                    }
                }
                State::InBlockComment => {
                    if self.previous_star && c == '/' {
                        self.state = State::Normal;
                    }
                    self.previous_star = c == '*';
                }
            }
        }

        match self.state {
            State::InString => Err(Error::UnterminatedString(self.buffer_start..src.len())),
            State::InBlockComment => Err(Error::UnterminatedComment(self.comment_start..src.len())),
            State::Normal | State::InLineComment => {
                self.release_slash();
                self.flush()?;
                Ok(self.tokens)
            }
        }
    }

    fn normal(&mut self, at: usize, c: char) -> Result<(), Error> {
        if let Some(slash) = self.pending_slash.take() {
            match c {
                '/' => {
                    self.state = State::InLineComment;
                    return Ok(());
                }
                '*' => {
                    self.state = State::InBlockComment;
                    self.comment_start = slash;
                    self.previous_star = false;
                    return Ok(());
                }
                _ => self.tokens.push(Token::new("/", slash..slash + 1)),
            }
        }

        match c {
            '"' => {
                self.flush()?;
                self.state = State::InString;
                self.buffer_start = at;
                self.buffer.push(c);
            }
            ' ' | '\t' | '\r' | '\n' => self.flush()?,
            '/' => {
                self.flush()?;
                self.pending_slash = Some(at);
            }
            c if SYMBOLS.contains(&c) => {
                self.flush()?;
                self.tokens.push(Token::new(c, at..at + 1));
            }
            c => {
                if self.buffer.is_empty() {
                    self.buffer_start = at;
                }
                self.buffer.push(c);
            }
        }
        Ok(())
    }

    fn string(&mut self, at: usize, c: char) -> Result<(), Error> {
        match c {
            '\n' => Err(Error::UnterminatedString(self.buffer_start..at)),
            '"' => {
                self.buffer.push(c);
                self.state = State::Normal;
                self.flush()
            }
            c => {
                self.buffer.push(c);
                Ok(())
            }
        }
    }

    fn release_slash(&mut self) {
        if let Some(slash) = self.pending_slash.take() {
            self.tokens.push(Token::new("/", slash..slash + 1));
        }
    }

    fn flush(&mut self) -> Result<(), Error> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.buffer);
        let span = self.buffer_start..self.buffer_start + text.len();
        let token = Token::new(text, span);
        if token.kind() == TokenKind::IntegerConstant {
            token.as_integer()?;
        }
        self.tokens.push(token);
        Ok(())
    }
}

/// The whole token sequence of one source file plus a cursor into it.
///
/// `position` counts the tokens advanced past, so the current token is the
/// one just before it and [`Tokenizer::peek`] looks at the one under it.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    tokens: Vec<Token>,
    position: usize,
    end: usize,
}

impl Tokenizer {
    pub fn new(src: &str) -> Result<Self, Error> {
        let tokens = Lexer::new().run(src)?;
        Ok(Self {
            tokens,
            position: 0,
            end: src.len(),
        })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn has_more(&self) -> bool {
        self.position < self.tokens.len()
    }

    pub fn advance(&mut self) -> Result<&Token, Error> {
        if !self.has_more() {
            return Err(Error::CursorExhausted(self.end_span()));
        }
        self.position += 1;
        Ok(&self.tokens[self.position - 1])
    }

    pub fn current(&self) -> Result<&Token, Error> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .ok_or_else(|| Error::CursorExhausted(self.end_span()))
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn jump_to(&mut self, position: usize) -> Result<(), Error> {
        if position > self.tokens.len() {
            return Err(Error::CursorExhausted(self.end_span()));
        }
        self.position = position;
        Ok(())
    }

    fn end_span(&self) -> Span {
        self.end..self.end
    }
}
