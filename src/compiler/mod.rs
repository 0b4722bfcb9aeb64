mod engine;
#[cfg(test)]
mod test;

pub use engine::CompilationEngine;

use crate::emitter::Program;
use crate::error::Error;
use crate::tokenizer::Tokenizer;
use log::trace;

/// Deepest nesting of expressions, unary operators and statement blocks a
/// class may use.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompilerOptions {
    pub debug_tokens: bool,
    pub debug_symbol_table: bool,
}

#[derive(Debug, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    /// Print every token of the class to stderr before compiling it.
    pub fn debug_tokens(mut self, debug_tokens: bool) -> Self {
        self.options.debug_tokens = debug_tokens;
        self
    }

    /// Print both symbol tables of each subroutine once its locals are known.
    pub fn debug_symbol_table(mut self, debug_symbol_table: bool) -> Self {
        self.options.debug_symbol_table = debug_symbol_table;
        self
    }

    /// Compile one class. Each call gets a fresh engine, so nothing leaks
    /// between classes.
    pub fn compile(&self, src: &str) -> Result<Program, Error> {
        let tokens = Tokenizer::new(src)?;
        trace!("{} tokens", tokens.len());
        if self.options.debug_tokens {
            for token in tokens.tokens() {
                eprintln!(
                    "{:>5}..{:<5} {:<16} {}",
                    token.span.start,
                    token.span.end,
                    token.kind().to_string(),
                    token.text
                );
            }
        }
        CompilationEngine::new(tokens, self.options).compile_class()
    }
}
