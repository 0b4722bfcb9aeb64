const KEYWORDS: &[&str] = &[
    "class",
    "constructor",
    "function",
    "method",
    "field",
    "static",
    "var",
    "int",
    "char",
    "boolean",
    "void",
    "true",
    "false",
    "null",
    "this",
    "let",
    "do",
    "if",
    "else",
    "while",
    "return",
];
const SYMBOLS: &[char] = &[
    '{', '}', '(', ')', '[', ']', '.', ',', ';', '+', '-', '*', '/', '&', '|', '<', '>', '=', '~',
];

pub mod cli;
pub mod compiler;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod instruction;
pub mod symbol_table;
pub mod token;
pub mod tokenizer;

use compiler::Compiler;
use emitter::ToVmText;
use error::Error;

/// Compile the source of one class into VM text with the default options.
pub fn compile(src: &str) -> Result<String, Error> {
    let program = Compiler::default().compile(src)?;
    Ok(program.to_vm_text())
}
