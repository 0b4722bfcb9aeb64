use super::{CompilerOptions, MAX_NESTING};
use crate::emitter::{Program, VmWriter};
use crate::error::Error;
use crate::instruction::{ArithmeticOp, Segment};
use crate::symbol_table::{Kind, Symbol, SymbolTable};
use crate::token::{Keyword, Span, Token, TokenKind};
use crate::tokenizer::Tokenizer;
use log::{debug, trace};
use std::collections::HashSet;

enum Lowering {
    Arithmetic(ArithmeticOp),
    Call(&'static str),
}

fn lower_operator(op: char) -> Option<Lowering> {
    match op {
        '+' => Some(Lowering::Arithmetic(ArithmeticOp::Add)),
        '-' => Some(Lowering::Arithmetic(ArithmeticOp::Sub)),
        '*' => Some(Lowering::Call("Math.multiply")),
        '/' => Some(Lowering::Call("Math.divide")),
        '&' => Some(Lowering::Arithmetic(ArithmeticOp::And)),
        '|' => Some(Lowering::Arithmetic(ArithmeticOp::Or)),
        '<' => Some(Lowering::Arithmetic(ArithmeticOp::Lt)),
        '>' => Some(Lowering::Arithmetic(ArithmeticOp::Gt)),
        '=' => Some(Lowering::Arithmetic(ArithmeticOp::Eq)),
        _ => None,
    }
}

/// Walks the grammar of one class and emits its VM code in the same pass.
///
/// Every `compile_*` method starts with the first token of its construct as
/// the current token and returns with the token after it as the current one.
#[derive(Debug)]
pub struct CompilationEngine {
    tokens: Tokenizer,
    writer: VmWriter,
    class_symbols: SymbolTable,
    subroutine_symbols: SymbolTable,
    class_name: String,
    methods: HashSet<String>,
    if_count: usize,
    while_count: usize,
    depth: usize,
    options: CompilerOptions,
}

impl CompilationEngine {
    pub fn new(tokens: Tokenizer, options: CompilerOptions) -> Self {
        Self {
            tokens,
            writer: VmWriter::default(),
            class_symbols: SymbolTable::default(),
            subroutine_symbols: SymbolTable::default(),
            class_name: String::new(),
            methods: HashSet::new(),
            if_count: 0,
            while_count: 0,
            depth: 0,
            options,
        }
    }

    pub fn compile_class(mut self) -> Result<Program, Error> {
        self.methods = self.scan_methods()?;
        trace!("methods: {:?}", self.methods);

        self.advance()?;
        self.expect_keyword(Keyword::Class)?;
        let (name, _) = self.expect_identifier()?;
        self.class_name = name;
        debug!("compiling class {}", self.class_name);
        self.expect_symbol('{')?;

        loop {
            let token = self.current()?.clone();
            match Keyword::parse(&token.text) {
                Some(Keyword::Static) => self.compile_class_var_dec(Kind::Static)?,
                Some(Keyword::Field) => self.compile_class_var_dec(Kind::Field)?,
                Some(
                    keyword @ (Keyword::Constructor | Keyword::Function | Keyword::Method),
                ) => self.compile_subroutine_dec(keyword)?,
                _ => break,
            }
        }

        let closing = self.current()?;
        if !closing.is_symbol('}') {
            return Err(closing.expected("'}'"));
        }
        if let Some(extra) = self.tokens.peek() {
            return Err(extra.expected("end of input"));
        }
        Ok(self.writer.finish())
    }

    /// Collect the name after every `method` keyword, then rewind the cursor.
    fn scan_methods(&mut self) -> Result<HashSet<String>, Error> {
        let start = self.tokens.position();
        let mut methods = HashSet::new();
        while self.tokens.has_more() {
            if !self.tokens.advance()?.is_keyword(Keyword::Method) {
                continue;
            }
            // method <type> <name>
            if self.tokens.position() + 2 > self.tokens.len() {
                break;
            }
            self.tokens.advance()?;
            let name = self.tokens.advance()?;
            if name.kind() == TokenKind::Identifier {
                methods.insert(name.text.clone());
            }
        }
        self.tokens.jump_to(start)?;
        Ok(methods)
    }

    fn compile_class_var_dec(&mut self, kind: Kind) -> Result<(), Error> {
        self.advance()?;
        let type_name = self.expect_type(false)?;
        loop {
            let (name, span) = self.expect_identifier()?;
            Self::declare(&mut self.class_symbols, name, span, &type_name, kind)?;
            if !self.at_symbol(',') {
                break;
            }
            self.advance()?;
        }
        self.expect_symbol(';')
    }

    fn compile_subroutine_dec(&mut self, keyword: Keyword) -> Result<(), Error> {
        self.advance()?;
        self.subroutine_symbols.clear();
        self.expect_type(true)?;
        let (name, _) = self.expect_identifier()?;
        let full_name = format!("{}.{}", self.class_name, name);
        debug!("compiling {keyword} {full_name}");

        if keyword == Keyword::Method {
            self.subroutine_symbols
                .define("this", &self.class_name, Kind::Argument);
        }
        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        self.expect_symbol('{')?;
        while self.at_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        let n_locals = self.subroutine_symbols.count(Kind::Local);
        self.writer.write_function(&full_name, n_locals);
        match keyword {
            Keyword::Constructor => {
                let n_fields = self.class_symbols.count(Kind::Field);
                self.writer.write_push(Segment::Constant, n_fields);
                self.writer.write_call("Memory.alloc", 1);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            Keyword::Method => {
                self.writer.write_push(Segment::Argument, 0);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            _ => {}
        }

        if self.options.debug_symbol_table {
            eprintln!(
                "{full_name}\n-- class --\n{}-- subroutine --\n{}",
                self.class_symbols, self.subroutine_symbols
            );
        }

        self.compile_statements()?;
        self.expect_symbol('}')
    }

    fn compile_parameter_list(&mut self) -> Result<(), Error> {
        if self.at_symbol(')') {
            return Ok(());
        }
        loop {
            let type_name = self.expect_type(false)?;
            let (name, span) = self.expect_identifier()?;
            Self::declare(
                &mut self.subroutine_symbols,
                name,
                span,
                &type_name,
                Kind::Argument,
            )?;
            if !self.at_symbol(',') {
                return Ok(());
            }
            self.advance()?;
        }
    }

    fn compile_var_dec(&mut self) -> Result<(), Error> {
        self.advance()?;
        let type_name = self.expect_type(false)?;
        loop {
            let (name, span) = self.expect_identifier()?;
            Self::declare(
                &mut self.subroutine_symbols,
                name,
                span,
                &type_name,
                Kind::Local,
            )?;
            if !self.at_symbol(',') {
                break;
            }
            self.advance()?;
        }
        self.expect_symbol(';')
    }

    fn compile_statements(&mut self) -> Result<(), Error> {
        loop {
            let keyword = Keyword::parse(&self.current()?.text);
            match keyword {
                Some(Keyword::Let) => self.compile_let()?,
                Some(Keyword::If) => self.compile_if()?,
                Some(Keyword::While) => self.compile_while()?,
                Some(Keyword::Do) => self.compile_do()?,
                Some(Keyword::Return) => self.compile_return()?,
                _ => return Ok(()),
            }
        }
    }

    fn compile_let(&mut self) -> Result<(), Error> {
        self.advance()?;
        let (name, span) = self.expect_identifier()?;
        let target = self.resolve(&name, span)?;

        if self.at_symbol('[') {
            self.advance()?;
            self.writer.write_push(target.segment(), target.index);
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.writer.write_arithmetic(ArithmeticOp::Add);

            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.writer.write_pop(Segment::Temp, 0);
            self.writer.write_pop(Segment::Pointer, 1);
            self.writer.write_push(Segment::Temp, 0);
            self.writer.write_pop(Segment::That, 0);
        } else {
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.writer.write_pop(target.segment(), target.index);
        }
        self.expect_symbol(';')
    }

    fn compile_if(&mut self) -> Result<(), Error> {
        let else_label = format!("IF_ELSE_{}", self.if_count);
        let end_label = format!("IF_END_{}", self.if_count);
        self.if_count += 1;

        self.advance()?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(ArithmeticOp::Not);
        self.writer.write_if(&else_label);

        self.compile_block()?;
        self.writer.write_goto(&end_label);
        self.writer.write_label(&else_label);

        if self.at_keyword(Keyword::Else) {
            self.advance()?;
            self.compile_block()?;
        }
        self.writer.write_label(&end_label);
        Ok(())
    }

    fn compile_while(&mut self) -> Result<(), Error> {
        let start_label = format!("WHILE_START_{}", self.while_count);
        let end_label = format!("WHILE_END_{}", self.while_count);
        self.while_count += 1;

        self.advance()?;
        self.writer.write_label(&start_label);
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(ArithmeticOp::Not);
        self.writer.write_if(&end_label);

        self.compile_block()?;
        self.writer.write_goto(&start_label);
        self.writer.write_label(&end_label);
        Ok(())
    }

    fn compile_block(&mut self) -> Result<(), Error> {
        self.expect_symbol('{')?;
        self.nested(Self::compile_statements)?;
        self.expect_symbol('}')
    }

    fn compile_do(&mut self) -> Result<(), Error> {
        self.advance()?;
        self.compile_subroutine_call()?;
        self.writer.write_pop(Segment::Temp, 0);
        self.expect_symbol(';')
    }

    fn compile_return(&mut self) -> Result<(), Error> {
        self.advance()?;
        if self.at_symbol(';') {
            self.writer.write_push(Segment::Constant, 0);
        } else {
            self.compile_expression()?;
        }
        self.writer.write_return();
        self.expect_symbol(';')
    }

    /// Operators apply strictly left to right as soon as their right operand
    /// is on the stack.
    fn compile_expression(&mut self) -> Result<(), Error> {
        self.nested(|engine| {
            engine.compile_term()?;
            while let Some(lowering) = engine.binary_operator() {
                engine.advance()?;
                engine.compile_term()?;
                match lowering {
                    Lowering::Arithmetic(op) => engine.writer.write_arithmetic(op),
                    Lowering::Call(name) => engine.writer.write_call(name, 2),
                }
            }
            Ok(())
        })
    }

    fn binary_operator(&self) -> Option<Lowering> {
        let token = self.tokens.current().ok()?;
        lower_operator(token.as_symbol().ok()?)
    }

    fn compile_term(&mut self) -> Result<(), Error> {
        let token = self.current()?.clone();
        match token.kind() {
            TokenKind::IntegerConstant => {
                let value = token.as_integer()?;
                self.writer.write_push(Segment::Constant, usize::from(value));
                self.advance()
            }
            TokenKind::StringConstant => {
                self.compile_string(token.as_string()?);
                self.advance()
            }
            TokenKind::Keyword => {
                match token.as_keyword()? {
                    Keyword::True => {
                        self.writer.write_push(Segment::Constant, 1);
                        self.writer.write_arithmetic(ArithmeticOp::Neg);
                    }
                    Keyword::False | Keyword::Null => {
                        self.writer.write_push(Segment::Constant, 0);
                    }
                    Keyword::This => self.writer.write_push(Segment::Pointer, 0),
                    _ => return Err(token.expected("term")),
                }
                self.advance()
            }
            TokenKind::Symbol => match token.as_symbol()? {
                '(' => {
                    self.advance()?;
                    self.compile_expression()?;
                    self.expect_symbol(')')
                }
                '-' => {
                    self.advance()?;
                    self.nested(Self::compile_term)?;
                    self.writer.write_arithmetic(ArithmeticOp::Neg);
                    Ok(())
                }
                '~' => {
                    self.advance()?;
                    self.nested(Self::compile_term)?;
                    self.writer.write_arithmetic(ArithmeticOp::Not);
                    Ok(())
                }
                _ => Err(token.expected("term")),
            },
            TokenKind::Identifier => {
                if self.peek_is_symbol('(') || self.peek_is_symbol('.') {
                    return self.compile_subroutine_call();
                }
                let (name, span) = self.expect_identifier()?;
                let symbol = self.resolve(&name, span)?;
                self.writer.write_push(symbol.segment(), symbol.index);
                if self.at_symbol('[') {
                    self.advance()?;
                    self.compile_expression()?;
                    self.expect_symbol(']')?;
                    self.writer.write_arithmetic(ArithmeticOp::Add);
                    self.writer.write_pop(Segment::Pointer, 1);
                    self.writer.write_push(Segment::That, 0);
                }
                Ok(())
            }
        }
    }

    fn compile_string(&mut self, value: &str) {
        self.writer
            .write_push(Segment::Constant, value.chars().count());
        self.writer.write_call("String.new", 1);
        for c in value.chars() {
            self.writer.write_push(Segment::Constant, c as usize);
            self.writer.write_call("String.appendChar", 2);
        }
    }

    /// `name(...)`, `var.name(...)` or `Class.name(...)`.
    fn compile_subroutine_call(&mut self) -> Result<(), Error> {
        let (name, _) = self.expect_identifier()?;
        let mut n_args = 0;

        let callee = if self.at_symbol('(') {
            if self.methods.contains(&name) {
                self.writer.write_push(Segment::Pointer, 0);
                n_args += 1;
            }
            format!("{}.{}", self.class_name, name)
        } else {
            self.expect_symbol('.')?;
            let (subroutine, _) = self.expect_identifier()?;
            match self.lookup(&name).cloned() {
                Some(receiver) => {
                    self.writer.write_push(receiver.segment(), receiver.index);
                    n_args += 1;
                    format!("{}.{}", receiver.type_name, subroutine)
                }
                None => format!("{name}.{subroutine}"),
            }
        };

        self.expect_symbol('(')?;
        n_args += self.compile_expression_list()?;
        self.expect_symbol(')')?;
        self.writer.write_call(&callee, n_args);
        Ok(())
    }

    fn compile_expression_list(&mut self) -> Result<usize, Error> {
        if self.at_symbol(')') {
            return Ok(0);
        }
        let mut count = 1;
        self.compile_expression()?;
        while self.at_symbol(',') {
            self.advance()?;
            self.compile_expression()?;
            count += 1;
        }
        Ok(count)
    }

    /// Run one level of recursive descent, failing instead of recursing past
    /// `MAX_NESTING` levels.
    fn nested<T>(
        &mut self,
        compile: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        if self.depth >= MAX_NESTING {
            return Err(Error::NestingTooDeep(self.current()?.span.clone()));
        }
        self.depth += 1;
        let result = compile(self);
        self.depth -= 1;
        result
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_symbols
            .get(name)
            .or_else(|| self.class_symbols.get(name))
    }

    fn resolve(&self, name: &str, span: Span) -> Result<Symbol, Error> {
        self.lookup(name)
            .cloned()
            .ok_or_else(|| Error::UndefinedSymbol(span, name.to_string()))
    }

    fn declare(
        table: &mut SymbolTable,
        name: String,
        span: Span,
        type_name: &str,
        kind: Kind,
    ) -> Result<(), Error> {
        if table.contains(&name) {
            return Err(Error::DuplicateSymbol { span, name });
        }
        table.define(&name, type_name, kind);
        Ok(())
    }

    fn current(&self) -> Result<&Token, Error> {
        self.tokens.current()
    }

    fn advance(&mut self) -> Result<(), Error> {
        self.tokens.advance().map(|_| ())
    }

    fn at_symbol(&self, symbol: char) -> bool {
        self.tokens
            .current()
            .is_ok_and(|token| token.is_symbol(symbol))
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.tokens
            .current()
            .is_ok_and(|token| token.is_keyword(keyword))
    }

    fn peek_is_symbol(&self, symbol: char) -> bool {
        self.tokens
            .peek()
            .is_some_and(|token| token.is_symbol(symbol))
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<(), Error> {
        let token = self.current()?;
        if !token.is_symbol(symbol) {
            return Err(token.expected(format!("'{symbol}'")));
        }
        self.advance()
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), Error> {
        let token = self.current()?;
        if !token.is_keyword(keyword) {
            return Err(token.expected(format!("'{keyword}'")));
        }
        self.advance()
    }

    fn expect_identifier(&mut self) -> Result<(String, Span), Error> {
        let token = self.current()?;
        let name = token.as_identifier()?.to_string();
        let span = token.span.clone();
        self.advance()?;
        Ok((name, span))
    }

    /// `int`, `char`, `boolean`, a class name, or `void` for return types.
    fn expect_type(&mut self, allow_void: bool) -> Result<String, Error> {
        let token = self.current()?;
        let type_name = match token.kind() {
            TokenKind::Identifier => token.text.clone(),
            TokenKind::Keyword => match token.as_keyword()? {
                Keyword::Int | Keyword::Char | Keyword::Boolean => token.text.clone(),
                Keyword::Void if allow_void => token.text.clone(),
                _ => return Err(token.expected("type")),
            },
            _ => return Err(token.expected("type")),
        };
        self.advance()?;
        Ok(type_name)
    }
}
