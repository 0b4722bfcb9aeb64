#[cfg(test)]
mod test;

use crate::instruction::Segment;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Argument,
    Local,
}

impl Kind {
    pub fn segment(&self) -> Segment {
        match self {
            Self::Static => Segment::Static,
            Self::Field => Segment::This,
            Self::Argument => Segment::Argument,
            Self::Local => Segment::Local,
        }
    }

    fn slot(&self) -> usize {
        match self {
            Self::Static => 0,
            Self::Field => 1,
            Self::Argument => 2,
            Self::Local => 3,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Field => write!(f, "field"),
            Self::Argument => write!(f, "argument"),
            Self::Local => write!(f, "local"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    /// Declared type, which for object references is the class name.
    pub type_name: String,
    pub kind: Kind,
    /// Ordinal within `kind`, starting at 0.
    pub index: usize,
}

impl Symbol {
    pub fn segment(&self) -> Segment {
        self.kind.segment()
    }
}

/// One scope of declared names. A class owns one for statics and fields and
/// one for the arguments and locals of the subroutine being compiled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    counts: [usize; 4],
}

impl SymbolTable {
    /// Drop every symbol and restart all kind counters at 0.
    pub fn clear(&mut self) {
        self.symbols.clear();
        self.counts = [0; 4];
    }

    /// Insert `name` with the next index of its kind.
    ///
    /// An existing entry with the same name is overwritten; callers that care
    /// about redeclaration check [`SymbolTable::contains`] first.
    pub fn define(&mut self, name: &str, type_name: &str, kind: Kind) -> &Symbol {
        let index = self.counts[kind.slot()];
        self.counts[kind.slot()] += 1;
        let symbol = Symbol {
            name: name.to_string(),
            type_name: type_name.to_string(),
            kind,
            index,
        };
        self.symbols.insert(name.to_string(), symbol);
        &self.symbols[name]
    }

    pub fn count(&self, kind: Kind) -> usize {
        self.counts[kind.slot()]
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.get(name).map(|symbol| symbol.kind)
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(|symbol| symbol.type_name.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.get(name).map(|symbol| symbol.index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols ordered by kind, then index.
    pub fn symbols(&self) -> Vec<&Symbol> {
        let mut symbols = self.symbols.values().collect::<Vec<_>>();
        symbols.sort_by_key(|symbol| (symbol.kind.slot(), symbol.index));
        symbols
    }
}

impl std::fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for symbol in self.symbols() {
            writeln!(
                f,
                "{:<10} {:<10} {:<3} {}",
                symbol.kind.to_string(),
                symbol.type_name,
                symbol.index,
                symbol.name
            )?;
        }
        Ok(())
    }
}
