use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_indices_are_per_kind() {
    let mut table = SymbolTable::default();
    table.define("a", "int", Kind::Local);
    table.define("x", "int", Kind::Argument);
    table.define("b", "char", Kind::Local);
    table.define("y", "Point", Kind::Argument);
    table.define("c", "boolean", Kind::Local);

    assert_eq!(table.index_of("a"), Some(0));
    assert_eq!(table.index_of("b"), Some(1));
    assert_eq!(table.index_of("c"), Some(2));
    assert_eq!(table.index_of("x"), Some(0));
    assert_eq!(table.index_of("y"), Some(1));
    assert_eq!(table.count(Kind::Local), 3);
    assert_eq!(table.count(Kind::Argument), 2);
    assert_eq!(table.count(Kind::Static), 0);
    assert_eq!(table.count(Kind::Field), 0);
}

#[test]
fn test_lookups() {
    let mut table = SymbolTable::default();
    table.define("p", "Point", Kind::Field);
    assert!(table.contains("p"));
    assert_eq!(table.kind_of("p"), Some(Kind::Field));
    assert_eq!(table.type_of("p"), Some("Point"));
    assert_eq!(table.get("p").map(Symbol::segment), Some(Segment::This));
    assert!(!table.contains("q"));
    assert_eq!(table.kind_of("q"), None);
    assert_eq!(table.type_of("q"), None);
    assert_eq!(table.index_of("q"), None);
}

#[test]
fn test_clear_restarts_numbering() {
    let mut table = SymbolTable::default();
    table.define("a", "int", Kind::Local);
    table.define("b", "int", Kind::Local);
    table.clear();
    assert!(table.is_empty());
    assert_eq!(table.count(Kind::Local), 0);
    assert_eq!(table.define("c", "int", Kind::Local).index, 0);
}

#[test]
fn test_redefinition_overwrites() {
    let mut table = SymbolTable::default();
    table.define("a", "int", Kind::Local);
    table.define("a", "char", Kind::Local);
    assert_eq!(table.type_of("a"), Some("char"));
    assert_eq!(table.index_of("a"), Some(1));
    assert_eq!(table.count(Kind::Local), 2);
}

#[test]
fn test_segments() {
    assert_eq!(Kind::Static.segment(), Segment::Static);
    assert_eq!(Kind::Field.segment(), Segment::This);
    assert_eq!(Kind::Argument.segment(), Segment::Argument);
    assert_eq!(Kind::Local.segment(), Segment::Local);
}

#[test]
fn test_listing_is_ordered() {
    let mut table = SymbolTable::default();
    table.define("count", "int", Kind::Static);
    table.define("y", "int", Kind::Field);
    table.define("x", "int", Kind::Field);
    let names = table
        .symbols()
        .iter()
        .map(|symbol| symbol.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["count", "y", "x"]);
}
