//! Round-trip, merge and cursor behaviour of parsed import statements

use importer::parsing::{
    ImportKind, ImportParser, ImportStatement, ImportStyle, ImportSymbol, identifier_at,
    parse_imports,
};

fn parse_one(code: &str) -> ImportStatement {
    let mut statements = parse_imports(code);
    assert_eq!(statements.len(), 1, "expected one statement in {code:?}");
    statements.remove(0)
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn unedited_statements_serialize_to_their_source() {
    let sources = [
        "import './polyfill';",
        "import React from 'react'",
        "import   React ,{useState,useEffect}   from \"react\" ;",
        "import * as path from 'node:path';",
        "import type { Props } from './types';",
        "import { a, b, } from './x';",
        "import {\n    a, // first\n    b as c,\n} from './x';",
        "import /* default */ D, { /* empty */ } from './d';",
        "import {\r\n\ta,\r\n\tb\r\n} from './crlf';",
    ];
    for source in sources {
        let statement = parse_one(source);
        assert_eq!(statement.as_text(), source, "round trip of {source:?}");
    }
}

#[test]
fn statements_inside_a_file_keep_their_spans() {
    let code = "// setup\nimport a from 'a';\n\nconst x = 1;\nimport {\n  b\n} from './b'\nexport {};\n";
    let statements = parse_imports(code);
    assert_eq!(statements.len(), 2);
    for statement in &statements {
        assert_eq!(&code[statement.span()], statement.as_text());
    }
    assert_eq!(statements[1].start.line, 4);
}

#[test]
fn non_import_uses_of_the_keyword_are_skipped() {
    let code = "const lazy = import('./lazy');\nconst url = import.meta.url;\nimport x = require('x');\nimport ok from './ok';";
    let mut parser = ImportParser::new();
    let statements = parser.parse(code);
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].specifier, "./ok");
}

// ============================================================================
// Appending and merging
// ============================================================================

#[test]
fn append_follows_one_symbol_per_line_layout() {
    let mut statement = parse_one("import {\n    a, // first\n    b\n} from './x';");
    let warnings = statement.append(&[ImportSymbol::new("c", None)]);
    assert!(warnings.is_empty());
    assert_eq!(
        statement.as_text(),
        "import {\n    a, // first\n    b,\n    c\n} from './x';"
    );
}

#[test]
fn append_moves_trailing_comment_with_its_symbol() {
    let mut statement = parse_one("import {\n  a,\n  b // last\n} from './x';");
    statement.append(&[ImportSymbol::new("c", None)]);
    assert_eq!(
        statement.as_text(),
        "import {\n  a,\n  b, // last\n  c\n} from './x';"
    );
}

#[test]
fn append_inline_keeps_compact_spacing() {
    let mut statement = parse_one("import {a,b} from './x'");
    statement.append(&[ImportSymbol::new("c", Some("d".into()))]);
    assert_eq!(statement.as_text(), "import {a,b,c as d} from './x'");
}

#[test]
fn append_skips_duplicates_and_warns_on_alias_conflict() {
    let mut statement = parse_one("import { a, b as bee } from './x';");
    let warnings = statement.append(&[
        ImportSymbol::new("a", None),
        ImportSymbol::new("b", Some("other".into())),
    ]);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("bee"));
    assert_eq!(statement.as_text(), "import { a, b as bee } from './x';");
}

#[test]
fn merge_result_parses_back_to_the_union() {
    let mut statement = parse_one("import { a } from './x';");
    let other = parse_one("import D, { b, a } from './x';");
    let warnings = statement.merge(&other).expect("same target merges");
    assert!(warnings.is_empty());

    let reparsed = parse_one(&statement.as_text());
    assert_eq!(reparsed.kind, ImportKind::DefaultAlias);
    assert_eq!(reparsed.default_alias.as_deref(), Some("D"));
    let names: Vec<_> = reparsed.symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn merge_keeps_two_space_indent_of_multi_line_list() {
    let mut statement = parse_one("import {\n  one,\n  two\n} from './x';");
    let warnings = statement
        .merge(&parse_one("import { three } from './x';"))
        .unwrap();
    assert!(warnings.is_empty());
    assert_eq!(
        statement.as_text(),
        "import {\n  one,\n  two,\n  three\n} from './x';"
    );

    let mut single = parse_one("import { one } from './x';");
    let warnings = single
        .merge(&parse_one("import { one as aliasX } from './x';"))
        .unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("aliasX"));
    assert_eq!(single.as_text(), "import { one } from './x';");
}

#[test]
fn merge_refuses_different_targets_and_type_mismatch() {
    let mut value = parse_one("import { a } from './x';");
    assert!(value.merge(&parse_one("import { b } from './y';")).is_none());
    assert!(value.merge(&parse_one("import type { T } from './x';")).is_none());
    assert!(value.merge(&parse_one("import * as x from './x';")).is_none());
    assert_eq!(value.as_text(), "import { a } from './x';");
}

// ============================================================================
// Cursor anchors
// ============================================================================

#[test]
fn cursor_anchor_positions() {
    let cases = [
        ("import { a, b } from './x';", "import { a, b"),
        ("import D from './x';", "import D"),
        ("import * as ns from './x';", "import * as ns"),
        ("import './x';", "import './x"),
        ("import {} from './x';", "import {"),
        ("import { X as that } from 'whatever'", "import { X as that"),
    ];
    for (source, prefix) in cases {
        let statement = parse_one(source);
        assert_eq!(statement.cursor_anchor(), prefix.chars().count(), "anchor in {source}");
    }
}

#[test]
fn cursor_counts_characters_not_bytes() {
    let statement = ImportStatement::default_import("Ünïcode", "./ü", ImportStyle::default());
    let rendered = statement.render();
    assert_eq!(rendered.cursor, "import Ünïcode".chars().count());
}

// ============================================================================
// Search pre-fill
// ============================================================================

#[test]
fn identifier_under_cursor_for_search() {
    assert_eq!(identifier_at("  return formatDate(x);", 12).as_deref(), Some("formatDate"));
    assert_eq!(identifier_at("import x from 'lib/x';", 0).as_deref(), Some("lib/x"));
    assert_eq!(identifier_at("   ", 1), None);
}
