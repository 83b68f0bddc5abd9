//! Integration tests for statement-to-program synthesis

use rsnip_synth::{to_program, SynthError};

/// Helper to synthesize a program with explicit imports
fn synth(statements: &[&str], imports: &[&str]) -> Result<String, SynthError> {
    to_program(statements, imports)
}

/// Pull the statements back out of a synthesized `fn main`
fn main_body(source: &str) -> Vec<String> {
    let start = source.find("fn main() {\n").expect("no main") + "fn main() {\n".len();
    let end = source.rfind("}\n").expect("no closing brace");
    source[start..end]
        .lines()
        .map(|line| line.trim_start().to_string())
        .collect()
}

#[test]
fn test_hello_world_needs_no_imports() {
    let source = synth(&[r#"println!("Hello world")"#], &[]).expect("synthesis failed");
    assert_eq!(source, "fn main() {\n    println!(\"Hello world\");\n}\n");
}

#[test]
fn test_single_std_import() {
    let source = synth(&[r#"println!("{:?}", Instant::now())"#], &[]).expect("synthesis failed");
    assert_eq!(
        source,
        "use std::time::Instant;\n\nfn main() {\n    println!(\"{:?}\", Instant::now());\n}\n"
    );
}

#[test]
fn test_imports_sorted_by_path() {
    let source = synth(
        &["let d = Duration::ZERO", "let m: HashMap<String, Duration> = HashMap::new()"],
        &[],
    )
    .expect("synthesis failed");
    assert_eq!(
        source,
        "use std::collections::HashMap;\nuse std::time::Duration;\n\nfn main() {\n    let d = Duration::ZERO;\n    let m: HashMap<String, Duration> = HashMap::new();\n}\n"
    );
}

#[test]
fn test_statement_with_own_separators() {
    let source = synth(&[r#"let x = 5; let y = x * 2; println!("{}", y)"#], &[]).expect("synthesis failed");
    assert_eq!(
        source,
        "fn main() {\n    let x = 5;\n    let y = x * 2;\n    println!(\"{}\", y);\n}\n"
    );
}

#[test]
fn test_primitive_casts_need_no_imports() {
    let source = synth(&[r#"println!("{}", 3.5 as i32)"#], &[]).expect("synthesis failed");
    assert!(!source.contains("use "));
}

#[test]
fn test_trailing_comment_does_not_swallow_separator() {
    let source = synth(&["let x = 1 // one", "let y = x + 1"], &[]).expect("synthesis failed");
    assert_eq!(source, "fn main() {\n    let x = 1;\n    let y = x + 1;\n}\n");
}

#[test]
fn test_block_statement() {
    let source = synth(&[r#"for i in 0..3 { println!("{}", i) }"#], &[]).expect("synthesis failed");
    assert!(source.contains("    for i in 0..3 {\n"));
    assert!(!source.contains(";\n    ;"));
}

#[test]
fn test_ambiguous_name_lists_candidates() {
    let err = synth(&["let o = Ordering::Less"], &[]).unwrap_err();
    assert_eq!(
        err,
        SynthError::AmbiguousName {
            name: "Ordering".to_string(),
            candidates: vec![
                "std::cmp::Ordering".to_string(),
                "std::sync::atomic::Ordering".to_string(),
            ],
        }
    );
    assert!(err.to_string().contains("\"-i std::cmp::Ordering\" or \"-i std::sync::atomic::Ordering\""));
}

#[test]
fn test_explicit_import_resolves_ambiguity() {
    let source = synth(&["let o = Ordering::Less"], &["std::cmp::Ordering"]).expect("synthesis failed");
    assert_eq!(
        source,
        "use std::cmp::Ordering;\n\nfn main() {\n    let o = Ordering::Less;\n}\n"
    );
}

#[test]
fn test_explicit_import_outside_std() {
    let source = synth(&["foo::bar()"], &["mycrate::foo"]).expect("synthesis failed");
    assert_eq!(source, "use mycrate::foo;\n\nfn main() {\n    foo::bar();\n}\n");
}

#[test]
fn test_explicit_import_mixed_with_std() {
    let source = synth(
        &[r#"let mut w = String::new(); Write::write_str(&mut w, "hi").unwrap(); println!("{:?}", Instant::now())"#],
        &["std::fmt::Write"],
    )
    .expect("synthesis failed");
    assert!(source.starts_with("use std::fmt::Write;\nuse std::time::Instant;\n\n"));
}

#[test]
fn test_undefined_name() {
    let err = synth(&["foo::bar()"], &[]).unwrap_err();
    assert_eq!(err, SynthError::UndefinedName { name: "foo".to_string() });
    assert!(err.to_string().contains("-i flag"));
}

#[test]
fn test_duplicate_imports_rejected_even_when_unused() {
    let err = synth(&[r#"println!("x")"#], &["a::foo", "b::foo"]).unwrap_err();
    assert_eq!(err, SynthError::DuplicateImport { name: "foo".to_string() });
}

#[test]
fn test_duplicate_imports_checked_before_parsing() {
    let err = synth(&["this is not rust ("], &["a::foo", "b::foo"]).unwrap_err();
    assert!(matches!(err, SynthError::DuplicateImport { .. }));
}

#[test]
fn test_no_statements() {
    let err = synth(&[], &[]).unwrap_err();
    assert_eq!(err, SynthError::NoStatements);
}

#[test]
fn test_parse_error_is_stable() {
    let first = synth(&[r#"println!("x""#], &[]).unwrap_err();
    let second = synth(&[r#"println!("x""#], &[]).unwrap_err();
    assert!(matches!(first, SynthError::Parse { statement: 1, .. }));
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_parse_error_position_is_relative_to_statement() {
    let err = synth(&["let x = "], &[]).unwrap_err();
    match err {
        SynthError::Parse { statement, line, .. } => {
            assert_eq!(statement, 1);
            assert_eq!(line, 1);
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_parse_error_names_statement_when_several() {
    let err = synth(&["let a = 1", "let b = a +"], &[]).unwrap_err();
    assert!(matches!(err, SynthError::Parse { statement: 2, statement_count: 2, .. }));
    assert!(err.to_string().starts_with("statement 2: "));
}

#[test]
fn test_resynthesis_is_stable() {
    let first = synth(
        &[
            "let mut m = HashMap::new()",
            "m.insert(1, Duration::from_secs(2))",
            r#"println!("{:?}", m)"#,
        ],
        &[],
    )
    .expect("synthesis failed");

    let body = main_body(&first);
    let statements: Vec<&str> = body.iter().map(String::as_str).collect();
    let second = synth(&statements, &[]).expect("resynthesis failed");
    assert_eq!(first, second);
}

#[test]
fn test_local_definitions_are_not_imported() {
    let source = synth(
        &[
            "struct Point { x: i32, y: i32 }",
            "fn norm(p: &Point) -> i32 { p.x.abs() + p.y.abs() }",
            r#"println!("{}", norm(&Point { x: 3, y: -4 }))"#,
        ],
        &[],
    )
    .expect("synthesis failed");
    assert!(source.starts_with("fn main() {\n"));
}

#[test]
fn test_names_inside_matches_are_imported() {
    let source = synth(&["let r = matches!(Instant::now(), _)"], &[]).expect("synthesis failed");
    assert!(source.starts_with("use std::time::Instant;\n\nfn main() {\n"), "got: {}", source);
}

#[test]
fn test_explicit_import_used_inside_matches() {
    let source = synth(
        &["assert!(matches!(1i32.cmp(&2), Ordering::Less))"],
        &["std::cmp::Ordering"],
    )
    .expect("synthesis failed");
    assert!(source.starts_with("use std::cmp::Ordering;\n\nfn main() {\n"), "got: {}", source);
}

#[test]
fn test_glob_import_of_local_enum() {
    let source = synth(&["enum E { A, B }", "use E::*", "let v = A"], &[]).expect("synthesis failed");
    assert!(source.starts_with("fn main() {\n"));
}

#[test]
fn test_unclosed_delimiter_is_named() {
    let err = synth(&[r#"println!("x""#], &[]).unwrap_err();
    match err {
        SynthError::Parse { message, line, .. } => {
            assert_eq!(message, "unclosed delimiter");
            assert_eq!(line, 1);
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_unterminated_string_is_named() {
    let err = synth(&["let s = \"abc"], &[]).unwrap_err();
    assert!(
        matches!(&err, SynthError::Parse { message, .. } if message == "unterminated double quote string"),
        "got {:?}",
        err
    );
}
