//! Statement-to-program synthesis
//!
//! Wraps statements in `fn main`, works out which names they need from
//! outside, adds a `use` for each one and prints the result.

use std::collections::{BTreeSet, HashMap};
use std::iter::Peekable;

use proc_macro2::{LexError, LineColumn, TokenStream};

use syn::{Expr, File, Item, ItemUse, Stmt};
use tracing::{debug, trace};

use crate::error::{Result, SynthError};
use crate::scope::free_names;
use crate::stdlib::StdlibIndex;

const WRAPPER_HEAD: &str = "fn main() {";
const WRAPPER_TAIL: &str = "}";
const SEPARATOR: &str = ";";

/// Explicit imports, keyed by the last segment of their path.
#[derive(Debug, Clone, Default)]
pub struct ImportHints {
    by_name: HashMap<String, String>,
}

impl ImportHints {
    /// Validate a list of import paths such as `std::sync::atomic::Ordering`.
    ///
    /// Every path must be a plain Rust path, and no two paths may end in
    /// the same name, whether or not that name is ever used.
    pub fn from_paths<S: AsRef<str>>(paths: &[S]) -> Result<Self> {
        let mut by_name = HashMap::new();
        for path in paths {
            let (name, path) = parse_import(path.as_ref())?;
            if by_name.contains_key(&name) {
                return Err(SynthError::DuplicateImport { name });
            }
            by_name.insert(name, path);
        }
        Ok(Self { by_name })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }
}

/// Split an import path into its short name and normalized text.
fn parse_import(text: &str) -> Result<(String, String)> {
    let invalid = |message: String| SynthError::InvalidImport {
        path: text.to_string(),
        message,
    };

    let path: syn::Path = syn::parse_str(text.trim()).map_err(|e| invalid(e.to_string()))?;
    if path.segments.iter().any(|seg| !seg.arguments.is_none()) {
        return Err(invalid("generic arguments are not allowed".to_string()));
    }
    let name = path
        .segments
        .last()
        .map(|seg| seg.ident.to_string())
        .ok_or_else(|| invalid("empty path".to_string()))?;

    let segments: Vec<String> = path.segments.iter().map(|seg| seg.ident.to_string()).collect();
    let prefix = if path.leading_colon.is_some() { "::" } else { "" };
    Ok((name, format!("{}{}", prefix, segments.join("::"))))
}

/// Turns statements into a complete program.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a> {
    index: &'a StdlibIndex,
}

impl Synthesizer<'static> {
    /// Create a synthesizer backed by the standard library index.
    pub fn new() -> Self {
        Self {
            index: StdlibIndex::global(),
        }
    }
}

impl Default for Synthesizer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Synthesizer<'a> {
    /// Create a synthesizer that resolves names with a custom index.
    pub fn with_index(index: &'a StdlibIndex) -> Self {
        Self { index }
    }

    /// Convert statements to a full program.
    ///
    /// Names the statements use without defining are imported from the
    /// explicit `imports` first, then from the standard library index.
    /// Returns the formatted source text of the program.
    pub fn to_program<S: AsRef<str>>(&self, statements: &[S], imports: &[S]) -> Result<String> {
        if statements.is_empty() {
            return Err(SynthError::NoStatements);
        }
        let hints = ImportHints::from_paths(imports)?;

        let snippet = Snippet::wrap(statements);
        trace!(source = %snippet.source, "wrapped statements");
        let mut file = snippet.parse()?;
        remove_empty_statements(&mut file);

        let mut paths = BTreeSet::new();
        for name in free_names(&file) {
            let path = self.resolve(&name, &hints)?;
            debug!(%name, %path, "resolved import");
            paths.insert(path);
        }

        let uses = paths
            .iter()
            .map(|path| use_item(path))
            .collect::<Result<Vec<_>>>()?;
        let import_count = uses.len();
        file.items.splice(0..0, uses);

        Ok(render(&file, import_count))
    }

    fn resolve(&self, name: &str, hints: &ImportHints) -> Result<String> {
        if let Some(path) = hints.get(name) {
            return Ok(path.to_string());
        }
        match self.index.lookup(name) {
            [] => Err(SynthError::UndefinedName {
                name: name.to_string(),
            }),
            [path] => Ok(path.to_string()),
            candidates => Err(SynthError::AmbiguousName {
                name: name.to_string(),
                candidates: candidates.iter().map(|p| p.to_string()).collect(),
            }),
        }
    }
}

/// Convert statements to a full program using the standard library index.
pub fn to_program<S: AsRef<str>>(statements: &[S], imports: &[S]) -> Result<String> {
    Synthesizer::new().to_program(statements, imports)
}

/// Where one statement sits inside the wrapped source.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    first_line: usize,
    line_count: usize,
    last_line_chars: usize,
}

/// Statements wrapped in `fn main`, each followed by its own `;` line so
/// a trailing comment can't swallow the separator.
struct Snippet {
    source: String,
    fragments: Vec<Fragment>,
}

impl Snippet {
    fn wrap<S: AsRef<str>>(statements: &[S]) -> Self {
        let mut source = String::new();
        let mut fragments = Vec::with_capacity(statements.len());

        source.push_str(WRAPPER_HEAD);
        source.push('\n');
        let mut line = 2;
        for statement in statements {
            let text = statement.as_ref();
            let lines: Vec<&str> = text.split('\n').collect();
            fragments.push(Fragment {
                first_line: line,
                line_count: lines.len(),
                last_line_chars: lines.last().map_or(0, |l| l.chars().count()),
            });
            source.push_str(text);
            source.push('\n');
            source.push_str(SEPARATOR);
            source.push('\n');
            line += lines.len() + 1;
        }
        source.push_str(WRAPPER_TAIL);
        source.push('\n');

        Self { source, fragments }
    }

    fn parse(&self) -> Result<File> {
        let tokens: TokenStream = self.source.parse().map_err(|err: LexError| {
            self.parse_error(err.span().start(), describe_lex_error(&self.source).to_string())
        })?;
        syn::parse2(tokens).map_err(|err| self.parse_error(err.span().start(), err.to_string()))
    }

    fn parse_error(&self, start: LineColumn, message: String) -> SynthError {
        let (statement, line, column) = self.locate(start.line, start.column);
        SynthError::Parse {
            statement,
            statement_count: self.fragments.len(),
            line,
            column,
            message,
        }
    }

    /// Map a wrapped-source position (1-based line, 0-based column) to
    /// a 1-based (statement, line, column) in the user's text. Positions
    /// on wrapper lines move to the end of the statement before them.
    fn locate(&self, line: usize, column: usize) -> (usize, usize, usize) {
        let mut previous = None;
        for (i, fragment) in self.fragments.iter().enumerate() {
            if line < fragment.first_line {
                break;
            }
            if line < fragment.first_line + fragment.line_count {
                return (i + 1, line - fragment.first_line + 1, column + 1);
            }
            previous = Some((i, fragment));
        }
        match previous {
            Some((i, fragment)) => (i + 1, fragment.line_count, fragment.last_line_chars + 1),
            None => (1, 1, 1),
        }
    }
}

/// Name the lexical problem in `source` the way rustc words it. The
/// tokenizer only reports that lexing failed, not why.
fn describe_lex_error(source: &str) -> &'static str {
    let mut open = Vec::new();
    let mut chars = source.chars().peekable();
    let mut prev = ' ';
    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                if !skip_block_comment(&mut chars) {
                    return "unterminated block comment";
                }
            }
            '"' => {
                if !skip_string(&mut chars) {
                    return "unterminated double quote string";
                }
            }
            'r' if !is_ident_char(prev) && matches!(chars.peek(), Some('"') | Some('#')) => {
                if !skip_raw_string(&mut chars) {
                    return "unterminated raw string";
                }
            }
            '\'' => skip_char_literal(&mut chars),
            '(' | '[' | '{' => open.push(c),
            ')' | ']' | '}' => {
                let opener = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if open.last() == Some(&opener) {
                    open.pop();
                } else if open.contains(&opener) {
                    return "unclosed delimiter";
                } else {
                    return "unexpected closing delimiter";
                }
            }
            _ => {}
        }
        prev = c;
    }
    if open.is_empty() {
        "invalid token"
    } else {
        "unclosed delimiter"
    }
}

type Chars<'a> = Peekable<std::str::Chars<'a>>;

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Skip to the end of a (possibly nested) block comment.
fn skip_block_comment(chars: &mut Chars) -> bool {
    let mut depth = 1;
    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                depth += 1;
            }
            '*' if chars.peek() == Some(&'/') => {
                chars.next();
                depth -= 1;
                if depth == 0 {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

fn skip_string(chars: &mut Chars) -> bool {
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '"' => return true,
            _ => {}
        }
    }
    false
}

/// Skip `r"..."` or `r#"..."#`. A raw identifier such as `r#type` is
/// left as is.
fn skip_raw_string(chars: &mut Chars) -> bool {
    let mut hashes = 0;
    while chars.peek() == Some(&'#') {
        chars.next();
        hashes += 1;
    }
    if chars.peek() != Some(&'"') {
        return true;
    }
    chars.next();
    while let Some(c) = chars.next() {
        if c == '"' {
            let mut closing = 0;
            while closing < hashes && chars.peek() == Some(&'#') {
                chars.next();
                closing += 1;
            }
            if closing == hashes {
                return true;
            }
        }
    }
    false
}

/// Skip a character literal; lifetimes and labels are left alone.
fn skip_char_literal(chars: &mut Chars) {
    let mut ahead = chars.clone();
    match ahead.next() {
        Some('\\') => {
            chars.next();
            chars.next();
            for c in chars.by_ref() {
                if c == '\'' || c == '\n' {
                    break;
                }
            }
        }
        Some(_) if ahead.next() == Some('\'') => {
            chars.next();
            chars.next();
        }
        _ => {}
    }
}

/// Drop the empty statements left behind by the separator lines.
fn remove_empty_statements(file: &mut File) {
    if let Some(Item::Fn(main)) = file.items.first_mut() {
        main.block
            .stmts
            .retain(|stmt| !matches!(stmt, Stmt::Expr(Expr::Verbatim(tokens), _) if tokens.is_empty()));
    }
}

fn use_item(path: &str) -> Result<Item> {
    syn::parse_str::<ItemUse>(&format!("use {};", path))
        .map(Item::Use)
        .map_err(|e| SynthError::InvalidImport {
            path: path.to_string(),
            message: e.to_string(),
        })
}

/// Print the imports and the rest of the file as two blocks separated
/// by a blank line.
fn render(file: &File, import_count: usize) -> String {
    let (imports, rest) = file.items.split_at(import_count);
    let body = unparse(rest);
    if imports.is_empty() {
        body
    } else {
        format!("{}\n{}", unparse(imports), body)
    }
}

fn unparse(items: &[Item]) -> String {
    prettyplease::unparse(&File {
        shebang: None,
        attrs: Vec::new(),
        items: items.to_vec(),
    })
}
