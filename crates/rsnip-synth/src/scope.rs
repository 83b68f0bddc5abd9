//! Free name analysis
//!
//! Finds the names a program uses without defining them. The first pass
//! collects every name bound anywhere in the file, the second walks all
//! paths and keeps the roots that are neither bound nor built in.

use std::collections::{HashMap, HashSet};

use syn::parse::ParseStream;
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::{Attribute, Expr, File, Ident, Item, Macro, Pat, Path, Token, UseTree};

use crate::stdlib::{is_builtin, is_builtin_macro};

/// Names used in `file` that nothing in the file or the prelude
/// provides, each listed once in order of first use.
pub fn free_names(file: &File) -> Vec<String> {
    let bindings = Bindings::collect(file);

    let mut references = References {
        bound: &bindings.names,
        seen: HashSet::new(),
        found: Vec::new(),
    };
    references.visit_file(file);
    references.found
}

/// Std macros whose bodies are ordinary comma-separated expressions.
fn takes_expr_args(name: &str) -> bool {
    matches!(
        name,
        "print" | "println" | "eprint" | "eprintln"
            | "format" | "format_args" | "write" | "writeln"
            | "panic" | "assert" | "assert_eq" | "assert_ne"
            | "debug_assert" | "debug_assert_eq" | "debug_assert_ne"
            | "vec" | "dbg" | "todo" | "unimplemented" | "unreachable"
    )
}

/// Expressions and patterns found in the body of a std macro.
#[derive(Default)]
struct MacroArgs {
    exprs: Vec<Expr>,
    pats: Vec<Pat>,
}

impl MacroArgs {
    fn visit<V>(&self, visitor: &mut V)
    where
        V: for<'a> Visit<'a>,
    {
        for pat in &self.pats {
            visitor.visit_pat(pat);
        }
        for expr in &self.exprs {
            visitor.visit_expr(expr);
        }
    }
}

/// Parse the arguments of a std macro so the names inside it can be
/// seen. Returns `None` for macros with opaque bodies. Qualified calls
/// such as `std::println!` are recognized by their last segment.
fn macro_args(mac: &Macro) -> Option<MacroArgs> {
    let name = mac.path.segments.last()?.ident.to_string();
    if name == "matches" {
        return mac.parse_body_with(matches_form).ok();
    }
    if !takes_expr_args(&name) {
        return None;
    }

    if name == "vec" {
        if let Ok(exprs) = mac.parse_body_with(repeat_form) {
            return Some(MacroArgs { exprs, pats: Vec::new() });
        }
    }

    let args = mac
        .parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated)
        .ok()?;

    // `name = value` format arguments: only the value refers to anything
    let exprs = args
        .into_iter()
        .map(|arg| match arg {
            Expr::Assign(assign) if matches!(*assign.left, Expr::Path(_)) => *assign.right,
            other => other,
        })
        .collect();
    Some(MacroArgs { exprs, pats: Vec::new() })
}

/// `vec![elem; len]`
fn repeat_form(input: ParseStream) -> syn::Result<Vec<Expr>> {
    let elem: Expr = input.parse()?;
    input.parse::<Token![;]>()?;
    let len: Expr = input.parse()?;
    Ok(vec![elem, len])
}

/// `matches!(expr, pattern)` with an optional `if` guard.
fn matches_form(input: ParseStream) -> syn::Result<MacroArgs> {
    let mut args = MacroArgs::default();
    args.exprs.push(input.parse()?);
    input.parse::<Token![,]>()?;
    args.pats.push(Pat::parse_multi_with_leading_vert(input)?);
    if input.peek(Token![if]) {
        input.parse::<Token![if]>()?;
        args.exprs.push(input.parse()?);
    }
    if input.peek(Token![,]) {
        input.parse::<Token![,]>()?;
    }
    Ok(args)
}

/// First pass: every name introduced by a pattern, item, import or
/// generic parameter. Scoping is ignored; a name bound anywhere counts
/// as bound everywhere. A glob import binds the members of a local enum
/// or inline module it names; globs over anything else bind nothing.
#[derive(Default)]
struct Bindings {
    names: HashSet<String>,
    members: HashMap<String, Vec<String>>,
    globs: Vec<String>,
}

impl Bindings {
    fn collect(file: &File) -> Self {
        let mut bindings = Self::default();
        bindings.visit_file(file);
        bindings.expand_globs();
        bindings
    }

    fn bind(&mut self, ident: &Ident) {
        self.names.insert(ident.to_string());
    }

    fn expand_globs(&mut self) {
        for glob in &self.globs {
            if let Some(members) = self.members.get(glob) {
                self.names.extend(members.iter().cloned());
            }
        }
    }

    fn bind_use_tree(&mut self, tree: &UseTree, parent: Option<&Ident>) {
        match tree {
            UseTree::Path(path) => self.bind_use_tree(&path.tree, Some(&path.ident)),
            UseTree::Name(name) if name.ident == "self" => {
                if let Some(parent) = parent {
                    self.bind(parent);
                }
            }
            UseTree::Name(name) => self.bind(&name.ident),
            UseTree::Rename(rename) => self.bind(&rename.rename),
            UseTree::Glob(_) => {
                if let Some(parent) = parent {
                    self.globs.push(parent.to_string());
                }
            }
            UseTree::Group(group) => {
                for item in &group.items {
                    self.bind_use_tree(item, parent);
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for Bindings {
    fn visit_pat_ident(&mut self, node: &'ast syn::PatIdent) {
        self.bind(&node.ident);
        visit::visit_pat_ident(self, node);
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.bind(&node.sig.ident);
        visit::visit_item_fn(self, node);
    }

    fn visit_item_struct(&mut self, node: &'ast syn::ItemStruct) {
        self.bind(&node.ident);
        visit::visit_item_struct(self, node);
    }

    fn visit_item_enum(&mut self, node: &'ast syn::ItemEnum) {
        self.bind(&node.ident);
        let variants = node.variants.iter().map(|v| v.ident.to_string()).collect();
        self.members.insert(node.ident.to_string(), variants);
        visit::visit_item_enum(self, node);
    }

    fn visit_item_union(&mut self, node: &'ast syn::ItemUnion) {
        self.bind(&node.ident);
        visit::visit_item_union(self, node);
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        self.bind(&node.ident);
        visit::visit_item_trait(self, node);
    }

    fn visit_item_type(&mut self, node: &'ast syn::ItemType) {
        self.bind(&node.ident);
        visit::visit_item_type(self, node);
    }

    fn visit_item_const(&mut self, node: &'ast syn::ItemConst) {
        self.bind(&node.ident);
        visit::visit_item_const(self, node);
    }

    fn visit_item_static(&mut self, node: &'ast syn::ItemStatic) {
        self.bind(&node.ident);
        visit::visit_item_static(self, node);
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.bind(&node.ident);
        if let Some((_, items)) = &node.content {
            let names = items.iter().filter_map(item_ident).map(|i| i.to_string()).collect();
            self.members.insert(node.ident.to_string(), names);
        }
        visit::visit_item_mod(self, node);
    }

    fn visit_item_macro(&mut self, node: &'ast syn::ItemMacro) {
        if let Some(ident) = &node.ident {
            self.bind(ident);
        }
        visit::visit_item_macro(self, node);
    }

    fn visit_item_extern_crate(&mut self, node: &'ast syn::ItemExternCrate) {
        match &node.rename {
            Some((_, rename)) => self.bind(rename),
            None => self.bind(&node.ident),
        }
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.bind_use_tree(&node.tree, None);
    }

    fn visit_type_param(&mut self, node: &'ast syn::TypeParam) {
        self.bind(&node.ident);
        visit::visit_type_param(self, node);
    }

    fn visit_const_param(&mut self, node: &'ast syn::ConstParam) {
        self.bind(&node.ident);
        visit::visit_const_param(self, node);
    }

    fn visit_macro(&mut self, mac: &'ast Macro) {
        if let Some(args) = macro_args(mac) {
            args.visit(self);
        }
    }
}

/// Name an item introduces into its enclosing module, if any.
fn item_ident(item: &Item) -> Option<&Ident> {
    match item {
        Item::Const(i) => Some(&i.ident),
        Item::Enum(i) => Some(&i.ident),
        Item::Fn(i) => Some(&i.sig.ident),
        Item::Macro(i) => i.ident.as_ref(),
        Item::Mod(i) => Some(&i.ident),
        Item::Static(i) => Some(&i.ident),
        Item::Struct(i) => Some(&i.ident),
        Item::Trait(i) => Some(&i.ident),
        Item::Type(i) => Some(&i.ident),
        Item::Union(i) => Some(&i.ident),
        _ => None,
    }
}

/// Second pass: the root segment of every relative path.
struct References<'a> {
    bound: &'a HashSet<String>,
    seen: HashSet<String>,
    found: Vec<String>,
}

impl References<'_> {
    fn record(&mut self, ident: &Ident) {
        let name = ident.to_string();
        if is_builtin(&name) || self.bound.contains(&name) {
            return;
        }
        if self.seen.insert(name.clone()) {
            self.found.push(name);
        }
    }
}

impl<'ast> Visit<'ast> for References<'_> {
    fn visit_path(&mut self, path: &'ast Path) {
        if path.leading_colon.is_none() {
            if let Some(first) = path.segments.first() {
                self.record(&first.ident);
            }
        }
        visit::visit_path(self, path);
    }

    fn visit_attribute(&mut self, _node: &'ast Attribute) {}

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        if node.leading_colon.is_none() {
            if let UseTree::Path(path) = &node.tree {
                self.record(&path.ident);
            }
        }
    }

    fn visit_macro(&mut self, mac: &'ast Macro) {
        match mac.path.get_ident() {
            Some(ident) => {
                if !is_builtin_macro(&ident.to_string()) {
                    self.record(ident);
                }
            }
            None => self.visit_path(&mac.path),
        }
        if let Some(args) = macro_args(mac) {
            args.visit(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free(body: &str) -> Vec<String> {
        let source = format!("fn main() {{\n{}\n}}\n", body);
        let file = syn::parse_file(&source).expect("test source should parse");
        free_names(&file)
    }

    #[test]
    fn test_module_paths_are_free() {
        assert_eq!(free("fs::read(\"x\");"), vec!["fs"]);
        assert_eq!(free("let m = HashMap::<u8, u8>::new();"), vec!["HashMap"]);
    }

    #[test]
    fn test_first_occurrence_order_without_repeats() {
        let names = free("let a = Instant::now(); let b = HashMap::<u8, u8>::new(); let c = Instant::now();");
        assert_eq!(names, vec!["Instant", "HashMap"]);
    }

    #[test]
    fn test_prelude_and_primitives_are_not_free() {
        let names = free("let v: Vec<String> = Vec::new(); let n = i32::MAX; let o: Option<u8> = None; drop(v);");
        assert!(names.is_empty(), "unexpected free names: {:?}", names);
    }

    #[test]
    fn test_locals_are_bound() {
        let names = free("let x = 5; let f = |y: i32| y * x; for i in 0..3 { f(i); }");
        assert!(names.is_empty(), "unexpected free names: {:?}", names);
    }

    #[test]
    fn test_local_items_are_bound() {
        let body = r#"
struct Point { x: i32 }
enum Shape { Dot(Point) }
fn area<T: Copy>(t: T) -> T { t }
let s = Shape::Dot(Point { x: area(1) });
"#;
        assert!(free(body).is_empty());
    }

    #[test]
    fn test_names_inside_format_macros() {
        assert_eq!(free("println!(\"{:?}\", Instant::now());"), vec!["Instant"]);
        assert_eq!(free("let v = vec![Duration::ZERO; 3];"), vec!["Duration"]);
    }

    #[test]
    fn test_named_format_args_only_count_values() {
        assert_eq!(free("println!(\"{t:?}\", t = SystemTime::now());"), vec!["SystemTime"]);
    }

    #[test]
    fn test_closure_params_inside_macros_are_bound() {
        let names = free("let v = vec![1, 2]; println!(\"{}\", v.iter().map(|n| n * 2).sum::<i32>());");
        assert!(names.is_empty(), "unexpected free names: {:?}", names);
    }

    #[test]
    fn test_use_statements_bind_names() {
        let names = free("use std::io::{self, Write}; io::stdout().flush().unwrap();");
        assert!(names.is_empty(), "unexpected free names: {:?}", names);
    }

    #[test]
    fn test_use_roots_are_references() {
        assert_eq!(free("use fmt::Write as _;"), vec!["fmt"]);
    }

    #[test]
    fn test_trait_bounds_and_impls() {
        let body = "struct P; impl fmt::Display for P { fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { Ok(()) } }";
        assert_eq!(free(body), vec!["fmt"]);
    }

    #[test]
    fn test_attributes_are_ignored() {
        assert!(free("#[derive(Debug, Hash)] struct P;").is_empty());
    }

    #[test]
    fn test_names_inside_matches() {
        assert_eq!(free("let r = matches!(Instant::now(), _);"), vec!["Instant"]);
        assert_eq!(free("assert!(matches!(1.cmp(&2), Ordering::Less | Ordering::Equal));"), vec!["Ordering"]);
    }

    #[test]
    fn test_matches_guard_sees_pattern_bindings() {
        let names = free("let d = Some(1); let r = matches!(d, Some(n) if n > i32::from(Wrapping(2).0));");
        assert_eq!(names, vec!["Wrapping"]);
    }

    #[test]
    fn test_qualified_std_macros_are_parsed() {
        assert_eq!(free("std::println!(\"{:?}\", Duration::ZERO);"), vec!["Duration"]);
    }

    #[test]
    fn test_glob_over_local_enum_binds_variants() {
        assert!(free("enum E { A, B } use E::*; let v = A;").is_empty());
    }

    #[test]
    fn test_glob_over_local_module_binds_items() {
        assert!(free("mod shapes { pub struct Square; } use shapes::*; let s = Square;").is_empty());
    }

    #[test]
    fn test_glob_over_unknown_path_binds_nothing() {
        assert_eq!(free("use io::*; let r = stdin();"), vec!["io", "stdin"]);
    }

    #[test]
    fn test_unknown_macro_is_free() {
        assert_eq!(free("let v = json!({});"), vec!["json"]);
    }

    #[test]
    fn test_leading_colon_paths_are_absolute() {
        assert!(free("let m = ::std::collections::HashMap::<u8, u8>::new();").is_empty());
    }

    #[test]
    fn test_undefined_local_is_free() {
        assert_eq!(free("println!(\"{}\", y);"), vec!["y"]);
    }
}
