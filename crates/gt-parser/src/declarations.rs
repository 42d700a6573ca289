//! Declaration extraction from Go syntax trees.
//!
//! Turns the captures of the declaration query into [`FunctionSignature`]s,
//! [`ImportSpec`]s and [`StructDecl`]s. Types are kept as source text.

use gt_core::{
    Field, FunctionSignature, ImportSpec, Receiver, StructDecl, TypeExpr, is_exported,
};
use smallvec::{Array, SmallVec, smallvec};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor, Tree};

use crate::node::{node_text, node_to_location};
use crate::queries::{
    CAPTURE_FUNCTION, CAPTURE_IMPORT_SPEC, CAPTURE_METHOD, CAPTURE_PACKAGE_CLAUSE,
    CAPTURE_PACKAGE_NAME, CAPTURE_STRUCT_BODY, CAPTURE_STRUCT_NAME,
};

/// Everything extracted from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    /// Package clause name.
    pub package: Option<String>,

    /// Byte offset just past the package clause.
    pub package_end: usize,

    /// Imports in source order.
    pub imports: Vec<ImportSpec>,

    /// Functions and methods in source order.
    pub functions: Vec<FunctionSignature>,

    /// Top-level struct types in source order.
    pub structs: Vec<StructDecl>,
}

/// Extracts declarations from a parsed Go syntax tree.
///
/// # Arguments
///
/// * `tree` - The parsed syntax tree
/// * `source` - The original source code (needed to extract text from nodes)
/// * `query` - The pre-compiled declaration query
pub fn extract_declarations(tree: &Tree, source: &str, query: &Query) -> Declarations {
    let source_bytes = source.as_bytes();
    let mut decls = Declarations::default();

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, tree.root_node(), source_bytes);

    while let Some(match_) = matches.next() {
        let mut struct_name = None;
        let mut struct_body = None;

        for capture in match_.captures {
            let node = capture.node;
            match capture.index {
                CAPTURE_PACKAGE_NAME => {
                    decls.package = node_text(node, source_bytes).map(str::to_owned);
                }
                CAPTURE_PACKAGE_CLAUSE => decls.package_end = node.end_byte(),
                CAPTURE_IMPORT_SPEC => {
                    if let Some(spec) = import_spec(node, source_bytes) {
                        decls.imports.push(spec);
                    }
                }
                CAPTURE_FUNCTION | CAPTURE_METHOD => {
                    if let Some(signature) = function_signature(node, source_bytes) {
                        decls.functions.push(signature);
                    }
                }
                CAPTURE_STRUCT_NAME => struct_name = node_text(node, source_bytes),
                CAPTURE_STRUCT_BODY => struct_body = Some(node),
                _ => {}
            }
        }

        if let (Some(name), Some(body)) = (struct_name, struct_body) {
            decls.structs.push(struct_decl(name, body, source_bytes));
        }
    }

    for decl in &mut decls.structs {
        decl.imports.clone_from(&decls.imports);
    }

    decls.functions.sort_by_key(|f| f.location);
    decls
}

/// Builds an [`ImportSpec`] from an `import_spec` node.
fn import_spec(node: Node<'_>, source: &[u8]) -> Option<ImportSpec> {
    let path = node_text(node.child_by_field_name("path")?, source)?;
    let path = path.trim_matches(|c| c == '"' || c == '`');
    let alias = node
        .child_by_field_name("name")
        .and_then(|n| node_text(n, source));
    Some(ImportSpec::new(alias, path))
}

/// Builds a [`FunctionSignature`] from a `function_declaration` or
/// `method_declaration` node.
fn function_signature(node: Node<'_>, source: &[u8]) -> Option<FunctionSignature> {
    let name = node_text(node.child_by_field_name("name")?, source)?;

    let receiver = node
        .child_by_field_name("receiver")
        .and_then(|list| receiver(list, source));

    let params = node
        .child_by_field_name("parameters")
        .map(|list| parameter_list(list, source))
        .unwrap_or_default();

    let results = match node.child_by_field_name("result") {
        Some(list) if list.kind() == "parameter_list" => parameter_list(list, source),
        Some(ty) => smallvec![Field::unnamed(TypeExpr::new(node_text(ty, source)?))],
        None => SmallVec::new(),
    };

    Some(FunctionSignature {
        name: name.to_owned(),
        receiver,
        params,
        results,
        exported: is_exported(name),
        generic: node.child_by_field_name("type_parameters").is_some(),
        location: node_to_location(node),
    })
}

/// Collects the fields of a `parameter_list`, one per declared name.
fn parameter_list<A: Array<Item = Field>>(list: Node<'_>, source: &[u8]) -> SmallVec<A> {
    let mut fields = SmallVec::new();
    let mut cursor = list.walk();

    for param in list.named_children(&mut cursor) {
        let variadic = match param.kind() {
            "parameter_declaration" => false,
            "variadic_parameter_declaration" => true,
            _ => continue,
        };
        let Some(ty) = param
            .child_by_field_name("type")
            .and_then(|t| node_text(t, source))
        else {
            continue;
        };
        let ty = if variadic {
            TypeExpr::variadic(ty)
        } else {
            TypeExpr::new(ty)
        };

        let mut name_cursor = param.walk();
        let names: SmallVec<[&str; 4]> = param
            .children_by_field_name("name", &mut name_cursor)
            .filter_map(|n| node_text(n, source))
            .collect();

        if names.is_empty() {
            fields.push(Field::unnamed(ty));
        } else {
            for name in names {
                fields.push(Field::named(name, ty.clone()));
            }
        }
    }

    fields
}

/// Builds a [`Receiver`] from a method's receiver `parameter_list`.
fn receiver(list: Node<'_>, source: &[u8]) -> Option<Receiver> {
    let mut cursor = list.walk();
    let param = list
        .named_children(&mut cursor)
        .find(|n| n.kind() == "parameter_declaration")?;

    let name = param
        .child_by_field_name("name")
        .and_then(|n| node_text(n, source))
        .map(str::to_owned);
    let text = node_text(param.child_by_field_name("type")?, source)?;
    let (type_name, pointer, generic) = split_receiver_type(text);

    Some(Receiver {
        name,
        type_name: type_name.to_owned(),
        pointer,
        generic,
        fields: None,
    })
}

/// Splits receiver type text into base name, pointer flag and generic flag.
///
/// `*Stack[T]` → `("Stack", true, true)`.
pub(crate) fn split_receiver_type(text: &str) -> (&str, bool, bool) {
    let trimmed = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim();
    let (pointer, rest) = match trimmed.strip_prefix('*') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    match rest.split_once('[') {
        Some((base, _)) => (base.trim_end(), pointer, true),
        None => (rest, pointer, false),
    }
}

/// Builds a [`StructDecl`] from a `struct_type` node.
fn struct_decl(name: &str, body: Node<'_>, source: &[u8]) -> StructDecl {
    let mut fields = Vec::new();
    let mut body_cursor = body.walk();

    for list in body
        .named_children(&mut body_cursor)
        .filter(|n| n.kind() == "field_declaration_list")
    {
        let mut cursor = list.walk();
        for decl in list
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "field_declaration")
        {
            let Some(ty) = decl
                .child_by_field_name("type")
                .and_then(|t| node_text(t, source))
            else {
                continue;
            };

            let mut name_cursor = decl.walk();
            let names: SmallVec<[&str; 4]> = decl
                .children_by_field_name("name", &mut name_cursor)
                .filter_map(|n| node_text(n, source))
                .collect();

            if names.is_empty() {
                let pointer = node_text(decl, source).is_some_and(|t| t.starts_with('*'));
                let embedded = if pointer {
                    TypeExpr::new(&format!("*{ty}"))
                } else {
                    TypeExpr::new(ty)
                };
                fields.push(Field::named(embedded_name(ty), embedded));
            } else {
                let ty = TypeExpr::new(ty);
                for field_name in names {
                    fields.push(Field::named(field_name, ty.clone()));
                }
            }
        }
    }

    StructDecl {
        name: name.to_owned(),
        fields,
        imports: Vec::new(),
    }
}

/// The implicit field name of an embedded type (`*pkg.Base[T]` → `Base`).
fn embedded_name(ty: &str) -> &str {
    let base = ty.split_once('[').map_or(ty, |(b, _)| b);
    let base = base.trim().trim_start_matches('*');
    base.rsplit_once('.').map_or(base, |(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{get_declaration_query, go_language};
    use tree_sitter::Parser;

    fn extract(source: &str) -> Declarations {
        let mut parser = Parser::new();
        parser
            .set_language(&go_language())
            .expect("Failed to set language");
        let tree = parser.parse(source, None).expect("Parse failed");
        let query = get_declaration_query().expect("Query should compile");
        extract_declarations(&tree, source, query)
    }

    #[test]
    fn test_package_clause() {
        let source = "package calc\n\nfunc Add() {}\n";
        let decls = extract(source);
        assert_eq!(decls.package.as_deref(), Some("calc"));
        assert_eq!(&source[..decls.package_end], "package calc");
    }

    #[test]
    fn test_imports() {
        let decls = extract(
            r#"package a

import "fmt"

import (
	"net/http"
	str "strings"
	_ "embed"
	. "math"
	raw `os`
)
"#,
        );
        let imports: Vec<(Option<&str>, &str)> = decls
            .imports
            .iter()
            .map(|i| (i.alias.as_deref(), i.path.as_str()))
            .collect();
        assert_eq!(
            imports,
            vec![
                (None, "fmt"),
                (None, "net/http"),
                (Some("str"), "strings"),
                (Some("_"), "embed"),
                (Some("."), "math"),
                (Some("raw"), "os"),
            ]
        );
    }

    #[test]
    fn test_function_params_and_results() {
        let decls = extract(
            "package a\n\nfunc Parse(s string, base, bits int) (n int64, err error) { return }\n",
        );
        assert_eq!(decls.functions.len(), 1);
        let f = &decls.functions[0];
        assert_eq!(f.name, "Parse");
        assert!(f.exported);
        assert!(!f.generic);
        assert!(f.receiver.is_none());

        let params: Vec<(Option<&str>, &str)> = f
            .params
            .iter()
            .map(|p| (p.name.as_deref(), p.ty.text()))
            .collect();
        assert_eq!(
            params,
            vec![(Some("s"), "string"), (Some("base"), "int"), (Some("bits"), "int")]
        );
        assert_eq!(f.results.len(), 2);
        assert!(f.returns_error());
        assert_eq!(f.location.line, 3);
    }

    #[test]
    fn test_single_result_type() {
        let decls = extract("package a\n\nfunc Now() *time.Time { return nil }\n");
        let f = &decls.functions[0];
        assert_eq!(f.results.len(), 1);
        assert_eq!(f.results[0].name, None);
        assert_eq!(f.results[0].ty.text(), "*time.Time");
    }

    #[test]
    fn test_unnamed_and_variadic_params() {
        let decls = extract("package a\n\nfunc join(string, ...int) {}\nfunc log(format string, args ...any) {}\n");
        let join = &decls.functions[0];
        assert_eq!(join.params.len(), 2);
        assert_eq!(join.params[0].name, None);
        assert!(join.params[1].ty.is_variadic());
        assert_eq!(join.params[1].ty.text(), "int");
        assert!(!join.exported);

        let log = &decls.functions[1];
        assert_eq!(log.params[1].name.as_deref(), Some("args"));
        assert_eq!(log.params[1].ty.slot_type(), "[]any");
    }

    #[test]
    fn test_methods() {
        let decls = extract(
            "package a\n\ntype Calc struct{ base int }\n\nfunc (c *Calc) Add(a int) int { return c.base + a }\nfunc (Calc) reset() {}\n",
        );
        assert_eq!(decls.functions.len(), 2);

        let add = &decls.functions[0];
        let recv = add.receiver.as_ref().expect("Should have receiver");
        assert_eq!(recv.name.as_deref(), Some("c"));
        assert_eq!(recv.type_name, "Calc");
        assert!(recv.pointer);
        assert_eq!(add.qualified_name(), "Calc.Add");

        let reset = &decls.functions[1];
        let recv = reset.receiver.as_ref().expect("Should have receiver");
        assert_eq!(recv.name, None);
        assert!(!recv.pointer);
    }

    #[test]
    fn test_generics() {
        let decls = extract(
            "package a\n\nfunc Map[T, U any](xs []T, f func(T) U) []U { return nil }\n\ntype Stack[T any] struct{ items []T }\n\nfunc (s *Stack[T]) Push(v T) {}\n",
        );
        assert_eq!(decls.functions.len(), 2);
        assert!(decls.functions[0].generic);
        assert!(decls.functions[0].is_generic());

        let push = &decls.functions[1];
        assert!(!push.generic);
        assert!(push.is_generic());
        assert_eq!(push.receiver.as_ref().map(|r| r.type_name.as_str()), Some("Stack"));
    }

    #[test]
    fn test_struct_fields() {
        let decls = extract(
            r#"package a

type Server struct {
	Addr, Host string
	*log.Logger
	sync.Mutex
	handlers map[string]func() `json:"h"`
}
"#,
        );
        assert_eq!(decls.structs.len(), 1);
        let server = &decls.structs[0];
        assert_eq!(server.name, "Server");

        let fields: Vec<(&str, &str)> = server
            .fields
            .iter()
            .map(|f| (f.name.as_deref().unwrap_or(""), f.ty.text()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("Addr", "string"),
                ("Host", "string"),
                ("Logger", "*log.Logger"),
                ("Mutex", "sync.Mutex"),
                ("handlers", "map[string]func()"),
            ]
        );
    }

    #[test]
    fn test_struct_keeps_file_imports() {
        let decls = extract(
            "package a\n\nimport (\n\t\"time\"\n\tpb \"example.com/api/proto\"\n)\n\ntype Job struct {\n\tevery time.Duration\n\treq   *pb.Request\n}\n",
        );
        let job = &decls.structs[0];
        assert_eq!(
            job.imports,
            vec![
                ImportSpec::new(None, "time"),
                ImportSpec::new(Some("pb"), "example.com/api/proto"),
            ]
        );
    }

    #[test]
    fn test_non_struct_types_ignored() {
        let decls = extract("package a\n\ntype Celsius float64\ntype Shape interface{ Area() float64 }\n");
        assert!(decls.structs.is_empty());
        assert!(decls.functions.is_empty());
    }

    #[test]
    fn test_nested_functions_not_captured() {
        let decls = extract(
            "package a\n\nfunc Outer() func() int {\n\treturn func() int { return 1 }\n}\n",
        );
        assert_eq!(decls.functions.len(), 1);
        assert_eq!(decls.functions[0].name, "Outer");
    }

    #[test]
    fn test_split_receiver_type() {
        assert_eq!(split_receiver_type("Calc"), ("Calc", false, false));
        assert_eq!(split_receiver_type("*Calc"), ("Calc", true, false));
        assert_eq!(split_receiver_type("*Stack[T]"), ("Stack", true, true));
        assert_eq!(split_receiver_type("Pair[K, V]"), ("Pair", false, true));
        assert_eq!(split_receiver_type("(*Calc)"), ("Calc", true, false));
    }

    #[test]
    fn test_embedded_name() {
        assert_eq!(embedded_name("Base"), "Base");
        assert_eq!(embedded_name("log.Logger"), "Logger");
        assert_eq!(embedded_name("List[T]"), "List");
    }
}
