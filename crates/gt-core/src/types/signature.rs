//! Go function signatures as seen by the test generator.
//!
//! A [`FunctionSignature`] is built once by the source indexer and never
//! mutated afterwards. Types are kept as verbatim source text in a
//! [`TypeExpr`]; the generator only needs to print them back, pick a zero
//! value and decide how results are compared.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::location::SourceLocation;

/// Builtin types that support `!=` and have a literal zero value.
const NUMERIC_TYPES: &[&str] = &[
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "float32",
    "float64",
    "complex64",
    "complex128",
    "byte",
    "rune",
];

/// Type prefixes whose zero value is `nil`.
const NIL_PREFIXES: &[&str] = &["*", "[]", "map[", "chan", "<-chan", "func", "interface"];

/// A Go type expression.
///
/// The text is the type as written in the source with runs of blanks
/// collapsed. Multi-line anonymous types are folded onto one line the way
/// gofmt prints them (`struct{ A int; B string }`), with line comments
/// dropped.
///
/// For a variadic parameter `xs ...T` the text is `T` and
/// [`is_variadic`](Self::is_variadic) is set.
///
/// # Examples
///
/// ```
/// use gt_core::TypeExpr;
///
/// let ty = TypeExpr::new("map[string]  int");
/// assert_eq!(ty.text(), "map[string] int");
/// assert_eq!(ty.zero_literal(), Some("nil"));
/// assert!(!ty.is_basic());
///
/// let ty = TypeExpr::variadic("string");
/// assert_eq!(ty.slot_type(), "[]string");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeExpr {
    text: String,
    variadic: bool,
}

impl TypeExpr {
    /// Creates a type from source text.
    pub fn new(raw: &str) -> Self {
        Self {
            text: normalize(raw),
            variadic: false,
        }
    }

    /// Creates the type of a variadic parameter from its element type.
    pub fn variadic(element: &str) -> Self {
        Self {
            text: normalize(element),
            variadic: true,
        }
    }

    /// The type text (the element type for variadic parameters).
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` for `...T` parameters.
    #[inline]
    pub const fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Returns `true` for `*T`.
    #[inline]
    pub fn is_pointer(&self) -> bool {
        !self.variadic && self.text.starts_with('*')
    }

    /// Returns `true` for the builtin `error` interface.
    #[inline]
    pub fn is_error(&self) -> bool {
        !self.variadic && self.text == "error"
    }

    /// The type of a table slot holding a value of this type.
    pub fn slot_type(&self) -> String {
        if self.variadic {
            format!("[]{}", self.text)
        } else {
            self.text.clone()
        }
    }

    /// The zero-value literal, if the type is a builtin with one.
    ///
    /// Named, array and struct types return `None`; their slots are left
    /// out of case literals and take the implicit zero value.
    pub fn zero_literal(&self) -> Option<&'static str> {
        if self.variadic {
            return Some("nil");
        }
        let text = self.text.as_str();
        if NUMERIC_TYPES.contains(&text) {
            return Some("0");
        }
        match text {
            "string" => Some("\"\""),
            "bool" => Some("false"),
            "error" | "any" => Some("nil"),
            _ if has_nil_prefix(text) => Some("nil"),
            _ => None,
        }
    }

    /// Returns `true` if values of this type can be compared with `!=`
    /// without surprises.
    pub fn is_basic(&self) -> bool {
        !self.variadic
            && (NUMERIC_TYPES.contains(&self.text.as_str())
                || self.text == "string"
                || self.text == "bool")
    }

    /// Returns `true` if the type fits on one line.
    #[inline]
    pub fn is_single_line(&self) -> bool {
        !self.text.contains('\n')
    }

    /// Package qualifiers referenced by the type, in order of appearance.
    ///
    /// Text inside string and raw string literals (struct tags) is ignored.
    ///
    /// ```
    /// use gt_core::TypeExpr;
    ///
    /// let ty = TypeExpr::new("map[string]*http.Request");
    /// assert_eq!(ty.qualifiers(), vec!["http"]);
    /// ```
    pub fn qualifiers(&self) -> Vec<&str> {
        let bytes = self.text.as_bytes();
        let mut found: Vec<&str> = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b == b'"' || b == b'`' {
                i = skip_literal(bytes, i);
                continue;
            }
            if is_ident_start(b) {
                let start = i;
                while i < bytes.len() && is_ident_continue(bytes[i]) {
                    i += 1;
                }
                let after_dot = start > 0
                    && bytes[start - 1] == b'.'
                    && !(start > 1 && bytes[start - 2] == b'.');
                let before_dot = bytes.get(i) == Some(&b'.')
                    && bytes.get(i + 1).is_some_and(|&c| is_ident_start(c));
                if before_dot && !after_dot {
                    let ident = &self.text[start..i];
                    if !found.contains(&ident) {
                        found.push(ident);
                    }
                }
                continue;
            }
            i += 1;
        }
        found
    }
}

fn normalize(raw: &str) -> String {
    let lines: Vec<String> = raw
        .lines()
        .map(|line| {
            strip_line_comment(line)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 2 {
        return lines.into_iter().next().unwrap_or_default();
    }

    let mut out = String::new();
    for line in &lines {
        if let Some(last) = out.chars().last() {
            let next = line.chars().next();
            match (last, next) {
                ('{', Some('}')) | ('(' | '[', _) => {}
                (_, Some(')' | ']')) => {
                    if last == ',' {
                        out.pop();
                    }
                }
                ('{', _) | (_, Some('}')) | (',', _) => out.push(' '),
                _ => out.push_str("; "),
            }
        }
        out.push_str(line);
    }
    out.replace("struct {", "struct{")
        .replace("interface {", "interface{")
}

/// Cuts a trailing `//` comment that is not inside a literal.
fn strip_line_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'`' => i = skip_literal(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => return &line[..i],
            _ => i += 1,
        }
    }
    line
}

fn has_nil_prefix(text: &str) -> bool {
    NIL_PREFIXES.iter().any(|prefix| {
        text.strip_prefix(prefix).is_some_and(|rest| {
            !prefix.ends_with(|c: char| c.is_ascii_alphabetic())
                || !rest.bytes().next().is_some_and(is_ident_continue)
        })
    })
}

fn skip_literal(bytes: &[u8], open: usize) -> usize {
    let quote = bytes[open];
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quote == b'"' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    i
}

#[inline]
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

#[inline]
fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// A named or unnamed parameter, result or struct field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    /// The declared name; `None` for unnamed parameters and results.
    pub name: Option<String>,

    /// The declared type.
    pub ty: TypeExpr,
}

impl Field {
    /// Creates a named field.
    pub fn named(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }

    /// Creates an unnamed field.
    pub fn unnamed(ty: TypeExpr) -> Self {
        Self { name: None, ty }
    }

    /// The name, unless it is missing or the blank identifier.
    pub fn usable_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| *n != "_")
    }
}

/// The receiver of a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Receiver {
    /// The receiver variable, if named.
    pub name: Option<String>,

    /// Base type name without pointer or type arguments (`Calc` for `*Calc[T]`).
    pub type_name: String,

    /// `true` for pointer receivers.
    pub pointer: bool,

    /// `true` when the receiver type has type parameters.
    pub generic: bool,

    /// Fields of the receiver type when it is a struct declared in the package.
    pub fields: Option<Vec<Field>>,
}

impl Receiver {
    /// The receiver type as written in a declaration (`*Calc` or `Calc`).
    pub fn type_text(&self) -> String {
        if self.pointer {
            format!("*{}", self.type_name)
        } else {
            self.type_name.clone()
        }
    }
}

/// A function or method declaration.
///
/// # Examples
///
/// ```
/// use gt_core::{Field, FunctionSignature, SourceLocation, TypeExpr};
/// use smallvec::smallvec;
///
/// let sig = FunctionSignature {
///     name: "Parse".to_owned(),
///     receiver: None,
///     params: smallvec![Field::named("s", TypeExpr::new("string"))],
///     results: smallvec![
///         Field::unnamed(TypeExpr::new("int")),
///         Field::unnamed(TypeExpr::new("error")),
///     ],
///     exported: true,
///     generic: false,
///     location: SourceLocation::default(),
/// };
///
/// assert_eq!(sig.qualified_name(), "Parse");
/// assert!(sig.returns_error());
/// assert_eq!(sig.value_results().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Declared name.
    pub name: String,

    /// Receiver for methods.
    pub receiver: Option<Receiver>,

    /// Parameters in declaration order.
    pub params: SmallVec<[Field; 4]>,

    /// Results in declaration order.
    pub results: SmallVec<[Field; 2]>,

    /// `true` if the name starts with an upper-case letter.
    pub exported: bool,

    /// `true` if the function declares type parameters.
    pub generic: bool,

    /// Position of the declaration.
    pub location: SourceLocation,
}

impl FunctionSignature {
    /// `Recv.Name` for methods, `Name` otherwise.
    pub fn qualified_name(&self) -> String {
        match &self.receiver {
            Some(recv) => format!("{}.{}", recv.type_name, self.name),
            None => self.name.clone(),
        }
    }

    /// Returns `true` for methods.
    #[inline]
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }

    /// Returns `true` if the function or its receiver type is generic.
    pub fn is_generic(&self) -> bool {
        self.generic || self.receiver.as_ref().is_some_and(|r| r.generic)
    }

    /// Returns `true` if the final result is `error`.
    pub fn returns_error(&self) -> bool {
        self.results.last().is_some_and(|f| f.ty.is_error())
    }

    /// Results other than the trailing `error`.
    pub fn value_results(&self) -> &[Field] {
        if self.returns_error() {
            &self.results[..self.results.len() - 1]
        } else {
            &self.results
        }
    }
}

/// Returns `true` if a Go identifier is exported.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(name: &str, results: &[&str]) -> FunctionSignature {
        FunctionSignature {
            name: name.to_owned(),
            receiver: None,
            params: SmallVec::new(),
            results: results
                .iter()
                .map(|r| Field::unnamed(TypeExpr::new(r)))
                .collect(),
            exported: is_exported(name),
            generic: false,
            location: SourceLocation::default(),
        }
    }

    #[test]
    fn test_normalize_collapses_blanks() {
        let ty = TypeExpr::new("  func(a  int,\tb string)   error ");
        assert_eq!(ty.text(), "func(a int, b string) error");
        assert!(ty.is_single_line());
    }

    #[test]
    fn test_multiline_struct_type_folded() {
        let ty = TypeExpr::new("struct {\n    A int\n    B string `json:\"b\"` // the b\n}");
        assert_eq!(ty.text(), "struct{ A int; B string `json:\"b\"` }");
        assert!(ty.is_single_line());
        assert_eq!(ty.zero_literal(), None);
    }

    #[test]
    fn test_multiline_nested_types_folded() {
        assert_eq!(
            TypeExpr::new("struct {\n\tA struct {\n\t\tB int\n\t}\n\tC int\n}").text(),
            "struct{ A struct{ B int }; C int }"
        );
        assert_eq!(TypeExpr::new("struct {\n}").text(), "struct{}");
        assert_eq!(
            TypeExpr::new("interface {\n\tRead() error\n\tClose() error\n}").text(),
            "interface{ Read() error; Close() error }"
        );
        assert_eq!(
            TypeExpr::new("func(\n\ta int,\n\tb string,\n) error").text(),
            "func(a int, b string) error"
        );
    }

    #[test]
    fn test_zero_literals() {
        assert_eq!(TypeExpr::new("int").zero_literal(), Some("0"));
        assert_eq!(TypeExpr::new("float64").zero_literal(), Some("0"));
        assert_eq!(TypeExpr::new("string").zero_literal(), Some("\"\""));
        assert_eq!(TypeExpr::new("bool").zero_literal(), Some("false"));
        assert_eq!(TypeExpr::new("*Calc").zero_literal(), Some("nil"));
        assert_eq!(TypeExpr::new("[]byte").zero_literal(), Some("nil"));
        assert_eq!(TypeExpr::new("chan<- int").zero_literal(), Some("nil"));
        assert_eq!(TypeExpr::new("<-chan int").zero_literal(), Some("nil"));
        assert_eq!(TypeExpr::new("interface{}").zero_literal(), Some("nil"));
        assert_eq!(TypeExpr::new("error").zero_literal(), Some("nil"));
        assert_eq!(TypeExpr::variadic("int").zero_literal(), Some("nil"));
        assert_eq!(TypeExpr::new("Point").zero_literal(), None);
        assert_eq!(TypeExpr::new("functor").zero_literal(), None);
        assert_eq!(TypeExpr::new("[3]int").zero_literal(), None);
        assert_eq!(TypeExpr::new("time.Duration").zero_literal(), None);
    }

    #[test]
    fn test_is_basic() {
        assert!(TypeExpr::new("int").is_basic());
        assert!(TypeExpr::new("string").is_basic());
        assert!(TypeExpr::new("bool").is_basic());
        assert!(!TypeExpr::new("*int").is_basic());
        assert!(!TypeExpr::new("[]int").is_basic());
        assert!(!TypeExpr::variadic("int").is_basic());
    }

    #[test]
    fn test_pointer_and_error() {
        assert!(TypeExpr::new("*Calc").is_pointer());
        assert!(!TypeExpr::new("Calc").is_pointer());
        assert!(TypeExpr::new("error").is_error());
        assert!(!TypeExpr::variadic("error").is_error());
    }

    #[test]
    fn test_qualifiers() {
        let ty = TypeExpr::new("map[io.Reader][]*bytes.Buffer");
        assert_eq!(ty.qualifiers(), vec!["io", "bytes"]);

        let ty = TypeExpr::new("func(ctx context.Context, r io.Reader) (context.Context, error)");
        assert_eq!(ty.qualifiers(), vec!["context", "io"]);

        let ty = TypeExpr::new("func(format string, args ...fmt.Stringer)");
        assert_eq!(ty.qualifiers(), vec!["fmt"]);

        assert!(TypeExpr::new("int").qualifiers().is_empty());
        assert!(TypeExpr::variadic("string").qualifiers().is_empty());
    }

    #[test]
    fn test_qualifiers_skip_tags() {
        let ty = TypeExpr::new(r#"struct { A int `json:"a.b"`; B string "x.y" }"#);
        assert!(ty.qualifiers().is_empty());
    }

    #[test]
    fn test_qualified_name() {
        let mut s = sig("Add", &["int"]);
        assert_eq!(s.qualified_name(), "Add");
        s.receiver = Some(Receiver {
            name: Some("c".to_owned()),
            type_name: "Calc".to_owned(),
            pointer: true,
            generic: false,
            fields: None,
        });
        assert_eq!(s.qualified_name(), "Calc.Add");
        assert!(s.is_method());
    }

    #[test]
    fn test_returns_error() {
        assert!(sig("F", &["error"]).returns_error());
        assert!(sig("F", &["int", "error"]).returns_error());
        assert!(!sig("F", &["error", "int"]).returns_error());
        assert!(!sig("F", &[]).returns_error());
    }

    #[test]
    fn test_value_results() {
        assert_eq!(sig("F", &["int", "string", "error"]).value_results().len(), 2);
        assert_eq!(sig("F", &["error"]).value_results().len(), 0);
        assert_eq!(sig("F", &["int"]).value_results().len(), 1);
    }

    #[test]
    fn test_generic_receiver() {
        let mut s = sig("Get", &[]);
        assert!(!s.is_generic());
        s.receiver = Some(Receiver {
            name: None,
            type_name: "Stack".to_owned(),
            pointer: false,
            generic: true,
            fields: None,
        });
        assert!(s.is_generic());
    }

    #[test]
    fn test_usable_name() {
        let ty = TypeExpr::new("int");
        assert_eq!(Field::named("a", ty.clone()).usable_name(), Some("a"));
        assert_eq!(Field::named("_", ty.clone()).usable_name(), None);
        assert_eq!(Field::unnamed(ty).usable_name(), None);
    }

    #[test]
    fn test_is_exported() {
        assert!(is_exported("Add"));
        assert!(!is_exported("sum"));
        assert!(!is_exported("_x"));
        assert!(!is_exported(""));
    }

    #[test]
    fn test_receiver_type_text() {
        let recv = Receiver {
            name: None,
            type_name: "Calc".to_owned(),
            pointer: true,
            generic: false,
            fields: None,
        };
        assert_eq!(recv.type_text(), "*Calc");
    }
}
