//! Go source rendering.
//!
//! Test models become gofmt-style table-driven test functions. A new file
//! gets a package clause and an import block; an existing companion file
//! keeps its content, gains an import declaration for whatever it lacks and
//! has the new tests appended.

use std::collections::BTreeMap;

use camino::Utf8Path;
use gt_core::{
    CaseValue, Comparison, ExistingTestFile, GeneratedFile, ImportSpec, ReceiverModel, Slot,
    TestModel,
};
use rustc_hash::FxHashSet;

use crate::error::RenderError;
use crate::synth::result_name;

/// Everything about the target file except the models.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Path of the `_test.go` file.
    pub target: &'a Utf8Path,
    /// Source file the tests are for.
    pub source: &'a Utf8Path,
    /// Package name of the source file.
    pub package: &'a str,
    /// Imports that may qualify the rendered types; the first match wins.
    pub imports: &'a [ImportSpec],
    /// The companion test file, when it already exists.
    pub existing: Option<&'a ExistingTestFile>,
}

/// Renders `models` into one test file.
///
/// # Errors
///
/// - [`RenderError::DuplicateTestName`] if two models share a name
/// - [`RenderError::UnrepresentableType`] if a type text holds a line break
/// - [`RenderError::ForeignTestPackage`] if the companion file is an
///   external test package
pub fn render(
    request: &RenderRequest<'_>,
    models: Vec<TestModel>,
) -> Result<GeneratedFile, RenderError> {
    check_models(request.target, &models)?;

    let imports = required_imports(&models, request.imports);
    let tests: Vec<String> = models.iter().map(render_test).collect();

    let content = match request.existing {
        Some(existing) => merge(existing, &imports, &tests)?,
        None => fresh(request.package, &imports, &tests),
    };

    Ok(GeneratedFile {
        path: request.target.to_owned(),
        source: request.source.to_owned(),
        tests: models,
        content: content.into_bytes(),
    })
}

fn check_models(target: &Utf8Path, models: &[TestModel]) -> Result<(), RenderError> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for model in models {
        if !seen.insert(model.name.as_str()) {
            return Err(RenderError::DuplicateTestName {
                name: model.name.clone(),
                path: target.to_owned(),
            });
        }
        if let Some(ty) = model.types().find(|ty| !ty.is_single_line()) {
            return Err(RenderError::UnrepresentableType {
                function: model.function.qualified_name(),
                ty: ty.text().to_owned(),
            });
        }
    }
    Ok(())
}

/// Imports the rendered tests need, sorted by path.
fn required_imports(models: &[TestModel], source_imports: &[ImportSpec]) -> Vec<ImportSpec> {
    let mut needed: BTreeMap<String, ImportSpec> = BTreeMap::new();
    needed.insert("testing".to_owned(), ImportSpec::new(None, "testing"));
    if models.iter().any(TestModel::needs_deep_equal) {
        needed.insert("reflect".to_owned(), ImportSpec::new(None, "reflect"));
    }

    for ty in models.iter().flat_map(TestModel::types) {
        for qualifier in ty.qualifiers() {
            if let Some(spec) = source_imports
                .iter()
                .find(|spec| spec.qualifier() == Some(qualifier))
            {
                needed
                    .entry(spec.path.clone())
                    .or_insert_with(|| spec.clone());
            }
        }
    }

    needed.into_values().collect()
}

fn import_block(imports: &[ImportSpec]) -> String {
    let mut out = String::from("import (\n");
    for spec in imports {
        match &spec.alias {
            Some(alias) => out.push_str(&format!("\t{alias} \"{}\"\n", spec.path)),
            None => out.push_str(&format!("\t\"{}\"\n", spec.path)),
        }
    }
    out.push(')');
    out
}

fn fresh(package: &str, imports: &[ImportSpec], tests: &[String]) -> String {
    let mut out = format!("package {package}\n\n{}\n", import_block(imports));
    for test in tests {
        out.push('\n');
        out.push_str(test);
    }
    out
}

fn merge(
    existing: &ExistingTestFile,
    imports: &[ImportSpec],
    tests: &[String],
) -> Result<String, RenderError> {
    if existing.is_external_package() {
        return Err(RenderError::ForeignTestPackage {
            path: existing.path.clone(),
            package: existing.package.clone(),
        });
    }

    let missing: Vec<ImportSpec> = imports
        .iter()
        .filter(|spec| !existing.imports_path(&spec.path))
        .cloned()
        .collect();

    let (header, rest) = existing
        .source
        .split_at_checked(existing.header_end)
        .unwrap_or((existing.source.as_str(), ""));

    let mut out = String::with_capacity(existing.source.len() + tests.iter().map(String::len).sum::<usize>());
    out.push_str(header);
    if !missing.is_empty() {
        out.push_str("\n\n");
        out.push_str(&import_block(&missing));
    }
    out.push_str(rest);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    for test in tests {
        out.push('\n');
        out.push_str(test);
    }
    Ok(out)
}

/// Tab-indented line buffer.
#[derive(Default)]
struct Lines {
    out: String,
    depth: usize,
}

impl Lines {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push('\t');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.depth += 1;
    }

    fn close(&mut self, text: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    /// Closes a block and opens the next one on the same line (`}{`).
    fn reopen(&mut self, text: &str) {
        self.close(text);
        self.depth += 1;
    }

    /// Writes `key value` rows with the values lined up.
    fn aligned(&mut self, rows: &[(String, String)]) {
        let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, value) in rows {
            self.line(&format!("{key:<width$} {value}"));
        }
    }
}

fn struct_rows(slots: &[Slot]) -> Vec<(String, String)> {
    slots
        .iter()
        .map(|s| (s.name.clone(), s.ty.slot_type()))
        .collect()
}

fn inline_literal(type_name: &str, values: &[CaseValue]) -> String {
    let body: Vec<String> = values
        .iter()
        .map(|v| format!("{}: {}", v.slot, v.literal))
        .collect();
    format!("{type_name}{{{}}}", body.join(", "))
}

/// Receiver fields that get a table column.
fn receiver_fields(model: &TestModel) -> &[Slot] {
    match &model.receiver {
        Some(ReceiverModel::Fields { fields, .. }) => fields,
        _ => &[],
    }
}

fn render_test(model: &TestModel) -> String {
    let mut w = Lines::default();
    w.open(&format!("func {}(t *testing.T) {{", model.name));

    let fields = receiver_fields(model);
    if !fields.is_empty() {
        w.open("type fields struct {");
        w.aligned(&struct_rows(fields));
        w.close("}");
    }
    if !model.args.is_empty() {
        w.open("type args struct {");
        w.aligned(&struct_rows(&model.args));
        w.close("}");
    }

    w.open("tests := []struct {");
    w.aligned(&table_columns(model));
    w.reopen("}{");
    for case in &model.cases {
        w.open("{");
        w.aligned(&case_rows(model, case));
        w.close("},");
    }
    w.line("// TODO: Add test cases.");
    w.close("}");

    if uses_case(model) || model.subtests {
        w.open("for _, tt := range tests {");
    } else {
        w.open("for range tests {");
    }
    if model.subtests {
        w.open("t.Run(tt.name, func(t *testing.T) {");
        render_body(&mut w, model);
        w.close("})");
    } else {
        render_body(&mut w, model);
    }
    w.close("}");

    w.close("}");
    w.out
}

fn table_columns(model: &TestModel) -> Vec<(String, String)> {
    let mut rows = vec![("name".to_owned(), "string".to_owned())];
    match &model.receiver {
        Some(ReceiverModel::Fields { fields, .. }) if !fields.is_empty() => {
            rows.push(("fields".to_owned(), "fields".to_owned()));
        }
        Some(ReceiverModel::Value { slot }) => {
            rows.push((slot.name.clone(), slot.ty.slot_type()));
        }
        _ => {}
    }
    if !model.args.is_empty() {
        rows.push(("args".to_owned(), "args".to_owned()));
    }
    rows.extend(struct_rows(&model.wants));
    if model.want_err {
        rows.push(("wantErr".to_owned(), "bool".to_owned()));
    }
    rows
}

fn case_rows(model: &TestModel, case: &gt_core::TestCase) -> Vec<(String, String)> {
    let mut rows = vec![("name:".to_owned(), format!("{:?},", case.name))];
    if !case.fields.is_empty() {
        match &model.receiver {
            Some(ReceiverModel::Fields { .. }) => {
                rows.push(("fields:".to_owned(), format!("{},", inline_literal("fields", &case.fields))));
            }
            Some(ReceiverModel::Value { .. }) => {
                rows.extend(case.fields.iter().map(|v| (format!("{}:", v.slot), format!("{},", v.literal))));
            }
            None => {}
        }
    }
    if !case.args.is_empty() {
        rows.push(("args:".to_owned(), format!("{},", inline_literal("args", &case.args))));
    }
    rows.extend(
        case.wants
            .iter()
            .map(|v| (format!("{}:", v.slot), format!("{},", v.literal))),
    );
    if model.want_err {
        rows.push(("wantErr:".to_owned(), format!("{},", case.want_err)));
    }
    rows
}

/// Returns `true` if the loop body reads the current case.
fn uses_case(model: &TestModel) -> bool {
    !model.args.is_empty()
        || !model.wants.is_empty()
        || model.want_err
        || !receiver_fields(model).is_empty()
        || matches!(model.receiver, Some(ReceiverModel::Value { .. }))
}

fn render_body(w: &mut Lines, model: &TestModel) {
    if let Some(ReceiverModel::Fields {
        var,
        type_name,
        pointer,
        fields,
    }) = &model.receiver
    {
        let amp = if *pointer { "&" } else { "" };
        if fields.is_empty() {
            w.line(&format!("{var} := {amp}{type_name}{{}}"));
        } else {
            w.open(&format!("{var} := {amp}{type_name}{{"));
            let rows: Vec<(String, String)> = fields
                .iter()
                .map(|f| (format!("{}:", f.name), format!("tt.fields.{},", f.name)))
                .collect();
            w.aligned(&rows);
            w.close("}");
        }
    }

    let call = call_expr(model);
    let messages = Messages::new(model);
    let bail = if model.subtests { "return" } else { "continue" };

    match (model.wants.as_slice(), model.want_err) {
        ([], false) => w.line(&call),
        ([], true) => {
            w.open(&format!("if err := {call}; (err != nil) != tt.wantErr {{"));
            w.line(&messages.error());
            w.close("}");
        }
        ([want], false) => {
            w.open(&format!("if got := {call}; {} {{", mismatch(want, "got")));
            w.line(&messages.result(want, "got", ""));
            w.close("}");
        }
        (wants, want_err) => {
            let mut targets: Vec<String> = (0..wants.len()).map(|i| result_name("got", i)).collect();
            if want_err {
                targets.push("err".to_owned());
            }
            w.line(&format!("{} := {call}", targets.join(", ")));
            if want_err {
                w.open("if (err != nil) != tt.wantErr {");
                w.line(&messages.error());
                w.line(bail);
                w.close("}");
            }
            for (index, want) in wants.iter().enumerate() {
                let got = result_name("got", index);
                let label = if wants.len() == 1 {
                    String::new()
                } else {
                    format!(" {got}")
                };
                w.open(&format!("if {} {{", mismatch(want, &got)));
                w.line(&messages.result(want, &got, &label));
                w.close("}");
            }
        }
    }
}

fn call_expr(model: &TestModel) -> String {
    let callee = match &model.receiver {
        Some(receiver) => format!("{}.{}", receiver.access(), model.function.name),
        None => model.function.name.clone(),
    };
    let args: Vec<String> = model
        .args
        .iter()
        .map(|slot| {
            if slot.ty.is_variadic() {
                format!("tt.args.{}...", slot.name)
            } else {
                format!("tt.args.{}", slot.name)
            }
        })
        .collect();
    format!("{callee}({})", args.join(", "))
}

fn mismatch(want: &Slot, got: &str) -> String {
    match want.comparison() {
        Comparison::Equal => format!("{got} != tt.{}", want.name),
        Comparison::DeepEqual => format!("!reflect.DeepEqual({got}, tt.{})", want.name),
    }
}

/// Builds `t.Errorf` calls.
struct Messages {
    /// `%q. ` outside subtests.
    prefix: &'static str,
    /// `Calc.Add(%v, %v)` or `Add()`.
    callee: String,
    /// Leading format arguments: case name and inputs.
    lead: Vec<String>,
}

impl Messages {
    fn new(model: &TestModel) -> Self {
        let name = match &model.function.receiver {
            Some(receiver) => format!("{}.{}", receiver.type_name, model.function.name),
            None => model.function.name.clone(),
        };

        let mut lead = Vec::new();
        if !model.subtests {
            lead.push("tt.name".to_owned());
        }

        let callee = if model.print_inputs {
            let verbs = vec!["%v"; model.args.len()].join(", ");
            lead.extend(model.args.iter().map(|a| format!("tt.args.{}", a.name)));
            format!("{name}({verbs})")
        } else {
            format!("{name}()")
        };

        Self {
            prefix: if model.subtests { "" } else { "%q. " },
            callee,
            lead,
        }
    }

    fn errorf(&self, format: &str, tail: &[&str]) -> String {
        let args: Vec<&str> = self
            .lead
            .iter()
            .map(String::as_str)
            .chain(tail.iter().copied())
            .collect();
        format!(
            "t.Errorf(\"{}{}{format}\", {})",
            self.prefix,
            self.callee,
            args.join(", ")
        )
    }

    fn error(&self) -> String {
        self.errorf(" error = %v, wantErr %v", &["err", "tt.wantErr"])
    }

    fn result(&self, want: &Slot, got: &str, label: &str) -> String {
        let expected = format!("tt.{}", want.name);
        self.errorf(&format!("{label} = %v, want %v"), &[got, &expected])
    }
}
