//! Test model synthesis.
//!
//! [`Synthesizer`] turns one accepted [`FunctionSignature`] into a
//! [`TestModel`]: table columns for the receiver, the arguments and the
//! expected results, plus a single zero-value case.

use gt_core::{
    CaseValue, FunctionSignature, GenerateConfig, Receiver, ReceiverModel, Slot, TestCase,
    TestModel, TypeExpr,
};

/// Identifiers the rendered test body declares or refers to.
const RESERVED: &[&str] = &[
    "t", "tt", "tests", "name", "args", "fields", "err", "wantErr", "testing", "reflect",
];

/// Name of the single generated case.
pub const ZERO_CASE: &str = "zero values";

/// Builds test models.
#[derive(Debug, Clone, Copy, Default)]
pub struct Synthesizer {
    subtests: bool,
    print_inputs: bool,
}

impl Synthesizer {
    /// Creates a synthesizer.
    pub const fn new(subtests: bool, print_inputs: bool) -> Self {
        Self {
            subtests,
            print_inputs,
        }
    }

    /// Creates a synthesizer from configuration.
    pub const fn from_config(config: &GenerateConfig) -> Self {
        Self::new(config.subtests, config.print_inputs)
    }

    /// Builds the model of `function` under the resolved test `name`.
    pub fn synthesize(&self, function: &FunctionSignature, name: String) -> TestModel {
        let receiver = function.receiver.as_ref().map(receiver_model);

        let args: Vec<Slot> = function
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let name = param
                    .usable_name()
                    .map_or_else(|| format!("in{index}"), str::to_owned);
                Slot::new(name, param.ty.clone())
            })
            .collect();

        let wants: Vec<Slot> = function
            .value_results()
            .iter()
            .enumerate()
            .map(|(index, result)| Slot::new(result_name("want", index), result.ty.clone()))
            .collect();

        let want_err = function.returns_error();

        let case = TestCase {
            name: ZERO_CASE.to_owned(),
            fields: match &receiver {
                Some(ReceiverModel::Fields { fields, .. }) => placeholders(fields),
                Some(ReceiverModel::Value { slot }) => placeholders(std::slice::from_ref(slot)),
                None => Vec::new(),
            },
            args: placeholders(&args),
            wants: placeholders(&wants),
            want_err: false,
        };

        TestModel {
            name,
            function: function.clone(),
            receiver,
            args,
            wants,
            want_err,
            cases: vec![case],
            subtests: self.subtests,
            print_inputs: self.print_inputs,
        }
    }
}

/// `got`, `got1`, `got2`, … and `want`, `want1`, ….
pub fn result_name(prefix: &str, index: usize) -> String {
    if index == 0 {
        prefix.to_owned()
    } else {
        format!("{prefix}{index}")
    }
}

fn placeholders(slots: &[Slot]) -> Vec<CaseValue> {
    slots.iter().filter_map(Slot::placeholder).collect()
}

fn receiver_model(receiver: &Receiver) -> ReceiverModel {
    let var = receiver_var(receiver);
    match &receiver.fields {
        Some(fields) => ReceiverModel::Fields {
            var,
            type_name: receiver.type_name.clone(),
            pointer: receiver.pointer,
            fields: fields
                .iter()
                .filter_map(|f| {
                    f.usable_name()
                        .map(|name| Slot::new(name, f.ty.clone()))
                })
                .collect(),
        },
        None => ReceiverModel::Value {
            slot: Slot::new(var, TypeExpr::new(&receiver.type_text())),
        },
    }
}

/// The receiver variable: its declared name, else the lower-cased first
/// letter of the type, renamed to `r` when it clashes with the test body.
fn receiver_var(receiver: &Receiver) -> String {
    let name = receiver
        .name
        .as_deref()
        .filter(|n| *n != "_")
        .map_or_else(
            || {
                receiver
                    .type_name
                    .chars()
                    .next()
                    .map_or_else(|| "r".to_owned(), |c| c.to_lowercase().collect())
            },
            str::to_owned,
        );

    if is_reserved(&name) {
        "r".to_owned()
    } else {
        name
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name) || name.starts_with("got") || name.starts_with("want")
}

/// Identifiers in scope at the call site of a plain function.
const CALL_SCOPE: &[&str] = &["t", "tt", "tests", "err", "testing", "reflect"];

/// Returns `true` if a plain function's name is hidden by an identifier of
/// the rendered test, so the generated call could not reach it.
///
/// Methods are called through their receiver and never clash.
pub fn callee_shadowed(function: &FunctionSignature) -> bool {
    if function.receiver.is_some() {
        return false;
    }
    let name = function.name.as_str();
    CALL_SCOPE.contains(&name)
        || name
            .strip_prefix("got")
            .is_some_and(|rest| rest.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gt_core::{Field, SourceLocation};
    use smallvec::SmallVec;

    fn function(name: &str, params: &[(Option<&str>, &str)], results: &[&str]) -> FunctionSignature {
        FunctionSignature {
            name: name.to_owned(),
            receiver: None,
            params: params
                .iter()
                .map(|(n, ty)| Field {
                    name: n.map(str::to_owned),
                    ty: TypeExpr::new(ty),
                })
                .collect(),
            results: results
                .iter()
                .map(|ty| Field::unnamed(TypeExpr::new(ty)))
                .collect(),
            exported: gt_core::is_exported(name),
            generic: false,
            location: SourceLocation::default(),
        }
    }

    fn receiver(name: Option<&str>, type_name: &str, fields: Option<Vec<Field>>) -> Receiver {
        Receiver {
            name: name.map(str::to_owned),
            type_name: type_name.to_owned(),
            pointer: true,
            generic: false,
            fields,
        }
    }

    fn slot_names(slots: &[Slot]) -> Vec<&str> {
        slots.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_plain_function() {
        let add = function("Add", &[(Some("a"), "int"), (Some("b"), "int")], &["int"]);
        let model = Synthesizer::default().synthesize(&add, "TestAdd".to_owned());

        assert_eq!(model.name, "TestAdd");
        assert_eq!(slot_names(&model.args), vec!["a", "b"]);
        assert_eq!(slot_names(&model.wants), vec!["want"]);
        assert!(!model.want_err);
        assert!(model.receiver.is_none());

        let case = &model.cases[0];
        assert_eq!(case.name, ZERO_CASE);
        assert_eq!(case.args.len(), 2);
        assert_eq!(case.wants[0].literal, "0");
    }

    #[test]
    fn test_unnamed_params_and_error_result() {
        let parse = function(
            "Parse",
            &[(None, "string"), (Some("_"), "bool")],
            &["*Node", "[]string", "error"],
        );
        let model = Synthesizer::new(true, true).synthesize(&parse, "TestParse".to_owned());

        assert_eq!(slot_names(&model.args), vec!["in0", "in1"]);
        assert_eq!(slot_names(&model.wants), vec!["want", "want1"]);
        assert!(model.want_err);
        assert!(model.subtests);
        assert!(model.print_inputs);
        assert!(model.needs_deep_equal());
    }

    #[test]
    fn test_named_types_have_no_placeholder() {
        let f = function("Move", &[(Some("p"), "Point")], &["geo.Vector"]);
        let model = Synthesizer::default().synthesize(&f, "TestMove".to_owned());
        assert!(model.cases[0].args.is_empty());
        assert!(model.cases[0].wants.is_empty());
    }

    #[test]
    fn test_struct_receiver() {
        let mut m = function("Add", &[(Some("a"), "int")], &["int"]);
        m.receiver = Some(receiver(
            Some("c"),
            "Calc",
            Some(vec![
                Field::named("base", TypeExpr::new("int")),
                Field::named("_", TypeExpr::new("int")),
            ]),
        ));
        let model = Synthesizer::default().synthesize(&m, "TestCalc_Add".to_owned());

        let Some(ReceiverModel::Fields {
            var,
            type_name,
            pointer,
            fields,
        }) = &model.receiver
        else {
            panic!("expected a fields receiver");
        };
        assert_eq!(var, "c");
        assert_eq!(type_name, "Calc");
        assert!(*pointer);
        assert_eq!(slot_names(fields), vec!["base"]);
        assert_eq!(model.cases[0].fields.len(), 1);
    }

    #[test]
    fn test_non_struct_receiver() {
        let mut m = function("String", &[], &["string"]);
        m.receiver = Some(Receiver {
            pointer: false,
            ..receiver(None, "Celsius", None)
        });
        let model = Synthesizer::default().synthesize(&m, "TestCelsius_String".to_owned());

        let Some(ReceiverModel::Value { slot }) = &model.receiver else {
            panic!("expected a value receiver");
        };
        assert_eq!(slot.name, "c");
        assert_eq!(slot.ty.text(), "Celsius");
    }

    #[test]
    fn test_clashing_receiver_renamed() {
        for name in ["tt", "got", "want1", "args", "t"] {
            let mut m = function("Run", &[], &[]);
            m.receiver = Some(receiver(Some(name), "Job", None));
            let model = Synthesizer::default().synthesize(&m, "TestJob_Run".to_owned());
            assert_eq!(model.receiver.map(|r| r.access()), Some("tt.r".to_owned()));
        }

        let mut m = function("Run", &[], &[]);
        m.receiver = Some(receiver(None, "Task", None));
        let model = Synthesizer::default().synthesize(&m, "TestTask_Run".to_owned());
        assert_eq!(model.receiver.map(|r| r.access()), Some("tt.r".to_owned()));
    }

    #[test]
    fn test_variadic_slot() {
        let mut f = function("Sum", &[], &["int"]);
        f.params = SmallVec::from_vec(vec![Field::named("xs", TypeExpr::variadic("int"))]);
        let model = Synthesizer::default().synthesize(&f, "TestSum".to_owned());
        assert_eq!(model.args[0].ty.slot_type(), "[]int");
        assert_eq!(model.cases[0].args[0].literal, "nil");
    }

    #[test]
    fn test_callee_shadowed() {
        for name in ["t", "tt", "tests", "got", "got1", "err"] {
            assert!(callee_shadowed(&function(name, &[], &[])), "{name}");
        }
        for name in ["Add", "gotten", "test", "errs"] {
            assert!(!callee_shadowed(&function(name, &[], &[])), "{name}");
        }

        let mut method = function("tt", &[], &[]);
        method.receiver = Some(receiver(Some("c"), "Calc", None));
        assert!(!callee_shadowed(&method));
    }

    #[test]
    fn test_result_name() {
        assert_eq!(result_name("got", 0), "got");
        assert_eq!(result_name("want", 2), "want2");
    }
}
