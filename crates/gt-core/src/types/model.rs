//! Test models built by the skeleton synthesizer and consumed by the renderer.
//!
//! A [`TestModel`] describes one table-driven test function: the table
//! columns ([`Slot`]s), how the receiver is built, and the table rows
//! ([`TestCase`]s). It carries no Go syntax beyond type text; the renderer
//! owns the layout.

use serde::{Deserialize, Serialize};

use super::signature::{FunctionSignature, TypeExpr};

/// How a result is compared against its expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `got != tt.want`.
    Equal,
    /// `!reflect.DeepEqual(got, tt.want)`.
    DeepEqual,
}

/// A typed column of the test table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// Field name in the table struct.
    pub name: String,

    /// Value type.
    pub ty: TypeExpr,
}

impl Slot {
    /// Creates a slot.
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// How results stored in this slot are compared.
    pub fn comparison(&self) -> Comparison {
        if self.ty.is_basic() {
            Comparison::Equal
        } else {
            Comparison::DeepEqual
        }
    }

    /// A placeholder value for this slot, if the type has a literal zero.
    pub fn placeholder(&self) -> Option<CaseValue> {
        self.ty.zero_literal().map(|literal| CaseValue {
            slot: self.name.clone(),
            literal: literal.to_owned(),
        })
    }
}

/// One value of a table row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseValue {
    /// Slot the value belongs to.
    pub slot: String,

    /// Go literal.
    pub literal: String,
}

/// A named row of the test table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestCase {
    /// Case name.
    pub name: String,

    /// Receiver field values.
    pub fields: Vec<CaseValue>,

    /// Argument values.
    pub args: Vec<CaseValue>,

    /// Expected result values.
    pub wants: Vec<CaseValue>,

    /// Expected error flag.
    pub want_err: bool,
}

/// How the method receiver is obtained inside the test body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiverModel {
    /// Built from a `fields` table column (`c := &Calc{...}`).
    Fields {
        /// Local variable holding the receiver.
        var: String,
        /// Struct type name.
        type_name: String,
        /// Take the address of the literal.
        pointer: bool,
        /// One slot per struct field.
        fields: Vec<Slot>,
    },
    /// Stored directly in the table under the receiver variable name.
    Value {
        /// Table column holding the receiver.
        slot: Slot,
    },
}

impl ReceiverModel {
    /// Expression that yields the receiver inside the case loop.
    pub fn access(&self) -> String {
        match self {
            Self::Fields { var, .. } => var.clone(),
            Self::Value { slot } => format!("tt.{}", slot.name),
        }
    }
}

/// A table-driven test for one function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestModel {
    /// Test function name, unique within the package.
    pub name: String,

    /// Function under test.
    pub function: FunctionSignature,

    /// Receiver construction for methods.
    pub receiver: Option<ReceiverModel>,

    /// One slot per parameter.
    pub args: Vec<Slot>,

    /// One slot per non-error result.
    pub wants: Vec<Slot>,

    /// The function's final result is `error`.
    pub want_err: bool,

    /// Table rows.
    pub cases: Vec<TestCase>,

    /// Run cases with `t.Run`.
    pub subtests: bool,

    /// Include inputs in failure messages.
    pub print_inputs: bool,
}

impl TestModel {
    /// Returns `true` if any result is compared with `reflect.DeepEqual`.
    pub fn needs_deep_equal(&self) -> bool {
        self.wants
            .iter()
            .any(|s| s.comparison() == Comparison::DeepEqual)
    }

    /// Every type that appears in the rendered test.
    pub fn types(&self) -> impl Iterator<Item = &TypeExpr> {
        let receiver: Vec<&TypeExpr> = match &self.receiver {
            Some(ReceiverModel::Fields { fields, .. }) => fields.iter().map(|s| &s.ty).collect(),
            Some(ReceiverModel::Value { slot }) => vec![&slot.ty],
            None => Vec::new(),
        };
        receiver
            .into_iter()
            .chain(self.args.iter().map(|s| &s.ty))
            .chain(self.wants.iter().map(|s| &s.ty))
    }
}
