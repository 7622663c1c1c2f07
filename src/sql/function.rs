//! Field functions and aggregate functions, indexed by dialect.

use crate::dialect::Dialect;
use crate::error::CqlError;

/// How a function wraps the SQL of the expression it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionForm {
    /// `(x op ?)`
    Operator(&'static str),
    /// `opx`
    PreOperator(&'static str),
    /// `F(x, ?, ...)`
    Call(&'static str),
    /// `NOT F(x)`
    NegatedCall(&'static str),
}

impl FunctionForm {
    /// Wrap `sql`, adding one placeholder per bound value
    pub fn apply(self, sql: &str, values: usize) -> String {
        match self {
            FunctionForm::Operator(operator) => format!("({sql} {operator} ?)"),
            FunctionForm::PreOperator(operator) => format!("{operator}{sql}"),
            FunctionForm::Call(function) => {
                format!("{function}({sql}{})", ", ?".repeat(values))
            }
            FunctionForm::NegatedCall(function) => format!("NOT {function}({sql})"),
        }
    }
}

/// A function with a default form and per-dialect overrides.
///
/// An override of `None` marks the function as unavailable on that dialect.
#[derive(Debug, PartialEq, Eq)]
pub struct Function {
    pub name: &'static str,
    default: Option<FunctionForm>,
    overrides: &'static [(Dialect, Option<FunctionForm>)],
}

impl Function {
    const fn all(name: &'static str, form: FunctionForm) -> Self {
        Self {
            name,
            default: Some(form),
            overrides: &[],
        }
    }

    const fn by_dialect(
        name: &'static str,
        default: Option<FunctionForm>,
        overrides: &'static [(Dialect, Option<FunctionForm>)],
    ) -> Self {
        Self {
            name,
            default,
            overrides,
        }
    }

    pub fn form(&self, dialect: Dialect) -> Option<FunctionForm> {
        self.overrides
            .iter()
            .find(|(candidate, _)| *candidate == dialect)
            .map_or(self.default, |(_, form)| *form)
    }

    /// Apply the function to `sql` for `dialect`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedByDatabase` wrapped with the function name when the dialect
    /// has no form for it.
    pub fn apply(&self, dialect: Dialect, sql: &str, values: usize) -> Result<String, CqlError> {
        self.form(dialect)
            .map(|form| form.apply(sql, values))
            .ok_or_else(|| CqlError::unsupported(dialect).with_function(self.name))
    }
}

use FunctionForm::{Call, NegatedCall, Operator, PreOperator};

pub static PLUS: Function = Function::all("Plus", Operator("+"));
pub static MINUS: Function = Function::all("Minus", Operator("-"));
pub static TIMES: Function = Function::all("Times", Operator("*"));
pub static DIVIDED: Function = Function::all("Divided", Operator("/"));
pub static MODULO: Function = Function::all("Modulo", Operator("%"));
pub static POWER: Function = Function::by_dialect(
    "Power",
    Some(Call("POWER")),
    &[(Dialect::Postgres, Some(Operator("^")))],
);
pub static SQUARE_ROOT: Function = Function::by_dialect(
    "SquareRoot",
    Some(Call("SQRT")),
    &[(Dialect::Postgres, Some(PreOperator("|/")))],
);
pub static ABSOLUTE: Function = Function::by_dialect(
    "Absolute",
    Some(Call("abs")),
    &[(Dialect::Postgres, Some(PreOperator("@")))],
);
pub static BIT_AND: Function = Function::all("And", Operator("&"));
pub static BIT_OR: Function = Function::all("Or", Operator("|"));
pub static BIT_XOR: Function = Function::by_dialect(
    "Xor",
    None,
    &[
        (Dialect::Postgres, Some(Operator("#"))),
        (Dialect::MySQL, Some(Operator("^"))),
        (Dialect::SQLServer, Some(Operator("^"))),
    ],
);
pub static BIT_NOT: Function = Function::all("Not", PreOperator("~"));
pub static BIT_SHIFT_LEFT: Function = Function::all("ShiftLeft", Operator("<<"));
pub static BIT_SHIFT_RIGHT: Function = Function::all("ShiftRight", Operator(">>"));
pub static CONCAT: Function = Function::by_dialect(
    "Concat",
    Some(Call("CONCAT")),
    &[(Dialect::Postgres, Some(Operator("||")))],
);

pub static COUNT: Function = Function::all("Count", Call("COUNT"));
pub static SUM: Function = Function::all("Sum", Call("SUM"));
pub static AVERAGE: Function = Function::all("Average", Call("AVG"));
pub static MIN: Function = Function::all("Min", Call("MIN"));
pub static MAX: Function = Function::all("Max", Call("MAX"));
pub static ALL: Function = Function::by_dialect(
    "All",
    None,
    &[
        (Dialect::Postgres, Some(Call("BOOL_AND"))),
        (Dialect::MySQL, Some(Call("MIN"))),
        (Dialect::SQLite, Some(Call("MIN"))),
    ],
);
pub static ANY: Function = Function::by_dialect(
    "Any",
    None,
    &[
        (Dialect::Postgres, Some(Call("BOOL_OR"))),
        (Dialect::MySQL, Some(Call("MAX"))),
        (Dialect::SQLite, Some(Call("MAX"))),
    ],
);
pub static NONE: Function = Function::by_dialect(
    "None",
    None,
    &[
        (Dialect::Postgres, Some(NegatedCall("BOOL_OR"))),
        (Dialect::MySQL, Some(NegatedCall("MAX"))),
        (Dialect::SQLite, Some(NegatedCall("MAX"))),
    ],
);
pub static BIT_AND_AGGREGATION: Function = Function::by_dialect(
    "And",
    None,
    &[
        (Dialect::Postgres, Some(Call("BIT_AND"))),
        (Dialect::MySQL, Some(Call("BIT_AND"))),
    ],
);
pub static BIT_OR_AGGREGATION: Function = Function::by_dialect(
    "Or",
    None,
    &[
        (Dialect::Postgres, Some(Call("BIT_OR"))),
        (Dialect::MySQL, Some(Call("BIT_OR"))),
    ],
);
