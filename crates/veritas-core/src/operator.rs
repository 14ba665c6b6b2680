use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field::Field;

/// XSD datatype IRIs the query layer distinguishes.
pub mod xsd {
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const NON_NEGATIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonNegativeInteger";
    pub const NON_POSITIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonPositiveInteger";
    pub const NEGATIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#negativeInteger";
    pub const POSITIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#positiveInteger";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";

    pub(crate) const ORDERED: &[&str] = &[
        INTEGER,
        NON_NEGATIVE_INTEGER,
        NON_POSITIVE_INTEGER,
        NEGATIVE_INTEGER,
        POSITIVE_INTEGER,
        DATE_TIME,
        DOUBLE,
        DECIMAL,
    ];
}

/// Comparison operator a circuit applies to a credential value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Noop,
    Eq,
    Lt,
    Gt,
    In,
    Nin,
    Ne,
    Lte,
    Gte,
    Between,
    NonBetween,
    Exists,
    Sd,
}

/// How many comparison values an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    One,
    Two,
    AtLeastOne,
}

impl Arity {
    fn describe(self) -> &'static str {
        match self {
            Self::None => "no",
            Self::One => "exactly one",
            Self::Two => "exactly two",
            Self::AtLeastOne => "one or more",
        }
    }

    fn accepts(self, count: usize) -> bool {
        match self {
            Self::None => count == 0,
            Self::One => count == 1,
            Self::Two => count == 2,
            Self::AtLeastOne => count >= 1,
        }
    }
}

impl Operator {
    pub const ALL: [Operator; 13] = [
        Self::Noop,
        Self::Eq,
        Self::Lt,
        Self::Gt,
        Self::In,
        Self::Nin,
        Self::Ne,
        Self::Lte,
        Self::Gte,
        Self::Between,
        Self::NonBetween,
        Self::Exists,
        Self::Sd,
    ];

    /// Numeric code the circuits use.
    pub fn code(self) -> u8 {
        match self {
            Self::Noop => 0,
            Self::Eq => 1,
            Self::Lt => 2,
            Self::Gt => 3,
            Self::In => 4,
            Self::Nin => 5,
            Self::Ne => 6,
            Self::Lte => 7,
            Self::Gte => 8,
            Self::Between => 9,
            Self::NonBetween => 10,
            Self::Exists => 11,
            Self::Sd => 16,
        }
    }

    pub fn from_code(code: u64) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| u64::from(op.code()) == code)
            .ok_or_else(|| CoreError::UnsupportedOperator(format!("code {}", code)))
    }

    /// Query-language name, e.g. `$eq`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Noop => "$noop",
            Self::Eq => "$eq",
            Self::Lt => "$lt",
            Self::Gt => "$gt",
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::Ne => "$ne",
            Self::Lte => "$lte",
            Self::Gte => "$gte",
            Self::Between => "$between",
            Self::NonBetween => "$nonbetween",
            Self::Exists => "$exists",
            Self::Sd => "$sd",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == name)
            .ok_or_else(|| CoreError::UnsupportedOperator(name.to_string()))
    }

    pub fn arity(self) -> Arity {
        match self {
            Self::Noop | Self::Sd => Arity::None,
            Self::Eq | Self::Lt | Self::Gt | Self::Ne | Self::Lte | Self::Gte | Self::Exists => {
                Arity::One
            }
            Self::In | Self::Nin => Arity::AtLeastOne,
            Self::Between | Self::NonBetween => Arity::Two,
        }
    }

    /// Check a comparison-value count against the operator's arity.
    pub fn validate_values(self, count: usize) -> Result<(), CoreError> {
        let arity = self.arity();
        if arity.accepts(count) {
            Ok(())
        } else {
            Err(CoreError::OperatorArity {
                operator: self,
                expected: arity.describe(),
                actual: count,
            })
        }
    }

    /// Whether the operator may be applied to a field of the given XSD datatype.
    pub fn supports_datatype(self, datatype: &str) -> bool {
        if self == Self::Noop {
            return true;
        }
        match datatype {
            xsd::BOOLEAN => matches!(self, Self::Eq | Self::Ne | Self::Sd | Self::Exists),
            xsd::STRING => matches!(
                self,
                Self::Eq | Self::Ne | Self::In | Self::Nin | Self::Sd | Self::Exists
            ),
            dt if xsd::ORDERED.contains(&dt) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Evaluate `x <op> values` the way the query circuits do.
///
/// NOOP, SD and EXISTS carry no comparison and are rejected.
pub fn compare(op: Operator, x: &Field, values: &[Field]) -> Result<bool, CoreError> {
    if !matches!(op, Operator::Noop | Operator::Sd | Operator::Exists) {
        op.validate_values(values.len())?;
    }

    let result = match op {
        Operator::Eq => x == &values[0],
        Operator::Ne => x != &values[0],
        Operator::Lt => x < &values[0],
        Operator::Gt => x > &values[0],
        Operator::Lte => x <= &values[0],
        Operator::Gte => x >= &values[0],
        Operator::In => values.contains(x),
        Operator::Nin => !values.contains(x),
        Operator::Between => &values[0] <= x && x <= &values[1],
        Operator::NonBetween => x < &values[0] || x > &values[1],
        Operator::Noop | Operator::Sd | Operator::Exists => {
            return Err(CoreError::UnsupportedOperator(format!(
                "{} is not a comparison",
                op
            )))
        }
    };
    Ok(result)
}
