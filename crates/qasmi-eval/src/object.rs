//! Classical values: constants and bit strings.

use std::fmt;

use qasmi_qasm3::syntax::{BasicLit, BinOp, LitKind, TypeKind, UnaryOp};
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// A typed constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Const {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Const {
    /// Convert a literal.
    pub fn from_lit(lit: &BasicLit) -> EvalResult<Self> {
        match lit.kind {
            LitKind::Int => lit
                .as_int()
                .map(Const::Int)
                .ok_or_else(|| EvalError::Overflow(format!("literal {}", lit.value))),
            LitKind::Float => lit
                .as_float()
                .map(Const::Float)
                .ok_or_else(|| EvalError::TypeMismatch(format!("malformed float {}", lit.value))),
            LitKind::Str => Ok(Const::Str(lit.value.clone())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Const::Int(_) => "int",
            Const::Float(_) => "float",
            Const::Str(_) => "string",
        }
    }

    /// Numeric value as a float.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> EvalResult<f64> {
        match self {
            Const::Int(v) => Ok(*v as f64),
            Const::Float(v) => Ok(*v),
            Const::Str(s) => Err(EvalError::TypeMismatch(format!(
                "expected a number, got string \"{s}\""
            ))),
        }
    }

    /// Integer value. Floats are rejected, not truncated.
    pub fn as_int(&self) -> EvalResult<i64> {
        match self {
            Const::Int(v) => Ok(*v),
            other => Err(EvalError::TypeMismatch(format!(
                "expected an int, got {}",
                other.type_name()
            ))),
        }
    }

    /// Fold a binary operation. `int op int` stays an int; any float operand
    /// promotes the result to float.
    pub fn binary(&self, op: BinOp, rhs: &Const) -> EvalResult<Const> {
        match (self, rhs) {
            (Const::Int(a), Const::Int(b)) => int_binary(*a, op, *b).map(Const::Int),
            (Const::Str(_), _) | (_, Const::Str(_)) => Err(EvalError::TypeMismatch(format!(
                "cannot apply '{}' to {} and {}",
                op.symbol(),
                self.type_name(),
                rhs.type_name()
            ))),
            _ => {
                let (a, b) = (self.as_f64()?, rhs.as_f64()?);
                let v = match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Mod => a % b,
                };
                Ok(Const::Float(v))
            }
        }
    }

    /// Fold a unary operation.
    pub fn unary(&self, op: UnaryOp) -> EvalResult<Const> {
        match (op, self) {
            (UnaryOp::Pos, Const::Int(_) | Const::Float(_)) => Ok(self.clone()),
            (UnaryOp::Neg, Const::Int(v)) => v
                .checked_neg()
                .map(Const::Int)
                .ok_or_else(|| EvalError::Overflow(format!("-{v}"))),
            (UnaryOp::Neg, Const::Float(v)) => Ok(Const::Float(-v)),
            (_, Const::Str(_)) => Err(EvalError::TypeMismatch(
                "cannot negate a string".to_string(),
            )),
        }
    }

    /// Convert to a declared scalar type.
    pub fn coerce(self, kind: TypeKind) -> EvalResult<Const> {
        match (kind, self) {
            (TypeKind::Int | TypeKind::Uint, c @ Const::Int(_)) => {
                if kind == TypeKind::Uint && c.as_int()? < 0 {
                    return Err(EvalError::TypeMismatch(format!("uint cannot hold {c}")));
                }
                Ok(c)
            }
            (TypeKind::Float | TypeKind::Angle, c @ (Const::Int(_) | Const::Float(_))) => {
                Ok(Const::Float(c.as_f64()?))
            }
            (kind, c) => Err(EvalError::TypeMismatch(format!(
                "cannot use {} as {}",
                c.type_name(),
                kind.name()
            ))),
        }
    }
}

fn int_binary(a: i64, op: BinOp, b: i64) -> EvalResult<i64> {
    if matches!(op, BinOp::Div | BinOp::Mod) && b == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let folded = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div => a.checked_div(b),
        BinOp::Mod => a.checked_rem(b),
    };
    folded.ok_or_else(|| EvalError::Overflow(format!("{a} {} {b}", op.symbol())))
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Const::Int(v) => write!(f, "{v}"),
            Const::Float(v) => write!(f, "{v:?}"),
            Const::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

/// The result of evaluating an expression or a call.
///
/// Bit strings are stored in register order; index 0 is the most significant
/// bit when the string is read as an integer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// Gate calls and subroutines without a `return` value.
    #[default]
    None,
    Const(Const),
    Bits(Vec<u8>),
}

impl Value {
    /// Bits to store in a register of `len` bits. Integers are written
    /// big-endian and must fit.
    pub fn to_bits(&self, len: usize) -> EvalResult<Vec<u8>> {
        match self {
            Value::Bits(bits) if bits.len() == len => Ok(bits.clone()),
            Value::Bits(bits) => Err(EvalError::SizeMismatch {
                expected: len,
                got: bits.len(),
            }),
            Value::Const(Const::Int(v)) => {
                if *v < 0 || (len < 63 && *v >= 1_i64 << len) {
                    return Err(EvalError::TypeMismatch(format!(
                        "{v} does not fit in {len} bit(s)"
                    )));
                }
                Ok((0..len)
                    .map(|i| {
                        let shift = len - 1 - i;
                        if shift >= 64 {
                            0
                        } else {
                            u8::from((*v >> shift) & 1 == 1)
                        }
                    })
                    .collect())
            }
            other => Err(EvalError::TypeMismatch(format!(
                "cannot store {} in a bit register",
                other.type_name()
            ))),
        }
    }

    /// Scalar view: constants as is, bit strings read big-endian.
    pub fn to_const(&self) -> EvalResult<Const> {
        match self {
            Value::Const(c) => Ok(c.clone()),
            Value::Bits(bits) if bits.len() <= 63 => Ok(Const::Int(
                bits.iter().fold(0, |acc, &b| (acc << 1) | i64::from(b)),
            )),
            other => Err(EvalError::TypeMismatch(format!(
                "expected a scalar, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Const(c) => c.type_name(),
            Value::Bits(_) => "bits",
        }
    }
}

impl From<Const> for Value {
    fn from(c: Const) -> Self {
        Value::Const(c)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Const(c) => write!(f, "{c}"),
            Value::Bits(bits) => {
                for b in bits {
                    write!(f, "{b}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_folding() {
        let sum = Const::Int(7).binary(BinOp::Add, &Const::Int(8)).unwrap();
        assert_eq!(sum, Const::Int(15));
        assert_eq!(
            Const::Int(7).binary(BinOp::Div, &Const::Int(2)).unwrap(),
            Const::Int(3)
        );
        assert_eq!(
            Const::Int(-7).binary(BinOp::Mod, &Const::Int(3)).unwrap(),
            Const::Int(-1)
        );
    }

    #[test]
    fn test_float_promotion() {
        let sum = Const::Float(7.0).binary(BinOp::Add, &Const::Float(8.0)).unwrap();
        assert_eq!(sum, Const::Float(15.0));
        let mixed = Const::Int(1).binary(BinOp::Div, &Const::Float(4.0)).unwrap();
        assert_eq!(mixed, Const::Float(0.25));
    }

    #[test]
    fn test_unary() {
        assert_eq!(Const::Int(3).unary(UnaryOp::Neg).unwrap(), Const::Int(-3));
        assert_eq!(
            Const::Float(1.5).unary(UnaryOp::Neg).unwrap(),
            Const::Float(-1.5)
        );
        assert!(Const::Str("a".into()).unary(UnaryOp::Neg).is_err());
        assert!(matches!(
            Const::Int(i64::MIN).unary(UnaryOp::Neg),
            Err(EvalError::Overflow(_))
        ));
    }

    #[test]
    fn test_arithmetic_errors() {
        assert_eq!(
            Const::Int(1).binary(BinOp::Div, &Const::Int(0)),
            Err(EvalError::DivisionByZero)
        );
        assert!(matches!(
            Const::Int(i64::MAX).binary(BinOp::Add, &Const::Int(1)),
            Err(EvalError::Overflow(_))
        ));
        assert!(matches!(
            Const::Str("a".into()).binary(BinOp::Add, &Const::Int(1)),
            Err(EvalError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_coerce() {
        assert_eq!(
            Const::Int(2).coerce(TypeKind::Float).unwrap(),
            Const::Float(2.0)
        );
        assert!(Const::Float(2.5).coerce(TypeKind::Int).is_err());
        assert!(Const::Int(-1).coerce(TypeKind::Uint).is_err());
    }

    #[test]
    fn test_bits() {
        assert_eq!(Value::from(Const::Int(6)).to_bits(3).unwrap(), vec![1, 1, 0]);
        assert!(Value::from(Const::Int(8)).to_bits(3).is_err());
        assert_eq!(
            Value::Bits(vec![1, 0]).to_bits(3),
            Err(EvalError::SizeMismatch {
                expected: 3,
                got: 2
            })
        );
        assert_eq!(Value::Bits(vec![1, 1, 0]).to_const().unwrap(), Const::Int(6));
        assert_eq!(Value::Bits(vec![0, 1]).to_string(), "01");
    }
}
