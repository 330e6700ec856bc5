//! Arithmetic and numeric comparison.
//!
//! Two integers stay integers; as soon as one operand is a double both are
//! widened. Integer arithmetic wraps on overflow.

use std::cmp::Ordering;

use crate::eval::Value;

use super::{Args, FunctionCallError, FunctionResult};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operands {
    Long(i64, i64),
    Double(f64, f64),
}

fn operands(args: Args) -> FunctionResult<Operands> {
    let number = |index: usize, argument: &str| match args.get(index) {
        Some(value @ (Value::Long(_) | Value::Double(_))) => Ok(value),
        _ => Err(FunctionCallError::WrongArgument {
            function: args.function_name().to_string(),
            argument: argument.to_string(),
            expected: "a number",
            found: args.get(index).map(Value::type_name).unwrap_or("nothing"),
        }),
    };
    let (a, b) = (number(0, "arg0")?, number(1, "arg1")?);
    Ok(match (a, b) {
        (Value::Long(a), Value::Long(b)) => Operands::Long(*a, *b),
        _ => Operands::Double(
            a.as_double().unwrap_or_default(),
            b.as_double().unwrap_or_default(),
        ),
    })
}

pub fn add(args: Args) -> FunctionResult<Value> {
    Ok(match operands(args)? {
        Operands::Long(a, b) => Value::Long(a.wrapping_add(b)),
        Operands::Double(a, b) => Value::Double(a + b),
    })
}

pub fn sub(args: Args) -> FunctionResult<Value> {
    Ok(match operands(args)? {
        Operands::Long(a, b) => Value::Long(a.wrapping_sub(b)),
        Operands::Double(a, b) => Value::Double(a - b),
    })
}

pub fn mul(args: Args) -> FunctionResult<Value> {
    Ok(match operands(args)? {
        Operands::Long(a, b) => Value::Long(a.wrapping_mul(b)),
        Operands::Double(a, b) => Value::Double(a * b),
    })
}

pub fn div(args: Args) -> FunctionResult<Value> {
    match operands(args)? {
        Operands::Long(_, 0) => Err(FunctionCallError::DivideByZero),
        Operands::Long(a, b) => Ok(Value::Long(a.wrapping_div(b))),
        Operands::Double(_, b) if b == 0.0 => Err(FunctionCallError::DivideByZero),
        Operands::Double(a, b) => Ok(Value::Double(a / b)),
    }
}

fn ordering(args: Args) -> FunctionResult<Option<Ordering>> {
    Ok(match operands(args)? {
        Operands::Long(a, b) => Some(a.cmp(&b)),
        Operands::Double(a, b) => a.partial_cmp(&b),
    })
}

pub fn lt(args: Args) -> FunctionResult<Value> {
    Ok(Value::Boolean(ordering(args)? == Some(Ordering::Less)))
}

pub fn gt(args: Args) -> FunctionResult<Value> {
    Ok(Value::Boolean(ordering(args)? == Some(Ordering::Greater)))
}

pub fn lt_eq(args: Args) -> FunctionResult<Value> {
    Ok(Value::Boolean(matches!(
        ordering(args)?,
        Some(Ordering::Less | Ordering::Equal)
    )))
}

pub fn gt_eq(args: Args) -> FunctionResult<Value> {
    Ok(Value::Boolean(matches!(
        ordering(args)?,
        Some(Ordering::Greater | Ordering::Equal)
    )))
}

#[cfg(test)]
mod tests {
    use super::super::tests::call;
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_arithmetic() {
        assert_eq!(call("add", vec![Value::from(2), Value::from(3)]), Ok(Value::from(5)));
        assert_eq!(call("add", vec![Value::from(2), Value::from(0.5)]), Ok(Value::from(2.5)));
        assert_eq!(call("sub", vec![Value::from(2.0), Value::from(3)]), Ok(Value::from(-1.0)));
        assert_eq!(call("mul", vec![Value::from(4), Value::from(-3)]), Ok(Value::from(-12)));
        assert_eq!(call("div", vec![Value::from(7), Value::from(2)]), Ok(Value::from(3)));
        assert_eq!(call("div", vec![Value::from(7), Value::from(2.0)]), Ok(Value::from(3.5)));
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(
            call("div", vec![Value::from(1), Value::from(0)]),
            Err(FunctionCallError::DivideByZero)
        );
        assert_eq!(
            call("div", vec![Value::from(1.5), Value::from(0.0)]),
            Err(FunctionCallError::DivideByZero)
        );
        assert_eq!(
            call("div", vec![Value::from(1), Value::from(0.0)]),
            Err(FunctionCallError::DivideByZero)
        );
    }

    #[test]
    fn test_non_numbers() {
        assert!(matches!(
            call("add", vec![Value::from("1"), Value::from(1)]),
            Err(FunctionCallError::WrongArgument { found: "string", .. })
        ));
    }

    #[test]
    fn test_comparison() {
        assert_eq!(call("lt", vec![Value::from(1), Value::from(2)]), Ok(Value::from(true)));
        assert_eq!(call("gt", vec![Value::from(1), Value::from(0.5)]), Ok(Value::from(true)));
        assert_eq!(call("ltEq", vec![Value::from(2), Value::from(2.0)]), Ok(Value::from(true)));
        assert_eq!(call("gtEq", vec![Value::from(1), Value::from(2)]), Ok(Value::from(false)));
        assert_eq!(
            call("lt", vec![Value::from(f64::NAN), Value::from(1)]),
            Ok(Value::from(false))
        );
    }

    proptest! {
        #[test]
        fn integer_operands_stay_integers(a in any::<i64>(), b in any::<i64>()) {
            for name in ["add", "sub", "mul"] {
                let result = call(name, vec![Value::from(a), Value::from(b)]).unwrap();
                prop_assert!(matches!(result, Value::Long(_)));
            }
        }

        #[test]
        fn any_double_operand_gives_double(a in any::<i64>(), b in -1e12f64..1e12) {
            for name in ["add", "sub", "mul"] {
                let left = call(name, vec![Value::from(a), Value::from(b)]).unwrap();
                let right = call(name, vec![Value::from(b), Value::from(a)]).unwrap();
                prop_assert!(matches!(left, Value::Double(_)));
                prop_assert!(matches!(right, Value::Double(_)));
            }
        }
    }
}
