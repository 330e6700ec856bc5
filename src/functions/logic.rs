use std::cmp::Ordering;

use crate::eval::Value;

use super::{Args, FunctionCallError, FunctionResult};

/// -1, 0 or 1 for two values of the same comparable kind.
pub fn compare(args: Args) -> FunctionResult<Value> {
    let (a, b) = (args.value(0, "value1")?, args.value(1, "value2")?);
    let ordering = a.compare(b).ok_or_else(|| {
        FunctionCallError::Failed(format!(
            "Cannot compare {} with {}",
            a.type_name(),
            b.type_name()
        ))
    })?;
    Ok(Value::Long(match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }))
}

pub fn not(args: Args) -> FunctionResult<Value> {
    Ok(Value::Boolean(!args.boolean(0, "arg")?))
}

/// Values of different types are unequal, including 1 and 1.0.
pub fn eq(args: Args) -> FunctionResult<Value> {
    Ok(Value::Boolean(args.value(0, "arg0")? == args.value(1, "arg1")?))
}

pub fn ne(args: Args) -> FunctionResult<Value> {
    Ok(Value::Boolean(args.value(0, "arg0")? != args.value(1, "arg1")?))
}

#[cfg(test)]
mod tests {
    use super::super::tests::call;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compare() {
        assert_eq!(call("compare", vec![Value::from(1), Value::from(2)]), Ok(Value::from(-1)));
        assert_eq!(call("compare", vec![Value::from("b"), Value::from("a")]), Ok(Value::from(1)));
        assert_eq!(call("compare", vec![Value::from(2.0), Value::from(2)]), Ok(Value::from(0)));
        assert!(matches!(
            call("compare", vec![Value::from(1), Value::from(true)]),
            Err(FunctionCallError::Failed(_))
        ));
    }

    #[test]
    fn test_not() {
        assert_eq!(call("not", vec![Value::from(false)]), Ok(Value::from(true)));
    }

    #[test]
    fn test_eq_ne() {
        assert_eq!(call("eq", vec![Value::from("a"), Value::from("a")]), Ok(Value::from(true)));
        assert_eq!(call("eq", vec![Value::from(1), Value::from(1.0)]), Ok(Value::from(false)));
        assert_eq!(call("ne", vec![Value::from(1), Value::from("1")]), Ok(Value::from(true)));
        assert_eq!(
            call(
                "eq",
                vec![
                    Value::from(vec![Value::from(1), Value::from("x")]),
                    Value::from(vec![Value::from(1), Value::from("x")])
                ]
            ),
            Ok(Value::from(true))
        );
    }
}
