//! Time functions. `now`, `today` and `yesterday` read the instant frozen in
//! the context, never the wall clock.

use std::sync::Arc;

use chrono_tz::Tz;

use crate::eval::{
    time::{parse_time_zone, TimeUnit, TimeValue},
    Context, Value,
};

use super::{Args, FunctionResult};

/// Zone from argument `index` if present, else the environment default.
fn zone_argument(args: &Args, index: usize, context: &Context) -> FunctionResult<Tz> {
    if args.len() > index {
        Ok(parse_time_zone(args.string(index, "timeZone")?)?)
    } else {
        Ok(context.env().time_zone())
    }
}

fn current(args: &Args, context: &Context) -> FunctionResult<TimeValue> {
    let zone = zone_argument(args, 0, context)?;
    Ok(TimeValue::new(zone, context.instant()))
}

pub fn now(args: Args, context: &Arc<Context>) -> FunctionResult<Value> {
    Ok(Value::Time(current(&args, context)?))
}

pub fn today(args: Args, context: &Arc<Context>) -> FunctionResult<Value> {
    Ok(Value::Time(current(&args, context)?.start_of_day()?))
}

pub fn yesterday(args: Args, context: &Arc<Context>) -> FunctionResult<Value> {
    let today = current(&args, context)?.start_of_day()?;
    Ok(Value::Time(today.add(-1, TimeUnit::Day)?))
}

pub fn time_add(args: Args) -> FunctionResult<Value> {
    let time = args.time(0, "timeValue")?;
    let amount = args.long(1, "amount")?;
    let unit = TimeUnit::parse(args.string(2, "timeUnit")?)?;
    Ok(Value::Time(time.add(amount, unit)?))
}

pub fn time_format(args: Args) -> FunctionResult<Value> {
    let time = args.time(0, "timeValue")?;
    let pattern = args.string(1, "formatString")?;
    Ok(Value::String(time.format(pattern)?))
}

pub fn time_parse(args: Args, context: &Arc<Context>) -> FunctionResult<Value> {
    let text = args.string(0, "timeString")?;
    let pattern = args.string(1, "formatString")?;
    let zone = zone_argument(&args, 2, context)?;
    Ok(Value::Time(TimeValue::parse(text, pattern, zone)?))
}

pub fn time_to_unix_day(args: Args) -> FunctionResult<Value> {
    Ok(Value::Long(args.time(0, "timeValue")?.unix_day()))
}

pub fn unix_day_to_time(args: Args, context: &Arc<Context>) -> FunctionResult<Value> {
    let day = args.long(0, "unixDay")?;
    let zone = zone_argument(&args, 1, context)?;
    Ok(Value::Time(TimeValue::from_unix_day(day, zone)?))
}

#[cfg(test)]
mod tests {
    use super::super::{
        tests::{call, call_in},
        FunctionCallError,
    };
    use super::*;
    use crate::{env::Env, eval::time::TimeError};
    use chrono_tz::America::Los_Angeles;
    use pretty_assertions::assert_eq;

    fn time_string(result: FunctionResult<Value>) -> String {
        match result {
            Ok(Value::Time(time)) => time.to_string(),
            other => panic!("expected time, got {:?}", other),
        }
    }

    #[test]
    fn test_now_today_yesterday() {
        assert_eq!(time_string(call("now", vec![])), "2014/08/20 03:12:15.384 UTC");
        assert_eq!(
            time_string(call("now", vec![Value::from("America/Los_Angeles")])),
            "2014/08/19 20:12:15.384 PDT"
        );
        assert_eq!(time_string(call("today", vec![])), "2014/08/20 00:00:00.000 UTC");
        assert_eq!(
            time_string(call("today", vec![Value::from("America/Los_Angeles")])),
            "2014/08/19 00:00:00.000 PDT"
        );
        assert_eq!(
            time_string(call("yesterday", vec![Value::from("GMT")])),
            "2014/08/19 00:00:00.000 GMT"
        );
    }

    #[test]
    fn test_default_zone_from_env() {
        let env = Arc::new(
            Env::builder()
                .with_time_zone(Los_Angeles)
                .with_current_time(1_408_504_335_384)
                .build(),
        );
        let context = Arc::new(env.new_context());
        assert_eq!(
            time_string(call_in(&context, "today", vec![])),
            "2014/08/19 00:00:00.000 PDT"
        );
    }

    #[test]
    fn test_unknown_zone() {
        assert_eq!(
            call("now", vec![Value::from("Nowhere/Special")]),
            Err(FunctionCallError::Time(TimeError::UnknownTimeZone(
                "Nowhere/Special".to_string()
            )))
        );
    }

    #[test]
    fn test_time_add() {
        let now = call("now", vec![Value::from("GMT")]).unwrap();
        assert_eq!(
            time_string(call("timeAdd", vec![now.clone(), Value::from(-1), Value::from("M")])),
            "2014/07/20 03:12:15.384 GMT"
        );
        assert_eq!(
            call("timeAdd", vec![now, Value::from(1), Value::from("w")]),
            Err(FunctionCallError::Time(TimeError::UnknownTimeUnit("w".to_string())))
        );
    }

    #[test]
    fn test_format_and_parse() {
        let now = call("now", vec![Value::from("GMT")]).unwrap();
        assert_eq!(
            call("timeFormat", vec![now, Value::from("yyyy/MM/dd/HH")]),
            Ok(Value::from("2014/08/20/03"))
        );
        assert_eq!(
            time_string(call(
                "timeParse",
                vec![
                    Value::from("2014-08-20 10:00"),
                    Value::from("yyyy-MM-dd HH:mm"),
                    Value::from("America/Los_Angeles")
                ]
            )),
            "2014/08/20 10:00:00.000 PDT"
        );
        assert!(call("timeParse", vec![Value::from("garbage"), Value::from("yyyy")]).is_err());
    }

    #[test]
    fn test_unix_day() {
        let time = call(
            "timeParse",
            vec![
                Value::from("2014/08/20 03:12:15.384"),
                Value::from("yyyy/MM/dd HH:mm:ss.SSS"),
                Value::from("GMT"),
            ],
        )
        .unwrap();
        assert_eq!(call("timeToUnixDay", vec![time]), Ok(Value::from(16302)));
        assert_eq!(
            time_string(call("unixDayToTime", vec![Value::from(16303), Value::from("GMT")])),
            "2014/08/21 00:00:00.000 GMT"
        );
    }
}
