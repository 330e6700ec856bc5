use std::sync::Arc;

use pathmetrics::{
    env::Env,
    eval::{render, Context, Dictionary, RenderError, Value},
    functions::FunctionCallError,
    storage::InMemoryStorage,
};
use pretty_assertions::assert_eq;

// 2014/08/20 03:12:15.384 GMT
const NOW: i64 = 1_408_504_335_384;

fn context() -> Arc<Context> {
    let storage = InMemoryStorage::new();
    storage
        .add_file("/logs/2014/08/18/part-0", 1, NOW)
        .add_file("/logs/2014/08/19/part-0", 1, NOW)
        .add_file("/logs/2014/08/19/part-1", 1, NOW)
        .add_directory("/logs/2014/08/_temporary", NOW);
    let env = Arc::new(
        Env::builder()
            .with_storage(Arc::new(storage))
            .with_current_time(NOW)
            .build(),
    );
    let context = env.new_context();
    context.set_property("root", "/logs");
    Arc::new(context)
}

fn eval(text: &str) -> Result<Value, RenderError> {
    render(text, &context())
}

fn string(text: &str) -> String {
    match eval(text) {
        Ok(Value::String(s)) => s,
        other => panic!("{} rendered {:?}", text, other),
    }
}

#[test]
fn test_daily_path_template() {
    assert_eq!(
        string("<%=root%>/<%=timeFormat(yesterday('GMT'), 'yyyy/MM/dd')%>/part-*"),
        "/logs/2014/08/19/part-*"
    );
    assert_eq!(
        string("/logs/<%=timeFormat(timeAdd(today('America/Los_Angeles'), -2, 'D'), 'yyyy/MM/dd')%>"),
        "/logs/2014/08/17"
    );
}

#[test]
fn test_latest_partition() {
    let text = "<%=listLast(sort(dirListName(concat(root, '/2014/08'), matcher('[0-9]+'))))%>";
    assert_eq!(string(text), "19");
}

#[test]
fn test_closures_over_storage() {
    let text = "<%=(fn(day) -> \
                  if(isDir(concat(root, '/2014/08/', day)), 'ready', 'missing'))('19')%>";
    assert_eq!(string(text), "ready");
    assert_eq!(
        eval("<%=(fn(dir) -> dirList(dir, fn(p) -> match(p, '.*part-1')))('/logs/2014/08/19')%>"),
        Ok(Value::List(vec![Value::from("/logs/2014/08/19/part-1")]))
    );
}

#[test]
fn test_dictionary_lookup() {
    let mut expected = Dictionary::new();
    expected.insert(Value::from("prod"), Value::from(3));
    expected.insert(Value::from("dev"), Value::from(1));
    assert_eq!(eval("<%={'prod': 3, 'dev': 1}%>"), Ok(Value::Dict(expected)));
    assert_eq!(string("<%=dictGet(dict('a', 'x', 'b', 'y'), 'b')%>"), "y");
    assert_eq!(eval("<%={'a': 1}['b']%>"), Ok(Value::Null));
}

#[test]
fn test_numbers() {
    assert_eq!(eval("<%=add(1, 2)%>"), Ok(Value::Long(3)));
    assert_eq!(eval("<%=add(1, 2.5)%>"), Ok(Value::Double(3.5)));
    assert_eq!(eval("<%=div(7, 2)%>"), Ok(Value::Long(3)));
    assert_eq!(string("<%=1%>.<%=5%>"), "1.5");
}

#[test]
fn test_errors_carry_locations() {
    let error = eval("\n  <%=listGet([1], 3)%>").unwrap_err();
    assert!(matches!(
        &error,
        RenderError::FunctionCall { error, .. } if matches!(**error, FunctionCallError::Failed(_))
    ));
    assert_eq!(error.location().line, 2);

    let error = eval("<%=timeParse('x', 'yyyy', 'Atlantis')%>").unwrap_err();
    assert!(error.to_string().contains("Atlantis"), "{}", error);
}
