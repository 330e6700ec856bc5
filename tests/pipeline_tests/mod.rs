use std::{fs, sync::Arc};

use pathmetrics::{
    config::{ConfigBuilder, Metric, Path},
    env::Env,
    pipeline::{MockErrorHandler, PathMetrics, Pipeline},
    storage::{InMemoryStorage, LocalFileSystem},
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const NOW: i64 = 1_408_504_335_384;
const HOUR: i64 = 3_600_000;

fn daily_storage() -> InMemoryStorage {
    let storage = InMemoryStorage::new();
    storage
        .add_file("/logs/2014/08/19/app/part-0", 1_000, NOW - 2 * HOUR)
        .add_file("/logs/2014/08/19/app/part-1", 3_000, NOW - HOUR)
        .add_file("/logs/2014/08/19/web/part-0", 500, NOW - 3 * HOUR);
    storage
}

fn pipeline(storage: InMemoryStorage) -> Pipeline {
    let mut handler = MockErrorHandler::new();
    handler.expect_on_path_error().never();
    handler.expect_on_repeat_error().never();
    handler.expect_on_wait_error().never();
    let env = Env::builder()
        .with_storage(Arc::new(storage))
        .with_current_time(NOW)
        .with_max_workers(4)
        .with_error_handler(Arc::new(handler))
        .build();
    Pipeline::new(Arc::new(env))
}

fn summary(results: &[PathMetrics]) -> Vec<(String, f64, f64)> {
    results
        .iter()
        .map(|r| {
            (
                r.path_status.as_ref().unwrap().name.clone(),
                r.metric_value("count").unwrap(),
                r.metric_value("size").unwrap(),
            )
        })
        .collect()
}

const CONFIG: &str = r#"{
    "properties": {
        "day": "<%=timeFormat(yesterday(), 'yyyy/MM/dd')%>",
        "base": "/logs/<%=day%>"
    },
    "paths": [
        { "name": "all", "value": "<%=base%>/*/part-*",
          "tags": { "day": "<%=replace(day, '/', '')%>" },
          "metrics": [ { "name": "newest", "function": "age", "aggregate": "min" } ],
          "expectedCreationTime": "<%=timeAdd(today(), 1, 'h')%>" }
    ],
    "repeats": [
        { "var": "app", "list": "<%=sort(dirListName(base))%>",
          "paths": [ { "name": "<%=app%>", "value": "<%=base%>/<%=app%>/part-*" } ] }
    ]
}"#;

#[tokio::test]
async fn test_config_end_to_end() {
    let config = ConfigBuilder::new().from_str(CONFIG).unwrap().build().unwrap();
    let results = pipeline(daily_storage())
        .compute_all_metrics(&config)
        .await
        .unwrap();

    assert_eq!(
        summary(&results),
        vec![
            ("all".to_string(), 3.0, 4_500.0),
            ("app".to_string(), 2.0, 4_000.0),
            ("web".to_string(), 1.0, 500.0),
        ]
    );

    let all = &results[0];
    assert_eq!(
        all.path_status.as_ref().unwrap().value,
        "/logs/2014/08/19/*/part-*"
    );
    // anything present means no delay
    assert_eq!(all.metric_value("creationDelay"), Some(0.0));
    assert_eq!(all.metric_value("newest"), Some(HOUR as f64));
    assert_eq!(all.metric_value("maxAge"), Some((3 * HOUR) as f64));
    let datum = &all.metric_data.as_ref().unwrap()[0];
    assert_eq!(datum.id.tags, vec![("day".to_string(), "20140819".to_string())]);
}

#[tokio::test]
async fn test_results_follow_discovery_order_with_many_workers() {
    let storage = InMemoryStorage::new();
    let mut paths = Vec::new();
    for i in 0..20 {
        storage.add_file(&format!("/d/{}/f", i), i, NOW);
        paths.push(Path::new(format!("p{}", i), format!("/d/{}/f", i)));
    }
    let mut builder = ConfigBuilder::new();
    for path in paths {
        builder = builder.add_path(path);
    }
    let config = builder.build().unwrap();

    let results = pipeline(storage).compute_all_metrics(&config).await.unwrap();
    let sizes: Vec<f64> = results
        .iter()
        .map(|r| r.metric_value("size").unwrap())
        .collect();
    assert_eq!(sizes, (0..20).map(|i| i as f64).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_local_file_system_with_includes() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("README.md"), "# readme\n").unwrap();

    fs::write(
        dir.path().join("common.json"),
        r#"{ "properties": { "pkv": "readme.1" } }"#,
    )
    .unwrap();
    let main = dir.path().join("main.json");
    fs::write(
        &main,
        r#"{
            "includes": ["common.json"],
            "paths": [ { "name": "readme", "value": "/data/README.md",
                         "tags": { "pk": "<%=pkv%>" } } ]
        }"#,
    )
    .unwrap();

    let config = ConfigBuilder::new().from_file(&main).unwrap().build().unwrap();
    let env = Env::builder()
        .with_storage(Arc::new(LocalFileSystem::with_root(dir.path())))
        .build();
    let results = Pipeline::new(Arc::new(env))
        .compute_all_metrics(&config)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    let data = results[0].metric_data.as_ref().unwrap();
    let names: Vec<String> = data.iter().map(|d| d.id.full_name()).collect();
    assert_eq!(names, vec!["readme.age", "readme.size", "readme.count"]);
    assert_eq!(data[1].value, 9.0);
    assert_eq!(data[2].value, 1.0);
    assert!(data[0].value >= 0.0);
    for datum in data {
        assert_eq!(datum.id.tags, vec![("pk".to_string(), "readme.1".to_string())]);
    }
}

#[tokio::test]
async fn test_custom_aggregate_function() {
    let config = ConfigBuilder::new()
        .from_str(
            r#"{
                "properties": {
                    "spread": "<%=fn(metric, status) -> sub(metricAgg(metric, status), 0)%>"
                }
            }"#,
        )
        .unwrap()
        .add_path(
            Path::new("app", "/logs/2014/08/19/app/part-0").with_metric(
                Metric::new(Some("bytes"), "size", Some("sum")).with_agg_function("spread"),
            ),
        )
        .build()
        .unwrap();

    let results = pipeline(daily_storage())
        .compute_all_metrics(&config)
        .await
        .unwrap();
    assert_eq!(results[0].metric_value("bytes"), Some(1_000.0));
}
