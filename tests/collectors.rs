//! Collector behavior against paginated in-memory responses

mod common;

use aws_inventory::inventory::{
    collect_clusters, collect_databases, collect_functions, collect_instances,
    collect_namespaces,
};
use common::*;
use serde_json::{json, Value};

fn regions(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_namespaces_deduplicated_per_region() {
    let fake = FakeDispatch::new()
        .with_pages(
            "cloudwatch",
            "list_metrics",
            "us-east-1",
            paged(
                "Metrics",
                "NextToken",
                vec![
                    vec![metric("AWS/EC2", "CPUUtilization"), metric("AWS/EC2", "NetworkIn")],
                    vec![metric("AWS/Lambda", "Invocations"), metric("AWS/EC2", "DiskReadOps")],
                    vec![metric("Custom/App", "Latency")],
                ],
            ),
        )
        .with_pages(
            "cloudwatch",
            "list_metrics",
            "eu-west-1",
            vec![json!({ "Metrics": [metric("AWS/EC2", "CPUUtilization")] })],
        );

    let collected = collect_namespaces(&fake, &regions(&["us-east-1", "eu-west-1"])).await;

    let pairs: Vec<(&str, &str)> = collected
        .records
        .iter()
        .map(|r| (r.region.as_str(), r.namespace.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("us-east-1", "AWS/EC2"),
            ("us-east-1", "AWS/Lambda"),
            ("us-east-1", "Custom/App"),
            ("eu-west-1", "AWS/EC2"),
        ]
    );
    assert_eq!(fake.calls_to("cloudwatch", "list_metrics").len(), 4);
}

#[tokio::test]
async fn test_instances_flattened_across_pages() {
    let fake = FakeDispatch::new().with_pages(
        "ec2",
        "describe_instances",
        "us-east-1",
        paged(
            "Reservations",
            "NextToken",
            vec![
                vec![
                    json!({ "Instances": [instance("i-1", Some("web-1")), instance("i-2", None)] }),
                    json!({ "Instances": [instance("i-3", Some("db"))] }),
                ],
                vec![json!({ "Instances": [instance("i-4", Some("batch"))] })],
            ],
        ),
    );

    let collected = collect_instances(&fake, &regions(&["us-east-1"])).await;

    let rows: Vec<(&str, &str)> = collected
        .records
        .iter()
        .map(|r| (r.instance_id.as_str(), r.name.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![("i-1", "web-1"), ("i-2", ""), ("i-3", "db"), ("i-4", "batch")]
    );
    assert!(collected.records.iter().all(|r| r.region == "us-east-1"));

    let calls = fake.calls_to("ec2", "describe_instances");
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].params, json!({ "NextToken": "1" }));
}

#[tokio::test]
async fn test_instance_with_sparse_fields() {
    let fake = FakeDispatch::new().with_pages(
        "ec2",
        "describe_instances",
        "us-east-1",
        vec![json!({ "Reservations": [{ "Instances": [{ "InstanceId": "i-bare" }] }] })],
    );

    let collected = collect_instances(&fake, &regions(&["us-east-1"])).await;

    assert!(collected.failures.is_empty());
    let record = &collected.records[0];
    assert_eq!(record.name, "");
    assert_eq!(record.state, "");
    assert_eq!(record.launch_time, "");
}

#[tokio::test]
async fn test_databases_follow_marker() {
    let fake = FakeDispatch::new().with_pages(
        "rds",
        "describe_db_instances",
        "eu-west-1",
        paged(
            "DBInstances",
            "Marker",
            vec![vec![database("orders")], vec![database("billing")]],
        ),
    );

    let collected = collect_databases(&fake, &regions(&["eu-west-1"])).await;

    let ids: Vec<&str> = collected.records.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(ids, vec!["orders", "billing"]);
    assert_eq!(collected.records[0].storage_gb, Some(20));
    assert_eq!(
        fake.calls_to("rds", "describe_db_instances")[1].params,
        json!({ "Marker": "1" })
    );
}

#[tokio::test]
async fn test_functions_follow_next_marker() {
    let fake = FakeDispatch::new().with_pages(
        "lambda",
        "list_functions",
        "us-east-1",
        paged(
            "Functions",
            "NextMarker",
            vec![vec![function("a"), function("b")], vec![function("c")]],
        ),
    );

    let collected = collect_functions(&fake, &regions(&["us-east-1"])).await;

    assert_eq!(collected.records.len(), 3);
    assert_eq!(collected.records[2].function_name, "c");
    assert_eq!(collected.records[0].memory_mb, Some(256));
    assert_eq!(
        fake.calls_to("lambda", "list_functions")[1].params,
        json!({ "Marker": "1" })
    );
}

#[tokio::test]
async fn test_250_clusters_described_in_batches_of_100() {
    let arns: Vec<Value> = (0..250)
        .map(|i| Value::String(cluster_arn("us-east-1", &format!("cluster-{:03}", i))))
        .collect();
    let fake = FakeDispatch::new().with_pages(
        "ecs",
        "list_clusters",
        "us-east-1",
        paged(
            "clusterArns",
            "nextToken",
            arns.chunks(100).map(|c| c.to_vec()).collect(),
        ),
    );

    let collected = collect_clusters(&fake, &regions(&["us-east-1"])).await;

    assert_eq!(collected.records.len(), 250);
    assert_eq!(collected.records[0].cluster_name, "cluster-000");
    assert_eq!(collected.records[249].cluster_name, "cluster-249");
    assert_eq!(fake.calls_to("ecs", "list_clusters").len(), 3);

    let batch_sizes: Vec<usize> = fake
        .calls_to("ecs", "describe_clusters")
        .iter()
        .map(|c| c.params["clusters"].as_array().unwrap().len())
        .collect();
    assert_eq!(batch_sizes, vec![100, 100, 50]);
}

#[tokio::test]
async fn test_region_without_clusters_skips_describe() {
    let fake = FakeDispatch::new().with_pages(
        "ecs",
        "list_clusters",
        "us-east-1",
        vec![json!({ "clusterArns": [] })],
    );

    let collected = collect_clusters(&fake, &regions(&["us-east-1", "eu-west-1"])).await;

    assert!(collected.records.is_empty());
    assert!(collected.failures.is_empty());
    assert!(fake.calls_to("ecs", "describe_clusters").is_empty());
}

#[tokio::test]
async fn test_describe_failure_drops_only_that_region() {
    let fake = FakeDispatch::new()
        .with_pages(
            "ecs",
            "list_clusters",
            "us-east-1",
            vec![json!({ "clusterArns": [cluster_arn("us-east-1", "a")] })],
        )
        .with_pages(
            "ecs",
            "list_clusters",
            "eu-west-1",
            vec![json!({ "clusterArns": [cluster_arn("eu-west-1", "b")] })],
        )
        .failing("ecs", "describe_clusters", "us-east-1");

    let collected = collect_clusters(&fake, &regions(&["us-east-1", "eu-west-1"])).await;

    assert_eq!(collected.records.len(), 1);
    assert_eq!(collected.records[0].region, "eu-west-1");
    assert_eq!(collected.failures.len(), 1);
    assert_eq!(collected.failures[0].region, "us-east-1");
    assert!(collected.failures[0].error.starts_with("Permission denied."));
}

#[tokio::test]
async fn test_repeated_token_stops_pagination() {
    let fake = FakeDispatch::new().with_pages(
        "lambda",
        "list_functions",
        "us-east-1",
        vec![
            json!({ "Functions": [function("a")], "NextMarker": "1" }),
            json!({ "Functions": [function("b")], "NextMarker": "1" }),
        ],
    );

    let collected = collect_functions(&fake, &regions(&["us-east-1"])).await;

    assert_eq!(collected.records.len(), 2);
    assert_eq!(fake.calls_to("lambda", "list_functions").len(), 2);
}
