// cli.rs - Runs the `sift` binary against the checked-in fixtures.

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::{json, Value};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn sift(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sift"))
        .args(args)
        .arg("--registry")
        .arg(fixture("registry.yaml"))
        .arg("--filter")
        .arg(fixture("filter.json"))
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "sift failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn compile_prints_pipeline() {
    let output = stdout_json(&sift(&["compile"]));
    assert_eq!(output["target"], json!("repos"));
    assert_eq!(output["joins"], json!(1));

    let pipeline = output["pipeline"].as_array().unwrap();
    assert_eq!(pipeline.len(), 3);
    assert_eq!(
        pipeline[0],
        json!({ "$lookup": {
            "from": "orgs",
            "localField": "org_id",
            "foreignField": "_id",
            "as": "org",
        }})
    );
    assert_eq!(
        pipeline[2],
        json!({ "$match": { "$or": [
            { "org.is_public": { "$eq": true } },
            { "org.owner.owners": { "$in": ["joe.average"] } },
        ]}})
    );
}

#[test]
fn query_returns_authorized_repos() {
    let data = fixture("data");
    let output = stdout_json(&sift(&["query", "--data", data.to_str().unwrap()]));
    let ids: Vec<_> = output
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["_id"].clone())
        .collect();
    assert_eq!(ids, vec![json!("r1"), json!("r2")]);
}

#[test]
fn query_by_id_respects_the_filter() {
    let data = fixture("data");
    let data = data.to_str().unwrap();

    let allowed = stdout_json(&sift(&["query", "--data", data, "--id", "r2"]));
    assert_eq!(allowed.as_array().map(Vec::len), Some(1));

    let denied = stdout_json(&sift(&["query", "--data", data, "--id", "r3"]));
    assert_eq!(denied, json!([]));
}

#[test]
fn missing_data_dir_fails() {
    let output = sift(&["query", "--data", "/nonexistent/sift-fixtures"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("loading fixtures"));
}
