use assert_cmd::Command;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const CATALOG: &str = r#"
[[modules]]
id = "core"
label = "Core"

[[modules.features]]
name = "Math"
category = "Data"
description = "Vector and matrix types"

[[modules.checklist]]
id = "math"
label = "Math library"
features = ["Math"]

[[modules]]
id = "physics"
label = "Physics"
prerequisites = ["core"]

[[modules.features]]
name = "Shapes"
depends_on = ["core::Math"]

[[modules.features]]
name = "Broadphase"
depends_on = ["Shapes"]

[[modules.features]]
name = "Solver"
depends_on = ["Broadphase"]

[[modules.checklist]]
id = "shapes"
label = "Collision shapes"
features = ["Shapes"]

[[modules.checklist]]
id = "broadphase"
label = "Broadphase"
features = ["Broadphase"]

[[modules.checklist]]
id = "solver"
label = "Solver"
features = ["Solver"]
"#;

fn setup() -> TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::write(root.join("catalog.toml"), CATALOG).unwrap();
    fs::write(
        root.join("status.json"),
        r#"{ "core::Math": "implemented", "physics::Shapes": "missing" }"#,
    )
    .unwrap();
    fs::write(
        root.join("progress.json"),
        r#"{ "checked": { "core": { "math": true } } }"#,
    )
    .unwrap();
    temp
}

#[allow(deprecated)]
fn planner(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("feature-planner").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("FEATURE_PLANNER_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--catalog")
        .arg("catalog.toml");
    cmd
}

fn run_json(workdir: &Path, args: &[&str]) -> Value {
    let output = planner(workdir)
        .arg("--json")
        .args(args)
        .output()
        .expect("command run");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn keys(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["key"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn plan_orders_features_by_dependency_layer() {
    let temp = setup();
    let plan = run_json(temp.path(), &["--status", "status.json", "plan"]);

    assert_eq!(
        keys(&plan["items"]),
        vec!["physics::Shapes", "physics::Broadphase", "physics::Solver"]
    );
    assert_eq!(plan["totalFeatures"], 4);
    assert_eq!(plan["implementedCount"], 1);
    assert_eq!(plan["remainingCount"], 3);
    assert_eq!(plan["totalEffortMinutes"], 90);

    let first = &plan["items"][0];
    assert_eq!(first["moduleId"], "physics");
    assert_eq!(first["isReady"], true);
    assert_eq!(first["status"], "missing");
    assert_eq!(first["dependsOn"][0], "core::Math");
    assert_eq!(plan["items"][1]["isReady"], false);
    assert_eq!(plan["items"][2]["depth"], 2);
}

#[test]
fn plan_filters_scope_totals_to_module() {
    let temp = setup();
    let plan = run_json(
        temp.path(),
        &[
            "--status",
            "status.json",
            "plan",
            "--module",
            "physics",
            "--min-impact",
            "1",
        ],
    );

    assert_eq!(
        keys(&plan["items"]),
        vec!["physics::Shapes", "physics::Broadphase"]
    );
    assert_eq!(plan["totalFeatures"], 3);
    assert_eq!(plan["implementedCount"], 0);
    assert_eq!(plan["remainingCount"], 2);

    let none = run_json(
        temp.path(),
        &["--status", "status.json", "plan", "--max-effort", "trivial"],
    );
    assert_eq!(none["items"], Value::Array(Vec::new()));
}

#[test]
fn deps_reports_same_module_chain_and_depth() {
    let temp = setup();
    let deps = run_json(temp.path(), &["deps", "physics::Solver"]);

    assert_eq!(deps["key"], "physics::Solver");
    assert_eq!(keys(&deps["deps"]), vec!["physics::Broadphase"]);
    assert_eq!(deps["depth"], 2);

    let chain = keys(&deps["chain"]);
    assert!(chain.contains(&"physics::Broadphase".to_string()));
    assert!(chain.contains(&"physics::Shapes".to_string()));
    assert!(!chain.contains(&"physics::Solver".to_string()));
}

#[test]
fn blockers_lists_only_blocked_features() {
    let temp = setup();
    let blockers = run_json(temp.path(), &["--status", "status.json", "blockers"]);

    let object = blockers.as_object().unwrap();
    let mut blocked: Vec<&String> = object.keys().collect();
    blocked.sort();
    assert_eq!(blocked, vec!["physics::Broadphase", "physics::Solver"]);
    assert_eq!(blockers["physics::Solver"]["blockers"][0], "physics::Broadphase");
    assert_eq!(blockers["physics::Solver"]["isBlocked"], true);

    let core_only = run_json(
        temp.path(),
        &["--status", "status.json", "blockers", "--module", "core"],
    );
    assert!(core_only.as_object().unwrap().is_empty());
}

#[test]
fn impact_is_ranked_and_limited() {
    let temp = setup();
    let impact = run_json(
        temp.path(),
        &["--status", "status.json", "impact", "--limit", "2"],
    );

    assert_eq!(
        keys(&impact),
        vec!["physics::Shapes", "physics::Broadphase"]
    );
    assert_eq!(impact[0]["directUnblocks"], 1);
    assert_eq!(impact[0]["transitiveUnblocks"], 2);
    assert_eq!(impact[0]["score"], 4);
    assert_eq!(impact[1]["score"], 3);
}

#[test]
fn effort_for_unknown_feature_uses_default_estimate() {
    let temp = setup();
    let effort = run_json(temp.path(), &["effort", "physics::Cloth"]);

    assert_eq!(effort["key"], "physics::Cloth");
    assert_eq!(effort["level"], "medium");
    assert_eq!(effort["minutes"], 60);
}

#[test]
fn next_ranks_unchecked_items() {
    let temp = setup();
    let ranked = run_json(
        temp.path(),
        &["next", "physics", "--progress", "progress.json"],
    );

    let items: Vec<&str> = ranked
        .as_array()
        .unwrap()
        .iter()
        .map(|rec| rec["item"].as_str().unwrap())
        .collect();
    assert_eq!(items, vec!["shapes", "broadphase", "solver"]);
    // core checklist is complete, no snapshot given
    assert_eq!(ranked[0]["breakdown"]["readiness"], 15.0);
    assert_eq!(ranked[0]["features"][0], "physics::Shapes");

    let top = run_json(
        temp.path(),
        &["next", "physics", "--progress", "progress.json", "--top"],
    );
    assert_eq!(top["item"], "shapes");
    assert_eq!(top["score"], ranked[0]["score"]);
}

#[test]
fn next_for_unknown_module_is_empty() {
    let temp = setup();
    let ranked = run_json(temp.path(), &["next", "audio", "--progress", "progress.json"]);
    assert_eq!(ranked, Value::Array(Vec::new()));
}

#[test]
fn status_summarises_modules_as_text() {
    let temp = setup();
    let output = planner(temp.path())
        .arg("--status")
        .arg("status.json")
        .arg("status")
        .output()
        .expect("command run");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("core"));
    assert!(lines[0].contains("100.0%"));
    assert!(lines[1].starts_with("physics"));
    assert!(lines[1].contains("missing 1"));
}

#[test]
fn invalid_key_is_an_error() {
    let temp = setup();
    planner(temp.path())
        .args(["deps", "Solver"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Invalid feature key"));
}

#[test]
fn unknown_effort_level_is_rejected() {
    let temp = setup();
    planner(temp.path())
        .args(["plan", "--max-effort", "huge"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("huge"));
}

#[test]
fn unreadable_status_file_is_an_error() {
    let temp = setup();
    fs::write(temp.path().join("broken.json"), r#"{ "core::Math": "done" }"#).unwrap();

    let output = planner(temp.path())
        .args(["--status", "broken.json", "plan"])
        .output()
        .expect("command run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.json"), "stderr: {stderr}");
}
