use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("trellis").unwrap();
        cmd.env_remove("TRELLIS_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--data-dir")
            .arg(self.dir.path().join("data"))
            .arg("--config")
            .arg(self.dir.path().join("config.toml"));
        cmd
    }

    /// Run and return trimmed stdout
    fn run(&self, args: &[&str]) -> String {
        let output = self.cmd().args(args).assert().success().get_output().stdout.clone();
        String::from_utf8(output).unwrap().trim().to_string()
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let mut full = vec!["--format", "json"];
        full.extend_from_slice(args);
        serde_json::from_str(&self.run(&full)).unwrap()
    }

    fn ids(&self, args: &[&str]) -> Vec<String> {
        self.json(args)
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["id"].as_str().unwrap().to_string())
            .collect()
    }
}

#[test]
fn test_vertex_lifecycle() {
    let env = Env::new();
    let id = env.run(&["vertex", "add", "--label", "person", "--prop", "name=Ada"]);

    let vertex = env.json(&["vertex", "get", &id]);
    assert_eq!(vertex["label"], "person");
    assert_eq!(vertex["properties"]["name"], "Ada");
    assert_eq!(vertex["type"], "Vertex");

    env.cmd()
        .args(["vertex", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));

    env.run(&["vertex", "delete", &id]);
    env.cmd()
        .args(["vertex", "get", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_friend_scenario() {
    let env = Env::new();
    let a = env.run(&["vertex", "add"]);
    let b = env.run(&["vertex", "add"]);
    let c = env.run(&["vertex", "add"]);

    env.run(&["adj", "add", &a, "friend", "--peer", &b]);
    env.run(&["adj", "add", &a, "friend", "--direction", "in", "--peer", &c]);

    assert_eq!(env.ids(&["adj", "get", &a, "friend", "--direction", "out"]), vec![b.clone()]);
    assert_eq!(env.ids(&["adj", "get", &a, "friend", "--direction", "in"]), vec![c.clone()]);
    assert_eq!(env.ids(&["adj", "get", &a, "friend"]), vec![b.clone()]);
    assert_eq!(
        env.ids(&["adj", "get", &a, "friend", "--direction", "both"]),
        vec![b.clone(), c.clone()]
    );
    assert_eq!(
        env.ids(&["adj", "get", &a, "friend", "--direction", "both", "--peer", &c]),
        vec![c.clone()]
    );

    let stats = env.json(&["adj", "set", &a, "friend", &c]);
    assert_eq!(stats["edges_removed"], 1);
    assert_eq!(stats["edges_added"], 1);
    assert_eq!(env.ids(&["adj", "get", &a, "friend", "--direction", "out"]), vec![c.clone()]);

    let stats = env.json(&["adj", "remove", &a, "friend", "--direction", "both", "--peer", &c]);
    assert_eq!(stats["edges_removed"], 2);
    assert!(env.ids(&["adj", "get", &a, "friend", "--direction", "both"]).is_empty());
}

#[test]
fn test_typed_traversal_from_config() {
    let env = Env::new();
    env.run(&["config", "set", "types.Person", "Vertex"]);
    env.run(&["config", "set", "types.Programmer", "Person"]);

    let source = env.run(&["vertex", "add"]);
    let plain = env.run(&["vertex", "add"]);
    let coder = env.run(&["vertex", "add", "--type", "Programmer"]);
    env.run(&["adj", "add", &source, "knows", "--peer", &plain]);
    env.run(&["adj", "add", &source, "knows", "--peer", &coder]);

    let people = env.json(&["adj", "get", &source, "knows", "--type", "Person"]);
    let people = people.as_array().unwrap();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0]["id"], coder.as_str());
    assert_eq!(people[0]["type"], "Programmer");
}

#[test]
fn test_edge_listing_honors_type() {
    let env = Env::new();
    env.run(&["config", "set", "types.Knows", "Edge"]);

    let a = env.run(&["vertex", "add"]);
    let b = env.run(&["vertex", "add"]);
    env.run(&["adj", "add", &a, "knows", "--peer", &b, "--edge-type", "Knows"]);
    env.run(&["adj", "add", &a, "knows", "--peer", &b]);

    assert_eq!(env.ids(&["adj", "get", &a, "knows", "--edges"]).len(), 2);

    let typed = env.json(&["adj", "get", &a, "knows", "--edges", "--type", "Knows"]);
    let typed = typed.as_array().unwrap();
    assert_eq!(typed.len(), 1);
    assert_eq!(typed[0]["type"], "Knows");
}

#[test]
fn test_unknown_direction_rejected_before_mutation() {
    let env = Env::new();
    let a = env.run(&["vertex", "add"]);
    let b = env.run(&["vertex", "add"]);

    env.cmd()
        .args(["adj", "add", &a, "knows", "--direction", "sideways", "--peer", &b])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));

    assert!(env.ids(&["adj", "get", &a, "knows"]).is_empty());
}

#[test]
fn test_unregistered_initializer_type_rejected() {
    let env = Env::new();
    env.cmd()
        .args(["vertex", "add", "--type", "Ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not registered"));

    let listed = env.json(&["vertex", "list"]);
    assert!(listed.as_array().unwrap().is_empty());
}

#[test]
fn test_config_commands() {
    let env = Env::new();
    env.run(&["config", "init"]);
    env.cmd().args(["config", "init"]).assert().failure();

    env.run(&["config", "set", "resolver", "untyped"]);
    assert_eq!(env.run(&["config", "get", "resolver"]), "untyped");

    env.cmd()
        .args(["config", "get", "colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));

    env.cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_completions() {
    Command::cargo_bin("trellis")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("trellis"));
}
