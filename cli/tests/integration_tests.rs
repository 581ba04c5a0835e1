use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const DOCKER_TREE: &str = r#"{
    "name": "docker",
    "subcommands": [
        { "name": "build" },
        { "name": "builder" },
        { "name": "buildx" },
        {
            "name": "run",
            "flags": [
                { "short": "d", "long": "detach" },
                { "short": "i", "long": "interactive" },
                { "long": "name", "takes_argument": true }
            ]
        },
        { "name": "start" },
        { "name": "stop" }
    ]
}"#;

fn write_tree(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("docker.json");
    fs::write(&path, DOCKER_TREE).expect("failed to write tree");
    path
}

fn create_aliases(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_create-aliases"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run create-aliases")
}

fn generate(tree: &Path, extra: &[&str]) -> Output {
    let tree = tree.to_str().expect("temp path must be UTF-8");
    let mut args = vec!["generate", "--tree", tree];
    args.extend_from_slice(extra);
    create_aliases(&args)
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_generate_prints_shell_aliases() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir);

    let output = generate(&tree, &["--preset", "default"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let lines = stdout_lines(&output);
    assert!(lines.contains(&"alias d='docker'".to_string()));
    assert!(lines.contains(&"alias dr='docker run'".to_string()));
    assert!(lines.contains(&"alias dsta='docker start'".to_string()));
    assert!(lines.contains(&"alias dsto='docker stop'".to_string()));
    assert!(lines.contains(&"alias drdi='docker run -di'".to_string()));
    assert!(lines.iter().all(|line| line.starts_with("alias ")));
    assert!(!lines.iter().any(|line| line.contains("--name")));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("for 7 commands"), "stderr: {stderr}");
}

#[test]
fn test_generate_uses_preset_named_after_binary() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir);

    let output = generate(&tree, &[]);
    assert!(output.status.success());

    let lines = stdout_lines(&output);
    assert!(lines.contains(&"alias db='docker build'".to_string()));
    assert!(lines.contains(&"alias dbr='docker builder'".to_string()));
    assert!(lines.contains(&"alias dbx='docker buildx'".to_string()));
    assert!(lines.contains(&"alias dsta='docker start'".to_string()));
}

#[test]
fn test_generate_json_format() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir);

    let output = generate(&tree, &["--preset", "default", "--format", "json"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = value["entries"].as_array().unwrap();
    assert!(entries.iter().any(|e| {
        e["abbrev"] == "drd" && e["command"] == "docker run -d" && e["kind"] == "flags"
    }));
}

#[test]
fn test_generate_overrides() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir);

    let output = generate(
        &tree,
        &["--preset", "default", "--max-flags", "0", "--root-alias", "dk"],
    );
    assert!(output.status.success());

    let lines = stdout_lines(&output);
    assert!(lines.contains(&"alias dk='docker'".to_string()));
    assert!(!lines.contains(&"alias d='docker'".to_string()));
    assert!(!lines.iter().any(|line| line.starts_with("alias drd")));
    assert_eq!(lines.len(), 7);
}

#[test]
fn test_generate_reads_yaml_tree() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tool.yaml");
    fs::write(
        &path,
        "name: tool\nsubcommands:\n  - name: status\n  - name: stash\n",
    )
    .unwrap();

    let output = generate(&path, &["--format", "table"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines[0].starts_with("ALIAS"));
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().any(|line| line.ends_with("tool status")));
}

#[test]
fn test_root_alias_collision_fails() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir);

    let output = generate(&tree, &["--preset", "default", "--root-alias", "dsta"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: root alias 'dsta'"), "stderr: {stderr}");
}

#[test]
fn test_tree_root_must_match_binary() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir);
    let tree = tree.to_str().unwrap();

    let output = create_aliases(&["generate", "kubectl", "--tree", tree]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not match"));
}

#[test]
fn test_missing_tree_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = generate(&dir.path().join("missing.json"), &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load tree"));
}

#[test]
fn test_config_prints_docker_preset() {
    let output = create_aliases(&["config", "docker"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("build: b"));
    assert!(stdout.contains("DOCKER_CLI_EXPERIMENTAL: enabled"));
}

#[test]
fn test_config_file_drives_generation() {
    let dir = TempDir::new().unwrap();
    let tree = write_tree(&dir);
    let config = dir.path().join("aliases.yml");

    let output = create_aliases(&["config", "default", "--output", config.to_str().unwrap()]);
    assert!(output.status.success());
    let mut yaml = fs::read_to_string(&config).unwrap();
    yaml = yaml.replace("predefined: {}", "predefined:\n  stop: x");
    fs::write(&config, yaml).unwrap();

    let output = generate(&tree, &["--config", config.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout_lines(&output).contains(&"alias dx='docker stop'".to_string()));
}

#[test]
fn test_unknown_preset_fails() {
    let output = create_aliases(&["config", "podman"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset 'podman'"));
}
