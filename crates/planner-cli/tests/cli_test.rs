//! End-to-end tests for the `planner` binary.
//!
//! Each test runs the compiled binary against a data file and config
//! directory inside its own temp dir.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn planner(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_planner"))
        .args(args)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("HOME", home)
        .env_remove("PLANNER_DATA_FILE")
        .env_remove("RUST_LOG")
        .current_dir(home)
        .output()
        .expect("failed to run planner binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

/// Pull the id out of "Created event '<name>' with id <id> on ...".
fn created_id(output: &Output) -> String {
    let text = stdout(output);
    text.split(" with id ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or_else(|| panic!("unexpected create output: {text}"))
        .to_string()
}

#[test]
fn create_add_and_summarize() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("plans.json");
    let data = data.to_str().unwrap();

    let created = planner(
        tmp.path(),
        &[
            "event", "create", "--data-file", data, "--name", "Music Fest", "--date",
            "2025-06-15", "--venue", "Lviv", "--budget", "5000", "--currency", "eur",
        ],
    );
    assert!(created.status.success(), "{}", stderr(&created));
    assert!(stdout(&created).ends_with("on 2025-06-15 (EUR 5000.00).\n"));
    let id = created_id(&created);

    let added = planner(
        tmp.path(),
        &[
            "budget", "add", "--data-file", data, "--event-id", &id, "--category", "Stage",
            "--amount", "4200", "--status", "paid",
        ],
    );
    assert!(added.status.success(), "{}", stderr(&added));
    assert_eq!(
        stdout(&added),
        format!("Added 4200.00 Stage (Paid) to event {id}.\n")
    );

    let staffed = planner(
        tmp.path(),
        &[
            "staff", "add", "--data-file", data, "--event-id", &id, "--name", "Anna",
            "--rate", "50", "--hours", "24",
        ],
    );
    assert!(staffed.status.success(), "{}", stderr(&staffed));

    let summary = planner(tmp.path(), &["summary", "event", "--data-file", data, "--id", &id]);
    assert!(summary.status.success(), "{}", stderr(&summary));
    let text = stdout(&summary);
    assert!(text.contains("  Remaining: -400.00\n"), "{text}");
    assert!(text.contains("  Status: OVER BUDGET\n"), "{text}");

    let file = std::fs::read_to_string(data).unwrap();
    assert!(file.contains("\"budgetItems\""));
    assert!(file.contains("\"status\": \"Paid\""));
}

#[test]
fn list_on_fresh_data_file() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("plans.json");

    let output = planner(tmp.path(), &["event", "list", "--data-file", data.to_str().unwrap()]);

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "No events found. Use 'event create' to add one.\n"
    );
    assert!(!data.exists(), "reads must not create the data file");
}

#[test]
fn validation_error_exits_with_status_one() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("plans.json");

    let output = planner(
        tmp.path(),
        &[
            "event", "create", "--data-file", data.to_str().unwrap(), "--name", "Gala",
            "--date", "2025-03-01", "--budget=-5",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr(&output).contains("Error: validation failed: target budget must be positive"),
        "{}",
        stderr(&output)
    );
    assert!(stdout(&output).is_empty());
}

#[test]
fn unknown_event_for_budget_add_fails() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("plans.json");
    let missing = "00000000-0000-0000-0000-000000000404";

    let output = planner(
        tmp.path(),
        &[
            "budget", "add", "--data-file", data.to_str().unwrap(), "--event-id", missing,
            "--amount", "10",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(&format!("event {missing} was not found")));
}

#[test]
fn init_pins_the_data_file() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("pinned").join("plans.json");

    let init = planner(tmp.path(), &["init", "--data-file", data.to_str().unwrap()]);
    assert!(init.status.success(), "{}", stderr(&init));
    assert!(tmp.path().join("config/event-planner/config.toml").is_file());

    let again = planner(tmp.path(), &["init"]);
    assert_eq!(again.status.code(), Some(1));
    assert!(stderr(&again).contains("--force"));

    // No --data-file: the config file decides where events go.
    let created = planner(
        tmp.path(),
        &[
            "event", "create", "--name", "Gala", "--date", "2025-03-01", "--budget", "900",
        ],
    );
    assert!(created.status.success(), "{}", stderr(&created));
    assert!(data.is_file());
}

#[test]
fn default_data_file_is_relative_to_working_directory() {
    let tmp = TempDir::new().unwrap();

    let created = planner(
        tmp.path(),
        &[
            "event", "create", "--name", "Gala", "--date", "2025-03-01", "--budget", "900",
        ],
    );

    assert!(created.status.success(), "{}", stderr(&created));
    assert!(tmp.path().join("data/event-plans.json").is_file());
}
