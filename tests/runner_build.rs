// tests/runner_build.rs

use std::collections::BTreeMap;
use std::error::Error;

use proptest::prelude::*;

use denon::config::{AllowFlags, AllowValue, ScriptOptions, ScriptStep};
use denon::errors::DenonError;
use denon::runner::{build_flags, Runner};
use denon_test_utils::builders::{ConfigBuilder, ScriptBuilder};
use denon_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn argv(runner: &Runner, name: &str) -> Result<Vec<Vec<String>>, DenonError> {
    Ok(runner
        .build(name)?
        .into_iter()
        .map(|c| c.argv)
        .collect())
}

fn strs(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn bare_file_runs_through_interpreter() -> TestResult {
    init_tracing();

    let cfg = ConfigBuilder::new().with_command("start", "app.ts").build();
    let runner = Runner::new(&cfg, vec!["start".into()]);

    assert_eq!(argv(&runner, "start")?, vec![strs(&["deno", "run", "app.ts"])]);
    Ok(())
}

#[test]
fn object_with_allow_all_injects_flag_before_file() -> TestResult {
    init_tracing();

    let cfg = ConfigBuilder::new()
        .with_object("start", ScriptBuilder::new("app.ts").allow_all().build())
        .build();
    let runner = Runner::new(&cfg, Vec::new());

    assert_eq!(
        argv(&runner, "start")?,
        vec![strs(&["deno", "run", "--allow-all", "app.ts"])]
    );
    Ok(())
}

#[test]
fn interpreter_action_gets_flags_after_the_action() -> TestResult {
    init_tracing();

    let cfg = ConfigBuilder::new()
        .with_global(ScriptOptions {
            allow: Some(AllowFlags::List(strs(&["read"]))),
            ..Default::default()
        })
        .with_command("serve", "deno   run  --allow-net server.ts")
        .build();
    let runner = Runner::new(&cfg, Vec::new());

    assert_eq!(
        argv(&runner, "serve")?,
        vec![strs(&["deno", "run", "--allow-read", "--allow-net", "server.ts"])]
    );
    Ok(())
}

#[test]
fn other_commands_are_left_untouched() -> TestResult {
    init_tracing();

    let cfg = ConfigBuilder::new()
        .with_global(ScriptOptions {
            unstable: Some(true),
            ..Default::default()
        })
        .with_command("hello", "  echo   hello  world ")
        .build();
    let runner = Runner::new(&cfg, Vec::new());

    assert_eq!(argv(&runner, "hello")?, vec![strs(&["echo", "hello", "world"])]);
    Ok(())
}

#[test]
fn and_chain_splits_into_sequential_commands() -> TestResult {
    init_tracing();

    let cfg = ConfigBuilder::new()
        .with_command("check", "deno fmt --check && deno lint && app.ts")
        .build();
    let runner = Runner::new(&cfg, Vec::new());

    assert_eq!(
        argv(&runner, "check")?,
        vec![
            strs(&["deno", "fmt", "--check"]),
            strs(&["deno", "lint"]),
            strs(&["deno", "run", "app.ts"]),
        ]
    );
    Ok(())
}

#[test]
fn sequence_concatenates_steps_with_their_own_options() -> TestResult {
    init_tracing();

    let cfg = ConfigBuilder::new()
        .with_sequence(
            "ci",
            vec![
                ScriptStep::Command("echo start".into()),
                ScriptStep::Object(ScriptBuilder::new("deno test").unstable(true).watch(false).build()),
            ],
        )
        .build();
    let runner = Runner::new(&cfg, Vec::new());
    let commands = runner.build("ci")?;

    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0].argv, strs(&["echo", "start"]));
    assert!(commands[0].options.watch_enabled());
    assert_eq!(commands[1].argv, strs(&["deno", "test", "--unstable"]));
    assert!(!commands[1].options.watch_enabled());
    Ok(())
}

#[test]
fn trailing_cli_args_go_to_the_last_command_only() -> TestResult {
    init_tracing();

    let cfg = ConfigBuilder::new()
        .with_command("start", "deno fmt && app.ts")
        .build();
    let runner = Runner::new(&cfg, strs(&["start", "--port", "8080"]));

    assert_eq!(
        argv(&runner, "start")?,
        vec![
            strs(&["deno", "fmt"]),
            strs(&["deno", "run", "app.ts", "--port", "8080"]),
        ]
    );
    Ok(())
}

#[test]
fn object_env_merges_over_global_env() -> TestResult {
    init_tracing();

    let mut env = BTreeMap::new();
    env.insert("A".to_string(), "global".to_string());
    env.insert("B".to_string(), "global".to_string());

    let cfg = ConfigBuilder::new()
        .with_global(ScriptOptions {
            env: Some(env),
            ..Default::default()
        })
        .with_object("start", ScriptBuilder::new("app.ts").env("B", "local").build())
        .build();
    let runner = Runner::new(&cfg, Vec::new());
    let commands = runner.build("start")?;

    let env = commands[0].options.env.clone().unwrap_or_default();
    assert_eq!(env.get("A").map(String::as_str), Some("global"));
    assert_eq!(env.get("B").map(String::as_str), Some("local"));
    Ok(())
}

#[test]
fn unknown_script_falls_back_to_cli_line() -> TestResult {
    init_tracing();

    let cfg = ConfigBuilder::new()
        .with_global(ScriptOptions {
            allow: Some(AllowFlags::All),
            ..Default::default()
        })
        .build();

    let runner = Runner::new(&cfg, strs(&["server.ts"]));
    assert_eq!(argv(&runner, "server.ts")?, vec![strs(&["deno", "run", "server.ts"])]);

    let runner = Runner::new(&cfg, strs(&["test", "--filter", "x"]));
    assert_eq!(
        argv(&runner, "test")?,
        vec![strs(&["deno", "test", "--filter", "x"])]
    );

    let runner = Runner::new(&cfg, strs(&["cargo", "run"]));
    assert_eq!(argv(&runner, "cargo")?, vec![strs(&["cargo", "run"])]);
    Ok(())
}

#[test]
fn unknown_script_without_args_is_a_configuration_error() {
    init_tracing();

    let cfg = ConfigBuilder::new().with_command("start", "app.ts").build();
    let runner = Runner::new(&cfg, Vec::new());

    assert!(matches!(runner.build("nope"), Err(DenonError::Configuration(_))));
}

#[test]
fn empty_scripts_are_configuration_errors() {
    init_tracing();

    let cfg = ConfigBuilder::new()
        .with_command("blank", "   ")
        .with_command("dangling", "deno lint && ")
        .with_sequence("empty", Vec::new())
        .build();
    let runner = Runner::new(&cfg, Vec::new());

    for name in ["blank", "dangling", "empty"] {
        assert!(
            matches!(runner.build(name), Err(DenonError::Configuration(_))),
            "script {name} should not compile"
        );
    }
}

#[test]
fn custom_interpreter_is_used_for_files_and_actions() -> TestResult {
    init_tracing();

    let cfg = ConfigBuilder::new()
        .with_interpreter("bun")
        .with_command("start", "app.js")
        .with_command("test", "bun test")
        .build();
    let runner = Runner::new(&cfg, Vec::new());

    assert_eq!(argv(&runner, "start")?, vec![strs(&["bun", "run", "app.js"])]);
    assert_eq!(argv(&runner, "test")?, vec![strs(&["bun", "test"])]);
    Ok(())
}

#[test]
fn flags_follow_a_fixed_order() {
    let mut allow = BTreeMap::new();
    allow.insert("write".to_string(), AllowValue::Bool(false));
    allow.insert("read".to_string(), AllowValue::Text("/tmp".into()));
    allow.insert("net".to_string(), AllowValue::Bool(true));
    allow.insert("env".to_string(), AllowValue::Int(1));

    let options = ScriptOptions {
        allow: Some(AllowFlags::Map(allow)),
        importmap: Some("import_map.json".into()),
        lock: Some("lock.json".into()),
        log: Some("debug".into()),
        tsconfig: Some("tsconfig.json".into()),
        cert: Some("ca.pem".into()),
        inspect: Some("127.0.0.1:9229".into()),
        inspect_brk: Some("127.0.0.1:9230".into()),
        no_check: Some(true),
        unstable: Some(true),
        watch: Some(false),
        ..Default::default()
    };

    assert_eq!(
        build_flags(&options),
        strs(&[
            "--allow-env=1",
            "--allow-net",
            "--allow-read=/tmp",
            "--importmap",
            "import_map.json",
            "--lock",
            "lock.json",
            "--log-level",
            "debug",
            "--config",
            "tsconfig.json",
            "--cert",
            "ca.pem",
            "--inspect=127.0.0.1:9229",
            "--inspect-brk=127.0.0.1:9230",
            "--no-check",
            "--unstable",
        ])
    );
}

#[test]
fn flags_are_empty_for_default_options() {
    assert!(build_flags(&ScriptOptions::default()).is_empty());
}

fn script_line() -> impl Strategy<Value = String> {
    let part = prop_oneof![
        Just("deno run".to_string()),
        Just("deno test".to_string()),
        Just("app.ts".to_string()),
        Just("echo hi".to_string()),
        "[a-z]{1,8}\\.(ts|js)",
        "[a-z]{1,6}( --[a-z]{1,6})?",
    ];
    proptest::collection::vec(part, 1..4).prop_map(|parts| parts.join(" && "))
}

proptest! {
    #[test]
    fn compiling_twice_yields_identical_argv(line in script_line(), unstable in any::<bool>()) {
        let cfg = ConfigBuilder::new()
            .with_global(ScriptOptions { unstable: Some(unstable), ..Default::default() })
            .with_command("s", &line)
            .build();
        let runner = Runner::new(&cfg, vec!["s".into(), "--x".into()]);

        let first = runner.build("s").map_err(|e| TestCaseError::fail(e.to_string()))?;
        let second = runner.build("s").map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(first, second);
    }

    #[test]
    fn and_chain_yields_one_command_per_part(line in script_line()) {
        let cfg = ConfigBuilder::new().with_command("s", &line).build();
        let runner = Runner::new(&cfg, Vec::new());

        let commands = runner.build("s").map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(commands.len(), line.split("&&").count());
        prop_assert!(commands.iter().all(|c| !c.argv.is_empty()));
    }
}
