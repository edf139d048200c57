//! Stagehand CLI entry point.

use stagehand_editor::EditorConfig;
use stagehand_harness::{HarnessConfig, Reporter, Scenario};
use stagehand_runtime::{Runner, init_tracing, scenarios};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    /// Level name followed by scenario-specific arguments.
    positional: Vec<String>,
    scenario: Option<String>,
    run_all: bool,
    list: bool,
    content_root: Option<PathBuf>,
    patient: bool,
    verbose: bool,
    show_help: bool,
    show_version: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-v" | "--verbose" => config.verbose = true,
            "-a" | "--all" => config.run_all = true,
            "-l" | "--list" => config.list = true,
            "--patient" => config.patient = true,
            "-s" | "--scenario" => {
                i += 1;
                if i >= args.len() {
                    return Err("--scenario requires a name".into());
                }
                config.scenario = Some(args[i].clone());
            }
            "--content-root" => {
                i += 1;
                if i >= args.len() {
                    return Err("--content-root requires a directory".into());
                }
                config.content_root = Some(PathBuf::from(&args[i]));
            }
            "--" => {
                config.positional.extend(args[i + 1..].iter().cloned());
                break;
            }
            arg if arg.starts_with('-') && config.positional.is_empty() => {
                return Err(format!("unknown option: {arg}").into());
            }
            arg => config.positional.push(arg.to_string()),
        }
        i += 1;
    }

    if config.run_all && config.scenario.is_some() {
        return Err("--all and --scenario cannot be combined".into());
    }
    Ok(config)
}

fn run(args: Vec<String>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    if config.show_version {
        println!("stagehand {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    if config.list {
        for scenario in scenarios::all() {
            println!("{:<28} {}", scenario.name(), scenario.summary());
        }
        return Ok(ExitCode::SUCCESS);
    }

    init_tracing(config.verbose);

    let selected: Vec<Box<dyn Scenario>> = if config.run_all {
        scenarios::all()
    } else {
        let name = config
            .scenario
            .clone()
            .unwrap_or_else(|| "create_entity_under_root".to_string());
        let scenario = scenarios::find(&name)
            .ok_or_else(|| format!("unknown scenario: {name} (see --list)"))?;
        vec![scenario]
    };

    let mut editor = EditorConfig::default();
    if let Some(root) = &config.content_root {
        editor = editor.with_content_root(root.clone());
    }
    let harness = if config.patient {
        HarnessConfig::patient()
    } else {
        HarnessConfig::default()
    };
    let runner = Runner::new(editor, harness);

    let mut failures = 0usize;
    for mut scenario in selected {
        let (outcome, _) =
            runner.run_with_args(scenario.as_mut(), &config.positional, Reporter::stdout())?;
        if !outcome.passed {
            failures += 1;
        }
    }

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_help() {
    println!(
        "\x1b[1mStagehand\x1b[0m - Scenario runner for the in-process editor

\x1b[1mUSAGE:\x1b[0m
    stagehand [OPTIONS] <LEVEL> [ARGS...]

\x1b[1mARGUMENTS:\x1b[0m
    <LEVEL>       Level the scenario runs in; opened, or created if missing
    [ARGS...]     Extra arguments passed through to the scenario

\x1b[1mOPTIONS:\x1b[0m
    -h, --help               Print help information
    -V, --version            Print version information
    -l, --list               List bundled scenarios and exit
    -s, --scenario NAME      Run one scenario (default: create_entity_under_root)
    -a, --all                Run every bundled scenario, each in a fresh editor
    --content-root DIR       Persist levels and prefab templates under DIR
    --patient                Use long timeouts for slow machines
    -v, --verbose            Log debug diagnostics to stderr

\x1b[1mOUTPUT:\x1b[0m
    Records go to stdout, one per line, ending in result=SUCCESS or
    result=FAILURE. Diagnostics go to stderr; STAGEHAND_LOG or RUST_LOG
    override the log filter.

\x1b[1mNOTES:\x1b[0m
    Prefab templates are never overwritten. Reusing a --content-root across
    runs makes prefab scenarios fail; point each run at a fresh directory.

\x1b[1mEXAMPLES:\x1b[0m
    stagehand Base                          Run the default scenario in Base
    stagehand --all Base                    Run every scenario
    stagehand -s save_and_reload Base       Run one scenario
    stagehand --list                        Show scenario names"
    );
}
