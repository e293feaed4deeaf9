//! Config Runner CLI - batch execution of validation configs
//!
//! Runs one config file, a directory of config files, or the single file
//! of a directory selected by the indexed-job shard index.

use config_runner::prelude::*;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(2);
    }

    let code = match args[1].as_str() {
        "run" => run_command(&args[2..]),
        "resolve" => resolve_command(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage(&args[0]);
            0
        }
        "version" | "--version" | "-V" => {
            println!("{} {}", config_runner::NAME, config_runner::VERSION);
            0
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage(&args[0]);
            2
        }
    };

    process::exit(code);
}

fn print_usage(program: &str) {
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  run               Validate the resolved config file(s)");
    println!("  resolve           Print the config file(s) that would be validated");
    println!("  help              Show this help message");
    println!("  version           Show the version");
    println!();
    println!("Options:");
    println!("  -c, --config-file <path>     Run a single config file");
    println!("  -cdir, --config-dir <path>   Run every config file in a directory");
    println!("  -kc, --kube-completions      Pick one file per indexed job completion");
    println!("  --dry-run                    Print the built validations instead of running them");
    println!("  -ll, --log-level <level>     DEBUG, INFO, WARNING or ERROR (default: INFO)");
    println!("  -v, --verbose                Enable debug logging");
    println!("  --settings <path>            Runner settings file (TOML)");
    println!("  --report <path>              Write a JSON run summary (run only)");
}

/// Parsed command-line options.
struct CliOptions {
    request: ExecutionRequest,
    settings_path: Option<PathBuf>,
    report_path: Option<PathBuf>,
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut builder = ExecutionRequest::builder();
    let mut settings_path = None;
    let mut report_path = None;

    let mut i = 0;
    while i < args.len() {
        let value = args.get(i + 1).filter(|v| !v.starts_with('-'));
        match (args[i].as_str(), value) {
            ("-c" | "--config-file", Some(path)) => {
                builder = builder.config_file(path);
                i += 2;
            }
            ("-cdir" | "--config-dir", Some(path)) => {
                builder = builder.config_dir(path);
                i += 2;
            }
            ("-ll" | "--log-level", Some(level)) => {
                builder = builder.log_level(level.parse()?);
                i += 2;
            }
            ("--settings", Some(path)) => {
                settings_path = Some(PathBuf::from(path));
                i += 2;
            }
            ("--report", Some(path)) => {
                report_path = Some(PathBuf::from(path));
                i += 2;
            }
            ("-kc" | "--kube-completions", _) => {
                builder = builder.kube_completions(true);
                i += 1;
            }
            ("--dry-run", _) => {
                builder = builder.dry_run(true);
                i += 1;
            }
            ("-v" | "--verbose", _) => {
                builder = builder.verbose(true);
                i += 1;
            }
            (
                "-c" | "--config-file" | "-cdir" | "--config-dir" | "-ll" | "--log-level"
                | "--settings" | "--report",
                None,
            ) => {
                return Err(format!("Missing value for {}", args[i]));
            }
            (other, _) => return Err(format!("Unknown option: {}", other)),
        }
    }

    Ok(CliOptions {
        request: builder.build(),
        settings_path,
        report_path,
    })
}

fn init_logging(request: &ExecutionRequest) {
    env_logger::Builder::new()
        .filter_level(request.log_filter())
        .parse_default_env()
        .init();
}

fn build_runner(
    options: &CliOptions,
) -> Result<ConfigRunner<YamlConfigBuilder, DryRunEngine>, RunnerError> {
    let settings = RunnerSettings::load_or_default(options.settings_path.as_deref())?;
    let shard = ShardIndex::for_request(&options.request, &settings.shard_env_var)?;

    let runner = ConfigRunner::new(YamlConfigBuilder::new(), DryRunEngine::new())
        .with_settings(&settings)?
        .with_shard_index(shard);
    Ok(runner)
}

fn execute(options: &CliOptions) -> Result<RunSummary, RunnerError> {
    let mut runner = build_runner(options)?;
    let result = runner.run(&options.request);

    if let (Some(path), Some(summary)) = (&options.report_path, runner.last_summary()) {
        match write_report(path, summary) {
            Ok(()) => log::info!("Run summary written to {}", path.display()),
            Err(e) => log::error!("Failed to write run summary to {}: {}", path.display(), e),
        }
    }

    result
}

fn write_report(path: &Path, summary: &RunSummary) -> Result<(), RunnerError> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn run_command(args: &[String]) -> i32 {
    let options = match parse_options(args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            return 2;
        }
    };
    init_logging(&options.request);

    match execute(&options) {
        Ok(summary) => {
            log::info!(
                "All {} config file(s) validated successfully",
                summary.outcome.attempted()
            );
            0
        }
        Err(e) => {
            log::error!("{}", e);
            e.exit_code()
        }
    }
}

fn resolve_command(args: &[String]) -> i32 {
    let options = match parse_options(args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            return 2;
        }
    };
    init_logging(&options.request);

    let resolved = build_runner(&options).and_then(|runner| {
        let resolution = runner.resolve(&options.request)?;
        if resolution.mode == ExecutionMode::Unresolved {
            return Err(ResolutionError::NoTarget.into());
        }
        for warning in check(resolution.mode, &options.request) {
            log::warn!("{}", warning);
        }
        Ok(resolution)
    });

    match resolved {
        Ok(resolution) => {
            println!("Mode: {}", resolution.mode);
            for artifact in &resolution.artifacts {
                println!("  {}", artifact);
            }
            0
        }
        Err(e) => {
            log::error!("{}", e);
            e.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&args(&["-cdir", "configs", "-kc", "--dry-run"])).unwrap();
        assert_eq!(options.request.config_dir(), Some(Path::new("configs")));
        assert!(options.request.kube_completions());
        assert!(options.request.dry_run());
    }

    #[test]
    fn test_flag_is_not_taken_as_value() {
        let error = parse_options(&args(&["-c", "-kc"])).err().unwrap();
        assert_eq!(error, "Missing value for -c");

        let error = parse_options(&args(&["--report", "--dry-run"])).err().unwrap();
        assert_eq!(error, "Missing value for --report");
    }

    #[test]
    fn test_report_failure_keeps_validation_exit_code() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("0000.yaml"),
            "source: s\ntarget: t\nvalidations:\n  - type: Column\n",
        )
        .unwrap();
        let report = dir.path().join("missing").join("report.json");

        // Without --dry-run the bundled engine fails every artifact.
        let options = CliOptions {
            request: ExecutionRequest::builder().config_dir(dir.path()).build(),
            settings_path: None,
            report_path: Some(report.clone()),
        };

        let error = execute(&options).unwrap_err();
        assert!(matches!(error, RunnerError::Validation(_)));
        assert_eq!(error.exit_code(), 1);
        assert!(!report.exists());
    }
}
