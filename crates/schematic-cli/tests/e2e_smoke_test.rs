use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use schematic_cli::{
    Args, Command, ConvertArgs, InspectArgs, Status, ValidateArgs, run_with,
};

const EXTENSIONS: &[&str] = &["bpmn", "xml", "sql", "json"];

/// Demo directory at the workspace root, relative to workspace not the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all diagram files from a directory
fn collect_diagram_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|s| s.to_str())
                        .is_some_and(|ext| EXTENSIONS.contains(&ext))
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(command: Command) -> Args {
    Args {
        command,
        config: None,
        log_level: "off".to_string(),
    }
}

fn convert_to(input: &Path, output: &Path) -> Args {
    args(Command::Convert(ConvertArgs {
        input: input.to_string_lossy().to_string(),
        output: Some(output.to_string_lossy().to_string()),
        from: None,
        to: None,
        dialect: None,
        from_dialect: None,
    }))
}

fn validate(input: &Path) -> Args {
    args(Command::Validate(ValidateArgs {
        input: input.to_string_lossy().to_string(),
        notation: None,
        format: None,
        json: false,
    }))
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_demos = collect_diagram_files(demos_path());

    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_path = temp_dir.path().join(format!(
            "{}.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        let mut out = Vec::new();
        let outcome = run_with(&convert_to(demo_path, &output_path), &mut out)
            .and_then(|_| run_with(&validate(&output_path), &mut out));
        match outcome {
            Ok(Status::Success) => {}
            Ok(Status::Invalid) => failed_demos.push((
                demo_path.clone(),
                String::from_utf8_lossy(&out).into_owned(),
            )),
            Err(err) => failed_demos.push((demo_path.clone(), err.to_string())),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} valid demos passed", valid_demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_diagram_files(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_path = temp_dir.path().join(format!(
            "error_{}.json",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        if run_with(&convert_to(demo_path, &output_path), &mut Vec::new()).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
        assert!(!output_path.exists(), "{} wrote output", demo_path.display());
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!("✅ All {} error demos failed as expected", error_demos.len());
}

#[test]
fn e2e_smoke_test_invalid_demos() {
    let invalid_demos = collect_diagram_files(demos_path().join("invalid"));

    assert!(
        !invalid_demos.is_empty(),
        "No invalid demos found in demos/invalid/"
    );

    for demo_path in &invalid_demos {
        let mut out = Vec::new();
        let status = run_with(&validate(demo_path), &mut out)
            .unwrap_or_else(|err| panic!("{} did not import: {err}", demo_path.display()));
        let report = String::from_utf8(out).unwrap();

        assert_eq!(status, Status::Invalid, "{}: {report}", demo_path.display());
        assert!(report.contains("error: "), "{report}");
    }
}

#[test]
fn e2e_convert_sql_between_dialects() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output_path = temp_dir.path().join("library.sql");

    let convert = args(Command::Convert(ConvertArgs {
        input: demos_path().join("library.sql").to_string_lossy().to_string(),
        output: Some(output_path.to_string_lossy().to_string()),
        from: None,
        to: None,
        dialect: Some(schematic::Dialect::Mysql),
        from_dialect: None,
    }));
    assert_eq!(run_with(&convert, &mut Vec::new()).unwrap(), Status::Success);

    let sql = fs::read_to_string(&output_path).unwrap();
    assert!(sql.contains("-- Diagram: Library"));
    assert_eq!(sql.matches("CREATE TABLE").count(), 4);
    assert!(sql.contains("FOREIGN KEY"));
}

#[test]
fn e2e_convert_to_stdout_requires_target_format() {
    let convert_to_stdout = |to| {
        args(Command::Convert(ConvertArgs {
            input: demos_path()
                .join("order_fulfillment.bpmn")
                .to_string_lossy()
                .to_string(),
            output: None,
            from: None,
            to,
            dialect: None,
            from_dialect: None,
        }))
    };

    let err = run_with(&convert_to_stdout(None), &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("--to"));

    let mut out = Vec::new();
    run_with(
        &convert_to_stdout(Some(schematic::Format::JsonPackage)),
        &mut out,
    )
    .unwrap();
    let json = String::from_utf8(out).unwrap();
    assert!(json.contains("\"schematic-package\""));
    assert!(json.contains("\"received\""));
}

#[test]
fn e2e_inspect_reports_counts() {
    let inspect = args(Command::Inspect(InspectArgs {
        input: demos_path()
            .join("order_data_flow.json")
            .to_string_lossy()
            .to_string(),
        format: None,
        json: true,
    }));

    let mut out = Vec::new();
    assert_eq!(run_with(&inspect, &mut out).unwrap(), Status::Success);

    let summary: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(summary["notation"], "data-flow");
    assert_eq!(summary["nodes"], 5);
    assert_eq!(summary["edges"], 5);
    assert_eq!(summary["nodeKinds"]["process"], 2);
    assert_eq!(summary["name"], "Order data flow");
}

#[test]
fn e2e_validate_json_report() {
    let mut validate_args = ValidateArgs {
        input: demos_path()
            .join("invalid")
            .join("external_exchange.json")
            .to_string_lossy()
            .to_string(),
        notation: None,
        format: None,
        json: true,
    };

    let mut out = Vec::new();
    let status = run_with(&args(Command::Validate(validate_args)), &mut out).unwrap();
    assert_eq!(status, Status::Invalid);

    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let issues = report["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["severity"], "error");
    assert_eq!(issues[0]["elementId"], "wire");
    assert_eq!(issues[0]["elementType"], "edge");
    assert_eq!(report["errors"], 1);
    assert_eq!(report["isValid"], false);

    validate_args = ValidateArgs {
        input: demos_path().join("library.sql").to_string_lossy().to_string(),
        notation: Some(schematic::Notation::DataFlow),
        format: None,
        json: true,
    };
    let mut out = Vec::new();
    let status = run_with(&args(Command::Validate(validate_args)), &mut out).unwrap();
    assert_eq!(status, Status::Success);
}
