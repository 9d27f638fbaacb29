//! End-to-end tests of the `conan-sbom` binary.
//!
//! Conan itself is never required: graphs come from fixture files, or on
//! unix from a stand-in `conan` script that replays fixtures.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

/// The binary, run from `dir` with no ambient Conan or log settings
fn conan_sbom(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_conan-sbom"));
    cmd.current_dir(dir)
        .env_remove("CONAN_SBOM_CONAN")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

// ============================================================================
// create-sbom from a graph file
// ============================================================================

mod graph_json {
    use super::*;

    #[test]
    fn test_sbom_to_stdout() {
        let dir = TempDir::new().unwrap();
        let output = conan_sbom(dir.path())
            .args(["create-sbom", "--no-resolve-remotes", "--graph-json"])
            .arg(fixture_path("graphs/simple_app.json"))
            .output()
            .unwrap();

        let bom = stdout_json(&output);
        assert_eq!(bom["bomFormat"], "CycloneDX");
        assert_eq!(bom["specVersion"], "1.4");
        assert_eq!(bom["metadata"]["component"]["name"], "imgtool");
        assert_eq!(bom["components"].as_array().unwrap().len(), 4);
        assert!(bom["serialNumber"]
            .as_str()
            .unwrap()
            .starts_with("urn:uuid:"));
        assert!(bom["metadata"]["timestamp"].is_string());
    }

    #[test]
    fn test_underscore_alias() {
        let dir = TempDir::new().unwrap();
        let output = conan_sbom(dir.path())
            .args(["-q", "create_sbom", "--no-resolve-remotes", "--graph-json"])
            .arg(fixture_path("graphs/cli_requires.json"))
            .output()
            .unwrap();

        let bom = stdout_json(&output);
        assert_eq!(bom["metadata"]["component"]["name"], "cli");
    }

    #[test]
    fn test_output_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("sbom.cdx.json");
        let output = conan_sbom(dir.path())
            .args(["create-sbom", "--no-resolve-remotes", "--graph-json"])
            .arg(fixture_path("graphs/simple_app.json"))
            .arg("-O")
            .arg(&out)
            .output()
            .unwrap();

        assert!(output.status.success());
        assert!(output.stdout.is_empty());
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.ends_with('\n'));
        let bom: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(bom["dependencies"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_compact_and_reproducible() {
        let dir = TempDir::new().unwrap();
        let run = || {
            conan_sbom(dir.path())
                .args([
                    "create-sbom",
                    "--no-resolve-remotes",
                    "--compact",
                    "--no-serial-number",
                    "--no-timestamp",
                    "--graph-json",
                ])
                .arg(fixture_path("graphs/simple_app.json"))
                .output()
                .unwrap()
        };

        let first = run();
        let second = run();
        let bom = stdout_json(&first);
        assert!(bom.get("serialNumber").is_none());
        assert!(bom["metadata"].get("timestamp").is_none());
        assert_eq!(first.stdout, second.stdout);
        // compact output is a single line
        assert_eq!(String::from_utf8_lossy(&first.stdout).trim().lines().count(), 1);
    }

    #[test]
    fn test_graph_from_stdin() {
        let dir = TempDir::new().unwrap();
        let graph = std::fs::File::open(fixture_path("graphs/duplicate_purl.json")).unwrap();
        let output = conan_sbom(dir.path())
            .args(["create-sbom", "--no-resolve-remotes", "--graph-json", "-"])
            .stdin(graph)
            .output()
            .unwrap();

        let bom = stdout_json(&output);
        assert_eq!(bom["components"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_failed_resolution_exits_with_error() {
        let dir = TempDir::new().unwrap();
        let output = conan_sbom(dir.path())
            .args(["create-sbom", "--no-resolve-remotes", "--graph-json"])
            .arg(fixture_path("graphs/failed_resolution.json"))
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("conflict"), "{stderr}");
    }
}

// ============================================================================
// Argument checks
// ============================================================================

mod arguments {
    use super::*;

    #[test]
    fn test_graph_json_excludes_requires() {
        let dir = TempDir::new().unwrap();
        let output = conan_sbom(dir.path())
            .args(["create-sbom", "--requires", "zlib/1.3", "--graph-json"])
            .arg(fixture_path("graphs/simple_app.json"))
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("--graph-json"));
    }

    #[test]
    fn test_nothing_to_resolve() {
        let dir = TempDir::new().unwrap();
        let output = conan_sbom(dir.path())
            .arg("create-sbom")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("--requires"));
    }

    #[test]
    fn test_path_and_requires_conflict() {
        let dir = TempDir::new().unwrap();
        let output = conan_sbom(dir.path())
            .args(["create-sbom", ".", "--requires", "zlib/1.3"])
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("incompatible"));
    }

    #[test]
    fn test_missing_conan_executable() {
        let dir = TempDir::new().unwrap();
        let output = conan_sbom(dir.path())
            .args([
                "create-sbom",
                "--requires",
                "zlib/1.3",
                "--conan",
                "/nonexistent/bin/conan",
            ])
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("/nonexistent/bin/conan"));
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let output = conan_sbom(dir.path())
            .args(["--config", "missing.yaml", "config", "show"])
            .output()
            .unwrap();

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("missing.yaml"));
    }

    #[test]
    fn test_malformed_explicit_config_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("broken.yaml");
        std::fs::write(&config, "output:\n  pretty: [unclosed\n").unwrap();

        let output = conan_sbom(dir.path())
            .arg("--config")
            .arg(&config)
            .args(["create-sbom", "--graph-json"])
            .arg(fixture_path("graphs/simple_app.json"))
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
        assert!(String::from_utf8_lossy(&output.stderr).contains("broken.yaml"));
    }
}

// ============================================================================
// Auxiliary commands
// ============================================================================

mod auxiliary {
    use super::*;

    #[test]
    fn test_config_schema() {
        let dir = TempDir::new().unwrap();
        let output = conan_sbom(dir.path()).arg("config-schema").output().unwrap();
        let schema = stdout_json(&output);
        assert!(schema["properties"]["conan"].is_object());
        assert!(schema["properties"]["output"].is_object());
    }

    #[test]
    fn test_config_init_then_show() {
        let dir = TempDir::new().unwrap();
        let init = conan_sbom(dir.path())
            .args(["config", "init"])
            .output()
            .unwrap();
        assert!(init.status.success());
        assert!(dir.path().join(".conan-sbom.yaml").exists());

        let again = conan_sbom(dir.path())
            .args(["config", "init"])
            .output()
            .unwrap();
        assert!(!again.status.success());

        let show = conan_sbom(dir.path())
            .args(["config", "show"])
            .output()
            .unwrap();
        assert!(show.status.success());
        assert!(String::from_utf8_lossy(&show.stdout).contains("executable"));
    }

    #[test]
    fn test_config_file_sets_output_style() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("conan-sbom.yaml");
        std::fs::write(
            &config,
            "conan:\n  resolve_remote_urls: false\noutput:\n  pretty: false\n  serial_number: false\n",
        )
        .unwrap();

        let output = conan_sbom(dir.path())
            .arg("--config")
            .arg(&config)
            .args(["create-sbom", "--graph-json"])
            .arg(fixture_path("graphs/simple_app.json"))
            .output()
            .unwrap();

        let bom = stdout_json(&output);
        assert!(bom.get("serialNumber").is_none());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim().lines().count(), 1);
    }

    #[test]
    fn test_completions() {
        let dir = TempDir::new().unwrap();
        let output = conan_sbom(dir.path())
            .args(["completions", "bash"])
            .output()
            .unwrap();
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("create-sbom"));
    }
}

// ============================================================================
// create-sbom through a stand-in Conan executable
// ============================================================================

#[cfg(unix)]
mod fake_conan {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// Write a `conan` script that logs its arguments and replays fixtures
    fn fake_conan(dir: &Path, graph: &str, graph_status: i32) -> (PathBuf, PathBuf) {
        let log = dir.join("conan-args.log");
        let script = dir.join("conan");
        let content = format!(
            "#!/bin/sh\n\
             echo \"$@\" >> '{log}'\n\
             case \"$1 $2\" in\n\
             \"graph info\") cat '{graph}'; exit {graph_status} ;;\n\
             \"remote list\") cat '{remotes}' ;;\n\
             *) echo \"unexpected command: $*\" >&2; exit 2 ;;\n\
             esac\n",
            log = log.display(),
            graph = fixture_path(graph).display(),
            remotes = fixture_path("remotes.json").display(),
        );
        std::fs::write(&script, content).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        (script, log)
    }

    #[test]
    fn test_graph_info_arguments_forwarded() {
        let dir = TempDir::new().unwrap();
        let (script, log) = fake_conan(dir.path(), "graphs/cli_requires.json", 0);

        let output = conan_sbom(dir.path())
            .args(["create-sbom", "--requires", "openssl/3.1.3@acme/stable"])
            .args(["--profile-host", "default", "-s", "build_type=Release"])
            .args(["-r", "artifactory", "--conan"])
            .arg(&script)
            .output()
            .unwrap();

        stdout_json(&output);
        let calls = std::fs::read_to_string(log).unwrap();
        let mut lines = calls.lines();
        assert_eq!(
            lines.next(),
            Some(
                "graph info --format=json --requires=openssl/3.1.3@acme/stable \
                 --profile:host=default --settings=build_type=Release --remote=artifactory"
            )
        );
        assert_eq!(lines.next(), Some("remote list --format=json"));
    }

    #[test]
    fn test_repository_url_from_remote_list() {
        let dir = TempDir::new().unwrap();
        let (script, _) = fake_conan(dir.path(), "graphs/cli_requires.json", 0);

        let output = conan_sbom(dir.path())
            .args(["create-sbom", "--requires", "openssl/3.1.3@acme/stable", "--conan"])
            .arg(&script)
            .output()
            .unwrap();

        let bom = stdout_json(&output);
        for component in bom["components"].as_array().unwrap() {
            let purl = component["purl"].as_str().unwrap();
            assert!(purl.contains("repository_url="), "{purl}");
        }
    }

    #[test]
    fn test_no_resolve_remotes_skips_remote_list() {
        let dir = TempDir::new().unwrap();
        let (script, log) = fake_conan(dir.path(), "graphs/simple_app.json", 0);

        let output = conan_sbom(dir.path())
            .args(["create-sbom", ".", "--no-resolve-remotes", "--conan"])
            .arg(&script)
            .output()
            .unwrap();

        let bom = stdout_json(&output);
        assert_eq!(bom["metadata"]["component"]["name"], "imgtool");
        let calls = std::fs::read_to_string(log).unwrap();
        assert_eq!(calls.lines().count(), 1);
        assert!(calls.starts_with("graph info . --format=json"));
    }

    #[test]
    fn test_conan_executable_from_env() {
        let dir = TempDir::new().unwrap();
        let (script, log) = fake_conan(dir.path(), "graphs/simple_app.json", 0);

        let output = conan_sbom(dir.path())
            .env("CONAN_SBOM_CONAN", &script)
            .args(["create-sbom", "--requires", "zlib/1.3", "--no-resolve-remotes"])
            .output()
            .unwrap();

        stdout_json(&output);
        assert!(log.exists());
    }

    #[test]
    fn test_failed_graph_info_reports_conflict() {
        let dir = TempDir::new().unwrap();
        let (script, _) = fake_conan(dir.path(), "graphs/failed_resolution.json", 1);

        let output = conan_sbom(dir.path())
            .args(["create-sbom", ".", "--conan"])
            .arg(&script)
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
        assert!(String::from_utf8_lossy(&output.stderr).contains("conflict"));
    }

    #[test]
    fn test_conan_flag_overrides_config_file_with_default_name() {
        let dir = TempDir::new().unwrap();
        let (_, log) = fake_conan(dir.path(), "graphs/simple_app.json", 0);
        let config = dir.path().join("conan-sbom.yaml");
        std::fs::write(&config, "conan:\n  executable: /nonexistent/bin/conan\n").unwrap();
        let path = format!(
            "{}:{}",
            dir.path().display(),
            std::env::var("PATH").unwrap_or_default()
        );

        let output = conan_sbom(dir.path())
            .env("PATH", path)
            .arg("--config")
            .arg(&config)
            .args(["create-sbom", ".", "--no-resolve-remotes", "--conan", "conan"])
            .output()
            .unwrap();

        stdout_json(&output);
        assert!(log.exists());
    }
}
