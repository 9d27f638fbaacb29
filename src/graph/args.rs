//! Graph-selection arguments forwarded to `conan graph info`.
//!
//! These mirror Conan's "common graph args". They are checked with the same
//! rules Conan applies before any process is spawned, so argument mistakes
//! are reported without waiting on Conan.

use crate::error::{Result, SbomError};
use std::ffi::OsString;
use std::path::PathBuf;

/// What graph to compute and how to configure it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphArgs {
    /// Path to a folder containing a recipe, or to a recipe file
    pub path: Option<PathBuf>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub user: Option<String>,
    pub channel: Option<String>,
    /// Direct requirements, instead of a conanfile
    pub requires: Vec<String>,
    /// Direct tool requirements, instead of a conanfile
    pub tool_requires: Vec<String>,

    pub profile: Vec<String>,
    pub profile_host: Vec<String>,
    pub profile_build: Vec<String>,
    pub profile_all: Vec<String>,
    pub settings: Vec<String>,
    pub settings_host: Vec<String>,
    pub settings_build: Vec<String>,
    pub options: Vec<String>,
    pub options_host: Vec<String>,
    pub options_build: Vec<String>,
    pub conf: Vec<String>,
    pub conf_host: Vec<String>,
    pub conf_build: Vec<String>,

    pub lockfile: Option<PathBuf>,
    pub lockfile_partial: bool,
    pub lockfile_overrides: Option<String>,

    pub remotes: Vec<String>,
    pub no_remote: bool,
    pub update: bool,
}

impl GraphArgs {
    /// Check the combination rules Conan enforces for graph commands.
    pub fn validate(&self) -> Result<()> {
        if !self.requires.is_empty()
            && (self.name.is_some()
                || self.version.is_some()
                || self.user.is_some()
                || self.channel.is_some())
        {
            return Err(SbomError::config(
                "Can't use --name, --version, --user or --channel arguments with --requires",
            ));
        }

        if self.channel.is_some() && self.user.is_none() {
            return Err(SbomError::config("Can't specify --channel without --user"));
        }

        let has_requires = !self.requires.is_empty() || !self.tool_requires.is_empty();
        match (self.path.is_some(), has_requires) {
            (true, true) => Err(SbomError::config(
                "--requires and --tool-requires arguments are incompatible with [path] '.' argument",
            )),
            (false, false) => Err(SbomError::config(
                "Please specify a path to a conanfile or a '--requires=<ref>'",
            )),
            _ => {
                if self.no_remote && !self.remotes.is_empty() {
                    return Err(SbomError::config(
                        "--no-remote cannot be used together with --remote",
                    ));
                }
                Ok(())
            }
        }
    }

    /// True when no graph-selection flag was given at all.
    ///
    /// Used to reject mixing these flags with an existing graph file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Command line for `conan graph info`, without the executable.
    #[must_use]
    pub fn to_conan_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["graph".into(), "info".into()];
        if let Some(path) = &self.path {
            args.push(path.clone().into_os_string());
        }
        args.push("--format=json".into());

        push_opt(&mut args, "--name", self.name.as_deref());
        push_opt(&mut args, "--version", self.version.as_deref());
        push_opt(&mut args, "--user", self.user.as_deref());
        push_opt(&mut args, "--channel", self.channel.as_deref());
        push_all(&mut args, "--requires", &self.requires);
        push_all(&mut args, "--tool-requires", &self.tool_requires);

        push_all(&mut args, "--profile", &self.profile);
        push_all(&mut args, "--profile:host", &self.profile_host);
        push_all(&mut args, "--profile:build", &self.profile_build);
        push_all(&mut args, "--profile:all", &self.profile_all);
        push_all(&mut args, "--settings", &self.settings);
        push_all(&mut args, "--settings:host", &self.settings_host);
        push_all(&mut args, "--settings:build", &self.settings_build);
        push_all(&mut args, "--options", &self.options);
        push_all(&mut args, "--options:host", &self.options_host);
        push_all(&mut args, "--options:build", &self.options_build);
        push_all(&mut args, "--conf", &self.conf);
        push_all(&mut args, "--conf:host", &self.conf_host);
        push_all(&mut args, "--conf:build", &self.conf_build);

        if let Some(lockfile) = &self.lockfile {
            let mut arg = OsString::from("--lockfile=");
            arg.push(lockfile.as_os_str());
            args.push(arg);
        }
        if self.lockfile_partial {
            args.push("--lockfile-partial".into());
        }
        push_opt(
            &mut args,
            "--lockfile-overrides",
            self.lockfile_overrides.as_deref(),
        );

        push_all(&mut args, "--remote", &self.remotes);
        if self.no_remote {
            args.push("--no-remote".into());
        }
        if self.update {
            args.push("--update".into());
        }

        args
    }
}

fn push_opt(args: &mut Vec<OsString>, flag: &str, value: Option<&str>) {
    if let Some(value) = value {
        args.push(format!("{flag}={value}").into());
    }
}

fn push_all(args: &mut Vec<OsString>, flag: &str, values: &[String]) {
    for value in values {
        args.push(format!("{flag}={value}").into());
    }
}
