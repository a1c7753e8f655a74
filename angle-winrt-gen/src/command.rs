//! gyp command-line assembly.

use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::{GypConfig, TargetConfig};

/// A fully assembled gyp invocation for one target.
///
/// Arguments are kept as separate argv elements; nothing goes through a
/// shell, so the OS applies its own quoting when the process is spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GypCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl GypCommand {
    pub fn new(gyp: &GypConfig, target: &TargetConfig) -> Self {
        let mut args = Vec::new();

        args.push(OsString::from("--ignore-environment"));
        args.push(OsString::from("--depth=."));
        args.push(option("--include=", gyp.include_path()));
        args.push(option("--generator-output=", &target.output_dir));
        args.push(option("--format=", &gyp.format));

        push_pair(&mut args, "-G", "msvs_version", &target.msvs_version);

        push_pair(&mut args, "-D", "angle_use_commit_id", "1");
        push_pair(&mut args, "-D", "angle_build_winrt", "1");
        push_pair(
            &mut args,
            "-D",
            "angle_build_winrt_app_type_revision",
            &target.app_type_revision,
        );
        push_pair(
            &mut args,
            "-D",
            "angle_build_winrt_target_platform_ver",
            &target.target_platform_version,
        );
        push_pair(
            &mut args,
            "-D",
            "angle_build_winphone",
            if target.winphone { "1" } else { "0" },
        );
        push_pair(&mut args, "-D", "angle_enable_d3d9", "0");
        push_pair(&mut args, "-D", "angle_enable_gl", "0");
        push_pair(&mut args, "-D", "angle_standalone", "1");

        args.push(gyp.root_file_path().into_os_string());

        Self {
            program: gyp.tool_path(),
            args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Returns the value of every `<flag> name=value` pair for `flag`
    /// (`-D` or `-G`), in order.
    pub fn definitions(&self, flag: &str) -> Vec<(String, String)> {
        self.args
            .windows(2)
            .filter(|w| w[0] == flag)
            .filter_map(|w| {
                let def = w[1].to_string_lossy();
                def.split_once('=')
                    .map(|(k, v)| (k.to_string(), v.to_string()))
            })
            .collect()
    }

    /// Build a [`Command`] ready to spawn.  The child inherits stdio and the
    /// working directory.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for GypCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(self.program.as_os_str()))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn option(name: &str, value: impl AsRef<OsStr>) -> OsString {
    let mut arg = OsString::from(name);
    arg.push(value);
    arg
}

fn push_pair(args: &mut Vec<OsString>, flag: &str, name: &str, value: &str) {
    args.push(OsString::from(flag));
    args.push(OsString::from(format!("{name}={value}")));
}

/// Quote one argument for display using the host shell's conventions.
/// Arguments that need no quoting are returned unchanged.
fn quote(arg: &OsStr) -> Cow<'_, str> {
    let s = arg.to_string_lossy();
    let needs_quotes =
        s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'');
    if !needs_quotes {
        return s;
    }
    if cfg!(windows) {
        Cow::Owned(format!("\"{}\"", s.replace('"', "\\\"")))
    } else {
        Cow::Owned(format!("'{}'", s.replace('\'', "'\\''")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> GypConfig {
        GypConfig {
            angle_dir: Some(PathBuf::from("angle")),
            ..Default::default()
        }
    }

    #[test]
    fn phone_flag_is_numeric() {
        let phone = TargetConfig::new("out", true, "2013e", "8.1", "");
        let desktop = TargetConfig::new("out", false, "2013e", "8.1", "");

        let get = |t: &TargetConfig| {
            GypCommand::new(&layout(), t)
                .definitions("-D")
                .into_iter()
                .find(|(k, _)| k == "angle_build_winphone")
                .map(|(_, v)| v)
        };
        assert_eq!(get(&phone).as_deref(), Some("1"));
        assert_eq!(get(&desktop).as_deref(), Some("0"));
    }

    #[test]
    fn empty_platform_version_keeps_definition() {
        let cmd = GypCommand::new(&layout(), &TargetConfig::new("out", false, "2013e", "8.1", ""));
        assert!(
            cmd.args()
                .iter()
                .any(|a| a == "angle_build_winrt_target_platform_ver="),
            "args: {:?}",
            cmd.args()
        );
        assert!(
            cmd.to_string()
                .contains(" -D angle_build_winrt_target_platform_ver= ")
        );
    }

    #[test]
    fn msvs_version_goes_through_generator_flag() {
        let cmd = GypCommand::new(&layout(), &TargetConfig::new("out", false, "2015", "10.0", ""));
        assert_eq!(
            cmd.definitions("-G"),
            [("msvs_version".to_string(), "2015".to_string())]
        );
    }

    #[test]
    fn plain_arguments_are_not_quoted() {
        assert_eq!(quote(OsStr::new("--depth=.")), "--depth=.");
    }

    #[test]
    fn arguments_with_spaces_are_quoted() {
        let quoted = quote(OsStr::new("--generator-output=my dir"));
        if cfg!(windows) {
            assert_eq!(quoted, "\"--generator-output=my dir\"");
        } else {
            assert_eq!(quoted, "'--generator-output=my dir'");
        }
    }

    #[test]
    fn empty_argument_is_visible() {
        let quoted = quote(OsStr::new(""));
        assert!(quoted == "''" || quoted == "\"\"");
    }

    #[test]
    fn display_starts_with_program() {
        let cmd = GypCommand::new(&layout(), &TargetConfig::new("out", false, "2015", "10.0", ""));
        let program = cmd.program().display().to_string();
        assert!(cmd.to_string().starts_with(&format!("{program} --ignore-environment --depth=. ")));
    }
}
