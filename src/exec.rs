//! Running a command under a profile.
//!
//! The profile's bindings are layered over the current environment and the
//! command replaces the envp process image, so exit status and signals
//! belong to the command itself.

use anyhow::{Context, Result, bail};
use std::os::unix::process::CommandExt;
use std::process::Command;

use crate::profile::Profile;

/// Build the command line with the profile's env applied. `PATH` lookup of
/// the program happens when it is executed.
pub fn build_command(profile: &Profile, argv: &[String]) -> Result<Command> {
    let Some((program, args)) = argv.split_first() else {
        bail!("No command given.\nHint: Put the command after '--', e.g. 'envp -- kubectl get pods'.");
    };

    let mut command = Command::new(program);
    command.args(args);
    command.envs(profile.env.iter().map(|b| (&b.name, &b.value)));
    Ok(command)
}

/// Replace the current process with `argv`. Only returns on failure.
pub fn exec_with_profile(profile: &Profile, argv: &[String]) -> Result<()> {
    let mut command = build_command(profile, argv)?;
    tracing::debug!(program = %argv[0], vars = profile.env.len(), "exec");

    let err = command.exec();
    Err(err).with_context(|| format!("Failed to execute '{}'", argv[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::EnvBindings;
    use std::ffi::OsStr;

    #[test]
    fn test_build_command_applies_env() {
        let profile = Profile::new(
            "proxy",
            EnvBindings::from_map([("HTTPS_PROXY", "http://proxy:3128"), ("NO_PROXY", "localhost")]),
        );
        let argv = vec!["kubectl".to_string(), "get".to_string(), "pods".to_string()];
        let command = build_command(&profile, &argv).unwrap();

        assert_eq!(command.get_program(), "kubectl");
        let args: Vec<&OsStr> = command.get_args().collect();
        assert_eq!(args, vec!["get", "pods"]);

        let envs: Vec<(&OsStr, Option<&OsStr>)> = command.get_envs().collect();
        assert_eq!(
            envs,
            vec![
                (OsStr::new("HTTPS_PROXY"), Some(OsStr::new("http://proxy:3128"))),
                (OsStr::new("NO_PROXY"), Some(OsStr::new("localhost"))),
            ]
        );
    }

    #[test]
    fn test_build_command_requires_program() {
        assert!(build_command(&Profile::default(), &[]).is_err());
    }

    #[test]
    fn test_exec_missing_binary_fails() {
        let argv = vec!["envp-test-binary-that-does-not-exist".to_string()];
        assert!(exec_with_profile(&Profile::default(), &argv).is_err());
    }
}
