//! High-level command orchestration for the CLI.
//!
//! Each function here corresponds to a subcommand in `main.rs`. Handlers get
//! the config loaded at startup, work on it in memory, and write it back only
//! once every step of the command has succeeded.

use anstyle::AnsiColor;
use anyhow::{Context, Result, anyhow, bail};

use crate::config::Config;
use crate::env::EnvBindings;
use crate::error::ProfileError;
use crate::exec::exec_with_profile;
use crate::paths::Paths;
use crate::profile::Profile;
use crate::ui::Ui;

/// Subcommand names. A profile whose first segment is one of these could not
/// be selected as `envp <profile> -- <command>`.
pub const RESERVED_NAMES: &[&str] = &[
    "list",
    "current",
    "show",
    "add",
    "edit",
    "delete",
    "use",
    "completions",
    "version",
    "help",
];

/// Attach a usage hint to core errors before they reach the user
fn with_hint(err: ProfileError) -> anyhow::Error {
    match err {
        ProfileError::NotFound(_) => {
            anyhow!("{err}.\nHint: Use 'envp list' to see available profiles.")
        }
        ProfileError::NoDefaultConfigured => anyhow!(
            "{err}.\nHint: Set one with 'envp use <name>' or pass a profile name before '--'."
        ),
        ProfileError::InvalidName(_) => anyhow!(
            "{err}.\nHint: Profile names are dot-separated segments, e.g. 'org.nprod.argocd'."
        ),
        other => other.into(),
    }
}

/// List all profiles
pub fn list(config: &Config, ui: &Ui) -> Result<()> {
    let names = config.profiles.names();

    if names.is_empty() {
        ui.warn("No profiles found.");
        ui.newline();
        ui.println("Create one with:");
        ui.println(format!(
            "  {} add <name> -d <description> -e NAME=VALUE",
            ui.bold("envp")
        ));
        return Ok(());
    }

    let mut table = ui.simple_table();
    table.set_header(vec![
        ui.header_cell(""),
        ui.header_cell("Profile"),
        ui.header_cell("Description"),
        ui.header_cell("Env"),
    ]);

    for name in &names {
        let profile = config.profiles.find(name).map_err(with_hint)?;
        let is_default = *name == config.default;
        let icon = if is_default { ui.icon_ok() } else { " " };
        let name_cell = if is_default {
            ui.colored_cell(name, AnsiColor::Green)
        } else {
            ui.cell(name)
        };

        table.add_row(vec![
            ui.cell(icon),
            name_cell,
            ui.cell(&profile.description),
            ui.cell(profile.env.len().to_string()),
        ]);
    }

    ui.section("Profiles");
    ui.println(table.to_string());
    Ok(())
}

/// Show the default profile
pub fn current(config: &Config, ui: &Ui) -> Result<()> {
    ui.section("Default Profile");
    ui.newline();

    let mut table = ui.simple_table();
    match config.default_profile() {
        Ok(profile) => {
            table.add_row(vec![ui.cell("Profile:"), ui.header_cell(&config.default)]);
            table.add_row(vec![ui.cell("Description:"), ui.cell(&profile.description)]);
            table.add_row(vec![ui.cell("Env:"), ui.cell(profile.env.to_string())]);
        }
        Err(ProfileError::NoDefaultConfigured) => {
            table.add_row(vec![ui.cell("Profile:"), ui.cell("(none)")]);
        }
        Err(e) => {
            table.add_row(vec![
                ui.cell("Profile:"),
                ui.colored_cell(format!("{} ({})", config.default, e), AnsiColor::Red),
            ]);
        }
    }

    ui.println(table.to_string());
    Ok(())
}

/// Show a single profile
pub fn show(config: &Config, name: &str, json: bool, ui: &Ui) -> Result<()> {
    let profile = config.profiles.find(name).map_err(with_hint)?;

    if json {
        let out = serde_json::to_string_pretty(profile).context("Failed to serialize profile")?;
        ui.println(out);
        return Ok(());
    }

    ui.section(format!("Profile: {}", name));
    ui.newline();

    let mut table = ui.simple_table();
    table.add_row(vec![ui.cell("Description:"), ui.cell(&profile.description)]);
    if name == config.default {
        table.add_row(vec![
            ui.cell("Default:"),
            ui.colored_cell("yes", AnsiColor::Green),
        ]);
    }
    if !profile.profiles.is_empty() {
        let children: Vec<&str> = profile.profiles.iter().map(|(k, _)| k.as_str()).collect();
        table.add_row(vec![ui.cell("Contains:"), ui.cell(children.join(", "))]);
    }
    ui.println(table.to_string());
    ui.newline();

    ui.section("Environment");
    ui.newline();
    if profile.env.is_empty() {
        ui.println(ui.dim("  (no variables)"));
    } else {
        ui.println(ui.env_table(&profile.env).to_string());
    }
    Ok(())
}

/// Add a new profile
pub fn add(
    paths: &Paths,
    config: &mut Config,
    name: &str,
    desc: &str,
    env: &[String],
    ui: &Ui,
) -> Result<()> {
    let first = name.split('.').next().unwrap_or_default();
    if RESERVED_NAMES.contains(&first) {
        bail!(
            "Profile name '{}' starts with the reserved word '{}'.\nHint: Choose a name that is not an envp subcommand.",
            name,
            first
        );
    }

    match config.profiles.find(name) {
        Ok(_) => bail!(
            "Profile '{}' already exists.\nHint: Use 'envp edit {}' to modify it.",
            name,
            name
        ),
        Err(ProfileError::NotFound(_)) => {}
        Err(e) => return Err(with_hint(e)),
    }

    let bindings = EnvBindings::parse(env).unwrap_or_default();
    if bindings.is_empty() {
        bail!("At least one valid environment variable is required.\nHint: Use -e NAME=VALUE.");
    }

    config
        .profiles
        .set(name, Profile::new(desc, bindings))
        .map_err(with_hint)?;
    config.write(&paths.config_file)?;

    ui.ok(format!("Added profile '{}'", name));
    Ok(())
}

/// Update description and/or env of an existing profile
pub fn edit(
    paths: &Paths,
    config: &mut Config,
    name: &str,
    desc: Option<&str>,
    env: &[String],
    ui: &Ui,
) -> Result<()> {
    if desc.is_none() && env.is_empty() {
        bail!("Nothing to change.\nHint: Pass -d <description> and/or -e NAME=VALUE.");
    }

    let profile = config.profiles.find_mut(name).map_err(with_hint)?;
    if let Some(desc) = desc.filter(|d| !d.is_empty()) {
        profile.description = desc.to_string();
    }
    profile.env = profile.env.merge(env);

    config.write(&paths.config_file)?;
    ui.ok(format!("Updated profile '{}'", name));
    Ok(())
}

/// Delete a profile and everything nested under it
pub fn delete(paths: &Paths, config: &mut Config, name: &str, force: bool, ui: &Ui) -> Result<()> {
    let profile = config.profiles.find(name).map_err(with_hint)?;

    if config.covers_default(name) {
        bail!(
            "Cannot delete '{}' because it contains the default profile '{}'.\nHint: Switch the default first with 'envp use <other-profile>'.",
            name,
            config.default
        );
    }

    if !force {
        let nested = profile.profiles.names().len();
        let help = if nested > 0 {
            format!("This also deletes {} nested profile(s)", nested)
        } else {
            "This permanently deletes the profile".to_string()
        };
        let confirm = inquire::Confirm::new(&format!(
            "Are you sure you want to delete profile '{}'?",
            name
        ))
        .with_default(false)
        .with_help_message(&help)
        .prompt()
        .context("Confirmation cancelled")?;

        if !confirm {
            ui.warn("Deletion cancelled.");
            return Ok(());
        }
    }

    config.profiles.delete(name).map_err(with_hint)?;
    config.write(&paths.config_file)?;

    ui.ok(format!("Deleted profile '{}'", name));
    Ok(())
}

/// Set the default profile
pub fn use_profile(paths: &Paths, config: &mut Config, name: &str, ui: &Ui) -> Result<()> {
    config.profiles.find(name).map_err(with_hint)?;

    config.default = name.to_string();
    config.write(&paths.config_file)?;

    ui.ok(format!("Default profile is set to '{}'", name));
    Ok(())
}

/// Execute `command` with the selected (or default) profile's env
pub fn run(config: &Config, profile: Option<&str>, command: &[String]) -> Result<()> {
    if command.is_empty() {
        bail!("Command should start after '--'.\nHint: envp [profile] -- <command> [args...]");
    }
    let selected = config.resolve(profile).map_err(with_hint)?;
    exec_with_profile(selected, command)
}
