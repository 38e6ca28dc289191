use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use envp::{
    commands,
    config::Config,
    paths::Paths,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "envp")]
#[command(
    about = "ENVP - run commands with environment variables from named profiles",
    after_help = "Examples:\n  envp use org.nprod.argocd\n  envp -- kubectl get pods\n  envp lab.cluster1 -- kubectl get namespaces"
)]
#[command(version)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors: always, auto, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Profile to run with instead of the default
    profile: Option<String>,

    /// Command line to execute
    #[arg(last = true, value_name = "COMMAND")]
    exec: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all profiles
    List,

    /// Show the default profile
    Current,

    /// Show description and environment of a profile
    Show {
        /// Qualified profile name, e.g. org.nprod.argocd
        name: String,

        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a new profile
    Add {
        /// Qualified profile name; missing parents are created.
        /// The first segment may not be a subcommand name (list, use, ...)
        name: String,

        /// Description of the profile
        #[arg(short, long, default_value = "")]
        desc: String,

        /// Environment variable in NAME=VALUE form (repeatable)
        #[arg(short, long = "env", value_name = "NAME=VALUE", required = true)]
        env: Vec<String>,
    },

    /// Update a profile's description or environment variables
    Edit {
        /// Qualified profile name
        name: String,

        /// New description
        #[arg(short, long)]
        desc: Option<String>,

        /// Variable to add or replace, NAME=VALUE (repeatable)
        #[arg(short, long = "env", value_name = "NAME=VALUE")]
        env: Vec<String>,
    },

    /// Delete a profile and all profiles nested under it
    Delete {
        /// Qualified profile name
        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Set the default profile
    Use {
        /// Qualified profile name
        name: String,
    },

    /// Print shell completions
    Completions {
        shell: Shell,
    },

    /// Print the envp version
    Version,
}

fn main() {
    let cli = Cli::parse();
    let ui = Ui::new(cli.color, cli.no_color);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli, &ui) {
        ui.err(format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli, ui: &Ui) -> Result<()> {
    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "envp", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(Commands::Version) = cli.command {
        println!("envp {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let paths = Paths::new()?;
    let mut config = Config::read(&paths.config_file)?;

    match cli.command {
        None => commands::run(&config, cli.profile.as_deref(), &cli.exec),
        Some(Commands::List) => commands::list(&config, ui),
        Some(Commands::Current) => commands::current(&config, ui),
        Some(Commands::Show { name, json }) => commands::show(&config, &name, json, ui),
        Some(Commands::Add { name, desc, env }) => {
            commands::add(&paths, &mut config, &name, &desc, &env, ui)
        }
        Some(Commands::Edit { name, desc, env }) => {
            commands::edit(&paths, &mut config, &name, desc.as_deref(), &env, ui)
        }
        Some(Commands::Delete { name, force }) => {
            commands::delete(&paths, &mut config, &name, force, ui)
        }
        Some(Commands::Use { name }) => commands::use_profile(&paths, &mut config, &name, ui),
        Some(Commands::Completions { .. } | Commands::Version) => Ok(()),
    }
}
