//! `auth-refresher` keeps a list of named container and chart registries and
//! logs in to or out of them with the right external client for each kind.

use std::path::PathBuf;

use async_trait::async_trait;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches as _, Parser, Subcommand};
use directories::ProjectDirs;
use miette::{IntoDiagnostic, Report, Result};
use refresher_config::{get_string, RefresherConfig, RefresherConfigLayer, RefresherConfigOptions};
use refresher_registry::ConfigStore;
use refresher_session::{SessionError, Tools};
use refresher_ui::{CancelSignal, UiError};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

use commands::{
    add::AddCmd, list::ListCmd, login::LoginCmd, logout::LogoutCmd, version::VersionCmd,
    RefresherCommand,
};
pub use context::Context;
pub use error::RefresherError;

mod commands;
mod context;
mod error;
mod output;

const REGISTRIES_FILE: &str = "config.yaml";
const OPTIONS_FILE: &str = "options.toml";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct AuthRefresher {
    /// Registry document to read and update.
    #[arg(global = true, long)]
    registries: Option<PathBuf>,

    /// File to read application options from.
    #[arg(global = true, long)]
    options: Option<PathBuf>,

    /// Log output level/directive. Supports plain loglevels (off, error,
    /// warn, info, debug, trace) as well as more advanced directives in the
    /// format `target[span{field=value}]=level`.
    #[arg(global = true, long, default_value = "warn")]
    loglevel: String,

    /// Disable all output
    #[arg(global = true, long, short)]
    quiet: bool,

    /// Container runtime client used for docker and aws logins.
    #[arg(global = true, long, default_value = "docker")]
    docker_bin: String,

    /// Cloud CLI used to fetch registry tokens.
    #[arg(global = true, long, default_value = "aws")]
    aws_bin: String,

    /// Chart registry client used for helm logins.
    #[arg(global = true, long, default_value = "helm")]
    helm_bin: String,

    #[command(subcommand)]
    subcommand: RefresherCmd,
}

impl AuthRefresher {
    fn setup_logging(&self) -> Result<()> {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(
                EnvFilter::builder()
                    .with_default_directive(if self.quiet {
                        LevelFilter::OFF.into()
                    } else {
                        self.loglevel.parse().into_diagnostic()?
                    })
                    .from_env_lossy(),
            )
            .init();
        Ok(())
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "auth-refresher")
    }

    fn registries_path(&self) -> Result<PathBuf> {
        self.registries
            .clone()
            .or_else(|| Self::project_dirs().map(|d| d.config_dir().join(REGISTRIES_FILE)))
            .ok_or_else(|| RefresherError::NoConfigDir.into())
    }

    fn context(&self) -> Result<Context> {
        let cancel = CancelSignal::new();
        let handler = cancel.clone();
        ctrlc::set_handler(move || handler.cancel()).into_diagnostic()?;
        Ok(Context::new(
            ConfigStore::new(self.registries_path()?),
            Tools {
                docker: self.docker_bin.clone(),
                aws: self.aws_bin.clone(),
                helm: self.helm_bin.clone(),
            },
            cancel,
            self.quiet,
        ))
    }

    pub async fn load() -> Result<()> {
        let start = std::time::Instant::now();
        let matches = AuthRefresher::command().get_matches();
        let mut refresher = AuthRefresher::from_arg_matches(&matches).into_diagnostic()?;
        let options = RefresherConfigOptions::new()
            .global_config_file(
                refresher.options.clone().or_else(|| {
                    Self::project_dirs().map(|d| d.config_dir().join(OPTIONS_FILE))
                }),
            )
            .load()?;
        refresher.layer_config(&matches, &options)?;
        refresher.setup_logging()?;
        let ctx = refresher.context()?;
        let quiet = refresher.quiet;
        match refresher.execute(&ctx).await {
            Err(err) if is_cancelled(&err) => {
                tracing::debug!("{err}");
                if !quiet {
                    output::warn("Operation cancelled by user");
                }
            }
            result => result?,
        }
        tracing::info!("Ran in {}s", start.elapsed().as_millis() as f32 / 1000.0);
        Ok(())
    }
}

/// Cancellation is reported quietly instead of as a failure.
fn is_cancelled(err: &Report) -> bool {
    err.downcast_ref::<SessionError>()
        .map(SessionError::is_cancelled)
        .or_else(|| err.downcast_ref::<UiError>().map(UiError::is_cancelled))
        .unwrap_or(false)
}

#[derive(Debug, Subcommand)]
pub enum RefresherCmd {
    /// Add a registry, or replace one with the same name.
    Add(AddCmd),

    /// List configured registries.
    List(ListCmd),

    /// Log in to a registry.
    Login(LoginCmd),

    /// Log out of a registry.
    Logout(LogoutCmd),

    /// Print version and build information.
    Version(VersionCmd),
}

#[async_trait]
impl RefresherCommand for AuthRefresher {
    async fn execute(self, ctx: &Context) -> Result<()> {
        tracing::info!("Running command: {:#?}", self.subcommand);
        match self.subcommand {
            RefresherCmd::Add(add) => add.execute(ctx).await,
            RefresherCmd::List(list) => list.execute(ctx).await,
            RefresherCmd::Login(login) => login.execute(ctx).await,
            RefresherCmd::Logout(logout) => logout.execute(ctx).await,
            RefresherCmd::Version(version) => version.execute(ctx).await,
        }
    }
}

impl RefresherConfigLayer for AuthRefresher {
    fn layer_config(&mut self, args: &ArgMatches, conf: &RefresherConfig) -> Result<()> {
        let from_config = |id: &str| -> Result<Option<String>> {
            if args.value_source(id) == Some(ValueSource::CommandLine) {
                Ok(None)
            } else {
                get_string(conf, id)
            }
        };
        if let Some(registries) = from_config("registries")? {
            self.registries = Some(PathBuf::from(registries));
        }
        if let Some(loglevel) = from_config("loglevel")? {
            self.loglevel = loglevel;
        }
        if let Some(docker_bin) = from_config("docker_bin")? {
            self.docker_bin = docker_bin;
        }
        if let Some(aws_bin) = from_config("aws_bin")? {
            self.aws_bin = aws_bin;
        }
        if let Some(helm_bin) = from_config("helm_bin")? {
            self.helm_bin = helm_bin;
        }
        Ok(())
    }
}
