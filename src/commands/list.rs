use async_trait::async_trait;
use clap::Args;
use colored::*;
use miette::{IntoDiagnostic, Result, WrapErr};
use refresher_registry::{Config, Registry, RegistryConfigError};
use term_grid::{Cell, Direction, Filling, Grid, GridOptions};

use crate::commands::RefresherCommand;
use crate::Context;

const HEADERS: [&str; 6] = ["NAME", "TYPE", "URL", "REGION", "LAST LOGIN", "LAST LOGOUT"];

/// List configured registries.
#[derive(Debug, Args)]
#[clap(visible_aliases(["ls"]))]
pub struct ListCmd {
    /// Format output as JSON. Passwords are never included.
    #[arg(long)]
    json: bool,
}

#[async_trait]
impl RefresherCommand for ListCmd {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let config = match ctx.store.load() {
            Ok(config) => config,
            Err(RegistryConfigError::NotFound(path)) => {
                tracing::debug!("No registry document at {}", path.display());
                Config::default()
            }
            Err(err) => return Err(err.into()),
        };

        if self.json {
            let registries = config
                .sorted()
                .into_iter()
                .map(|registry| Registry {
                    password: String::new(),
                    ..registry.clone()
                })
                .collect::<Vec<_>>();
            println!(
                "{}",
                serde_json::to_string_pretty(&registries)
                    .into_diagnostic()
                    .wrap_err("list::json_serialize")?
            );
            return Ok(());
        }

        if config.registries.is_empty() {
            ctx.info("No registries configured. Add one with `auth-refresher add`.");
            return Ok(());
        }
        print!("{}", render(&config));
        Ok(())
    }
}

/// Lays the registries out as a table, highlighting the current one.
fn render(config: &Config) -> String {
    let mut grid = Grid::new(GridOptions {
        filling: Filling::Spaces(3),
        direction: Direction::LeftToRight,
    });
    for header in HEADERS {
        grid.add(cell(header, |s| s.bold()));
    }
    let current = config.current();
    for registry in config.sorted() {
        let highlight = current == Some(registry.name.as_str());
        let row = [
            registry.name.as_str(),
            registry.kind.as_str(),
            registry.url.as_str(),
            registry.region.as_str(),
            registry.last_login.as_deref().unwrap_or(""),
            registry.last_logout.as_deref().unwrap_or(""),
        ];
        for value in row {
            let value = if value.is_empty() { "-" } else { value };
            if highlight {
                grid.add(cell(value, |s| s.green().bold()));
            } else {
                grid.add(cell(value, |s| s.normal()));
            }
        }
    }
    grid.fit_into_columns(HEADERS.len()).to_string()
}

/// A grid cell whose width ignores the color escapes.
fn cell(value: &str, paint: impl Fn(&str) -> ColoredString) -> Cell {
    let mut cell = Cell::from(paint(value).to_string());
    cell.width = value.chars().count();
    cell
}
