use async_trait::async_trait;
use clap::Args;
use miette::Result;

use crate::commands::RefresherCommand;
use crate::Context;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const UNKNOWN: &str = "unknown";

/// Print version and build information.
#[derive(Debug, Args)]
pub struct VersionCmd {}

#[async_trait]
impl RefresherCommand for VersionCmd {
    async fn execute(self, _ctx: &Context) -> Result<()> {
        println!("{}", describe());
        Ok(())
    }
}

fn describe() -> String {
    format!(
        "auth-refresher {VERSION}\n  git commit: {}\n  built:      {}\n  platform:   {}/{}",
        option_env!("AUTH_REFRESHER_GIT_COMMIT").unwrap_or(UNKNOWN),
        option_env!("AUTH_REFRESHER_BUILD_DATE").unwrap_or(UNKNOWN),
        std::env::consts::OS,
        std::env::consts::ARCH,
    )
}
