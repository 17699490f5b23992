use async_trait::async_trait;
use miette::Result;

use crate::Context;

pub mod add;
pub mod list;
pub mod login;
pub mod logout;
pub mod version;

#[async_trait]
pub trait RefresherCommand {
    async fn execute(self, ctx: &Context) -> Result<()>;
}
