use auth_refresher::AuthRefresher;
use miette::Result;

#[async_std::main]
async fn main() -> Result<()> {
    AuthRefresher::load().await
}
