use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum RefresherError {
    /// No per-user configuration directory could be determined for this
    /// platform, so there is nowhere to keep the registry document.
    #[error("Could not determine a configuration directory for auth-refresher.")]
    #[diagnostic(
        code(auth_refresher::no_config_dir),
        help("Pass the registry document path explicitly with `--registries <path>`.")
    )]
    NoConfigDir,

    /// A registry was added without a name.
    #[error("Registry name cannot be empty.")]
    #[diagnostic(code(auth_refresher::add::empty_name))]
    EmptyName,

    /// A registry was added without a URL.
    #[error("Registry URL cannot be empty.")]
    #[diagnostic(code(auth_refresher::add::empty_url))]
    EmptyUrl,

    /// An aws or helm registry was added without the region its tokens are
    /// fetched from.
    #[error("A region is required for {0} registries.")]
    #[diagnostic(
        code(auth_refresher::add::missing_region),
        help("Use the region the registry lives in, for example `us-east-1`.")
    )]
    MissingRegion(String),
}
