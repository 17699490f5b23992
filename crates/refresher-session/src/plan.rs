//! The exact client invocations for each registry kind.

use crate::runner::CommandSpec;

/// Username ECR expects alongside a token from `get-login-password`.
pub const AWS_TOKEN_USERNAME: &str = "AWS";

/// Names (or paths) of the external clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub docker: String,
    pub aws: String,
    pub helm: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            docker: "docker".into(),
            aws: "aws".into(),
            helm: "helm".into(),
        }
    }
}

impl Tools {
    /// `aws ecr get-login-password --region <region>`
    pub fn token_fetch(&self, region: &str) -> CommandSpec {
        CommandSpec::new(&self.aws).args(["ecr", "get-login-password", "--region", region])
    }

    /// `docker login --username <username> --password-stdin <url>`, with the
    /// secret on stdin.
    pub fn docker_login(&self, username: &str, url: &str, secret: impl Into<Vec<u8>>) -> CommandSpec {
        CommandSpec::new(&self.docker)
            .args(["login", "--username", username, "--password-stdin", url])
            .stdin(secret)
    }

    /// `helm registry login <url> --username AWS --password-stdin`, with the
    /// token on stdin.
    pub fn helm_login(&self, url: &str, token: impl Into<Vec<u8>>) -> CommandSpec {
        CommandSpec::new(&self.helm)
            .args([
                "registry",
                "login",
                url,
                "--username",
                AWS_TOKEN_USERNAME,
                "--password-stdin",
            ])
            .stdin(token)
    }

    /// `docker logout <url>`
    pub fn docker_logout(&self, url: &str) -> CommandSpec {
        CommandSpec::new(&self.docker).args(["logout", url])
    }

    /// `helm registry logout <url>`
    pub fn helm_logout(&self, url: &str) -> CommandSpec {
        CommandSpec::new(&self.helm).args(["registry", "logout", url])
    }
}
