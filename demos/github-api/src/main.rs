//! GitHub API demo
//!
//! Demonstrates a typed API wrapper built on weave's client and interceptors.

// Demo-specific lint allowances
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]
#![allow(dead_code)]

use weave::prelude::*;

// ============================================================================
// Data Types
// ============================================================================

/// A GitHub contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub contributions: u32,
}

/// A GitHub repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub stargazers_count: u32,
}

/// Request to create a GitHub issue.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIssue {
    pub title: String,
    pub body: Option<String>,
}

/// A GitHub issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u32,
    pub title: String,
    pub state: String,
}

// ============================================================================
// API wrapper
// ============================================================================

/// GitHub API client.
#[derive(Debug, Clone)]
pub struct GitHub {
    client: Client,
}

impl GitHub {
    /// Build a client for `base_url`, authenticated when a token is given.
    pub fn new(base_url: &str, token: Option<&str>) -> weave::Result<Self> {
        let builder = Client::builder()
            .base_url(base_url)
            .user_agent("weave-github-demo/0.1.0")
            .header("Accept", "application/vnd.github+json")
            .interceptor(DumpInterceptor::new());
        let builder = match token {
            Some(token) => builder.authorization_with_scheme(token, "Bearer"),
            None => builder,
        };
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// List contributors for a repository.
    pub async fn contributors(&self, owner: &str, repo: &str) -> weave::Result<Vec<Contributor>> {
        let contributors = self
            .client
            .get(&format!("repos/{owner}/{repo}/contributors"))
            .await?;
        Ok(contributors.unwrap_or_default())
    }

    /// Get repository information, decoding into a caller-owned value.
    pub async fn repo_into(&self, owner: &str, repo: &str, out: &mut Repository) -> weave::Result<()> {
        let request = self
            .client
            .build_request::<()>(Method::Get, &format!("repos/{owner}/{repo}"), None)?;
        self.client
            .execute(Context::background(), request, Destination::json(out))
            .await?;
        Ok(())
    }

    /// Create an issue.
    pub async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        issue: &CreateIssue,
    ) -> weave::Result<Option<Issue>> {
        self.client
            .post(&format!("repos/{owner}/{repo}/issues"), issue)
            .await
    }
}

// ============================================================================
// Main: Demonstrate usage
// ============================================================================

#[tokio::main]
async fn main() -> weave::Result<()> {
    let github = GitHub::new("https://api.github.com/", None)?;

    println!("GitHub API client created!");
    println!("{github:?}");

    println!("\n=== Example API calls (would require network access) ===");
    println!("github.contributors(\"rust-lang\", \"rust\").await?");
    println!("github.repo_into(\"rust-lang\", \"rust\", &mut repo).await?");

    Ok(())
}

// ============================================================================
// Tests using wiremock
// ============================================================================
