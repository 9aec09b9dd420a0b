//! Recognition of the closed set of supported build URL forms (§4.2, §6).

use once_cell::sync::Lazy;
use regex::Regex;

static BUILDKITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://buildkite\.com/(?P<org>[^/]+)/(?P<pipeline>[^/]+)/builds/(?P<number>\d+)/?$")
        .unwrap()
});

static GITHUB_ACTIONS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://github\.com/(?P<owner>[^/]+)/(?P<repo>[^/]+)/actions/runs/(?P<run_id>\d+)/?$")
        .unwrap()
});

pub struct BuildkiteUrl {
    pub org: String,
    pub pipeline: String,
    pub number: u64,
}

pub fn parse_buildkite_url(url: &str) -> Option<BuildkiteUrl> {
    let caps = BUILDKITE_RE.captures(url)?;
    Some(BuildkiteUrl {
        org: caps["org"].to_string(),
        pipeline: caps["pipeline"].to_string(),
        number: caps["number"].parse().ok()?,
    })
}

pub struct GitHubActionsUrl {
    pub owner: String,
    pub repo: String,
    pub run_id: u64,
}

pub fn parse_github_actions_url(url: &str) -> Option<GitHubActionsUrl> {
    let caps = GITHUB_ACTIONS_RE.captures(url)?;
    Some(GitHubActionsUrl {
        owner: caps["owner"].to_string(),
        repo: caps["repo"].to_string(),
        run_id: caps["run_id"].parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_buildkite_build_url() {
        let parsed = parse_buildkite_url("https://buildkite.com/acme/pipeline/builds/42").unwrap();
        assert_eq!(parsed.org, "acme");
        assert_eq!(parsed.pipeline, "pipeline");
        assert_eq!(parsed.number, 42);
    }

    #[test]
    fn recognizes_github_actions_run_url() {
        let parsed =
            parse_github_actions_url("https://github.com/acme/repo/actions/runs/123456").unwrap();
        assert_eq!(parsed.owner, "acme");
        assert_eq!(parsed.repo, "repo");
        assert_eq!(parsed.run_id, 123456);
    }

    #[test]
    fn rejects_unrecognized_urls() {
        assert!(parse_buildkite_url("https://example.com/not-a-build").is_none());
        assert!(parse_github_actions_url("https://buildkite.com/acme/pipeline/builds/1").is_none());
    }
}
