//! The export request payload sent to the export service.
//!
//! The service accepts either an explicit list of files or the masks alone, in
//! which case it evaluates the globs itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::CoreError;
use super::selection::SelectionResult;

/// Identifies a repository and, optionally, the ref to export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            git_ref: None,
        }
    }

    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    /// Parses a pasted GitHub repository reference.
    ///
    /// Accepts `https://github.com/owner/repo`, `github.com/owner/repo.git`,
    /// `.../tree/<ref>` or `.../blob/<ref>` forms, and the short `owner/repo`.
    pub fn parse_github_url(input: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidRepoUrl(input.to_string());

        let mut rest = input.trim();
        rest = rest.split(['?', '#']).next().unwrap_or_default();
        for scheme in ["https://", "http://", "git@github.com:"] {
            if let Some(stripped) = rest.strip_prefix(scheme) {
                rest = stripped;
            }
        }
        rest = rest.strip_prefix("www.").unwrap_or(rest);
        rest = rest.strip_prefix("github.com/").unwrap_or(rest);

        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let (owner, repo) = match segments.as_slice() {
            [owner, repo, ..] => (*owner, repo.strip_suffix(".git").unwrap_or(*repo)),
            _ => return Err(invalid()),
        };
        if !is_valid_name(owner) || !is_valid_name(repo) {
            return Err(invalid());
        }

        let git_ref = match segments.get(2..) {
            Some([kind, reference @ ..]) if *kind == "tree" || *kind == "blob" => {
                if reference.is_empty() {
                    return Err(invalid());
                }
                Some(reference.join("/"))
            }
            Some([]) | None => None,
            Some(_) => return Err(invalid()),
        };

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            git_ref,
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)?;
        if let Some(git_ref) = &self.git_ref {
            write!(f, "@{git_ref}")?;
        }
        Ok(())
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Output format of the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Zip,
    #[default]
    Markdown,
    Txt,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Zip => "zip",
            ExportFormat::Markdown => "md",
            ExportFormat::Txt => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Zip => "zip",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Txt => "txt",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zip" => Ok(ExportFormat::Zip),
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "txt" | "text" => Ok(ExportFormat::Txt),
            _ => Err(CoreError::UnknownExportFormat(s.to_string())),
        }
    }
}

/// How the export service determines the files to include.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ExportSelection {
    /// The exact files resolved on the client.
    Explicit { files: Vec<String> },
    /// The service evaluates `includeGlobs`/`excludeGlobs` itself.
    Masks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub owner: String,
    pub repo: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    pub format: ExportFormat,
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    #[serde(flatten)]
    pub selection: ExportSelection,
    pub selected_size: u64,
    pub file_count: usize,
}

impl ExportRequest {
    /// A request carrying the resolved file list.
    pub fn explicit(
        repo: &RepoRef,
        format: ExportFormat,
        include_globs: &[String],
        exclude_globs: &[String],
        result: &SelectionResult,
    ) -> Self {
        Self::with_selection(
            repo,
            format,
            include_globs,
            exclude_globs,
            ExportSelection::Explicit {
                files: result.selected_files.clone(),
            },
            result,
        )
    }

    /// A request that relies on server-side mask evaluation. The totals from
    /// `result` are carried along for display.
    pub fn masks_only(
        repo: &RepoRef,
        format: ExportFormat,
        include_globs: &[String],
        exclude_globs: &[String],
        result: &SelectionResult,
    ) -> Self {
        Self::with_selection(
            repo,
            format,
            include_globs,
            exclude_globs,
            ExportSelection::Masks,
            result,
        )
    }

    fn with_selection(
        repo: &RepoRef,
        format: ExportFormat,
        include_globs: &[String],
        exclude_globs: &[String],
        selection: ExportSelection,
        result: &SelectionResult,
    ) -> Self {
        Self {
            owner: repo.owner.clone(),
            repo: repo.repo.clone(),
            git_ref: repo.git_ref.clone(),
            format,
            include_globs: clean_globs(include_globs),
            exclude_globs: clean_globs(exclude_globs),
            selection,
            selected_size: result.selected_size,
            file_count: result.selected_files.len(),
        }
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn clean_globs(globs: &[String]) -> Vec<String> {
    globs
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> SelectionResult {
        SelectionResult {
            selected_files: vec![
                "src/components/App.tsx".to_string(),
                "src/index.ts".to_string(),
            ],
            selected_size: 7400,
            total_files: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_github_url_variants() {
        let expected = RepoRef::new("octocat", "hello-world");
        for input in [
            "https://github.com/octocat/hello-world",
            "https://github.com/octocat/hello-world/",
            "http://www.github.com/octocat/hello-world.git",
            "github.com/octocat/hello-world?tab=readme#top",
            "git@github.com:octocat/hello-world.git",
            "  octocat/hello-world  ",
        ] {
            assert_eq!(RepoRef::parse_github_url(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_parse_github_url_with_ref() {
        let parsed =
            RepoRef::parse_github_url("https://github.com/octocat/hello-world/tree/feature/x")
                .unwrap();
        assert_eq!(parsed.git_ref.as_deref(), Some("feature/x"));
        assert_eq!(parsed.to_string(), "octocat/hello-world@feature/x");
    }

    #[test]
    fn test_parse_github_url_rejects_garbage() {
        for input in [
            "",
            "octocat",
            "https://github.com/octocat",
            "https://github.com/octo cat/repo",
            "https://github.com/octocat/hello-world/issues/1",
            "https://github.com/octocat/hello-world/tree",
            "../../etc",
        ] {
            let err = RepoRef::parse_github_url(input).unwrap_err();
            assert!(matches!(err, CoreError::InvalidRepoUrl(_)), "{input}");
        }
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("ZIP".parse::<ExportFormat>().unwrap(), ExportFormat::Zip);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(CoreError::UnknownExportFormat(_))
        ));
        assert_eq!(ExportFormat::Markdown.extension(), "md");
    }

    #[test]
    fn test_explicit_request_payload() {
        let repo = RepoRef::new("octocat", "hello-world").with_ref("main");
        let request = ExportRequest::explicit(
            &repo,
            ExportFormat::Markdown,
            &["**/*.ts".to_string(), "  ".to_string()],
            &[],
            &sample_result(),
        );
        let json = serde_json::to_string_pretty(&request).unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "owner": "octocat",
          "repo": "hello-world",
          "ref": "main",
          "format": "markdown",
          "includeGlobs": [
            "**/*.ts"
          ],
          "excludeGlobs": [],
          "mode": "explicit",
          "files": [
            "src/components/App.tsx",
            "src/index.ts"
          ],
          "selectedSize": 7400,
          "fileCount": 2
        }
        "#);
    }

    #[test]
    fn test_masks_only_request_round_trips() {
        let repo = RepoRef::new("octocat", "hello-world");
        let request = ExportRequest::masks_only(
            &repo,
            ExportFormat::Zip,
            &[],
            &["**/*.json".to_string()],
            &sample_result(),
        );
        let json = request.to_json().unwrap();
        assert!(json.contains(r#""mode":"masks""#));
        assert!(!json.contains(r#""ref""#));

        let back: ExportRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }
}
