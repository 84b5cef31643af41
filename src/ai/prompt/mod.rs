//! Prompt Rendering
//!
//! Builds the rendered instructions for each analysis task and for README
//! synthesis. Every prompt embeds a capped, gitignore-aware summary of the
//! repository tree so the model sees real structure instead of guessing.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use ignore::WalkBuilder;

use crate::config::ReadmeConfig;
use crate::constants::prompt as limits;

// =============================================================================
// Repository Context
// =============================================================================

/// Build a capped file-tree summary grouped by directory.
///
/// Respects .gitignore and skips hidden files. Large repositories are
/// truncated per directory and overall so prompts stay bounded.
pub fn repo_tree_summary(root: &Path) -> String {
    let mut by_dir: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut total = 0usize;

    for entry in WalkBuilder::new(root).hidden(true).build().flatten() {
        if total >= limits::MAX_TREE_FILES {
            break;
        }
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let rel = match entry.path().strip_prefix(root) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let dir = rel
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());
        let name = rel
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        by_dir.entry(dir).or_default().push(name);
        total += 1;
    }

    let mut summary = String::new();
    for (dir, files) in &by_dir {
        let _ = writeln!(summary, "{}/ ({} files)", dir, files.len());
        for file in files.iter().take(limits::MAX_FILES_PER_DIR) {
            let _ = writeln!(summary, "  - {}", file);
        }
        if files.len() > limits::MAX_FILES_PER_DIR {
            let _ = writeln!(
                summary,
                "  ... and {} more",
                files.len() - limits::MAX_FILES_PER_DIR
            );
        }
    }

    summary
}

// =============================================================================
// Analysis Prompts
// =============================================================================

fn analysis_prompt(title: &str, objectives: &[&str], tree: &str) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "# Task: {}\n\nAnalyze the repository below and produce a markdown document.",
        title
    );
    let _ = writeln!(prompt, "\n## Objectives");
    for (i, objective) in objectives.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, objective);
    }
    let _ = writeln!(
        prompt,
        "\n## Repository tree\n```\n{}```\n\n## Output\n\
         Well-structured markdown with headings. Reference files by their \
         repository-relative path. State only what the tree and file names \
         support; mark inferences explicitly.",
        tree
    );
    prompt
}

pub fn code_structure(tree: &str) -> String {
    analysis_prompt(
        "Code structure analysis",
        &[
            "Identify the top-level modules and their responsibilities",
            "Describe layer boundaries and how modules depend on each other",
            "Point out entry points (binaries, services, handlers)",
            "Summarize naming and organization conventions",
        ],
        tree,
    )
}

pub fn dependencies(tree: &str) -> String {
    analysis_prompt(
        "Dependency analysis",
        &[
            "List external dependencies from the manifest files",
            "Group them by concern (HTTP, persistence, serialization, ...)",
            "Identify internal coupling hotspots between modules",
            "Flag unused-looking or duplicated dependencies",
        ],
        tree,
    )
}

pub fn data_flow(tree: &str) -> String {
    analysis_prompt(
        "Data flow analysis",
        &[
            "Trace how data enters, is transformed, and leaves the system",
            "Identify the principal data structures and where they are owned",
            "Describe persistence boundaries and caching layers",
        ],
        tree,
    )
}

pub fn request_flow(tree: &str) -> String {
    analysis_prompt(
        "Request flow analysis",
        &[
            "Trace the life of an inbound request from entry point to response",
            "Identify middleware, routing, and handler layers",
            "Describe error propagation along the request path",
        ],
        tree,
    )
}

pub fn api_surface(tree: &str) -> String {
    analysis_prompt(
        "API surface analysis",
        &[
            "Enumerate exposed endpoints or public interfaces",
            "Document request/response shapes where discoverable",
            "Note authentication and versioning conventions",
        ],
        tree,
    )
}

// =============================================================================
// README Synthesis Prompt
// =============================================================================

/// Render the README synthesis prompt.
///
/// `available_docs` lists the analysis artifacts already produced;
/// `existing_readme` is included as context when the config asks for it.
pub fn readme(
    tree: &str,
    available_docs: &[String],
    config: &ReadmeConfig,
    existing_readme: Option<&str>,
) -> String {
    let mut sections: Vec<&str> = Vec::new();
    if !config.exclude_project_overview {
        sections.push("Project overview: title, purpose, and key features");
    }
    if !config.exclude_table_of_contents {
        sections.push("Table of contents");
    }
    if !config.exclude_architecture {
        sections.push("High-level architecture and tech stack");
    }
    if !config.exclude_repository_structure {
        sections.push("Repository directory structure");
    }
    if !config.exclude_dependencies_and_integration {
        sections.push("Service dependencies and integrations");
    }
    if !config.exclude_api_documentation {
        sections.push("API documentation");
    }
    if !config.exclude_development_notes {
        sections.push("Development notes and conventions");
    }
    if !config.exclude_known_issues_and_limitations {
        sections.push("Known issues and limitations");
    }

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "# Task: README synthesis\n\nWrite a complete README.md for the repository below."
    );

    let _ = writeln!(prompt, "\n## Required sections");
    for (i, section) in sections.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, section);
    }

    if !available_docs.is_empty() {
        let _ = writeln!(
            prompt,
            "\n## Available analysis documents\n\
             Ground the README in these previously generated analyses:"
        );
        for doc in available_docs {
            let _ = writeln!(prompt, "- {}", doc);
        }
    }

    if let Some(existing) = existing_readme {
        let _ = writeln!(
            prompt,
            "\n## Existing README (preserve accurate content, fix the rest)\n\
             ```markdown\n{}\n```",
            existing
        );
    }

    let _ = writeln!(
        prompt,
        "\n## Repository tree\n```\n{}```\n\n## Output\n\
         The full README.md content as markdown. No preamble.",
        tree
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_tree_summary_groups_by_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(temp.path().join("Cargo.toml"), "[package]").unwrap();

        let summary = repo_tree_summary(temp.path());
        assert!(summary.contains("src/ (1 files)"));
        assert!(summary.contains("- main.rs"));
        assert!(summary.contains("- Cargo.toml"));
    }

    #[test]
    fn test_tree_summary_respects_gitignore() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".gitignore"), "ignored.log\n").unwrap();
        fs::write(temp.path().join("ignored.log"), "x").unwrap();
        fs::write(temp.path().join("kept.rs"), "x").unwrap();

        let summary = repo_tree_summary(temp.path());
        assert!(summary.contains("kept.rs"));
        assert!(!summary.contains("ignored.log"));
    }

    #[test]
    fn test_readme_prompt_honors_exclusions() {
        let config = ReadmeConfig {
            exclude_api_documentation: true,
            ..ReadmeConfig::default()
        };
        let prompt = readme("src/\n", &[], &config, None);
        assert!(prompt.contains("Project overview"));
        assert!(!prompt.contains("API documentation"));
    }

    #[test]
    fn test_readme_prompt_lists_available_docs() {
        let docs = vec![".ai/docs/structure_analysis.md".to_string()];
        let prompt = readme("src/\n", &docs, &ReadmeConfig::default(), None);
        assert!(prompt.contains(".ai/docs/structure_analysis.md"));
    }

    #[test]
    fn test_analysis_prompts_embed_tree() {
        for prompt in [
            code_structure("TREE"),
            dependencies("TREE"),
            data_flow("TREE"),
            request_flow("TREE"),
            api_surface("TREE"),
        ] {
            assert!(prompt.contains("TREE"));
            assert!(prompt.contains("## Objectives"));
        }
    }
}
