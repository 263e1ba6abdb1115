//! CI-aware output helpers
//!
//! Collapsible log sections for GitLab CI runners. Outside CI the section
//! markers are omitted and only the header line is printed.

use colored::Colorize;

/// Whether the process is running inside a CI pipeline
pub fn running_in_ci() -> bool {
    std::env::var_os("GITLAB_CI").is_some() || std::env::var_os("CI").is_some()
}

/// A GitLab collapsible log section, closed on drop
pub struct GitlabSection {
    slug: String,
    active: bool,
}

impl GitlabSection {
    /// Open a section. `collapsed` pre-folds it in the job log.
    pub fn open(header: &str, collapsed: bool) -> Self {
        let slug = slugify(header);
        let active = running_in_ci();

        if active {
            let options = if collapsed { "[collapsed=true]" } else { "" };
            println!(
                "\x1b[0Ksection_start:{}:{}{}\r\x1b[0K{}",
                chrono::Utc::now().timestamp(),
                slug,
                options,
                header.bold()
            );
        } else {
            println!("{}", header.bold());
        }

        Self { slug, active }
    }
}

impl Drop for GitlabSection {
    fn drop(&mut self) {
        if self.active {
            println!(
                "\x1b[0Ksection_end:{}:{}\r\x1b[0K",
                chrono::Utc::now().timestamp(),
                self.slug
            );
        }
    }
}

/// Section names must be a single token; anything else becomes `_`.
fn slugify(header: &str) -> String {
    header
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
