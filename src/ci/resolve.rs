//! Include and extends resolution
//!
//! Flattens a pipeline entry point into a single top-level mapping: local
//! includes are inlined depth-first with the including file's own keys
//! winning, then `extends` chains are merged parent-first so child keys
//! override. Mirrors how GitLab assembles the effective configuration.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::ci::{CiError, RESERVED_KEYS};

/// Load `entry_point` below `root`, inline its transitive local includes
/// and apply `extends` inheritance.
pub fn resolve_config(root: &Path, entry_point: &Path) -> Result<serde_yaml::Mapping, CiError> {
    let mut merged = serde_yaml::Mapping::new();
    let mut seen = HashSet::new();
    merge_file(root, entry_point, &mut seen, &mut merged)?;
    resolve_extends(&merged)
}

/// Parse a YAML file into its top-level mapping. Empty documents count
/// as an empty mapping so a blank include does not abort the run.
pub fn load_mapping(path: &Path) -> Result<serde_yaml::Mapping, CiError> {
    let text = std::fs::read_to_string(path).map_err(|source| CiError::Read {
        file: path.to_path_buf(),
        source,
    })?;
    let value: serde_yaml::Value = serde_yaml::from_str(&text).map_err(|source| CiError::Parse {
        file: path.to_path_buf(),
        source,
    })?;
    match value {
        serde_yaml::Value::Mapping(mapping) => Ok(mapping),
        serde_yaml::Value::Null => Ok(serde_yaml::Mapping::new()),
        _ => Err(CiError::NotAMapping {
            file: path.to_path_buf(),
        }),
    }
}

fn merge_file(
    root: &Path,
    file: &Path,
    seen: &mut HashSet<PathBuf>,
    out: &mut serde_yaml::Mapping,
) -> Result<(), CiError> {
    // Re-including a file is a no-op, which also terminates include cycles.
    if !seen.insert(file.to_path_buf()) {
        return Ok(());
    }

    let mut mapping = load_mapping(&root.join(file))?;
    if let Some(include) = mapping.remove("include") {
        for target in include_targets(file, &include)? {
            merge_file(root, &target, seen, out)?;
        }
    }
    for (key, value) in mapping {
        out.insert(key, value);
    }
    Ok(())
}

/// Local include targets named by an `include:` value. Remote, template
/// and project includes cannot be resolved from the working tree.
fn include_targets(file: &Path, include: &serde_yaml::Value) -> Result<Vec<PathBuf>, CiError> {
    match include {
        serde_yaml::Value::String(path) => Ok(vec![local_target(path)]),
        serde_yaml::Value::Mapping(spec) => Ok(vec![local_from_spec(file, include, spec)?]),
        serde_yaml::Value::Sequence(entries) => {
            let mut targets = Vec::new();
            for entry in entries {
                match entry {
                    serde_yaml::Value::String(path) => targets.push(local_target(path)),
                    serde_yaml::Value::Mapping(spec) => {
                        targets.push(local_from_spec(file, entry, spec)?);
                    }
                    other => {
                        return Err(unsupported_include(file, other));
                    }
                }
            }
            Ok(targets)
        }
        other => Err(unsupported_include(file, other)),
    }
}

fn local_from_spec(
    file: &Path,
    entry: &serde_yaml::Value,
    spec: &serde_yaml::Mapping,
) -> Result<PathBuf, CiError> {
    match spec.get("local").and_then(serde_yaml::Value::as_str) {
        Some(local) => Ok(local_target(local)),
        None => Err(unsupported_include(file, entry)),
    }
}

fn unsupported_include(file: &Path, include: &serde_yaml::Value) -> CiError {
    let rendered = serde_yaml::to_string(include)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| "<opaque>".to_string());
    CiError::UnsupportedInclude {
        file: file.to_path_buf(),
        include: rendered,
    }
}

/// Local includes are repo-root relative, with or without a leading slash.
fn local_target(path: &str) -> PathBuf {
    PathBuf::from(path.trim_start_matches('/'))
}

/// Merge every job's `extends` parents into it, left to right, child last.
/// Nested mappings merge key-wise; sequences and scalars replace.
pub fn resolve_extends(config: &serde_yaml::Mapping) -> Result<serde_yaml::Mapping, CiError> {
    let mut memo: IndexMap<String, serde_yaml::Value> = IndexMap::new();
    let mut out = serde_yaml::Mapping::new();
    for (key, value) in config {
        let job_name = key.as_str().filter(|name| !RESERVED_KEYS.contains(name));
        match job_name {
            Some(name) if value.is_mapping() => {
                let mut stack = Vec::new();
                let resolved = resolve_job(name, config, &mut memo, &mut stack)?;
                out.insert(key.clone(), resolved);
            }
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(out)
}

fn resolve_job(
    name: &str,
    config: &serde_yaml::Mapping,
    memo: &mut IndexMap<String, serde_yaml::Value>,
    stack: &mut Vec<String>,
) -> Result<serde_yaml::Value, CiError> {
    if let Some(done) = memo.get(name) {
        return Ok(done.clone());
    }
    if stack.iter().any(|pending| pending == name) {
        return Err(CiError::ExtendsCycle {
            job: name.to_string(),
        });
    }

    let Some(serde_yaml::Value::Mapping(job)) = config.get(name) else {
        // A non-mapping parent has no keys to contribute.
        return Ok(config.get(name).cloned().unwrap_or(serde_yaml::Value::Null));
    };

    stack.push(name.to_string());
    let mut merged = serde_yaml::Mapping::new();
    for parent in extends_parents(name, job)? {
        if config.get(parent.as_str()).is_none() {
            return Err(CiError::UnknownExtends {
                job: name.to_string(),
                parent,
            });
        }
        let resolved_parent = resolve_job(&parent, config, memo, stack)?;
        if let serde_yaml::Value::Mapping(parent_map) = resolved_parent {
            deep_merge(&mut merged, &parent_map);
        }
    }

    let mut child = job.clone();
    child.remove("extends");
    deep_merge(&mut merged, &child);
    stack.pop();

    let resolved = serde_yaml::Value::Mapping(merged);
    memo.insert(name.to_string(), resolved.clone());
    Ok(resolved)
}

fn extends_parents(name: &str, job: &serde_yaml::Mapping) -> Result<Vec<String>, CiError> {
    let Some(extends) = job.get("extends") else {
        return Ok(Vec::new());
    };
    match extends {
        serde_yaml::Value::String(parent) => Ok(vec![parent.clone()]),
        serde_yaml::Value::Sequence(entries) => entries
            .iter()
            .map(|entry| {
                entry.as_str().map(str::to_string).ok_or_else(|| {
                    CiError::InvalidExtends {
                        job: name.to_string(),
                    }
                })
            })
            .collect(),
        _ => Err(CiError::InvalidExtends {
            job: name.to_string(),
        }),
    }
}

fn deep_merge(base: &mut serde_yaml::Mapping, overlay: &serde_yaml::Mapping) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(serde_yaml::Value::Mapping(existing)), serde_yaml::Value::Mapping(incoming)) => {
                deep_merge(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Map each job name to the file that defines it across `job_files`,
/// following local includes. A later file overrides the origin but the
/// name keeps its first-seen position, matching successive merges.
pub fn load_job_origins(
    root: &Path,
    job_files: &[PathBuf],
) -> Result<IndexMap<String, PathBuf>, CiError> {
    let mut origins = IndexMap::new();
    for file in job_files {
        let mut seen = HashSet::new();
        collect_origins(root, file, &mut seen, &mut origins)?;
    }
    Ok(origins)
}

fn collect_origins(
    root: &Path,
    file: &Path,
    seen: &mut HashSet<PathBuf>,
    origins: &mut IndexMap<String, PathBuf>,
) -> Result<(), CiError> {
    if !seen.insert(file.to_path_buf()) {
        return Ok(());
    }

    let mut mapping = load_mapping(&root.join(file))?;
    if let Some(include) = mapping.remove("include") {
        for target in include_targets(file, &include)? {
            collect_origins(root, &target, seen, origins)?;
        }
    }
    for (key, value) in &mapping {
        let Some(name) = key.as_str() else {
            continue;
        };
        if RESERVED_KEYS.contains(&name) || !value.is_mapping() {
            continue;
        }
        origins.insert(name.to_string(), file.to_path_buf());
    }
    Ok(())
}
