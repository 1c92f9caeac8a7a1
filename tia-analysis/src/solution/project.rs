//! Project manifest parser.
//!
//! Reads `.csproj` XML with quick-xml. Unknown elements are ignored;
//! recognized ones: `TargetFramework`, `TargetFrameworks`,
//! `ProjectReference`, `PackageReference`, `Reference`, `Compile`,
//! `AssemblyName`, `IsTestProject`.

use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use tia_core::errors::SolutionError;
use tracing::debug;

use super::sln::normalize_separators;
use super::types::ProjectInfo;

/// Package references that mark a project as a test project.
const TEST_PACKAGES: &[&str] = &[
    "xunit",
    "xunit.v3",
    "nunit",
    "mstest",
    "mstest.testframework",
    "mstest.testadapter",
    "nunit3testadapter",
    "xunit.runner.visualstudio",
    "microsoft.net.test.sdk",
];

/// Name suffixes that mark a project file as a test project.
const TEST_NAME_SUFFIXES: &[&str] = &["Test", "Tests", "Spec", "Specs"];
const TEST_NAME_INFIXES: &[&str] = &[".Tests.", ".Test.", ".Specs.", ".Spec."];

/// Directories excluded from recursive source discovery.
const EXCLUDED_DIRS: &[&str] = &["bin", "obj", ".git", ".vs", ".svn", ".hg", "node_modules"];

#[derive(Debug, Default)]
struct RawProject {
    target_framework: Option<String>,
    target_frameworks: Option<String>,
    assembly_name: Option<String>,
    is_test_project: Option<bool>,
    project_references: Vec<String>,
    package_references: Vec<(String, String)>,
    compile_includes: Vec<String>,
}

/// Parse a project manifest.
///
/// Fails with `NotFound` when the file does not exist and `Manifest` when
/// the XML cannot be read at all; individually malformed elements are
/// skipped.
pub fn parse_project(path: &Path) -> Result<ProjectInfo, SolutionError> {
    if !path.exists() {
        return Err(SolutionError::NotFound {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| SolutionError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let raw = parse_project_xml(&content, path)?;
    let directory = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let target_frameworks = resolve_target_frameworks(&raw);
    let source_files = discover_source_files(&directory, &raw.compile_includes);
    let name = raw.assembly_name.clone().unwrap_or_else(|| file_stem(path));
    let is_test = is_test_project_raw(&raw, path);

    let project_references = raw
        .project_references
        .iter()
        .map(|r| directory.join(normalize_separators(r)))
        .collect();

    Ok(ProjectInfo {
        name,
        path: path.to_path_buf(),
        directory,
        target_frameworks,
        project_references,
        package_references: raw.package_references,
        source_files,
        is_test_project: is_test,
    })
}

/// Returns true when the project file denotes a test project, judged by
/// package references, the `IsTestProject` property, or naming convention.
pub fn is_test_project(path: &Path) -> bool {
    if let Ok(content) = std::fs::read_to_string(path) {
        if let Ok(raw) = parse_project_xml(&content, path) {
            return is_test_project_raw(&raw, path);
        }
    }
    name_looks_like_test_project(path)
}

fn is_test_project_raw(raw: &RawProject, path: &Path) -> bool {
    if raw.is_test_project == Some(true) {
        return true;
    }
    let has_test_package = raw.package_references.iter().any(|(name, _)| {
        let lower = name.to_lowercase();
        TEST_PACKAGES.iter().any(|p| lower == *p || lower.starts_with(&format!("{p}.")))
    });
    has_test_package || name_looks_like_test_project(path)
}

fn name_looks_like_test_project(path: &Path) -> bool {
    let stem = file_stem(path);
    if TEST_NAME_SUFFIXES.iter().any(|s| stem.ends_with(s)) {
        return true;
    }
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    TEST_NAME_INFIXES.iter().any(|i| file_name.contains(i))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// `TargetFramework` wins; else the semicolon-separated `TargetFrameworks`
/// list in declaration order.
fn resolve_target_frameworks(raw: &RawProject) -> Vec<String> {
    if let Some(ref tf) = raw.target_framework {
        return vec![tf.clone()];
    }
    if let Some(ref tfs) = raw.target_frameworks {
        return tfs
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }
    Vec::new()
}

/// Explicit `Compile Include` items win; otherwise recursively glob `*.cs`
/// under the project directory, excluding build output and VCS metadata.
fn discover_source_files(directory: &Path, compile_includes: &[String]) -> Vec<PathBuf> {
    if !compile_includes.is_empty() {
        return compile_includes
            .iter()
            .map(|inc| directory.join(normalize_separators(inc)))
            .collect();
    }

    let mut files: Vec<PathBuf> = Vec::new();
    let walker = ignore::WalkBuilder::new(directory)
        .standard_filters(false)
        .hidden(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !EXCLUDED_DIRS.iter().any(|d| name.eq_ignore_ascii_case(d))
        })
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("skipping unreadable dir entry: {e}");
                continue;
            }
        };
        if entry.file_type().is_some_and(|t| t.is_file()) {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("cs") {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    files
}

/// Pull-parse the project XML into a raw element bag.
fn parse_project_xml(content: &str, path: &Path) -> Result<RawProject, SolutionError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut raw = RawProject::default();
    let mut element_stack: Vec<String> = Vec::new();
    // PackageReference version may arrive as an attribute or a child element.
    let mut pending_package: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "ProjectReference" || name == "PackageReference"
                    || name == "Reference" || name == "Compile"
                {
                    handle_item_element(&mut raw, &name, e, &mut pending_package);
                }
                element_stack.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                handle_item_element(&mut raw, &name, e, &mut pending_package);
                if let Some(pkg) = pending_package.take() {
                    raw.package_references.push((pkg, String::new()));
                }
            }
            Ok(Event::Text(ref t)) => {
                let text = t.unescape().unwrap_or_default().to_string();
                match element_stack.last().map(String::as_str) {
                    Some("TargetFramework") => raw.target_framework = Some(text),
                    Some("TargetFrameworks") => raw.target_frameworks = Some(text),
                    Some("AssemblyName") => raw.assembly_name = Some(text),
                    Some("IsTestProject") => {
                        raw.is_test_project = Some(text.trim().eq_ignore_ascii_case("true"));
                    }
                    Some("Version") => {
                        if let Some(pkg) = pending_package.take() {
                            raw.package_references.push((pkg, text));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "PackageReference" {
                    if let Some(pkg) = pending_package.take() {
                        raw.package_references.push((pkg, String::new()));
                    }
                }
                element_stack.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(SolutionError::Manifest {
                    path: path.display().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(raw)
}

fn handle_item_element(
    raw: &mut RawProject,
    name: &str,
    e: &quick_xml::events::BytesStart<'_>,
    pending_package: &mut Option<String>,
) {
    let include = attribute_value(e, "Include");
    match name {
        "ProjectReference" => {
            if let Some(inc) = include {
                raw.project_references.push(inc);
            }
        }
        "PackageReference" => {
            if let Some(inc) = include {
                if let Some(version) = attribute_value(e, "Version") {
                    raw.package_references.push((inc, version));
                } else {
                    *pending_package = Some(inc);
                }
            }
        }
        "Compile" => {
            if let Some(inc) = include {
                raw.compile_includes.push(inc);
            }
        }
        // Assembly references carry no source information.
        "Reference" => {}
        _ => {}
    }
}

fn attribute_value(e: &quick_xml::events::BytesStart<'_>, name: &str) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.as_ref() == name.as_bytes() {
            Some(String::from_utf8_lossy(&a.value).to_string())
        } else {
            None
        }
    })
}
