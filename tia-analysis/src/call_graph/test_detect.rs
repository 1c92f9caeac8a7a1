//! Test-method detection from syntax and path patterns.
//!
//! No runtime reflection: a method is a test if its attributes, its file
//! location plus naming, or its name suffix say so.

use std::path::Path;

use crate::semantic::model::{MethodDecl, TypeDecl};

/// Attribute name suffixes that mark a test method, case-insensitive.
const TEST_ATTRIBUTE_SUFFIXES: &[&str] = &[
    "Test",
    "TestMethod",
    "Fact",
    "Theory",
    "TestCase",
    "DataTestMethod",
];

/// Name prefixes that mark a public method in a test path as a test.
const TEST_NAME_PREFIXES: &[&str] = &["Test", "Should", "When", "Given"];

/// Returns true when the method is recognized as a test.
pub fn is_test_method(file: &Path, type_decl: &TypeDecl, method: &MethodDecl) -> bool {
    if has_test_attribute(method) {
        return true;
    }

    if path_indicates_test(file)
        && method.modifiers.is_public
        && TEST_NAME_PREFIXES.iter().any(|p| method.name.starts_with(p))
    {
        return true;
    }

    name_has_test_suffix(&method.name) || name_has_test_suffix(type_simple_name(type_decl))
}

fn has_test_attribute(method: &MethodDecl) -> bool {
    method.attributes.iter().any(|attribute| {
        // `[Fact]` and `[FactAttribute]` are the same attribute.
        let name = attribute.strip_suffix("Attribute").unwrap_or(attribute);
        TEST_ATTRIBUTE_SUFFIXES
            .iter()
            .any(|suffix| ends_with_ignore_case(name, suffix))
    })
}

/// True when the file path marks a test project.
pub fn path_indicates_test(path: &Path) -> bool {
    let normalized = path.to_string_lossy().replace('\\', "/").to_lowercase();
    normalized.contains("/test")
        || normalized.contains(".test.")
        || normalized.contains(".tests.")
}

fn name_has_test_suffix(name: &str) -> bool {
    name.ends_with("Test") || name.ends_with("Tests")
}

fn type_simple_name(type_decl: &TypeDecl) -> &str {
    type_decl.name.rsplit('.').next().unwrap_or(&type_decl.name)
}

fn ends_with_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}
