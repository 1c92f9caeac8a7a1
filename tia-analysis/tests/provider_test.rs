//! Compilation provider tests: visibility, caching, cache clearing.

use std::path::Path;
use std::sync::Arc;

use tia_analysis::semantic::provider::{
    CompilationProvider, ScopedCompilation, WorkspaceCompilation,
};
use tia_analysis::solution::sln::parse_solution;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn sln_line(name: &str, rel_path: &str) -> String {
    format!(
        "Project(\"{{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}}\") = \"{name}\", \"{rel_path}\", \"{{11111111-2222-3333-4444-555555555555}}\"\nEndProject\n"
    )
}

/// Core and Tests projects; Tests references Core, not vice versa.
fn two_project_solution(dir: &Path) {
    write(
        dir,
        "Core/Core.csproj",
        "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <TargetFramework>net8.0</TargetFramework>\n  </PropertyGroup>\n</Project>\n",
    );
    write(
        dir,
        "Core/Engine.cs",
        "namespace Core { public class Engine { public void Start() {} } }",
    );
    write(
        dir,
        "Tests/Tests.csproj",
        "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <TargetFramework>net8.0</TargetFramework>\n  </PropertyGroup>\n  <ItemGroup>\n    <ProjectReference Include=\"..\\Core\\Core.csproj\" />\n  </ItemGroup>\n</Project>\n",
    );
    write(
        dir,
        "Tests/EngineTests.cs",
        "namespace Core.Tests { public class EngineTests { public void Helper() {} } }",
    );
    write(
        dir,
        "App.sln",
        &format!(
            "{}{}",
            sln_line("Core", "Core\\Core.csproj"),
            sln_line("Tests", "Tests\\Tests.csproj")
        ),
    );
}

#[test]
fn referencing_project_sees_referenced_declarations() {
    let dir = tempfile::TempDir::new().unwrap();
    two_project_solution(dir.path());
    let solution = parse_solution(&dir.path().join("App.sln")).unwrap();
    let workspace = WorkspaceCompilation::new(solution);

    let tests_file = dir.path().join("Tests/EngineTests.cs");
    let table = workspace.type_table(&tests_file).unwrap();
    assert!(
        table.resolve_type_name("Engine", "Core.Tests", &[]).is_some(),
        "the Tests table must include Core's declarations"
    );
}

#[test]
fn referenced_project_does_not_see_dependents() {
    let dir = tempfile::TempDir::new().unwrap();
    two_project_solution(dir.path());
    let solution = parse_solution(&dir.path().join("App.sln")).unwrap();
    let workspace = WorkspaceCompilation::new(solution);

    let core_file = dir.path().join("Core/Engine.cs");
    let table = workspace.type_table(&core_file).unwrap();
    assert!(
        table.resolve_type_name("EngineTests", "Core", &[]).is_none(),
        "Core's table must not include test project declarations"
    );
}

#[test]
fn semantic_models_are_cached_per_file() {
    let dir = tempfile::TempDir::new().unwrap();
    two_project_solution(dir.path());
    let solution = parse_solution(&dir.path().join("App.sln")).unwrap();
    let workspace = WorkspaceCompilation::new(solution);

    let file = dir.path().join("Core/Engine.cs");
    let first = workspace.get_semantic_model(&file).unwrap();
    let second = workspace.get_semantic_model(&file).unwrap();
    assert!(Arc::ptr_eq(&first, &second), "repeat lookups hit the cache");
}

#[test]
fn clearing_models_keeps_syntax_trees() {
    let dir = tempfile::TempDir::new().unwrap();
    two_project_solution(dir.path());
    let solution = parse_solution(&dir.path().join("App.sln")).unwrap();
    let workspace = WorkspaceCompilation::new(solution);

    let file = dir.path().join("Core/Engine.cs");
    let tree_before = workspace.get_syntax_tree(&file).unwrap();
    let model_before = workspace.get_semantic_model(&file).unwrap();

    workspace.clear_semantic_model_cache();

    let tree_after = workspace.get_syntax_tree(&file).unwrap();
    let model_after = workspace.get_semantic_model(&file).unwrap();

    assert!(
        Arc::ptr_eq(&tree_before, &tree_after),
        "trees survive a model cache clear"
    );
    assert!(
        !Arc::ptr_eq(&model_before, &model_after),
        "models are rebuilt after the clear"
    );
}

#[test]
fn scoped_provider_covers_exactly_its_files() {
    let dir = tempfile::TempDir::new().unwrap();
    two_project_solution(dir.path());

    let core_file = dir.path().join("Core/Engine.cs");
    let scoped = ScopedCompilation::new(vec![core_file.clone()]);

    assert_eq!(scoped.files(), vec![core_file.clone()]);
    let table = scoped.type_table(&core_file).unwrap();
    assert!(table.resolve_type_name("Engine", "Core", &[]).is_some());
    assert!(table.resolve_type_name("EngineTests", "Core", &[]).is_none());
}
