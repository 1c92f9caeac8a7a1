//! Semantic layer tests: model extraction and call-site resolution.

use std::path::Path;
use std::sync::Arc;

use tia_analysis::semantic::model::{build_model, CallSite, TypeKind};
use tia_analysis::semantic::resolver::{method_id, MethodScope, Resolver, TypeTable};
use tia_analysis::semantic::syntax::SyntaxTree;

fn model_of(source: &str) -> tia_analysis::semantic::SemanticModel {
    let tree = SyntaxTree::parse(Path::new("test.cs"), source.to_string()).unwrap();
    build_model(&tree)
}

#[test]
fn extracts_namespace_type_and_methods() {
    let model = model_of(
        r#"
namespace Foo.Bar
{
    public class Calculator
    {
        public int Add(int a, int b)
        {
            return a + b;
        }

        private void Reset() {}
    }
}
"#,
    );

    assert_eq!(model.types.len(), 1);
    let ty = &model.types[0];
    assert_eq!(ty.namespace, "Foo.Bar");
    assert_eq!(ty.name, "Calculator");
    assert_eq!(ty.kind, TypeKind::Class);
    assert_eq!(ty.methods.len(), 2);

    let add = &ty.methods[0];
    assert_eq!(add.name, "Add");
    assert_eq!(add.params.len(), 2);
    assert_eq!(add.params[0].type_name, "int");
    assert!(add.modifiers.is_public);
    assert_eq!(method_id(ty, add), "Foo.Bar.Calculator.Add(int,int)");
}

#[test]
fn extracts_attributes_and_modifiers() {
    let model = model_of(
        r#"
namespace N
{
    public class Fixture
    {
        [Fact]
        public void Works() {}

        [Theory]
        [InlineData(1)]
        public static void Cases(int x) {}
    }
}
"#,
    );

    let ty = &model.types[0];
    assert_eq!(ty.methods[0].attributes, vec!["Fact"]);
    assert!(ty.methods[1].attributes.contains(&"Theory".to_string()));
    assert!(ty.methods[1].modifiers.is_static);
}

#[test]
fn extracts_call_sites_in_source_order() {
    let model = model_of(
        r#"
namespace N
{
    public class Svc
    {
        public void Run()
        {
            Prepare();
            var helper = new Helper();
            helper.Work(1, 2);
        }

        private void Prepare() {}
    }

    public class Helper
    {
        public void Work(int a, int b) {}
    }
}
"#,
    );

    let run = &model.types[0].methods[0];
    let lines: Vec<u32> = run.calls.iter().map(|c| c.line()).collect();
    let mut sorted = lines.clone();
    sorted.sort_unstable();
    assert_eq!(lines, sorted, "call sites must be in source order");

    assert!(run.calls.iter().any(|c| matches!(
        c,
        CallSite::Invocation { name, receiver: None, .. } if name == "Prepare"
    )));
    assert!(run.calls.iter().any(|c| matches!(
        c,
        CallSite::ObjectCreation { type_name, .. } if type_name == "Helper"
    )));
    assert!(run.calls.iter().any(|c| matches!(
        c,
        CallSite::Invocation { name, receiver: Some(r), arg_count: 2, .. }
            if name == "Work" && r == "helper"
    )));
    assert!(run
        .locals
        .iter()
        .any(|(name, ty)| name == "helper" && ty == "Helper"));
}

#[test]
fn interfaces_and_bases_recorded() {
    let model = model_of(
        r#"
namespace N
{
    public interface IWorker
    {
        void Work();
    }

    public class Worker : IWorker
    {
        public void Work() {}
    }
}
"#,
    );

    assert_eq!(model.types.len(), 2);
    assert_eq!(model.types[0].kind, TypeKind::Interface);
    assert!(model.types[1].base_types.iter().any(|b| b == "IWorker"));
    // Interface members default to public.
    assert!(model.types[0].methods[0].modifiers.is_public);
}

#[test]
fn properties_become_accessors() {
    let model = model_of(
        r#"
namespace N
{
    public class Box
    {
        public int Size { get; set; }
        public int Doubled => Size * 2;
    }
}
"#,
    );

    let ty = &model.types[0];
    assert_eq!(ty.properties.len(), 2);
    assert!(ty.properties[0].has_getter);
    assert!(ty.properties[0].has_setter);
    assert!(ty.properties[1].has_getter);
    assert!(!ty.properties[1].has_setter);
}

#[test]
fn resolver_binds_unqualified_and_receiver_calls() {
    let model = Arc::new(model_of(
        r#"
namespace Foo.Bar
{
    public class Calculator
    {
        public int A(int x)
        {
            return B();
        }

        public int B()
        {
            return 42;
        }
    }
}
"#,
    ));
    let table = TypeTable::build(std::slice::from_ref(&model));
    let resolver = Resolver::new(&table);

    let ty = &model.types[0];
    let a = &ty.methods[0];
    let scope = MethodScope {
        model: &model,
        type_decl: ty,
        method: Some(a),
    };

    let resolved: Vec<String> = a
        .calls
        .iter()
        .filter_map(|site| resolver.resolve_site(site, &scope))
        .map(|t| t.method_id)
        .collect();

    assert!(resolved.contains(&"Foo.Bar.Calculator.B()".to_string()));
}

#[test]
fn resolver_picks_overload_by_arity() {
    let model = Arc::new(model_of(
        r#"
namespace N
{
    public class Svc
    {
        public void Go()
        {
            Work(1);
        }

        public void Work() {}
        public void Work(int a) {}
        public void Work(int a, int b) {}
    }
}
"#,
    ));
    let table = TypeTable::build(std::slice::from_ref(&model));
    let resolver = Resolver::new(&table);

    let ty = &model.types[0];
    let go = &ty.methods[0];
    let scope = MethodScope {
        model: &model,
        type_decl: ty,
        method: Some(go),
    };

    let resolved: Vec<String> = go
        .calls
        .iter()
        .filter_map(|site| resolver.resolve_site(site, &scope))
        .map(|t| t.method_id)
        .collect();
    assert_eq!(resolved, vec!["N.Svc.Work(int)".to_string()]);
}

#[test]
fn unresolved_external_call_is_none() {
    let model = Arc::new(model_of(
        r#"
namespace N
{
    public class Svc
    {
        public void Go()
        {
            Console.WriteLine("hi");
        }
    }
}
"#,
    ));
    let table = TypeTable::build(std::slice::from_ref(&model));
    let resolver = Resolver::new(&table);

    let ty = &model.types[0];
    let go = &ty.methods[0];
    let scope = MethodScope {
        model: &model,
        type_decl: ty,
        method: Some(go),
    };

    for site in &go.calls {
        if let CallSite::Invocation { name, .. } = site {
            if name == "WriteLine" {
                assert!(resolver.resolve_site(site, &scope).is_none());
            }
        }
    }
}
