//! Per-file semantic model: declarations and call sites.
//!
//! The model is a syntactic digest. It records what a file declares and
//! where each method body reaches out to other code; resolution against
//! the rest of the compilation happens later in the resolver.

use std::path::PathBuf;

use tree_sitter::Node;

use super::syntax::SyntaxTree;

/// Semantic model of one source file.
#[derive(Debug, Clone, Default)]
pub struct SemanticModel {
    pub file: PathBuf,
    pub usings: Vec<String>,
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
    Record,
    Delegate,
}

/// A type declaration. Nested types are flattened with dotted names
/// (`Outer.Inner`).
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: String,
    pub namespace: String,
    pub type_params: Vec<String>,
    /// Base types and implemented interfaces, as written.
    pub base_types: Vec<String>,
    pub is_static: bool,
    pub line: u32,
    pub methods: Vec<MethodDecl>,
    pub properties: Vec<PropertyDecl>,
    /// Field name to declared type, for receiver typing.
    pub fields: Vec<(String, String)>,
}

impl TypeDecl {
    /// `Namespace.Type`, or just `Type` in the global namespace.
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Modifiers {
    pub is_public: bool,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_abstract: bool,
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub name: String,
    pub type_name: String,
    pub has_default: bool,
    /// First parameter of an extension method.
    pub is_this: bool,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub type_params: Vec<String>,
    pub return_type: String,
    pub line: u32,
    /// Unqualified attribute names, as written.
    pub attributes: Vec<String>,
    pub modifiers: Modifiers,
    pub is_constructor: bool,
    /// Synthesized `op_*` name for user-defined operators.
    pub is_operator: bool,
    /// Local variable name to declared (or inferred) type.
    pub locals: Vec<(String, String)>,
    /// Call sites in source order.
    pub calls: Vec<CallSite>,
}

impl MethodDecl {
    pub fn is_extension(&self) -> bool {
        self.params.first().is_some_and(|p| p.is_this)
    }
}

#[derive(Debug, Clone)]
pub struct PropertyDecl {
    pub name: String,
    pub type_name: String,
    pub has_getter: bool,
    pub has_setter: bool,
    pub is_static: bool,
    pub line: u32,
    /// Call sites inside the accessor bodies, when present.
    pub getter_calls: Vec<CallSite>,
    pub setter_calls: Vec<CallSite>,
}

/// A syntactic call site awaiting resolution.
#[derive(Debug, Clone)]
pub enum CallSite {
    Invocation {
        /// Receiver expression text (`this`, a local, a dotted path), or
        /// `None` for unqualified calls.
        receiver: Option<String>,
        name: String,
        arg_count: usize,
        line: u32,
    },
    ObjectCreation {
        type_name: String,
        arg_count: usize,
        line: u32,
    },
    PropertyGet {
        receiver: Option<String>,
        name: String,
        line: u32,
    },
    PropertySet {
        receiver: Option<String>,
        name: String,
        line: u32,
    },
    Operator {
        /// Synthesized `op_*` method name.
        op_name: String,
        /// Left operand text when it is a plain identifier.
        operand_hint: Option<String>,
        line: u32,
    },
}

impl CallSite {
    pub fn line(&self) -> u32 {
        match self {
            CallSite::Invocation { line, .. }
            | CallSite::ObjectCreation { line, .. }
            | CallSite::PropertyGet { line, .. }
            | CallSite::PropertySet { line, .. }
            | CallSite::Operator { line, .. } => *line,
        }
    }
}

/// Build the semantic model for a parsed file.
pub fn build_model(tree: &SyntaxTree) -> SemanticModel {
    let mut model = SemanticModel {
        file: tree.file.clone(),
        usings: Vec::new(),
        types: Vec::new(),
    };
    collect_scope(tree.root(), "", None, &mut model, tree);
    model
}

/// Collect declarations from a namespace-level scope.
fn collect_scope(
    node: Node<'_>,
    namespace: &str,
    outer_type: Option<&str>,
    model: &mut SemanticModel,
    tree: &SyntaxTree,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "using_directive" => {
                if let Some(name) = last_named_child(child) {
                    model.usings.push(tree.text_of(name));
                }
            }
            "namespace_declaration" | "file_scoped_namespace_declaration" => {
                let name = child
                    .child_by_field_name("name")
                    .map(|n| tree.text_of(n))
                    .unwrap_or_default();
                let nested = join_namespace(namespace, &name);
                // Block-scoped namespaces hold members in a body node;
                // file-scoped ones hold them as direct children.
                let scope = child.child_by_field_name("body").unwrap_or(child);
                collect_scope(scope, &nested, None, model, tree);
            }
            "class_declaration" | "interface_declaration" | "struct_declaration"
            | "record_declaration" | "enum_declaration" | "delegate_declaration" => {
                collect_type(child, namespace, outer_type, model, tree);
            }
            _ => {}
        }
    }
}

fn collect_type(
    node: Node<'_>,
    namespace: &str,
    outer_type: Option<&str>,
    model: &mut SemanticModel,
    tree: &SyntaxTree,
) {
    let simple_name = node
        .child_by_field_name("name")
        .map(|n| tree.text_of(n))
        .unwrap_or_default();
    if simple_name.is_empty() {
        return;
    }
    let name = match outer_type {
        Some(outer) => format!("{outer}.{simple_name}"),
        None => simple_name.clone(),
    };

    let kind = match node.kind() {
        "interface_declaration" => TypeKind::Interface,
        "struct_declaration" => TypeKind::Struct,
        "enum_declaration" => TypeKind::Enum,
        "record_declaration" => TypeKind::Record,
        "delegate_declaration" => TypeKind::Delegate,
        _ => TypeKind::Class,
    };

    let mut decl = TypeDecl {
        kind,
        name: name.clone(),
        namespace: namespace.to_string(),
        type_params: type_parameter_names(node, tree),
        base_types: base_type_names(node, tree),
        is_static: has_modifier(node, tree, "static"),
        line: tree.line_of(node),
        methods: Vec::new(),
        properties: Vec::new(),
        fields: Vec::new(),
    };

    // A delegate type's only member is its synthesized Invoke, which is
    // what invoking a delegate-typed value calls.
    if kind == TypeKind::Delegate {
        decl.methods.push(MethodDecl {
            name: "Invoke".to_string(),
            params: parameter_decls(node, tree),
            type_params: Vec::new(),
            return_type: node
                .child_by_field_name("returns")
                .or_else(|| node.child_by_field_name("type"))
                .map(|n| tree.text_of(n))
                .unwrap_or_default(),
            line: tree.line_of(node),
            attributes: Vec::new(),
            modifiers: Modifiers {
                is_public: true,
                ..Default::default()
            },
            is_constructor: false,
            is_operator: false,
            locals: Vec::new(),
            calls: Vec::new(),
        });
    }

    if let Some(body) = node
        .child_by_field_name("body")
        .or_else(|| named_child_of_kind(node, "declaration_list"))
    {
        let mut cursor = body.walk();
        // Two passes would be needed if members could shadow nested types;
        // they cannot, so nested types recurse inline.
        let children: Vec<Node<'_>> = body.named_children(&mut cursor).collect();
        for member in children {
            match member.kind() {
                "method_declaration" => {
                    decl.methods.push(collect_method(member, tree, kind, None));
                }
                "constructor_declaration" => {
                    decl.methods
                        .push(collect_method(member, tree, kind, Some(&simple_name)));
                }
                "operator_declaration" => {
                    if let Some(m) = collect_operator(member, tree, kind) {
                        decl.methods.push(m);
                    }
                }
                "property_declaration" => {
                    if let Some(p) = collect_property(member, tree) {
                        decl.properties.push(p);
                    }
                }
                "field_declaration" => {
                    collect_fields(member, tree, &mut decl.fields);
                }
                "class_declaration" | "interface_declaration" | "struct_declaration"
                | "record_declaration" | "enum_declaration" => {
                    collect_type(member, namespace, Some(&name), model, tree);
                }
                _ => {}
            }
        }
    }

    model.types.push(decl);
}

fn collect_method(
    node: Node<'_>,
    tree: &SyntaxTree,
    containing_kind: TypeKind,
    ctor_type_name: Option<&str>,
) -> MethodDecl {
    let name = match ctor_type_name {
        Some(type_name) => type_name.to_string(),
        None => node
            .child_by_field_name("name")
            .map(|n| tree.text_of(n))
            .unwrap_or_default(),
    };

    let mut decl = MethodDecl {
        name,
        params: parameter_decls(node, tree),
        type_params: type_parameter_names(node, tree),
        return_type: node
            .child_by_field_name("returns")
            .or_else(|| node.child_by_field_name("type"))
            .map(|n| tree.text_of(n))
            .unwrap_or_default(),
        line: tree.line_of(node),
        attributes: attribute_names(node, tree),
        modifiers: modifiers_of(node, tree, containing_kind),
        is_constructor: ctor_type_name.is_some(),
        is_operator: false,
        locals: Vec::new(),
        calls: Vec::new(),
    };

    if let Some(body) = method_body(node) {
        walk_body(body, tree, &mut decl.locals, &mut decl.calls);
    }
    decl
}

fn collect_operator(
    node: Node<'_>,
    tree: &SyntaxTree,
    containing_kind: TypeKind,
) -> Option<MethodDecl> {
    let op_token = operator_token(node, tree)?;
    let name = operator_method_name(&op_token)?;

    let mut decl = MethodDecl {
        name: name.to_string(),
        params: parameter_decls(node, tree),
        type_params: Vec::new(),
        return_type: node
            .child_by_field_name("type")
            .map(|n| tree.text_of(n))
            .unwrap_or_default(),
        line: tree.line_of(node),
        attributes: attribute_names(node, tree),
        modifiers: modifiers_of(node, tree, containing_kind),
        is_constructor: false,
        is_operator: true,
        locals: Vec::new(),
        calls: Vec::new(),
    };

    if let Some(body) = method_body(node) {
        walk_body(body, tree, &mut decl.locals, &mut decl.calls);
    }
    Some(decl)
}

fn collect_property(node: Node<'_>, tree: &SyntaxTree) -> Option<PropertyDecl> {
    let name = node.child_by_field_name("name").map(|n| tree.text_of(n))?;
    let type_name = node
        .child_by_field_name("type")
        .map(|n| tree.text_of(n))
        .unwrap_or_default();

    let mut prop = PropertyDecl {
        name,
        type_name,
        has_getter: false,
        has_setter: false,
        is_static: has_modifier(node, tree, "static"),
        line: tree.line_of(node),
        getter_calls: Vec::new(),
        setter_calls: Vec::new(),
    };

    if let Some(accessors) = named_child_of_kind(node, "accessor_list") {
        let mut cursor = accessors.walk();
        for accessor in accessors.named_children(&mut cursor) {
            if accessor.kind() != "accessor_declaration" {
                continue;
            }
            let text = accessor
                .utf8_text(tree.source.as_bytes())
                .unwrap_or_default();
            let is_set = text.trim_start().starts_with("set")
                || text.trim_start().starts_with("init");
            if is_set {
                prop.has_setter = true;
            } else {
                prop.has_getter = true;
            }
            if let Some(body) = method_body(accessor) {
                let mut locals = Vec::new();
                let calls = if is_set {
                    &mut prop.setter_calls
                } else {
                    &mut prop.getter_calls
                };
                walk_body(body, tree, &mut locals, calls);
            }
        }
    } else if let Some(arrow) = named_child_of_kind(node, "arrow_expression_clause") {
        // Expression-bodied property: getter only.
        prop.has_getter = true;
        let mut locals = Vec::new();
        walk_body(arrow, tree, &mut locals, &mut prop.getter_calls);
    }

    Some(prop)
}

fn collect_fields(node: Node<'_>, tree: &SyntaxTree, fields: &mut Vec<(String, String)>) {
    let Some(var_decl) = named_child_of_kind(node, "variable_declaration") else {
        return;
    };
    let type_name = var_decl
        .child_by_field_name("type")
        .map(|n| tree.text_of(n))
        .unwrap_or_default();
    let mut cursor = var_decl.walk();
    for declarator in var_decl.named_children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        if let Some(name) = declarator
            .child_by_field_name("name")
            .or_else(|| named_child_of_kind(declarator, "identifier"))
        {
            fields.push((tree.text_of(name), type_name.clone()));
        }
    }
}

/// Walk a method/accessor body collecting locals and call sites.
fn walk_body(
    node: Node<'_>,
    tree: &SyntaxTree,
    locals: &mut Vec<(String, String)>,
    calls: &mut Vec<CallSite>,
) {
    match node.kind() {
        "local_declaration_statement" => {
            if let Some(var_decl) = named_child_of_kind(node, "variable_declaration") {
                handle_local_declaration(var_decl, tree, locals, calls);
                return;
            }
        }
        "invocation_expression" => {
            handle_invocation(node, tree, locals, calls);
            return;
        }
        "object_creation_expression" => {
            let type_name = node
                .child_by_field_name("type")
                .map(|n| simple_type_name(&tree.text_of(n)))
                .unwrap_or_default();
            let arg_count = argument_count(node);
            if !type_name.is_empty() {
                calls.push(CallSite::ObjectCreation {
                    type_name,
                    arg_count,
                    line: tree.line_of(node),
                });
            }
            walk_children_except(node, tree, locals, calls, &["type"]);
            return;
        }
        "assignment_expression" => {
            handle_assignment(node, tree, locals, calls);
            return;
        }
        "member_access_expression" => {
            calls.push(CallSite::PropertyGet {
                receiver: node
                    .child_by_field_name("expression")
                    .map(|n| tree.text_of(n)),
                name: node
                    .child_by_field_name("name")
                    .map(|n| simple_member_name(&tree.text_of(n)))
                    .unwrap_or_default(),
                line: tree.line_of(node),
            });
            if let Some(expr) = node.child_by_field_name("expression") {
                walk_body(expr, tree, locals, calls);
            }
            return;
        }
        "binary_expression" => {
            let op = node
                .child_by_field_name("operator")
                .and_then(|n| n.utf8_text(tree.source.as_bytes()).ok())
                .unwrap_or_default()
                .to_string();
            if let Some(op_name) = operator_method_name(&op) {
                let operand_hint = node
                    .child_by_field_name("left")
                    .filter(|n| n.kind() == "identifier")
                    .map(|n| tree.text_of(n));
                calls.push(CallSite::Operator {
                    op_name: op_name.to_string(),
                    operand_hint,
                    line: tree.line_of(node),
                });
            }
        }
        "prefix_unary_expression" | "postfix_unary_expression" => {
            let text = node
                .utf8_text(tree.source.as_bytes())
                .unwrap_or_default();
            if let Some(op) = unary_operator_of(text) {
                if let Some(op_name) = unary_operator_method_name(op) {
                    let operand = named_child_of_kind(node, "identifier").map(|n| tree.text_of(n));
                    calls.push(CallSite::Operator {
                        op_name: op_name.to_string(),
                        operand_hint: operand,
                        line: tree.line_of(node),
                    });
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_body(child, tree, locals, calls);
    }
}

fn handle_local_declaration(
    var_decl: Node<'_>,
    tree: &SyntaxTree,
    locals: &mut Vec<(String, String)>,
    calls: &mut Vec<CallSite>,
) {
    let declared_type = var_decl
        .child_by_field_name("type")
        .map(|n| tree.text_of(n))
        .unwrap_or_default();

    let mut cursor = var_decl.walk();
    for declarator in var_decl.named_children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let name = declarator
            .child_by_field_name("name")
            .or_else(|| named_child_of_kind(declarator, "identifier"))
            .map(|n| tree.text_of(n))
            .unwrap_or_default();

        // `var x = new Foo()` infers Foo; `Foo x = new(...)` keeps Foo.
        let mut local_type = declared_type.clone();
        if let Some(value) = initializer_value(declarator) {
            match value.kind() {
                "object_creation_expression" => {
                    let created = value
                        .child_by_field_name("type")
                        .map(|n| tree.text_of(n))
                        .unwrap_or_default();
                    if local_type == "var" {
                        local_type = created;
                    }
                }
                "implicit_object_creation_expression" => {
                    if local_type != "var" && !local_type.is_empty() {
                        calls.push(CallSite::ObjectCreation {
                            type_name: simple_type_name(&local_type),
                            arg_count: argument_count(value),
                            line: tree.line_of(value),
                        });
                    }
                }
                _ => {}
            }
            walk_body(value, tree, locals, calls);
        }

        if !name.is_empty() && !local_type.is_empty() && local_type != "var" {
            locals.push((name, local_type));
        }
    }
}

fn handle_invocation(
    node: Node<'_>,
    tree: &SyntaxTree,
    locals: &mut Vec<(String, String)>,
    calls: &mut Vec<CallSite>,
) {
    let arg_count = argument_count(node);
    let line = tree.line_of(node);

    if let Some(function) = node.child_by_field_name("function") {
        match function.kind() {
            "identifier" => {
                calls.push(CallSite::Invocation {
                    receiver: None,
                    name: tree.text_of(function),
                    arg_count,
                    line,
                });
            }
            "generic_name" => {
                calls.push(CallSite::Invocation {
                    receiver: None,
                    name: simple_member_name(&tree.text_of(function)),
                    arg_count,
                    line,
                });
            }
            "member_access_expression" => {
                let receiver = function
                    .child_by_field_name("expression")
                    .map(|n| tree.text_of(n));
                let name = function
                    .child_by_field_name("name")
                    .map(|n| simple_member_name(&tree.text_of(n)))
                    .unwrap_or_default();
                calls.push(CallSite::Invocation {
                    receiver,
                    name,
                    arg_count,
                    line,
                });
                // Nested calls inside the receiver still count; the member
                // name itself was consumed by this invocation.
                if let Some(expr) = function.child_by_field_name("expression") {
                    walk_body(expr, tree, locals, calls);
                }
            }
            _ => {
                walk_body(function, tree, locals, calls);
            }
        }
    }

    if let Some(arguments) = node.child_by_field_name("arguments") {
        walk_body(arguments, tree, locals, calls);
    }
}

fn handle_assignment(
    node: Node<'_>,
    tree: &SyntaxTree,
    locals: &mut Vec<(String, String)>,
    calls: &mut Vec<CallSite>,
) {
    if let Some(left) = node.child_by_field_name("left") {
        if left.kind() == "member_access_expression" {
            calls.push(CallSite::PropertySet {
                receiver: left
                    .child_by_field_name("expression")
                    .map(|n| tree.text_of(n)),
                name: left
                    .child_by_field_name("name")
                    .map(|n| simple_member_name(&tree.text_of(n)))
                    .unwrap_or_default(),
                line: tree.line_of(left),
            });
            if let Some(expr) = left.child_by_field_name("expression") {
                walk_body(expr, tree, locals, calls);
            }
        } else {
            walk_body(left, tree, locals, calls);
        }
    }
    if let Some(right) = node.child_by_field_name("right") {
        walk_body(right, tree, locals, calls);
    }
}

// ---- Small node helpers ----

fn join_namespace(outer: &str, inner: &str) -> String {
    if outer.is_empty() {
        inner.to_string()
    } else if inner.is_empty() {
        outer.to_string()
    } else {
        format!("{outer}.{inner}")
    }
}

/// Walk every named child except those occupying the listed fields.
fn walk_children_except(
    node: Node<'_>,
    tree: &SyntaxTree,
    locals: &mut Vec<(String, String)>,
    calls: &mut Vec<CallSite>,
    skip_fields: &[&str],
) {
    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return;
    }
    loop {
        let child = cursor.node();
        let skipped = cursor
            .field_name()
            .is_some_and(|f| skip_fields.contains(&f));
        if child.is_named() && !skipped {
            walk_body(child, tree, locals, calls);
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
}

fn last_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let count = node.named_child_count();
    if count == 0 {
        None
    } else {
        node.named_child(count - 1)
    }
}

fn named_child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

fn method_body(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("body")
        .or_else(|| named_child_of_kind(node, "block"))
        .or_else(|| named_child_of_kind(node, "arrow_expression_clause"))
}

fn initializer_value(declarator: Node<'_>) -> Option<Node<'_>> {
    if let Some(clause) = named_child_of_kind(declarator, "equals_value_clause") {
        return last_named_child(clause);
    }
    // Some grammar versions expose the initializer as a direct field, or
    // simply as the trailing named child after the declarator name.
    if let Some(value) = declarator.child_by_field_name("value") {
        return Some(value);
    }
    let count = declarator.named_child_count();
    if count >= 2 {
        declarator.named_child(count - 1)
    } else {
        None
    }
}

fn argument_count(node: Node<'_>) -> usize {
    node.child_by_field_name("arguments")
        .map(|args| args.named_child_count())
        .unwrap_or(0)
}

fn type_parameter_names(node: Node<'_>, tree: &SyntaxTree) -> Vec<String> {
    let Some(list) = node
        .child_by_field_name("type_parameters")
        .or_else(|| named_child_of_kind(node, "type_parameter_list"))
    else {
        return Vec::new();
    };
    let mut cursor = list.walk();
    let names = list
        .named_children(&mut cursor)
        .map(|p| tree.text_of(p))
        .filter(|s| !s.is_empty())
        .collect();
    names
}

fn base_type_names(node: Node<'_>, tree: &SyntaxTree) -> Vec<String> {
    let Some(bases) = named_child_of_kind(node, "base_list") else {
        return Vec::new();
    };
    let mut cursor = bases.walk();
    let names = bases
        .named_children(&mut cursor)
        .map(|b| tree.text_of(b))
        .filter(|s| !s.is_empty())
        .collect();
    names
}

fn has_modifier(node: Node<'_>, tree: &SyntaxTree, keyword: &str) -> bool {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "modifier"
            && child
                .utf8_text(tree.source.as_bytes())
                .is_ok_and(|t| t.trim() == keyword)
        {
            return true;
        }
    }
    false
}

fn modifiers_of(node: Node<'_>, tree: &SyntaxTree, containing_kind: TypeKind) -> Modifiers {
    let mut m = Modifiers::default();
    let mut saw_accessibility = false;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "modifier" {
            continue;
        }
        match child
            .utf8_text(tree.source.as_bytes())
            .unwrap_or_default()
            .trim()
        {
            "public" => {
                m.is_public = true;
                saw_accessibility = true;
            }
            "private" | "protected" | "internal" => saw_accessibility = true,
            "static" => m.is_static = true,
            "virtual" => m.is_virtual = true,
            "override" => m.is_override = true,
            "abstract" => m.is_abstract = true,
            _ => {}
        }
    }
    // Interface members are public by default.
    if !saw_accessibility && containing_kind == TypeKind::Interface {
        m.is_public = true;
    }
    m
}

fn attribute_names(node: Node<'_>, tree: &SyntaxTree) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "attribute_list" {
            continue;
        }
        let mut inner = child.walk();
        for attr in child.named_children(&mut inner) {
            if attr.kind() == "attribute" {
                if let Some(name) = attr.child_by_field_name("name") {
                    names.push(simple_member_name(&tree.text_of(name)));
                }
            }
        }
    }
    names
}

fn parameter_decls(node: Node<'_>, tree: &SyntaxTree) -> Vec<ParamDecl> {
    let Some(list) = node
        .child_by_field_name("parameters")
        .or_else(|| named_child_of_kind(node, "parameter_list"))
    else {
        return Vec::new();
    };

    let mut params = Vec::new();
    let mut cursor = list.walk();
    for param in list.named_children(&mut cursor) {
        if param.kind() != "parameter" {
            continue;
        }
        let type_name = param
            .child_by_field_name("type")
            .map(|n| tree.text_of(n))
            .unwrap_or_default();
        let name = param
            .child_by_field_name("name")
            .map(|n| tree.text_of(n))
            .unwrap_or_default();
        let has_default = named_child_of_kind(param, "equals_value_clause").is_some();
        let is_this = param
            .utf8_text(tree.source.as_bytes())
            .is_ok_and(|t| t.trim_start().starts_with("this "));
        params.push(ParamDecl {
            name,
            type_name,
            has_default,
            is_this,
        });
    }
    params
}

fn operator_token(node: Node<'_>, tree: &SyntaxTree) -> Option<String> {
    // The operator symbol follows the `operator` keyword.
    let text = node.utf8_text(tree.source.as_bytes()).ok()?;
    let after = text.split("operator").nth(1)?;
    let token: String = after
        .trim_start()
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '(')
        .collect();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// `Foo<T>` → `Foo`; already-simple names pass through.
pub fn simple_member_name(name: &str) -> String {
    match name.find('<') {
        Some(idx) => name[..idx].to_string(),
        None => name.to_string(),
    }
}

/// Strip generic arguments and qualification from a type spelling:
/// `Ns.Outer.Foo<int>` → `Foo`.
pub fn simple_type_name(name: &str) -> String {
    let base = simple_member_name(name);
    match base.rfind('.') {
        Some(idx) => base[idx + 1..].to_string(),
        None => base,
    }
}

/// .NET operator method name for a binary operator token.
fn operator_method_name(op: &str) -> Option<&'static str> {
    match op {
        "+" => Some("op_Addition"),
        "-" => Some("op_Subtraction"),
        "*" => Some("op_Multiply"),
        "/" => Some("op_Division"),
        "%" => Some("op_Modulus"),
        "==" => Some("op_Equality"),
        "!=" => Some("op_Inequality"),
        "<" => Some("op_LessThan"),
        ">" => Some("op_GreaterThan"),
        "<=" => Some("op_LessThanOrEqual"),
        ">=" => Some("op_GreaterThanOrEqual"),
        "&" => Some("op_BitwiseAnd"),
        "|" => Some("op_BitwiseOr"),
        "^" => Some("op_ExclusiveOr"),
        "<<" => Some("op_LeftShift"),
        ">>" => Some("op_RightShift"),
        _ => None,
    }
}

fn unary_operator_of(expr_text: &str) -> Option<&str> {
    let trimmed = expr_text.trim();
    if trimmed.starts_with("++") || trimmed.ends_with("++") {
        Some("++")
    } else if trimmed.starts_with("--") || trimmed.ends_with("--") {
        Some("--")
    } else if trimmed.starts_with('!') {
        Some("!")
    } else if trimmed.starts_with('-') {
        Some("-")
    } else {
        None
    }
}

fn unary_operator_method_name(op: &str) -> Option<&'static str> {
    match op {
        "!" => Some("op_LogicalNot"),
        "-" => Some("op_UnaryNegation"),
        "++" => Some("op_Increment"),
        "--" => Some("op_Decrement"),
        _ => None,
    }
}
