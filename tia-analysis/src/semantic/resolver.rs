//! Call-site resolution against a declaration table.
//!
//! Maps a syntactic call site to a canonical method id:
//! `Namespace.Type.Method(ParamType1,ParamType2)`. Unresolved sites are
//! `None` and never an error; the builder drops them with a debug log.

use std::sync::Arc;

use tia_core::types::collections::FxHashMap;

use crate::call_graph::types::CallKind;

use super::model::{
    simple_type_name, CallSite, MethodDecl, PropertyDecl, SemanticModel, TypeDecl, TypeKind,
};

/// A type declaration located in some model.
#[derive(Clone)]
pub struct TypeEntry {
    pub model: Arc<SemanticModel>,
    pub type_index: usize,
}

impl TypeEntry {
    pub fn decl(&self) -> &TypeDecl {
        &self.model.types[self.type_index]
    }
}

/// Declaration table over a set of semantic models.
pub struct TypeTable {
    by_qualified: FxHashMap<String, TypeEntry>,
    by_simple: FxHashMap<String, Vec<TypeEntry>>,
    /// `(type, method index)` of static methods whose first parameter is
    /// a `this` parameter.
    extensions: Vec<(TypeEntry, usize)>,
}

impl TypeTable {
    pub fn build(models: &[Arc<SemanticModel>]) -> Self {
        let mut by_qualified = FxHashMap::default();
        let mut by_simple: FxHashMap<String, Vec<TypeEntry>> = FxHashMap::default();
        let mut extensions = Vec::new();

        for model in models {
            for (type_index, decl) in model.types.iter().enumerate() {
                let entry = TypeEntry {
                    model: Arc::clone(model),
                    type_index,
                };
                by_qualified.insert(decl.qualified_name(), entry.clone());
                let simple = last_segment(&decl.name).to_string();
                by_simple.entry(simple).or_default().push(entry.clone());

                for (method_index, method) in decl.methods.iter().enumerate() {
                    if method.modifiers.is_static && method.is_extension() {
                        extensions.push((entry.clone(), method_index));
                    }
                }
            }
        }

        Self {
            by_qualified,
            by_simple,
            extensions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_qualified.is_empty()
    }

    /// Resolve a type spelling visible from (`namespace`, `usings`).
    ///
    /// Prefers the unique qualified match, then the current namespace, then
    /// each using directive, then the first simple-name candidate.
    pub fn resolve_type_name(
        &self,
        name: &str,
        namespace: &str,
        usings: &[String],
    ) -> Option<&TypeEntry> {
        let stripped = strip_generic_args(name);
        if stripped.contains('.') {
            if let Some(entry) = self.by_qualified.get(&stripped) {
                return Some(entry);
            }
        }
        let simple = simple_type_name(&stripped);
        if !namespace.is_empty() {
            if let Some(entry) = self.by_qualified.get(&format!("{namespace}.{simple}")) {
                return Some(entry);
            }
        }
        for using in usings {
            if let Some(entry) = self.by_qualified.get(&format!("{using}.{simple}")) {
                return Some(entry);
            }
        }
        if let Some(entry) = self.by_qualified.get(&simple) {
            return Some(entry);
        }
        self.by_simple.get(&simple).and_then(|v| v.first())
    }

    pub fn get_qualified(&self, qualified: &str) -> Option<&TypeEntry> {
        self.by_qualified.get(qualified)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeEntry> {
        self.by_qualified.values()
    }
}

/// The scope a call site is resolved in.
pub struct MethodScope<'a> {
    pub model: &'a SemanticModel,
    pub type_decl: &'a TypeDecl,
    /// `None` inside property accessors.
    pub method: Option<&'a MethodDecl>,
}

/// A resolved call target.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub method_id: String,
    pub kind: CallKind,
}

/// Resolves call sites to canonical method ids.
pub struct Resolver<'a> {
    table: &'a TypeTable,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a TypeTable) -> Self {
        Self { table }
    }

    /// Resolve one call site. `None` means the target is outside the
    /// compilation or dynamically dispatched beyond what declarations
    /// prove; such sites are dropped, not errors.
    pub fn resolve_site(&self, site: &CallSite, scope: &MethodScope<'_>) -> Option<ResolvedTarget> {
        match site {
            CallSite::Invocation {
                receiver,
                name,
                arg_count,
                ..
            } => self.resolve_invocation(receiver.as_deref(), name, *arg_count, scope),
            CallSite::ObjectCreation {
                type_name,
                arg_count,
                ..
            } => self.resolve_creation(type_name, *arg_count, scope),
            CallSite::PropertyGet { receiver, name, .. } => {
                self.resolve_accessor(receiver.as_deref(), name, false, scope)
            }
            CallSite::PropertySet { receiver, name, .. } => {
                self.resolve_accessor(receiver.as_deref(), name, true, scope)
            }
            CallSite::Operator {
                op_name,
                operand_hint,
                ..
            } => self.resolve_operator(op_name, operand_hint.as_deref(), scope),
        }
    }

    fn resolve_invocation(
        &self,
        receiver: Option<&str>,
        name: &str,
        arg_count: usize,
        scope: &MethodScope<'_>,
    ) -> Option<ResolvedTarget> {
        let (target_type, searched_receiver_type) = match receiver {
            None | Some("this") => (self.containing_entry(scope)?, false),
            Some("base") => {
                let containing = self.containing_entry(scope)?;
                (self.first_base_class(&containing)?, false)
            }
            Some(expr) => match self.resolve_expression_type(expr, scope) {
                Some(entry) => (entry, true),
                None => return None,
            },
        };

        if let Some((entry, method_index)) = self.find_method(&target_type, name, arg_count) {
            let decl = entry.decl();
            let method = &decl.methods[method_index];
            // Delegate-typed members make the invocation a delegate call.
            let kind = if decl.kind == TypeKind::Delegate {
                CallKind::Delegate
            } else {
                classify_method(decl, method)
            };
            return Some(ResolvedTarget {
                method_id: method_id(decl, method),
                kind,
            });
        }

        // Instance member lookup failed: try extension methods over the
        // receiver type.
        if searched_receiver_type {
            if let Some(target) = self.find_extension(&target_type, name, arg_count) {
                return Some(target);
            }
        }

        // Invoking a delegate-typed value calls the delegate's Invoke:
        // `handler()` where `handler` is a field, local, or parameter.
        if receiver.is_none() {
            if let Some(entry) = self.resolve_first_segment(name, scope) {
                let decl = entry.decl();
                if decl.kind == TypeKind::Delegate {
                    if let Some(invoke) = decl.methods.iter().find(|m| m.name == "Invoke") {
                        return Some(ResolvedTarget {
                            method_id: method_id(decl, invoke),
                            kind: CallKind::Delegate,
                        });
                    }
                }
            }
        }

        None
    }

    fn resolve_creation(
        &self,
        type_name: &str,
        arg_count: usize,
        scope: &MethodScope<'_>,
    ) -> Option<ResolvedTarget> {
        let entry = self
            .table
            .resolve_type_name(type_name, &scope.type_decl.namespace, &scope.model.usings)?;
        let decl = entry.decl();

        let ctors: Vec<&MethodDecl> = decl.methods.iter().filter(|m| m.is_constructor).collect();
        let chosen = choose_overload(&ctors, arg_count);

        let method_id = match chosen {
            Some(ctor) => method_id(decl, ctor),
            // Implicit constructor: record the edge anyway.
            None => format!("{}.{}()", decl.qualified_name(), last_segment(&decl.name)),
        };

        Some(ResolvedTarget {
            method_id,
            kind: CallKind::Constructor,
        })
    }

    fn resolve_accessor(
        &self,
        receiver: Option<&str>,
        name: &str,
        is_set: bool,
        scope: &MethodScope<'_>,
    ) -> Option<ResolvedTarget> {
        if name.is_empty() {
            return None;
        }
        let entry = match receiver {
            None | Some("this") => self.containing_entry(scope)?,
            Some("base") => {
                let containing = self.containing_entry(scope)?;
                self.first_base_class(&containing)?
            }
            Some(expr) => self.resolve_expression_type(expr, scope)?,
        };

        let (owner, property) = self.find_property(&entry, name)?;
        if is_set && !property.has_setter {
            return None;
        }
        if !is_set && !property.has_getter {
            return None;
        }

        Some(ResolvedTarget {
            method_id: accessor_id(owner.decl(), &property, is_set),
            kind: if is_set {
                CallKind::PropertySet
            } else {
                CallKind::PropertyGet
            },
        })
    }

    fn resolve_operator(
        &self,
        op_name: &str,
        operand_hint: Option<&str>,
        scope: &MethodScope<'_>,
    ) -> Option<ResolvedTarget> {
        let operand = operand_hint?;
        let entry = self.resolve_expression_type(operand, scope)?;
        let decl = entry.decl();
        let method = decl.methods.iter().find(|m| m.is_operator && m.name == op_name)?;
        Some(ResolvedTarget {
            method_id: method_id(decl, method),
            kind: CallKind::Operator,
        })
    }

    /// Resolve the static type of a receiver expression: a local, a
    /// parameter, a field or property of the containing type, a type name,
    /// or a dotted chain of members starting from one of those.
    pub fn resolve_expression_type(
        &self,
        expr: &str,
        scope: &MethodScope<'_>,
    ) -> Option<TypeEntry> {
        let segments = split_dotted(expr);
        let (first, rest) = segments.split_first()?;

        let mut current = self.resolve_first_segment(first, scope)?;

        for segment in rest {
            current = self.resolve_member_type(&current, segment, scope)?;
        }
        Some(current)
    }

    fn resolve_first_segment(&self, segment: &str, scope: &MethodScope<'_>) -> Option<TypeEntry> {
        if segment == "this" {
            return self.containing_entry(scope);
        }
        if segment == "base" {
            let containing = self.containing_entry(scope)?;
            return self.first_base_class(&containing);
        }
        // Locals shadow parameters shadow fields, per language scoping.
        if let Some(method) = scope.method {
            if let Some((_, type_name)) = method.locals.iter().find(|(n, _)| n == segment) {
                return self.resolve_in_scope(type_name, scope);
            }
            if let Some(param) = method.params.iter().find(|p| p.name == segment) {
                return self.resolve_in_scope(&param.type_name, scope);
            }
        }
        if let Some((_, type_name)) = scope
            .type_decl
            .fields
            .iter()
            .find(|(n, _)| n == segment)
        {
            return self.resolve_in_scope(type_name, scope);
        }
        if let Some(prop) = scope
            .type_decl
            .properties
            .iter()
            .find(|p| p.name == segment)
        {
            return self.resolve_in_scope(&prop.type_name, scope);
        }
        // A bare type name: static access.
        self.table
            .resolve_type_name(segment, &scope.type_decl.namespace, &scope.model.usings)
            .cloned()
    }

    fn resolve_member_type(
        &self,
        entry: &TypeEntry,
        member: &str,
        scope: &MethodScope<'_>,
    ) -> Option<TypeEntry> {
        let decl = entry.decl();
        if let Some((_, type_name)) = decl.fields.iter().find(|(n, _)| n == member) {
            return self.resolve_in_scope(type_name, scope);
        }
        if let Some(prop) = decl.properties.iter().find(|p| p.name == member) {
            return self.resolve_in_scope(&prop.type_name, scope);
        }
        // Nested type.
        self.table
            .get_qualified(&format!("{}.{}", decl.qualified_name(), member))
            .cloned()
    }

    fn resolve_in_scope(&self, type_name: &str, scope: &MethodScope<'_>) -> Option<TypeEntry> {
        self.table
            .resolve_type_name(type_name, &scope.type_decl.namespace, &scope.model.usings)
            .cloned()
    }

    fn containing_entry(&self, scope: &MethodScope<'_>) -> Option<TypeEntry> {
        self.table
            .get_qualified(&scope.type_decl.qualified_name())
            .cloned()
    }

    fn first_base_class(&self, entry: &TypeEntry) -> Option<TypeEntry> {
        let decl = entry.decl();
        for base in &decl.base_types {
            if let Some(base_entry) =
                self.table
                    .resolve_type_name(base, &decl.namespace, &entry.model.usings)
            {
                if base_entry.decl().kind != TypeKind::Interface {
                    return Some(base_entry.clone());
                }
            }
        }
        None
    }

    /// Find a method by name in a type and its base chain, returning the
    /// owning entry and the method's index within it.
    fn find_method(
        &self,
        entry: &TypeEntry,
        name: &str,
        arg_count: usize,
    ) -> Option<(TypeEntry, usize)> {
        let mut current = Some(entry.clone());
        let mut depth = 0;
        while let Some(entry) = current {
            let decl = entry.decl();
            let candidates: Vec<usize> = decl
                .methods
                .iter()
                .enumerate()
                .filter(|(_, m)| !m.is_constructor && m.name == name)
                .map(|(i, _)| i)
                .collect();

            let chosen = candidates
                .iter()
                .copied()
                .find(|&i| decl.methods[i].params.len() == arg_count)
                .or_else(|| {
                    candidates.iter().copied().find(|&i| {
                        let m = &decl.methods[i];
                        m.params.len() > arg_count
                            && m.params[arg_count..].iter().all(|p| p.has_default)
                    })
                })
                .or_else(|| candidates.first().copied());

            if let Some(index) = chosen {
                return Some((entry, index));
            }
            depth += 1;
            if depth > 8 {
                break;
            }
            current = self.first_base_class(&entry);
        }
        None
    }

    fn find_property(
        &self,
        entry: &TypeEntry,
        name: &str,
    ) -> Option<(TypeEntry, PropertyDecl)> {
        let mut current = Some(entry.clone());
        let mut depth = 0;
        while let Some(entry) = current {
            if let Some(prop) = entry.decl().properties.iter().find(|p| p.name == name) {
                let prop = prop.clone();
                return Some((entry, prop));
            }
            depth += 1;
            if depth > 8 {
                break;
            }
            current = self.first_base_class(&entry);
        }
        None
    }

    fn find_extension(
        &self,
        receiver: &TypeEntry,
        name: &str,
        arg_count: usize,
    ) -> Option<ResolvedTarget> {
        let receiver_simple = last_segment(&receiver.decl().name).to_string();
        for (entry, method_index) in &self.table.extensions {
            let decl = entry.decl();
            let method = &decl.methods[*method_index];
            if method.name != name {
                continue;
            }
            let this_type = simple_type_name(&method.params[0].type_name);
            let applies = this_type == receiver_simple
                || decl.type_params.contains(&this_type)
                || method.type_params.contains(&this_type);
            // Extension call sites omit the receiver argument.
            let explicit_args = method.params.len().saturating_sub(1);
            if applies && explicit_args >= arg_count {
                return Some(ResolvedTarget {
                    method_id: method_id(decl, method),
                    kind: CallKind::Extension,
                });
            }
        }
        None
    }
}

/// Forward edges from polymorphic declarations to their implementations,
/// so reverse traversal from an implementation reaches callers of the
/// declaring member.
pub fn polymorphic_edges(table: &TypeTable) -> Vec<(String, String, CallKind)> {
    let mut edges = Vec::new();

    for entry in table.types() {
        let decl = entry.decl();
        for base_name in &decl.base_types {
            let Some(base_entry) =
                table.resolve_type_name(base_name, &decl.namespace, &entry.model.usings)
            else {
                continue;
            };
            let base = base_entry.decl();
            let kind = if base.kind == TypeKind::Interface {
                CallKind::Interface
            } else {
                CallKind::Virtual
            };

            for method in &decl.methods {
                if method.is_constructor || method.is_operator {
                    continue;
                }
                let overridable = base.kind == TypeKind::Interface
                    || method.modifiers.is_override;
                if !overridable {
                    continue;
                }
                if let Some(base_method) = base
                    .methods
                    .iter()
                    .find(|m| m.name == method.name && m.params.len() == method.params.len())
                {
                    edges.push((method_id(base, base_method), method_id(decl, method), kind));
                }
            }

            for prop in &decl.properties {
                if let Some(base_prop) = base.properties.iter().find(|p| p.name == prop.name) {
                    if prop.has_getter && base_prop.has_getter {
                        edges.push((
                            accessor_id(base, base_prop, false),
                            accessor_id(decl, prop, false),
                            kind,
                        ));
                    }
                    if prop.has_setter && base_prop.has_setter {
                        edges.push((
                            accessor_id(base, base_prop, true),
                            accessor_id(decl, prop, true),
                            kind,
                        ));
                    }
                }
            }
        }
    }

    edges
}

/// Canonical method id: `Namespace.Type.Method(ParamType1,ParamType2)`.
pub fn method_id(type_decl: &TypeDecl, method: &MethodDecl) -> String {
    let params: Vec<&str> = method.params.iter().map(|p| p.type_name.as_str()).collect();
    format!(
        "{}.{}({})",
        type_decl.qualified_name(),
        method.name,
        params.join(",")
    )
}

/// Synthesized accessor id: `Namespace.Type.get_Name()` / `set_Name(T)`.
pub fn accessor_id(type_decl: &TypeDecl, property: &PropertyDecl, is_set: bool) -> String {
    if is_set {
        format!(
            "{}.set_{}({})",
            type_decl.qualified_name(),
            property.name,
            property.type_name
        )
    } else {
        format!("{}.get_{}()", type_decl.qualified_name(), property.name)
    }
}

/// Overload choice: exact arity, then optional-parameter-tolerant arity,
/// then the first candidate.
fn choose_overload<'m>(candidates: &[&'m MethodDecl], arg_count: usize) -> Option<&'m MethodDecl> {
    if let Some(&exact) = candidates.iter().find(|m| m.params.len() == arg_count) {
        return Some(exact);
    }
    if let Some(&optional) = candidates.iter().find(|m| {
        m.params.len() > arg_count && m.params[arg_count..].iter().all(|p| p.has_default)
    }) {
        return Some(optional);
    }
    candidates.first().copied()
}

fn classify_method(type_decl: &TypeDecl, method: &MethodDecl) -> CallKind {
    if method.is_constructor {
        CallKind::Constructor
    } else if method.is_operator {
        CallKind::Operator
    } else if method.is_extension() {
        CallKind::Extension
    } else if type_decl.kind == TypeKind::Interface {
        CallKind::Interface
    } else if method.modifiers.is_virtual
        || method.modifiers.is_override
        || method.modifiers.is_abstract
    {
        CallKind::Virtual
    } else if method.modifiers.is_static {
        CallKind::Static
    } else {
        CallKind::Direct
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// `IRepository<User>` → `IRepository`; keeps qualification.
fn strip_generic_args(name: &str) -> String {
    match name.find('<') {
        Some(idx) => name[..idx].to_string(),
        None => name.to_string(),
    }
}

/// Split a dotted receiver on top-level dots, ignoring dots inside
/// generic argument lists.
fn split_dotted(expr: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in expr.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                segments.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&expr[start..]);
    segments
}
