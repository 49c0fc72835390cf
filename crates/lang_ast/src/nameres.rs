use std::{collections::HashMap, iter, ops};

use la_arena::{Arena, Idx as Id};
use petgraph::graph::{DiGraph, NodeIndex};
use smol_str::SmolStr;

use super::{ConstId, Expr, ExprId, Module, RecordField};

pub type ScopeId = Id<ScopeData>;

/// The name reserved for "ignore this value".
pub const WILDCARD: &str = "_";

impl ops::Index<ScopeId> for ModuleScopes {
    type Output = ScopeData;
    fn index(&self, index: ScopeId) -> &Self::Output {
        &self.scopes[index]
    }
}

/// What a name is bound to in some scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Constant(ConstId),
    Variable,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeData {
    parent: Option<ScopeId>,
    defs: HashMap<SmolStr, Binding>,
}

impl ScopeData {
    pub fn definitions(&self) -> &HashMap<SmolStr, Binding> {
        &self.defs
    }
}

/// The resolve result of an unqualified name reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveResult {
    Binding(Binding),
    /// The wildcard `_`, which never names anything.
    Wildcard,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleScopes {
    scopes: Arena<ScopeData>,
    root: ScopeId,
}

impl Default for ModuleScopes {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleScopes {
    pub fn new() -> Self {
        let mut scopes = Arena::new();
        let root = scopes.alloc(ScopeData {
            parent: None,
            defs: HashMap::new(),
        });
        ModuleScopes { scopes, root }
    }

    pub fn root(&self) -> ScopeId {
        self.root
    }

    pub(crate) fn alloc_child(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.alloc(ScopeData {
            parent: Some(parent),
            defs: HashMap::new(),
        })
    }

    pub(crate) fn define(&mut self, scope: ScopeId, name: SmolStr, binding: Binding) {
        self.scopes[scope].defs.insert(name, binding);
    }

    pub fn ancestors(&self, scope_id: ScopeId) -> impl Iterator<Item = &'_ ScopeData> + '_ {
        iter::successors(Some(scope_id), |&i| self[i].parent).map(|i| &self[i])
    }

    /// Resolve a name starting at `scope` and walking outwards.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> ResolveResult {
        if name == WILDCARD {
            return ResolveResult::Wildcard;
        }
        self.ancestors(scope)
            .find_map(|data| data.defs.get(name))
            .map_or(ResolveResult::NotFound, |b| ResolveResult::Binding(*b))
    }

    /// Every name visible from `scope`, innermost first. Used for suggestions.
    pub fn visible_names(&self, scope: ScopeId) -> impl Iterator<Item = &'_ SmolStr> + '_ {
        self.ancestors(scope).flat_map(|data| data.defs.keys())
    }
}

// ==============================================================================
// Constant dependency graph
// ==============================================================================
//
// Every constant gets a node; an edge `a -> b` means the value of `a` reads
// `b` through an unqualified reference. Qualified references point into other
// modules, which are already resolved, so they never contribute edges.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstDependencies {
    pub edges: Vec<(ConstId, ConstId)>,
}

impl ConstDependencies {
    pub fn new(module: &Module) -> Self {
        let mut edges = Vec::new();
        for (const_id, decl) in module.consts() {
            let mut stack = vec![decl.value];
            while let Some(expr) = stack.pop() {
                if let Some(target) = referenced_const(module, decl.scope, expr) {
                    edges.push((const_id, target));
                }
                module[expr].walk_child_exprs(|child| stack.push(child));
            }
        }
        Self { edges }
    }

    pub fn depends_on(&self, from: ConstId, to: ConstId) -> bool {
        self.edges.iter().any(|&edge| edge == (from, to))
    }
}

fn referenced_const(module: &Module, scope: ScopeId, expr: ExprId) -> Option<ConstId> {
    let name = match &module[expr] {
        Expr::Reference { module: None, name } => name,
        _ => return None,
    };
    match module.scopes.resolve(scope, name) {
        ResolveResult::Binding(Binding::Constant(id)) => Some(id),
        _ => None,
    }
}

/// A strongly connected group of constants. A group is `cyclic` when it has
/// more than one member or its single member refers to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstGroup {
    pub members: Vec<ConstId>,
    pub cyclic: bool,
}

/// Groups in dependency order: a group only depends on groups before it.
pub type GroupedConsts = Vec<ConstGroup>;

type DepGraph = DiGraph<ConstId, ()>;

pub fn group_consts(module: &Module) -> GroupedConsts {
    let deps = ConstDependencies::new(module);

    let mut dep_graph = DepGraph::with_capacity(module.consts.len(), deps.edges.len());
    let mut const_to_node: HashMap<ConstId, NodeIndex> = HashMap::new();

    for (const_id, _) in module.consts() {
        let node_id = dep_graph.add_node(const_id);
        const_to_node.insert(const_id, node_id);
    }

    for &(from, to) in &deps.edges {
        if let (Some(&from), Some(&to)) = (const_to_node.get(&from), const_to_node.get(&to)) {
            dep_graph.update_edge(from, to, ());
        }
    }

    log::trace!(
        "const dependency graph: {} nodes, {} edges",
        dep_graph.node_count(),
        dep_graph.edge_count()
    );

    // tarjan_scc yields components in reverse topological order, which for
    // "depends on" edges is exactly dependencies first.
    petgraph::algo::tarjan_scc(&dep_graph)
        .into_iter()
        .map(|component| {
            let mut members: Vec<ConstId> = component.iter().map(|n| dep_graph[*n]).collect();
            // declaration order keeps cycle reports stable
            members.sort_by_key(|id| u32::from(id.into_raw()));
            let cyclic = members.len() > 1 || deps.depends_on(members[0], members[0]);
            ConstGroup { members, cyclic }
        })
        .collect()
}

/// Name of the const a record `VarName` field reads, if the field is one.
pub fn var_name_field_name<'m>(module: &'m Module, field: &RecordField) -> Option<&'m SmolStr> {
    match field {
        RecordField::VarName(expr) => match &module[*expr] {
            Expr::Reference { name, .. } => Some(name),
            _ => None,
        },
        _ => None,
    }
}
