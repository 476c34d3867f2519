//! Typed analysis facts: per-file fact tables, call graph, inheritance map.
//!
//! The external analyzer emits one [`FactStore`] per translation unit plus
//! whole-program [`CallEdge`] and [`InheritanceMap`] inputs. Each fact kind
//! is its own struct carrying only its own well-typed fields over a shared
//! name/span base, so generators match on structure instead of probing
//! loosely-typed records for attribute presence.
//!
//! All tables deserialize with `#[serde(default)]`: an absent table means
//! zero facts of that kind, never an error. Unknown keys in the analyzer
//! payload (e.g. grouped-by-kind metadata tables) are ignored by serde.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::span::Span;

// ============================================================================
// Shared Base
// ============================================================================

/// Name and optional qualified name shared by declaration and reference facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    /// Unqualified symbol name.
    pub name: String,
    /// Fully qualified name (e.g. `ns::foo`), when the analyzer resolved one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualname: Option<String>,
}

impl Ident {
    /// Create an identifier with no qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Ident {
            name: name.into(),
            qualname: None,
        }
    }

    /// Set the qualified name.
    pub fn with_qualname(mut self, qualname: impl Into<String>) -> Self {
        self.qualname = Some(qualname.into());
        self
    }
}

/// The owning symbol of a member fact (e.g. the class a method belongs to).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRef {
    /// Name of the owning symbol.
    pub name: String,
}

impl ScopeRef {
    /// Create a scope reference.
    pub fn new(name: impl Into<String>) -> Self {
        ScopeRef { name: name.into() }
    }
}

// ============================================================================
// Entity Kinds
// ============================================================================

/// Kind of entity a reference fact points at.
///
/// Used to bucket references into the corresponding `*_ref` needle family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Function,
    Type,
    Typedef,
    Variable,
    Namespace,
    NamespaceAlias,
}

impl EntityKind {
    /// Stable string form matching the analyzer's reference-kind vocabulary.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Function => "function",
            EntityKind::Type => "type",
            EntityKind::Typedef => "typedef",
            EntityKind::Variable => "variable",
            EntityKind::Namespace => "namespace",
            EntityKind::NamespaceAlias => "namespace_alias",
        }
    }
}

/// Kind of type declaration.
///
/// Inheritance needles are generated for [`TypeKind::Class`] facts only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Enum,
    Union,
}

// ============================================================================
// Fact Variants
// ============================================================================

/// The symbol a function overrides, as recorded by the analyzer.
///
/// Directional: the overriding function carries this attribute, and `span`
/// is the *target's* own declaration span, not the overriding function's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideTarget {
    /// Target's unqualified name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Target's qualified name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualname: Option<String>,
    /// Declaration span of the overridden symbol.
    pub span: Span,
}

/// A function declaration fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionFact {
    #[serde(flatten)]
    pub ident: Ident,
    pub span: Span,
    /// Textual type signature (e.g. `int(char const *)`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    /// Owning symbol for member functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeRef>,
    /// Override edge for virtual member functions.
    #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
    pub override_of: Option<OverrideTarget>,
}

impl FunctionFact {
    /// Create a function fact with no signature, scope, or override edge.
    pub fn new(ident: Ident, span: Span) -> Self {
        FunctionFact {
            ident,
            span,
            signature: None,
            scope: None,
            override_of: None,
        }
    }

    /// Set the textual type signature.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Set the owning scope.
    pub fn with_scope(mut self, scope: ScopeRef) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Set the override target.
    pub fn with_override(mut self, target: OverrideTarget) -> Self {
        self.override_of = Some(target);
        self
    }
}

/// A type declaration fact (class, struct, enum, union).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeFact {
    #[serde(flatten)]
    pub ident: Ident,
    pub span: Span,
    #[serde(default)]
    pub kind: TypeKind,
    /// Owning symbol for nested types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeRef>,
}

impl TypeFact {
    /// Create a type fact of the given kind.
    pub fn new(ident: Ident, span: Span, kind: TypeKind) -> Self {
        TypeFact {
            ident,
            span,
            kind,
            scope: None,
        }
    }

    /// Set the owning scope.
    pub fn with_scope(mut self, scope: ScopeRef) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// A declaration fact with no kind-specific attributes beyond an optional
/// scope: typedefs, variables, namespaces, namespace aliases, and macros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolFact {
    #[serde(flatten)]
    pub ident: Ident,
    pub span: Span,
    /// Owning symbol for member facts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<ScopeRef>,
}

impl SymbolFact {
    /// Create a symbol fact with no scope.
    pub fn new(ident: Ident, span: Span) -> Self {
        SymbolFact {
            ident,
            span,
            scope: None,
        }
    }

    /// Set the owning scope.
    pub fn with_scope(mut self, scope: ScopeRef) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// A reference fact: a use site pointing at a declared entity.
///
/// `target` identifies what entity kind the reference points at and is the
/// filter key for the `*_ref` needle families. The span is the use site,
/// not the declaration site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefFact {
    #[serde(flatten)]
    pub ident: Ident,
    pub span: Span,
    #[serde(rename = "kind")]
    pub target: EntityKind,
}

impl RefFact {
    /// Create a reference fact.
    pub fn new(ident: Ident, span: Span, target: EntityKind) -> Self {
        RefFact {
            ident,
            span,
            target,
        }
    }
}

/// A compiler warning fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningFact {
    /// Warning message text.
    #[serde(rename = "msg")]
    pub message: String,
    /// Compiler option that triggered the warning (e.g. `-Wunused`).
    #[serde(default, rename = "opt", skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    pub span: Span,
}

impl WarningFact {
    /// Create a warning fact with no triggering option.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        WarningFact {
            message: message.into(),
            option: None,
            span,
        }
    }

    /// Set the triggering compiler option.
    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }
}

// ============================================================================
// Named Fact Seam
// ============================================================================

/// Uniform view over every name-bearing declaration fact.
///
/// Generators that range over all fact kinds (member needles) consume this
/// instead of matching each table's concrete type.
pub trait NamedFact {
    /// The fact's name/qualname base.
    fn ident(&self) -> &Ident;
    /// The fact's declaration span.
    fn span(&self) -> Span;
    /// The owning symbol, for member facts.
    fn scope(&self) -> Option<&ScopeRef>;
}

impl NamedFact for FunctionFact {
    fn ident(&self) -> &Ident {
        &self.ident
    }
    fn span(&self) -> Span {
        self.span
    }
    fn scope(&self) -> Option<&ScopeRef> {
        self.scope.as_ref()
    }
}

impl NamedFact for TypeFact {
    fn ident(&self) -> &Ident {
        &self.ident
    }
    fn span(&self) -> Span {
        self.span
    }
    fn scope(&self) -> Option<&ScopeRef> {
        self.scope.as_ref()
    }
}

impl NamedFact for SymbolFact {
    fn ident(&self) -> &Ident {
        &self.ident
    }
    fn span(&self) -> Span {
        self.span
    }
    fn scope(&self) -> Option<&ScopeRef> {
        self.scope.as_ref()
    }
}

// ============================================================================
// Per-File Fact Store
// ============================================================================

/// Per-file table of analysis facts, one `Vec` per entity kind.
///
/// Produced once per translation unit by the external analyzer and consumed
/// read-only by the needle generators. Absent tables are empty tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactStore {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionFact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeFact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub typedefs: Vec<SymbolFact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<SymbolFact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<SymbolFact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespace_aliases: Vec<SymbolFact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub macros: Vec<SymbolFact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<RefFact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<WarningFact>,
}

impl FactStore {
    /// Create an empty fact store.
    pub fn new() -> Self {
        FactStore::default()
    }

    /// Decode a fact store from the analyzer's JSON payload.
    pub fn from_json(json: &str) -> Result<Self, crate::error::IndexError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Iterate every name-bearing declaration fact across all tables.
    ///
    /// Tables are chained in declaration order: functions, types, typedefs,
    /// variables, namespaces, namespace aliases, macros. Reference and
    /// warning facts carry no scope and are not included.
    pub fn iter_named(&self) -> impl Iterator<Item = &dyn NamedFact> {
        self.functions
            .iter()
            .map(|f| f as &dyn NamedFact)
            .chain(self.types.iter().map(|f| f as &dyn NamedFact))
            .chain(self.typedefs.iter().map(|f| f as &dyn NamedFact))
            .chain(self.variables.iter().map(|f| f as &dyn NamedFact))
            .chain(self.namespaces.iter().map(|f| f as &dyn NamedFact))
            .chain(self.namespace_aliases.iter().map(|f| f as &dyn NamedFact))
            .chain(self.macros.iter().map(|f| f as &dyn NamedFact))
    }

    /// Total fact count across all tables.
    pub fn len(&self) -> usize {
        self.functions.len()
            + self.types.len()
            + self.typedefs.len()
            + self.variables.len()
            + self.namespaces.len()
            + self.namespace_aliases.len()
            + self.macros.len()
            + self.refs.len()
            + self.warnings.len()
    }

    /// Check if every table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Call Graph
// ============================================================================

/// One endpoint of a call edge: a function name and its span.
///
/// The caller site's span is the call expression; the callee site's span is
/// the callee's declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub name: String,
    pub span: Span,
}

impl CallSite {
    /// Create a call site.
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        CallSite {
            name: name.into(),
            span,
        }
    }
}

/// A directed call edge. Many-to-many: a function may call many callees,
/// and a callee may have many callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: CallSite,
    pub callee: CallSite,
}

impl CallEdge {
    /// Create a call edge.
    pub fn new(caller: CallSite, callee: CallSite) -> Self {
        CallEdge { caller, callee }
    }
}

// ============================================================================
// Inheritance Map
// ============================================================================

/// Whole-program mapping from parent type name to its direct children.
///
/// Backed by ordered collections so a full pipeline run over identical
/// inputs is byte-identical across runs. Child-to-parent lookup is a linear
/// scan over the entries; no reverse index is precomputed. Iteration order
/// follows the map and is not a consumer contract beyond determinism.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InheritanceMap(BTreeMap<String, BTreeSet<String>>);

impl InheritanceMap {
    /// Create an empty inheritance map.
    pub fn new() -> Self {
        InheritanceMap::default()
    }

    /// Record a direct parent → child edge.
    pub fn insert(&mut self, parent: impl Into<String>, child: impl Into<String>) {
        self.0.entry(parent.into()).or_default().insert(child.into());
    }

    /// Direct children of `parent`, empty if the parent is unknown.
    pub fn children_of<'a>(&'a self, parent: &str) -> impl Iterator<Item = &'a str> {
        self.0
            .get(parent)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Direct parents of `child`, found by scanning every entry whose child
    /// set contains the name.
    pub fn parents_of<'a>(&'a self, child: &'a str) -> impl Iterator<Item = &'a str> {
        self.0
            .iter()
            .filter(move |(_, children)| children.contains(child))
            .map(|(parent, _)| parent.as_str())
    }

    /// Number of parent entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
