//! Per-file indexing pipeline: fact tables in, line records out.
//!
//! [`file_needles`] chains every generator in a fixed order over one file's
//! inputs; [`index_file`] runs the chain through the line folder. Both are
//! pure: callers may run one file per worker with no synchronization, as
//! long as the call graph and inheritance map are immutable snapshots for
//! the duration of the build.

use needlecast_core::error::IndexError;
use needlecast_core::facts::{CallEdge, EntityKind, FactStore, InheritanceMap};
use tracing::debug;

use crate::fold::{fold_into_lines, LineRecord};
use crate::needles::{
    callee_needles, called_by_needles, child_needles, member_needles, overridden_needles,
    overrides_needles, parent_needles, qualified_needles, ref_needles, sig_needles,
    warning_needles, warning_opt_needles, Needle, NeedleTag,
};

/// The full ordered needle stream for one file.
///
/// Declaration and reference needles come first, kind by kind; the typedef
/// table feeds the type tag. Relational, override, signature, and warning
/// needles follow. The chain is lazy and single-pass.
pub fn file_needles<'a>(
    store: &'a FactStore,
    graph: &'a [CallEdge],
    inherit: &'a InheritanceMap,
) -> impl Iterator<Item = Needle> + 'a {
    qualified_needles(&store.functions, NeedleTag::Function)
        .chain(ref_needles(
            &store.refs,
            NeedleTag::FunctionRef,
            EntityKind::Function,
        ))
        .chain(qualified_needles(&store.types, NeedleTag::Type))
        .chain(ref_needles(&store.refs, NeedleTag::TypeRef, EntityKind::Type))
        .chain(qualified_needles(&store.typedefs, NeedleTag::Type))
        .chain(ref_needles(
            &store.refs,
            NeedleTag::TypeRef,
            EntityKind::Typedef,
        ))
        .chain(qualified_needles(&store.variables, NeedleTag::Var))
        .chain(ref_needles(
            &store.refs,
            NeedleTag::VarRef,
            EntityKind::Variable,
        ))
        .chain(qualified_needles(&store.namespaces, NeedleTag::Namespace))
        .chain(ref_needles(
            &store.refs,
            NeedleTag::NamespaceRef,
            EntityKind::Namespace,
        ))
        .chain(qualified_needles(
            &store.namespace_aliases,
            NeedleTag::NamespaceAlias,
        ))
        .chain(ref_needles(
            &store.refs,
            NeedleTag::NamespaceAliasRef,
            EntityKind::NamespaceAlias,
        ))
        .chain(qualified_needles(&store.macros, NeedleTag::Macro))
        .chain(callee_needles(graph))
        .chain(called_by_needles(graph))
        .chain(parent_needles(store, inherit))
        .chain(child_needles(store, inherit))
        .chain(member_needles(store))
        .chain(overridden_needles(&store.functions))
        .chain(overrides_needles(&store.functions))
        .chain(sig_needles(&store.functions))
        .chain(warning_needles(&store.warnings))
        .chain(warning_opt_needles(&store.warnings))
}

/// Index one file: generate its needle stream and fold it into per-line
/// records ready for the index sink.
///
/// Fails only for this file (malformed span); the caller decides batch
/// policy and may keep indexing other files.
pub fn index_file(
    text: &str,
    store: &FactStore,
    graph: &[CallEdge],
    inherit: &InheritanceMap,
) -> Result<Vec<LineRecord>, IndexError> {
    debug!(
        facts = store.len(),
        call_edges = graph.len(),
        "indexing file"
    );
    fold_into_lines(text, file_needles(store, graph, inherit))
}
