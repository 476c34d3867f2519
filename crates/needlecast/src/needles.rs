//! Needle model and generators.
//!
//! A needle is one typed, span-located search fact: `(tag, value, span)`.
//! Generators are pure, lazy iterators over the immutable fact inputs; they
//! carry no identity beyond the triple, and duplicates are legal (they
//! collapse naturally when grouped by line).
//!
//! Failure semantics: generators are total over well-formed input. A fact
//! missing an attribute a generator expects yields no needle for that fact
//! (never an abort); references whose target kind does not match the
//! requested kind are filtered, not errors. Malformed spans are not
//! validated here — the line folder checks them defensively.

use needlecast_core::facts::{
    CallEdge, EntityKind, FactStore, FunctionFact, Ident, InheritanceMap, RefFact, TypeFact,
    TypeKind, WarningFact,
};
use needlecast_core::span::Span;
use serde::{Serialize, Serializer};
use tracing::trace;

// ============================================================================
// Needle Model
// ============================================================================

/// Tag identifying a needle family, one per query facet.
///
/// The string forms preserve the index's established tag vocabulary,
/// including its mixed underscore/hyphen scheme — stored queries depend on
/// the exact strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeedleTag {
    Function,
    Type,
    Var,
    Namespace,
    NamespaceAlias,
    Macro,
    FunctionRef,
    TypeRef,
    VarRef,
    NamespaceRef,
    NamespaceAliasRef,
    Callee,
    CalledBy,
    Child,
    Parent,
    Member,
    Overrides,
    Overridden,
    Sig,
    Warning,
    WarningOpt,
}

impl NeedleTag {
    /// The exact tag string stored in the search index.
    pub fn as_str(&self) -> &'static str {
        match self {
            NeedleTag::Function => "c_function",
            NeedleTag::Type => "c_type",
            NeedleTag::Var => "c_var",
            NeedleTag::Namespace => "c_namespace",
            NeedleTag::NamespaceAlias => "c_namespace_alias",
            NeedleTag::Macro => "c_macro",
            NeedleTag::FunctionRef => "c_function_ref",
            NeedleTag::TypeRef => "c_type_ref",
            NeedleTag::VarRef => "c_var_ref",
            NeedleTag::NamespaceRef => "c_namespace_ref",
            NeedleTag::NamespaceAliasRef => "c_namespace_alias_ref",
            NeedleTag::Callee => "c-callee",
            NeedleTag::CalledBy => "c-called-by",
            NeedleTag::Child => "c-child",
            NeedleTag::Parent => "c-parent",
            NeedleTag::Member => "c-member",
            NeedleTag::Overrides => "c-overrides",
            NeedleTag::Overridden => "c-overridden",
            NeedleTag::Sig => "c-sig",
            NeedleTag::Warning => "c_warning",
            NeedleTag::WarningOpt => "c_warning_opt",
        }
    }
}

impl Serialize for NeedleTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A needle's payload: a scalar string or a name/qualname pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NeedleValue {
    /// Scalar value (relational, signature, and warning needles).
    Text(String),
    /// Symbol value (qualified-entity and reference needles).
    Symbol {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        qualname: Option<String>,
    },
}

/// One typed, span-located search fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Needle {
    pub tag: NeedleTag,
    pub value: NeedleValue,
    pub span: Span,
}

impl Needle {
    /// Create a scalar-valued needle.
    pub fn text(tag: NeedleTag, value: impl Into<String>, span: Span) -> Self {
        Needle {
            tag,
            value: NeedleValue::Text(value.into()),
            span,
        }
    }

    /// Create a symbol-valued needle from a fact's identifier.
    pub fn symbol(tag: NeedleTag, ident: &Ident, span: Span) -> Self {
        Needle {
            tag,
            value: NeedleValue::Symbol {
                name: ident.name.clone(),
                qualname: ident.qualname.clone(),
            },
            span,
        }
    }
}

// ============================================================================
// Qualified-Entity and Reference Generators
// ============================================================================

/// One needle per declaration fact in a table: `(tag, {name, qualname},
/// fact's own span)`.
///
/// The caller selects the table, so a table can feed a different tag than
/// its own kind (the typedef table is indexed under the type tag).
pub fn qualified_needles<F>(facts: &[F], tag: NeedleTag) -> impl Iterator<Item = Needle> + '_
where
    F: needlecast_core::facts::NamedFact,
{
    facts
        .iter()
        .map(move |fact| Needle::symbol(tag, fact.ident(), fact.span()))
}

/// One needle per reference fact whose target matches the requested kind,
/// at the use site's span. Non-matching references are filtered out.
pub fn ref_needles(
    refs: &[RefFact],
    tag: NeedleTag,
    target: EntityKind,
) -> impl Iterator<Item = Needle> + '_ {
    refs.iter()
        .filter(move |r| r.target == target)
        .map(move |r| Needle::symbol(tag, &r.ident, r.span))
}

// ============================================================================
// Call Graph Generators
// ============================================================================

/// `c-callee` needles: the callee's name at the *caller's* span.
///
/// Queryable from the call site ("who does this line call"). The pairing
/// with [`called_by_needles`] is deliberately cross-wired for query
/// ergonomics; both sides must keep this exact wiring.
pub fn callee_needles(graph: &[CallEdge]) -> impl Iterator<Item = Needle> + '_ {
    graph
        .iter()
        .map(|edge| Needle::text(NeedleTag::Callee, edge.callee.name.clone(), edge.caller.span))
}

/// `c-called-by` needles: the caller's name at the *callee's* span.
///
/// Queryable from the callee's declaration ("who calls this function").
pub fn called_by_needles(graph: &[CallEdge]) -> impl Iterator<Item = Needle> + '_ {
    graph.iter().map(|edge| {
        Needle::text(
            NeedleTag::CalledBy,
            edge.caller.name.clone(),
            edge.callee.span,
        )
    })
}

// ============================================================================
// Inheritance Generators
// ============================================================================

fn class_facts(store: &FactStore) -> impl Iterator<Item = &TypeFact> {
    store.types.iter().filter(|t| t.kind == TypeKind::Class)
}

/// `c-child` needles: each direct subclass name at the parent class's span.
pub fn child_needles<'a>(
    store: &'a FactStore,
    inherit: &'a InheritanceMap,
) -> impl Iterator<Item = Needle> + 'a {
    class_facts(store).flat_map(move |class| {
        inherit
            .children_of(&class.ident.name)
            .map(move |child| Needle::text(NeedleTag::Child, child, class.span))
    })
}

/// `c-parent` needles: each direct superclass name at the child class's
/// span, found by scanning the inheritance map.
pub fn parent_needles<'a>(
    store: &'a FactStore,
    inherit: &'a InheritanceMap,
) -> impl Iterator<Item = Needle> + 'a {
    class_facts(store).flat_map(move |class| {
        inherit
            .parents_of(&class.ident.name)
            .map(move |parent| Needle::text(NeedleTag::Parent, parent, class.span))
    })
}

// ============================================================================
// Member Generator
// ============================================================================

/// `c-member` needles: the owning scope's name at each member fact's span.
///
/// Ranges over every name-bearing fact table; facts without a scope are
/// skipped.
pub fn member_needles(store: &FactStore) -> impl Iterator<Item = Needle> + '_ {
    store.iter_named().filter_map(|fact| {
        fact.scope()
            .map(|scope| Needle::text(NeedleTag::Member, scope.name.clone(), fact.span()))
    })
}

// ============================================================================
// Override Generators
// ============================================================================

/// `c-overrides` needles at the *overriding* function's span, one per
/// override-target key (name and qualname independently).
pub fn overrides_needles(functions: &[FunctionFact]) -> impl Iterator<Item = Needle> + '_ {
    let by_name = functions.iter().filter_map(|func| {
        let target = func.override_of.as_ref()?;
        let name = target.name.as_deref()?;
        Some(Needle::text(NeedleTag::Overrides, name, func.span))
    });
    let by_qualname = functions.iter().filter_map(|func| {
        let target = func.override_of.as_ref()?;
        let qualname = target.qualname.as_deref()?;
        Some(Needle::text(NeedleTag::Overrides, qualname, func.span))
    });
    by_name.chain(by_qualname)
}

/// `c-overridden` needles at the override target's own recorded span, one
/// per key, valued with the overriding function's name/qualname.
///
/// The qualname pass needs the overriding function's qualname; a function
/// without one yields no needle for that key.
pub fn overridden_needles(functions: &[FunctionFact]) -> impl Iterator<Item = Needle> + '_ {
    let by_name = functions.iter().filter_map(|func| {
        let target = func.override_of.as_ref()?;
        target.name.as_deref()?;
        Some(Needle::text(
            NeedleTag::Overridden,
            func.ident.name.clone(),
            target.span,
        ))
    });
    let by_qualname = functions.iter().filter_map(|func| {
        let target = func.override_of.as_ref()?;
        target.qualname.as_deref()?;
        let Some(qualname) = func.ident.qualname.as_deref() else {
            trace!(
                function = %func.ident.name,
                "overriding function has no qualname, skipping c-overridden needle"
            );
            return None;
        };
        Some(Needle::text(NeedleTag::Overridden, qualname, target.span))
    });
    by_name.chain(by_qualname)
}

// ============================================================================
// Signature and Warning Generators
// ============================================================================

/// `c-sig` needles: the textual type signature at each function's span.
pub fn sig_needles(functions: &[FunctionFact]) -> impl Iterator<Item = Needle> + '_ {
    functions.iter().filter_map(|func| {
        let Some(signature) = func.signature.as_deref() else {
            trace!(function = %func.ident.name, "function fact has no signature, skipping c-sig needle");
            return None;
        };
        Some(Needle::text(NeedleTag::Sig, signature, func.span))
    })
}

/// `c_warning` needles: the warning message at the warning's span.
pub fn warning_needles(warnings: &[WarningFact]) -> impl Iterator<Item = Needle> + '_ {
    warnings
        .iter()
        .map(|w| Needle::text(NeedleTag::Warning, w.message.clone(), w.span))
}

/// `c_warning_opt` needles: the triggering compiler option at the warning's
/// span. Warnings without a recorded option are skipped.
pub fn warning_opt_needles(warnings: &[WarningFact]) -> impl Iterator<Item = Needle> + '_ {
    warnings.iter().filter_map(|w| {
        w.option
            .as_deref()
            .map(|opt| Needle::text(NeedleTag::WarningOpt, opt, w.span))
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use needlecast_core::facts::{CallSite, OverrideTarget, ScopeRef, SymbolFact};

    fn ident(name: &str, qualname: &str) -> Ident {
        Ident::new(name).with_qualname(qualname)
    }

    mod qualified {
        use super::*;

        #[test]
        fn one_needle_per_fact_with_own_span() {
            let functions = vec![
                FunctionFact::new(ident("foo", "ns::foo"), Span::new(10, 13)),
                FunctionFact::new(Ident::new("bar"), Span::new(20, 23)),
            ];
            let needles: Vec<Needle> =
                qualified_needles(&functions, NeedleTag::Function).collect();
            assert_eq!(needles.len(), 2);
            assert_eq!(needles[0].tag, NeedleTag::Function);
            assert_eq!(needles[0].span, Span::new(10, 13));
            assert_eq!(
                needles[0].value,
                NeedleValue::Symbol {
                    name: "foo".into(),
                    qualname: Some("ns::foo".into()),
                }
            );
            assert_eq!(
                needles[1].value,
                NeedleValue::Symbol {
                    name: "bar".into(),
                    qualname: None,
                }
            );
        }

        #[test]
        fn alternate_table_keeps_requested_tag() {
            // The typedef table is indexed under the type tag.
            let typedefs = vec![SymbolFact::new(ident("size_t", "::size_t"), Span::new(0, 6))];
            let needles: Vec<Needle> = qualified_needles(&typedefs, NeedleTag::Type).collect();
            assert_eq!(needles[0].tag, NeedleTag::Type);
        }
    }

    mod refs {
        use super::*;

        #[test]
        fn filters_by_target_kind() {
            let refs = vec![
                RefFact::new(ident("foo", "ns::foo"), Span::new(0, 3), EntityKind::Function),
                RefFact::new(ident("T", "ns::T"), Span::new(5, 6), EntityKind::Type),
                RefFact::new(ident("bar", "ns::bar"), Span::new(8, 11), EntityKind::Function),
            ];
            let needles: Vec<Needle> =
                ref_needles(&refs, NeedleTag::FunctionRef, EntityKind::Function).collect();
            assert_eq!(needles.len(), 2);
            assert!(needles.iter().all(|n| n.tag == NeedleTag::FunctionRef));
            // Use-site spans, not declaration spans.
            assert_eq!(needles[0].span, Span::new(0, 3));
            assert_eq!(needles[1].span, Span::new(8, 11));
        }

        #[test]
        fn no_matches_yields_nothing() {
            let refs = vec![RefFact::new(
                Ident::new("v"),
                Span::new(0, 1),
                EntityKind::Variable,
            )];
            assert_eq!(
                ref_needles(&refs, NeedleTag::NamespaceRef, EntityKind::Namespace).count(),
                0
            );
        }
    }

    mod call_graph {
        use super::*;

        #[test]
        fn callee_at_caller_span_called_by_at_callee_span() {
            let edge = CallEdge::new(
                CallSite::new("A", Span::new(0, 1)),
                CallSite::new("B", Span::new(2, 3)),
            );
            let graph = vec![edge];

            let callee: Vec<Needle> = callee_needles(&graph).collect();
            assert_eq!(callee.len(), 1);
            assert_eq!(callee[0].tag, NeedleTag::Callee);
            assert_eq!(callee[0].value, NeedleValue::Text("B".into()));
            assert_eq!(callee[0].span, Span::new(0, 1));

            let called_by: Vec<Needle> = called_by_needles(&graph).collect();
            assert_eq!(called_by[0].tag, NeedleTag::CalledBy);
            assert_eq!(called_by[0].value, NeedleValue::Text("A".into()));
            assert_eq!(called_by[0].span, Span::new(2, 3));
        }
    }

    mod inheritance {
        use super::*;

        fn class(name: &str, span: Span) -> TypeFact {
            TypeFact::new(Ident::new(name), span, TypeKind::Class)
        }

        #[test]
        fn child_needles_at_parent_span() {
            let mut store = FactStore::new();
            store.types.push(class("Base", Span::new(0, 4)));
            let mut inherit = InheritanceMap::new();
            inherit.insert("Base", "Derived");

            let needles: Vec<Needle> = child_needles(&store, &inherit).collect();
            assert_eq!(needles.len(), 1);
            assert_eq!(needles[0].tag, NeedleTag::Child);
            assert_eq!(needles[0].value, NeedleValue::Text("Derived".into()));
            assert_eq!(needles[0].span, Span::new(0, 4));
        }

        #[test]
        fn parent_needles_at_child_span() {
            let mut store = FactStore::new();
            store.types.push(class("Derived", Span::new(6, 13)));
            let mut inherit = InheritanceMap::new();
            inherit.insert("Base", "Derived");

            let needles: Vec<Needle> = parent_needles(&store, &inherit).collect();
            assert_eq!(needles.len(), 1);
            assert_eq!(needles[0].tag, NeedleTag::Parent);
            assert_eq!(needles[0].value, NeedleValue::Text("Base".into()));
            assert_eq!(needles[0].span, Span::new(6, 13));
        }

        #[test]
        fn non_class_types_do_not_inherit() {
            let mut store = FactStore::new();
            store
                .types
                .push(TypeFact::new(Ident::new("Base"), Span::new(0, 4), TypeKind::Enum));
            let mut inherit = InheritanceMap::new();
            inherit.insert("Base", "Derived");
            assert_eq!(child_needles(&store, &inherit).count(), 0);
        }

        #[test]
        fn unknown_class_yields_nothing() {
            let mut store = FactStore::new();
            store.types.push(class("Loner", Span::new(0, 5)));
            let inherit = InheritanceMap::new();
            assert_eq!(child_needles(&store, &inherit).count(), 0);
            assert_eq!(parent_needles(&store, &inherit).count(), 0);
        }
    }

    mod members {
        use super::*;

        #[test]
        fn scope_carrying_facts_of_any_kind() {
            let mut store = FactStore::new();
            store.functions.push(
                FunctionFact::new(Ident::new("draw"), Span::new(0, 4))
                    .with_scope(ScopeRef::new("Widget")),
            );
            store.variables.push(
                SymbolFact::new(Ident::new("count"), Span::new(6, 11))
                    .with_scope(ScopeRef::new("Widget")),
            );
            store
                .variables
                .push(SymbolFact::new(Ident::new("global"), Span::new(13, 19)));

            let needles: Vec<Needle> = member_needles(&store).collect();
            assert_eq!(needles.len(), 2);
            assert!(needles
                .iter()
                .all(|n| n.value == NeedleValue::Text("Widget".into())));
            assert_eq!(needles[0].span, Span::new(0, 4));
            assert_eq!(needles[1].span, Span::new(6, 11));
        }
    }

    mod overrides {
        use super::*;

        fn overriding_function() -> FunctionFact {
            FunctionFact::new(ident("f", "Derived::f"), Span::new(30, 31)).with_override(
                OverrideTarget {
                    name: Some("f".into()),
                    qualname: Some("Base::f".into()),
                    span: Span::new(10, 11),
                },
            )
        }

        #[test]
        fn overrides_at_overriding_span_per_key() {
            let functions = vec![overriding_function()];
            let needles: Vec<Needle> = overrides_needles(&functions).collect();
            assert_eq!(needles.len(), 2);
            assert_eq!(needles[0].value, NeedleValue::Text("f".into()));
            assert_eq!(needles[1].value, NeedleValue::Text("Base::f".into()));
            assert!(needles.iter().all(|n| n.span == Span::new(30, 31)));
        }

        #[test]
        fn overridden_at_target_span_with_overriding_names() {
            let functions = vec![overriding_function()];
            let needles: Vec<Needle> = overridden_needles(&functions).collect();
            assert_eq!(needles.len(), 2);
            assert_eq!(needles[0].value, NeedleValue::Text("f".into()));
            assert_eq!(needles[1].value, NeedleValue::Text("Derived::f".into()));
            assert!(needles.iter().all(|n| n.span == Span::new(10, 11)));
        }

        #[test]
        fn missing_target_key_skips_that_key_only() {
            let functions = vec![FunctionFact::new(ident("f", "D::f"), Span::new(0, 1))
                .with_override(OverrideTarget {
                    name: Some("f".into()),
                    qualname: None,
                    span: Span::new(5, 6),
                })];
            assert_eq!(overrides_needles(&functions).count(), 1);
            assert_eq!(overridden_needles(&functions).count(), 1);
        }

        #[test]
        fn no_override_attribute_yields_nothing() {
            let functions = vec![FunctionFact::new(Ident::new("plain"), Span::new(0, 5))];
            assert_eq!(overrides_needles(&functions).count(), 0);
            assert_eq!(overridden_needles(&functions).count(), 0);
        }

        #[test]
        fn target_without_any_key_yields_nothing() {
            let functions = vec![FunctionFact::new(Ident::new("f"), Span::new(0, 1))
                .with_override(OverrideTarget {
                    name: None,
                    qualname: None,
                    span: Span::new(5, 6),
                })];
            assert_eq!(overrides_needles(&functions).count(), 0);
            assert_eq!(overridden_needles(&functions).count(), 0);
        }
    }

    mod signatures_and_warnings {
        use super::*;

        #[test]
        fn sig_needle_carries_type_signature() {
            let functions = vec![
                FunctionFact::new(Ident::new("f"), Span::new(0, 1)).with_signature("int(char)"),
                FunctionFact::new(Ident::new("g"), Span::new(2, 3)),
            ];
            let needles: Vec<Needle> = sig_needles(&functions).collect();
            assert_eq!(needles.len(), 1);
            assert_eq!(needles[0].tag, NeedleTag::Sig);
            assert_eq!(needles[0].value, NeedleValue::Text("int(char)".into()));
        }

        #[test]
        fn warning_and_option_needles_share_span() {
            let warnings =
                vec![WarningFact::new("unused", Span::new(20, 25)).with_option("-Wunused")];
            let msg: Vec<Needle> = warning_needles(&warnings).collect();
            let opt: Vec<Needle> = warning_opt_needles(&warnings).collect();
            assert_eq!(msg[0].value, NeedleValue::Text("unused".into()));
            assert_eq!(opt[0].value, NeedleValue::Text("-Wunused".into()));
            assert_eq!(msg[0].span, opt[0].span);
        }

        #[test]
        fn warning_without_option_skips_opt_needle() {
            let warnings = vec![WarningFact::new("deprecated", Span::new(0, 10))];
            assert_eq!(warning_needles(&warnings).count(), 1);
            assert_eq!(warning_opt_needles(&warnings).count(), 0);
        }
    }

    mod tags {
        use super::*;

        #[test]
        fn tag_strings_are_stable() {
            assert_eq!(NeedleTag::Function.as_str(), "c_function");
            assert_eq!(NeedleTag::NamespaceAliasRef.as_str(), "c_namespace_alias_ref");
            assert_eq!(NeedleTag::Callee.as_str(), "c-callee");
            assert_eq!(NeedleTag::CalledBy.as_str(), "c-called-by");
            assert_eq!(NeedleTag::WarningOpt.as_str(), "c_warning_opt");
        }

        #[test]
        fn needle_serializes_with_tag_string_and_flat_value() {
            let needle = Needle::symbol(
                NeedleTag::Function,
                &ident("foo", "ns::foo"),
                Span::new(10, 13),
            );
            let json = serde_json::to_value(&needle).unwrap();
            assert_eq!(json["tag"], "c_function");
            assert_eq!(json["value"]["name"], "foo");
            assert_eq!(json["value"]["qualname"], "ns::foo");

            let scalar = Needle::text(NeedleTag::Warning, "unused", Span::new(0, 1));
            let json = serde_json::to_value(&scalar).unwrap();
            assert_eq!(json["value"], "unused");
        }
    }
}
