//! Same-named members contributed by a class, its ancestors and interfaces
//!
//! Accumulation is a fold over `(member, forced)` pairs: members declared at
//! the level being rendered are forced, members inherited from further up
//! only add a signature when it is structurally new. A name whose signature
//! list diverges from what an ancestor already provides must be declared
//! explicitly at this level.

use std::hash::BuildHasherDefault;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;

use crate::{
    inheritance::{InheritanceWalker, InterfaceOptions},
    members::MemberDecl,
    universe::ClassRef,
};

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

#[derive(Debug, Clone, Copy, Default)]
pub struct AccumulateOptions {
    /// Treat every contribution as declared at this level
    pub force_all: bool,
    /// Static side: interfaces contribute nothing
    pub statics: bool,
}

/// Signature lists per member name plus the names needing explicit declaration
///
/// The explicit set matters to emitters that rely on `extends` for inherited
/// members. Flattened declarations repeat every signature, so
/// [`ClassFlattener`](crate::flatten::ClassFlattener) only reads [`Accumulation::iter`].
#[derive(Debug, Clone, Default)]
pub struct Accumulation {
    members: FxIndexMap<String, Vec<MemberDecl>>,
    explicit: FxIndexSet<String>,
}

impl Accumulation {
    /// Fold one member in
    ///
    /// Structurally identical signatures collapse. A forced member always
    /// makes its name explicit; an inherited one only when it adds a
    /// distinct signature to a name that already had one.
    #[must_use]
    pub fn merge(mut self, member: MemberDecl, force: bool) -> Self {
        let signatures = self.members.entry(member.name.clone()).or_default();
        let known = !signatures.is_empty();
        let duplicate = signatures
            .iter()
            .any(|existing| existing.erased == member.erased);

        if force || (known && !duplicate) {
            self.explicit.insert(member.name.clone());
        }
        if !duplicate {
            signatures.push(member);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&[MemberDecl]> {
        self.members.get(name).map(Vec::as_slice)
    }

    pub fn is_explicit(&self, name: &str) -> bool {
        self.explicit.contains(name)
    }

    pub fn explicit(&self) -> impl Iterator<Item = &str> {
        self.explicit.iter().map(String::as_str)
    }

    /// Every accumulated signature, grouped by name in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MemberDecl])> {
        self.members
            .iter()
            .map(|(name, signatures)| (name.as_str(), signatures.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

const INTERFACE_WALK: InterfaceOptions = InterfaceOptions {
    recurse_into_classes: false,
    dedupe: true,
};

#[derive(Debug, Clone, Copy)]
pub struct OverloadAccumulator<'w, 'a> {
    walker: &'w InheritanceWalker<'a>,
}

impl<'w, 'a> OverloadAccumulator<'w, 'a> {
    pub fn new(walker: &'w InheritanceWalker<'a>) -> Self {
        Self { walker }
    }

    /// Accumulate the members `extract` yields for `ancestry[0]` and everything it inherits
    ///
    /// `ancestry` is the entity followed by its ancestors, as returned by
    /// [`InheritanceWalker::ancestry`].
    pub fn accumulate<F>(
        &self,
        ancestry: &[ClassRef<'a>],
        extract: F,
        options: AccumulateOptions,
    ) -> Accumulation
    where
        F: Fn(&ClassRef<'a>) -> Vec<MemberDecl>,
    {
        let Some((entity, ancestors)) = ancestry.split_first() else {
            return Accumulation::default();
        };
        let merge_all = |accumulation: Accumulation, members: Vec<MemberDecl>, force: bool| {
            members.into_iter().fold(accumulation, |accumulation, member| {
                accumulation.merge(member, force || options.force_all)
            })
        };

        let mut accumulation = merge_all(Accumulation::default(), extract(entity), true);

        if !options.statics {
            let inherited = self.inherited_interfaces(ancestors);
            for interface in self.walker.interfaces(entity, INTERFACE_WALK) {
                if inherited.contains(&interface.full_name) {
                    continue;
                }
                accumulation = merge_all(accumulation, extract(&interface), true);
            }
        }

        for ancestor in ancestors {
            accumulation = merge_all(accumulation, extract(ancestor), false);
            if options.statics {
                continue;
            }
            for interface in self.walker.interfaces(ancestor, INTERFACE_WALK) {
                accumulation = merge_all(accumulation, extract(&interface), false);
            }
        }

        accumulation
    }

    /// Interfaces already implemented somewhere along the ancestor chain
    fn inherited_interfaces(&self, ancestors: &[ClassRef<'a>]) -> FxIndexSet<String> {
        ancestors
            .iter()
            .flat_map(|ancestor| self.walker.interfaces(ancestor, INTERFACE_WALK))
            .map(|interface| interface.full_name)
            .collect()
    }
}
