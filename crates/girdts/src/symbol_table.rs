//! Global symbol table and node side-table
//!
//! The builder walks each module's namespace once and produces two maps:
//! fully qualified entity names to entity references, and GIR node ids to
//! their owning module (plus fully qualified name where one exists). The
//! second map replaces writing back-references onto the parse tree: any
//! later stage can ask which module a typed node was declared in.

use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use log::debug;
use rustc_hash::{FxHashMap, FxHasher};

use crate::{
    diagnostics::{DiagnosticKind, Diagnostics},
    gir::{ClassKind, ClassLike, Function, Namespace, NodeId, TypeRef, Variable},
    module::GirModule,
};

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Index of a module inside the loaded module list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);

impl ModuleId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Namespace-level entity kinds, in symbol loading order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Bitfield,
    Callback,
    Class,
    Constant,
    Enumeration,
    Function,
    Interface,
    Record,
    Union,
    Alias,
}

impl EntityKind {
    pub const LOAD_ORDER: [Self; 10] = [
        Self::Bitfield,
        Self::Callback,
        Self::Class,
        Self::Constant,
        Self::Enumeration,
        Self::Function,
        Self::Interface,
        Self::Record,
        Self::Union,
        Self::Alias,
    ];

    pub const fn class_kind(self) -> Option<ClassKind> {
        match self {
            Self::Class => Some(ClassKind::Class),
            Self::Interface => Some(ClassKind::Interface),
            Self::Record => Some(ClassKind::Record),
            Self::Union => Some(ClassKind::Union),
            _ => None,
        }
    }
}

impl From<ClassKind> for EntityKind {
    fn from(kind: ClassKind) -> Self {
        match kind {
            ClassKind::Class => Self::Class,
            ClassKind::Interface => Self::Interface,
            ClassKind::Record => Self::Record,
            ClassKind::Union => Self::Union,
        }
    }
}

/// Position of an entity: module, kind and index in that kind's sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub module: ModuleId,
    pub kind: EntityKind,
    pub index: usize,
}

/// Side-table entry of one GIR node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub module: ModuleId,
    /// `{owner}.{name}`; absent for unnamed nodes such as return values
    pub full_name: Option<String>,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: FxIndexMap<String, EntityRef>,
    annotations: FxHashMap<NodeId, Annotation>,
}

impl SymbolTable {
    pub fn get(&self, full_name: &str) -> Option<EntityRef> {
        self.symbols.get(full_name).copied()
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.symbols.contains_key(full_name)
    }

    pub fn annotation(&self, id: NodeId) -> Option<&Annotation> {
        self.annotations.get(&id)
    }

    /// Module a node was declared in
    pub fn module_of(&self, id: NodeId) -> Option<ModuleId> {
        self.annotations.get(&id).map(|annotation| annotation.module)
    }

    pub fn full_name_of(&self, id: NodeId) -> Option<&str> {
        self.annotations
            .get(&id)
            .and_then(|annotation| annotation.full_name.as_deref())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, EntityRef)> {
        self.symbols
            .iter()
            .map(|(name, entity)| (name.as_str(), *entity))
    }
}

/// Accumulates the symbol table module by module
#[derive(Debug, Default)]
pub struct SymbolTableBuilder {
    table: SymbolTable,
}

impl SymbolTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every introspectable entity of `module` and annotate its nodes
    pub fn load_types(&mut self, id: ModuleId, module: &GirModule, diagnostics: &Diagnostics) {
        let ns = &module.namespace;

        for kind in EntityKind::LOAD_ORDER {
            for (index, (name, introspectable)) in entity_names(ns, kind).into_iter().enumerate() {
                if name.is_empty() {
                    continue;
                }
                if !introspectable {
                    debug!("Skipping non-introspectable {}.{}", module.name, name);
                    continue;
                }

                let full_name = format!("{}.{}", module.name, name);
                let entity = EntityRef {
                    module: id,
                    kind,
                    index,
                };
                if self.table.symbols.insert(full_name.clone(), entity).is_some() {
                    diagnostics.report(
                        DiagnosticKind::DuplicateSymbol,
                        &module.package_name,
                        format!("Duplicate symbol: {full_name}"),
                    );
                }
            }
        }

        let mut annotator = Annotator {
            module: id,
            annotations: &mut self.table.annotations,
        };
        annotator.namespace(&module.name, ns);
    }

    pub fn build(self) -> SymbolTable {
        self.table
    }
}

/// `(name, introspectable)` of every entity of `kind`, in declaration order
fn entity_names(ns: &Namespace, kind: EntityKind) -> Vec<(&str, bool)> {
    if let Some(class_kind) = kind.class_kind() {
        return ns
            .class_likes(class_kind)
            .iter()
            .map(|class| (class.name.as_str(), class.introspectable))
            .collect();
    }

    match kind {
        EntityKind::Bitfield | EntityKind::Enumeration => {
            let list = if kind == EntityKind::Bitfield {
                &ns.bitfields
            } else {
                &ns.enumerations
            };
            list.iter()
                .map(|enumeration| (enumeration.name.as_str(), enumeration.introspectable))
                .collect()
        }
        EntityKind::Callback => function_names(&ns.callbacks),
        EntityKind::Function => function_names(&ns.functions),
        // Unnamed constants keep their slot so indices stay aligned
        EntityKind::Constant => ns
            .constants
            .iter()
            .map(|constant| (constant.name.as_deref().unwrap_or_default(), constant.introspectable))
            .collect(),
        EntityKind::Alias => ns
            .aliases
            .iter()
            .map(|alias| (alias.name.as_str(), alias.introspectable))
            .collect(),
        EntityKind::Class | EntityKind::Interface | EntityKind::Record | EntityKind::Union => {
            Vec::new()
        }
    }
}

fn function_names(list: &[Function]) -> Vec<(&str, bool)> {
    list.iter()
        .map(|function| (function.name.as_str(), function.introspectable))
        .collect()
}

struct Annotator<'t> {
    module: ModuleId,
    annotations: &'t mut FxHashMap<NodeId, Annotation>,
}

impl Annotator<'_> {
    fn stamp(&mut self, id: NodeId, full_name: Option<String>) {
        self.annotations.insert(
            id,
            Annotation {
                module: self.module,
                full_name,
            },
        );
    }

    fn namespace(&mut self, module_name: &str, ns: &Namespace) {
        for kind in ClassKind::ALL {
            for class in ns.class_likes(kind) {
                self.class_like(module_name, class);
            }
        }
        for enumeration in ns.enumerations.iter().chain(&ns.bitfields) {
            self.stamp(enumeration.id, Some(format!("{module_name}.{}", enumeration.name)));
        }
        for function in ns.functions.iter().chain(&ns.callbacks) {
            self.function(module_name, function);
        }
        for constant in &ns.constants {
            self.variable(module_name, constant);
        }
        for alias in &ns.aliases {
            self.stamp(alias.id, Some(format!("{module_name}.{}", alias.name)));
            self.variable(module_name, &alias.target);
        }
    }

    fn class_like(&mut self, module_name: &str, class: &ClassLike) {
        let owner = format!("{module_name}.{}", class.name);

        for function in class
            .constructors
            .iter()
            .chain(&class.functions)
            .chain(&class.methods)
            .chain(&class.virtual_methods)
            .chain(&class.signals)
        {
            self.function(&owner, function);
        }
        for variable in class.properties.iter().chain(&class.fields) {
            self.variable(&owner, variable);
        }

        self.stamp(class.id, Some(owner));
    }

    fn function(&mut self, owner: &str, function: &Function) {
        let full_name = format!("{owner}.{}", function.name);
        for parameter in &function.parameters {
            self.variable(&full_name, parameter);
        }
        if let Some(return_value) = &function.return_value {
            self.variable(&full_name, return_value);
        }
        self.stamp(function.id, Some(full_name));
    }

    fn variable(&mut self, owner: &str, variable: &Variable) {
        let full_name = variable
            .name
            .as_ref()
            .map(|name| format!("{owner}.{name}"));

        if let Some(TypeRef::Callback(callback)) = &variable.ty {
            let callback_owner = full_name.as_deref().unwrap_or(owner);
            self.function(callback_owner, callback);
        }
        if let Some(id) = variable.id {
            self.stamp(id, full_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{config::Environment, gir::NodeIdGen, naming::Transformation};

    fn module(source: &str, ids: &mut NodeIdGen) -> GirModule {
        GirModule::parse(
            source,
            Path::new("test.gir"),
            ids,
            &Transformation::new(Environment::Gjs),
        )
        .expect("valid module")
    }

    const ZOO: &str = r#"<repository>
  <namespace name="Zoo" version="1.0">
    <class name="Animal">
      <method name="feed">
        <parameters><parameter name="food"><type name="Food"/></parameter></parameters>
      </method>
      <property name="name"><type name="utf8"/></property>
    </class>
    <class name="Ghost" introspectable="0"/>
    <record name="Food"/>
    <record name="Food"/>
    <enumeration name="Kind"/>
    <constant name="LEGS"><type name="gint"/></constant>
    <function name="init"/>
  </namespace>
</repository>"#;

    #[test]
    fn test_symbols_and_duplicates() {
        let mut ids = NodeIdGen::new();
        let zoo = module(ZOO, &mut ids);
        let diagnostics = Diagnostics::new(Environment::Gjs);

        let mut builder = SymbolTableBuilder::new();
        builder.load_types(ModuleId::new(0), &zoo, &diagnostics);
        let table = builder.build();

        let names: Vec<_> = table.iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec!["Zoo.Animal", "Zoo.LEGS", "Zoo.Kind", "Zoo.init", "Zoo.Food"]
        );
        assert!(!table.contains("Zoo.Ghost"));
        assert_eq!(diagnostics.count(DiagnosticKind::DuplicateSymbol), 1);

        // Last write wins
        let food = table.get("Zoo.Food").expect("record");
        assert_eq!(food.kind, EntityKind::Record);
        assert_eq!(food.index, 1);
    }

    #[test]
    fn test_parameter_annotations() {
        let mut ids = NodeIdGen::new();
        let zoo = module(ZOO, &mut ids);
        let diagnostics = Diagnostics::new(Environment::Gjs);

        let mut builder = SymbolTableBuilder::new();
        builder.load_types(ModuleId::new(3), &zoo, &diagnostics);
        let table = builder.build();

        let animal = &zoo.namespace.classes[0];
        let food = &animal.methods[0].parameters[0];
        let id = food.id.expect("parameter id");

        assert_eq!(table.full_name_of(id), Some("Zoo.Animal.feed.food"));
        assert_eq!(table.module_of(id), Some(ModuleId::new(3)));
        assert_eq!(
            table.full_name_of(animal.properties[0].id.expect("id")),
            Some("Zoo.Animal.name")
        );

        // Non-introspectable entities are still annotated
        assert_eq!(
            table.full_name_of(zoo.namespace.classes[1].id),
            Some("Zoo.Ghost")
        );
    }
}
