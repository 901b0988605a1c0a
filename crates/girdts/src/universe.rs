//! Immutable snapshot of every loaded module plus the global symbol table
//!
//! Built once after loading finishes and before any module is flattened;
//! every later stage receives it by shared reference.

use crate::{
    diagnostics::Diagnostics,
    gir::{Alias, ClassLike, Enumeration, Function, NodeId, Variable},
    module::GirModule,
    symbol_table::{EntityKind, EntityRef, ModuleId, SymbolTable, SymbolTableBuilder},
};

/// Typed view of a symbol table entry
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Class(&'a ClassLike),
    Enumeration(&'a Enumeration),
    Callback(&'a Function),
    Function(&'a Function),
    Constant(&'a Variable),
    Alias(&'a Alias),
}

/// A class-like entity together with its owning module
#[derive(Debug, Clone)]
pub struct ClassRef<'a> {
    pub module_id: ModuleId,
    pub module: &'a GirModule,
    pub class: &'a ClassLike,
    /// `{module}.{name}`
    pub full_name: String,
}

impl ClassRef<'_> {
    pub fn name(&self) -> &str {
        &self.class.name
    }

    /// Raw parent reference qualified with the owning module
    pub fn qualified_parent(&self) -> Option<String> {
        self.class
            .parent
            .as_deref()
            .map(|parent| self.module.qualify(parent))
    }
}

impl PartialEq for ClassRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
    }
}

#[derive(Debug)]
pub struct Universe {
    modules: Vec<GirModule>,
    symbols: SymbolTable,
}

impl Universe {
    /// Load the types of every module, in order, into one symbol table
    pub fn build(modules: Vec<GirModule>, diagnostics: &Diagnostics) -> Self {
        let mut builder = SymbolTableBuilder::new();
        for (index, module) in modules.iter().enumerate() {
            builder.load_types(ModuleId::new(index), module, diagnostics);
        }
        Self {
            modules,
            symbols: builder.build(),
        }
    }

    pub fn modules(&self) -> &[GirModule] {
        &self.modules
    }

    pub fn module(&self, id: ModuleId) -> &GirModule {
        &self.modules[id.index()]
    }

    pub fn module_ids(&self) -> impl Iterator<Item = ModuleId> {
        (0..self.modules.len()).map(ModuleId::new)
    }

    pub fn find_module(&self, package_name: &str) -> Option<ModuleId> {
        self.modules
            .iter()
            .position(|module| module.package_name == package_name)
            .map(ModuleId::new)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Module a node was declared in, if it was annotated
    pub fn declaring_module(&self, id: Option<NodeId>) -> Option<&GirModule> {
        id.and_then(|id| self.symbols.module_of(id))
            .map(|module| self.module(module))
    }

    pub fn entity(&self, entity: EntityRef) -> Option<Entity<'_>> {
        let ns = &self.module(entity.module).namespace;
        let index = entity.index;

        if let Some(kind) = entity.kind.class_kind() {
            return ns.class_likes(kind).get(index).map(Entity::Class);
        }

        match entity.kind {
            EntityKind::Bitfield => ns.bitfields.get(index).map(Entity::Enumeration),
            EntityKind::Enumeration => ns.enumerations.get(index).map(Entity::Enumeration),
            EntityKind::Callback => ns.callbacks.get(index).map(Entity::Callback),
            EntityKind::Function => ns.functions.get(index).map(Entity::Function),
            EntityKind::Constant => ns.constants.get(index).map(Entity::Constant),
            EntityKind::Alias => ns.aliases.get(index).map(Entity::Alias),
            EntityKind::Class | EntityKind::Interface | EntityKind::Record | EntityKind::Union => {
                None
            }
        }
    }

    pub fn lookup(&self, full_name: &str) -> Option<Entity<'_>> {
        self.symbols
            .get(full_name)
            .and_then(|entity| self.entity(entity))
    }

    /// Class, interface, record or union registered under `full_name`
    pub fn lookup_class(&self, full_name: &str) -> Option<ClassRef<'_>> {
        let entity = self.symbols.get(full_name)?;
        match self.entity(entity)? {
            Entity::Class(class) => Some(ClassRef {
                module_id: entity.module,
                module: self.module(entity.module),
                class,
                full_name: full_name.to_owned(),
            }),
            _ => None,
        }
    }

    /// Wrap a class-like declared in `module_id`, registered or not
    pub fn class_ref<'a>(&'a self, module_id: ModuleId, class: &'a ClassLike) -> ClassRef<'a> {
        let module = self.module(module_id);
        ClassRef {
            module_id,
            module,
            class,
            full_name: format!("{}.{}", module.name, class.name),
        }
    }
}
