//! Flattened declaration of one class-like entity
//!
//! Generated declarations do not use `extends`; every member reachable
//! through the ancestor chain and the implemented interfaces is written
//! into the entity's own body. Names are claimed first come first served
//! across properties, fields, methods and virtual methods.

use rustc_hash::FxHashSet;

use crate::{
    gir::{ClassKind, Function},
    inheritance::{InheritanceWalker, InterfaceOptions},
    members::{FunctionStyle, MemberDecl, MemberRenderer, Rendered},
    overloads::{AccumulateOptions, Accumulation, OverloadAccumulator},
    overrides::OverrideTable,
    templates,
    type_resolver::TypeResolver,
    universe::ClassRef,
};

/// Classes whose native type already carries a static `name`
pub const STATIC_NAME_ALREADY_EXISTS: &[&str] = &["GMime.Charset", "Camel.StoreInfo"];

const INDENT: &str = "    ";
const STATIC_PREFIX: &str = "    static ";
const VFUNC_PREFIX: &str = "vfunc_";
const CONSTRUCTOR_NAME: &str = "new";

const INTERFACE_WALK: InterfaceOptions = InterfaceOptions {
    recurse_into_classes: false,
    dedupe: true,
};

/// Names computed once per entity
#[derive(Debug)]
struct ClassNames {
    /// Transformed short name
    name: String,
    full_name: String,
    /// Parent as seen from the rendering module, e.g. `Widget` or `Gtk.Widget`
    parent_local: Option<String>,
}

/// Names claimed by members already written into the body
#[derive(Debug, Default)]
struct LocalNames(FxHashSet<String>);

impl LocalNames {
    fn claim(&mut self, name: &str) -> bool {
        self.0.insert(name.to_owned())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClassFlattener<'a> {
    renderer: MemberRenderer<'a>,
    walker: InheritanceWalker<'a>,
}

impl<'a> ClassFlattener<'a> {
    pub fn new(resolver: TypeResolver<'a>, overrides: &'a OverrideTable) -> Self {
        Self {
            renderer: MemberRenderer::new(resolver, overrides),
            walker: InheritanceWalker::new(resolver.universe(), resolver.diagnostics()),
        }
    }

    fn resolver(&self) -> &TypeResolver<'a> {
        self.renderer.resolver()
    }

    /// Full declaration of `class`, construct properties included
    pub fn flatten(&self, class: &ClassRef<'a>) -> Vec<String> {
        let ancestry = self.walker.ancestry(class);
        let interfaces = self.walker.interfaces(class, INTERFACE_WALK);
        let derived = InheritanceWalker::is_derived_from_root(&ancestry);
        let names = self.class_names(class, &ancestry);

        let mut def = Vec::new();
        if derived {
            def.extend(self.construct_props(class, &interfaces, &names));
        }

        let keyword = if class.class.gtype_struct_for.is_some() {
            "export abstract class"
        } else {
            "export class"
        };
        def.push(format!("{keyword} {} {{", names.name));

        let mut local_names = LocalNames::default();
        let has_fields = matches!(class.class.kind, ClassKind::Record | ClassKind::Union);
        if has_fields {
            self.fields(&ancestry[..1], &mut local_names, &mut def);
        }

        let notify_names = self.properties(&ancestry, &interfaces, &mut local_names, &mut def);
        if has_fields {
            self.fields(&ancestry[1..], &mut local_names, &mut def);
        }
        self.methods(&ancestry, &interfaces, &mut local_names, &mut def);
        self.virtual_methods(class, &ancestry, &mut local_names, &mut def);
        self.signals(&ancestry, &interfaces, &names, &mut def);

        let environment = self.resolver().environment();
        if derived {
            let prefix = if self.resolver().module().name == "GObject" {
                ""
            } else {
                "GObject."
            };
            for property in &notify_names {
                def.extend(templates::notify_signal_methods(
                    environment,
                    property,
                    &names.name,
                    prefix,
                ));
            }
            def.extend(templates::general_signal_methods(environment));
        }

        self.static_side(class, &ancestry, derived, &names, &mut def);
        def.push("}".to_owned());
        def
    }

    fn class_names(&self, class: &ClassRef<'a>, ancestry: &[ClassRef<'a>]) -> ClassNames {
        let module = self.resolver().module();
        ClassNames {
            name: self.resolver().transformation().class_name(class.name()),
            full_name: class.full_name.clone(),
            parent_local: ancestry
                .get(1)
                .map(|parent| module.local_name(&parent.full_name).to_owned()),
        }
    }

    /// `{Name}_ConstructProps`, extending the parent's shape
    fn construct_props(
        &self,
        class: &ClassRef<'a>,
        interfaces: &[ClassRef<'a>],
        names: &ClassNames,
    ) -> Vec<String> {
        let extends = names
            .parent_local
            .as_ref()
            .map(|parent| format!("extends {parent}_ConstructProps "))
            .unwrap_or_default();
        let mut def = vec![format!(
            "export interface {}_ConstructProps {extends}{{",
            names.name
        )];

        let mut seen = LocalNames::default();
        for source in std::iter::once(class).chain(interfaces) {
            for property in &source.class.properties {
                if let Some(property) = self.renderer.property(property, true) {
                    if seen.claim(&property.name) {
                        def.push(property.text);
                    }
                }
            }
        }

        def.push("}".to_owned());
        def
    }

    /// Properties of the ancestors and interfaces; returns the names for `notify::` handlers
    fn properties(
        &self,
        ancestry: &[ClassRef<'a>],
        interfaces: &[ClassRef<'a>],
        local_names: &mut LocalNames,
        def: &mut Vec<String>,
    ) -> Vec<String> {
        let mut notify_names = Vec::new();
        for source in ancestry.iter().chain(interfaces) {
            if source.class.properties.is_empty() {
                continue;
            }
            def.push(format!("{INDENT}/* Properties of {} */", source.full_name));
            for property in &source.class.properties {
                let Some(property) = self.renderer.property(property, false) else {
                    continue;
                };
                if local_names.claim(&property.name) {
                    def.push(property.text);
                    notify_names.push(property.notify_name);
                }
            }
        }
        notify_names
    }

    fn fields(&self, sources: &[ClassRef<'a>], local_names: &mut LocalNames, def: &mut Vec<String>) {
        for source in sources {
            if source.class.fields.is_empty() {
                continue;
            }
            def.push(format!("{INDENT}/* Fields of {} */", source.full_name));
            for field in &source.class.fields {
                if let Some(field) = self.renderer.field(field) {
                    if local_names.claim(&field.name) {
                        def.push(field.text);
                    }
                }
            }
        }
    }

    fn methods(
        &self,
        ancestry: &[ClassRef<'a>],
        interfaces: &[ClassRef<'a>],
        local_names: &mut LocalNames,
        def: &mut Vec<String>,
    ) {
        let style = FunctionStyle {
            prefix: INDENT,
            ..FunctionStyle::default()
        };
        for source in ancestry.iter().chain(interfaces) {
            if source.class.methods.is_empty() {
                continue;
            }
            def.push(format!("{INDENT}/* Methods of {} */", source.full_name));
            for method in &source.class.methods {
                match self.renderer.function(method, style) {
                    Rendered::Omitted => {}
                    Rendered::Replaced(line) => def.push(line),
                    Rendered::Member(member) => {
                        if local_names.claim(&member.name) {
                            def.push(member.text);
                        }
                    }
                }
            }
        }
    }

    /// `vfunc_` members, overload-accumulated and optional to call
    fn virtual_methods(
        &self,
        class: &ClassRef<'a>,
        ancestry: &[ClassRef<'a>],
        local_names: &mut LocalNames,
        def: &mut Vec<String>,
    ) {
        let style = FunctionStyle {
            prefix: INDENT,
            name_prefix: VFUNC_PREFIX,
            constructs: None,
        };
        let accumulation = OverloadAccumulator::new(&self.walker).accumulate(
            ancestry,
            |source| self.members(&source.class.virtual_methods, style),
            AccumulateOptions::default(),
        );
        if accumulation.is_empty() {
            return;
        }

        def.push(format!("{INDENT}/* Virtual methods of {} */", class.full_name));
        for (name, signatures) in accumulation.iter() {
            if !local_names.claim(name) {
                continue;
            }
            def.extend(
                signatures
                    .iter()
                    .map(|signature| signature.text.replacen('(', "?(", 1)),
            );
        }
    }

    fn signals(
        &self,
        ancestry: &[ClassRef<'a>],
        interfaces: &[ClassRef<'a>],
        names: &ClassNames,
        def: &mut Vec<String>,
    ) {
        for source in ancestry.iter().chain(interfaces) {
            if source.class.signals.is_empty() {
                continue;
            }
            def.push(format!("{INDENT}/* Signals of {} */", source.full_name));
            for signal in &source.class.signals {
                def.extend(self.renderer.signal(signal, &names.name));
            }
        }
    }

    fn static_side(
        &self,
        class: &ClassRef<'a>,
        ancestry: &[ClassRef<'a>],
        derived: bool,
        names: &ClassNames,
        def: &mut Vec<String>,
    ) {
        if !STATIC_NAME_ALREADY_EXISTS.contains(&names.full_name.as_str()) {
            def.push(format!("{STATIC_PREFIX}name: string"));
        }

        if derived {
            def.push(format!(
                "{INDENT}constructor (config?: {}_ConstructProps)",
                names.name
            ));
            def.push(format!(
                "{INDENT}_init (config?: {}_ConstructProps): void",
                names.name
            ));
        } else {
            for constructor in self.constructors(class) {
                if constructor.name != CONSTRUCTOR_NAME {
                    continue;
                }
                let js_style = constructor.text.replacen("static new", "constructor", 1);
                let js_style = match js_style.rfind(':') {
                    Some(colon) if colon + 1 < js_style.len() => js_style[..colon].to_owned(),
                    _ => js_style,
                };
                def.push(constructor.text);
                def.push(js_style);
            }
        }

        let function_style = FunctionStyle {
            prefix: STATIC_PREFIX,
            ..FunctionStyle::default()
        };
        for function in &class.class.functions {
            if let Rendered::Replaced(line) = self.renderer.function(function, function_style) {
                def.push(line);
            }
        }

        let statics = self.statics(ancestry);
        def.extend(
            statics
                .iter()
                .flat_map(|(_, signatures)| signatures.iter().map(|signature| signature.text.clone())),
        );

        if derived {
            let prefix = if self.resolver().module().package_name == "GObject-2.0" {
                ""
            } else {
                "GObject."
            };
            def.push(format!("{STATIC_PREFIX}$gtype: {prefix}Type"));
        }
    }

    /// Constructors of `source`, each returning `source` itself
    fn constructors(&self, source: &ClassRef<'a>) -> Vec<MemberDecl> {
        let returns = if source.module.name == self.resolver().module().name {
            self.resolver().transformation().class_name(source.name())
        } else {
            source.full_name.clone()
        };
        self.members(
            &source.class.constructors,
            FunctionStyle {
                prefix: STATIC_PREFIX,
                name_prefix: "",
                constructs: Some(&returns),
            },
        )
    }

    /// Constructors and class functions of the whole chain, overload-accumulated
    fn statics(&self, ancestry: &[ClassRef<'a>]) -> Accumulation {
        let function_style = FunctionStyle {
            prefix: STATIC_PREFIX,
            ..FunctionStyle::default()
        };
        OverloadAccumulator::new(&self.walker).accumulate(
            ancestry,
            |source| {
                let mut members = self.constructors(source);
                members.extend(
                    self.members(&source.class.functions, function_style)
                        .into_iter()
                        .filter(|member| member.name != CONSTRUCTOR_NAME),
                );
                members
            },
            AccumulateOptions {
                force_all: false,
                statics: true,
            },
        )
    }

    fn members(&self, functions: &[Function], style: FunctionStyle<'_>) -> Vec<MemberDecl> {
        functions
            .iter()
            .filter_map(|function| self.renderer.function(function, style).member())
            .collect()
    }
}
