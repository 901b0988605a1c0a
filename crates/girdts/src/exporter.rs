//! Declaration lines of one module's namespace
//!
//! Entities are emitted in a fixed order: enumerations, bitfields,
//! constants, functions, callbacks, interfaces, classes, records, unions and
//! aliases, each group in declaration order.

use log::debug;
use rustc_hash::FxHashSet;

use crate::{
    diagnostics::{DiagnosticKind, Diagnostics},
    flatten::ClassFlattener,
    gir::{ClassKind, Enumeration},
    members::{FunctionStyle, MemberRenderer, Rendered},
    module::GirModule,
    naming::Construct,
    overrides::OverrideTable,
    symbol_table::ModuleId,
    type_resolver::TypeResolver,
    universe::Universe,
    util::is_first_char_numeric,
};

/// `GType` is a plain object in GJS, not the numeric alias GIR declares
const GOBJECT_PACKAGE: &str = "GObject-2.0";
const GOBJECT_TYPE_ALIAS: &str = "Type";

/// Exports the namespace of one module
#[derive(Debug)]
pub struct ModuleExporter<'a> {
    universe: &'a Universe,
    module_id: ModuleId,
    module: &'a GirModule,
    resolver: TypeResolver<'a>,
    renderer: MemberRenderer<'a>,
    flattener: ClassFlattener<'a>,
}

impl<'a> ModuleExporter<'a> {
    pub fn new(
        universe: &'a Universe,
        module_id: ModuleId,
        diagnostics: &'a Diagnostics,
        overrides: &'a OverrideTable,
    ) -> Self {
        let module = universe.module(module_id);
        let resolver = TypeResolver::new(universe, module, diagnostics);
        Self {
            universe,
            module_id,
            module,
            resolver,
            renderer: MemberRenderer::new(resolver, overrides),
            flattener: ClassFlattener::new(resolver, overrides),
        }
    }

    /// Every declaration of the namespace, in emission order
    pub fn export(&self) -> Vec<String> {
        let ns = &self.module.namespace;
        let mut out = Vec::new();

        for enumeration in ns.enumerations.iter().chain(&ns.bitfields) {
            out.extend(self.enumeration(enumeration));
        }
        out.extend(self.constants());

        let function_style = FunctionStyle {
            prefix: "export function ",
            ..FunctionStyle::default()
        };
        for function in &ns.functions {
            match self.renderer.function(function, function_style) {
                Rendered::Omitted => {}
                Rendered::Replaced(line) => out.push(line),
                Rendered::Member(member) => out.push(member.text),
            }
        }
        for callback in &ns.callbacks {
            out.extend(self.renderer.callback(callback));
        }

        for kind in [
            ClassKind::Interface,
            ClassKind::Class,
            ClassKind::Record,
            ClassKind::Union,
        ] {
            for class in ns.class_likes(kind) {
                if !class.introspectable {
                    debug!("Skipping non-introspectable {}.{}", self.module.name, class.name);
                    continue;
                }
                let class = self.universe.class_ref(self.module_id, class);
                out.extend(self.flattener.flatten(&class));
            }
        }

        let is_gobject = self.module.package_name == GOBJECT_PACKAGE;
        for alias in &ns.aliases {
            if is_gobject && alias.name == GOBJECT_TYPE_ALIAS {
                continue;
            }
            out.extend(self.renderer.alias(alias));
        }
        if is_gobject {
            out.extend(["export interface Type {", "    name: string", "}"].map(str::to_owned));
        }

        out
    }

    /// `export enum`, members upper-cased; digit-leading members become comments
    pub fn enumeration(&self, enumeration: &Enumeration) -> Vec<String> {
        if !enumeration.introspectable {
            return Vec::new();
        }
        let transformation = self.resolver.transformation();
        let mut def = vec![format!(
            "export enum {} {{",
            transformation.enum_name(&enumeration.name)
        )];

        for member in &enumeration.members {
            let Some(name) = member.display_name() else {
                continue;
            };
            let name = transformation.transform(Construct::EnumValue, name);
            if is_first_char_numeric(&name) {
                def.push(format!("    /* {name} (invalid, starts with a number) */"));
            } else {
                def.push(format!("    {name},"));
            }
        }

        def.push("}".to_owned());
        def
    }

    /// Constants, each name exported once
    fn constants(&self) -> Vec<String> {
        let mut exported = FxHashSet::default();
        let mut out = Vec::new();

        for constant in &self.module.namespace.constants {
            let Some(line) = self.renderer.constant(constant) else {
                continue;
            };
            if exported.insert(line.name) {
                out.push(line.text);
            } else {
                self.resolver.diagnostics().report(
                    DiagnosticKind::DuplicateConstant,
                    &self.module.package_name,
                    format!("The constant '{}' has already been exported", line.text),
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        config::Environment,
        testing::{repository, universe},
    };

    const FARM: &str = r#"<enumeration name="Mood">
      <member name="happy"/>
      <member name="2d" glib:nick="2d"/>
      <member c:identifier="FARM_MOOD_SAD"/>
    </enumeration>
    <bitfield name="Flags"><member name="none"/></bitfield>
    <constant name="LIMIT"><type name="gint"/></constant>
    <constant name="LIMIT"><type name="gint"/></constant>
    <function name="count_all">
      <return-value><type name="guint"/></return-value>
    </function>
    <function name="hidden" introspectable="0"/>
    <callback name="Visitor">
      <return-value><type name="gboolean"/></return-value>
    </callback>
    <interface name="Fed"/>
    <class name="Barn"/>
    <class name="Secret" introspectable="0"/>
    <record name="Bale"/>
    <union name="Slot"/>
    <alias name="Acres"><type name="gdouble"/></alias>"#;

    #[test]
    fn test_emission_order() {
        let source = repository("Farm", "1.0", &[], FARM);
        let (universe, diagnostics) = universe(Environment::Gjs, &[&source]);
        let overrides = OverrideTable::empty();
        let exporter = ModuleExporter::new(&universe, ModuleId::new(0), &diagnostics, &overrides);
        let out = exporter.export();

        let headers: Vec<&str> = out
            .iter()
            .map(String::as_str)
            .filter(|line| !line.starts_with(' ') && *line != "}")
            .collect();
        assert_eq!(
            headers,
            vec![
                "export enum Mood {",
                "export enum Flags {",
                "export const LIMIT: number",
                "export function count_all(): number",
                "export interface Visitor {",
                "export class Fed {",
                "export class Barn {",
                "export class Bale {",
                "export class Slot {",
                "type Acres = number",
            ]
        );
        assert_eq!(
            &out[..5],
            [
                "export enum Mood {",
                "    HAPPY,",
                "    /* 2D (invalid, starts with a number) */",
                "    FARM_MOOD_SAD,",
                "}",
            ]
        );
        assert_eq!(diagnostics.count(DiagnosticKind::DuplicateConstant), 1);
    }

    #[test]
    fn test_gobject_type_alias() {
        let source = repository(
            "GObject",
            "2.0",
            &[],
            r#"<alias name="Type"><type name="gsize"/></alias>
    <alias name="SignalCMarshaller"><type name="gpointer"/></alias>"#,
        );
        let (universe, diagnostics) = universe(Environment::Gjs, &[&source]);
        let overrides = OverrideTable::empty();
        let out = ModuleExporter::new(&universe, ModuleId::new(0), &diagnostics, &overrides).export();

        assert_eq!(
            out,
            vec![
                "type SignalCMarshaller = object",
                "export interface Type {",
                "    name: string",
                "}",
            ]
        );
    }
}
