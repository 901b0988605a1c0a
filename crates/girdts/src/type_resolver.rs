//! GIR type references to TypeScript type expressions
//!
//! Resolution never fails: a type that cannot be found anywhere degrades to
//! `any` and is reported as [`DiagnosticKind::UnresolvedType`].

use crate::{
    config::Environment,
    diagnostics::{DiagnosticKind, Diagnostics},
    gir::{Function, NamedType, TypeRef, Variable},
    members,
    module::GirModule,
    naming::Transformation,
    type_map,
    universe::Universe,
};

const ANY: &str = "any";
const ARRAY_SUFFIX: &str = "[]";
const NULLABLE_SUFFIX: &str = " | null";

/// `GLib.List` and `GLib.SList` are rendered as arrays of their element type
fn is_list_collection(name: Option<&str>) -> bool {
    matches!(name, Some("GLib.List" | "GLib.SList"))
}

/// Resolves types in the context of the module currently being rendered
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    universe: &'a Universe,
    module: &'a GirModule,
    transformation: Transformation,
    diagnostics: &'a Diagnostics,
}

impl<'a> TypeResolver<'a> {
    pub fn new(universe: &'a Universe, module: &'a GirModule, diagnostics: &'a Diagnostics) -> Self {
        Self {
            universe,
            module,
            transformation: Transformation::new(diagnostics.environment()),
            diagnostics,
        }
    }

    pub fn universe(&self) -> &'a Universe {
        self.universe
    }

    /// The module being rendered
    pub fn module(&self) -> &'a GirModule {
        self.module
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    pub fn diagnostics(&self) -> &'a Diagnostics {
        self.diagnostics
    }

    pub fn environment(&self) -> Environment {
        self.transformation.environment()
    }

    /// Resolve and make every dotted segment a legal type name
    pub fn resolve_transformed(&self, variable: &Variable) -> String {
        self.resolve(variable)
            .split('.')
            .map(|segment| self.transformation.type_name(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Resolve the type of a typed node (parameter, property, field, ...)
    pub fn resolve(&self, variable: &Variable) -> String {
        let Some(ty) = &variable.ty else {
            return ANY.to_owned();
        };

        let nullable = if variable.is_nullable() {
            NULLABLE_SUFFIX
        } else {
            ""
        };

        let (element, array, collection_c_type) = match ty {
            TypeRef::Array(array) => match array.element.as_deref() {
                Some(element) => (element, ARRAY_SUFFIX, array.c_type.as_deref()),
                None => return ANY.to_owned(),
            },
            TypeRef::Named(named) if is_list_collection(named.name.as_deref()) => {
                match named.inner.first() {
                    Some(element) => (element, ARRAY_SUFFIX, named.c_type.as_deref()),
                    None => return ANY.to_owned(),
                }
            }
            TypeRef::Named(_) | TypeRef::Callback(_) => (ty, "", None),
        };

        match element {
            TypeRef::Named(named) => {
                self.resolve_named(variable, named, array, nullable, collection_c_type)
            }
            TypeRef::Callback(callback) => self.callback_type(callback, array, nullable),
            // Nested arrays carry no usable element information
            TypeRef::Array(_) => ANY.to_owned(),
        }
    }

    fn callback_type(&self, callback: &Function, array: &str, nullable: &str) -> String {
        let arrow = members::signature(self, callback).arrow();
        if array.is_empty() && nullable.is_empty() {
            arrow
        } else {
            format!("({arrow}){array}{nullable}")
        }
    }

    fn resolve_named(
        &self,
        variable: &Variable,
        named: &NamedType,
        array: &str,
        nullable: &str,
        collection_c_type: Option<&str>,
    ) -> String {
        let Some(name) = named.name.as_deref() else {
            return ANY.to_owned();
        };
        let suffix = format!("{array}{nullable}");
        let environment = self.environment();

        if !array.is_empty() {
            if let Some(mapped) = type_map::pod_array_type(environment, name) {
                return format!("{mapped}{nullable}");
            }
        }
        if let Some(mapped) = type_map::pod_type(name) {
            return format!("{mapped}{suffix}");
        }
        if let Some(mapped) = named
            .c_type
            .as_deref()
            .or(collection_c_type)
            .and_then(|c_type| type_map::c_type(&self.module.package_name, c_type, &suffix))
        {
            return mapped;
        }
        if let Some(mapped) = type_map::full_type(environment, name) {
            return mapped.to_owned();
        }

        let full_name = if name.contains('.') {
            name.to_owned()
        } else {
            self.universe
                .declaring_module(variable.id)
                .unwrap_or(self.module)
                .qualify(name)
        };

        if !self.universe.symbols().contains(&full_name) {
            self.diagnostics.report(
                DiagnosticKind::UnresolvedType,
                &self.module.package_name,
                format!(
                    "Could not find type '{}' for '{}'",
                    full_name,
                    variable.name.as_deref().unwrap_or("<anonymous>")
                ),
            );
            return format!("{ANY}{array}");
        }

        format!("{}{}", self.module.local_name(&full_name), suffix)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{gir::NodeIdGen, symbol_table::ModuleId};

    const BASE: &str = r#"<repository>
  <namespace name="Base" version="1.0">
    <class name="Widget"/>
    <record name="80211Info"/>
  </namespace>
</repository>"#;

    const APP: &str = r#"<repository xmlns:c="http://www.gtk.org/introspection/c/1.0">
  <include name="Base" version="1.0"/>
  <namespace name="App" version="1.0">
    <class name="Window" parent="Base.Widget">
      <method name="probe">
        <parameters>
          <parameter name="count"><type name="gint32" c:type="gint32"/></parameter>
          <parameter name="counts"><array><type name="gint32"/></array></parameter>
          <parameter name="bytes" nullable="1"><array><type name="guint8"/></array></parameter>
          <parameter name="label" allow-none="1"><type name="utf8" c:type="gchar*"/></parameter>
          <parameter name="parent"><type name="Base.Widget"/></parameter>
          <parameter name="own" optional="1"><type name="Window"/></parameter>
          <parameter name="children"><type name="GLib.List"><type name="Window"/></type></parameter>
          <parameter name="missing"><type name="Nowhere"/></parameter>
          <parameter name="missing_list"><array><type name="Nowhere"/></array></parameter>
          <parameter name="gtype"><type name="GType" c:type="GType"/></parameter>
          <parameter name="value"><type name="GObject.Value"/></parameter>
          <parameter name="info"><type name="Base.80211Info"/></parameter>
          <parameter name="untyped"/>
          <parameter name="empty"><array/></parameter>
          <parameter name="func">
            <callback name="Func">
              <return-value><type name="gboolean"/></return-value>
              <parameters><parameter name="item"><type name="Window"/></parameter></parameters>
            </callback>
          </parameter>
        </parameters>
      </method>
    </class>
  </namespace>
</repository>"#;

    fn universe(environment: Environment) -> (Universe, Diagnostics) {
        let mut ids = NodeIdGen::new();
        let transformation = Transformation::new(environment);
        let modules = [BASE, APP]
            .iter()
            .map(|source| {
                GirModule::parse(source, Path::new("x.gir"), &mut ids, &transformation)
                    .expect("valid module")
            })
            .collect();
        let diagnostics = Diagnostics::new(environment);
        (Universe::build(modules, &diagnostics), diagnostics)
    }

    fn resolved(environment: Environment) -> (Vec<String>, Diagnostics) {
        let (universe, diagnostics) = universe(environment);
        let app = universe.module(ModuleId::new(1));
        let resolver = TypeResolver::new(&universe, app, &diagnostics);
        let params = &app.namespace.classes[0].methods[0].parameters;
        let types = params
            .iter()
            .map(|param| resolver.resolve_transformed(param))
            .collect();
        (types, diagnostics)
    }

    #[test]
    fn test_resolution_rules() {
        let (types, diagnostics) = resolved(Environment::Gjs);
        assert_eq!(
            types,
            vec![
                "number",
                "number[]",
                "Gjs.byteArray.ByteArray | null",
                "string | null",
                "Base.Widget",
                "Window | null",
                "Window[]",
                "any",
                "any[]",
                "GObject.Type",
                "any",
                "Base.TODO_80211Info",
                "any",
                "any",
                "(item: Window) => boolean",
            ]
        );
        assert_eq!(diagnostics.count(DiagnosticKind::UnresolvedType), 2);
    }

    #[test]
    fn test_node_byte_arrays() {
        let (types, _) = resolved(Environment::Node);
        assert_eq!(types[2], "any | null");
    }

    #[test]
    fn test_primitive_resolution_is_pure() {
        let (first, _) = resolved(Environment::Gjs);
        let (second, _) = resolved(Environment::Gjs);
        assert_eq!(first, second);
    }
}
