//! Declarations of individual members
//!
//! Renders functions, constructors, properties, fields, constants, signals,
//! callbacks and aliases into declaration text. Function-like members are
//! also given an erased signature (parameter names stripped) so that the
//! overload accumulator can compare them structurally.

use rustc_hash::FxHashSet;

use crate::{
    gir::{Alias, Direction, Function, Variable},
    naming::Construct,
    overrides::{OverrideTable, Patch},
    templates,
    type_resolver::TypeResolver,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub optional: bool,
    pub ty: String,
}

/// Rendered parameter and return types of one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub params: Vec<Param>,
    /// `direction="out"` parameters, returned instead of passed
    pub out_params: Vec<Param>,
    pub return_type: String,
}

impl FunctionSignature {
    pub fn params_text(&self) -> String {
        self.params
            .iter()
            .map(|param| {
                let optional = if param.optional { "?" } else { "" };
                format!("{}{optional}: {}", param.name, param.ty)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Return type, folding out parameters into it
    ///
    /// A single out parameter of a `void` function becomes the return type;
    /// more than one value becomes a commented tuple.
    pub fn return_text(&self) -> String {
        self.return_with(|label, ty| format!("/* {label} */ {ty}"))
    }

    fn return_with(&self, value: impl Fn(&str, &str) -> String) -> String {
        let is_void = self.return_type == "void";
        let values = self.out_params.len() + usize::from(!is_void);

        if values > 1 {
            let mut items = Vec::with_capacity(values);
            if !is_void {
                items.push(value("returnType", &self.return_type));
            }
            items.extend(self.out_params.iter().map(|param| value(&param.name, &param.ty)));
            format!("[ {} ]", items.join(", "))
        } else if let ([param], true) = (self.out_params.as_slice(), is_void) {
            value(&param.name, &param.ty)
        } else {
            self.return_type.clone()
        }
    }

    /// `name(params): ret`
    pub fn declaration(&self, name: &str) -> String {
        format!("{name}({}): {}", self.params_text(), self.return_text())
    }

    /// `(params) => ret`, used for inline callback types
    pub fn arrow(&self) -> String {
        format!("({}) => {}", self.params_text(), self.return_text())
    }

    /// Structural form with every parameter name removed
    pub fn erased(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|param| {
                let optional = if param.optional { "?" } else { "" };
                format!("{optional}{}", param.ty)
            })
            .collect();
        let ret = self.return_with(|_, ty| ty.to_owned());
        format!("({}): {ret}", params.join(", "))
    }
}

/// Build the signature of `function` as seen from the resolver's module
///
/// Parameters referenced as array lengths, closure data or destroy notifiers
/// are implied by the binding and therefore skipped.
pub fn signature(resolver: &TypeResolver<'_>, function: &Function) -> FunctionSignature {
    let transformation = resolver.transformation();
    let parameters = &function.parameters;

    let (return_type, return_length) = match &function.return_value {
        Some(return_value) => (
            resolver.resolve_transformed(return_value),
            return_value.array_length(),
        ),
        None => ("void".to_owned(), None),
    };

    let mut skip: FxHashSet<usize> = FxHashSet::default();
    skip.extend(return_length);
    for param in parameters {
        skip.extend(
            [param.array_length(), param.closure, param.destroy]
                .into_iter()
                .flatten(),
        );
    }
    skip.retain(|&index| index < parameters.len());

    let mut params = Vec::new();
    let mut out_params = Vec::new();
    for (index, param) in parameters.iter().enumerate() {
        if skip.contains(&index) {
            continue;
        }
        let name = transformation.parameter_name(param.name.as_deref().unwrap_or("-"), false);
        let ty = resolver.resolve_transformed(param);

        if param.direction == Direction::Out {
            out_params.push(Param {
                name,
                optional: false,
                ty,
            });
            continue;
        }

        let optional = param.allow_none
            && parameters
                .iter()
                .enumerate()
                .skip(index)
                .filter(|(following, other)| {
                    !skip.contains(following) && other.direction != Direction::Out
                })
                .all(|(_, other)| other.allow_none);

        params.push(Param { name, optional, ty });
    }

    FunctionSignature {
        params,
        out_params,
        return_type,
    }
}

/// One function-like member ready for overload accumulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDecl {
    /// Transformed member name, including any prefix such as `vfunc_`
    pub name: String,
    /// Full declaration line
    pub text: String,
    /// Signature with parameter names erased
    pub erased: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Not introspectable or shadowed by another function
    Omitted,
    /// Replaced outright by an override patch
    Replaced(String),
    Member(MemberDecl),
}

impl Rendered {
    pub fn member(self) -> Option<MemberDecl> {
        match self {
            Self::Member(member) => Some(member),
            Self::Omitted | Self::Replaced(_) => None,
        }
    }
}

/// How a function-like member is written
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionStyle<'s> {
    /// Text before the name, e.g. `    static ` or `export function `
    pub prefix: &'s str,
    /// Prepended to the raw name, e.g. `vfunc_`
    pub name_prefix: &'s str,
    /// Constructors always return the class they construct
    pub constructs: Option<&'s str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    pub text: String,
    /// Name used for `notify::` signal handlers
    pub notify_name: String,
}

/// A declaration with the name used for de-duplication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedLine {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
enum VariableRole {
    Property,
    Field,
    Constant,
}

#[derive(Debug, Clone, Copy)]
pub struct MemberRenderer<'a> {
    resolver: TypeResolver<'a>,
    overrides: &'a OverrideTable,
}

impl<'a> MemberRenderer<'a> {
    pub fn new(resolver: TypeResolver<'a>, overrides: &'a OverrideTable) -> Self {
        Self {
            resolver,
            overrides,
        }
    }

    pub fn resolver(&self) -> &TypeResolver<'a> {
        &self.resolver
    }

    pub fn function(&self, function: &Function, style: FunctionStyle<'_>) -> Rendered {
        if !function.introspectable || function.shadowed_by.is_some() {
            return Rendered::Omitted;
        }

        let patch = self
            .resolver
            .universe()
            .symbols()
            .full_name_of(function.id)
            .and_then(|full_name| self.overrides.get(full_name));
        if let Some(Patch::Replace(line)) = patch {
            return Rendered::Replaced(line.to_owned());
        }

        let raw_name = function.shadows.as_deref().unwrap_or(&function.name);
        let name = self
            .resolver
            .transformation()
            .function_name(&format!("{}{raw_name}", style.name_prefix));

        if let Some(Patch::Body(body)) = patch {
            return Rendered::Member(MemberDecl {
                text: format!("{}{}{body}", style.prefix, style.name_prefix),
                erased: body.to_owned(),
                name,
            });
        }

        let mut signature = signature(&self.resolver, function);
        if let Some(class_name) = style.constructs {
            if signature.return_type.split(' ').next() != Some(class_name) {
                signature.return_type = class_name.to_owned();
            }
        }

        Rendered::Member(MemberDecl {
            text: format!("{}{}", style.prefix, signature.declaration(&name)),
            erased: signature.erased(),
            name,
        })
    }

    /// Instance property, or construct property when `construct` is set
    pub fn property(&self, property: &Variable, construct: bool) -> Option<PropertyDecl> {
        if property.construct_only && !construct {
            return None;
        }
        if !property.writable && construct {
            return None;
        }

        let readonly = if property.writable { "" } else { "readonly " };
        let (name, declaration) = self.variable(property, construct, VariableRole::Property)?;
        let notify_name = self
            .resolver
            .transformation()
            .type_name(property.name.as_deref().unwrap_or_default());

        Some(PropertyDecl {
            text: format!("    {readonly}{declaration}"),
            name,
            notify_name,
        })
    }

    pub fn field(&self, field: &Variable) -> Option<NamedLine> {
        let (name, declaration) = self.variable(field, false, VariableRole::Field)?;
        Some(NamedLine {
            name,
            text: format!("    {declaration}"),
        })
    }

    pub fn constant(&self, constant: &Variable) -> Option<NamedLine> {
        let (name, declaration) = self.variable(constant, false, VariableRole::Constant)?;
        Some(NamedLine {
            name,
            text: format!("export const {declaration}"),
        })
    }

    /// `name?: type`; `None` for unnamed, private or non-introspectable nodes
    fn variable(
        &self,
        variable: &Variable,
        optional: bool,
        role: VariableRole,
    ) -> Option<(String, String)> {
        let raw_name = variable.name.as_deref()?;
        if !variable.introspectable || variable.private {
            return None;
        }

        let transformation = self.resolver.transformation();
        let name = match role {
            VariableRole::Property => transformation.property_name(raw_name, true),
            VariableRole::Field => transformation.field_name(raw_name, false),
            VariableRole::Constant => transformation.constant_name(raw_name, false),
        };
        let ty = transformation.type_name(&self.resolver.resolve_transformed(variable));
        let optional = if optional { "?" } else { "" };

        Some((name.clone(), format!("{name}{optional}: {ty}")))
    }

    /// Signal handler methods of `signal` on the class `class_name`
    pub fn signal(&self, signal: &Function, class_name: &str) -> Vec<String> {
        let signal_name = self
            .resolver
            .transformation()
            .transform(Construct::SignalName, &signal.name);
        let signature = signature(&self.resolver, signal);

        templates::signal_methods(
            self.resolver.environment(),
            &signal_name,
            class_name,
            &signature.params_text(),
            &signature.return_text(),
        )
    }

    /// Namespace-level callback as a callable interface
    pub fn callback(&self, callback: &Function) -> Vec<String> {
        if !callback.introspectable {
            return Vec::new();
        }
        let signature = signature(&self.resolver, callback);
        vec![
            format!("export interface {} {{", callback.name),
            format!("    ({}): {}", signature.params_text(), signature.return_text()),
            "}".to_owned(),
        ]
    }

    pub fn alias(&self, alias: &Alias) -> Option<String> {
        if !alias.introspectable {
            return None;
        }
        Some(format!(
            "type {} = {}",
            alias.name,
            self.resolver.resolve_transformed(&alias.target)
        ))
    }
}
