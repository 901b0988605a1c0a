//! Identifier transforms per target environment
//!
//! Every identifier taken from a GIR file passes through here before it is
//! written out. The case convention depends on the construct and the target
//! environment (node-gtk camel-cases most names, GJS keeps them), and a small
//! set of collision rules keeps the result a legal TypeScript identifier.

use std::borrow::Cow;

use cow_utils::CowUtils;
use log::debug;

use crate::{
    config::Environment,
    util::{is_first_char_numeric, lower_camel_case, upper_camel_case},
};

/// Names that cannot be used as variables, properties or parameters
pub const RESERVED_VARIABLE_NAMES: &[&str] = &[
    "in",
    "function",
    "true",
    "false",
    "break",
    "arguments",
    "eval",
    "default",
    "new",
    "extends",
    "with",
    "var",
    "class",
    "delete",
    "return",
];

/// Names that cannot be used as class or enum names
pub const RESERVED_CLASS_NAMES: &[&str] = &[
    "break",
    "boolean",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "number",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "string",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

pub const RESERVED_FUNCTION_NAMES: &[&str] = &["false", "true", "break"];

/// Identifier category, selects the case convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    FunctionName,
    EnumName,
    EnumValue,
    SignalName,
    PropertyName,
    ParameterName,
    FieldName,
    ConstantName,
    ImportName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Original,
    LowerCamelCase,
    UpperCamelCase,
    UpperCase,
    /// `-` becomes `_`
    Underscores,
}

/// Naming rules of one target environment
#[derive(Debug, Clone, Copy)]
pub struct Transformation {
    environment: Environment,
}

impl Transformation {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    fn case_for(&self, construct: Construct) -> Case {
        use Construct::{
            ConstantName, EnumName, EnumValue, FieldName, FunctionName, ImportName, ParameterName,
            PropertyName, SignalName,
        };

        match (construct, self.environment) {
            (FunctionName, Environment::Node) => Case::LowerCamelCase,
            (FunctionName, Environment::Gjs) => Case::Original,
            (EnumName | SignalName | ConstantName, _) => Case::Original,
            (EnumValue, _) => Case::UpperCase,
            (PropertyName | ParameterName | FieldName, Environment::Node) => Case::LowerCamelCase,
            (PropertyName | ParameterName | FieldName, Environment::Gjs) => Case::Underscores,
            (ImportName, _) => Case::UpperCamelCase,
        }
    }

    /// Apply the case convention of `construct` without collision rules
    pub fn transform(&self, construct: Construct, name: &str) -> String {
        match self.case_for(construct) {
            Case::Original => name.to_owned(),
            Case::LowerCamelCase => lower_camel_case(name),
            Case::UpperCamelCase => upper_camel_case(name),
            Case::UpperCase => name.to_uppercase(),
            Case::Underscores => name.cow_replace("-", "_").into_owned(),
        }
    }

    /// Namespace name used in import lines, e.g. `GObject`
    pub fn module_namespace_name(&self, name: &str) -> String {
        let name = numeric_name(name, false);
        self.transform(Construct::ImportName, &name)
    }

    pub fn class_name(&self, name: &str) -> String {
        let mut renamed = numeric_name(name, false).into_owned();
        if RESERVED_CLASS_NAMES.contains(&renamed.as_str()) {
            renamed.push('_');
        }
        log_rename("Class", name, &renamed);
        renamed
    }

    pub fn enum_name(&self, name: &str) -> String {
        let original = self.transform(Construct::EnumName, name);
        let mut renamed = numeric_name(&original, false).into_owned();
        if RESERVED_CLASS_NAMES.contains(&renamed.as_str()) {
            renamed.push('_');
        }
        log_rename("Enum", &original, &renamed);
        renamed
    }

    pub fn function_name(&self, name: &str) -> String {
        let original = self.transform(Construct::FunctionName, name);
        let mut renamed = numeric_name(&original, false).into_owned();
        if RESERVED_FUNCTION_NAMES.contains(&renamed.as_str()) {
            renamed.push_str("_TODO");
        }
        log_rename("Function", &original, &renamed);
        renamed
    }

    pub fn property_name(&self, name: &str, allow_quotes: bool) -> String {
        self.variable_name(Construct::PropertyName, name, allow_quotes)
    }

    pub fn constant_name(&self, name: &str, allow_quotes: bool) -> String {
        self.variable_name(Construct::ConstantName, name, allow_quotes)
    }

    pub fn field_name(&self, name: &str, allow_quotes: bool) -> String {
        self.variable_name(Construct::FieldName, name, allow_quotes)
    }

    pub fn parameter_name(&self, name: &str, allow_quotes: bool) -> String {
        if name == "..." {
            return "...args".to_owned();
        }
        self.variable_name(Construct::ParameterName, name, allow_quotes)
    }

    /// Type names must not start with a digit; applied per dotted segment
    pub fn type_name(&self, name: &str) -> String {
        numeric_name(name, false).into_owned()
    }

    fn variable_name(&self, construct: Construct, name: &str, allow_quotes: bool) -> String {
        let original = self.transform(construct, name);
        let renamed = if RESERVED_VARIABLE_NAMES.contains(&original.as_str()) {
            if allow_quotes {
                format!("\"{original}\"")
            } else {
                format!("{original}_")
            }
        } else {
            original.clone()
        };
        let renamed = numeric_name(&renamed, allow_quotes).into_owned();
        log_rename("Variable", &original, &renamed);
        renamed
    }
}

/// `80211ApFlags` -> `"80211ApFlags"` or `TODO_80211ApFlags`
fn numeric_name(name: &str, allow_quotes: bool) -> Cow<'_, str> {
    if !is_first_char_numeric(name) {
        return Cow::Borrowed(name);
    }
    if allow_quotes {
        Cow::Owned(format!("\"{name}\""))
    } else {
        Cow::Owned(format!("TODO_{name}"))
    }
}

fn log_rename(what: &str, original: &str, renamed: &str) {
    if original != renamed {
        debug!("{what} name renamed from '{original}' to '{renamed}'");
    }
}
