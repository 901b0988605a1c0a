//! Typed GIR entities
//!
//! The raw tree is lifted once into a closed set of entity variants so that
//! downstream code selects members by an explicit kind instead of probing
//! for the presence of schema fields.

use anyhow::{Context, Result, anyhow};

use super::raw::{NodeId, RawNode};

/// `<include name=".." version=".."/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub name: String,
    pub version: String,
}

impl Include {
    pub fn package_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

/// Root of one GIR document
#[derive(Debug, Clone)]
pub struct Repository {
    pub id: NodeId,
    pub includes: Vec<Include>,
    pub namespace: Namespace,
}

/// Ordered entity sequences of one namespace
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    pub name: String,
    pub version: String,
    pub enumerations: Vec<Enumeration>,
    pub bitfields: Vec<Enumeration>,
    pub constants: Vec<Variable>,
    pub functions: Vec<Function>,
    pub callbacks: Vec<Function>,
    pub interfaces: Vec<ClassLike>,
    pub classes: Vec<ClassLike>,
    pub records: Vec<ClassLike>,
    pub unions: Vec<ClassLike>,
    pub aliases: Vec<Alias>,
}

impl Namespace {
    /// Class-like sequence for `kind`
    pub fn class_likes(&self, kind: ClassKind) -> &[ClassLike] {
        match kind {
            ClassKind::Class => &self.classes,
            ClassKind::Interface => &self.interfaces,
            ClassKind::Record => &self.records,
            ClassKind::Union => &self.unions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Record,
    Union,
}

impl ClassKind {
    pub const ALL: [Self; 4] = [Self::Class, Self::Interface, Self::Record, Self::Union];

    fn tag(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Record => "record",
            Self::Union => "union",
        }
    }
}

/// Function-like member groups of a class-like entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Constructor,
    Method,
    VirtualMethod,
    Signal,
    /// Static (class-level) function
    Function,
}

/// Variable-like member groups of a class-like entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Property,
    Field,
}

/// Class, interface, record or union
#[derive(Debug, Clone)]
pub struct ClassLike {
    pub id: NodeId,
    pub kind: ClassKind,
    pub name: String,
    /// Raw parent reference, possibly unqualified
    pub parent: Option<String>,
    pub implements: Vec<String>,
    pub prerequisites: Vec<String>,
    /// Set on class structs (`glib:is-gtype-struct-for`)
    pub gtype_struct_for: Option<String>,
    pub introspectable: bool,
    pub properties: Vec<Variable>,
    pub fields: Vec<Variable>,
    pub constructors: Vec<Function>,
    pub methods: Vec<Function>,
    pub virtual_methods: Vec<Function>,
    pub signals: Vec<Function>,
    pub functions: Vec<Function>,
}

impl ClassLike {
    pub fn functions_of(&self, kind: FunctionKind) -> &[Function] {
        match kind {
            FunctionKind::Constructor => &self.constructors,
            FunctionKind::Method => &self.methods,
            FunctionKind::VirtualMethod => &self.virtual_methods,
            FunctionKind::Signal => &self.signals,
            FunctionKind::Function => &self.functions,
        }
    }

    pub fn variables_of(&self, kind: VariableKind) -> &[Variable] {
        match kind {
            VariableKind::Property => &self.properties,
            VariableKind::Field => &self.fields,
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }
}

/// Function, method, constructor, signal or callback
#[derive(Debug, Clone)]
pub struct Function {
    pub id: NodeId,
    pub name: String,
    pub introspectable: bool,
    pub shadowed_by: Option<String>,
    pub shadows: Option<String>,
    pub parameters: Vec<Variable>,
    pub return_value: Option<Variable>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    In,
    Out,
    InOut,
}

/// Any typed node: parameter, return value, property, field, constant
#[derive(Debug, Clone, Default)]
pub struct Variable {
    pub id: Option<NodeId>,
    pub name: Option<String>,
    pub ty: Option<TypeRef>,
    pub nullable: bool,
    pub allow_none: bool,
    pub optional: bool,
    pub introspectable: bool,
    pub private: bool,
    pub writable: bool,
    pub construct_only: bool,
    pub direction: Direction,
    /// Index of the user data parameter
    pub closure: Option<usize>,
    /// Index of the destroy notifier parameter
    pub destroy: Option<usize>,
}

impl Variable {
    /// Whether any of the nullable-ish flags is set
    pub fn is_nullable(&self) -> bool {
        self.nullable || self.allow_none || self.optional
    }

    /// Array length parameter index carried by an array-typed node
    pub fn array_length(&self) -> Option<usize> {
        match &self.ty {
            Some(TypeRef::Array(array)) => array.length,
            _ => None,
        }
    }
}

/// Type reference of a typed node
#[derive(Debug, Clone)]
pub enum TypeRef {
    Named(NamedType),
    Array(ArrayType),
    /// Inline callback signature (callback-typed record fields)
    Callback(Box<Function>),
}

#[derive(Debug, Clone, Default)]
pub struct NamedType {
    pub name: Option<String>,
    pub c_type: Option<String>,
    /// Element types of container types such as `GLib.List`
    pub inner: Vec<TypeRef>,
}

#[derive(Debug, Clone, Default)]
pub struct ArrayType {
    pub c_type: Option<String>,
    pub length: Option<usize>,
    pub element: Option<Box<TypeRef>>,
}

/// Enumeration or bitfield
#[derive(Debug, Clone)]
pub struct Enumeration {
    pub id: NodeId,
    pub name: String,
    pub introspectable: bool,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, Default)]
pub struct EnumMember {
    pub name: Option<String>,
    pub nick: Option<String>,
    pub c_identifier: Option<String>,
}

impl EnumMember {
    /// `name`, falling back to `glib:nick`, then `c:identifier`
    pub fn display_name(&self) -> Option<&str> {
        [&self.name, &self.nick, &self.c_identifier]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct Alias {
    pub id: NodeId,
    pub name: String,
    pub introspectable: bool,
    /// The aliased type, as a typed node named after the alias
    pub target: Variable,
}

impl Repository {
    /// Lift a raw `<repository>` tree into typed entities
    pub fn from_raw(root: &RawNode) -> Result<Self> {
        let namespace_node = root
            .first("namespace")
            .ok_or_else(|| anyhow!("Namespace not found!"))?;

        let includes = root
            .children("include")
            .iter()
            .filter_map(|include| {
                Some(Include {
                    name: include.attr("name")?.to_owned(),
                    version: include.attr("version")?.to_owned(),
                })
            })
            .collect();

        Ok(Self {
            id: root.id,
            includes,
            namespace: build_namespace(namespace_node)?,
        })
    }
}

fn required_name(node: &RawNode) -> Result<String> {
    node.attr("name")
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| anyhow!("<{}> element without a name attribute", node.tag))
}

fn build_namespace(node: &RawNode) -> Result<Namespace> {
    let name = required_name(node).context("Invalid <namespace>")?;
    let version = node.attr("version").unwrap_or("0.0").to_owned();

    let class_likes = |kind: ClassKind| -> Result<Vec<ClassLike>> {
        node.children(kind.tag())
            .iter()
            .map(|child| build_class_like(child, kind))
            .collect()
    };
    let functions = |tag: &str| -> Result<Vec<Function>> {
        node.children(tag).iter().map(build_function).collect()
    };
    let enumerations = |tag: &str| -> Result<Vec<Enumeration>> {
        node.children(tag).iter().map(build_enumeration).collect()
    };

    Ok(Namespace {
        enumerations: enumerations("enumeration")?,
        bitfields: enumerations("bitfield")?,
        constants: node.children("constant").iter().map(build_variable).collect(),
        functions: functions("function")?,
        callbacks: functions("callback")?,
        interfaces: class_likes(ClassKind::Interface)?,
        classes: class_likes(ClassKind::Class)?,
        records: class_likes(ClassKind::Record)?,
        unions: class_likes(ClassKind::Union)?,
        aliases: node
            .children("alias")
            .iter()
            .map(build_alias)
            .collect::<Result<_>>()?,
        name,
        version,
    })
}

fn names_of(node: &RawNode, tag: &str) -> Vec<String> {
    node.children(tag)
        .iter()
        .filter_map(|child| child.attr("name"))
        .map(str::to_owned)
        .collect()
}

fn build_class_like(node: &RawNode, kind: ClassKind) -> Result<ClassLike> {
    let name = required_name(node)?;
    let functions = |tag: &str| -> Result<Vec<Function>> {
        node.children(tag)
            .iter()
            .map(build_function)
            .collect::<Result<_>>()
            .with_context(|| format!("Invalid <{tag}> in {name}"))
    };

    Ok(ClassLike {
        id: node.id,
        kind,
        parent: node.attr("parent").map(str::to_owned),
        implements: names_of(node, "implements"),
        prerequisites: names_of(node, "prerequisite"),
        gtype_struct_for: node.attr("glib:is-gtype-struct-for").map(str::to_owned),
        introspectable: node.bool_attr("introspectable", true),
        properties: node.children("property").iter().map(build_variable).collect(),
        fields: node.children("field").iter().map(build_variable).collect(),
        constructors: functions("constructor")?,
        methods: functions("method")?,
        virtual_methods: functions("virtual-method")?,
        signals: functions("glib:signal")?,
        functions: functions("function")?,
        name,
    })
}

fn build_function(node: &RawNode) -> Result<Function> {
    let parameters = node
        .first("parameters")
        .map(|params| params.children("parameter").iter().map(build_variable).collect())
        .unwrap_or_default();

    Ok(Function {
        id: node.id,
        name: required_name(node)?,
        introspectable: node.bool_attr("introspectable", true),
        shadowed_by: node.attr("shadowed-by").map(str::to_owned),
        shadows: node.attr("shadows").map(str::to_owned),
        parameters,
        return_value: node.first("return-value").map(build_variable),
    })
}

fn build_variable(node: &RawNode) -> Variable {
    let direction = match node.attr("direction") {
        Some("out") => Direction::Out,
        Some("inout") => Direction::InOut,
        _ => Direction::In,
    };

    Variable {
        id: Some(node.id),
        name: node.attr("name").map(str::to_owned),
        ty: build_type_ref(node),
        nullable: node.bool_attr("nullable", false),
        allow_none: node.bool_attr("allow-none", false),
        optional: node.bool_attr("optional", false),
        introspectable: node.bool_attr("introspectable", true),
        private: node.bool_attr("private", false),
        writable: node.bool_attr("writable", false),
        construct_only: node.bool_attr("construct-only", false),
        direction,
        closure: node.index_attr("closure"),
        destroy: node.index_attr("destroy"),
    }
}

/// Type of a typed node: `<array>` wins over `<type>`, then inline `<callback>`
fn build_type_ref(node: &RawNode) -> Option<TypeRef> {
    if let Some(array) = node.first("array") {
        return Some(TypeRef::Array(build_array(array)));
    }
    if let Some(ty) = node.first("type") {
        return Some(TypeRef::Named(build_named(ty)));
    }
    node.first("callback")
        .and_then(|callback| build_function(callback).ok())
        .map(|callback| TypeRef::Callback(Box::new(callback)))
}

fn build_array(node: &RawNode) -> ArrayType {
    ArrayType {
        c_type: node.attr("c:type").map(str::to_owned),
        length: node.index_attr("length"),
        element: build_type_ref(node).map(Box::new),
    }
}

fn build_named(node: &RawNode) -> NamedType {
    let mut inner: Vec<TypeRef> = node
        .children("type")
        .iter()
        .map(|child| TypeRef::Named(build_named(child)))
        .collect();
    inner.extend(
        node.children("array")
            .iter()
            .map(|child| TypeRef::Array(build_array(child))),
    );

    NamedType {
        name: node.attr("name").map(str::to_owned),
        c_type: node.attr("c:type").map(str::to_owned),
        inner,
    }
}

fn build_enumeration(node: &RawNode) -> Result<Enumeration> {
    Ok(Enumeration {
        id: node.id,
        name: required_name(node)?,
        introspectable: node.bool_attr("introspectable", true),
        members: node
            .children("member")
            .iter()
            .map(|member| EnumMember {
                name: member.attr("name").map(str::to_owned),
                nick: member.attr("glib:nick").map(str::to_owned),
                c_identifier: member.attr("c:identifier").map(str::to_owned),
            })
            .collect(),
    })
}

fn build_alias(node: &RawNode) -> Result<Alias> {
    Ok(Alias {
        id: node.id,
        name: required_name(node)?,
        introspectable: node.bool_attr("introspectable", true),
        target: build_variable(node),
    })
}
