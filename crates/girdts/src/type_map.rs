//! Fixed lookup tables from GIR / C type names to TypeScript types

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::config::Environment;

/// Element types of arrays that have a dedicated array representation
pub fn pod_array_type(environment: Environment, name: &str) -> Option<&'static str> {
    match name {
        "guint8" | "gint8" => Some(byte_array(environment)),
        "gunichar" => Some("string"),
        _ => None,
    }
}

static POD_TYPE_MAP: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    let numbers = [
        "double", "guint32", "guint16", "gint16", "gunichar", "gint8", "gint32", "gushort",
        "gfloat", "gchar", "guint", "glong", "gulong", "gint", "guint8", "guint64", "gint64",
        "gdouble", "gssize", "gsize", "long", "gshort",
    ];

    let mut map: FxHashMap<&'static str, &'static str> =
        numbers.into_iter().map(|name| (name, "number")).collect();
    map.extend([
        ("utf8", "string"),
        ("filename", "string"),
        ("none", "void"),
        ("gboolean", "boolean"),
        ("gpointer", "object"),
        ("object", "any"),
        ("va_list", "any"),
    ]);
    map
});

/// Plain-old-data GIR types
pub fn pod_type(name: &str) -> Option<&'static str> {
    POD_TYPE_MAP.get(name).copied()
}

/// Native C types, keyed by the `c:type` attribute
///
/// `GType` is a `Type` inside `GObject-2.0` itself and `GObject.Type`
/// everywhere else; the suffix (array / nullable) is already part of the result.
pub fn c_type(package_name: &str, c_type: &str, suffix: &str) -> Option<String> {
    match c_type {
        "char*" | "gchar*" => Some("string".to_owned()),
        "gchar**" => Some("any".to_owned()),
        "GType" if package_name == "GObject-2.0" => Some(format!("Type{suffix}")),
        "GType" => Some(format!("GObject.Type{suffix}")),
        _ => None,
    }
}

/// Overrides for fully qualified GIR type names
pub fn full_type(environment: Environment, name: &str) -> Option<&'static str> {
    match name {
        "GObject.Value" => Some("any"),
        "GObject.Closure" => Some("Function"),
        "GLib.ByteArray" | "GLib.Bytes" => Some(byte_array(environment)),
        _ => None,
    }
}

const fn byte_array(environment: Environment) -> &'static str {
    match environment {
        Environment::Gjs => "Gjs.byteArray.ByteArray",
        Environment::Node => "any",
    }
}
