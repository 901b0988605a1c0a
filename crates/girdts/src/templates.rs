//! Text snippets and small support files
//!
//! Everything here is plain string assembly; no GIR semantics.

use std::fmt::Write as _;

use crate::config::{BuildType, Environment};

const INDENT: &str = "    ";

/// `connect` / `connect_after` / `emit` (plus `on` / `once` / `off` for node) of one signal
pub fn signal_methods(
    environment: Environment,
    signal_name: &str,
    class_name: &str,
    params: &str,
    return_type: &str,
) -> Vec<String> {
    let comma = if params.is_empty() { "" } else { ", " };
    let callback = format!("(($obj: {class_name}{comma}{params}) => {return_type})");

    let mut methods = vec![
        format!("{INDENT}connect(sigName: \"{signal_name}\", callback: {callback}): number"),
        format!("{INDENT}connect_after(sigName: \"{signal_name}\", callback: {callback}): number"),
        format!("{INDENT}emit(sigName: \"{signal_name}\"{comma}{params}): void"),
    ];
    if environment == Environment::Node {
        methods.extend(event_emitter_methods(&format!("\"{signal_name}\"")));
    }
    methods
}

/// `notify::{property}` handlers of a GObject-derived class
pub fn notify_signal_methods(
    environment: Environment,
    property_name: &str,
    class_name: &str,
    namespace_prefix: &str,
) -> Vec<String> {
    let signal = format!("\"notify::{property_name}\"");
    let callback =
        format!("(($obj: {class_name}, pspec: {namespace_prefix}ParamSpec) => void)");

    let mut methods = vec![
        format!("{INDENT}connect(sigName: {signal}, callback: {callback}): number"),
        format!("{INDENT}connect_after(sigName: {signal}, callback: {callback}): number"),
    ];
    if environment == Environment::Node {
        methods.extend(event_emitter_methods(&signal));
    }
    methods
}

/// Untyped fallbacks accepting any signal name
pub fn general_signal_methods(environment: Environment) -> Vec<String> {
    let mut methods = vec![
        format!("{INDENT}connect(sigName: string, callback: any): number"),
        format!("{INDENT}connect_after(sigName: string, callback: any): number"),
        format!("{INDENT}emit(sigName: string, ...args: any[]): void"),
        format!("{INDENT}disconnect(id: number): void"),
    ];
    if environment == Environment::Node {
        methods.extend(["on", "once", "off"].map(|method| {
            format!("{INDENT}{method}(sigName: string, callback: any): NodeJS.EventEmitter")
        }));
    }
    methods
}

fn event_emitter_methods(signal: &str) -> [String; 3] {
    ["on", "once", "off"].map(|method| {
        format!(
            "{INDENT}{method}(sigName: {signal}, callback: (...args: any[]) => void): NodeJS.EventEmitter"
        )
    })
}

pub fn doc_comment(description: &str) -> Vec<String> {
    vec!["/**".to_owned(), format!(" * {description}"), " */".to_owned()]
}

/// Import (lib build) or triple-slash reference (types build) of a dependency
pub fn dependency_import(
    namespace: &str,
    base_filename: &str,
    as_type: bool,
    build_type: BuildType,
) -> String {
    match build_type {
        BuildType::Lib => format!("import * as {namespace} from './{base_filename}';"),
        BuildType::Types if as_type => format!("/// <reference types=\"{base_filename}\" />"),
        BuildType::Types => format!("/// <reference path=\"{base_filename}.d.ts\" />"),
    }
}

/// Runtime import line of the target environment itself
pub fn environment_import(environment: Environment, build_type: BuildType) -> String {
    match environment {
        Environment::Gjs => dependency_import("Gjs", "Gjs", false, build_type),
        // node typings come from @types/node, never from a sibling file
        Environment::Node => dependency_import("node", "node", true, BuildType::Types),
    }
}

/// Loader module written next to each declaration file of a lib build
pub fn module_js(environment: Environment, name: &str, version: &str, import_name: &str) -> String {
    match environment {
        Environment::Gjs => format!(
            "imports.gi.versions.{name} = '{version}';\nmodule.exports = imports.gi.{name};\n"
        ),
        Environment::Node => format!(
            "const gi = require('node-gtk');\nconst {import_name} = gi.require('{name}', '{version}');\nmodule.exports = {import_name};\n"
        ),
    }
}

/// Entry point referencing every generated module as `(import name, package name)`
pub fn index_dts(environment: Environment, build_type: BuildType, modules: &[(String, String)]) -> String {
    let mut out = doc_comment(&format!(
        "Type definitions for {} generated from GObject Introspection data",
        match environment {
            Environment::Gjs => "GJS",
            Environment::Node => "node-gtk",
        }
    ))
    .join("\n");
    out.push_str("\n\n");

    for (import_name, package_name) in modules {
        let _ = writeln!(
            out,
            "{}",
            dependency_import(import_name, package_name, false, build_type)
        );
    }

    if build_type == BuildType::Lib && !modules.is_empty() {
        let names: Vec<&str> = modules.iter().map(|(name, _)| name.as_str()).collect();
        let _ = writeln!(out, "\nexport {{ {} }};", names.join(", "));
    }
    out
}

/// Minimal declarations of the GJS runtime helpers referenced by generated types
pub const GJS_DTS: &str = r#"/**
 * Gjs runtime helpers
 */

export namespace byteArray {
    export class ByteArray {
        length: number
        constructor(len: number)
        toString(encoding?: string): string
        toGBytes(): any
    }
    export function fromString(input: string): ByteArray
    export function fromArray(array: number[]): ByteArray
    export function fromGBytes(input: any): ByteArray
    export function toString(x: ByteArray | Uint8Array, encoding?: string): string
}

export function log(message: string): void
export function logError(exception: any, message?: string): void
export function print(...args: any[]): void
export function printerr(...args: any[]): void
"#;

/// Runtime-checked cast helper backed by the flattened inheritance table
pub fn cast_ts<'a>(table: impl IntoIterator<Item = (&'a str, &'a [String])>) -> String {
    let mut out = doc_comment("Casts between related GObject types").join("\n");
    out.push_str("\n\nconst inheritanceTable: { [name: string]: string[] } = {\n");
    for (class, ancestors) in table {
        let ancestors: Vec<String> = ancestors.iter().map(|name| format!("'{name}'")).collect();
        let _ = writeln!(out, "    '{class}': [{}],", ancestors.join(", "));
    }
    out.push_str(CAST_FUNCTION);
    out
}

const CAST_FUNCTION: &str = r#"}

interface StaticNamed {
    name: string
}

/**
 * Casts between derived classes, checking at run time that the cast is valid.
 * Casting to an implemented interface is allowed as well.
 */
export function giCast<T>(from_: any, to_: StaticNamed): T {
    const desc: string = from_.toString()
    let clsName: string | null = null
    for (const k of desc.split(' ')) {
        if (k.substring(0, 7) === 'GIName:') {
            clsName = k.substring(7)
            break
        }
    }
    const toName = to_.name.replace('_', '.')
    if (toName === clsName) return from_ as T
    if (clsName) {
        const parents = inheritanceTable[clsName]
        if (parents && parents.indexOf(toName) >= 0) return from_ as T
    }
    throw Error('Invalid cast of ' + desc + '(' + clsName + ') to ' + toName)
}
"#;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_signal_methods_gjs() {
        let methods = signal_methods(Environment::Gjs, "clicked", "Button", "", "void");
        assert_eq!(
            methods,
            vec![
                "    connect(sigName: \"clicked\", callback: (($obj: Button) => void)): number",
                "    connect_after(sigName: \"clicked\", callback: (($obj: Button) => void)): number",
                "    emit(sigName: \"clicked\"): void",
            ]
        );
    }

    #[test]
    fn test_signal_methods_node_with_params() {
        let methods = signal_methods(Environment::Node, "key-press", "Widget", "event: Event", "boolean");
        assert_eq!(methods.len(), 6);
        assert_eq!(
            methods[2],
            "    emit(sigName: \"key-press\", event: Event): void"
        );
        assert_eq!(
            methods[3],
            "    on(sigName: \"key-press\", callback: (...args: any[]) => void): NodeJS.EventEmitter"
        );
    }

    #[test]
    fn test_general_and_notify_methods() {
        assert_eq!(general_signal_methods(Environment::Gjs).len(), 4);
        assert_eq!(general_signal_methods(Environment::Node).len(), 7);
        let notify = notify_signal_methods(Environment::Gjs, "label", "Button", "GObject.");
        assert_eq!(
            notify[0],
            "    connect(sigName: \"notify::label\", callback: (($obj: Button, pspec: GObject.ParamSpec) => void)): number"
        );
    }

    #[test]
    fn test_dependency_imports() {
        assert_eq!(
            dependency_import("Gtk", "Gtk-3.0", false, BuildType::Lib),
            "import * as Gtk from './Gtk-3.0';"
        );
        assert_eq!(
            dependency_import("Gtk", "Gtk-3.0", false, BuildType::Types),
            "/// <reference path=\"Gtk-3.0.d.ts\" />"
        );
        assert_eq!(
            environment_import(Environment::Node, BuildType::Lib),
            "/// <reference types=\"node\" />"
        );
    }

    #[test]
    fn test_cast_ts() {
        let ancestors = vec!["Gtk.Widget".to_owned(), "GObject.Object".to_owned()];
        let cast = cast_ts([("Gtk.Button", ancestors.as_slice())]);
        assert!(cast.contains("    'Gtk.Button': ['Gtk.Widget', 'GObject.Object'],\n}"));
        assert!(cast.contains("export function giCast<T>"));
    }

    #[test]
    fn test_index_dts_lib() {
        let index = index_dts(
            Environment::Gjs,
            BuildType::Lib,
            &[("Gtk30".to_owned(), "Gtk-3.0".to_owned())],
        );
        insta::assert_snapshot!(index, @r"
        /**
         * Type definitions for GJS generated from GObject Introspection data
         */

        import * as Gtk30 from './Gtk-3.0';

        export { Gtk30 };
        ");
    }
}
