use pretty_assertions::assert_eq;

use super::*;

const SAMPLE: &str = r#"<?xml version="1.0"?>
<repository version="1.2"
            xmlns="http://www.gtk.org/introspection/core/1.0"
            xmlns:c="http://www.gtk.org/introspection/c/1.0"
            xmlns:glib="http://www.gtk.org/introspection/glib/1.0">
  <include name="GLib" version="2.0"/>
  <include name="GObject" version="2.0"/>
  <namespace name="Zoo" version="1.0">
    <class name="Animal" parent="GObject.Object" glib:type-name="ZooAnimal">
      <implements name="Named"/>
      <property name="name" writable="1" construct-only="0">
        <type name="utf8" c:type="gchar*"/>
      </property>
      <method name="feed">
        <return-value><type name="none" c:type="void"/></return-value>
        <parameters>
          <instance-parameter name="self"><type name="Animal"/></instance-parameter>
          <parameter name="amount" allow-none="1"><type name="gint" c:type="gint"/></parameter>
        </parameters>
      </method>
      <glib:signal name="hungry">
        <return-value><type name="gboolean"/></return-value>
      </glib:signal>
    </class>
    <class name="Hidden" introspectable="0"/>
    <interface name="Named">
      <prerequisite name="GObject.Object"/>
    </interface>
    <enumeration name="Kind">
      <member name="cat" c:identifier="ZOO_KIND_CAT"/>
      <member c:identifier="ZOO_KIND_DOG"/>
    </enumeration>
    <function name="list_all">
      <return-value>
        <array length="0" c:type="ZooAnimal**"><type name="Animal"/></array>
      </return-value>
      <parameters>
        <parameter name="n" direction="out"><type name="gint"/></parameter>
      </parameters>
    </function>
  </namespace>
</repository>
"#;

fn sample() -> Repository {
    let mut ids = NodeIdGen::new();
    let raw = parse_gir(SAMPLE, &mut ids).expect("sample parses");
    Repository::from_raw(&raw).expect("sample is well formed")
}

#[test]
fn test_parser_keeps_prefixed_names() {
    let mut ids = NodeIdGen::new();
    let raw = parse_gir(SAMPLE, &mut ids).expect("sample parses");
    let namespace = raw.first("namespace").expect("namespace");
    let animal = &namespace.children("class")[0];

    assert_eq!(animal.attr("glib:type-name"), Some("ZooAnimal"));
    assert_eq!(animal.children("glib:signal").len(), 1);
    assert_eq!(namespace.children("class").len(), 2);
}

#[test]
fn test_node_ids_are_unique_across_documents() {
    let mut ids = NodeIdGen::new();
    let first = parse_gir(SAMPLE, &mut ids).expect("parses");
    let second = parse_gir(SAMPLE, &mut ids).expect("parses");
    assert_ne!(first.id, second.id);
    assert!(second.id.as_u32() > first.id.as_u32());
}

#[test]
fn test_repository_model() {
    let repo = sample();
    assert_eq!(
        repo.includes
            .iter()
            .map(Include::package_name)
            .collect::<Vec<_>>(),
        vec!["GLib-2.0", "GObject-2.0"]
    );

    let ns = &repo.namespace;
    assert_eq!(ns.name, "Zoo");
    assert_eq!(ns.version, "1.0");
    assert_eq!(ns.classes.len(), 2);
    assert!(!ns.classes[1].introspectable);

    let animal = &ns.classes[0];
    assert_eq!(animal.kind, ClassKind::Class);
    assert_eq!(animal.parent.as_deref(), Some("GObject.Object"));
    assert_eq!(animal.implements, vec!["Named"]);
    assert_eq!(animal.functions_of(FunctionKind::Signal).len(), 1);

    let feed = &animal.methods[0];
    assert_eq!(feed.parameters.len(), 1, "instance parameter is not a parameter");
    assert!(feed.parameters[0].allow_none);

    let property = &animal.variables_of(VariableKind::Property)[0];
    assert!(property.writable);
    assert!(!property.construct_only);

    assert_eq!(ns.interfaces[0].prerequisites, vec!["GObject.Object"]);
}

#[test]
fn test_enum_member_display_name_fallback() {
    let repo = sample();
    let kind = &repo.namespace.enumerations[0];
    let names: Vec<_> = kind
        .members
        .iter()
        .map(EnumMember::display_name)
        .collect();
    assert_eq!(names, vec![Some("cat"), Some("ZOO_KIND_DOG")]);
}

#[test]
fn test_array_return_value() {
    let repo = sample();
    let list_all = &repo.namespace.functions[0];
    let ret = list_all.return_value.as_ref().expect("return value");
    assert_eq!(ret.array_length(), Some(0));
    match &ret.ty {
        Some(TypeRef::Array(array)) => {
            assert_eq!(array.c_type.as_deref(), Some("ZooAnimal**"));
            assert!(matches!(
                array.element.as_deref(),
                Some(TypeRef::Named(NamedType { name: Some(name), .. })) if name == "Animal"
            ));
        }
        other => panic!("expected array type, got {other:?}"),
    }
    assert_eq!(list_all.parameters[0].direction, Direction::Out);
}

#[test]
fn test_missing_namespace_is_an_error() {
    let mut ids = NodeIdGen::new();
    let raw = parse_gir(r#"<repository version="1.2"/>"#, &mut ids).expect("parses");
    let err = Repository::from_raw(&raw).expect_err("no namespace");
    assert!(err.to_string().contains("Namespace not found"));
}

#[test]
fn test_namespace_without_name_is_an_error() {
    let mut ids = NodeIdGen::new();
    let raw = parse_gir(
        r#"<repository><namespace version="1.0"/></repository>"#,
        &mut ids,
    )
    .expect("parses");
    assert!(Repository::from_raw(&raw).is_err());
}

#[test]
fn test_non_repository_root_is_rejected() {
    let mut ids = NodeIdGen::new();
    assert!(parse_gir("<namespace/>", &mut ids).is_err());
    assert!(parse_gir("<repository", &mut ids).is_err());
}

#[test]
fn test_gir_bool() {
    assert!(raw::gir_bool(Some("1"), false));
    assert!(!raw::gir_bool(Some("0"), true));
    assert!(raw::gir_bool(Some("yes"), false));
    assert!(raw::gir_bool(None, true));
    assert!(!raw::gir_bool(Some(""), false));
}
