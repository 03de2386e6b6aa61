mod common;

use common::reflector_for;
use phpscope_api::ClassName;
use phpscope_reflection::{ClassKind, ClassMember, ClassReflector, ReflectionError};

#[test]
fn test_reflects_an_interface() {
    let reflector = reflector_for("<?php\n\ninterface Barfoo\n{\n}\n");
    let interface = reflector.reflect_interface(&ClassName::new("Barfoo")).unwrap();
    assert_eq!(interface.name().short(), "Barfoo");
    assert!(interface.is_interface());
    assert_eq!(interface.kind(), ClassKind::Interface);
}

#[test]
fn test_class_interfaces() {
    let reflector = reflector_for(
        r#"<?php

interface Barfoo
{
}

interface Bazbar
{
}

class Foobar implements Barfoo, Bazbar
{
}
"#,
    );

    let class = reflector.reflect_class(&ClassName::new("Foobar")).unwrap();
    let interfaces = class.interfaces();
    assert_eq!(interfaces.len(), 2);
    assert!(interfaces.get("Barfoo").unwrap().is_interface());
}

#[test]
fn test_extended_interfaces_are_parents() {
    let reflector = reflector_for(
        r#"<?php

interface Barfoo
{
    public function methodOne();
}

interface Zedboo
{
    public function methodTwo();
}

interface Bazbar extends Barfoo, Zedboo
{
}
"#,
    );

    let interface = reflector.reflect_interface(&ClassName::new("Bazbar")).unwrap();
    let parents = interface.parents();
    assert_eq!(parents.len(), 2);
    assert!(parents.get("Barfoo").unwrap().is_interface());
    assert_eq!(interface.methods().len(), 2);
}

#[test]
fn test_interface_methods() {
    let reflector = reflector_for("<?php\n\ninterface Barfoo\n{\n    public function foobar();\n}\n");
    let interface = reflector.reflect_class_like(&ClassName::new("Barfoo")).unwrap();
    assert_eq!(interface.methods().keys(), vec!["foobar"]);
    assert!(interface.methods().get("foobar").unwrap().is_abstract());
}

#[test]
fn test_interface_constants_are_unioned() {
    let reflector = reflector_for(
        r#"<?php

interface Int1
{
    const FOOBAR = 'foobar';
}

interface Int2
{
    const FOOBAR = 'foobar';
    const BARFOO = 'barfoo';
}

interface Int3 extends Int1, Int2
{
    const EEEBAR = 'eeebar';
}
"#,
    );

    let interface = reflector.reflect_class_like(&ClassName::new("Int3")).unwrap();
    let constants = interface.constants();
    assert_eq!(constants.len(), 3);
    assert!(constants.has("FOOBAR"));
    assert!(constants.has("EEEBAR"));
    assert_eq!(
        constants.get("EEEBAR").unwrap().value(),
        Some(&phpscope_api::Value::string("eeebar"))
    );
}

#[test]
fn test_instance_of() {
    let reflector = reflector_for(
        "<?php\n\ninterface Interface1\n{\n}\n\ninterface Interface2 extends Interface1\n{\n}\n",
    );

    let interface = reflector.reflect_class_like(&ClassName::new("Interface2")).unwrap();
    assert!(interface.is_instance_of(&ClassName::new("Interface2")));
    assert!(interface.is_instance_of(&ClassName::new("Interface1")));
    assert!(!interface.is_instance_of(&ClassName::new("Interface3")));
}

#[test]
fn test_annotated_method_keeps_context_class() {
    let reflector = reflector_for(
        r#"<?php

namespace Acme;

interface Barfoo
{
    function method1();
}

/**
 * @method Bar method1()
 */
interface Foobar extends Barfoo
{
}
"#,
    );

    let interface = reflector.reflect_interface(&ClassName::new("Acme\\Foobar")).unwrap();
    let method = interface.methods().get("method1").unwrap();
    assert_eq!(method.class(), &ClassName::new("Acme\\Foobar"));
    assert_eq!(method.declaring_class(), &ClassName::new("Acme\\Barfoo"));
    assert_eq!(
        method.inferred_return_types().best(),
        &phpscope_api::Type::class("Acme\\Bar")
    );
}

#[test]
fn test_kind_checks() {
    let reflector = reflector_for("<?php\n\ninterface Barfoo {}\nclass Foobar {}\ntrait Usable {}\n");

    assert!(matches!(
        reflector.reflect_class(&ClassName::new("Barfoo")),
        Err(ReflectionError::NotAClass(_))
    ));
    assert!(matches!(
        reflector.reflect_class(&ClassName::new("Usable")),
        Err(ReflectionError::NotAClass(_))
    ));
    assert!(matches!(
        reflector.reflect_interface(&ClassName::new("Foobar")),
        Err(ReflectionError::NotAnInterface(_))
    ));
    assert!(reflector.reflect_class(&ClassName::new("Foobar")).is_ok());
}
