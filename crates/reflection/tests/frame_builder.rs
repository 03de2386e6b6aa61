mod common;

use common::{reflect_marker, reflector_for};
use phpscope_api::{ArrayKey, ClassName, SymbolKind, Type, Value};
use phpscope_reflection::Frame;

fn method_frame(source: &str, class: &str, method: &str) -> Frame {
    reflector_for(source)
        .reflect_method_frame(&ClassName::new(class), method)
        .unwrap()
}

#[test]
fn test_method_frame_binds_this() {
    let frame = method_frame(
        r#"<?php

namespace Foobar\Barfoo;

use Acme\Factory;

class Foobar
{
    public function hello()
    {
    }
}
"#,
        "Foobar\\Barfoo\\Foobar",
        "hello",
    );

    let this = frame.locals().by_name("this");
    assert_eq!(this.len(), 1);
    let context = this.first().unwrap().symbol_context();
    assert_eq!(context.ty(), &Type::class("Foobar\\Barfoo\\Foobar"));
    assert_eq!(context.symbol().kind, SymbolKind::Variable);
}

#[test]
fn test_method_frame_binds_parameters() {
    let frame = method_frame(
        r#"<?php

namespace Foobar\Barfoo;

class Foobar
{
    public function hello(World $world)
    {
    }
}
"#,
        "Foobar\\Barfoo\\Foobar",
        "hello",
    );

    assert_eq!(frame.locals().by_name("this").len(), 1);
    let world = frame.locals().by_name("world");
    assert_eq!(world.len(), 1);
    assert_eq!(
        world.first().unwrap().symbol_context().ty(),
        &Type::class("Foobar\\Barfoo\\World")
    );
}

#[test]
fn test_registers_string_assignments() {
    let offset = reflect_marker(
        r#"<?php

class Foobar
{
    public function hello()
    {
        $foobar = 'foobar';
        <>
    }
}
"#,
    );

    let vars = offset.frame().locals().by_name("foobar");
    assert_eq!(vars.len(), 1);
    let context = vars.first().unwrap().symbol_context();
    assert_eq!(context.ty().to_string(), "string");
    assert_eq!(context.value(), Some(&Value::string("foobar")));
}

#[test]
fn test_reassigned_parameter_keeps_type_and_default() {
    let offset = reflect_marker(
        r#"<?php

class Foobar
{
    public function hello(World $world = 'test')
    {
        $foobar = $world;
        <>
    }
}
"#,
    );

    let vars = offset.frame().locals().by_name("foobar");
    assert_eq!(vars.len(), 1);
    let context = vars.first().unwrap().symbol_context();
    assert_eq!(context.ty().to_string(), "World");
    assert_eq!(context.value(), Some(&Value::string("test")));
}

#[test]
fn test_tracks_assigned_properties() {
    let offset = reflect_marker(
        r#"<?php

class Foobar
{
    public function hello(Barfoo $world)
    {
        $this->foobar = 'foobar';
        <>
    }
}
"#,
    );

    let vars = offset.frame().properties().by_name("foobar");
    assert_eq!(vars.len(), 1);
    let context = vars.first().unwrap().symbol_context();
    assert_eq!(context.ty().to_string(), "string");
    assert_eq!(context.value(), Some(&Value::string("foobar")));
    assert_eq!(context.symbol().kind, SymbolKind::Property);
}

#[test]
fn test_property_types_flow_into_locals() {
    let offset = reflect_marker(
        r#"<?php

class Foobar
{
    /** @var Foobar[] */
    private $foobar;

    public function hello(Barfoo $world)
    {
        $foobar = $this->foobar;
        <>
    }
}
"#,
    );

    let vars = offset.frame().locals().by_name("foobar");
    assert_eq!(vars.len(), 1);
    let ty = vars.first().unwrap().symbol_context().ty().clone();
    assert_eq!(ty.to_string(), "Foobar[]");
    assert_eq!(ty.array_type(), Some(&Type::class("Foobar")));
}

#[test]
fn test_tracks_array_pushes_onto_properties() {
    let offset = reflect_marker(
        r#"<?php

class Foobar
{
    public function hello()
    {
        $this->foobar[] = 'foobar';
        <>
    }
}
"#,
    );

    let vars = offset.frame().properties().by_name("foobar");
    assert_eq!(vars.len(), 1);
    let context = vars.first().unwrap().symbol_context();
    assert_eq!(context.ty().to_string(), "array");
    assert_eq!(context.value(), Some(&Value::string("foobar")));
}

#[test]
fn test_tracks_properties_named_by_variables() {
    let offset = reflect_marker(
        r#"<?php

class Foobar
{
    public function hello(Barfoo $world)
    {
        $foobar = 'foobar';
        $this->$foobar = 'foobar';
        <>
    }
}
"#,
    );

    let vars = offset.frame().properties().by_name("foobar");
    assert_eq!(vars.len(), 1);
    let context = vars.first().unwrap().symbol_context();
    assert_eq!(context.ty().to_string(), "string");
    assert_eq!(context.value(), Some(&Value::string("foobar")));
}

#[test]
fn test_array_literals_and_subscripts() {
    let offset = reflect_marker(
        r#"<?php
$foo = [ 'foo' => 'bar' ];
$bar = $foo['foo'];
<>
"#,
    );

    let locals = offset.frame().locals();
    assert_eq!(locals.len(), 2);

    let foo = locals.first().unwrap().symbol_context();
    assert_eq!(foo.ty().to_string(), "array");
    let entries = foo.value().and_then(Value::as_array).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries.get(&ArrayKey::from("foo")).and_then(|e| e.value()),
        Some(&Value::string("bar"))
    );

    let bar = locals.last().unwrap().symbol_context();
    assert_eq!(bar.ty().to_string(), "string");
    assert_eq!(bar.value(), Some(&Value::string("bar")));
}

#[test]
fn test_list_assignments_bind_positionally() {
    let offset = reflect_marker(
        r#"<?php
list($foo, $bar) = [ 'foo', 'bar' ];
<>
"#,
    );

    let locals = offset.frame().locals();
    assert_eq!(locals.len(), 2);
    let foo = locals.by_name("foo").first().unwrap().symbol_context();
    assert_eq!(foo.value(), Some(&Value::string("foo")));
    assert_eq!(foo.ty().to_string(), "string");
    let bar = locals.by_name("bar").first().unwrap().symbol_context();
    assert_eq!(bar.value(), Some(&Value::string("bar")));
}

#[test]
fn test_return_type_refined_by_docblock() {
    let offset = reflect_marker(
        r#"<?php

namespace Foobar;

use Foo\Lister;

interface Barfoo
{
    /**
     * @return Lister<Collection>
     */
    public static function bar(): Lister;
}

class Baz
{
    public function baz(Barfoo $barfoo)
    {
        $bar = $barfoo->bar();
        <>
    }
}
"#,
    );

    let locals = offset.frame().locals();
    assert_eq!(locals.len(), 3);
    let bar = locals.by_name("bar").first().unwrap().symbol_context().ty().clone();
    assert_eq!(bar.to_string(), "Foo\\Lister<Foobar\\Collection>");
    assert_eq!(bar.array_type(), Some(&Type::class("Foobar\\Collection")));
}

#[test]
fn test_foreach_value_typed_by_docblock() {
    let offset = reflect_marker(
        r#"<?php

class Foobar
{
    public function hello()
    {
        /** @var $foobar Foobar */
        foreach ($collection as $foobar) {
            $foobar->foobar();
            <>
        }
    }
}
"#,
    );

    let vars = offset.frame().locals().by_name("foobar");
    assert_eq!(vars.len(), 1);
    assert_eq!(vars.first().unwrap().symbol_context().ty().to_string(), "Foobar");
}

#[test]
fn test_foreach_value_typed_by_element_type() {
    let offset = reflect_marker(
        r#"<?php

class Foobar
{
    /**
     * @param Item[] $items
     */
    public function hello(array $items)
    {
        foreach ($items as $key => $item) {
            <>
        }
    }
}
"#,
    );

    let frame = offset.frame();
    assert_eq!(
        frame.locals().by_name("item").first().unwrap().symbol_context().ty(),
        &Type::class("Item")
    );
    assert_eq!(frame.locals().by_name("key").len(), 1);
}

#[test]
fn test_redeclared_variables_keep_history() {
    let offset = reflect_marker(
        r#"<?php

class Foobar
{
    public function hello()
    {
        $foobar = new Foobar();
        $foobar = new \stdClass();
        <>
    }
}
"#,
    );

    let vars = offset.frame().locals().by_name("foobar");
    assert_eq!(vars.len(), 2);
    assert_eq!(
        vars.first().unwrap().symbol_context().ty().class_name(),
        Some(&ClassName::new("Foobar"))
    );
    assert_eq!(
        vars.last().unwrap().symbol_context().ty().class_name(),
        Some(&ClassName::new("stdClass"))
    );
}

#[test]
fn test_closures_do_not_see_enclosing_locals() {
    let offset = reflect_marker(
        r#"<?php
$foo = 'bar';

$hello = function () {
    $bar = 'foo';
    <>
};
"#,
    );

    assert_eq!(offset.frame().locals().by_name("bar").len(), 1);
    assert_eq!(offset.frame().locals().by_name("foo").len(), 0);
}

#[test]
fn test_closure_parameters_are_injected() {
    let offset = reflect_marker(
        r#"<?php
$foo = 'bar';

$hello = function (Foobar $foo) {
    <>
};
"#,
    );

    let foo = offset.frame().locals().by_name("foo");
    assert_eq!(foo.len(), 1);
    assert_eq!(foo.first().unwrap().symbol_context().ty(), &Type::class("Foobar"));
}

#[test]
fn test_closure_use_variables_are_captured() {
    let offset = reflect_marker(
        r#"<?php
$zed = 'zed';
$art = 'art';

$hello = function () use ($zed) {
    <>
};
"#,
    );

    let zed = offset.frame().locals().by_name("zed");
    assert_eq!(zed.len(), 1);
    assert_eq!(zed.first().unwrap().symbol_context().ty().to_string(), "string");
    assert_eq!(offset.frame().locals().by_name("art").len(), 0);
}

#[test]
fn test_inline_var_annotation_types_a_local() {
    let offset = reflect_marker(
        r#"<?php

namespace App;

/** @var Post $post */
$post = load();
<>
"#,
    );

    let post = offset.frame().locals().by_name("post");
    assert_eq!(post.len(), 1);
    assert_eq!(post.first().unwrap().symbol_context().ty(), &Type::class("App\\Post"));
}

#[test]
fn test_array_keys_at_integer_limit() {
    let offset = reflect_marker(
        "<?php\n$big = [9223372036854775807 => 'x', 'y'];\n$small = [5 => 'a', 'b'];\n<>\n",
    );
    let locals = offset.frame().locals();

    let big = locals.by_name("big").first().unwrap().symbol_context();
    let entries = big.value().and_then(Value::as_array).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries.get(&ArrayKey::Int(i64::MAX)).and_then(|e| e.value()),
        Some(&Value::string("x"))
    );

    let small = locals.by_name("small").first().unwrap().symbol_context();
    let entries = small.value().and_then(Value::as_array).unwrap();
    assert_eq!(
        entries.get(&ArrayKey::Int(6)).and_then(|e| e.value()),
        Some(&Value::string("b"))
    );
}

#[test]
fn test_subscript_with_missing_key_is_unknown() {
    let offset = reflect_marker(
        r#"<?php
$foo = [ 'foo' => 'bar' ];
$bar = $foo['nope'];
<>
"#,
    );

    let bar = offset.frame().locals().by_name("bar");
    let context = bar.first().unwrap().symbol_context();
    assert_eq!(context.ty(), &Type::Unknown);
    assert_eq!(context.value(), None);
    assert!(
        context
            .issues()
            .contains(&"Array key \"nope\" is not defined".to_string())
    );
}

#[test]
fn test_ternary_prefers_the_if_branch() {
    let offset = reflect_marker(
        r#"<?php
$full = 'x' ? 'yes' : 10;
$short = 'cond' ?: 10;
$neither = $nothing ? $missing : 'no';
<>
"#,
    );
    let locals = offset.frame().locals();

    let full = locals.by_name("full").first().unwrap().symbol_context();
    assert_eq!(full.ty(), &Type::string());
    assert_eq!(full.value(), Some(&Value::string("yes")));

    let short = locals.by_name("short").first().unwrap().symbol_context();
    assert_eq!(short.value(), Some(&Value::string("cond")));

    let neither = locals.by_name("neither").first().unwrap().symbol_context();
    assert_eq!(neither.ty(), &Type::Unknown);
    assert_eq!(neither.value(), None);
}
