//! JSON views of reflections for printing.

use phpscope_reflection::{
    ClassKind, ClassMember, ReflectionClassLike, ReflectionConstant, ReflectionMethod,
    ReflectionParameter, ReflectionProperty, Visibility,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ClassView {
    pub name: String,
    pub kind: ClassKind,
    pub is_abstract: bool,
    pub is_final: bool,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub traits: Vec<String>,
    pub constants: Vec<ConstantView>,
    pub properties: Vec<PropertyView>,
    pub methods: Vec<MethodView>,
}

#[derive(Debug, Serialize)]
pub struct MethodView {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub declaring_class: String,
    pub return_type: String,
    pub inferred_return_types: String,
    pub parameters: Vec<ParameterView>,
}

#[derive(Debug, Serialize)]
pub struct ParameterView {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub variadic: bool,
    pub by_reference: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PropertyView {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub declaring_class: String,
    pub types: String,
}

#[derive(Debug, Serialize)]
pub struct ConstantView {
    pub name: String,
    pub declaring_class: String,
    pub types: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl From<&ReflectionClassLike> for ClassView {
    fn from(class: &ReflectionClassLike) -> Self {
        Self {
            name: class.name().to_string(),
            kind: class.kind(),
            is_abstract: class.is_abstract(),
            is_final: class.is_final(),
            parent: class.parent().map(|parent| parent.name().to_string()),
            interfaces: class
                .interfaces()
                .iter()
                .map(|interface| interface.name().to_string())
                .collect(),
            traits: class
                .traits()
                .iter()
                .map(|used| used.name().to_string())
                .collect(),
            constants: class.constants().iter().map(ConstantView::from).collect(),
            properties: class.properties().iter().map(PropertyView::from).collect(),
            methods: class.methods().iter().map(MethodView::from).collect(),
        }
    }
}

impl From<&ReflectionMethod> for MethodView {
    fn from(method: &ReflectionMethod) -> Self {
        Self {
            name: method.name().to_string(),
            visibility: method.visibility(),
            is_static: method.is_static(),
            is_abstract: method.is_abstract(),
            declaring_class: method.declaring_class().to_string(),
            return_type: method.return_type().to_string(),
            inferred_return_types: method.inferred_return_types().to_string(),
            parameters: method.parameters().iter().map(ParameterView::from).collect(),
        }
    }
}

impl From<&ReflectionParameter> for ParameterView {
    fn from(parameter: &ReflectionParameter) -> Self {
        Self {
            name: parameter.name().to_string(),
            ty: parameter.inferred_types().to_string(),
            variadic: parameter.is_variadic(),
            by_reference: parameter.by_reference(),
            default: parameter.default_value().map(ToString::to_string),
        }
    }
}

impl From<&ReflectionProperty> for PropertyView {
    fn from(property: &ReflectionProperty) -> Self {
        Self {
            name: property.name().to_string(),
            visibility: property.visibility(),
            is_static: property.is_static(),
            declaring_class: property.declaring_class().to_string(),
            types: property.inferred_types().to_string(),
        }
    }
}

impl From<&ReflectionConstant> for ConstantView {
    fn from(constant: &ReflectionConstant) -> Self {
        Self {
            name: constant.name().to_string(),
            declaring_class: constant.declaring_class().to_string(),
            types: constant.inferred_types().to_string(),
            value: constant.value().map(ToString::to_string),
        }
    }
}

pub fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use phpscope_api::ClassName;
    use phpscope_reflection::{ClassReflector, Reflector};

    #[test]
    fn test_class_view_lists_members() {
        let reflector = Reflector::builder()
            .add_source(
                r#"<?php
class Post
{
    const STATUS = 'draft';
    private $title;
    public function publish(string ...$channels): bool {}
}
"#,
            )
            .build();
        let class = reflector.reflect_class_like(&ClassName::new("Post")).unwrap();
        let view = ClassView::from(class.as_ref());

        assert_eq!(view.name, "Post");
        assert_eq!(view.constants[0].value.as_deref(), Some("\"draft\""));
        assert_eq!(view.properties[0].name, "title");
        assert_eq!(view.methods[0].name, "publish");
        assert_eq!(view.methods[0].parameters[0].ty, "string[]");
        assert!(view.methods[0].parameters[0].variadic);

        let json = to_json(&view).unwrap();
        assert!(json.contains("\"kind\": \"class\""));
    }
}
