//! Member lookups on a resolved owner type.

use crate::reflection::ReflectionClassLike;
use crate::reflector::ClassReflector;
use phpscope_api::{SymbolContext, Type};
use std::sync::Arc;
use tracing::warn;

#[derive(Clone, Copy)]
pub struct MemberTypeResolver<'a> {
    reflector: &'a dyn ClassReflector,
}

impl<'a> MemberTypeResolver<'a> {
    pub fn new(reflector: &'a dyn ClassReflector) -> Self {
        Self { reflector }
    }

    pub fn method_type(&self, owner: &Type, context: SymbolContext, name: &str) -> SymbolContext {
        let (class, context) = match self.reflect_owner(owner, context, "method", name) {
            Ok(found) => found,
            Err(context) => return context,
        };

        match class.methods().get(name) {
            Some(method) => context.with_types(method.inferred_return_types()),
            None => missing(context, &class, "method", name),
        }
    }

    pub fn property_type(&self, owner: &Type, context: SymbolContext, name: &str) -> SymbolContext {
        let (class, context) = match self.reflect_owner(owner, context, "property", name) {
            Ok(found) => found,
            Err(context) => return context,
        };

        if class.is_interface() {
            return context;
        }

        match class.properties().get(name) {
            Some(property) => context.with_types(property.inferred_types()),
            None => missing(context, &class, "property", name),
        }
    }

    pub fn constant_type(&self, owner: &Type, context: SymbolContext, name: &str) -> SymbolContext {
        let (class, context) = match self.reflect_owner(owner, context, "constant", name) {
            Ok(found) => found,
            Err(context) => return context,
        };

        match class.constants().get(name) {
            Some(constant) => {
                let context = context.with_types(constant.inferred_types());
                match constant.value() {
                    Some(value) => context.with_value(value.clone()),
                    None => context,
                }
            }
            None => missing(context, &class, "constant", name),
        }
    }

    /// Reflect the class behind `owner`, or hand back `context` with an
    /// issue explaining why that was not possible.
    fn reflect_owner(
        &self,
        owner: &Type,
        context: SymbolContext,
        member: &str,
        name: &str,
    ) -> Result<(Arc<ReflectionClassLike>, SymbolContext), SymbolContext> {
        let Some(class_name) = owner.strip_nullable().class_name() else {
            return Err(context.with_issue(format!(
                "Cannot resolve {} \"{}\" on non-class type \"{}\"",
                member, name, owner
            )));
        };

        match self.reflector.reflect_class_like(class_name) {
            Ok(class) => {
                let context = context.with_container_type(Type::Class(class.name().clone()));
                Ok((class, context))
            }
            Err(e) => {
                warn!("Unable to reflect {} for {} \"{}\": {}", class_name, member, name, e);
                Err(context.with_issue(format!(
                    "Unable to locate class \"{}\" for {} \"{}\"",
                    class_name, member, name
                )))
            }
        }
    }
}

fn missing(
    context: SymbolContext,
    class: &ReflectionClassLike,
    member: &str,
    name: &str,
) -> SymbolContext {
    warn!("Class \"{}\" has no {} named \"{}\"", class.name(), member, name);
    context
        .with_type(Type::Undefined)
        .with_issue(format!(
            "Class \"{}\" has no {} named \"{}\"",
            class.name(),
            member,
            name
        ))
}
