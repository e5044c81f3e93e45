//! Schema oracle backed by a prost-reflect descriptor pool

use super::converter;
use crate::TypeMapper;
use prost_reflect::DescriptorPool;
use protosample_common::{
    EnumRef, FieldShape, GeneratorError, MessageRef, NamePattern, QualifiedName,
    ResourcePattern, Result, RpcMethod, SchemaOracle,
};
use std::collections::HashMap;
use tracing::debug;

/// [`SchemaOracle`] over a [`DescriptorPool`]
///
/// Resource name patterns from the sample configuration are overlaid on the
/// string fields they name.
#[derive(Debug, Clone)]
pub struct DescriptorOracle {
    pool: DescriptorPool,

    /// (message full name, field name) -> pattern
    patterns: HashMap<(String, String), NamePattern>,
}

impl DescriptorOracle {
    pub fn new(pool: DescriptorPool) -> Self {
        Self {
            pool,
            patterns: HashMap::new(),
        }
    }

    /// Attach resource name patterns
    ///
    /// Each pattern must name an existing singular string field.
    pub fn with_resource_patterns(mut self, patterns: &[ResourcePattern]) -> Result<Self> {
        for resource in patterns {
            let message = self
                .pool
                .get_message_by_name(&resource.message)
                .ok_or_else(|| {
                    GeneratorError::Parse(format!(
                        "Resource pattern names unknown message {}",
                        resource.message
                    ))
                })?;
            let field = message.get_field_by_name(&resource.field).ok_or_else(|| {
                GeneratorError::Parse(format!(
                    "Resource pattern names unknown field {}.{}",
                    resource.message, resource.field
                ))
            })?;

            let pattern = NamePattern::parse(&resource.pattern)?;
            let shape = converter::field_shape(&field).ok_or_else(|| {
                GeneratorError::Parse(format!(
                    "Unsupported field type for {}.{}",
                    resource.message, resource.field
                ))
            })?;
            // rejects anything but a singular string
            shape.with_name_pattern(pattern.clone())?;

            debug!(
                message = %resource.message,
                field = %resource.field,
                pattern = %resource.pattern,
                "registered resource name pattern"
            );
            self.patterns
                .insert((resource.message.clone(), resource.field.clone()), pattern);
        }

        Ok(self)
    }

    /// Get reference to the underlying descriptor pool
    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }
}

impl SchemaOracle for DescriptorOracle {
    fn field_of(&self, message: &MessageRef, field: &str) -> Option<FieldShape> {
        let descriptor = self.pool.get_message_by_name(&message.full_name)?;
        let field_desc = descriptor.get_field_by_name(field)?;
        let shape = converter::field_shape(&field_desc)?;

        let key = (message.full_name.clone(), field.to_string());
        match self.patterns.get(&key) {
            Some(pattern) => shape.clone().with_name_pattern(pattern.clone()).ok().or(Some(shape)),
            None => Some(shape),
        }
    }

    fn enum_has_value(&self, enum_ref: &EnumRef, value: &str) -> bool {
        self.pool
            .get_enum_by_name(&enum_ref.full_name)
            .is_some_and(|e| e.get_value_by_name(value).is_some())
    }

    fn qualified_name(&self, full_name: &str) -> Option<QualifiedName> {
        let file = match self.pool.get_message_by_name(full_name) {
            Some(message) => message.parent_file(),
            None => self.pool.get_enum_by_name(full_name)?.parent_file(),
        };

        let (import_path, package) = TypeMapper::go_package(&file);
        Some(QualifiedName {
            import_path,
            package,
            name: TypeMapper::go_type_name(full_name, file.package_name()),
        })
    }

    fn enclosing_message(&self, enum_ref: &EnumRef) -> Option<MessageRef> {
        self.pool
            .get_enum_by_name(&enum_ref.full_name)?
            .parent_message()
            .map(|parent| MessageRef::new(parent.full_name()))
    }

    fn method(&self, service: &str, rpc: &str) -> Option<RpcMethod> {
        let service = self.pool.get_service_by_name(service)?;
        let method = service.methods().find(|m| m.name() == rpc)?;

        Some(RpcMethod {
            name: method.name().to_string(),
            input: MessageRef::new(method.input().full_name()),
            output: MessageRef::new(method.output().full_name()),
        })
    }
}
