//! Converts protobuf field descriptors to field shapes

use crate::TypeMapper;
use prost_reflect::{FieldDescriptor, Kind};
use protosample_common::{EnumRef, FieldShape, MessageRef};

/// Shape of a field, including repetition and map entries
///
/// `None` if the field, or a map entry's key or value, has no shape.
pub fn field_shape(field: &FieldDescriptor) -> Option<FieldShape> {
    if field.is_map() {
        if let Kind::Message(entry) = field.kind() {
            let key = TypeMapper::scalar_kind(&entry.map_entry_key_field().kind())?;
            let value = kind_shape(&entry.map_entry_value_field().kind())?;
            return Some(FieldShape::map(key, value));
        }
    }

    let shape = kind_shape(&field.kind())?;
    if field.is_list() {
        Some(shape.into_repeated())
    } else {
        Some(shape)
    }
}

/// Shape of a single (non-repeated) value of `kind`
fn kind_shape(kind: &Kind) -> Option<FieldShape> {
    match kind {
        Kind::Message(message) => Some(FieldShape::message(MessageRef::new(message.full_name()))),
        Kind::Enum(enum_desc) => Some(FieldShape::enumeration(EnumRef::new(enum_desc.full_name()))),
        scalar => TypeMapper::scalar_kind(scalar).map(FieldShape::scalar),
    }
}
