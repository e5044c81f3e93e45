//! Type mapping from protobuf descriptors to shapes and Go names

use prost_reflect::{FileDescriptor, Kind};
use protosample_common::naming::{go_camel_case, go_package_ident};
use protosample_common::ScalarKind;

/// Maps descriptor kinds and names to the sample compiler's vocabulary
pub struct TypeMapper;

impl TypeMapper {
    /// Map a scalar protobuf kind to [`ScalarKind`]
    ///
    /// Returns `None` for messages and enums.
    pub fn scalar_kind(kind: &Kind) -> Option<ScalarKind> {
        Some(match kind {
            Kind::Bool => ScalarKind::Bool,
            Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => ScalarKind::Int32,
            Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => ScalarKind::Int64,
            Kind::Uint32 | Kind::Fixed32 => ScalarKind::Uint32,
            Kind::Uint64 | Kind::Fixed64 => ScalarKind::Uint64,
            Kind::Float => ScalarKind::Float,
            Kind::Double => ScalarKind::Double,
            Kind::String => ScalarKind::String,
            Kind::Bytes => ScalarKind::Bytes,
            Kind::Message(_) | Kind::Enum(_) => return None,
        })
    }

    /// Go import path and package alias for the types declared in `file`
    ///
    /// Uses the `go_package` option when present (`path;alias` or `path`),
    /// otherwise derives both from the proto package.
    pub fn go_package(file: &FileDescriptor) -> (String, String) {
        let go_package = file
            .file_descriptor_proto()
            .options
            .as_ref()
            .and_then(|options| options.go_package.clone())
            .filter(|p| !p.is_empty());

        match go_package {
            Some(go_package) => match go_package.split_once(';') {
                Some((path, alias)) => (path.to_string(), go_package_ident(alias)),
                None => {
                    let last = go_package.rsplit('/').next().unwrap_or(&go_package);
                    let alias = go_package_ident(last);
                    (go_package, alias)
                }
            },
            None => {
                let package = file.package_name();
                let path = package.replace('.', "/");
                (path, Self::package_alias(package))
            }
        }
    }

    /// Alias for a proto package without `go_package`
    ///
    /// The last non-version component with a `pb` suffix, e.g.
    /// `library.v1` -> `librarypb`.
    fn package_alias(package: &str) -> String {
        let base = package
            .split('.')
            .rev()
            .find(|component| !Self::is_version(component))
            .unwrap_or("");
        go_package_ident(&format!("{}pb", base))
    }

    fn is_version(component: &str) -> bool {
        let mut chars = component.chars();
        chars.next() == Some('v') && chars.next().is_some_and(|c| c.is_ascii_digit())
    }

    /// Go type name of a message or enum relative to its package
    ///
    /// Nested types are joined with `_`: `library.v1.Book.Kind` in package
    /// `library.v1` becomes `Book_Kind`.
    pub fn go_type_name(full_name: &str, package: &str) -> String {
        let relative = if package.is_empty() {
            full_name
        } else {
            full_name
                .strip_prefix(package)
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(full_name)
        };

        relative
            .split('.')
            .map(go_camel_case)
            .collect::<Vec<_>>()
            .join("_")
    }
}
