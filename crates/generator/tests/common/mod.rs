//! Library service descriptor shared by the integration tests
//!
//! ```text
//! // google/protobuf/empty.proto
//! message Empty {}
//!
//! // library.proto, package library.v1,
//! // go_package "example.com/library/apiv1/librarypb;librarypb"
//! enum Format { FORMAT_UNSPECIFIED = 0; PDF = 1; }
//! message Book {
//!   enum Kind { KIND_UNSPECIFIED = 0; HARDCOVER = 1; }
//!   string name = 1; string title = 2; int64 page_count = 3; float rating = 4;
//!   Kind kind = 5; Format format = 6; repeated string tags = 7;
//!   map<string, string> labels = 8; Author author = 9; bytes cover = 10;
//!   repeated Chapter chapters = 11;
//! }
//! message Author { string display_name = 1; }
//! message Chapter { string title = 1; int32 pages = 2; }
//! message CreateBookRequest { string parent = 1; Book book = 2; }
//! message GetBookRequest { string name = 1; }
//! message SearchBooksResponse { map<string, Book> results = 1; }
//! service LibraryService {
//!   rpc CreateBook(CreateBookRequest) returns (Book);
//!   rpc GetBook(GetBookRequest) returns (Book);
//!   rpc DeleteBook(GetBookRequest) returns (google.protobuf.Empty);
//!   rpc SearchBooks(GetBookRequest) returns (SearchBooksResponse);
//! }
//! ```

#![allow(dead_code)]

use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet, FileOptions, MessageOptions, MethodDescriptorProto,
    ServiceDescriptorProto,
};
use protosample_common::{ClientInfo, ResourcePattern};
use protosample_parser::{DescriptorOracle, ProtobufParser};

pub const SERVICE: &str = "library.v1.LibraryService";

fn field(name: &str, number: i32, ty: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        ..Default::default()
    }
}

fn typed(name: &str, number: i32, ty: Type, type_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_string()),
        ..field(name, number, ty)
    }
}

fn repeated(mut field: FieldDescriptorProto) -> FieldDescriptorProto {
    field.label = Some(Label::Repeated as i32);
    field
}

fn map_entry(name: &str, value: FieldDescriptorProto) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: vec![field("key", 1, Type::String), value],
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn enumeration(name: &str, values: &[&str]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_string()),
        value: values
            .iter()
            .enumerate()
            .map(|(number, value)| EnumValueDescriptorProto {
                name: Some(value.to_string()),
                number: Some(number as i32),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field: fields,
        ..Default::default()
    }
}

fn method(name: &str, input: &str, output: &str) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(input.to_string()),
        output_type: Some(output.to_string()),
        ..Default::default()
    }
}

pub fn library_descriptor_set() -> FileDescriptorSet {
    let empty = FileDescriptorProto {
        name: Some("google/protobuf/empty.proto".to_string()),
        package: Some("google.protobuf".to_string()),
        message_type: vec![message("Empty", vec![])],
        options: Some(FileOptions {
            go_package: Some("google.golang.org/protobuf/types/known/emptypb".to_string()),
            ..Default::default()
        }),
        syntax: Some("proto3".to_string()),
        ..Default::default()
    };

    let book = DescriptorProto {
        name: Some("Book".to_string()),
        field: vec![
            field("name", 1, Type::String),
            field("title", 2, Type::String),
            field("page_count", 3, Type::Int64),
            field("rating", 4, Type::Float),
            typed("kind", 5, Type::Enum, ".library.v1.Book.Kind"),
            typed("format", 6, Type::Enum, ".library.v1.Format"),
            repeated(field("tags", 7, Type::String)),
            repeated(typed(
                "labels",
                8,
                Type::Message,
                ".library.v1.Book.LabelsEntry",
            )),
            typed("author", 9, Type::Message, ".library.v1.Author"),
            field("cover", 10, Type::Bytes),
            repeated(typed("chapters", 11, Type::Message, ".library.v1.Chapter")),
        ],
        nested_type: vec![map_entry("LabelsEntry", field("value", 2, Type::String))],
        enum_type: vec![enumeration("Kind", &["KIND_UNSPECIFIED", "HARDCOVER"])],
        ..Default::default()
    };

    let search_response = DescriptorProto {
        name: Some("SearchBooksResponse".to_string()),
        field: vec![repeated(typed(
            "results",
            1,
            Type::Message,
            ".library.v1.SearchBooksResponse.ResultsEntry",
        ))],
        nested_type: vec![map_entry(
            "ResultsEntry",
            typed("value", 2, Type::Message, ".library.v1.Book"),
        )],
        ..Default::default()
    };

    let library = FileDescriptorProto {
        name: Some("library/v1/library.proto".to_string()),
        package: Some("library.v1".to_string()),
        dependency: vec!["google/protobuf/empty.proto".to_string()],
        message_type: vec![
            book,
            message("Author", vec![field("display_name", 1, Type::String)]),
            message(
                "Chapter",
                vec![field("title", 1, Type::String), field("pages", 2, Type::Int32)],
            ),
            message(
                "CreateBookRequest",
                vec![
                    field("parent", 1, Type::String),
                    typed("book", 2, Type::Message, ".library.v1.Book"),
                ],
            ),
            message("GetBookRequest", vec![field("name", 1, Type::String)]),
            search_response,
        ],
        enum_type: vec![enumeration("Format", &["FORMAT_UNSPECIFIED", "PDF"])],
        service: vec![ServiceDescriptorProto {
            name: Some("LibraryService".to_string()),
            method: vec![
                method(
                    "CreateBook",
                    ".library.v1.CreateBookRequest",
                    ".library.v1.Book",
                ),
                method("GetBook", ".library.v1.GetBookRequest", ".library.v1.Book"),
                method(
                    "DeleteBook",
                    ".library.v1.GetBookRequest",
                    ".google.protobuf.Empty",
                ),
                method(
                    "SearchBooks",
                    ".library.v1.GetBookRequest",
                    ".library.v1.SearchBooksResponse",
                ),
            ],
            ..Default::default()
        }],
        options: Some(FileOptions {
            go_package: Some("example.com/library/apiv1/librarypb;librarypb".to_string()),
            ..Default::default()
        }),
        syntax: Some("proto3".to_string()),
        ..Default::default()
    };

    FileDescriptorSet {
        file: vec![empty, library],
    }
}

pub fn library_bytes() -> Vec<u8> {
    library_descriptor_set().encode_to_vec()
}

pub fn library_oracle(patterns: &[ResourcePattern]) -> DescriptorOracle {
    ProtobufParser::from_file_descriptor_set(&library_bytes())
        .expect("library descriptor set is valid")
        .parse(patterns)
        .expect("resource patterns are valid")
}

pub fn book_name_pattern() -> ResourcePattern {
    ResourcePattern {
        message: "library.v1.GetBookRequest".to_string(),
        field: "name".to_string(),
        pattern: "shelves/{shelf}/books/{book}".to_string(),
    }
}

pub fn client() -> ClientInfo {
    ClientInfo {
        import_path: "example.com/library/apiv1".to_string(),
        package: "library".to_string(),
        constructor: "NewClient".to_string(),
    }
}
