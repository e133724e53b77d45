//! Built-in accessor recognizers.

mod bean;
mod fluent;
mod protobuf;

pub use bean::BeanAccessorHandler;
pub use fluent::FluentAccessorHandler;
pub use protobuf::ProtobufAccessorHandler;
