//! Domain model (type descriptors, bindings, signatures, wire envelope, errors).

pub mod binding;
pub mod descriptor;
pub mod envelope;
pub mod errors;
pub mod signature;
pub mod time;

pub use self::binding::MethodBinding;
pub use self::descriptor::{
    FieldDef, NumberKind, StructDef, StructRef, TypeDescriptor, TypeGraph, TypeKind,
};
pub use self::envelope::{CBOR_CONTENT_TYPE, RPC_FAILED_HEADER, RPC_FAILED_MARKER, Reply};
pub use self::errors::{BindError, FieldError, Rejection, RpcError, ValidationErrors};
pub use self::signature::{ALLOWED_SHAPE, Input, Output, Signature};
pub use self::time::UnixTime;
