pub mod error;
pub mod hash;
pub mod primitives;

pub mod data;
pub mod message;
pub mod object;
pub mod script;

pub mod dispatch;
pub mod options;
pub mod package;
pub mod tag;

pub mod impls;

pub(crate) mod deku_helpers;

pub use error::{Error, Result};
pub use object::{Object, ObjectKind};
pub use options::{ReadOptions, WriteOptions};
pub use package::Package;
