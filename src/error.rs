use deku::DekuError;
use uuid::Uuid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A read needed more bytes than the buffer holds.
	#[error("unexpected end of data")]
	UnexpectedEndOfData,

	/// A tag would read past the end of its chunk.
	#[error("tag at offset {offset} overruns chunk ending at {end}")]
	ChunkOverrun { offset: usize, end: usize },

	#[error("tag {kind:#06x} is fixed at {expected} bytes, payload has {actual}")]
	TagLengthMismatch {
		kind: u16,
		expected: u32,
		actual: usize,
	},

	#[error("malformed data: {0}")]
	Malformed(String),

	#[error("not a package: bad magic")]
	BadMagic,

	#[error("unsupported package version {0}")]
	UnsupportedVersion(u16),

	#[error("unknown chunk {0:#010x}")]
	UnknownChunk(u32),

	#[error("message response appears before any object")]
	OrphanResponse,

	#[error("duplicate object guid {0}")]
	DuplicateGuid(Uuid),

	#[error("object {guid} references missing parent {parent}")]
	MissingParent { guid: Uuid, parent: Uuid },

	#[error("parent chain of object {0} is cyclic")]
	ParentCycle(Uuid),

	#[error("object {guid} name hash {stored:#018x} does not match computed {computed:#018x}")]
	NameHashMismatch {
		guid: Uuid,
		stored: u64,
		computed: u64,
	},

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl From<DekuError> for Error {
	fn from(err: DekuError) -> Self {
		match err {
			DekuError::Incomplete(_) => Self::UnexpectedEndOfData,
			DekuError::Io(std::io::ErrorKind::UnexpectedEof) => Self::UnexpectedEndOfData,
			other => Self::Malformed(other.to_string()),
		}
	}
}

impl From<std::num::TryFromIntError> for Error {
	fn from(err: std::num::TryFromIntError) -> Self {
		Self::Malformed(err.to_string())
	}
}

impl From<Error> for std::io::Error {
	fn from(err: Error) -> Self {
		match err {
			Error::Io(err) => err,
			Error::UnexpectedEndOfData => {
				std::io::Error::new(std::io::ErrorKind::UnexpectedEof, err)
			}
			other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
		}
	}
}
