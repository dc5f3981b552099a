/// Options used when reading packages.
///
/// The defaults are lenient: unknown chunks are skipped and stored name
/// hashes are trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
	/// What to do with chunks of a kind this crate doesn't know.
	///
	/// Defaults to [`UnknownChunks::Skip`].
	pub unknown_chunks: UnknownChunks,

	/// Upper bound on how many objects a count hint may reserve space for.
	///
	/// Count hints are only used to size buffers, so a larger hint is clamped
	/// rather than rejected.
	///
	/// Defaults to 65536.
	pub max_count_hint: u32,

	/// Whether to recompute every object's name hash and reject mismatches.
	///
	/// Defaults to false.
	pub verify_name_hashes: bool,
}

impl Default for ReadOptions {
	fn default() -> Self {
		Self {
			unknown_chunks: UnknownChunks::default(),
			max_count_hint: 65536,
			verify_name_hashes: false,
		}
	}
}

impl ReadOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_unknown_chunks(mut self, unknown_chunks: UnknownChunks) -> Self {
		self.unknown_chunks = unknown_chunks;
		self
	}

	pub fn with_max_count_hint(mut self, max_count_hint: u32) -> Self {
		self.max_count_hint = max_count_hint;
		self
	}

	pub fn with_verify_name_hashes(mut self, verify_name_hashes: bool) -> Self {
		self.verify_name_hashes = verify_name_hashes;
		self
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownChunks {
	/// Step over the chunk using its declared size.
	#[default]
	Skip,

	/// Fail with [`Error::UnknownChunk`](crate::error::Error::UnknownChunk).
	Reject,
}

/// Options used when writing packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
	/// Whether to start the objects chunk with a count hint.
	///
	/// Defaults to true.
	pub count_hint: bool,

	/// Whether to write a metadata chunk when the package has a title.
	///
	/// Defaults to true.
	pub metadata: bool,
}

impl Default for WriteOptions {
	fn default() -> Self {
		Self {
			count_hint: true,
			metadata: true,
		}
	}
}

impl WriteOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_count_hint(mut self, count_hint: bool) -> Self {
		self.count_hint = count_hint;
		self
	}

	pub fn with_metadata(mut self, metadata: bool) -> Self {
		self.metadata = metadata;
		self
	}
}
