use std::{future::Future, io, path::Path};

use crate::{
	options::{ReadOptions, WriteOptions},
	package::Package,
};

#[cfg(feature = "on-disk")]
pub use on_disk::PackageOnDisk;
pub use in_memory::PackageInMemory;

mod in_memory;

#[cfg(feature = "on-disk")]
mod on_disk;

/// Somewhere packages are stored as whole files.
///
/// Only the file I/O is async; decoding and encoding run synchronously once
/// the bytes are in hand.
pub trait PackageStore {
	fn load(&self, name: &Path) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

	fn save(&mut self, name: &Path, bytes: Vec<u8>) -> impl Future<Output = io::Result<()>> + Send;

	#[tracing::instrument(level = "debug", skip(self, options))]
	fn read_package(
		&self,
		name: &Path,
		options: &ReadOptions,
	) -> impl Future<Output = io::Result<Package>> {
		async move {
			let bytes = self.load(name).await?;
			Ok(Package::from_bytes(&bytes, options)?)
		}
	}

	#[tracing::instrument(level = "debug", skip(self, package, options))]
	fn write_package(
		&mut self,
		name: &Path,
		package: &Package,
		options: &WriteOptions,
	) -> impl Future<Output = io::Result<()>> {
		async move {
			let bytes = package.to_bytes(options)?;
			self.save(name, bytes).await
		}
	}
}
