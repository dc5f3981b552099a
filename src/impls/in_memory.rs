use std::{
	collections::HashMap,
	io,
	path::{Path, PathBuf},
};

use super::PackageStore;

/// Packages held in memory, keyed by name.
#[derive(Debug, Default, Clone)]
pub struct PackageInMemory {
	files: HashMap<PathBuf, Vec<u8>>,
}

impl PackageInMemory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, name: &Path) -> Option<&[u8]> {
		self.files.get(name).map(Vec::as_slice)
	}
}

impl PackageStore for PackageInMemory {
	fn load(&self, name: &Path) -> impl std::future::Future<Output = io::Result<Vec<u8>>> + Send {
		let found = self.files.get(name).cloned().ok_or_else(|| {
			io::Error::new(
				io::ErrorKind::NotFound,
				format!("no package named {}", name.display()),
			)
		});
		async move { found }
	}

	fn save(
		&mut self,
		name: &Path,
		bytes: Vec<u8>,
	) -> impl std::future::Future<Output = io::Result<()>> + Send {
		self.files.insert(name.to_owned(), bytes);
		async move { Ok(()) }
	}
}

#[cfg(test)]
mod tests {
	use std::rc::Rc;

	use super::*;
	use crate::{
		object::{Object, ObjectKind},
		options::{ReadOptions, WriteOptions},
		package::Package,
	};

	#[tokio::test]
	async fn packages_round_trip_through_the_store() {
		let mut store = PackageInMemory::new();
		let package = Package {
			title: Some("hud".into()),
			objects: vec![Rc::new(Object::new(ObjectKind::Label, "score"))],
			message_targets: Vec::new(),
		};

		store
			.write_package(Path::new("hud.uipk"), &package, &WriteOptions::default())
			.await
			.unwrap();
		assert!(store.get(Path::new("hud.uipk")).is_some());

		let read = store
			.read_package(Path::new("hud.uipk"), &ReadOptions::default())
			.await
			.unwrap();
		assert_eq!(read.title, package.title);
		assert_eq!(read.objects, package.objects);
	}

	#[tokio::test]
	async fn missing_and_corrupt_packages_are_io_errors() {
		let mut store = PackageInMemory::new();
		let err = store
			.read_package(Path::new("nope"), &ReadOptions::default())
			.await
			.unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::NotFound);

		store
			.save(Path::new("bad"), b"NOPE\x01\x00\x00\x00".to_vec())
			.await
			.unwrap();
		let err = store
			.read_package(Path::new("bad"), &ReadOptions::default())
			.await
			.unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::InvalidData);
	}
}
