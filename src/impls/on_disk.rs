use std::{
	io,
	path::{Path, PathBuf},
};

use tokio::fs;

use super::PackageStore;

/// Packages stored as files under a root directory.
#[derive(Debug, Clone)]
pub struct PackageOnDisk {
	root: PathBuf,
}

impl PackageOnDisk {
	pub fn new(root: PathBuf) -> Self {
		Self { root }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}
}

impl PackageStore for PackageOnDisk {
	#[tracing::instrument(level = "trace", skip(self))]
	fn load(&self, name: &Path) -> impl std::future::Future<Output = io::Result<Vec<u8>>> + Send {
		let path = self.root.join(name);
		async move { fs::read(&path).await }
	}

	#[tracing::instrument(level = "trace", skip(self, bytes), fields(len = bytes.len()))]
	fn save(
		&mut self,
		name: &Path,
		bytes: Vec<u8>,
	) -> impl std::future::Future<Output = io::Result<()>> + Send {
		let path = self.root.join(name);
		async move {
			if let Some(dir) = path.parent() {
				fs::create_dir_all(dir).await?;
			}
			fs::write(&path, bytes).await
		}
	}
}
