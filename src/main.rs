use std::path::PathBuf;

use tracing_subscriber::{
	fmt::format::FmtSpan, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
};
use ui_package::{
	impls::{PackageOnDisk, PackageStore as _},
	ReadOptions,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
	tracing_subscriber::registry()
		.with(
			EnvFilter::try_from_default_env()
				.or_else(|_| EnvFilter::try_new("ui_package=info"))
				.map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?,
		)
		.with(tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE))
		.init();

	let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
		eprintln!("usage: ui-package <package file>");
		std::process::exit(2);
	};

	let store = PackageOnDisk::new(PathBuf::from("."));
	let package = store.read_package(&path, &ReadOptions::default()).await?;

	if let Some(title) = &package.title {
		println!("title: {title}");
	}
	for (i, object) in package.objects.iter().enumerate() {
		println!(
			"[{i}] {:?} {:?} guid={} hash={} flags={:?}",
			object.kind(),
			object.name(),
			object.guid(),
			hex::encode(object.name_hash().to_be_bytes()),
			object.flags(),
		);
		if let Some(parent) = object.parent() {
			println!("    parent {:?} ({})", parent.name(), parent.guid());
		}
		if let Some(resource) = object.resource() {
			println!("    resource {:?} {:?}", resource.kind, resource.path);
		}
		for script in object.scripts() {
			println!("    script {} ({:?})", script.id(), script.kind());
		}
		for response in object.responses() {
			println!(
				"    on {} -> {:?} {} after {}s",
				hex::encode(response.message.to_be_bytes()),
				response.action,
				hex::encode(response.target.to_be_bytes()),
				response.delay,
			);
		}
	}
	for target in &package.message_targets {
		println!("target {}", hex::encode(target.to_be_bytes()));
	}

	Ok(())
}
