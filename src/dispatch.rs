//! Draining a chunk's tags into a package.

use std::{collections::HashMap, rc::Rc};

use bstr::BString;
use uuid::Uuid;

use crate::{
	error::{Error, Result},
	hash::name_hash,
	object::{Object, ObjectRecord},
	options::ReadOptions,
	package::Package,
	tag::{Tag, TagStream, TagValue},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
	Consumed,
	Ignored,
}

/// Handles the tags a dispatcher doesn't interpret itself.
pub trait TagProcessor {
	fn process(&mut self, tag: Tag, builder: &mut PackageBuilder) -> Result<Disposition>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
	pub seen: usize,
	pub consumed: usize,
	pub skipped: usize,
}

impl std::ops::AddAssign for DispatchStats {
	fn add_assign(&mut self, rhs: Self) {
		self.seen += rhs.seen;
		self.consumed += rhs.consumed;
		self.skipped += rhs.skipped;
	}
}

/// Drain `stream`, feeding every tag into `builder`.
///
/// Count hints, target lists and objects are handled here. Everything else
/// goes to `processor`; tags it ignores are skipped. The first error ends the
/// dispatch, and whatever the chunk added to `builder` should be discarded.
#[tracing::instrument(level = "debug", skip_all, fields(start = stream.offset(), len = stream.remaining()))]
pub fn dispatch(
	stream: &mut TagStream<'_>,
	builder: &mut PackageBuilder,
	processor: &mut dyn TagProcessor,
	options: &ReadOptions,
) -> Result<DispatchStats> {
	let mut stats = DispatchStats::default();

	while stream.has_tag() {
		let tag = stream.next_tag()?;
		stats.seen += 1;

		let tag = match tag.value {
			TagValue::CountHint(count) => {
				let capped = count.min(options.max_count_hint);
				if capped < count {
					tracing::debug!(count, capped, "clamping count hint");
				}
				builder.reserve(capped as usize);
				stats.consumed += 1;
				continue;
			}
			TagValue::Targets(targets) => {
				builder.message_targets.extend(targets);
				stats.consumed += 1;
				continue;
			}
			TagValue::Object(record) => {
				builder.push_record(*record);
				stats.consumed += 1;
				continue;
			}
			value => Tag { value, ..tag },
		};

		let (kind, offset) = (tag.kind, tag.offset);
		match processor.process(tag, builder)? {
			Disposition::Consumed => stats.consumed += 1,
			Disposition::Ignored => {
				tracing::trace!(kind, offset, "skipping tag");
				stats.skipped += 1;
			}
		}
	}

	tracing::debug!(?stats, "chunk done");
	Ok(stats)
}

/// Attaches response tags to the object read just before them.
#[derive(Debug, Default)]
pub struct MessageResponseBuilder {
	attached: usize,
}

impl MessageResponseBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// How many responses have been attached so far.
	pub fn attached(&self) -> usize {
		self.attached
	}
}

impl TagProcessor for MessageResponseBuilder {
	fn process(&mut self, tag: Tag, builder: &mut PackageBuilder) -> Result<Disposition> {
		let TagValue::Response(response) = tag.value else {
			return Ok(Disposition::Ignored);
		};

		builder
			.last_object_mut()
			.ok_or(Error::OrphanResponse)?
			.responses_mut()
			.push(response);
		self.attached += 1;
		Ok(Disposition::Consumed)
	}
}

/// Picks package-level metadata out of a metadata chunk.
#[derive(Debug, Default)]
pub struct MetadataCollector;

impl TagProcessor for MetadataCollector {
	fn process(&mut self, tag: Tag, builder: &mut PackageBuilder) -> Result<Disposition> {
		match tag.value {
			TagValue::Title(title) => {
				builder.set_title(title);
				Ok(Disposition::Consumed)
			}
			_ => Ok(Disposition::Ignored),
		}
	}
}

/// Package state accumulated across chunks.
///
/// Objects are held unlinked until [`finish`](Self::finish), as a child may
/// be read before its parent.
#[derive(Debug, Default)]
pub struct PackageBuilder {
	records: Vec<ObjectRecord>,
	message_targets: Vec<u64>,
	title: Option<BString>,
}

impl PackageBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn reserve(&mut self, additional: usize) {
		self.records.reserve(additional);
	}

	pub fn push_record(&mut self, record: ObjectRecord) {
		self.records.push(record);
	}

	pub fn records(&self) -> &[ObjectRecord] {
		&self.records
	}

	/// The most recently read object, if any.
	pub fn last_object_mut(&mut self) -> Option<&mut Object> {
		self.records.last_mut().map(|record| &mut record.object)
	}

	pub fn message_targets(&self) -> &[u64] {
		&self.message_targets
	}

	pub fn title(&self) -> Option<&BString> {
		self.title.as_ref()
	}

	/// Set the title; a later title replaces an earlier one.
	pub fn set_title(&mut self, title: BString) {
		self.title = Some(title);
	}

	/// Link parents by GUID and produce the package.
	///
	/// Objects keep their file order. Every parent is linked before its
	/// children, whichever comes first in the file.
	#[tracing::instrument(level = "debug", skip_all, fields(objects = self.records.len()))]
	pub fn finish(self, options: &ReadOptions) -> Result<Package> {
		let Self {
			records,
			message_targets,
			title,
		} = self;

		let mut index = HashMap::with_capacity(records.len());
		for (i, record) in records.iter().enumerate() {
			let guid = record.object.guid();
			if index.insert(guid, i).is_some() {
				return Err(Error::DuplicateGuid(guid));
			}

			if options.verify_name_hashes {
				let computed = name_hash(record.object.name());
				if computed != record.object.name_hash() {
					return Err(Error::NameHashMismatch {
						guid,
						stored: record.object.name_hash(),
						computed,
					});
				}
			}
		}

		let parents = records
			.iter()
			.map(|record| {
				record
					.parent
					.map(|parent| {
						index.get(&parent).copied().ok_or(Error::MissingParent {
							guid: record.object.guid(),
							parent,
						})
					})
					.transpose()
			})
			.collect::<Result<Vec<Option<usize>>>>()?;

		let guids: Vec<Uuid> = records.iter().map(|record| record.object.guid()).collect();
		let mut pending: Vec<Option<Object>> = records
			.into_iter()
			.map(|record| Some(record.object))
			.collect();
		let mut linked: Vec<Option<Rc<Object>>> = vec![None; pending.len()];
		let mut on_chain = vec![false; pending.len()];

		for start in 0..pending.len() {
			// walk up to the first linked ancestor or the root
			let mut chain = Vec::new();
			let mut current = Some(start);
			while let Some(i) = current {
				if linked[i].is_some() {
					break;
				}
				if on_chain[i] {
					return Err(Error::ParentCycle(guids[i]));
				}
				on_chain[i] = true;
				chain.push(i);
				current = parents[i];
			}

			// then link back down
			while let Some(i) = chain.pop() {
				let Some(mut object) = pending[i].take() else {
					continue;
				};
				object.set_parent(parents[i].and_then(|parent| linked[parent].clone()));
				linked[i] = Some(Rc::new(object));
			}
		}

		let objects: Vec<Rc<Object>> = linked.into_iter().flatten().collect();
		tracing::debug!(
			objects = objects.len(),
			targets = message_targets.len(),
			"package linked"
		);

		Ok(Package {
			title,
			objects,
			message_targets,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		message::{MessageResponse, ResponseAction},
		object::ObjectKind,
		tag::{write_tag, TagRegistry, TAG_COUNT_HINT, TAG_OBJECT, TAG_RESPONSE, TAG_TARGETS, TAG_TITLE},
	};

	fn object_tag(out: &mut Vec<u8>, object: &Object) {
		let payload = ObjectRecord::encode(object).unwrap();
		write_tag(out, TagRegistry::objects(), TAG_OBJECT, &payload).unwrap();
	}

	fn response_tag(out: &mut Vec<u8>, response: &MessageResponse) {
		let payload = crate::primitives::encode(response).unwrap();
		write_tag(out, TagRegistry::objects(), TAG_RESPONSE, &payload).unwrap();
	}

	fn run(bytes: &[u8]) -> Result<(PackageBuilder, DispatchStats)> {
		let mut builder = PackageBuilder::new();
		let mut stream = TagStream::whole(bytes, TagRegistry::objects());
		let stats = dispatch(
			&mut stream,
			&mut builder,
			&mut MessageResponseBuilder::new(),
			&ReadOptions::default(),
		)?;
		Ok((builder, stats))
	}

	#[test]
	fn unknown_tags_are_skipped() {
		let object = Object::new(ObjectKind::Image, "logo");
		let mut bytes = Vec::new();
		write_tag(&mut bytes, TagRegistry::objects(), 0x0bad, b"from the future").unwrap();
		object_tag(&mut bytes, &object);

		let (builder, stats) = run(&bytes).unwrap();
		assert_eq!(
			stats,
			DispatchStats {
				seen: 2,
				consumed: 1,
				skipped: 1
			}
		);
		assert_eq!(builder.records().len(), 1);
		assert_eq!(builder.records()[0].object.guid(), object.guid());
	}

	#[test]
	fn structural_tags_fill_the_builder() {
		let mut bytes = Vec::new();
		write_tag(&mut bytes, TagRegistry::objects(), TAG_COUNT_HINT, &2u32.to_le_bytes()).unwrap();
		let targets: Vec<u8> = [11u64, 12].iter().flat_map(|t| t.to_le_bytes()).collect();
		write_tag(&mut bytes, TagRegistry::objects(), TAG_TARGETS, &targets).unwrap();
		object_tag(&mut bytes, &Object::new(ObjectKind::Element, "a"));
		object_tag(&mut bytes, &Object::new(ObjectKind::Label, "b"));

		let (builder, stats) = run(&bytes).unwrap();
		assert_eq!(stats.consumed, 4);
		assert_eq!(builder.message_targets(), &[11, 12]);
		assert_eq!(builder.records().len(), 2);
	}

	#[test]
	fn responses_attach_to_the_latest_object() {
		let first = Object::new(ObjectKind::Element, "first");
		let second = Object::new(ObjectKind::Element, "second");
		let tap = MessageResponse::new("tap", "second", ResponseAction::Hide);
		let open = MessageResponse::new("open", "second", ResponseAction::Show).with_delay(0.5);

		let mut bytes = Vec::new();
		object_tag(&mut bytes, &first);
		object_tag(&mut bytes, &second);
		response_tag(&mut bytes, &tap);
		response_tag(&mut bytes, &open);

		let (builder, stats) = run(&bytes).unwrap();
		assert_eq!(stats.consumed, 4);
		assert!(builder.records()[0].object.responses().is_empty());
		assert_eq!(builder.records()[1].object.responses(), &[tap, open]);
	}

	#[test]
	fn response_before_any_object_is_an_error() {
		let mut bytes = Vec::new();
		response_tag(
			&mut bytes,
			&MessageResponse::new("tap", "x", ResponseAction::Stop),
		);
		assert!(matches!(run(&bytes), Err(Error::OrphanResponse)));
	}

	#[test]
	fn framing_errors_abort_the_chunk() {
		let mut bytes = Vec::new();
		object_tag(&mut bytes, &Object::new(ObjectKind::Element, "a"));
		bytes.truncate(bytes.len() - 1);
		assert!(matches!(run(&bytes), Err(Error::ChunkOverrun { .. })));
	}

	#[test]
	fn metadata_collector_takes_the_title() {
		let mut bytes = Vec::new();
		write_tag(&mut bytes, TagRegistry::metadata(), TAG_TITLE, b"Main menu").unwrap();
		write_tag(&mut bytes, TagRegistry::metadata(), 0x0101, b"?").unwrap();

		let mut builder = PackageBuilder::new();
		let stats = dispatch(
			&mut TagStream::whole(&bytes, TagRegistry::metadata()),
			&mut builder,
			&mut MetadataCollector,
			&ReadOptions::default(),
		)
		.unwrap();
		assert_eq!(stats.skipped, 1);
		assert_eq!(builder.title().map(|t| t.as_slice()), Some(&b"Main menu"[..]));
	}

	#[test]
	fn parents_link_regardless_of_order() {
		let root = Object::new(ObjectKind::Element, "root");
		let mut panel = Object::new(ObjectKind::Element, "panel");
		panel.set_parent(Some(Rc::new(root.clone())));
		let mut button = Object::new(ObjectKind::Label, "button");
		button.set_parent(Some(Rc::new(panel.clone())));

		let mut builder = PackageBuilder::new();
		for object in [&button, &root, &panel] {
			builder.push_record(ObjectRecord::from(object.clone_sharing_parent()));
		}
		let package = builder.finish(&ReadOptions::default()).unwrap();

		let names: Vec<_> = package.objects.iter().map(|o| o.name().to_string()).collect();
		assert_eq!(names, ["button", "root", "panel"]);

		let button = &package.objects[0];
		let chain: Vec<_> = button.ancestors().map(|o| o.guid()).collect();
		assert_eq!(chain, [panel.guid(), root.guid()]);
		// the linked parent is the package's own object
		assert!(Rc::ptr_eq(
			button.parent().unwrap(),
			&package.objects[2]
		));
	}

	#[test]
	fn missing_parent_is_an_error() {
		let mut orphan = Object::new(ObjectKind::Element, "orphan");
		orphan.set_parent(Some(Rc::new(Object::new(ObjectKind::Element, "gone"))));

		let mut builder = PackageBuilder::new();
		builder.push_record(orphan.clone().into());
		assert!(matches!(
			builder.finish(&ReadOptions::default()),
			Err(Error::MissingParent { guid, .. }) if guid == orphan.guid()
		));
	}

	#[test]
	fn duplicate_guid_is_an_error() {
		let object = Object::new(ObjectKind::Element, "twin");
		let mut builder = PackageBuilder::new();
		builder.push_record(object.clone().into());
		builder.push_record(object.clone().into());
		assert!(matches!(
			builder.finish(&ReadOptions::default()),
			Err(Error::DuplicateGuid(guid)) if guid == object.guid()
		));
	}

	#[test]
	fn parent_cycle_is_an_error() {
		let a = Object::new(ObjectKind::Element, "a");
		let b = Object::new(ObjectKind::Element, "b");

		let mut builder = PackageBuilder::new();
		builder.push_record(ObjectRecord {
			object: a.clone(),
			parent: Some(b.guid()),
		});
		builder.push_record(ObjectRecord {
			object: b.clone(),
			parent: Some(a.guid()),
		});
		assert!(matches!(
			builder.finish(&ReadOptions::default()),
			Err(Error::ParentCycle(_))
		));

		let mut builder = PackageBuilder::new();
		builder.push_record(ObjectRecord {
			parent: Some(a.guid()),
			object: a,
		});
		assert!(matches!(
			builder.finish(&ReadOptions::default()),
			Err(Error::ParentCycle(_))
		));
	}

	#[test]
	fn name_hashes_are_verified_on_request() {
		let object = Object::new(ObjectKind::Element, "abc");
		let mut bytes = ObjectRecord::encode(&object).unwrap();
		// kind + flags + name length + "abc"
		bytes[10] ^= 0xff;
		let record = ObjectRecord::from_bytes(&bytes).unwrap();

		let mut builder = PackageBuilder::new();
		builder.push_record(record.clone());
		assert!(builder.finish(&ReadOptions::default()).is_ok());

		let mut builder = PackageBuilder::new();
		builder.push_record(record);
		assert!(matches!(
			builder.finish(&ReadOptions::default().with_verify_name_hashes(true)),
			Err(Error::NameHashMismatch { computed, .. }) if computed == object.name_hash()
		));
	}

	#[test]
	fn deep_parent_chains_link_and_drop() {
		let mut builder = PackageBuilder::new();
		let mut parent = None;
		for _ in 0..50_000 {
			let object = Object::new(ObjectKind::Element, "step");
			let guid = object.guid();
			builder.push_record(ObjectRecord { object, parent });
			parent = Some(guid);
		}

		let package = builder.finish(&ReadOptions::default()).unwrap();
		let leaf = package.objects.last().unwrap();
		assert_eq!(leaf.ancestors().count(), 49_999);
		drop(package);
	}
}
