use std::rc::Rc;

use bstr::{BStr, BString};
use flagset::FlagSet;
use uuid::Uuid;

use crate::{
	data::ObjectData,
	hash::name_hash,
	message::{MessageResponse, ResourceRequest},
	primitives::Vec3,
	script::{Script, ScriptId},
};

pub use kind::{ObjectFlag, ObjectKind};
pub use parts::{ObjectVariant, Parts};
pub use record::ObjectRecord;

mod kind;
mod parts;
mod record;

/// A UI object: attribute block, scripts, message responses, and identity.
///
/// The kind is fixed by the stored [`ObjectVariant`], so data and script types
/// always agree with it.
///
/// The parent link does not own the parent. Parents are shared behind [`Rc`]
/// and are immutable once shared, so a parent chain is always finite.
///
/// Comparing, cloning and dropping walk the parent chain in a loop, so chains
/// of any depth are fine.
pub struct Object {
	variant: ObjectVariant,
	flags: FlagSet<ObjectFlag>,
	name: BString,
	name_hash: u64,
	guid: Uuid,
	resource: Option<ResourceRequest>,
	parent: Option<Rc<Object>>,
	responses: Vec<MessageResponse>,
}

impl Object {
	/// Create an object of `kind` with default data and a fresh GUID.
	pub fn new(kind: ObjectKind, name: impl Into<BString>) -> Self {
		Self::with_variant(ObjectVariant::initialize_data(kind), name)
	}

	pub fn with_variant(variant: impl Into<ObjectVariant>, name: impl Into<BString>) -> Self {
		let name = name.into();
		Self {
			variant: variant.into(),
			flags: FlagSet::default(),
			name_hash: name_hash(&name),
			name,
			guid: Uuid::new_v4(),
			resource: None,
			parent: None,
			responses: Vec::new(),
		}
	}

	pub fn kind(&self) -> ObjectKind {
		self.variant.kind()
	}

	/// Reset the data block to the default for this object's kind.
	///
	/// Scripts and every other field are left as they are.
	pub fn initialize_data(&mut self) {
		self.variant.host_mut().reset_data();
	}

	/// The base attribute block, whatever the kind.
	pub fn data(&self) -> &ObjectData {
		self.variant.host().base()
	}

	pub fn data_mut(&mut self) -> &mut ObjectData {
		self.variant.host_mut().base_mut()
	}

	/// The kind-specific data and typed scripts.
	pub fn variant(&self) -> &ObjectVariant {
		&self.variant
	}

	pub fn variant_mut(&mut self) -> &mut ObjectVariant {
		&mut self.variant
	}

	pub fn scripts(&self) -> Vec<&dyn Script> {
		self.variant.host().dyn_scripts()
	}

	/// Append a default script of this kind's script type and return it.
	pub fn create_script(&mut self) -> &mut dyn Script {
		self.variant.host_mut().dyn_create_script()
	}

	pub fn find_script(&self, id: ScriptId) -> Option<&dyn Script> {
		self.variant.host().dyn_find_script(id)
	}

	pub fn flags(&self) -> FlagSet<ObjectFlag> {
		self.flags
	}

	pub fn set_flags(&mut self, flags: impl Into<FlagSet<ObjectFlag>>) {
		self.flags = flags.into();
	}

	pub fn has_flag(&self, flag: ObjectFlag) -> bool {
		self.flags.contains(flag)
	}

	/// Set or clear one flag, leaving the others untouched.
	pub fn set_flag(&mut self, flag: ObjectFlag, enabled: bool) {
		if enabled {
			self.flags |= flag;
		} else {
			self.flags -= flag;
		}
	}

	pub fn name(&self) -> &BStr {
		self.name.as_ref()
	}

	/// Rename the object and recompute its name hash.
	pub fn set_name(&mut self, name: impl Into<BString>) {
		self.name = name.into();
		self.name_hash = name_hash(&self.name);
	}

	pub fn name_hash(&self) -> u64 {
		self.name_hash
	}

	pub fn guid(&self) -> Uuid {
		self.guid
	}

	pub fn set_guid(&mut self, guid: Uuid) {
		self.guid = guid;
	}

	pub fn resource(&self) -> Option<&ResourceRequest> {
		self.resource.as_ref()
	}

	pub fn set_resource(&mut self, resource: Option<ResourceRequest>) {
		self.resource = resource;
	}

	pub fn parent(&self) -> Option<&Rc<Object>> {
		self.parent.as_ref()
	}

	pub fn set_parent(&mut self, parent: Option<Rc<Object>>) {
		self.parent = parent;
	}

	pub fn responses(&self) -> &[MessageResponse] {
		&self.responses
	}

	pub fn responses_mut(&mut self) -> &mut Vec<MessageResponse> {
		&mut self.responses
	}

	/// Walk the parent chain, nearest first.
	pub fn ancestors(&self) -> impl Iterator<Item = &Object> {
		std::iter::successors(self.parent.as_deref(), |object| object.parent.as_deref())
	}

	/// Position with every ancestor's position added.
	pub fn world_position(&self) -> Vec3 {
		self.ancestors()
			.fold(self.data().position, |position, ancestor| {
				position + ancestor.data().position
			})
	}

	/// Copy the object but share the parent link instead of copying it.
	pub fn clone_sharing_parent(&self) -> Self {
		self.copy_with_parent(self.parent.clone())
	}

	fn copy_with_parent(&self, parent: Option<Rc<Object>>) -> Self {
		let copy = Self {
			variant: self.variant.clone(),
			flags: self.flags,
			name: self.name.clone(),
			name_hash: self.name_hash,
			guid: self.guid,
			resource: self.resource.clone(),
			parent,
			responses: self.responses.clone(),
		};
		debug_assert_eq!(copy.kind(), self.kind(), "clone changed object kind");
		copy
	}
}

/// Deep copy, parent chain included.
///
/// Every ancestor is copied too, so the clone shares nothing with the
/// original. Cloning an object `n` levels deep allocates `n` new ancestors;
/// use [`Object::clone_sharing_parent`] to keep the existing chain.
impl Clone for Object {
	fn clone(&self) -> Self {
		let ancestors: Vec<&Object> = self.ancestors().collect();
		let parent = ancestors.into_iter().rev().fold(None, |parent, ancestor| {
			Some(Rc::new(ancestor.copy_with_parent(parent)))
		});
		self.copy_with_parent(parent)
	}
}

/// Field-by-field equality, ancestors included.
impl PartialEq for Object {
	fn eq(&self, other: &Self) -> bool {
		let (mut left, mut right) = (self, other);
		loop {
			let same = left.variant == right.variant
				&& left.flags == right.flags
				&& left.name == right.name
				&& left.name_hash == right.name_hash
				&& left.guid == right.guid
				&& left.resource == right.resource
				&& left.responses == right.responses;
			if !same {
				return false;
			}

			match (left.parent.as_deref(), right.parent.as_deref()) {
				(None, None) => return true,
				(Some(l), Some(r)) => (left, right) = (l, r),
				_ => return false,
			}
		}
	}
}

impl Drop for Object {
	fn drop(&mut self) {
		// unlink the chain one ancestor at a time instead of recursing
		let mut parent = self.parent.take();
		while let Some(rc) = parent {
			parent = Rc::into_inner(rc).and_then(|mut ancestor| ancestor.parent.take());
		}
	}
}

/// Ancestors are shown by GUID only.
impl std::fmt::Debug for Object {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Object")
			.field("variant", &self.variant)
			.field("flags", &self.flags)
			.field("name", &self.name)
			.field("name_hash", &self.name_hash)
			.field("guid", &self.guid)
			.field("resource", &self.resource)
			.field("parent", &self.parent.as_ref().map(|parent| parent.guid))
			.field("responses", &self.responses)
			.finish()
	}
}
