use deku::{ctx::Endian, no_std_io, prelude::*};

use super::ObjectKind;
use crate::{
	data::{DataBlock, ImageData, LabelData, ObjectData},
	deku_helpers::{reader_vec, writer_vec},
	script::{ElementScript, ImageScript, LabelScript, Script, ScriptBlock, ScriptId},
};

/// The kind-specific half of an object: its data block and typed scripts.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Parts<D, S> {
	pub data: D,
	scripts: Vec<S>,
}

impl<D: DataBlock, S: ScriptBlock> Parts<D, S> {
	pub fn new(data: D) -> Self {
		Self {
			data,
			scripts: Vec::new(),
		}
	}

	pub fn with_scripts(mut self, scripts: impl IntoIterator<Item = S>) -> Self {
		self.scripts.extend(scripts);
		self
	}

	/// Typed view of the scripts.
	pub fn scripts(&self) -> &[S] {
		&self.scripts
	}

	pub fn scripts_mut(&mut self) -> &mut [S] {
		&mut self.scripts
	}

	pub fn push_script(&mut self, script: S) {
		self.scripts.push(script);
	}

	pub fn remove_script(&mut self, id: ScriptId) -> Option<S> {
		let index = self.scripts.iter().position(|script| script.id() == id)?;
		Some(self.scripts.remove(index))
	}

	/// Append a default script and return it.
	///
	/// Its id is one past the highest id present, or 0 for the first script.
	pub fn create_script(&mut self) -> &mut S {
		let id = self
			.scripts
			.iter()
			.map(|script| script.id())
			.max()
			.map_or(0, |id| id.wrapping_add(1));
		let index = self.scripts.len();
		self.scripts.push(S::with_id(id));
		&mut self.scripts[index]
	}

	pub fn find_script(&self, id: ScriptId) -> Option<&S> {
		self.scripts.iter().find(|script| script.id() == id)
	}

	pub fn find_script_mut(&mut self, id: ScriptId) -> Option<&mut S> {
		self.scripts.iter_mut().find(|script| script.id() == id)
	}

	pub(crate) fn read<R: no_std_io::Read + no_std_io::Seek>(
		reader: &mut Reader<R>,
	) -> Result<Self, DekuError> {
		let data = D::from_reader_with_ctx(reader, Endian::Little)?;
		let scripts = reader_vec(reader)?;
		Ok(Self { data, scripts })
	}

	pub(crate) fn write<W: no_std_io::Write + no_std_io::Seek>(
		&self,
		writer: &mut Writer<W>,
	) -> Result<(), DekuError> {
		self.data.to_writer(writer, Endian::Little)?;
		writer_vec(writer, &self.scripts)
	}
}

/// Untyped access to a [`Parts`], whatever its data and script types.
pub(crate) trait ScriptHost {
	fn base(&self) -> &ObjectData;
	fn base_mut(&mut self) -> &mut ObjectData;
	fn reset_data(&mut self);
	fn dyn_scripts(&self) -> Vec<&dyn Script>;
	fn dyn_create_script(&mut self) -> &mut dyn Script;
	fn dyn_find_script(&self, id: ScriptId) -> Option<&dyn Script>;
}

impl<D: DataBlock, S: ScriptBlock> ScriptHost for Parts<D, S> {
	fn base(&self) -> &ObjectData {
		self.data.base()
	}

	fn base_mut(&mut self) -> &mut ObjectData {
		self.data.base_mut()
	}

	fn reset_data(&mut self) {
		self.data = D::default();
	}

	fn dyn_scripts(&self) -> Vec<&dyn Script> {
		self.scripts
			.iter()
			.map(|script| script as &dyn Script)
			.collect()
	}

	fn dyn_create_script(&mut self) -> &mut dyn Script {
		self.create_script()
	}

	fn dyn_find_script(&self, id: ScriptId) -> Option<&dyn Script> {
		self.find_script(id).map(|script| script as &dyn Script)
	}
}

/// One variant per object kind, pairing its data block with its script type.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectVariant {
	Element(Parts<ObjectData, ElementScript>),
	Image(Parts<ImageData, ImageScript>),
	Label(Parts<LabelData, LabelScript>),
}

impl ObjectVariant {
	/// Allocate default data and an empty script list for a kind.
	pub fn initialize_data(kind: ObjectKind) -> Self {
		match kind {
			ObjectKind::Element => Self::Element(Parts::default()),
			ObjectKind::Image => Self::Image(Parts::default()),
			ObjectKind::Label => Self::Label(Parts::default()),
		}
	}

	pub fn kind(&self) -> ObjectKind {
		match self {
			Self::Element(_) => ObjectKind::Element,
			Self::Image(_) => ObjectKind::Image,
			Self::Label(_) => ObjectKind::Label,
		}
	}

	pub fn as_element(&self) -> Option<&Parts<ObjectData, ElementScript>> {
		match self {
			Self::Element(parts) => Some(parts),
			_ => None,
		}
	}

	pub fn as_element_mut(&mut self) -> Option<&mut Parts<ObjectData, ElementScript>> {
		match self {
			Self::Element(parts) => Some(parts),
			_ => None,
		}
	}

	pub fn as_image(&self) -> Option<&Parts<ImageData, ImageScript>> {
		match self {
			Self::Image(parts) => Some(parts),
			_ => None,
		}
	}

	pub fn as_image_mut(&mut self) -> Option<&mut Parts<ImageData, ImageScript>> {
		match self {
			Self::Image(parts) => Some(parts),
			_ => None,
		}
	}

	pub fn as_label(&self) -> Option<&Parts<LabelData, LabelScript>> {
		match self {
			Self::Label(parts) => Some(parts),
			_ => None,
		}
	}

	pub fn as_label_mut(&mut self) -> Option<&mut Parts<LabelData, LabelScript>> {
		match self {
			Self::Label(parts) => Some(parts),
			_ => None,
		}
	}

	pub(crate) fn host(&self) -> &dyn ScriptHost {
		match self {
			Self::Element(parts) => parts,
			Self::Image(parts) => parts,
			Self::Label(parts) => parts,
		}
	}

	pub(crate) fn host_mut(&mut self) -> &mut dyn ScriptHost {
		match self {
			Self::Element(parts) => parts,
			Self::Image(parts) => parts,
			Self::Label(parts) => parts,
		}
	}

	pub(crate) fn read<R: no_std_io::Read + no_std_io::Seek>(
		kind: ObjectKind,
		reader: &mut Reader<R>,
	) -> Result<Self, DekuError> {
		Ok(match kind {
			ObjectKind::Element => Self::Element(Parts::read(reader)?),
			ObjectKind::Image => Self::Image(Parts::read(reader)?),
			ObjectKind::Label => Self::Label(Parts::read(reader)?),
		})
	}

	pub(crate) fn write<W: no_std_io::Write + no_std_io::Seek>(
		&self,
		writer: &mut Writer<W>,
	) -> Result<(), DekuError> {
		match self {
			Self::Element(parts) => parts.write(writer),
			Self::Image(parts) => parts.write(writer),
			Self::Label(parts) => parts.write(writer),
		}
	}
}

impl From<Parts<ObjectData, ElementScript>> for ObjectVariant {
	fn from(parts: Parts<ObjectData, ElementScript>) -> Self {
		Self::Element(parts)
	}
}

impl From<Parts<ImageData, ImageScript>> for ObjectVariant {
	fn from(parts: Parts<ImageData, ImageScript>) -> Self {
		Self::Image(parts)
	}
}

impl From<Parts<LabelData, LabelScript>> for ObjectVariant {
	fn from(parts: Parts<LabelData, LabelScript>) -> Self {
		Self::Label(parts)
	}
}
