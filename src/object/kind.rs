use deku::{ctx::Endian, no_std_io, prelude::*};
use flagset::{flags, FlagSet};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, DekuRead, DekuWrite)]
#[deku(id_type = "u8", endian = "endian", ctx = "endian: deku::ctx::Endian")]
#[repr(u8)]
pub enum ObjectKind {
	/// A plain element: the base attribute block and transform scripts.
	Element = 1,

	/// A textured quad with frame animation scripts.
	Image = 2,

	/// A text element with text-swap scripts.
	Label = 3,
}

flags! {
	/// Per-object switches.
	///
	/// Bits not listed here are dropped when read.
	pub enum ObjectFlag: u32 {
		/// The object is drawn.
		Visible      = 0b____1,

		/// The object receives pointer input.
		Interactive  = 0b___10,

		/// Children are clipped to this object's bounds.
		ClipChildren = 0b__100,

		/// The object can be dragged by the user.
		Draggable    = 0b_1000,

		/// The object can take keyboard focus.
		Focusable    = 0b10000,
	}
}

impl ObjectFlag {
	pub(crate) fn deku_reader<R: no_std_io::Read + no_std_io::Seek>(
		reader: &mut Reader<R>,
	) -> Result<FlagSet<Self>, DekuError> {
		let value = u32::from_reader_with_ctx(reader, Endian::Little)?;
		let flags = FlagSet::new_truncated(value);
		if flags.bits() != value {
			tracing::debug!(
				bits = value,
				kept = flags.bits(),
				"dropping unknown object flags"
			);
		}
		Ok(flags)
	}

	pub(crate) fn deku_writer<W: no_std_io::Write + no_std_io::Seek>(
		writer: &mut Writer<W>,
		field: &FlagSet<Self>,
	) -> Result<(), DekuError> {
		field.bits().to_writer(writer, Endian::Little)
	}
}
