//! Definitions of the codes recognised by the parser.
//!
//! The engine itself does not know any concrete codes.
//! The host supplies a table of [`Definition`]s describing the codes it
//! understands, and a parallel table of [`Callback`][crate::Callback]s at
//! render time that produces their values.

use crate::error::ParseError;

/// What kind of value a code produces at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
	/// The code renders text through the string callback.
	String,
	/// The code renders a number through the number callback.
	Number,
}

/// Where in the grammar a custom argument parser was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseContext {
	/// The code appears as a plain expando, e.g. `%[%H:%M]`.
	Plain,
	/// The code appears as the test of a conditional, e.g. `%<[1m?…&…>`.
	Condition,
}

/// The argument consumed by a custom parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
	/// The argument text stored on the node.
	pub text: String,
	/// The number of bytes consumed from the input, including any
	/// terminator that belongs to the argument syntax.
	pub len: usize,
}

/// A parser for codes whose argument is not a simple letter.
///
/// Invoked with the source text following the matched code, the byte
/// offset of that text in the full source (for error positions), and the
/// grammar context. Returns the argument to store on the node and how
/// many bytes were consumed.
pub type CustomParser = fn(&str, usize, ParseContext) -> Result<Argument, ParseError>;

/// One entry of the host-supplied definition table.
///
/// The engine looks codes up by `short_name` while parsing and records
/// `(did, uid)` on the node so that rendering never compares strings.
#[derive(Debug, Clone, Copy)]
pub struct Definition {
	/// The code as written after `%`, one or two bytes.
	pub short_name: &'static str,
	/// Optional long name, used for diagnostics only.
	pub long_name: Option<&'static str>,
	/// Domain identifier, chosen by the host.
	pub did: i32,
	/// Field identifier within the domain, chosen by the host.
	pub uid: i32,
	/// Whether the code produces text or a number.
	pub kind: ValueKind,
	/// Parser for a trailing argument, if the code takes one.
	pub parser: Option<CustomParser>,
}

impl Definition {
	/// Define a code with no custom argument parser.
	pub const fn new(short_name: &'static str, did: i32, uid: i32, kind: ValueKind) -> Self {
		Self {
			short_name,
			long_name: None,
			did,
			uid,
			kind,
			parser: None,
		}
	}

	/// Attach a long name for diagnostics.
	pub const fn named(mut self, long_name: &'static str) -> Self {
		self.long_name = Some(long_name);
		self
	}

	/// Attach a custom argument parser.
	pub const fn with_parser(mut self, parser: CustomParser) -> Self {
		self.parser = Some(parser);
		self
	}
}

/// Find the definition matching the start of `rest`.
///
/// Two-byte codes take precedence over one-byte codes, so a table may
/// contain both `"c"` and `"cr"`.
pub(crate) fn find_definition<'d>(defs: &'d [Definition], rest: &str) -> Option<(&'d Definition, usize)> {
	for def in defs {
		if def.short_name.len() == 2 && rest.starts_with(def.short_name) {
			return Some((def, 2));
		}
	}
	for def in defs {
		if def.short_name.len() == 1 && rest.starts_with(def.short_name) {
			return Some((def, 1));
		}
	}
	None
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::{assert, let_assert};

	#[test]
	fn test_two_byte_codes_win() {
		let defs = [
			Definition::new("c", 1, 1, ValueKind::String),
			Definition::new("cr", 1, 2, ValueKind::String),
		];
		let_assert!(Some((def, len)) = find_definition(&defs, "cry"));
		assert!(def.uid == 2);
		assert!(len == 2);

		let_assert!(Some((def, len)) = find_definition(&defs, "ca"));
		assert!(def.uid == 1);
		assert!(len == 1);

		assert!(find_definition(&defs, "x").is_none());
		assert!(find_definition(&defs, "").is_none());
	}
}
