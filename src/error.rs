//! Errors reported by the format string parser.

/// An error that can occur while parsing a format string.
///
/// Every variant carries the byte offset of the offending input,
/// available through [`position()`][Self::position].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
	/// A conditional was opened but the test is not followed by a `?`.
	MissingQuestionMark {
		/// Position of the byte where the `?` was expected.
		position: usize,
	},

	/// The true branch of a conditional ran off the end of the input.
	MissingBranchSeparator {
		/// Position of the byte where `&` or the terminator was expected.
		position: usize,
		/// The terminator of the conditional (`>` for `%<…>`, `?` for `%?…?`).
		terminator: char,
	},

	/// The false branch of a conditional is not closed by the terminator.
	MissingConditionEnd {
		/// Position of the start of the false branch.
		position: usize,
		/// The terminator of the conditional (`>` for `%<…>`, `?` for `%?…?`).
		terminator: char,
	},

	/// The code after a `%` does not match any definition.
	UnknownExpando {
		/// Position of the unrecognized code.
		position: usize,
		/// The code as written in the source (may be empty at end of input).
		code: String,
	},

	/// A width or precision field could not be parsed as a number.
	InvalidNumber {
		/// Position of the malformed number.
		position: usize,
	},

	/// A custom argument parser rejected its input.
	InvalidArgument {
		/// Position of the rejected argument.
		position: usize,
		/// Description supplied by the custom parser.
		message: String,
	},
}

impl ParseError {
	/// Get the byte offset into the source where the error occurred.
	pub fn position(&self) -> usize {
		match self {
			Self::MissingQuestionMark { position } => *position,
			Self::MissingBranchSeparator { position, .. } => *position,
			Self::MissingConditionEnd { position, .. } => *position,
			Self::UnknownExpando { position, .. } => *position,
			Self::InvalidNumber { position } => *position,
			Self::InvalidArgument { position, .. } => *position,
		}
	}

	/// The length in bytes of the source range being reported.
	fn len(&self) -> usize {
		match self {
			Self::UnknownExpando { code, .. } => code.len().max(1),
			_ => 1,
		}
	}

	/// Write source highlighting for the error location.
	///
	/// The highlighting ends with a newline.
	pub fn write_source_highlighting(&self, f: &mut impl std::fmt::Write, source: &str) -> std::fmt::Result {
		let position = self.position();
		let start = line_start(source, position);
		let end = line_end(source, position);
		let line = &source[start..end];
		if line.len() > 60 {
			return Ok(());
		}
		write!(f, "  {}\n  ", line)?;
		write_underline(f, line, position - start, (position - start + self.len()).min(line.len()))?;
		writeln!(f)
	}

	/// Get source highlighting for the error location as a string.
	///
	/// The highlighting ends with a newline.
	pub fn source_highlighting(&self, source: &str) -> String {
		let mut output = String::new();
		self.write_source_highlighting(&mut output, source).unwrap();
		output
	}
}

impl std::error::Error for ParseError {}

impl std::fmt::Display for ParseError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Self::MissingQuestionMark { .. } => {
				write!(f, "Conditional expando is missing '?'")
			},
			Self::MissingBranchSeparator { terminator, .. } => {
				write!(f, "Conditional expando is missing '&' or '{terminator}'")
			},
			Self::MissingConditionEnd { terminator, .. } => {
				write!(f, "Conditional expando is missing '{terminator}'")
			},
			Self::UnknownExpando { code, .. } => {
				write!(f, "Unknown expando: %{code}")
			},
			Self::InvalidNumber { .. } => {
				write!(f, "Invalid number")
			},
			Self::InvalidArgument { message, .. } => {
				write!(f, "Invalid expando argument: {message}")
			},
		}
	}
}

fn line_start(source: &str, position: usize) -> usize {
	match source[..position].bytes().rposition(|c| c == b'\n' || c == b'\r') {
		Some(line_end) => line_end + 1,
		None => 0,
	}
}

fn line_end(source: &str, position: usize) -> usize {
	match source[position..].bytes().position(|c| c == b'\n' || c == b'\r') {
		Some(line_end) => position + line_end,
		None => source.len(),
	}
}

fn write_underline(f: &mut impl std::fmt::Write, line: &str, start: usize, end: usize) -> std::fmt::Result {
	use unicode_width::UnicodeWidthStr;
	let spaces = line[..start.min(line.len())].width();
	let carets = if start >= line.len() { 1 } else { line[start..end].width().max(1) };
	write!(f, "{}", " ".repeat(spaces))?;
	write!(f, "{}", "^".repeat(carets))?;
	Ok(())
}
