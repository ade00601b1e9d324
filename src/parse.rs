//! The recursive-descent parser.
//!
//! A format string is parsed into a list of sibling [`Node`]s in textual
//! order. Parsing is fail fast: the first error aborts and reports the
//! byte offset of the offending input.

use memchr::{memchr, memchr2, memchr3};

use crate::definition::{find_definition, Definition, ParseContext};
use crate::error::ParseError;
use crate::format::{FormatSpec, Justify};
use crate::node::{Condition, Field, Node, PadKind, Padding};
use crate::padding;

/// Characters that end a text run, besides `%`.
///
/// Which set applies depends on where the text sits: none at top level,
/// `&` and `>` inside a modern true branch, `>` inside a modern false
/// branch, `?` (and `&`) inside legacy branches.
type TermChars = u8;
const TERM_NONE: TermChars = 0;
const TERM_AMPERSAND: TermChars = 1 << 0;
const TERM_GREATER: TermChars = 1 << 1;
const TERM_QUESTION: TermChars = 1 << 2;

/// Parse a full format string into the root sibling list and re-pad it.
pub(crate) fn parse_tree(source: &str, defs: &[Definition]) -> Result<Vec<Node>, ParseError> {
	if source.is_empty() {
		return Ok(vec![Node::Empty]);
	}

	let parser = Parser { src: source, defs };
	let mut nodes = Vec::new();
	let mut pos = 0;
	while pos < source.len() {
		let (node, next) = parser.parse_element(pos, source.len(), TERM_NONE, false, true)?;
		nodes.push(node);
		pos = next;
	}

	padding::repad(&mut nodes);
	Ok(nodes)
}

struct Parser<'a> {
	src: &'a str,
	defs: &'a [Definition],
}

impl Parser<'_> {
	/// Parse one element starting at `pos`.
	///
	/// `end` bounds text runs only; constructs are parsed against the
	/// full source, as their terminators were located by the branch
	/// scans. Inside the test slot of a conditional (`cond_start`) a
	/// bare `<` or `?` introduces a construct as if preceded by `%`.
	/// Returns the node and the position of the first unconsumed byte.
	fn parse_element(
		&self,
		pos: usize,
		end: usize,
		term: TermChars,
		cond_start: bool,
		top_level: bool,
	) -> Result<(Node, usize), ParseError> {
		let bytes = self.src.as_bytes();
		let b = bytes[pos];

		if b == b'%' || (cond_start && (b == b'?' || b == b'<')) {
			let p = pos + 1;
			if p >= self.src.len() {
				return Err(ParseError::UnknownExpando {
					position: p,
					code: String::new(),
				});
			}
			match bytes[p] {
				b'%' => Ok((Node::Text("%".into()), p + 1)),
				b'?' | b'<' => self.parse_conditional(p),
				b'>' | b'|' | b'*' if top_level => Ok(self.parse_padding(p)),
				_ => self.parse_field(p, cond_start),
			}
		} else {
			Ok(self.parse_text(pos, end, term))
		}
	}

	/// Parse a text run from `pos` until `%`, a terminator or `end`.
	fn parse_text(&self, pos: usize, end: usize, term: TermChars) -> (Node, usize) {
		let hay = &self.src.as_bytes()[pos..end];
		let stop = match term {
			TERM_NONE => memchr(b'%', hay),
			t if t == TERM_AMPERSAND | TERM_GREATER => memchr3(b'%', b'&', b'>', hay),
			TERM_GREATER => memchr2(b'%', b'>', hay),
			t if t == TERM_AMPERSAND | TERM_QUESTION => memchr3(b'%', b'&', b'?', hay),
			TERM_QUESTION => memchr2(b'%', b'?', hay),
			_ => hay.iter().position(|&b| {
				b == b'%'
					|| (term & TERM_AMPERSAND != 0 && b == b'&')
					|| (term & TERM_GREATER != 0 && b == b'>')
					|| (term & TERM_QUESTION != 0 && b == b'?')
			}),
		};
		let stop = pos + stop.unwrap_or(hay.len());
		debug_assert!(stop > pos, "text runs are never empty");
		(Node::Text(self.src[pos..stop].into()), stop)
	}

	/// Parse a conditional; `pos` is at the style character (`<` or `?`).
	fn parse_conditional(&self, pos: usize) -> Result<(Node, usize), ParseError> {
		let bytes = self.src.as_bytes();
		let old_style = bytes[pos] == b'?';
		let terminator = if old_style { b'?' } else { b'>' };

		// The test is one element in condition-start mode; the style
		// character doubles as its implicit `%`.
		let (test, after_test) = self.parse_element(pos, self.src.len(), TERM_NONE, true, false)?;
		if after_test >= self.src.len() || bytes[after_test] != b'?' {
			return Err(ParseError::MissingQuestionMark { position: after_test });
		}

		let start_true = after_test + 1;
		let end_true = self.scan_branch_end(start_true, terminator, true);
		let only_true = end_true < self.src.len() && bytes[end_true] == terminator;
		let has_false = end_true < self.src.len() && bytes[end_true] == b'&';
		if !only_true && !has_false {
			return Err(ParseError::MissingBranchSeparator {
				position: end_true,
				terminator: terminator as char,
			});
		}

		let term_true = if old_style {
			TERM_QUESTION | TERM_AMPERSAND
		} else {
			TERM_GREATER | TERM_AMPERSAND
		};
		let if_true = self.parse_branch(start_true, end_true, term_true)?;

		if only_true {
			let node = Condition {
				test,
				if_true,
				if_false: None,
			};
			return Ok((Node::Condition(Box::new(node)), end_true + 1));
		}

		let start_false = end_true + 1;
		let end_false = self.scan_branch_end(start_false, terminator, false);
		if end_false >= self.src.len() || bytes[end_false] != terminator {
			return Err(ParseError::MissingConditionEnd {
				position: start_false,
				terminator: terminator as char,
			});
		}

		let term_false = if old_style { TERM_QUESTION } else { TERM_GREATER };
		let if_false = self.parse_branch(start_false, end_false, term_false)?;

		let node = Condition {
			test,
			if_true,
			if_false: Some(if_false),
		};
		Ok((Node::Condition(Box::new(node)), end_false + 1))
	}

	/// Parse the elements of a branch bounded by a scanned end.
	///
	/// An empty branch materialises [`Node::Empty`] so slot positions
	/// stay stable.
	fn parse_branch(&self, start: usize, end: usize, term: TermChars) -> Result<Node, ParseError> {
		let mut nodes = Vec::new();
		let mut pos = start;
		while pos < end {
			let (node, next) = self.parse_element(pos, end, term, false, false)?;
			nodes.push(node);
			pos = next;
		}
		if nodes.is_empty() {
			return Ok(Node::Empty);
		}
		Ok(Node::from_list(nodes))
	}

	/// Find the end of a branch by forward scan.
	///
	/// `%<` opens a nesting level and an un-escaped `>` closes one; at
	/// depth zero an un-escaped terminator (and, scanning a true branch,
	/// an un-escaped `&`) ends the branch. The legacy scan counts the
	/// `%<`…`>` pairs too, so a legacy branch may carry a modern
	/// conditional as content. Returns the end of input if nothing
	/// terminates the branch.
	fn scan_branch_end(&self, start: usize, terminator: u8, stop_ampersand: bool) -> usize {
		let bytes = self.src.as_bytes();
		let mut depth = 0i32;
		let mut prev = 0u8;
		let mut i = start;
		while i < bytes.len() {
			let b = bytes[i];
			if depth == 0
				&& prev != b'%'
				&& (b == terminator || (stop_ampersand && b == b'&'))
			{
				return i;
			}
			if prev == b'%' && b == b'<' {
				depth += 1;
			}
			if b == b'>' && prev != b'%' {
				depth -= 1;
			}
			prev = b;
			i += 1;
		}
		bytes.len()
	}

	/// Parse an expando; `pos` is at the first byte of the format spec
	/// or code. In a conditional test the result is a [`Node::CondBool`].
	fn parse_field(&self, pos: usize, as_test: bool) -> Result<(Node, usize), ParseError> {
		let (format, code_start) = self.parse_format(pos)?;

		let rest = &self.src[code_start..];
		let Some((def, code_len)) = find_definition(self.defs, rest) else {
			return Err(ParseError::UnknownExpando {
				position: code_start,
				code: rest.chars().next().map(String::from).unwrap_or_default(),
			});
		};

		let mut next = code_start + code_len;
		let mut arg = None;
		if let Some(parser) = def.parser {
			let context = if as_test { ParseContext::Condition } else { ParseContext::Plain };
			let argument = parser(&self.src[next..], next, context)?;
			next += argument.len;
			arg = Some(argument.text);
		}

		let field = Field {
			did: def.did,
			uid: def.uid,
			kind: def.kind,
			arg,
			format,
		};
		let node = if as_test {
			Node::CondBool(field)
		} else {
			Node::Expando(field)
		};
		Ok((node, next))
	}

	/// Parse the optional `[-=][0][width][.precision]` prefix.
	fn parse_format(&self, pos: usize) -> Result<(Option<FormatSpec>, usize), ParseError> {
		let bytes = self.src.as_bytes();
		let mut spec = FormatSpec::default();
		let mut seen = false;
		let mut p = pos;

		match bytes.get(p) {
			Some(b'-') => {
				spec.justify = Justify::Left;
				seen = true;
				p += 1;
			},
			Some(b'=') => {
				spec.justify = Justify::Centre;
				seen = true;
				p += 1;
			},
			_ => {},
		}

		if bytes.get(p) == Some(&b'0') {
			spec.leader = '0';
			seen = true;
			p += 1;
		}

		let digits = p;
		while bytes.get(p).is_some_and(|b| b.is_ascii_digit()) {
			p += 1;
		}
		if p > digits {
			spec.min_cols = self.src[digits..p]
				.parse()
				.map_err(|_| ParseError::InvalidNumber { position: digits })?;
			seen = true;
		}

		if bytes.get(p) == Some(&b'.') {
			p += 1;
			let digits = p;
			while bytes.get(p).is_some_and(|b| b.is_ascii_digit()) {
				p += 1;
			}
			if p == digits {
				return Err(ParseError::InvalidNumber { position: digits });
			}
			spec.max_cols = Some(
				self.src[digits..p]
					.parse()
					.map_err(|_| ParseError::InvalidNumber { position: digits })?,
			);
			seen = true;
		}

		Ok((seen.then_some(spec), p))
	}

	/// Parse a padding marker; `pos` is at `>`, `|` or `*`.
	///
	/// The fill glyph is the next character, a space if the marker ends
	/// the input. The sibling groups are installed later by re-pad.
	fn parse_padding(&self, pos: usize) -> (Node, usize) {
		let kind = match self.src.as_bytes()[pos] {
			b'>' => PadKind::Soft,
			b'|' => PadKind::Hard,
			_ => PadKind::Eol,
		};
		let (glyph, glyph_len) = match self.src[pos + 1..].chars().next() {
			Some(c) => (c, c.len_utf8()),
			None => (' ', 0),
		};
		let node = Node::Padding(Padding {
			kind,
			glyph,
			left: None,
			right: None,
		});
		(node, pos + 1 + glyph_len)
	}
}
