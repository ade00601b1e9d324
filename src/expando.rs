//! The compiled format string.

use crate::callback::{Callback, RenderFlags};
use crate::definition::Definition;
use crate::error::ParseError;
use crate::node::Node;
use crate::parse::parse_tree;
use crate::render::{render_nodes, UNBOUNDED_COLS};

/// A compiled format string.
///
/// Parse once, render many times. The compiled form owns a copy of the
/// source string and the node tree; neither borrows from the caller, so
/// an `Expando` can outlive the buffer it was parsed from and can be
/// shared freely between threads.
///
/// Two expandos are equal exactly when their source strings are byte
/// identical.
#[derive(Clone)]
pub struct Expando {
	source: String,
	root: Node,
}

impl std::fmt::Debug for Expando {
	#[inline]
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Expando").field(&self.source).finish()
	}
}

impl Expando {
	/// Parse a format string against a definition table.
	///
	/// Parsing is fail fast: the first syntax error or unknown code
	/// aborts with a [`ParseError`] locating the offending byte. The
	/// re-pad pass runs as part of parsing, so the returned tree is
	/// ready to render.
	pub fn parse(source: &str, defs: &[Definition]) -> Result<Self, ParseError> {
		let nodes = parse_tree(source, defs)?;
		Ok(Self {
			source: source.to_owned(),
			root: Node::Container(nodes),
		})
	}

	/// Get the original source string.
	#[inline]
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Consume the expando to get the source string back.
	#[inline]
	pub fn into_source(self) -> String {
		self.source
	}

	/// Get the root of the node tree.
	///
	/// The root is always a [`Node::Container`] holding the top-level
	/// siblings in textual order.
	#[inline]
	pub fn root(&self) -> &Node {
		&self.root
	}

	/// Render the expando against host data.
	///
	/// Looks up every expando node in `callbacks` by its `(did, uid)`
	/// pair and passes `data` and `flags` through to the callbacks
	/// untouched. At most `max_cols` columns are appended to `out`
	/// (`None` applies a generous default suitable for a command line).
	/// Returns the number of columns written.
	///
	/// Rendering never fails: nodes without a usable callback render as
	/// empty text.
	pub fn render<T: ?Sized>(
		&self,
		callbacks: &[Callback<T>],
		data: &T,
		flags: RenderFlags,
		max_cols: Option<usize>,
		out: &mut String,
	) -> usize {
		let budget = max_cols.unwrap_or(UNBOUNDED_COLS);
		let Node::Container(nodes) = &self.root else {
			unreachable!("the root is always a container");
		};
		render_nodes(nodes, callbacks, data, flags, budget, out)
	}

	/// Render the expando into a fresh string.
	pub fn render_to_string<T: ?Sized>(
		&self,
		callbacks: &[Callback<T>],
		data: &T,
		flags: RenderFlags,
		max_cols: Option<usize>,
	) -> String {
		let mut out = String::new();
		self.render(callbacks, data, flags, max_cols, &mut out);
		out
	}
}

impl PartialEq for Expando {
	#[inline]
	fn eq(&self, other: &Self) -> bool {
		self.source == other.source
	}
}

impl Eq for Expando {}

impl std::fmt::Display for Expando {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.source)
	}
}
