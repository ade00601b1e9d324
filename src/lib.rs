//! Compile user-configurable format strings and render them against host
//! data within a column budget.
//!
//! A format string like `"%-8f%<u?(%u)&>"` describes one line of output:
//! literal text, `%`-prefixed references to host data (*expandos*),
//! conditionals and padding markers. [`Expando::parse()`] compiles it
//! once into a node tree; [`Expando::render()`] walks the tree against
//! caller-supplied callbacks, as often as needed.
//!
//! # The language
//!
//! * `%%` renders a literal `%`.
//! * `%[-=][0][width][.precision]CODE` renders a host data field.
//!   `-` justifies left and `=` centres (the default is right), a
//!   leading `0` zero-pads, `width` is the minimum and `.precision` the
//!   maximum number of columns.
//! * `%<TEST?TRUE&FALSE>` renders one of two branches; `&FALSE` may be
//!   omitted. This form nests. The older `%?TEST?TRUE&FALSE?` form is
//!   also recognised but does not nest.
//! * `%>X`, `%|X` and `%*X` pad the line with the glyph `X`: `%>` fills
//!   the gap between its neighbours, `%|` also truncates the left side
//!   to make the right side fit, and `%*` fills to the end of the row.
//!
//! The engine knows no codes of its own: the host describes them in a
//! [`Definition`] table used at parse time, and provides the values
//! through a parallel [`Callback`] table at render time. Widths are
//! measured in visible terminal columns, so wide characters count as
//! two and are never split.
//!
//! # Examples
//!
//! Define the codes the host understands, compile a format string once,
//! then render it against changing data:
//!
//! ```
//! use expando::{Callback, Definition, Expando, Field, RenderFlags, ValueKind};
//!
//! struct Mailbox {
//! 	name: &'static str,
//! 	unread: i64,
//! }
//!
//! const DEFS: &[Definition] = &[
//! 	Definition::new("f", 1, 1, ValueKind::String),
//! 	Definition::new("u", 1, 2, ValueKind::Number),
//! ];
//!
//! fn folder(_: &Field, mailbox: &Mailbox, _: RenderFlags, out: &mut String) {
//! 	out.push_str(mailbox.name);
//! }
//!
//! fn unread(_: &Field, mailbox: &Mailbox, _: RenderFlags) -> i64 {
//! 	mailbox.unread
//! }
//!
//! # fn main() -> Result<(), expando::ParseError> {
//! let expando = Expando::parse("%-8f%<u?(%u)&>", DEFS)?;
//! let callbacks = [
//! 	Callback::string(1, 1, folder),
//! 	Callback::number(1, 2, unread),
//! ];
//!
//! let mailbox = Mailbox { name: "inbox", unread: 3 };
//! assert_eq!(expando.render_to_string(&callbacks, &mailbox, 0, None), "inbox   (3)");
//!
//! let mailbox = Mailbox { name: "spam", unread: 0 };
//! assert_eq!(expando.render_to_string(&callbacks, &mailbox, 0, None), "spam    ");
//! # Ok(())
//! # }
//! ```
//!
//! Padding markers absorb whatever the column budget leaves over:
//!
//! ```
//! use expando::{Callback, Definition, Expando, Field, RenderFlags, ValueKind};
//!
//! const DEFS: &[Definition] = &[Definition::new("v", 1, 1, ValueKind::String)];
//!
//! fn version(_: &Field, _: &(), _: RenderFlags, out: &mut String) {
//! 	out.push_str("v1.2");
//! }
//!
//! # fn main() -> Result<(), expando::ParseError> {
//! let status = Expando::parse("-- mail%>-%v", DEFS)?;
//! let callbacks = [Callback::string(1, 1, version)];
//! assert_eq!(status.render_to_string(&callbacks, &(), 0, Some(16)), "-- mail-----v1.2");
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs, missing_debug_implementations)]

pub mod error;
pub use error::ParseError;

mod callback;
pub use callback::{Callback, NumberCallback, RenderFlags, StringCallback};

mod definition;
pub use definition::{Argument, CustomParser, Definition, ParseContext, ValueKind};

mod expando;
pub use expando::Expando;

mod format;
pub use format::{FormatSpec, Justify};

mod node;
pub use node::{Condition, Field, Node, PadKind, Padding};
pub use node::{SLOT_CONDITION, SLOT_FALSE, SLOT_LEFT, SLOT_RIGHT, SLOT_TRUE};

mod padding;
mod parse;
mod render;

/// Parse and render a format string in one call.
///
/// This is a convenience for one-off output. When the same format
/// renders repeatedly, parse it once with [`Expando::parse()`] and keep
/// the compiled form.
///
/// ```
/// # use expando::{Callback, Definition, Field, RenderFlags, ValueKind};
/// const DEFS: &[Definition] = &[Definition::new("h", 1, 1, ValueKind::String)];
///
/// fn host(_: &Field, name: &str, _: RenderFlags, out: &mut String) {
/// 	out.push_str(name);
/// }
///
/// # fn main() -> Result<(), expando::ParseError> {
/// let callbacks = [Callback::<str>::string(1, 1, host)];
/// let line = expando::render_once("on %h", DEFS, &callbacks, "mail", 0, None)?;
/// assert_eq!(line, "on mail");
/// # Ok(())
/// # }
/// ```
pub fn render_once<T: ?Sized>(
	source: &str,
	defs: &[Definition],
	callbacks: &[Callback<T>],
	data: &T,
	flags: RenderFlags,
	max_cols: Option<usize>,
) -> Result<String, ParseError> {
	let expando = Expando::parse(source, defs)?;
	Ok(expando.render_to_string(callbacks, data, flags, max_cols))
}
