//! The width-aware tree walk.
//!
//! Rendering never fails: a missing callback renders as empty text and
//! the column accounting proceeds. The walk never writes more columns
//! than its budget and appends to the output without resetting it.

use crate::callback::{find_callback, Callback, RenderFlags};
use crate::definition::ValueKind;
use crate::format::push_cols;
use crate::node::{Field, Node, Padding};
use crate::padding::{render_chain, ChainItem};

/// The column budget used when the caller does not supply one.
///
/// Large enough for a long command line.
pub(crate) const UNBOUNDED_COLS: usize = 8192;

struct Ctx<'a, T: ?Sized> {
	callbacks: &'a [Callback<T>],
	data: &'a T,
	flags: RenderFlags,
}

/// Render a sibling list into `out` within `budget` columns.
pub(crate) fn render_nodes<T: ?Sized>(
	nodes: &[Node],
	callbacks: &[Callback<T>],
	data: &T,
	flags: RenderFlags,
	budget: usize,
	out: &mut String,
) -> usize {
	let ctx = Ctx { callbacks, data, flags };
	render_list(nodes, &ctx, budget, out)
}

fn render_list<T: ?Sized>(nodes: &[Node], ctx: &Ctx<T>, budget: usize, out: &mut String) -> usize {
	let mut written = 0;
	for node in nodes {
		if written >= budget {
			break;
		}
		written += render_node(node, ctx, budget - written, out);
	}
	written
}

fn render_node<T: ?Sized>(node: &Node, ctx: &Ctx<T>, budget: usize, out: &mut String) -> usize {
	if budget == 0 {
		return 0;
	}
	match node {
		Node::Empty => 0,
		Node::Text(text) => push_cols(out, text, budget),
		Node::Expando(field) => render_field(field, ctx, budget, out),
		// A bare truth test emits nothing.
		Node::CondBool(_) => 0,
		Node::Condition(cond) => {
			let branch = if eval_test(&cond.test, ctx) {
				Some(&cond.if_true)
			} else {
				cond.if_false.as_ref()
			};
			match branch {
				Some(node) => render_node(node, ctx, budget, out),
				None => 0,
			}
		},
		Node::Container(children) => render_list(children, ctx, budget, out),
		Node::Padding(pad) => render_padding(pad, ctx, budget, out),
	}
}

/// Render an expando through its callback, numbers formatted as decimal.
///
/// A missing callback, or a missing slot, renders as nothing at all; a
/// present callback that produces an empty value is still padded to the
/// minimum width of its format.
fn render_field<T: ?Sized>(field: &Field, ctx: &Ctx<T>, budget: usize, out: &mut String) -> usize {
	let Some(cb) = find_callback(ctx.callbacks, field.did, field.uid) else {
		return 0;
	};

	let mut value = String::new();
	match field.kind {
		ValueKind::String => match cb.string {
			Some(f) => f(field, ctx.data, ctx.flags, &mut value),
			None => return 0,
		},
		ValueKind::Number => match cb.number {
			Some(f) => value.push_str(&f(field, ctx.data, ctx.flags).to_string()),
			None => return 0,
		},
	}

	match &field.format {
		Some(spec) => {
			let mut formatted = String::new();
			spec.apply(&value, &mut formatted);
			push_cols(out, &formatted, budget)
		},
		None => push_cols(out, &value, budget),
	}
}

/// Decide which branch of a conditional renders.
///
/// A test that is an expando goes through its callbacks: number codes
/// are true when non-zero, string codes when they render non-empty.
/// Any other subtree is true when it renders non-empty. The branch that
/// is not selected is never evaluated.
fn eval_test<T: ?Sized>(test: &Node, ctx: &Ctx<T>) -> bool {
	match test {
		Node::CondBool(field) | Node::Expando(field) => {
			let Some(cb) = find_callback(ctx.callbacks, field.did, field.uid) else {
				return false;
			};
			match field.kind {
				ValueKind::Number => match (cb.number, cb.string) {
					(Some(f), _) => f(field, ctx.data, ctx.flags) != 0,
					(None, Some(f)) => rendered_non_empty(f, field, ctx),
					(None, None) => false,
				},
				ValueKind::String => match (cb.string, cb.number) {
					(Some(f), _) => rendered_non_empty(f, field, ctx),
					(None, Some(f)) => f(field, ctx.data, ctx.flags) != 0,
					(None, None) => false,
				},
			}
		},
		other => {
			let mut scratch = String::new();
			render_node(other, ctx, UNBOUNDED_COLS, &mut scratch);
			!scratch.is_empty()
		},
	}
}

fn rendered_non_empty<T: ?Sized>(
	f: crate::callback::StringCallback<T>,
	field: &Field,
	ctx: &Ctx<T>,
) -> bool {
	let mut scratch = String::new();
	f(field, ctx.data, ctx.flags, &mut scratch);
	!scratch.is_empty()
}

/// Flatten a re-padded row into pre-rendered segments and fill markers,
/// then hand the column arithmetic to [`render_chain`].
fn render_padding<T: ?Sized>(pad: &Padding, ctx: &Ctx<T>, budget: usize, out: &mut String) -> usize {
	let mut items = Vec::new();
	if let Some(left) = pad.left.as_deref() {
		items.push(segment(std::slice::from_ref(left), ctx, budget));
	}
	items.push(ChainItem::Pad(pad.kind, pad.glyph));

	match pad.right.as_deref() {
		Some(Node::Container(children)) => {
			// Later markers are plain siblings inside the right group;
			// runs of content between them become single segments.
			let mut run_start = 0;
			for (index, child) in children.iter().enumerate() {
				if let Node::Padding(p) = child {
					if index > run_start {
						items.push(segment(&children[run_start..index], ctx, budget));
					}
					items.push(ChainItem::Pad(p.kind, p.glyph));
					run_start = index + 1;
				}
			}
			if children.len() > run_start {
				items.push(segment(&children[run_start..], ctx, budget));
			}
		},
		Some(other) => items.push(segment(std::slice::from_ref(other), ctx, budget)),
		None => {},
	}

	render_chain(&items, budget, out)
}

fn segment<T: ?Sized>(nodes: &[Node], ctx: &Ctx<T>, budget: usize) -> ChainItem {
	let mut text = String::new();
	let mut cols = 0;
	for node in nodes {
		if cols >= budget {
			break;
		}
		cols += render_node(node, ctx, budget - cols, &mut text);
	}
	ChainItem::Seg(text, cols)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::definition::Definition;
	use crate::expando::Expando;
	use assert2::{assert, check, let_assert};
	use std::cell::Cell;

	#[derive(Default)]
	struct Host {
		cherry: &'static str,
		tangerine: &'static str,
		fig: &'static str,
		unread: i64,
		fig_calls: Cell<u32>,
	}

	const DEFS: &[Definition] = &[
		Definition::new("c", 1, 1, ValueKind::String),
		Definition::new("t", 1, 2, ValueKind::String),
		Definition::new("f", 1, 3, ValueKind::String),
		Definition::new("u", 1, 4, ValueKind::Number),
	];

	fn cherry(_: &Field, host: &Host, _: RenderFlags, out: &mut String) {
		out.push_str(host.cherry);
	}

	fn tangerine(_: &Field, host: &Host, _: RenderFlags, out: &mut String) {
		out.push_str(host.tangerine);
	}

	fn fig(_: &Field, host: &Host, _: RenderFlags, out: &mut String) {
		host.fig_calls.set(host.fig_calls.get() + 1);
		out.push_str(host.fig);
	}

	fn unread(_: &Field, host: &Host, _: RenderFlags) -> i64 {
		host.unread
	}

	fn callbacks() -> [Callback<Host>; 4] {
		[
			Callback::string(1, 1, cherry),
			Callback::string(1, 2, tangerine),
			Callback::string(1, 3, fig),
			Callback::number(1, 4, unread),
		]
	}

	fn render(source: &str, host: &Host, budget: usize) -> String {
		let_assert!(Ok(exp) = Expando::parse(source, DEFS));
		let mut out = String::new();
		let written = exp.render(&callbacks(), host, 0, Some(budget), &mut out);
		assert!(written == crate::format::str_cols(&out));
		assert!(written <= budget);
		out
	}

	#[test]
	fn test_escape() {
		let host = Host::default();
		check!(render("%%", &host, 80) == "%");
	}

	#[test]
	fn test_then_and_else() {
		let host = Host {
			cherry: "1",
			tangerine: "tan",
			fig: "fig",
			..Host::default()
		};
		check!(render("%<c?%t&%f>", &host, 80) == "tan");

		let host = Host {
			cherry: "",
			tangerine: "tan",
			fig: "fig",
			..Host::default()
		};
		check!(render("%<c?%t&%f>", &host, 80) == "fig");
	}

	#[test]
	fn test_empty_then_branch_renders_nothing() {
		let host = Host { cherry: "x", ..Host::default() };
		check!(render("%<c?>", &host, 80) == "");
		let host = Host::default();
		check!(render("%<c?>", &host, 80) == "");
	}

	#[test]
	fn test_unselected_branch_is_not_evaluated() {
		let host = Host {
			cherry: "1",
			tangerine: "tan",
			fig: "fig",
			..Host::default()
		};
		check!(render("%<c?%t&%f>", &host, 80) == "tan");
		assert!(host.fig_calls.get() == 0);
	}

	#[test]
	fn test_number_test() {
		let host = Host { unread: 3, tangerine: "new", fig: "-", ..Host::default() };
		check!(render("%<u?%t&%f>", &host, 80) == "new");
		let host = Host { unread: 0, tangerine: "new", fig: "-", ..Host::default() };
		check!(render("%<u?%t&%f>", &host, 80) == "-");
	}

	#[test]
	fn test_subtree_test_renders_non_empty() {
		// The test is itself a conditional, true when it renders text.
		let host = Host { cherry: "x", tangerine: "yes", fig: "no", ..Host::default() };
		check!(render("%<<c?x&>?%t&%f>", &host, 80) == "yes");
		let host = Host { cherry: "", tangerine: "yes", fig: "no", ..Host::default() };
		check!(render("%<<c?x&>?%t&%f>", &host, 80) == "no");
	}

	#[test]
	fn test_width_and_justification() {
		let host = Host { tangerine: "ab", ..Host::default() };
		check!(render("%-5t", &host, 80) == "ab   ");
		check!(render("%5t", &host, 80) == "   ab");
		let host = Host { tangerine: "abcd", ..Host::default() };
		check!(render("%.2t", &host, 80) == "ab");
	}

	#[test]
	fn test_empty_value_is_still_padded() {
		let host = Host::default();
		check!(render("%5t", &host, 80) == "     ");
	}

	#[test]
	fn test_zero_padded_number() {
		let host = Host { unread: 7, ..Host::default() };
		check!(render("%03u", &host, 80) == "007");
		let host = Host { unread: -7, ..Host::default() };
		check!(render("%03u", &host, 80) == "-07");
	}

	#[test]
	fn test_missing_callback_renders_empty() {
		let host = Host { tangerine: "x", ..Host::default() };
		let_assert!(Ok(exp) = Expando::parse("a%tb", DEFS));
		let mut out = String::new();
		let written = exp.render::<Host>(&[], &host, 0, None, &mut out);
		check!(out == "ab");
		check!(written == 2);
	}

	#[test]
	fn test_budget_is_respected() {
		let host = Host { tangerine: "abcdef", ..Host::default() };
		check!(render("x%ty", &host, 4) == "xabc");
		check!(render("x%ty", &host, 0) == "");
	}

	#[test]
	fn test_wide_characters_are_never_split() {
		let host = Host { tangerine: "日本語", ..Host::default() };
		check!(render("%t", &host, 6) == "日本語");
		check!(render("%t", &host, 5) == "日本");
		check!(render("%t", &host, 1) == "");
	}

	#[test]
	fn test_soft_padding() {
		let host = Host::default();
		check!(render("A%>.B", &host, 5) == "A...B");
		check!(render("A%>.B", &host, 3) == "A.B");
		check!(render("A%>.B", &host, 2) == "AB");
	}

	#[test]
	fn test_hard_padding_truncates_the_left() {
		let host = Host { tangerine: "longtext", ..Host::default() };
		check!(render("%t%|.end", &host, 11) == "longtextend");
		check!(render("%t%|.end", &host, 7) == "longend");
		check!(render("%t%|.end", &host, 14) == "longtext...end");
	}

	#[test]
	fn test_eol_padding() {
		let host = Host { cherry: "ok", ..Host::default() };
		check!(render("%c%*-", &host, 6) == "ok----");
		check!(render("%c%*-tail", &host, 9) == "ok---tail");
	}

	#[test]
	fn test_padding_groups_render_through_callbacks() {
		let host = Host { cherry: "inbox", unread: 12, ..Host::default() };
		check!(render("%c%>.%u", &host, 10) == "inbox...12");
	}

	#[test]
	fn test_locality_without_padding() {
		// Without padding the total is the sum of the children.
		let host = Host { cherry: "ab", tangerine: "cde", ..Host::default() };
		let_assert!(Ok(exp) = Expando::parse("%c-%t", DEFS));
		let mut out = String::new();
		let written = exp.render(&callbacks(), &host, 0, None, &mut out);
		check!(written == 2 + 1 + 3);
		check!(out == "ab-cde");
	}
}
