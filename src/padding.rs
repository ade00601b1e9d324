//! The re-pad pass and the fill rules.
//!
//! Padding markers are parsed as bare [`Padding`][crate::Padding] nodes.
//! After top-level parsing the re-pad pass restructures the root sibling
//! list around the first marker, so the renderer can account for the
//! left and right groups locally. Later markers stay as plain siblings
//! inside the right group and are handled when the group is flattened
//! into a chain.

use crate::format::{push_cols, push_fill};
use crate::node::{Node, PadKind};

/// Restructure the root sibling list around the first padding marker.
///
/// Siblings before the marker become its left group, siblings after it
/// the right group, and the marker becomes the only root node. A list
/// without fresh markers is left untouched, which makes the pass
/// idempotent.
pub(crate) fn repad(nodes: &mut Vec<Node>) {
	let index = nodes.iter().position(is_fresh_padding);
	let Some(index) = index else { return };

	let right = nodes.split_off(index + 1);
	let marker = nodes.pop().expect("marker at end after split");
	let left = std::mem::take(nodes);

	let Node::Padding(mut pad) = marker else {
		unreachable!("position() matched a padding node");
	};
	if !left.is_empty() {
		pad.left = Some(Box::new(Node::Container(left)));
	}
	if !right.is_empty() {
		pad.right = Some(Box::new(Node::Container(right)));
	}
	nodes.push(Node::Padding(pad));
}

/// A padding marker that has not been given its sibling groups yet.
fn is_fresh_padding(node: &Node) -> bool {
	matches!(node, Node::Padding(p) if p.left.is_none() && p.right.is_none())
}

/// One item of a flattened padded row: a pre-rendered segment with its
/// width in columns, or a padding marker.
pub(crate) enum ChainItem {
	Seg(String, usize),
	Pad(PadKind, char),
}

/// Render a flattened row into `out` within `budget` columns.
///
/// Returns the columns written. Working on pre-rendered segments keeps
/// the width accounting local: every fill sees exactly the natural
/// width of the content on each side.
pub(crate) fn render_chain(items: &[ChainItem], budget: usize, out: &mut String) -> usize {
	let Some(index) = items.iter().position(|i| matches!(i, ChainItem::Pad(..))) else {
		return emit_segments(items, budget, out);
	};
	let &ChainItem::Pad(kind, glyph) = &items[index] else {
		unreachable!("position() matched a padding item");
	};

	let rest = &items[index + 1..];
	let rest_content: usize = rest
		.iter()
		.map(|i| match i {
			ChainItem::Seg(_, cols) => *cols,
			ChainItem::Pad(..) => 0,
		})
		.sum();

	let mut written = 0;
	match kind {
		PadKind::Soft => {
			// Fill whatever the neighbours leave over; never clip them.
			written += emit_segments(&items[..index], budget, out);
			let gap = (budget - written).saturating_sub(rest_content);
			written += push_fill(out, glyph, gap);
		},
		PadKind::Hard => {
			// The right group takes precedence over the left.
			let rest_cols = rest_content.min(budget);
			let allowed = budget - rest_cols;
			written += emit_segments(&items[..index], allowed, out);
			written += push_fill(out, glyph, allowed - written);
		},
		PadKind::Eol => {
			// Every end-of-row fill gets an equal share of the slack,
			// integer division leaving the remainder to the rightmost.
			written += emit_segments(&items[..index], budget, out);
			let fills = 1 + rest
				.iter()
				.filter(|i| matches!(i, ChainItem::Pad(PadKind::Eol, _)))
				.count();
			let slack = (budget - written).saturating_sub(rest_content);
			written += push_fill(out, glyph, slack / fills);
		},
	}

	written + render_chain(rest, budget - written, out)
}

fn emit_segments(items: &[ChainItem], budget: usize, out: &mut String) -> usize {
	let mut written = 0;
	for item in items {
		if let ChainItem::Seg(text, _) = item {
			written += push_cols(out, text, budget - written);
		}
	}
	written
}
