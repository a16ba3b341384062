//! Text rendering of a directory tree for the terminal.

use colored::Colorize;
use supports_color::Stream;

use crate::directory::DirectoryNode;

pub fn stdout_supports_color() -> bool {
    supports_color::on(Stream::Stdout).is_some()
}

/// Draws `root` and its subtree with box-drawing guides, one node per line,
/// each followed by its sid.
pub fn render_tree(root: &DirectoryNode, color: bool) -> String {
    let mut out = String::new();
    push_label(&mut out, root, color);
    render_children(&mut out, root, "", color);
    out
}

fn render_children(out: &mut String, node: &DirectoryNode, prefix: &str, color: bool) {
    let count = node.children.len();
    for (index, child) in node.children.iter().enumerate() {
        let last = index + 1 == count;
        out.push_str(prefix);
        out.push_str(if last { "└── " } else { "├── " });
        push_label(out, child, color);

        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        render_children(out, child, &child_prefix, color);
    }
}

fn push_label(out: &mut String, node: &DirectoryNode, color: bool) {
    let sid = format!("[{}]", node.sid);
    if color {
        out.push_str(&format!("{} {}\n", node.name.bold(), sid.dimmed()));
    } else {
        out.push_str(&format!("{} {}\n", node.name, sid));
    }
}
