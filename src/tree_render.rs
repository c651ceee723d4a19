//! ASCII tree rendering for the neuron forest.

use crate::models::{LinkCategory, Neuron, RelativeType};
use crate::sync::{Forest, SlotId};

const ROOT: char = '●';
const PRESYNAPTIC: char = '◀';
const POSTSYNAPTIC: char = '▶';

/// Get the symbol for a neuron's relative type.
fn node_symbol(neuron: &Neuron) -> char {
    match neuron.relative_type {
        RelativeType::NotSet => ROOT,
        RelativeType::Presynaptic => PRESYNAPTIC,
        RelativeType::Postsynaptic => POSTSYNAPTIC,
    }
}

/// Render the forest as ASCII art with relative-type symbols.
///
/// Example output:
/// ```text
/// motor cortex
/// ├── ◀ basal ganglia [full-excite]
/// │   └── ▶ thalamus [partial-inhibit]
/// └── ▶ spinal cord [full-excite]
/// ```
pub fn render_forest(forest: &Forest) -> String {
    let mut output = String::new();
    let roots = forest.roots();
    for (i, &root) in roots.iter().enumerate() {
        let is_last = i == roots.len() - 1;
        render_node(forest, &mut output, root, "", is_last, true);
    }
    output
}

/// Recursively render a node and its children.
fn render_node(
    forest: &Forest,
    output: &mut String,
    slot: SlotId,
    prefix: &str,
    is_last: bool,
    is_root: bool,
) {
    let node = forest.node(slot);

    if is_root {
        // Root nodes: just tag (no branch characters)
        output.push_str(&node.neuron.tag);
        output.push('\n');
    } else {
        // Child nodes: branch + symbol + tag (+ link category for relations)
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
        output.push(node_symbol(&node.neuron));
        output.push(' ');
        output.push_str(&node.neuron.tag);
        if let Some(ref terminal) = node.neuron.terminal {
            output.push_str(" [");
            output.push_str(LinkCategory::from_terminal(terminal).as_str());
            output.push(']');
        }
        output.push('\n');
    }

    // Calculate prefix for children
    let child_prefix = if is_root {
        String::new()
    } else {
        let continuation = if is_last { "    " } else { "│   " };
        format!("{}{}", prefix, continuation)
    };

    // Render children
    let children = node.children();
    for (i, &child) in children.iter().enumerate() {
        let child_is_last = i == children.len() - 1;
        render_node(forest, output, child, &child_prefix, child_is_last, false);
    }
}
