// Tree assembly from the flat record stream.
//
// MTEF has no explicit tree framing: slots are terminated by End records,
// and inside piles/matrices/templates a *null* Line is an empty slot marker
// rather than a container. The assembler is a plain stack discipline; all
// recursion lives in the LaTeX lowering pass.

use crate::mtef::records::{Record, EMB_1DOT, EMB_HAT, EMB_OBAR};

/// One node of the assembled equation tree.
///
/// The root is synthetic (`record == None`). Only non-null lines,
/// templates, piles, matrices, and embellishments ever carry children.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub record: Option<Record>,
    pub children: Vec<AstNode>,
}

impl AstNode {
    fn root() -> Self {
        Self {
            record: None,
            children: Vec::new(),
        }
    }

    fn leaf(record: Record) -> Self {
        Self {
            record: Some(record),
            children: Vec::new(),
        }
    }

    /// Whether this node is the synthetic root.
    pub fn is_root(&self) -> bool {
        self.record.is_none()
    }
}

/// Fold a record sequence into a rooted tree.
///
/// Protocol per record:
/// - non-null `Line`, `Tmpl`, `Pile`, `Matrix`: open a new slot (push)
/// - null `Line`, `Char`: leaf, appended to the open slot
/// - `Embell`: appended, then swapped in front of the character it
///   decorates for dot/hat/overbar kinds, then pushed (its own slot is
///   closed by the next `End`)
/// - `End`: close the open slot (ignored at the root)
/// - everything else (definitions, size hints): dropped
///
/// Unbalanced input is not an error: any slots still open at end of input
/// are folded into their parents.
pub fn build_tree(records: Vec<Record>) -> AstNode {
    // Stack of open nodes; a node is attached to its parent when closed, so
    // only the innermost open slot ever gains children.
    let mut stack: Vec<AstNode> = vec![AstNode::root()];

    for record in records {
        match record {
            Record::Line(ref line) => {
                let null = line.null;
                let node = AstNode::leaf(record);
                if null {
                    append(&mut stack, node);
                } else {
                    stack.push(node);
                }
            }
            Record::Tmpl(_) | Record::Pile(_) | Record::Matrix(_) => {
                stack.push(AstNode::leaf(record));
            }
            Record::Char(_) => {
                append(&mut stack, AstNode::leaf(record));
            }
            Record::Embell(_) => {
                stack.push(AstNode::leaf(record));
            }
            Record::End => {
                close(&mut stack);
            }
            // Definition and size-hint records never enter the tree.
            _ => {}
        }
    }

    // Close any slots the input failed to terminate.
    while stack.len() > 1 {
        close(&mut stack);
    }
    stack.pop().expect("root never leaves the stack")
}

fn append(stack: &mut [AstNode], node: AstNode) {
    let parent = stack.last_mut().expect("root never leaves the stack");
    parent.children.push(node);
}

/// Pop the innermost open slot and attach it to its parent, applying the
/// embellishment reorder rule: dot/hat/overbar commands precede the
/// character they decorate in LaTeX, while MTEF stores them after it.
fn close(stack: &mut Vec<AstNode>) {
    if stack.len() < 2 {
        return;
    }
    let node = stack.pop().expect("checked above");
    let swap = match node.record {
        Some(Record::Embell(ref embell)) => {
            matches!(embell.kind, EMB_1DOT | EMB_HAT | EMB_OBAR)
        }
        _ => false,
    };

    let parent = stack.last_mut().expect("checked above");
    parent.children.push(node);

    if swap && parent.children.len() >= 2 {
        let len = parent.children.len();
        parent.children.swap(len - 1, len - 2);
    }
}
