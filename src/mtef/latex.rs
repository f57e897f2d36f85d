// AST to LaTeX lowering.
//
// A recursive post-order walk over the assembled tree. Unknown template
// selectors and embellishment kinds are not fatal: they are recorded as
// diagnostics and emission continues, so corrupt input still yields the
// largest valid LaTeX prefix.

use crate::mtef::charmap;
use crate::mtef::records::*;
use crate::mtef::tree::AstNode;

/// Recursive LaTeX emitter. Collects non-fatal "unknown construct"
/// diagnostics encountered during the walk.
#[derive(Debug, Default)]
pub struct LatexEmitter {
    diagnostics: Vec<String>,
}

impl LatexEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics accumulated so far (unknown selectors, embellishments,
    /// unsupported arrow variations).
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<String> {
        self.diagnostics
    }

    /// Lower a node (and its subtree) to LaTeX.
    pub fn emit(&mut self, node: &AstNode) -> String {
        match &node.record {
            None => {
                let body = self.concat_children(node);
                format!("$$ {body} $$")
            }
            Some(Record::Line(_)) => self.concat_children(node),
            Some(Record::Pile(_)) => self.emit_pile(node),
            Some(Record::Matrix(matrix)) => self.emit_matrix(node, matrix.cols),
            Some(Record::Char(ch)) => self.emit_char(ch),
            Some(Record::Embell(embell)) => self.emit_embell(embell.kind),
            Some(Record::Tmpl(tmpl)) => self.emit_tmpl(node, tmpl),
            // Definition and size-hint records never reach the tree, but a
            // hand-built tree may contain them; they have no rendering.
            Some(_) => String::new(),
        }
    }

    fn concat_children(&mut self, node: &AstNode) -> String {
        let mut buf = String::new();
        for child in &node.children {
            buf.push_str(&self.emit(child));
        }
        buf
    }

    /// Main/left/right fence slots, assigned by child position; extra
    /// children keep overwriting the right slot.
    fn three_slots(&mut self, node: &AstNode) -> (String, String, String) {
        let mut main = String::new();
        let mut left = String::new();
        let mut right = String::new();
        for (idx, child) in node.children.iter().enumerate() {
            let latex = self.emit(child);
            match idx {
                0 => main = latex,
                1 => left = latex,
                _ => right = latex,
            }
        }
        (main, left, right)
    }

    /// Lower the child at `idx`, or the empty string when the slot is
    /// absent. Malformed templates never panic.
    fn slot(&mut self, node: &AstNode, idx: usize) -> String {
        match node.children.get(idx) {
            Some(child) => self.emit(child),
            None => String::new(),
        }
    }

    fn emit_pile(&mut self, node: &AstNode) -> String {
        let mut buf = String::new();
        for (idx, child) in node.children.iter().enumerate() {
            let latex = self.emit(child);
            if idx > 0 {
                buf.push_str(" \\\\ ");
            }
            buf.push_str(&latex);
        }
        buf
    }

    fn emit_matrix(&mut self, node: &AstNode, cols: u8) -> String {
        let cols = usize::from(cols.max(1));
        let mut buf = String::new();
        for (idx, child) in node.children.iter().enumerate() {
            let latex = self.emit(child);
            // Index 0 is the sentinel slot the matrix padding rule opens.
            if idx == 0 {
                buf.push_str(" \\begin{array} {} ");
                continue;
            }
            buf.push_str(&latex);
            if idx % cols == 0 {
                buf.push_str(" \\\\ ");
            } else {
                buf.push_str(" & ");
            }
        }
        buf.push_str(" \\end{array} ");
        buf
    }

    fn emit_char(&mut self, ch: &Char) -> String {
        let Some(mtcode) = ch.mtcode else {
            // No codepoint to translate (font-position-only character).
            return String::new();
        };

        let family = ch.typeface.wrapping_sub(128);
        let suffix = match family {
            FN_MTEXTRA | FN_SPACE => "/mathmode",
            _ => "",
        };
        let key = format!("char/0x{mtcode:04x}{suffix}");

        let text = match charmap::lookup(&key) {
            Some(translated) => translated.to_string(),
            None => {
                let raw = char::from_u32(u32::from(mtcode)).unwrap_or('\u{FFFD}');
                match charmap::escape(raw) {
                    Some(escaped) => escaped.to_string(),
                    None => raw.to_string(),
                }
            }
        };

        if family == FN_TEXT {
            format!("{{ \\rm{{ {text} }} }}")
        } else {
            text
        }
    }

    fn emit_embell(&mut self, kind: u8) -> String {
        let text = match kind {
            EMB_1DOT => " \\dot ",
            EMB_1PRIME => "'",
            EMB_2PRIME => "''",
            EMB_3PRIME => "'''",
            EMB_HAT => " \\hat ",
            EMB_OBAR => " \\bar ",
            other => {
                self.warn(format!("unknown embellishment kind {other}"));
                ""
            }
        };
        text.to_string()
    }

    fn emit_tmpl(&mut self, node: &AstNode, tmpl: &Tmpl) -> String {
        match tmpl.selector {
            TM_ANGLE | TM_PAREN | TM_INTERVAL => {
                let main = self.slot(node, 0);
                let left = self.slot(node, 1);
                let right = self.slot(node, 2);

                let main_str = wrap_nonempty(&main, "{ ", " }");
                let left_str = wrap_nonempty(&left, "\\left ", "");
                let right_str = wrap_nonempty(&right, "\\right ", "");
                format!("{left_str} {main_str} {right_str}")
            }
            TM_BRACE => {
                let (main, left, right) = self.three_slots(node);
                let right = if right.is_empty() {
                    ".".to_string()
                } else {
                    format!(" {right}")
                };
                format!("\\left {left} \\begin{{array}}{{l}} {main} \\end{{array}} \\right{right}")
            }
            TM_BRACK => {
                let mut main = self.slot(node, 0);
                if main.is_empty() {
                    main = "\\space".to_string();
                }
                let left = self.slot(node, 1);
                let right = self.slot(node, 2);
                format!("\\left{left} {main} \\right{right}")
            }
            TM_BAR => {
                let (main, left, right) = self.three_slots(node);
                let right = if right.is_empty() {
                    ".".to_string()
                } else {
                    format!(" {right}")
                };

                let main_str = wrap_nonempty(&main, "{ ", " }");
                let left_str = wrap_nonempty(&left, "\\left ", "");
                let right_str = format!("\\right {right}");
                format!("{left_str} {main_str} {right_str}")
            }
            TM_ROOT => {
                let main = self.slot(node, 0);
                let index = self.slot(node, 1);
                format!("\\sqrt[{index}] {{ {main} }}")
            }
            TM_FRACT => {
                let numerator = self.slot(node, 0);
                let denominator = self.slot(node, 1);
                format!("\\frac {{ {numerator} }} {{ {denominator} }}")
            }
            TM_UBAR => {
                let main = self.slot(node, 0);
                let main_str = if main.is_empty() {
                    String::new()
                } else {
                    format!(" {{\\underline{{ {main} }}}} ")
                };
                format!(" {main_str} ")
            }
            TM_ARROW => self.emit_arrow(node, tmpl.variation),
            TM_SUM => {
                let mut main = String::new();
                let mut lower = String::new();
                let mut upper = String::new();
                let mut operator = String::new();
                for (idx, child) in node.children.iter().enumerate() {
                    let latex = self.emit(child);
                    match idx {
                        0 => main = latex,
                        1 => lower = latex,
                        2 => upper = latex,
                        _ => operator = latex,
                    }
                }

                let main_str = wrap_nonempty(&main, "{ ", " }");
                let lower_str = wrap_nonempty(&lower, "\\limits_{ ", " }");
                let upper_str = wrap_nonempty(&upper, "^ ", "");
                format!("{operator} {lower_str} {upper_str} {main_str}")
            }
            TM_LIM => {
                let mut main = String::new();
                let mut lower = String::new();
                for (idx, child) in node.children.iter().enumerate() {
                    let latex = self.emit(child);
                    match idx {
                        0 => main = latex,
                        1 => lower = latex,
                        // The upper slot is discarded.
                        _ => {}
                    }
                }

                let main_str = wrap_nonempty(&main, "\\mathop { ", " }");
                let lower_str = wrap_nonempty(&lower, "\\limits_{ ", " }");
                format!("{main_str} {lower_str} ")
            }
            TM_SUP => {
                let sub = self.slot(node, 0);
                let sup = self.slot(node, 1);
                let mut buf = format!(" ^ {{ {sup} }} ");
                if !sub.is_empty() {
                    buf.push_str(&format!(" {{ {sub} }} "));
                }
                buf
            }
            TM_SUB | TM_SUBSUP => {
                let sub = self.slot(node, 0);
                let sup = self.slot(node, 1);
                let sub_str = wrap_nonempty(&sub, "_{ ", " }");
                let sup_str = wrap_nonempty(&sup, "^{ ", " }");
                format!("{sub_str}  {sup_str}")
            }
            TM_VEC => {
                let main = self.slot(node, 0);
                let main_str = wrap_nonempty(&main, "{ ", " }");

                let mut over = String::from("\\overset\\");
                for (bit, token) in [
                    (TV_VE_LEFT, "left"),
                    (TV_VE_RIGHT, "right"),
                    (TV_VE_UNDER, "under"),
                    (TV_VE_HARPOON, "harpoonup"),
                ] {
                    if tmpl.variation & bit != 0 {
                        over.push_str(token);
                    }
                }
                // Anything below the harpoon bit is an arrow.
                if tmpl.variation < 8 {
                    over.push_str("arrow");
                }
                format!("{over} {main_str}")
            }
            TM_HAT => {
                let main = self.slot(node, 0);
                let top = self.slot(node, 1);
                let main_str = wrap_nonempty(&main, "{ ", " }");
                let top_str = wrap_nonempty(&top, " ", " ");
                format!("{top_str} {main_str}")
            }
            TM_ARC => {
                let main = self.slot(node, 0);
                let top = self.slot(node, 1);
                let main_str = wrap_nonempty(&main, "{ ", " }");
                let top_str = wrap_nonempty(&top, "\\overset ", "");
                format!("{top_str} {main_str}")
            }
            selector => {
                self.warn(format!(
                    "template selector {selector} (variation {:#06x}) not implemented",
                    tmpl.variation
                ));
                self.concat_children(node)
            }
        }
    }

    fn emit_arrow(&mut self, node: &AstNode, variation: u16) -> String {
        let top = self.slot(node, 0);
        let bottom = self.slot(node, 1);
        let top_str = wrap_nonempty(&top, "{\\mathrm{ ", " }}");
        let bottom_str = wrap_nonempty(&bottom, "[\\mathrm{ ", " }]");

        // Extensible arrow command: direction bits append to "\x...". The
        // double/harpoon styles have no extensible LaTeX counterpart.
        let mut single = true;
        let mut command = String::from("\\x");
        for bit in [
            TV_AR_DOUBLE,
            TV_AR_HARPOON,
            TV_AR_TOP,
            TV_AR_BOTTOM,
            TV_AR_LEFT,
            TV_AR_RIGHT,
        ] {
            if variation & bit == 0 {
                continue;
            }
            match bit {
                TV_AR_DOUBLE | TV_AR_HARPOON => single = false,
                TV_AR_LEFT => {
                    if single {
                        command.push_str("leftarrow");
                    } else {
                        self.warn("double/harpoon left arrow not implemented".to_string());
                    }
                }
                TV_AR_RIGHT => {
                    if single {
                        command.push_str("rightarrow");
                    } else {
                        self.warn("double/harpoon right arrow not implemented".to_string());
                    }
                }
                _ => {}
            }
        }

        format!("{command} {bottom_str} {top_str}")
    }

    fn warn(&mut self, message: String) {
        log::warn!("{message}");
        self.diagnostics.push(message);
    }
}

fn wrap_nonempty(content: &str, prefix: &str, suffix: &str) -> String {
    if content.is_empty() {
        String::new()
    } else {
        format!("{prefix}{content}{suffix}")
    }
}
