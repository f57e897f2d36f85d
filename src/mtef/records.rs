// MTEF v5 record tags, option bits, and the decoded record type.
//
// Tag numbering follows the MTEF v5 storage layout: records 0..=19 are
// defined, anything >= 100 is a "future" record carrying its own length.

// Record tags
pub const END: u8 = 0;
pub const LINE: u8 = 1;
pub const CHAR: u8 = 2;
pub const TMPL: u8 = 3;
pub const PILE: u8 = 4;
pub const MATRIX: u8 = 5;
pub const EMBELL: u8 = 6;
pub const RULER: u8 = 7;
pub const FONT_STYLE_DEF: u8 = 8;
pub const SIZE: u8 = 9;
pub const FULL: u8 = 10;
pub const SUB: u8 = 11;
pub const SUB2: u8 = 12;
pub const SYM: u8 = 13;
pub const SUBSYM: u8 = 14;
pub const COLOR: u8 = 15;
pub const COLOR_DEF: u8 = 16;
pub const FONT_DEF: u8 = 17;
pub const EQN_PREFS: u8 = 18;
pub const ENCODING_DEF: u8 = 19;
pub const FUTURE: u8 = 100;

// Option bits shared by most records
pub const OPT_NUDGE: u8 = 0x08;

// Line options
pub const OPT_LINE_NULL: u8 = 0x01;
pub const OPT_LINE_RULER: u8 = 0x02;
pub const OPT_LINE_LSPACE: u8 = 0x04;

// Char options
pub const OPT_CHAR_EMBELL: u8 = 0x01;
pub const OPT_CHAR_FUNC_START: u8 = 0x02;
pub const OPT_CHAR_ENC_CHAR_8: u8 = 0x04;
pub const OPT_CHAR_ENC_CHAR_16: u8 = 0x10;
pub const OPT_CHAR_ENC_NO_MTCODE: u8 = 0x20;

// ColorDef options
pub const OPT_COLOR_CMYK: u8 = 0x01;
pub const OPT_COLOR_SPOT: u8 = 0x02;
pub const OPT_COLOR_NAME: u8 = 0x04;

// Typeface slots. A Char's `typeface` byte is 128 + one of these.
pub const FN_TEXT: u8 = 1;
pub const FN_FUNCTION: u8 = 2;
pub const FN_VARIABLE: u8 = 3;
pub const FN_LCGREEK: u8 = 4;
pub const FN_UCGREEK: u8 = 5;
pub const FN_SYMBOL: u8 = 6;
pub const FN_VECTOR: u8 = 7;
pub const FN_NUMBER: u8 = 8;
pub const FN_USER1: u8 = 9;
pub const FN_USER2: u8 = 10;
pub const FN_MTEXTRA: u8 = 11;
pub const FN_TEXT_FE: u8 = 12;
pub const FN_EXPAND: u8 = 22;
pub const FN_MARKER: u8 = 23;
pub const FN_SPACE: u8 = 24;

// Template selectors
pub const TM_ANGLE: u8 = 0;
pub const TM_PAREN: u8 = 1;
pub const TM_BRACE: u8 = 2;
pub const TM_BRACK: u8 = 3;
pub const TM_BAR: u8 = 4;
pub const TM_DBAR: u8 = 5;
pub const TM_FLOOR: u8 = 6;
pub const TM_CEILING: u8 = 7;
pub const TM_OBRACK: u8 = 8;
pub const TM_INTERVAL: u8 = 9;
pub const TM_ROOT: u8 = 10;
pub const TM_FRACT: u8 = 11;
pub const TM_UBAR: u8 = 12;
pub const TM_OBAR: u8 = 13;
pub const TM_ARROW: u8 = 14;
pub const TM_INTEG: u8 = 15;
pub const TM_SUM: u8 = 16;
pub const TM_PROD: u8 = 17;
pub const TM_COPROD: u8 = 18;
pub const TM_UNION: u8 = 19;
pub const TM_INTER: u8 = 20;
pub const TM_INTOP: u8 = 21;
pub const TM_SUMOP: u8 = 22;
pub const TM_LIM: u8 = 23;
pub const TM_HBRACE: u8 = 24;
pub const TM_HBRACK: u8 = 25;
pub const TM_LDIV: u8 = 26;
pub const TM_SUB: u8 = 27;
pub const TM_SUP: u8 = 28;
pub const TM_SUBSUP: u8 = 29;
pub const TM_DIRAC: u8 = 30;
pub const TM_VEC: u8 = 31;
pub const TM_TILDE: u8 = 32;
pub const TM_HAT: u8 = 33;
pub const TM_ARC: u8 = 34;
pub const TM_JSTATUS: u8 = 35;
pub const TM_STRIKE: u8 = 36;
pub const TM_BOX: u8 = 37;

// Arrow template variation bits
pub const TV_AR_DOUBLE: u16 = 0x0001;
pub const TV_AR_HARPOON: u16 = 0x0002;
pub const TV_AR_TOP: u16 = 0x0004;
pub const TV_AR_BOTTOM: u16 = 0x0008;
pub const TV_AR_LEFT: u16 = 0x0010;
pub const TV_AR_RIGHT: u16 = 0x0020;

// Vector template variation bits
pub const TV_VE_LEFT: u16 = 0x0001;
pub const TV_VE_RIGHT: u16 = 0x0002;
pub const TV_VE_UNDER: u16 = 0x0004;
pub const TV_VE_HARPOON: u16 = 0x0008;

// Embellishment kinds
pub const EMB_1DOT: u8 = 2;
pub const EMB_2DOT: u8 = 3;
pub const EMB_3DOT: u8 = 4;
pub const EMB_1PRIME: u8 = 5;
pub const EMB_2PRIME: u8 = 6;
pub const EMB_BPRIME: u8 = 7;
pub const EMB_TILDE: u8 = 8;
pub const EMB_HAT: u8 = 9;
pub const EMB_NOT: u8 = 10;
pub const EMB_RARROW: u8 = 11;
pub const EMB_LARROW: u8 = 12;
pub const EMB_BARROW: u8 = 13;
pub const EMB_R1ARROW: u8 = 14;
pub const EMB_L1ARROW: u8 = 15;
pub const EMB_MBAR: u8 = 16;
pub const EMB_OBAR: u8 = 17;
pub const EMB_3PRIME: u8 = 18;

/// Small positional offset attached to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nudge {
    pub x: i16,
    pub y: i16,
}

/// A single slot of content. A *null* line is an empty slot marker and does
/// not open a new slot in the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub nudge: Option<Nudge>,
    pub line_space: Option<u8>,
    pub null: bool,
}

/// One glyph. `typeface` selects the font family bucket (128 + `FN_*`),
/// `mtcode` is the MathType-internal codepoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Char {
    pub nudge: Option<Nudge>,
    pub typeface: u8,
    pub mtcode: Option<u16>,
    /// 8-bit font position, present with `OPT_CHAR_ENC_CHAR_8`
    pub font_pos8: Option<u8>,
    /// 16-bit font position, present with `OPT_CHAR_ENC_CHAR_16`
    pub font_pos16: Option<u16>,
}

/// A template (fraction, radical, fence, big operator, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tmpl {
    pub nudge: Option<Nudge>,
    pub selector: u8,
    pub variation: u16,
    /// Template-specific options byte, distinct from the record options
    pub options: u8,
}

/// Vertical stack of lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pile {
    pub nudge: Option<Nudge>,
    pub halign: u8,
    pub valign: u8,
}

/// 2-D grid of slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    pub nudge: Option<Nudge>,
    pub valign: u8,
    pub h_just: u8,
    pub v_just: u8,
    pub rows: u8,
    pub cols: u8,
}

/// Accent or decoration attached to the preceding character.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embell {
    pub nudge: Option<Nudge>,
    pub kind: u8,
}

/// Font definition; retained in the record list but never consulted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontDef {
    pub enc_index: u8,
    pub name: String,
}

/// Equation preferences: user sizes/spaces (as dimension strings like
/// "12.5pt") and style entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EqnPrefs {
    pub sizes: Vec<String>,
    pub spaces: Vec<String>,
    pub styles: Vec<u8>,
}

/// A decoded MTEF record.
///
/// Definition records read purely for stream alignment (font style defs,
/// colour defs, colour indexes) have no variant; the decoder consumes them
/// without emitting.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Slot terminator
    End,
    Line(Line),
    Char(Char),
    Tmpl(Tmpl),
    Pile(Pile),
    Matrix(Matrix),
    Embell(Embell),
    FontDef(FontDef),
    EncodingDef(String),
    EqnPrefs(EqnPrefs),
    // Size-hint singletons
    Full,
    Sub,
    Sub2,
    Sym,
    SubSym,
}

impl Record {
    /// An empty, non-null line (the synthetic padding record emitted after
    /// a matrix).
    pub fn empty_line() -> Record {
        Record::Line(Line::default())
    }
}
