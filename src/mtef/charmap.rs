// Static character translation tables.
//
// This is data, not algorithm: MTCode codepoints map to LaTeX fragments via
// keys of the form "char/0x<4-hex-lower>", with a "/mathmode" suffix for the
// MT Extra and space typefaces. Plain ASCII letters and digits are absent on
// purpose so variables and numbers pass through as themselves. Generated from
// the MathType translator tables; keep entries sorted by codepoint.

/// MTCode → LaTeX lookup table (compile-time perfect hash).
static CHAR_TABLE: phf::Map<&'static str, &'static str> = phf::phf_map! {
    // Latin-1 operators and signs
    "char/0x00ac" => "\\neg ",
    "char/0x00b0" => "^\\circ ",
    "char/0x00b1" => "\\pm ",
    "char/0x00d7" => "\\times ",
    "char/0x00f7" => "\\div ",
    // Greek lowercase
    "char/0x03b1" => "\\alpha ",
    "char/0x03b2" => "\\beta ",
    "char/0x03b3" => "\\gamma ",
    "char/0x03b4" => "\\delta ",
    "char/0x03b5" => "\\epsilon ",
    "char/0x03b6" => "\\zeta ",
    "char/0x03b7" => "\\eta ",
    "char/0x03b8" => "\\theta ",
    "char/0x03b9" => "\\iota ",
    "char/0x03ba" => "\\kappa ",
    "char/0x03bb" => "\\lambda ",
    "char/0x03bc" => "\\mu ",
    "char/0x03bd" => "\\nu ",
    "char/0x03be" => "\\xi ",
    "char/0x03bf" => "o",
    "char/0x03c0" => "\\pi ",
    "char/0x03c1" => "\\rho ",
    "char/0x03c2" => "\\varsigma ",
    "char/0x03c3" => "\\sigma ",
    "char/0x03c4" => "\\tau ",
    "char/0x03c5" => "\\upsilon ",
    "char/0x03c6" => "\\phi ",
    "char/0x03c7" => "\\chi ",
    "char/0x03c8" => "\\psi ",
    "char/0x03c9" => "\\omega ",
    "char/0x03d1" => "\\vartheta ",
    "char/0x03d5" => "\\varphi ",
    "char/0x03d6" => "\\varpi ",
    "char/0x03f5" => "\\varepsilon ",
    // Greek uppercase (letters without a LaTeX command fall through to the
    // plain Latin capital)
    "char/0x0393" => "\\Gamma ",
    "char/0x0394" => "\\Delta ",
    "char/0x0398" => "\\Theta ",
    "char/0x039b" => "\\Lambda ",
    "char/0x039e" => "\\Xi ",
    "char/0x03a0" => "\\Pi ",
    "char/0x03a3" => "\\Sigma ",
    "char/0x03a5" => "\\Upsilon ",
    "char/0x03a6" => "\\Phi ",
    "char/0x03a8" => "\\Psi ",
    "char/0x03a9" => "\\Omega ",
    // Arrows
    "char/0x2190" => "\\leftarrow ",
    "char/0x2191" => "\\uparrow ",
    "char/0x2192" => "\\rightarrow ",
    "char/0x2193" => "\\downarrow ",
    "char/0x2194" => "\\leftrightarrow ",
    "char/0x21a6" => "\\mapsto ",
    "char/0x21d0" => "\\Leftarrow ",
    "char/0x21d2" => "\\Rightarrow ",
    "char/0x21d4" => "\\Leftrightarrow ",
    // Mathematical operators
    "char/0x2200" => "\\forall ",
    "char/0x2202" => "\\partial ",
    "char/0x2203" => "\\exists ",
    "char/0x2205" => "\\emptyset ",
    "char/0x2207" => "\\nabla ",
    "char/0x2208" => "\\in ",
    "char/0x2209" => "\\notin ",
    "char/0x220b" => "\\ni ",
    // Big operators: no trailing space, operator slots supply spacing
    "char/0x220f" => "\\prod",
    "char/0x2210" => "\\coprod",
    "char/0x2211" => "\\sum",
    "char/0x2213" => "\\mp ",
    "char/0x2217" => "\\ast ",
    "char/0x221a" => "\\surd ",
    "char/0x221d" => "\\propto ",
    "char/0x221e" => "\\infty ",
    "char/0x2220" => "\\angle ",
    "char/0x2227" => "\\wedge ",
    "char/0x2228" => "\\vee ",
    "char/0x2229" => "\\cap ",
    "char/0x222a" => "\\cup ",
    "char/0x222b" => "\\int",
    "char/0x222c" => "\\iint",
    "char/0x222d" => "\\iiint",
    "char/0x222e" => "\\oint",
    "char/0x2234" => "\\therefore ",
    "char/0x2235" => "\\because ",
    "char/0x223c" => "\\sim ",
    "char/0x2245" => "\\cong ",
    "char/0x2248" => "\\approx ",
    "char/0x2260" => "\\neq ",
    "char/0x2261" => "\\equiv ",
    "char/0x2264" => "\\leq ",
    "char/0x2265" => "\\geq ",
    "char/0x226a" => "\\ll ",
    "char/0x226b" => "\\gg ",
    "char/0x2282" => "\\subset ",
    "char/0x2283" => "\\supset ",
    "char/0x2286" => "\\subseteq ",
    "char/0x2287" => "\\supseteq ",
    "char/0x2295" => "\\oplus ",
    "char/0x2297" => "\\otimes ",
    "char/0x22a5" => "\\bot ",
    "char/0x22c2" => "\\bigcap",
    "char/0x22c3" => "\\bigcup",
    "char/0x22c5" => "\\cdot ",
    "char/0x2322" => "\\frown ",
    "char/0x2323" => "\\smile ",
    // MT Extra / symbol glyphs that only make sense in math mode
    "char/0x2026/mathmode" => "\\ldots ",
    "char/0x210f/mathmode" => "\\hbar ",
    "char/0x2113/mathmode" => "\\ell ",
    "char/0x2118/mathmode" => "\\wp ",
    "char/0x2130/mathmode" => "\\mathcal{E} ",
    "char/0x2132/mathmode" => "\\Finv ",
    "char/0x2234/mathmode" => "\\therefore ",
    "char/0x2235/mathmode" => "\\because ",
    "char/0x22ee/mathmode" => "\\vdots ",
    "char/0x22ef/mathmode" => "\\cdots ",
    "char/0x22f0/mathmode" => "\\iddots ",
    "char/0x22f1/mathmode" => "\\ddots ",
    // Explicit spaces
    "char/0x00a0/mathmode" => "~",
    "char/0x2004/mathmode" => "\\;",
    "char/0x2005/mathmode" => "\\:",
    "char/0x2009/mathmode" => "\\,",
    "char/0x200a/mathmode" => "\\,",
    "char/0x2003/mathmode" => "\\quad ",
};

/// ASCII characters that must be escaped in LaTeX output.
static ESCAPE_TABLE: phf::Map<char, &'static str> = phf::phf_map! {
    '{' => "\\{",
    '}' => "\\}",
    '%' => "\\%",
    '$' => "\\$",
    '#' => "\\#",
    '&' => "\\&",
    '_' => "\\_",
};

/// Look up a translation-table key ("char/0x03b1", "char/0x2009/mathmode").
pub fn lookup(key: &str) -> Option<&'static str> {
    CHAR_TABLE.get(key).copied()
}

/// Escape a raw character that is special to LaTeX.
pub fn escape(ch: char) -> Option<&'static str> {
    ESCAPE_TABLE.get(&ch).copied()
}
