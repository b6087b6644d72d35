pub const ZWJ: char = '\u{200D}';
pub const VS16: char = '\u{FE0F}';
// Object replacement character; rich-text editors leave it behind in
// place of embedded objects, so it counts as whitespace.
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Digit,
    AsciiLetter,
    Letter,
    // Non-newline whitespace. Excludes \r, which gets its own literal
    // edge so CRLF can fold into one newline token.
    Space,
    Emoji,
}

impl CharClass {
    pub fn contains(self, c: char) -> bool {
        match self {
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::AsciiLetter => c.is_ascii_alphabetic(),
            CharClass::Letter => c.is_alphabetic(),
            CharClass::Space => {
                c == OBJECT_REPLACEMENT || (c.is_whitespace() && c != '\n' && c != '\r')
            }
            CharClass::Emoji => is_emoji(c),
        }
    }
}

// Pictographic ranges that start an emoji sequence. Symbols that only
// become emoji with a trailing VS16 (digits, '#', '*', letterlike
// symbols) stay out so they keep their punctuation/word roles.
const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x231A, 0x231B),
    (0x23E9, 0x23F3),
    (0x23F8, 0x23FA),
    (0x25FD, 0x25FE),
    (0x2600, 0x27BF),
    (0x2B05, 0x2B07),
    (0x2B1B, 0x2B1C),
    (0x2B50, 0x2B50),
    (0x2B55, 0x2B55),
    (0x1F004, 0x1F004),
    (0x1F0CF, 0x1F0CF),
    (0x1F1E6, 0x1F1FF), // regional indicators
    (0x1F300, 0x1F5FF),
    (0x1F600, 0x1F64F),
    (0x1F680, 0x1F6FF),
    (0x1F7E0, 0x1F7EB),
    (0x1F900, 0x1F9FF),
    (0x1FA70, 0x1FAFF),
];

pub fn is_emoji(c: char) -> bool {
    let cp = c as u32;
    if cp < 0x231A {
        return false;
    }
    EMOJI_RANGES
        .binary_search_by(|&(lo, hi)| {
            if cp < lo {
                std::cmp::Ordering::Greater
            } else if cp > hi {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}
