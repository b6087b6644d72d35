use crate::charclass::{CharClass, VS16, ZWJ};
use crate::fsm::{Fsm, NodeIdx};
use crate::registry::{CustomScheme, TokenPlugin};
use crate::tlds;
use crate::token::{Groups, Token, TokenTag};

const PUNCTUATION: &[(char, TokenTag)] = &[
    ('\'', TokenTag::Apostrophe),
    ('{', TokenTag::OpenBrace),
    ('}', TokenTag::CloseBrace),
    ('[', TokenTag::OpenBracket),
    (']', TokenTag::CloseBracket),
    ('(', TokenTag::OpenParen),
    (')', TokenTag::CloseParen),
    ('<', TokenTag::OpenAngle),
    ('>', TokenTag::CloseAngle),
    ('\u{FF08}', TokenTag::FullwidthLeftParen),
    ('\u{FF09}', TokenTag::FullwidthRightParen),
    ('\u{300C}', TokenTag::LeftCornerBracket),
    ('\u{300D}', TokenTag::RightCornerBracket),
    ('\u{300E}', TokenTag::LeftWhiteCornerBracket),
    ('\u{300F}', TokenTag::RightWhiteCornerBracket),
    ('\u{FF1C}', TokenTag::FullwidthLessThan),
    ('\u{FF1E}', TokenTag::FullwidthGreaterThan),
    ('&', TokenTag::Ampersand),
    ('*', TokenTag::Asterisk),
    ('@', TokenTag::At),
    ('`', TokenTag::Backtick),
    ('^', TokenTag::Caret),
    (':', TokenTag::Colon),
    (',', TokenTag::Comma),
    ('$', TokenTag::Dollar),
    ('.', TokenTag::Dot),
    ('=', TokenTag::Equals),
    ('!', TokenTag::Exclamation),
    ('-', TokenTag::Hyphen),
    ('%', TokenTag::Percent),
    ('|', TokenTag::Pipe),
    ('+', TokenTag::Plus),
    ('#', TokenTag::Pound),
    ('?', TokenTag::Query),
    ('"', TokenTag::Quote),
    ('/', TokenTag::Slash),
    (';', TokenTag::Semi),
    ('~', TokenTag::Tilde),
    ('_', TokenTag::Underscore),
    ('\\', TokenTag::Backslash),
    ('\u{30FB}', TokenTag::FullwidthMiddleDot),
];

// Mutable view of the character FSM handed to token plugins before the
// machine is frozen.
pub struct ScannerBuilder {
    fsm: Fsm<char, TokenTag>,
    word: NodeIdx,
    asciinumeric: NodeIdx,
    alphanumeric: NodeIdx,
    uword: NodeIdx,
    dead: NodeIdx,
}

impl ScannerBuilder {
    fn base() -> ScannerBuilder {
        let mut fsm: Fsm<char, TokenTag> = Fsm::new();
        let start = fsm.start();

        let accepting = |fsm: &mut Fsm<char, TokenTag>, tag: TokenTag| {
            let n = fsm.node(None);
            fsm.set_accepting(n, tag, tag.base_groups());
            n
        };

        let word = accepting(&mut fsm, TokenTag::Word);
        let num = accepting(&mut fsm, TokenTag::Num);
        let asciinumeric = accepting(&mut fsm, TokenTag::AsciiNumeric);
        let alphanumeric = accepting(&mut fsm, TokenTag::AlphaNumeric);
        let uword = accepting(&mut fsm, TokenTag::Uword);
        let dead = fsm.node(None);

        fsm.add_class(start, CharClass::AsciiLetter, Some(word));
        fsm.add_class(start, CharClass::Digit, Some(num));
        fsm.add_class(start, CharClass::Letter, Some(uword));

        fsm.add_class(word, CharClass::AsciiLetter, Some(word));
        fsm.add_class(word, CharClass::Digit, Some(asciinumeric));

        fsm.add_class(num, CharClass::Digit, Some(num));
        fsm.add_class(num, CharClass::AsciiLetter, Some(asciinumeric));
        fsm.add_class(num, CharClass::Letter, Some(alphanumeric));

        fsm.add_class(asciinumeric, CharClass::AsciiLetter, Some(asciinumeric));
        fsm.add_class(asciinumeric, CharClass::Digit, Some(asciinumeric));
        fsm.add_class(asciinumeric, CharClass::Letter, Some(alphanumeric));

        // An ASCII letter does not extend a Unicode word; the dead edge
        // forces a rollback so "é" and "a" stay separate tokens.
        fsm.add_class(uword, CharClass::AsciiLetter, Some(dead));
        fsm.add_class(uword, CharClass::Letter, Some(uword));
        fsm.add_class(uword, CharClass::Digit, Some(alphanumeric));

        fsm.add_class(alphanumeric, CharClass::Letter, Some(alphanumeric));
        fsm.add_class(alphanumeric, CharClass::Digit, Some(alphanumeric));

        // CR alone is plain whitespace; CR+LF folds into one newline.
        let ws = accepting(&mut fsm, TokenTag::Ws);
        let nl = accepting(&mut fsm, TokenTag::Nl);
        let cr = accepting(&mut fsm, TokenTag::Ws);
        fsm.add_class(start, CharClass::Space, Some(ws));
        fsm.add_class(ws, CharClass::Space, Some(ws));
        fsm.add_literal(start, '\n', Some(nl));
        fsm.add_literal(start, '\r', Some(cr));
        fsm.add_literal(cr, '\n', Some(nl));

        // A joiner must be followed by another pictograph or the run
        // rolls back before it.
        let emoji = accepting(&mut fsm, TokenTag::Emoji);
        let joiner = fsm.node(None);
        fsm.add_class(start, CharClass::Emoji, Some(emoji));
        fsm.add_class(emoji, CharClass::Emoji, Some(emoji));
        fsm.add_literal(emoji, VS16, Some(emoji));
        fsm.add_literal(emoji, ZWJ, Some(joiner));
        fsm.add_class(joiner, CharClass::Emoji, Some(emoji));

        for &(ch, tag) in PUNCTUATION {
            let n = accepting(&mut fsm, tag);
            fsm.add_literal(start, ch, Some(n));
        }

        // Any code point nothing else claims becomes a symbol token.
        let sym = accepting(&mut fsm, TokenTag::Sym);
        fsm.set_default(start, sym);

        ScannerBuilder {
            fsm,
            word,
            asciinumeric,
            alphanumeric,
            uword,
            dead,
        }
    }

    fn install_keywords(&mut self, customs: &[CustomScheme]) {
        let word_side = [
            (CharClass::AsciiLetter, self.word),
            (CharClass::Digit, self.asciinumeric),
        ];
        let uword_side = [
            (CharClass::AsciiLetter, self.dead),
            (CharClass::Letter, self.uword),
            (CharClass::Digit, self.alphanumeric),
        ];
        let word_default = (TokenTag::Word, TokenTag::Word.base_groups());
        let uword_default = (TokenTag::Uword, TokenTag::Uword.base_groups());
        let start = self.fsm.start();

        for scheme in ["file", "mailto"] {
            let chars: Vec<char> = scheme.chars().collect();
            self.fsm.add_chain(
                start,
                &chars,
                TokenTag::Scheme,
                TokenTag::Scheme.base_groups(),
                |_| Some(word_default),
                &word_side,
            );
        }
        for scheme in ["ftp", "ftps", "http", "https"] {
            let chars: Vec<char> = scheme.chars().collect();
            self.fsm.add_chain(
                start,
                &chars,
                TokenTag::SlashScheme,
                TokenTag::SlashScheme.base_groups(),
                |_| Some(word_default),
                &word_side,
            );
        }
        let chars: Vec<char> = "localhost".chars().collect();
        self.fsm.add_chain(
            start,
            &chars,
            TokenTag::Localhost,
            TokenTag::Localhost.base_groups(),
            |_| Some(word_default),
            &word_side,
        );

        for tld in tlds::decode(tlds::ENCODED_TLDS) {
            let chars: Vec<char> = tld.chars().collect();
            self.fsm.add_chain(
                start,
                &chars,
                TokenTag::Tld,
                TokenTag::Tld.base_groups(),
                |_| Some(word_default),
                &word_side,
            );
        }
        for utld in tlds::decode(tlds::ENCODED_UTLDS) {
            let chars: Vec<char> = utld.chars().collect();
            self.fsm.add_chain(
                start,
                &chars,
                TokenTag::Utld,
                TokenTag::Utld.base_groups(),
                |_| Some(uword_default),
                &uword_side,
            );
        }

        // Custom schemes go last so they win shared trie nodes; the
        // registry keeps them sorted so prefix collapse is deterministic.
        for (idx, scheme) in customs.iter().enumerate() {
            self.install_custom(idx as u16, scheme);
        }
    }

    // Once a custom scheme wanders off the plain letter/digit shape
    // (hyphens), its nodes stop accepting as words and lose the run
    // extension edges, so partial matches roll back cleanly.
    fn install_custom(&mut self, idx: u16, scheme: &CustomScheme) {
        let chars: Vec<char> = scheme.name.chars().collect();
        let mut cur = self.fsm.start();
        for (i, &ch) in chars.iter().enumerate() {
            let is_final = i + 1 == chars.len();
            let next = match self.fsm.literal_target(cur, ch) {
                Some(existing) => existing,
                None => {
                    let fresh = self.fsm.add_literal(cur, ch, None);
                    let prefix = &chars[..i + 1];
                    if prefix.iter().all(|c| c.is_ascii_alphabetic()) {
                        if !is_final {
                            self.fsm.set_accepting(
                                fresh,
                                TokenTag::Word,
                                TokenTag::Word.base_groups(),
                            );
                        }
                        self.fsm.add_class(fresh, CharClass::AsciiLetter, Some(self.word));
                        self.fsm.add_class(fresh, CharClass::Digit, Some(self.asciinumeric));
                    } else if prefix.iter().all(|c| c.is_ascii_alphanumeric()) {
                        if !is_final {
                            self.fsm.set_accepting(
                                fresh,
                                TokenTag::AsciiNumeric,
                                TokenTag::AsciiNumeric.base_groups(),
                            );
                        }
                        self.fsm.add_class(fresh, CharClass::AsciiLetter, Some(self.asciinumeric));
                        self.fsm.add_class(fresh, CharClass::Digit, Some(self.asciinumeric));
                    }
                    fresh
                }
            };
            if is_final {
                self.fsm
                    .set_accepting(next, TokenTag::CustomScheme(idx), scheme.groups());
            }
            cur = next;
        }
    }

    pub fn start(&self) -> NodeIdx {
        self.fsm.start()
    }

    pub fn node(&mut self) -> NodeIdx {
        self.fsm.node(None)
    }

    pub fn add_literal(&mut self, src: NodeIdx, ch: char, target: Option<NodeIdx>) -> NodeIdx {
        self.fsm.add_literal(src, ch, target)
    }

    pub fn add_class(
        &mut self,
        src: NodeIdx,
        class: CharClass,
        target: Option<NodeIdx>,
    ) -> NodeIdx {
        self.fsm.add_class(src, class, target)
    }

    pub fn add_keyword(&mut self, keyword: &str, tag: TokenTag) {
        let chars: Vec<char> = keyword.chars().collect();
        let side = [
            (CharClass::AsciiLetter, self.word),
            (CharClass::Digit, self.asciinumeric),
        ];
        let start = self.fsm.start();
        self.fsm.add_chain(
            start,
            &chars,
            tag,
            tag.base_groups(),
            |_| Some((TokenTag::Word, TokenTag::Word.base_groups())),
            &side,
        );
    }

    pub fn set_accepting(&mut self, node: NodeIdx, tag: TokenTag) {
        self.fsm.set_accepting(node, tag, tag.base_groups());
    }
}

pub struct Scanner {
    fsm: Fsm<char, TokenTag>,
}

impl Scanner {
    pub(crate) fn build(customs: &[CustomScheme], plugins: &[TokenPlugin]) -> Scanner {
        let mut builder = ScannerBuilder::base();
        builder.install_keywords(customs);
        for plugin in plugins {
            (plugin.install)(&mut builder);
        }
        Scanner { fsm: builder.fsm }
    }

    // Greedy longest match with rollback. The machine is
    // case-insensitive: it walks an ASCII-lowercased working copy while
    // token spans index the original string (ASCII lowercasing preserves
    // every byte offset). Spans are contiguous and cover every byte.
    pub fn scan(&self, input: &str) -> Vec<Token> {
        let folded = input.to_ascii_lowercase();
        let chars: Vec<(usize, char)> = folded.char_indices().collect();
        let mut out = Vec::with_capacity(8 + chars.len() / 4);
        let mut i = 0;
        while i < chars.len() {
            let mut node = self.fsm.start();
            let mut j = i;
            let mut last: Option<(usize, NodeIdx)> = None;
            while j < chars.len() {
                match self.fsm.step(node, chars[j].1) {
                    Some(next) => {
                        node = next;
                        j += 1;
                        if self.fsm.accepts(node).is_some() {
                            last = Some((j, node));
                        }
                    }
                    None => break,
                }
            }
            // The start node's catch-all makes one-symbol progress
            // certain; the fallback keeps the partition total regardless.
            let (end, tag, groups) = match last {
                Some((end, acc)) => {
                    let tag = *self.fsm.accepts(acc).unwrap_or(&TokenTag::Sym);
                    (end, tag, self.fsm.groups(acc))
                }
                None => (i + 1, TokenTag::Sym, Groups::NONE),
            };
            let start_byte = chars[i].0;
            let end_byte = if end < chars.len() {
                chars[end].0
            } else {
                folded.len()
            };
            out.push(Token {
                tag,
                groups,
                start: start_byte,
                end: end_byte,
            });
            i = end;
        }
        out
    }
}
