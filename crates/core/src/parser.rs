use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;

use crate::fsm::{Alphabet, Fsm, NodeIdx};
use crate::options::Options;
use crate::registry::{CustomScheme, Plugin};
use crate::token::{Groups, Token, TokenGroup, TokenTag};

// Symbol fed to the token FSM: the tag is the literal key, the group
// flags answer class edges.
#[derive(Debug, Clone, Copy)]
pub struct TokenKey {
    pub tag: TokenTag,
    pub groups: Groups,
}

impl Alphabet for TokenKey {
    type Lit = TokenTag;
    type Class = TokenGroup;

    #[inline]
    fn literal(self) -> TokenTag {
        self.tag
    }

    #[inline]
    fn is(self, class: TokenGroup) -> bool {
        match class {
            TokenGroup::NonSpace => !self.groups.intersects(Groups::WHITESPACE),
            other => self.groups.intersects(other.mask()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    Url,
    Email,
    Text,
    Ws,
    Nl,
    // custom-scheme URLs and plugin entities, named by scheme or plugin
    Custom(String),
}

impl EntityKind {
    pub fn is_link(&self) -> bool {
        matches!(self, EntityKind::Url | EntityKind::Email | EntityKind::Custom(_))
    }

    pub fn name(&self) -> &str {
        match self {
            EntityKind::Url => "url",
            EntityKind::Email => "email",
            EntityKind::Text => "text",
            EntityKind::Ws => "ws",
            EntityKind::Nl => "nl",
            EntityKind::Custom(name) => name,
        }
    }
}

// Offsets are byte offsets into the original input; concatenating value
// over a whole tokenize() result reproduces the input exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub value: String,
    pub href: Option<String>,
    pub start: usize,
    pub end: usize,
    pub tokens: Vec<Token>,
}

impl Entity {
    pub fn is_link(&self) -> bool {
        self.kind.is_link()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub is_link: bool,
    pub href: String,
    pub start: usize,
    pub end: usize,
}

impl Match {
    pub(crate) fn from_entity(entity: &Entity) -> Option<Match> {
        if !entity.is_link() {
            return None;
        }
        let href = entity.href.clone()?;
        Some(Match {
            kind: entity.kind.name().to_string(),
            value: entity.value.clone(),
            is_link: true,
            href,
            start: entity.start,
            end: entity.end,
        })
    }
}

// A closing bracket is consumed only while its family counter is
// positive, and no entity may end inside an open bracket.
const BRACKETS: &[(TokenTag, TokenTag)] = &[
    (TokenTag::OpenParen, TokenTag::CloseParen),
    (TokenTag::OpenBracket, TokenTag::CloseBracket),
    (TokenTag::OpenBrace, TokenTag::CloseBrace),
    (TokenTag::OpenAngle, TokenTag::CloseAngle),
    (TokenTag::FullwidthLeftParen, TokenTag::FullwidthRightParen),
    (TokenTag::LeftCornerBracket, TokenTag::RightCornerBracket),
    (TokenTag::LeftWhiteCornerBracket, TokenTag::RightWhiteCornerBracket),
    (TokenTag::FullwidthLessThan, TokenTag::FullwidthGreaterThan),
];

fn opener_family(tag: TokenTag) -> Option<usize> {
    BRACKETS.iter().position(|&(open, _)| open == tag)
}

fn closer_family(tag: TokenTag) -> Option<usize> {
    BRACKETS.iter().position(|&(_, close)| close == tag)
}

// Punctuation that commonly trails a link in prose.
fn is_trim_tag(tag: TokenTag) -> bool {
    matches!(
        tag,
        TokenTag::Dot
            | TokenTag::Comma
            | TokenTag::Exclamation
            | TokenTag::Query
            | TokenTag::Semi
            | TokenTag::Colon
            | TokenTag::Quote
            | TokenTag::Apostrophe
    )
}

pub struct ParserBuilder {
    fsm: Fsm<TokenKey, EntityKind>,
}

impl ParserBuilder {
    pub fn start(&self) -> NodeIdx {
        self.fsm.start()
    }

    pub fn node(&mut self) -> NodeIdx {
        self.fsm.node(None)
    }

    pub fn add_literal(&mut self, src: NodeIdx, tag: TokenTag, target: Option<NodeIdx>) -> NodeIdx {
        self.fsm.add_literal(src, tag, target)
    }

    pub fn add_class(
        &mut self,
        src: NodeIdx,
        group: TokenGroup,
        target: Option<NodeIdx>,
    ) -> NodeIdx {
        self.fsm.add_class(src, group, target)
    }

    pub fn set_accepting(&mut self, node: NodeIdx, kind: EntityKind) {
        self.fsm.set_accepting(node, kind, Groups::NONE);
    }
}

pub struct Parser {
    fsm: Fsm<TokenKey, EntityKind>,
    schemes: Vec<String>,
}

impl Parser {
    pub(crate) fn build(customs: &[CustomScheme], plugins: &[Plugin]) -> Parser {
        let mut builder = ParserBuilder { fsm: Fsm::new() };
        base_grammar(&mut builder.fsm);
        for plugin in plugins {
            (plugin.install)(&mut builder);
        }
        Parser {
            fsm: builder.fsm,
            schemes: customs.iter().map(|c| c.name.clone()).collect(),
        }
    }

    pub(crate) fn parse(&self, input: &str, tokens: &[Token], options: &Options) -> Vec<Entity> {
        let mut raw: Vec<(EntityKind, usize, usize)> = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            match self.candidate(tokens, i) {
                Some((end, kind)) => {
                    raw.push((kind, i, end));
                    i = end;
                }
                None => {
                    raw.push((EntityKind::Text, i, i + 1));
                    i += 1;
                }
            }
        }
        self.finish(input, tokens, raw, options)
    }

    // Greedy longest match from i: walk while transitions exist, remember
    // the last acceptance reached with all brackets closed, trim trailing
    // punctuation, and retract to the longest surviving acceptance.
    fn candidate(&self, tokens: &[Token], i: usize) -> Option<(usize, EntityKind)> {
        let mut node = self.fsm.start();
        let mut balance = [0u32; BRACKETS.len()];
        let mut accepted: Vec<Option<EntityKind>> = Vec::new();
        let mut best: Option<usize> = None;
        let mut j = i;
        while j < tokens.len() {
            let tok = &tokens[j];
            if let Some(family) = closer_family(tok.tag) {
                if balance[family] == 0 {
                    break;
                }
            }
            let key = TokenKey {
                tag: tok.tag,
                groups: tok.groups,
            };
            let Some(next) = self.fsm.step(node, key) else {
                break;
            };
            if let Some(family) = opener_family(tok.tag) {
                balance[family] += 1;
            } else if let Some(family) = closer_family(tok.tag) {
                balance[family] -= 1;
            }
            node = next;
            j += 1;
            let acc = if balance.iter().all(|&b| b == 0) {
                self.fsm.accepts(node).cloned()
            } else {
                None
            };
            if acc.is_some() {
                best = Some(j - i);
            }
            accepted.push(acc);
        }

        let mut len = best?;
        loop {
            let before = len;
            while len > 0 && self.trimmable(tokens, i, len) {
                len -= 1;
            }
            while len > 0 && accepted[len - 1].is_none() {
                len -= 1;
            }
            if len == before {
                break;
            }
        }
        if len == 0 {
            return None;
        }
        let kind = accepted[len - 1].clone()?;
        Some((i + len, kind))
    }

    fn trimmable(&self, tokens: &[Token], start: usize, len: usize) -> bool {
        let tag = tokens[start + len - 1].tag;
        if is_trim_tag(tag) {
            return true;
        }
        if let Some(family) = closer_family(tag) {
            let (open, close) = BRACKETS[family];
            let span = &tokens[start..start + len];
            let opens = span.iter().filter(|t| t.tag == open).count();
            let closes = span.iter().filter(|t| t.tag == close).count();
            return closes > opens;
        }
        false
    }

    fn finish(
        &self,
        input: &str,
        tokens: &[Token],
        raw: Vec<(EntityKind, usize, usize)>,
        options: &Options,
    ) -> Vec<Entity> {
        let mut entities: Vec<Entity> = Vec::with_capacity(raw.len());
        for (kind, ts, te) in raw {
            let toks = &tokens[ts..te];
            let start = toks[0].start;
            let end = toks[toks.len() - 1].end;
            let value = input[start..end].to_string();
            let mut kind = kind;

            // An entity "has a scheme" only when its first token is a
            // scheme word followed by its colon; "file.com" starts with a
            // scheme token but is an ordinary schemeless domain.
            let has_scheme = matches!(
                toks[0].tag,
                TokenTag::Scheme | TokenTag::SlashScheme | TokenTag::CustomScheme(_)
            ) && toks.len() > 1
                && toks[1].tag == TokenTag::Colon;

            if kind == EntityKind::Url && has_scheme {
                match toks[0].tag {
                    TokenTag::CustomScheme(idx) => {
                        kind = EntityKind::Custom(self.schemes[idx as usize].clone());
                    }
                    TokenTag::Scheme => {
                        let scheme = toks[0].value(input).to_ascii_lowercase();
                        if scheme == "mailto" && options.detect_email && value.contains('@') {
                            kind = EntityKind::Email;
                        }
                    }
                    _ => {}
                }
            }
            if kind == EntityKind::Email && !options.detect_email {
                kind = EntityKind::Text;
            }

            let scheme_len = if has_scheme {
                toks[0].end - toks[0].start
            } else {
                0
            };
            let mut href = if kind.is_link() {
                Some(build_href(&kind, &value, scheme_len, options))
            } else {
                None
            };

            if kind.is_link() {
                if let Some(validate) = &options.validate {
                    let name = kind.name().to_string();
                    let v = value.clone();
                    let ok =
                        catch_unwind(AssertUnwindSafe(|| validate(&name, &v))).unwrap_or(false);
                    if !ok {
                        kind = EntityKind::Text;
                        href = None;
                    }
                }
            }

            entities.push(Entity {
                kind,
                value,
                href,
                start,
                end,
                tokens: tokens[ts..te].to_vec(),
            });
        }
        merge_text(entities, input)
    }
}

fn build_href(kind: &EntityKind, value: &str, scheme_len: usize, options: &Options) -> String {
    if scheme_len > 0 {
        return scheme_lowered(value, scheme_len);
    }
    match kind {
        EntityKind::Email => format!("mailto:{}", value),
        // Plugin entities (hashtags, mentions, ...) link to their own
        // value; only URLs get the default protocol prepended.
        EntityKind::Custom(_) => value.to_string(),
        _ => format!("{}://{}", options.default_protocol.to_ascii_lowercase(), value),
    }
}

fn scheme_lowered(value: &str, scheme_len: usize) -> String {
    let (scheme, rest) = value.split_at(scheme_len);
    format!("{}{}", scheme.to_ascii_lowercase(), rest)
}

// Consecutive inert text entities collapse into single runs; whitespace
// and newline entities stay separate so renderers can honor nl2br.
fn merge_text(entities: Vec<Entity>, input: &str) -> Vec<Entity> {
    let mut out: Vec<Entity> = Vec::with_capacity(entities.len());
    for entity in entities {
        if entity.kind == EntityKind::Text {
            if let Some(last) = out.last_mut() {
                if last.kind == EntityKind::Text && last.end == entity.start {
                    last.end = entity.end;
                    last.value = input[last.start..last.end].to_string();
                    last.tokens.extend(entity.tokens);
                    continue;
                }
            }
        }
        out.push(entity);
    }
    out
}

fn base_grammar(fsm: &mut Fsm<TokenKey, EntityKind>) {
    let start = fsm.start();

    // Lone whitespace and newline tokens are entities of their own.
    let ws = fsm.node(Some(EntityKind::Ws));
    let nl = fsm.node(Some(EntityKind::Nl));
    fsm.add_literal(start, TokenTag::Ws, Some(ws));
    fsm.add_literal(start, TokenTag::Nl, Some(nl));

    // Schemeless domain accumulation.
    let d_seg = fsm.node(None); // inside a segment
    let d_dot = fsm.node(None); // just consumed a dot
    let d_hyp = fsm.node(None); // just consumed a hyphen
    let d_acc = fsm.node(Some(EntityKind::Url)); // segment ended on TLD/UTLD
    let lh = fsm.node(Some(EntityKind::Url)); // leading `localhost`

    // Ports and URL bodies.
    let port0 = fsm.node(None);
    let port_acc = fsm.node(Some(EntityKind::Url));
    let path = fsm.node(Some(EntityKind::Url));

    // Bare scheme (`file:`, `mailto:`, customs without slashes): freeform
    // body after the colon.
    let s1 = fsm.node(None);
    let s_colon = fsm.node(None);
    let s_body = fsm.node(Some(EntityKind::Url));

    // Slash scheme (`http://`): authority required after the slashes.
    let ss1 = fsm.node(None);
    let ss_colon = fsm.node(None);
    let ss_slash1 = fsm.node(None);
    let ss_slash2 = fsm.node(None);
    let host = fsm.node(Some(EntityKind::Url));
    let host_dot = fsm.node(None);
    let host_hyp = fsm.node(None);
    let host_at = fsm.node(None); // userinfo separator
    let sport0 = fsm.node(None);
    let sport_acc = fsm.node(Some(EntityKind::Url));

    // Email: local part, at-sign, TLD-terminated domain.
    let lp_sep = fsm.node(None); // after . - + _ in the local part
    let lp_seg = fsm.node(None);
    let em_at = fsm.node(None);
    let em_seg = fsm.node(None);
    let em_dot = fsm.node(None);
    let em_hyp = fsm.node(None);
    let em_acc = fsm.node(Some(EntityKind::Email));

    // Entry edges. Scheme classes outrank the generic domain class; the
    // localhost literal outranks them all.
    fsm.add_literal(start, TokenTag::Localhost, Some(lh));
    fsm.add_class(start, TokenGroup::Scheme, Some(s1));
    fsm.add_class(start, TokenGroup::SlashScheme, Some(ss1));
    fsm.add_class(start, TokenGroup::Domain, Some(d_seg));

    // Everything that behaves like the inside of a schemeless domain:
    // plain segments, completed domains, scheme words (ordinary words
    // until their colon arrives) and localhost.
    for node in [d_seg, d_acc, lh, s1, ss1] {
        fsm.add_literal(node, TokenTag::Dot, Some(d_dot));
        fsm.add_literal(node, TokenTag::Hyphen, Some(d_hyp));
        fsm.add_literal(node, TokenTag::At, Some(em_at));
        fsm.add_literal(node, TokenTag::Plus, Some(lp_sep));
        fsm.add_literal(node, TokenTag::Underscore, Some(lp_sep));
        fsm.add_class(node, TokenGroup::Domain, Some(d_seg));
    }

    fsm.add_literal(d_dot, TokenTag::Tld, Some(d_acc));
    fsm.add_literal(d_dot, TokenTag::Utld, Some(d_acc));
    fsm.add_literal(d_dot, TokenTag::Localhost, Some(d_acc));
    fsm.add_class(d_dot, TokenGroup::Domain, Some(d_seg));
    fsm.add_class(d_hyp, TokenGroup::Domain, Some(d_seg));

    // A completed domain (or localhost) takes a port and a body.
    for node in [d_acc, lh] {
        fsm.add_literal(node, TokenTag::Colon, Some(port0));
        fsm.add_literal(node, TokenTag::Slash, Some(path));
        fsm.add_literal(node, TokenTag::Query, Some(path));
        fsm.add_literal(node, TokenTag::Pound, Some(path));
    }
    fsm.add_literal(port0, TokenTag::Num, Some(port_acc));
    fsm.add_literal(port_acc, TokenTag::Slash, Some(path));
    fsm.add_literal(port_acc, TokenTag::Query, Some(path));
    fsm.add_literal(port_acc, TokenTag::Pound, Some(path));
    fsm.add_class(path, TokenGroup::NonSpace, Some(path));

    // Bare scheme: colon, then anything that is not whitespace.
    fsm.add_literal(s1, TokenTag::Colon, Some(s_colon));
    fsm.add_class(s_colon, TokenGroup::NonSpace, Some(s_body));
    fsm.add_class(s_body, TokenGroup::NonSpace, Some(s_body));

    // Slash scheme: `://`, an authority, optional userinfo/port, body.
    fsm.add_literal(ss1, TokenTag::Colon, Some(ss_colon));
    fsm.add_literal(ss_colon, TokenTag::Slash, Some(ss_slash1));
    fsm.add_literal(ss_slash1, TokenTag::Slash, Some(ss_slash2));
    fsm.add_class(ss_slash2, TokenGroup::Domain, Some(host));
    fsm.add_literal(host, TokenTag::Dot, Some(host_dot));
    fsm.add_literal(host, TokenTag::Hyphen, Some(host_hyp));
    fsm.add_literal(host, TokenTag::At, Some(host_at));
    fsm.add_literal(host, TokenTag::Colon, Some(sport0));
    fsm.add_literal(host, TokenTag::Slash, Some(path));
    fsm.add_literal(host, TokenTag::Query, Some(path));
    fsm.add_literal(host, TokenTag::Pound, Some(path));
    fsm.add_class(host, TokenGroup::Domain, Some(host));
    fsm.add_class(host_dot, TokenGroup::Domain, Some(host));
    fsm.add_class(host_hyp, TokenGroup::Domain, Some(host));
    fsm.add_class(host_at, TokenGroup::Domain, Some(host));
    fsm.add_literal(sport0, TokenTag::Num, Some(sport_acc));
    fsm.add_literal(sport_acc, TokenTag::Slash, Some(path));
    fsm.add_literal(sport_acc, TokenTag::Query, Some(path));
    fsm.add_literal(sport_acc, TokenTag::Pound, Some(path));

    // Email. The right side must end on a TLD, a UTLD or localhost.
    fsm.add_class(lp_sep, TokenGroup::Domain, Some(lp_seg));
    fsm.add_class(lp_seg, TokenGroup::Domain, Some(lp_seg));
    for tag in [TokenTag::Dot, TokenTag::Hyphen, TokenTag::Plus, TokenTag::Underscore] {
        fsm.add_literal(lp_seg, tag, Some(lp_sep));
    }
    fsm.add_literal(lp_seg, TokenTag::At, Some(em_at));

    fsm.add_literal(em_at, TokenTag::Localhost, Some(em_acc));
    fsm.add_class(em_at, TokenGroup::Domain, Some(em_seg));
    fsm.add_literal(em_seg, TokenTag::Dot, Some(em_dot));
    fsm.add_literal(em_seg, TokenTag::Hyphen, Some(em_hyp));
    fsm.add_class(em_seg, TokenGroup::Domain, Some(em_seg));
    fsm.add_literal(em_dot, TokenTag::Tld, Some(em_acc));
    fsm.add_literal(em_dot, TokenTag::Utld, Some(em_acc));
    fsm.add_literal(em_dot, TokenTag::Localhost, Some(em_acc));
    fsm.add_class(em_dot, TokenGroup::Domain, Some(em_seg));
    fsm.add_class(em_hyp, TokenGroup::Domain, Some(em_seg));
    fsm.add_literal(em_acc, TokenTag::Dot, Some(em_dot));
    fsm.add_literal(em_acc, TokenTag::Hyphen, Some(em_hyp));
}
