// Scanner behavior, observed through the sub-tokens each entity carries.

use linkscan_core::{tokenize, TokenTag};

fn tags(text: &str) -> Vec<TokenTag> {
    tokenize(text)
        .iter()
        .flat_map(|e| e.tokens.iter().map(|t| t.tag))
        .collect()
}

#[test]
fn words_numbers_and_mixed_runs() {
    assert_eq!(tags("hello"), vec![TokenTag::Word]);
    assert_eq!(tags("1234"), vec![TokenTag::Num]);
    assert_eq!(tags("abc123"), vec![TokenTag::AsciiNumeric]);
    assert_eq!(tags("123abc"), vec![TokenTag::AsciiNumeric]);
    assert_eq!(tags("a1é"), vec![TokenTag::AlphaNumeric]);
}

#[test]
fn ascii_letters_do_not_extend_unicode_words() {
    assert_eq!(tags("café"), vec![TokenTag::Word, TokenTag::Uword]);
    assert_eq!(tags("étage"), vec![TokenTag::Uword, TokenTag::Word]);
}

#[test]
fn crlf_folds_into_one_newline_token() {
    let entities = tokenize("a\r\nb");
    assert_eq!(entities.len(), 3);
    assert_eq!(entities[1].value, "\r\n");
    assert_eq!(entities[1].tokens.len(), 1);
    assert_eq!(entities[1].tokens[0].tag, TokenTag::Nl);
}

#[test]
fn lone_carriage_return_is_whitespace() {
    assert_eq!(tags("a\rb"), vec![TokenTag::Word, TokenTag::Ws, TokenTag::Word]);
}

#[test]
fn object_replacement_is_whitespace() {
    assert_eq!(tags("a\u{FFFC}b"), vec![TokenTag::Word, TokenTag::Ws, TokenTag::Word]);
}

#[test]
fn keywords_and_their_extensions() {
    assert_eq!(tags("http"), vec![TokenTag::SlashScheme]);
    assert_eq!(tags("https"), vec![TokenTag::SlashScheme]);
    assert_eq!(tags("httpx"), vec![TokenTag::Word]);
    assert_eq!(tags("htt"), vec![TokenTag::Word]);
    assert_eq!(tags("mailto"), vec![TokenTag::Scheme]);
    assert_eq!(tags("localhost"), vec![TokenTag::Localhost]);
    assert_eq!(tags("localhostx"), vec![TokenTag::Word]);
    assert_eq!(tags("http2"), vec![TokenTag::AsciiNumeric]);
}

#[test]
fn tld_chains_accept_only_full_names() {
    assert_eq!(tags("com"), vec![TokenTag::Tld]);
    assert_eq!(tags("community"), vec![TokenTag::Tld]);
    assert_eq!(tags("comx"), vec![TokenTag::Word]);
    assert_eq!(tags("comm"), vec![TokenTag::Word]);
    assert_eq!(tags("рф"), vec![TokenTag::Utld]);
}

#[test]
fn case_folding_changes_tags_not_values() {
    assert_eq!(tags("HTTP"), tags("http"));
    assert_eq!(tags("Example.COM"), tags("example.com"));
    let entities = tokenize("HTTP");
    assert_eq!(entities[0].value, "HTTP");
}

#[test]
fn emoji_sequences_stay_single_tokens() {
    assert_eq!(tags("😀"), vec![TokenTag::Emoji]);
    assert_eq!(tags("😀😀"), vec![TokenTag::Emoji]);
    // VS16 presentation selector
    assert_eq!(tags("☂\u{FE0F}"), vec![TokenTag::Emoji]);
    // ZWJ family sequence
    assert_eq!(tags("👨\u{200D}👩\u{200D}👧"), vec![TokenTag::Emoji]);
}

#[test]
fn dangling_joiner_rolls_back() {
    // The ZWJ after the emoji is not followed by another pictograph, so it
    // falls out as a separate symbol token.
    assert_eq!(tags("😀\u{200D}x"), vec![TokenTag::Emoji, TokenTag::Sym, TokenTag::Word]);
}

#[test]
fn lone_vs16_is_a_symbol() {
    assert_eq!(tags("\u{FE0F}"), vec![TokenTag::Sym]);
}

#[test]
fn punctuation_gets_individual_tokens() {
    assert_eq!(
        tags("(a)"),
        vec![TokenTag::OpenParen, TokenTag::Word, TokenTag::CloseParen]
    );
    assert_eq!(tags("a・b"), vec![TokenTag::Word, TokenTag::FullwidthMiddleDot, TokenTag::Word]);
}

#[test]
fn every_scan_partitions_the_input() {
    for input in [
        "",
        "plain text",
        "surrogates 𝒳𝒴 inside",
        "emoji 😀\u{200D}😀 and более текста",
        "\r\n\r\n",
        "mixed: https://a.co/p(x), b@c.de!",
        "\u{FE0F}\u{200D}weird\u{FFFC}edges",
    ] {
        let entities = tokenize(input);
        let concat: String = entities.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(concat, input);
        let mut cursor = 0;
        for entity in &entities {
            assert_eq!(entity.start, cursor);
            cursor = entity.end;
            let mut tok_cursor = entity.start;
            for token in &entity.tokens {
                assert_eq!(token.start, tok_cursor);
                tok_cursor = token.end;
            }
            assert_eq!(tok_cursor, entity.end);
        }
        assert_eq!(cursor, input.len());
    }
}

#[test]
fn scans_are_deterministic() {
    let input = "Visit https://example.com, write a@b.co!";
    assert_eq!(tokenize(input), tokenize(input));
}
