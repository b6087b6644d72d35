// TLD tables, shipped as encoded prefix-trie strings. Letters push onto
// the current prefix; a run of decimal digits emits the prefix as one TLD
// and then pops that many characters ("aaa1rp4" -> "aaa", "aarp"). ASCII
// and internationalized TLDs ship separately. Curated cut: the full
// country-code list, the classic gTLDs and the common newer ones.

pub(crate) const ENCODED_TLDS: &str = concat!(
    "ac1d1e0ro3f1g1i1l1m1o1pp2r0t2s1t1u1w1x1z2",
    "ba0nk2r2b1d1e1f1g1h1i0z2j1log3m1n1o1r1s1t1w1y1z2",
    "ca0t2c1d1f1g1h0at3i1k1l0ick3oud3ub3m1n1o0m0munity8r1u1v1w1x1y1z2",
    "de0v2j1k1m1o0mains5wnload7z2",
    "ec1du2e1g1mail4s1t1u1vents5xchange6pert6",
    "fi1j1k1m1o0undation9r1un3",
    "ga1b1d1e1g1h1i1l1m1n1ov2p1q1r1s1t1u1w1y2",
    "hk1m1n1r1t1u2",
    "id1e1l1m1n0fo2k1t2o1q1r1s1t2",
    "je1m1o0bs3p2",
    "ke1g1h1i1m1n1p1r1w1y1z2",
    "la1b1c1i0nk2ve3k1ol2r1s1t1u1v1y2",
    "ma1c1d1e0dia4g1h1k1l1m1n1o0bi2ney4p1q1r1s1t1u0seum5v1w1x1y1z2",
    "na0me3c1e0t0work5ws3f1g1i1l1o1p1r1u1z2",
    "om1ne1line5rg3",
    "pa1e1f1g1h1k1l1m1n1r0o2s1t1w1y2",
    "qa2",
    "re1o1s1u1w2",
    "sa1b1c1d1e1g1h0op3i0te3k1l1m1n1o0cial5pace4r1s1t0ore3udio5u0pport6v1x1y0stems6z2",
    "tc1d1eam2ch2l2f1g1h1j1k1l1m1n1o0day3p2r0avel5t1v1w1z2",
    "ua1g1k1s1y1z2",
    "va1c1e1g1i0p2n1u2",
    "website6f1iki3ork1ld4s2",
    "xyz3",
    "ye1t2",
    "za1m1one3w2",
);

pub(crate) const ENCODED_UTLDS: &str =
    "ελ2бг1ел3мкд2он3рф2срб3укр3қаз3中国1國2台湾1灣2新加坡3香港2한국2";

pub(crate) fn decode(encoded: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack: Vec<char> = Vec::new();
    let mut chars = encoded.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            let mut pops = 0usize;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                pops = pops * 10 + d as usize;
                chars.next();
            }
            out.push(stack.iter().collect());
            stack.truncate(stack.len().saturating_sub(pops));
        } else {
            stack.push(c);
            chars.next();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_shared_prefixes() {
        assert_eq!(decode("aaa1rp4"), vec!["aaa", "aarp"]);
        assert_eq!(decode("co0m3"), vec!["co", "com"]);
    }

    #[test]
    fn ascii_table_is_sorted_lowercase_ascii() {
        let tlds = decode(ENCODED_TLDS);
        assert!(tlds.len() >= 300);
        for pair in tlds.windows(2) {
            assert!(pair[0] < pair[1], "out of order: {:?}", pair);
        }
        for tld in &tlds {
            assert!(!tld.is_empty());
            assert!(tld.chars().all(|c| c.is_ascii_lowercase()), "bad entry {:?}", tld);
        }
    }

    #[test]
    fn ascii_table_contains_the_usual_suspects() {
        let tlds = decode(ENCODED_TLDS);
        for expected in ["com", "org", "net", "io", "co", "uk", "de", "museum", "xyz"] {
            assert!(tlds.iter().any(|t| t == expected), "missing {:?}", expected);
        }
    }

    #[test]
    fn idn_table_decodes() {
        let utlds = decode(ENCODED_UTLDS);
        assert_eq!(utlds.len(), 16);
        for pair in utlds.windows(2) {
            assert!(pair[0] < pair[1], "out of order: {:?}", pair);
        }
        assert!(utlds.iter().any(|t| t == "рф"));
        assert!(utlds.iter().any(|t| t == "中国"));
    }
}
