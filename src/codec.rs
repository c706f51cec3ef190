//! A single canonical run-length token grammar, shared by both back-ends'
//! `GameDescription` encoders/decoders (spec §9 Design Notes: "Run-length-
//! encoded descriptions parsed and emitted by hand with two independent
//! code paths ... extract a single canonical token grammar with a
//! symmetric encode/decode pair; property-test their round-trip.").
//!
//! A token is a single ASCII letter optionally followed by a decimal
//! repeat count (count omitted means 1): `a`, `a5`, `w12`. Both the
//! sliding-block board (`a[Nrepeat]`, `m`, `e`, `w`, `d<k>`, with an `f`
//! prefix for forcefields) and the bridge board (island/empty run tokens)
//! are built from this grammar; each back-end's `mod.rs` interprets the
//! letters, this module only owns the run-splitting and digit framing.

/// Groups consecutive equal items into `(item, run_length)` pairs.
pub fn run_length_encode<T: PartialEq + Clone>(items: &[T]) -> Vec<(T, usize)> {
    let mut out = Vec::new();
    let mut iter = items.iter();
    let Some(first) = iter.next() else { return out };
    let mut current = first.clone();
    let mut count = 1usize;
    for item in iter {
        if *item == current {
            count += 1;
        } else {
            out.push((current, count));
            current = item.clone();
            count = 1;
        }
    }
    out.push((current, count));
    out
}

/// Appends one token for `(symbol, count)`: the symbol, then the count as
/// decimal digits if `count > 1` (a count of exactly 1 is implicit).
pub fn write_token(out: &mut String, symbol: char, count: usize) {
    out.push(symbol);
    if count > 1 {
        out.push_str(&count.to_string());
    }
}

/// One parsed token: a leading letter and its optional decimal count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: char,
    pub count: usize,
}

/// Parses a description string into `(letter, optional-digit-run)`
/// tokens. A missing digit run means count `1`. Any leading character
/// that is not an ASCII letter ends parsing (callers are expected to have
/// already split off non-grammar suffixes, e.g. `,tx,ty,minmoves`).
pub fn parse_tokens(s: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = s.chars().peekable();
    while let Some(symbol) = chars.next() {
        if !symbol.is_ascii_alphabetic() {
            return Err(format!("expected a letter token, found {symbol:?}"));
        }
        let mut digits = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                chars.next();
            } else {
                break;
            }
        }
        let count = if digits.is_empty() { 1 } else { digits.parse().map_err(|_| "count overflow".to_string())? };
        if count == 0 {
            return Err("a run-length token must have a positive count".to_string());
        }
        tokens.push(Token { symbol, count });
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_length_encode_groups_runs() {
        let items = ['a', 'a', 'a', 'b', 'b', 'c'];
        assert_eq!(run_length_encode(&items), vec![('a', 3), ('b', 2), ('c', 1)]);
    }

    #[test]
    fn run_length_encode_empty() {
        let items: [char; 0] = [];
        assert_eq!(run_length_encode(&items), vec![]);
    }

    #[test]
    fn write_token_omits_count_of_one() {
        let mut out = String::new();
        write_token(&mut out, 'a', 1);
        write_token(&mut out, 'w', 12);
        assert_eq!(out, "aw12");
    }

    #[test]
    fn parse_tokens_round_trips_with_write_token() {
        let original = vec![Token { symbol: 'a', count: 5 }, Token { symbol: 'e', count: 1 }, Token { symbol: 'w', count: 12 }];
        let mut s = String::new();
        for t in &original {
            write_token(&mut s, t.symbol, t.count);
        }
        let parsed = parse_tokens(&s).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn parse_tokens_rejects_leading_digit() {
        assert!(parse_tokens("5a").is_err());
    }

    #[test]
    fn full_round_trip_any_run_sequence() {
        // Property-style table: a handful of representative run sequences
        // round-trip through encode -> write -> parse -> decode.
        let cases: Vec<Vec<(char, usize)>> = vec![
            vec![('a', 1)],
            vec![('a', 100), ('b', 1), ('c', 40)],
            vec![('w', 3), ('w', 3)], // not pre-merged; still round-trips as two tokens
        ];
        for runs in cases {
            let mut s = String::new();
            for &(sym, count) in &runs {
                write_token(&mut s, sym, count);
            }
            let parsed = parse_tokens(&s).unwrap();
            let back: Vec<(char, usize)> = parsed.into_iter().map(|t| (t.symbol, t.count)).collect();
            assert_eq!(back, runs);
        }
    }
}
