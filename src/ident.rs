//! Game identifier parsing (spec §6): `params#seed`, `params:desc`, or a
//! bare string whose meaning depends on the caller's default mode. Kept as
//! a pure, backend-agnostic parser so [`crate::midend::Midend::game_id`]
//! only has to decode the params substring and validate the rest.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdDefaultMode {
    Seed,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdPayload<'a> {
    Seed(&'a str),
    Desc(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId<'a> {
    /// The persistent-parameter substring before `#`/`:`, or empty if the
    /// identifier carried none (params stay at whatever they already were).
    pub params: &'a str,
    pub payload: IdPayload<'a>,
}

/// Splits a game identifier string into its parameter prefix and its
/// seed-or-description payload, without validating or decoding either;
/// that's the back-end's job.
pub fn parse_game_id(s: &str, default_mode: IdDefaultMode) -> ParsedId<'_> {
    if let Some(idx) = s.find('#') {
        ParsedId { params: &s[..idx], payload: IdPayload::Seed(&s[idx + 1..]) }
    } else if let Some(idx) = s.find(':') {
        ParsedId { params: &s[..idx], payload: IdPayload::Desc(&s[idx + 1..]) }
    } else {
        match default_mode {
            IdDefaultMode::Seed => ParsedId { params: "", payload: IdPayload::Seed(s) },
            IdDefaultMode::Desc => ParsedId { params: "", payload: IdPayload::Desc(s) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_form_is_a_seed() {
        let parsed = parse_game_id("7x6m25#12345", IdDefaultMode::Desc);
        assert_eq!(parsed.params, "7x6m25");
        assert_eq!(parsed.payload, IdPayload::Seed("12345"));
    }

    #[test]
    fn colon_form_is_a_description() {
        let parsed = parse_game_id("7x6m25:aamd1d-1d1e,5,3,25", IdDefaultMode::Seed);
        assert_eq!(parsed.params, "7x6m25");
        assert_eq!(parsed.payload, IdPayload::Desc("aamd1d-1d1e,5,3,25"));
    }

    #[test]
    fn bare_string_follows_default_mode() {
        let as_seed = parse_game_id("12345", IdDefaultMode::Seed);
        assert_eq!(as_seed.payload, IdPayload::Seed("12345"));
        let as_desc = parse_game_id("aamd1d-1d1e,5,3,25", IdDefaultMode::Desc);
        assert_eq!(as_desc.payload, IdPayload::Desc("aamd1d-1d1e,5,3,25"));
    }

    #[test]
    fn bare_string_with_no_params_prefix() {
        let parsed = parse_game_id("12345", IdDefaultMode::Seed);
        assert_eq!(parsed.params, "");
    }
}
