//! Percent-encoded form and query-string serialization.
//!
//! Unlike typed form serializers, this encoder supports value-less keys
//! (`"b"` in `"a=1&b&c=2"`), which some endpoints use as flags.

/// Serializes ordered pairs into a percent-encoded form string.
///
/// Pairs with an absent key are skipped entirely. A present key with an
/// absent value is emitted bare, with no `=`. Pairs are joined with `&` in
/// input order. Escaping is RFC 3986 percent-encoding, so a space becomes
/// `%20`.
#[must_use]
pub fn urlencode<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
{
    let mut out = String::new();
    for (key, value) in pairs {
        let Some(key) = key else { continue };
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&urlencoding::encode(key));
        if let Some(value) = value {
            out.push('=');
            out.push_str(&urlencoding::encode(value));
        }
    }
    out
}

/// Leading-`?` form of [`urlencode`], ready to append to a URL path.
///
/// An empty pair list yields a bare `?`.
#[must_use]
pub fn query_string<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
{
    let mut out = String::from("?");
    out.push_str(&urlencode(pairs));
    out
}
