use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A BCP 47-ish language tag, normalized to lowercase (`en`, `en-us`, `uk`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale(String);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid locale tag: {0:?}")]
pub struct InvalidLocale(pub String);

impl Locale {
    /// For tags known to be valid and already lowercase
    pub(crate) fn from_static(tag: &'static str) -> Self {
        Self(tag.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary language subtag (`en` for `en-us`)
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// This locale followed by its less specific parents: `en-us`, `en`
    pub fn fallback_chain(&self) -> Vec<Locale> {
        let mut chain = vec![self.clone()];
        let mut tag = self.0.as_str();
        while let Some(idx) = tag.rfind('-') {
            tag = &tag[..idx];
            chain.push(Locale(tag.to_string()));
        }
        chain
    }

    /// Pick the preferred locale from an `Accept-Language` header value.
    ///
    /// Entries with `q=0` and the `*` wildcard are ignored. Ties keep header order.
    pub fn from_accept_language(header: &str) -> Option<Locale> {
        let mut best: Option<(Locale, f32)> = None;

        for entry in header.split(',') {
            let mut parts = entry.split(';');
            let tag = parts.next().unwrap_or("").trim();
            if tag.is_empty() || tag == "*" {
                continue;
            }

            let quality = parts
                .filter_map(|p| p.trim().strip_prefix("q="))
                .next()
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            if quality <= 0.0 {
                continue;
            }

            let Ok(locale) = tag.parse::<Locale>() else {
                continue;
            };
            match &best {
                Some((_, q)) if *q >= quality => {}
                _ => best = Some((locale, quality)),
            }
        }

        best.map(|(locale, _)| locale)
    }
}

impl FromStr for Locale {
    type Err = InvalidLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().replace('_', "-").to_ascii_lowercase();
        let valid = !tag.is_empty()
            && tag
                .split('-')
                .all(|sub| !sub.is_empty() && sub.len() <= 8 && sub.chars().all(|c| c.is_ascii_alphanumeric()));
        if valid {
            Ok(Self(tag))
        } else {
            Err(InvalidLocale(s.to_string()))
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
