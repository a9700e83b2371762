use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// On-disk credential file: tokens per domain plus the preferred domain order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tokens: Tokens,
    #[serde(default, rename = "preferreddomains")]
    pub preferred_domains: Vec<String>,
}

impl Config {
    /// Last entry for `domain` wins when the same domain was added twice.
    pub fn token(&self, domain: &str) -> Option<&str> {
        self.tokens.get(domain)
    }

    pub fn add_token(&mut self, domain: &str, token: &str) {
        self.tokens.push(domain, token);
    }

    pub fn add_preferred_domain(&mut self, domain: &str) {
        self.preferred_domains.push(domain.to_string());
    }

    pub fn has_preferred_domain(&self, domain: &str) -> bool {
        self.preferred_domains.iter().any(|d| d == domain)
    }

    pub fn top_domain(&self) -> Option<&str> {
        self.preferred_domains.first().map(String::as_str)
    }
}

/// Domain to token mapping that keeps insertion order.
///
/// Entries are append-only in memory. When written out, each domain appears
/// once, at the position of its first entry, carrying its latest token, so
/// the YAML never holds duplicate keys.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tokens {
    entries: Vec<(String, String)>,
}

impl Tokens {
    pub fn get(&self, domain: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(d, _)| d == domain)
            .map(|(_, token)| token.as_str())
    }

    pub fn push(&mut self, domain: &str, token: &str) {
        self.entries.push((domain.to_string(), token.to_string()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Domains in first-seen order, each with its effective token
    pub fn collapsed(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = Vec::new();
        for (domain, token) in &self.entries {
            let existing = out.iter().position(|(d, _)| *d == domain.as_str());
            match existing {
                Some(i) => out[i].1 = token.as_str(),
                None => out.push((domain.as_str(), token.as_str())),
            }
        }
        out
    }
}

impl Serialize for Tokens {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let collapsed = self.collapsed();
        let mut map = serializer.serialize_map(Some(collapsed.len()))?;
        for (domain, token) in collapsed {
            map.serialize_entry(domain, token)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Tokens {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TokensVisitor;

        impl<'de> Visitor<'de> for TokensVisitor {
            type Value = Tokens;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of domain to token")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Tokens, E> {
                Ok(Tokens::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Tokens, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((domain, token)) = access.next_entry::<String, String>()? {
                    entries.push((domain, token));
                }
                Ok(Tokens { entries })
            }
        }

        deserializer.deserialize_map(TokensVisitor)
    }
}
