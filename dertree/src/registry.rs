//! The name registry for well-known object identifiers.
//!
//! A process-wide, read-only bidirectional map between canonical
//! dotted-decimal OIDs and symbolic names, used by the pretty-printer
//! to emit `id-at-commonName` instead of `2.5.4.3` and by the text
//! builder to accept either spelling.
//!
//! Name lookup is forgiving: whitespace and `-` are stripped and ASCII
//! is lowercased before comparison, so `commonname`, `Common-Name` and
//! `id-at-commonName` all resolve. Every name of the form `id-XX-rest`
//! additionally registers the alias `rest`, except that `id-ad-*`
//! aliases to `*-IA` and `id-kp-*` to `*-EKU` (access descriptions and
//! extended key usages reuse the bare names of other objects).

use crate::{ErrorKind, Oid, Result};
use std::collections::HashMap;

mod db;

/// Resolve a canonical dotted-decimal OID to its primary symbolic name,
/// or hand the canonical form back when the OID is not registered.
pub fn to_name(oid: &Oid) -> String {
    let canonical = oid.to_string();
    match REGISTRY.names.get(&canonical) {
        Some(name) => name.clone(),
        None => canonical,
    }
}

/// Resolve `input`, either a dotted-decimal OID (canonical or not) or a
/// registered symbolic name, to an [`Oid`].
pub fn to_oid(input: &str) -> Result<Oid> {
    if input.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return input.parse();
    }

    match REGISTRY.oids.get(&normalize(input)) {
        Some(oid) => oid.parse(),
        None => Err(ErrorKind::Oid.into()),
    }
}

/// Resolve `input` as [`to_oid`] does and return the integer components.
pub fn components(input: &str) -> Result<Vec<u64>> {
    to_oid(input).map(|oid| oid.arcs().to_vec())
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

struct Registry {
    /// canonical dotted-decimal -> primary name
    names: HashMap<String, String>,

    /// normalised name -> canonical dotted-decimal
    oids: HashMap<String, String>,
}

impl Registry {
    fn new() -> Registry {
        Registry {
            names: HashMap::new(),
            oids: HashMap::new(),
        }
    }

    /// Register `name` for `oid`. The first name registered for an OID
    /// becomes its primary name; registering the same normalised name
    /// twice is an error.
    fn register(&mut self, oid: &str, name: &str) -> Result<()> {
        let canonical = oid.parse::<Oid>()?.to_string();

        self.names
            .entry(canonical.clone())
            .or_insert_with(|| name.to_string());
        self.insert_name(name, &canonical)?;

        if let Some(alias) = short_alias(name) {
            self.insert_name(&alias, &canonical)?;
        }

        Ok(())
    }

    fn insert_name(&mut self, name: &str, canonical: &str) -> Result<()> {
        let key = normalize(name);
        if self.oids.contains_key(&key) {
            return Err(ErrorKind::DuplicateName { name: key }.into());
        }

        self.oids.insert(key, canonical.to_string());
        Ok(())
    }
}

/// The short alias for an `id-XX-` prefixed name, if it has one.
fn short_alias(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    if bytes.len() <= 6 || !name.starts_with("id-") || bytes[5] != b'-' {
        return None;
    }

    let rest = &name[6..];
    Some(match &name[..6] {
        "id-ad-" => format!("{}-IA", rest),
        "id-kp-" => format!("{}-EKU", rest),
        _ => rest.to_string(),
    })
}

lazy_static::lazy_static! {
    static ref REGISTRY: Registry = {
        let mut registry = Registry::new();
        for (oid, name) in db::BUILTIN {
            registry
                .register(oid, name)
                .expect("built-in OID table is consistent");
        }
        registry
    };
}

#[cfg(test)]
mod tests {
    use super::{components, to_name, to_oid};
    use crate::Oid;

    #[test]
    fn name_round_trip() {
        let oid: Oid = "2.5.4.3".parse().unwrap();
        assert_eq!(to_name(&oid), "id-at-commonName");
        assert_eq!(to_oid("id-at-commonName").unwrap(), oid);
        assert_eq!(to_oid("commonName").unwrap(), oid);
        assert_eq!(to_oid("Common Name").unwrap(), oid);
    }

    #[test]
    fn unknown_oid_prints_numeric() {
        let oid: Oid = "1.2.3.4.5.6".parse().unwrap();
        assert_eq!(to_name(&oid), "1.2.3.4.5.6");
    }

    #[test]
    fn numeric_input_canonicalised() {
        assert_eq!(to_oid("2.05.4.03").unwrap().to_string(), "2.5.4.3");
        assert_eq!(components("2.5.4.3").unwrap(), vec![2, 5, 4, 3]);
    }

    #[test]
    fn disambiguated_aliases() {
        assert_eq!(
            to_oid("ocsp-IA").unwrap(),
            "1.3.6.1.5.5.7.48.1".parse().unwrap()
        );
        assert_eq!(
            to_oid("serverAuth-EKU").unwrap(),
            "1.3.6.1.5.5.7.3.1".parse().unwrap()
        );
        assert_eq!(
            to_oid("keyUsage").unwrap(),
            "2.5.29.15".parse().unwrap()
        );
    }

    #[test]
    fn unknown_name_rejected() {
        assert!(to_oid("no-such-name").is_err());
    }
}
