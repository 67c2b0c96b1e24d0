use regex::Captures;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::DecodeError;

/// Maximum number of named parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Named parameter storage. Names are shared with the rule that produced
/// them; a `None` value is a parameter whose optional segment was absent.
pub type ParamVec = SmallVec<[(Arc<str>, Option<String>); MAX_INLINE_PARAMS]>;

/// Path parameters bound to a request by dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    named: ParamVec,
    unnamed: SmallVec<[Option<String>; 2]>,
}

impl Params {
    /// Build the mapping from a successful match. Each capture position with
    /// a name is decoded and stored under it; a later capture with the same
    /// name replaces the earlier value. Positions without a name are kept
    /// only in [`Params::unnamed`].
    pub(crate) fn from_captures(
        names: &[Option<Arc<str>>],
        captures: &Captures<'_>,
    ) -> Result<Self, DecodeError> {
        let mut params = Params::default();
        for (i, name) in names.iter().enumerate() {
            let value = match captures.get(i + 1) {
                Some(m) => Some(decode_component(m.as_str())?),
                None => None,
            };
            match name {
                Some(name) => params.insert(Arc::clone(name), value),
                None => params.unnamed.push(value),
            }
        }
        Ok(params)
    }

    fn insert(&mut self, name: Arc<str>, value: Option<String>) {
        match self.named.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.named.push((name, value)),
        }
    }

    /// Value of a named parameter. `None` both when the name is unknown and
    /// when its optional segment was absent.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// Whether the matched rule declares `name`, present in the path or not.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.named.iter().any(|(k, _)| k.as_ref() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.named.iter().map(|(k, v)| (k.as_ref(), v.as_deref()))
    }

    /// Decoded values of captures that have no name, in capture order.
    #[must_use]
    pub fn unnamed(&self) -> &[Option<String>] {
        &self.unnamed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.named.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.named.is_empty()
    }

    /// Present parameters as an owned map.
    /// Note: This allocates - use get() in hot paths instead
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.named
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), v.clone())))
            .collect()
    }
}

/// Percent-decode one captured path value.
///
/// `+` is left alone. A `%` that does not start a two-digit hex escape, or an
/// escape sequence that does not decode to UTF-8, is an error.
pub fn decode_component(raw: &str) -> Result<String, DecodeError> {
    if !raw.contains('%') {
        return Ok(raw.to_string());
    }
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
            if !valid {
                return Err(DecodeError::MalformedEscape {
                    value: raw.to_string(),
                    offset: i,
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8 {
            value: raw.to_string(),
        })
}
