use crate::constants::{
    NONCE_PREFIX, NONE_SOURCE, SELF_SOURCE, STRICT_DYNAMIC_SOURCE, SUFFIX_QUOTE,
    UNSAFE_INLINE_SOURCE,
};
use std::{borrow::Cow, fmt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    None,
    Self_,
    UnsafeInline,
    StrictDynamic,
    Host(Cow<'static, str>),
    Scheme(Cow<'static, str>),
    Nonce(Cow<'static, str>),
}

impl Source {
    #[inline]
    pub const fn as_static_str(&self) -> Option<&'static str> {
        match self {
            Source::None => Some(NONE_SOURCE),
            Source::Self_ => Some(SELF_SOURCE),
            Source::UnsafeInline => Some(UNSAFE_INLINE_SOURCE),
            Source::StrictDynamic => Some(STRICT_DYNAMIC_SOURCE),
            _ => None,
        }
    }

    #[inline]
    pub fn estimated_size(&self) -> usize {
        match self {
            Source::Host(host) => host.len(),
            Source::Scheme(scheme) => scheme.len() + 1,
            Source::Nonce(nonce) => NONCE_PREFIX.len() + nonce.len() + SUFFIX_QUOTE.len(),
            keyword => keyword.as_static_str().map_or(0, str::len),
        }
    }

    pub(crate) fn write_to(&self, buffer: &mut String) {
        match self {
            Source::Host(host) => buffer.push_str(host),
            Source::Scheme(scheme) => {
                buffer.push_str(scheme);
                buffer.push(':');
            }
            Source::Nonce(nonce) => {
                buffer.push_str(NONCE_PREFIX);
                buffer.push_str(nonce);
                buffer.push_str(SUFFIX_QUOTE);
            }
            keyword => {
                if let Some(value) = keyword.as_static_str() {
                    buffer.push_str(value);
                }
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = String::with_capacity(self.estimated_size());
        self.write_to(&mut buffer);
        f.write_str(&buffer)
    }
}
