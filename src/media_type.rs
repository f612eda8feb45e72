use crate::error::MediaTypeError;
use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

const WILDCARD: &str = "*";
const CHARSET: &str = "charset";

/// Parsed content-type identifier with ordered parameters.
///
/// Equality is case-insensitive on type and subtype, exact on parameters.
#[derive(Debug, Clone)]
pub struct MediaType {
    main_type: String,
    subtype: String,
    parameters: IndexMap<String, String>,
}

impl MediaType {
    /// The canonical JSON media type, `application/json`.
    pub fn json() -> Self {
        Self::constant("application", "json")
    }

    pub(crate) fn constant(main_type: &str, subtype: &str) -> Self {
        Self {
            main_type: main_type.to_string(),
            subtype: subtype.to_string(),
            parameters: IndexMap::new(),
        }
    }

    /// Parses a content-type string like `application/json;charset=utf-8`.
    pub fn parse(input: &str) -> Result<Self, MediaTypeError> {
        let segments: Vec<&str> = input
            .split(';')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect();
        let Some(&full_type) = segments.first() else {
            return Err(invalid(input, "must not be empty"));
        };
        // java.net-style clients send a bare `*` Accept header; normalize it.
        let full_type = if full_type == WILDCARD {
            "*/*"
        } else {
            full_type
        };
        let Some(slash) = full_type.find('/') else {
            return Err(invalid(input, "does not contain '/'"));
        };
        if slash == full_type.len() - 1 {
            return Err(invalid(input, "does not contain subtype after '/'"));
        }
        let main_type = &full_type[..slash];
        let subtype = &full_type[slash + 1..];
        if main_type == WILDCARD && subtype != WILDCARD {
            return Err(invalid(
                input,
                "wildcard type is legal only in '*/*' (all media types)",
            ));
        }

        let mut parameters = IndexMap::new();
        for segment in &segments[1..] {
            // A segment without '=' is not a parameter; drop it.
            if let Some((attribute, value)) = segment.split_once('=') {
                parameters.insert(attribute.trim().to_string(), value.trim().to_string());
            }
        }

        Ok(Self {
            main_type: main_type.to_string(),
            subtype: subtype.to_string(),
            parameters,
        })
    }

    pub fn main_type(&self) -> &str {
        &self.main_type
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn parameters(&self) -> &IndexMap<String, String> {
        &self.parameters
    }

    pub fn is_wildcard_type(&self) -> bool {
        self.main_type == WILDCARD
    }

    /// True for the bare wildcard subtype and for `*+suffix` forms.
    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype == WILDCARD || self.subtype.starts_with("*+")
    }

    /// Whether a body declared as `self` can be checked against `other`.
    ///
    /// Wildcards match everything; structured-syntax suffixes with a known
    /// canonical form (`+json`) match that form; `*+suffix` subtypes match any
    /// subtype carrying the same suffix.
    pub fn is_compatible_with(&self, other: &MediaType) -> bool {
        if self.is_wildcard_type() || other.is_wildcard_type() {
            return true;
        }
        let this_canonical = self.suffix_alias();
        let other_canonical = other.suffix_alias();
        if this_canonical.is_some() || other_canonical.is_some() {
            let this_side = this_canonical.as_ref().unwrap_or(self);
            let other_side = other_canonical.as_ref().unwrap_or(other);
            if this_side.is_compatible_with(other_side) {
                return true;
            }
        }
        // Case-sensitive on purpose; equality elsewhere is not.
        if self.main_type != other.main_type {
            return false;
        }
        if self.subtype == other.subtype {
            return true;
        }
        if self.is_wildcard_subtype() || other.is_wildcard_subtype() {
            let (this_prefix, this_suffix) = self.split_suffix();
            let (other_prefix, other_suffix) = other.split_suffix();
            match (this_suffix, other_suffix) {
                (None, None) => return true,
                (Some(this_suffix), Some(other_suffix)) => {
                    if this_suffix == other_suffix
                        && (this_prefix == WILDCARD || other_prefix == WILDCARD)
                    {
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }

    /// The `charset` parameter, or `default` if none is present.
    pub fn charset<'a>(&'a self, default: &'a str) -> &'a str {
        self.parameters
            .get(CHARSET)
            .map(String::as_str)
            .unwrap_or(default)
    }

    /// Canonical media type for this subtype's suffix, if one is known.
    fn suffix_alias(&self) -> Option<MediaType> {
        match self.split_suffix().1 {
            Some("json") => Some(Self::json()),
            _ => None,
        }
    }

    /// Splits the subtype at its first `+` into (prefix, suffix).
    fn split_suffix(&self) -> (&str, Option<&str>) {
        match self.subtype.split_once('+') {
            Some((prefix, suffix)) => (prefix, Some(suffix)),
            None => (self.subtype.as_str(), None),
        }
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.main_type.eq_ignore_ascii_case(&other.main_type)
            && self.subtype.eq_ignore_ascii_case(&other.subtype)
            && self.parameters == other.parameters
    }
}

impl Eq for MediaType {}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.subtype)?;
        for (attribute, value) in &self.parameters {
            write!(f, ";{}={}", attribute, value)?;
        }
        Ok(())
    }
}

fn invalid(input: &str, reason: &str) -> MediaTypeError {
    MediaTypeError::Invalid {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
