//! Page-based pagination for list endpoints.
//!
//! Clients send `page` (1-based) and `pageSize`; the server clamps both into
//! range before they reach a query. Out-of-range values are corrected rather
//! than rejected, including integers too large for `i64`.

use std::fmt;
use std::num::IntErrorKind;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Raw pagination parameters as received from a query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    /// Requested 1-based page number.
    #[serde(default, deserialize_with = "saturating_i64")]
    pub page: Option<i64>,
    /// Requested number of items per page.
    #[serde(
        rename = "pageSize",
        alias = "page_size",
        default,
        deserialize_with = "saturating_i64"
    )]
    pub page_size: Option<i64>,
}

impl PageRequest {
    /// Resolve into a concrete [`Page`].
    ///
    /// - `page` below 1 (or absent) becomes 1.
    /// - `page_size` below 1 (or absent) becomes `default_size`.
    /// - `page_size` above `max_size` becomes exactly `max_size`.
    ///
    /// `default_size` is itself clamped into `1..=max_size`, and a `max_size`
    /// of zero is treated as one.
    #[must_use]
    pub fn resolve(self, default_size: u32, max_size: u32) -> Page {
        let max_size = max_size.max(1);
        let default_size = default_size.clamp(1, max_size);

        let page = self
            .page
            .filter(|p| *p >= 1)
            .map_or(1, |p| u32::try_from(p).unwrap_or(u32::MAX));

        let page_size = match self.page_size {
            Some(size) if size >= 1 => u32::try_from(size).unwrap_or(u32::MAX).min(max_size),
            _ => default_size,
        };

        Page { page, page_size }
    }
}

/// Parse a decimal integer, saturating at the `i64` bounds on overflow.
///
/// # Errors
///
/// Returns the parse error for input that is not an integer at all.
pub fn parse_saturating(raw: &str) -> Result<i64, std::num::ParseIntError> {
    match raw.trim().parse::<i64>() {
        Ok(value) => Ok(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(e),
        },
    }
}

/// Serde helper for optional numeric query parameters.
///
/// Accepts numbers or numeric strings; oversized values saturate instead of
/// failing, and an empty value counts as absent. Use together with
/// `#[serde(default)]`.
///
/// # Errors
///
/// Fails on values that are neither integers nor empty.
pub fn saturating_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(SaturatingVisitor)
}

struct SaturatingVisitor;

impl<'de> Visitor<'de> for SaturatingVisitor {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(i64::try_from(value).unwrap_or(i64::MAX)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        if value.trim().is_empty() {
            return Ok(None);
        }
        parse_saturating(value)
            .map(Some)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }
}

/// A validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-based page number.
    pub page: u32,
    /// Items per page, always at least 1.
    pub page_size: u32,
}

impl Page {
    /// SQL `LIMIT` value.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// SQL `OFFSET` value.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }

    /// Number of pages needed to show `total` items; zero when there are none.
    #[must_use]
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size))
    }
}
