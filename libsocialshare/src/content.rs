//! Share content and its normalization
//!
//! Every network gets the same [`ShareContent`]. Building one trims each
//! field and cuts the headline and short text down to the lengths the
//! strictest networks accept, so adapters never have to re-check them.
//!
//! # Examples
//!
//! ```
//! use libsocialshare::content::{ContentFields, ShareContent};
//!
//! let content = ShareContent::new(
//!     ContentFields::new()
//!         .message("  Corgis are the new cats.  ")
//!         .headline("x".repeat(300)),
//! );
//!
//! assert_eq!(content.message(), "Corgis are the new cats.");
//! assert_eq!(content.headline().chars().count(), 128);
//! ```

use serde::{Deserialize, Serialize};

/// Maximum headline length, in characters
pub const HEADLINE_LIMIT: usize = 128;

/// Maximum short-text length, in characters
pub const SHORT_TEXT_LIMIT: usize = 160;

/// Raw, caller-supplied content fields
///
/// Nothing is checked here; pass it to [`ShareContent::new`] to normalize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentFields {
    pub message: Option<String>,
    pub headline: Option<String>,
    pub excerpt: Option<String>,
    pub short_text: Option<String>,
    pub url: Option<String>,
    pub url_title: Option<String>,
    pub url_description: Option<String>,
    pub image_url: Option<String>,
    pub image_url_title: Option<String>,
    pub image_url_description: Option<String>,
}

macro_rules! field_setters {
    ($($field:ident),* $(,)*) => {
        $(
            #[must_use]
            pub fn $field(mut self, value: impl Into<String>) -> Self {
                self.$field = Some(value.into());
                self
            }
        )*
    };
}

impl ContentFields {
    pub fn new() -> Self {
        Self::default()
    }

    field_setters!(
        message,
        headline,
        excerpt,
        short_text,
        url,
        url_title,
        url_description,
        image_url,
        image_url_title,
        image_url_description,
    );
}

/// Normalized content, ready to hand to any backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShareContent {
    message: String,
    headline: String,
    excerpt: String,
    short_text: String,
    url: String,
    url_title: String,
    url_description: String,
    image_url: String,
    image_url_title: String,
    image_url_description: String,
}

impl ShareContent {
    pub fn new(fields: ContentFields) -> Self {
        Self {
            message: normalize_field(fields.message.as_deref(), None),
            headline: normalize_field(fields.headline.as_deref(), Some(HEADLINE_LIMIT)),
            excerpt: normalize_field(fields.excerpt.as_deref(), None),
            short_text: normalize_field(fields.short_text.as_deref(), Some(SHORT_TEXT_LIMIT)),
            url: normalize_field(fields.url.as_deref(), None),
            url_title: normalize_field(fields.url_title.as_deref(), None),
            url_description: normalize_field(fields.url_description.as_deref(), None),
            image_url: normalize_field(fields.image_url.as_deref(), None),
            image_url_title: normalize_field(fields.image_url_title.as_deref(), None),
            image_url_description: normalize_field(fields.image_url_description.as_deref(), None),
        }
    }

    /// Replace the content, normalizing the new fields the same way `new` does
    pub fn update(&mut self, fields: ContentFields) {
        *self = Self::new(fields);
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }

    pub fn short_text(&self) -> &str {
        &self.short_text
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn url_title(&self) -> &str {
        &self.url_title
    }

    pub fn url_description(&self) -> &str {
        &self.url_description
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn image_url_title(&self) -> &str {
        &self.image_url_title
    }

    pub fn image_url_description(&self) -> &str {
        &self.image_url_description
    }

    /// All fields as `(name, value)` pairs, in declaration order
    pub fn fields(&self) -> [(&'static str, &str); 10] {
        [
            ("message", self.message.as_str()),
            ("headline", self.headline.as_str()),
            ("excerpt", self.excerpt.as_str()),
            ("short_text", self.short_text.as_str()),
            ("url", self.url.as_str()),
            ("url_title", self.url_title.as_str()),
            ("url_description", self.url_description.as_str()),
            ("image_url", self.image_url.as_str()),
            ("image_url_title", self.image_url_title.as_str()),
            ("image_url_description", self.image_url_description.as_str()),
        ]
    }

    /// Fields that carry a value
    pub fn non_empty_fields(&self) -> Vec<(&'static str, &str)> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_empty())
    }
}

/// Trim a raw field and cap it at `limit` characters
///
/// The cut is on character boundaries, not words. Whitespace left at the end
/// of a cut is trimmed as well.
pub fn normalize_field(raw: Option<&str>, limit: Option<usize>) -> String {
    let trimmed = raw.unwrap_or_default().trim();
    match limit {
        Some(limit) => truncate_chars(trimmed, limit).trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

/// Longest prefix of `s` holding at most `limit` characters
pub fn truncate_chars(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((index, _)) => &s[..index],
        None => s,
    }
}
