//! Query URL construction
//!
//! Turns a session configuration and the current cursor into the full
//! request URL: `<url>?<filters>&$select=..&...&$limit=..&$offset=..`.
//!
//! Spaces are encoded as `%20` rather than `+`. Directive names are
//! encoded like any other key, so `$limit` travels as `%24limit`.

use crate::config::SessionConfig;
use crate::error::Result;
use crate::pagination::Cursor;
use crate::types::SoqlDirective;
use url::{form_urlencoded, Url};

/// Build the request URL for the page at `cursor`
pub fn build_query_url(config: &SessionConfig, cursor: &Cursor) -> Result<String> {
    Url::parse(&config.url)?;

    let mut segments = Vec::new();

    if !config.filters.is_empty() {
        segments.push(encode_pairs(
            config
                .filters
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        ));
    }

    for directive in SoqlDirective::ALL {
        let value = match directive {
            SoqlDirective::Limit => Some(cursor.limit.to_string()),
            SoqlDirective::Offset => Some(cursor.offset.to_string()),
            other => config.query.get(other).map(str::to_string),
        };
        if let Some(value) = value {
            segments.push(encode_pairs([(directive.param(), value.as_str())]));
        }
    }

    Ok(format!("{}?{}", config.url, segments.join("&")))
}

/// Form-encode key/value pairs with `%20` for spaces
fn encode_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
        .replace('+', "%20")
}
