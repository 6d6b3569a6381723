//! Site-relative links.
//!
//! Rewrites the `siteurl` pseudo host in markdown links to the configured
//! site URL, so documents survive a change of domain:
//!
//! ```markdown
//! [Home]: siteurl
//! [With parameters]: siteurl?param1=value1&param2=value2
//! [Inline](siteurl/Path/To/Page)
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, percent_encode};
use regex::{Captures, Regex};
use serde_json::Value;

use crate::error::ProcessorError;
use crate::placeholder::PlaceholderAllocator;
use crate::processor::{Processor, ValidationResults};

static LINK_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\]: siteurl(\S*)").unwrap());
static INLINE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(siteurl([^)\s]*)").unwrap());

/// Form encoding: everything except A-Z a-z 0-9 - . _
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_');

/// Callback adjusting query parameters whenever a URL is built.
///
/// Must return a JSON object; any other value aborts the render.
pub type ParamsCallback = dyn Fn(&BTreeMap<String, String>) -> Value + Send + Sync;

/// Rewrites `siteurl` links to absolute site URLs.
///
/// Paths get a trailing slash, query parameters are sorted by key.
///
/// # Example
///
/// ```
/// use mdguard_renderer::{PlaceholderAllocator, Processor, SiteUrlProcessor};
///
/// let mut processor = SiteUrlProcessor::new().with_site_url("https://example.com/docs");
/// let output = processor
///     .pre_process("[Page](siteurl/guide?b=2&a=1)", &PlaceholderAllocator::new())
///     .unwrap();
///
/// assert_eq!(output, "[Page](https://example.com/docs/guide/?a=1&b=2)");
/// ```
pub struct SiteUrlProcessor {
    site_url: String,
    params_callback: Option<Box<ParamsCallback>>,
    results: ValidationResults,
}

impl Default for SiteUrlProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SiteUrlProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteUrlProcessor")
            .field("site_url", &self.site_url)
            .field("params_callback", &self.params_callback.is_some())
            .finish_non_exhaustive()
    }
}

impl SiteUrlProcessor {
    /// Create a processor with site URL `/`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            site_url: "/".to_owned(),
            params_callback: None,
            results: ValidationResults::new(),
        }
    }

    /// Set the site URL links resolve against.
    #[must_use]
    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = url.into();
        self
    }

    /// Set a callback that adjusts the query parameters of every built URL.
    ///
    /// # Example
    ///
    /// ```
    /// use mdguard_renderer::SiteUrlProcessor;
    /// use serde_json::{Value, json};
    ///
    /// let processor = SiteUrlProcessor::new().with_params_callback(|params| {
    ///     let mut params = serde_json::Map::from_iter(
    ///         params.iter().map(|(k, v)| (k.clone(), Value::from(v.as_str()))),
    ///     );
    ///     params.insert("lang".to_owned(), json!("en"));
    ///     Value::Object(params)
    /// });
    ///
    /// let url = processor.build_url("page", Default::default()).unwrap();
    /// assert_eq!(url, "/page/?lang=en");
    /// ```
    #[must_use]
    pub fn with_params_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&BTreeMap<String, String>) -> Value + Send + Sync + 'static,
    {
        self.params_callback = Some(Box::new(callback));
        self
    }

    /// The configured site URL.
    #[must_use]
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Build a site URL from a path and query parameters.
    ///
    /// Fails when the parameters callback returns something other than an
    /// object.
    pub fn build_url(
        &self,
        path: &str,
        params: BTreeMap<String, String>,
    ) -> Result<String, ProcessorError> {
        let mut url = format!("{}/", self.site_url.trim_end_matches('/'));

        let path = path.trim_matches('/');
        if !path.is_empty() {
            url.push_str(path);
            url.push('/');
        }

        let params = self.adjust_params(params)?;
        if params.is_empty() {
            return Ok(url);
        }

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        url.push('?');
        url.push_str(&query);
        Ok(url)
    }

    fn adjust_params(
        &self,
        params: BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, ProcessorError> {
        let Some(callback) = &self.params_callback else {
            return Ok(params);
        };

        match callback(&params) {
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, stringify_param(v)))
                .collect()),
            other => Err(ProcessorError::InvalidCallbackReturn {
                found: describe_value(&other),
            }),
        }
    }

    /// Resolve the text following `siteurl` to a full URL.
    fn resolve(&self, rest: &str) -> Result<String, ProcessorError> {
        let (rest, fragment) = match rest.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (rest, None),
        };
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        let mut url = self.build_url(path, parse_query(query))?;
        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(fragment);
        }
        Ok(url)
    }

    fn rewrite(
        &self,
        content: &str,
        pattern: &Regex,
        wrap: impl Fn(&str) -> String,
    ) -> Result<String, ProcessorError> {
        let mut output = String::with_capacity(content.len());
        let mut last = 0;
        let mut count = 0usize;

        for caps in pattern.captures_iter(content) {
            let (whole, rest) = match_parts(&caps);
            output.push_str(&content[last..whole.start()]);
            output.push_str(&wrap(&self.resolve(rest)?));
            last = whole.end();
            count += 1;
        }

        if count == 0 {
            return Ok(content.to_owned());
        }

        output.push_str(&content[last..]);
        tracing::debug!(count, "Rewrote site links");
        Ok(output)
    }
}

impl Processor for SiteUrlProcessor {
    fn reset(&mut self) {
        self.results.clear();
    }

    fn pre_process(
        &mut self,
        content: &str,
        _placeholders: &PlaceholderAllocator,
    ) -> Result<String, ProcessorError> {
        let content = self.rewrite(content, &LINK_DEFINITION, |url| format!("]: {url}"))?;
        self.rewrite(&content, &INLINE_LINK, |url| format!("({url}"))
    }

    fn post_process(&mut self, _html: &mut String) {}

    fn results(&self) -> &ValidationResults {
        &self.results
    }
}

fn match_parts<'h>(caps: &Captures<'h>) -> (regex::Match<'h>, &'h str) {
    let whole = caps.get(0).expect("group 0 is always present");
    let rest = caps.get(1).map_or("", |m| m.as_str());
    (whole, rest)
}

/// Parse a query string into sorted parameters. Later duplicates win.
fn parse_query(query: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = form_decode(key);
        if key.is_empty() {
            continue;
        }
        params.insert(key, form_decode(value));
    }
    params
}

fn form_decode(s: &str) -> String {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

fn form_encode(s: &str) -> String {
    percent_encode(s.as_bytes(), QUERY_ENCODE_SET)
        .to_string()
        .replace("%20", "+")
}

fn stringify_param(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other @ (Value::Array(_) | Value::Object(_)) => other.to_string(),
    }
}

fn describe_value(value: &Value) -> String {
    let kind = match value {
        Value::Null => return "null".to_owned(),
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("{kind} `{value}`")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn rewrite(processor: &mut SiteUrlProcessor, input: &str) -> String {
        processor
            .pre_process(input, &PlaceholderAllocator::new())
            .unwrap()
    }

    #[test]
    fn test_link_definitions() {
        let mut processor = SiteUrlProcessor::new();
        let input = "[A]: siteurl?param1=value1\n\
                     [B]: siteurl/Path/To/Page\n\
                     [C]: siteurl/Path/To/Page?param2=value2&param1=value1\n\
                     [D]: siteurl";
        assert_eq!(
            rewrite(&mut processor, input),
            "[A]: /?param1=value1\n\
             [B]: /Path/To/Page/\n\
             [C]: /Path/To/Page/?param1=value1&param2=value2\n\
             [D]: /"
        );
    }

    #[test]
    fn test_inline_links() {
        let mut processor = SiteUrlProcessor::new();
        let input = "[A](siteurl?param1=value1) [B](siteurl/Path/To/Page) [C](siteurl)";
        assert_eq!(
            rewrite(&mut processor, input),
            "[A](/?param1=value1) [B](/Path/To/Page/) [C](/)"
        );
    }

    #[test]
    fn test_custom_site_url() {
        let mut processor = SiteUrlProcessor::new().with_site_url("https://127.0.0.1/webroot");
        assert_eq!(
            rewrite(&mut processor, "[A](siteurl/Path?x=1)"),
            "[A](https://127.0.0.1/webroot/Path/?x=1)"
        );
    }

    #[test]
    fn test_site_url_trailing_slash() {
        let mut processor = SiteUrlProcessor::new().with_site_url("https://example.com/");
        assert_eq!(
            rewrite(&mut processor, "[A](siteurl)"),
            "[A](https://example.com/)"
        );
    }

    #[test]
    fn test_case_insensitive() {
        let mut processor = SiteUrlProcessor::new();
        assert_eq!(rewrite(&mut processor, "[A](SiteURL/x)"), "[A](/x/)");
    }

    #[test]
    fn test_inline_link_title_preserved() {
        let mut processor = SiteUrlProcessor::new();
        assert_eq!(
            rewrite(&mut processor, r#"[A](siteurl/x "Title")"#),
            r#"[A](/x/ "Title")"#
        );
    }

    #[test]
    fn test_fragment_preserved() {
        let mut processor = SiteUrlProcessor::new();
        assert_eq!(
            rewrite(&mut processor, "[A](siteurl/x?b=1#top)"),
            "[A](/x/?b=1#top)"
        );
    }

    #[test]
    fn test_query_encoding_round_trip() {
        let mut processor = SiteUrlProcessor::new();
        assert_eq!(
            rewrite(&mut processor, "[A](siteurl?q=hello+world&path=%2Fa%2Fb)"),
            "[A](/?path=%2Fa%2Fb&q=hello+world)"
        );
    }

    #[test]
    fn test_unrelated_links_untouched() {
        let mut processor = SiteUrlProcessor::new();
        let input = "[A](https://example.com) [B]: /local";
        assert_eq!(rewrite(&mut processor, input), input);
    }

    #[test]
    fn test_params_callback() {
        let mut processor = SiteUrlProcessor::new()
            .with_site_url("https://127.0.0.1/webroot")
            .with_params_callback(|params| {
                let mut map = serde_json::Map::new();
                for (k, v) in params {
                    map.insert(k.clone(), json!(v));
                }
                map.insert("foo".to_owned(), json!("bar"));
                Value::Object(map)
            });

        assert_eq!(
            rewrite(&mut processor, "[Link1](siteurl?param1=value1)"),
            "[Link1](https://127.0.0.1/webroot/?foo=bar&param1=value1)"
        );
    }

    #[test]
    fn test_params_callback_stringifies_values() {
        let processor = SiteUrlProcessor::new()
            .with_params_callback(|_| json!({"n": 3, "b": true, "z": null}));
        assert_eq!(
            processor.build_url("", BTreeMap::new()).unwrap(),
            "/?b=true&n=3&z="
        );
    }

    #[test]
    fn test_params_callback_must_return_object() {
        let mut processor = SiteUrlProcessor::new().with_params_callback(|_| json!([1, 2]));

        let err = processor
            .pre_process("[A](siteurl)", &PlaceholderAllocator::new())
            .unwrap_err();

        assert_eq!(err.code(), ProcessorError::INVALID_CALLBACK_RETURN_VALUE);
        match err {
            ProcessorError::InvalidCallbackReturn { found } => assert_eq!(found, "array `[1,2]`"),
        }
    }

    #[test]
    fn test_params_callback_null_description() {
        let processor = SiteUrlProcessor::new().with_params_callback(|_| Value::Null);
        let err = processor.build_url("", BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("got null"));
    }

    #[test]
    fn test_callback_not_called_without_links() {
        let mut processor = SiteUrlProcessor::new().with_params_callback(|_| json!("oops"));
        assert_eq!(rewrite(&mut processor, "no links"), "no links");
    }
}
