//! Classification of content references into local and external families.
//!
//! Local references are `content://org.thoughtcrime.securesms/part/<id>` and
//! `content://org.thoughtcrime.securesms/thumb/<id>`. The route table is
//! built once and only read afterwards.

use std::sync::LazyLock;

use regex::Regex;

use super::{ContentError, ContentReference};

/// Scheme shared by local and exported references.
pub const CONTENT_SCHEME: &str = "content";

/// Authority of local, encrypted references.
pub const LOCAL_AUTHORITY: &str = "org.thoughtcrime.securesms";

/// Authority of exported, publicly dereferenceable part locators.
pub const EXPORT_AUTHORITY: &str = "org.thoughtcrime.provider.securesms";

/// What a content reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorKind {
    /// Full content of an encrypted part.
    Part(i64),
    /// Thumbnail of an encrypted part.
    Thumbnail(i64),
    /// Anything else; opened without decryption.
    External,
}

struct Route {
    path: Regex,
    kind: fn(i64) -> LocatorKind,
}

// One trailing slash is tolerated, as the local provider's matcher does.
static LOCAL_ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    let table: [(&str, fn(i64) -> LocatorKind); 2] = [
        (r"^/part/(\d+)/?$", LocatorKind::Part),
        (r"^/thumb/(\d+)/?$", LocatorKind::Thumbnail),
    ];
    table
        .into_iter()
        .filter_map(|(pattern, kind)| Regex::new(pattern).ok().map(|path| Route { path, kind }))
        .collect()
});

static EXPORT_ROUTE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^/part/(\d+)/?$").ok());

/// Digits captured by `pattern` in `path`, if the path has that shape.
fn match_digits<'a>(pattern: &Regex, path: &'a str) -> Option<&'a str> {
    pattern
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Path of a reference under `authority`, or `None` for any other authority.
fn path_under<'a>(reference: &'a ContentReference, authority: &str) -> Option<&'a str> {
    let url = reference.as_url();
    (url.scheme() == CONTENT_SCHEME && url.host_str() == Some(authority)).then(|| url.path())
}

/// Classify a reference by the first route whose shape matches.
///
/// # Errors
///
/// Returns [`ContentError::MalformedReference`] when the reference has a
/// local shape but its id does not fit an `i64`.
pub fn classify(reference: &ContentReference) -> Result<LocatorKind, ContentError> {
    let Some(path) = path_under(reference, LOCAL_AUTHORITY) else {
        return Ok(LocatorKind::External);
    };
    for route in LOCAL_ROUTES.iter() {
        if let Some(digits) = match_digits(&route.path, path) {
            let id = digits
                .parse()
                .map_err(|_| ContentError::MalformedReference(reference.to_string()))?;
            return Ok((route.kind)(id));
        }
    }
    Ok(LocatorKind::External)
}

/// Whether the reference has a local `part` or `thumb` shape.
///
/// Decided on shape alone, so a local reference with an unusable id still
/// counts as local. Local references must be exported before leaving the
/// process.
pub fn is_local(reference: &ContentReference) -> bool {
    path_under(reference, LOCAL_AUTHORITY)
        .is_some_and(|path| LOCAL_ROUTES.iter().any(|route| route.path.is_match(path)))
}

/// Build the local reference of a stored part.
///
/// # Errors
///
/// Returns [`ContentError::MalformedReference`] if the URL cannot be built.
pub fn part_reference(id: i64) -> Result<ContentReference, ContentError> {
    ContentReference::parse(&format!("{CONTENT_SCHEME}://{LOCAL_AUTHORITY}/part/{id}"))
}

/// Build the local reference of a stored part's thumbnail.
///
/// # Errors
///
/// Returns [`ContentError::MalformedReference`] if the URL cannot be built.
pub fn thumbnail_reference(id: i64) -> Result<ContentReference, ContentError> {
    ContentReference::parse(&format!("{CONTENT_SCHEME}://{LOCAL_AUTHORITY}/thumb/{id}"))
}

/// Rewrite a local part reference into its exported locator, keeping the id.
///
/// # Errors
///
/// Returns [`ContentError::NotExportable`] for anything but a local part,
/// and [`ContentError::MalformedReference`] for a part whose id overflows.
pub fn to_external_locator(reference: &ContentReference) -> Result<ContentReference, ContentError> {
    match classify(reference)? {
        LocatorKind::Part(id) => ContentReference::parse(&format!(
            "{CONTENT_SCHEME}://{EXPORT_AUTHORITY}/part/{id}"
        )),
        LocatorKind::Thumbnail(_) | LocatorKind::External => {
            Err(ContentError::NotExportable(reference.to_string()))
        }
    }
}

/// Recover the part id from an exported locator.
pub fn parse_external_id(locator: &ContentReference) -> Option<i64> {
    let path = path_under(locator, EXPORT_AUTHORITY)?;
    EXPORT_ROUTE
        .as_ref()
        .and_then(|pattern| match_digits(pattern, path))
        .and_then(|digits| digits.parse().ok())
}
