//! Local/external classification and exported locators.

use courier::content::locator::{
    classify, is_local, parse_external_id, part_reference, thumbnail_reference,
    to_external_locator, LocatorKind,
};
use courier::content::ContentError;

use crate::support::reference;

#[test]
fn only_part_and_thumb_shapes_are_local() {
    let cases = [
        ("content://org.thoughtcrime.securesms/part/1", true),
        ("content://org.thoughtcrime.securesms/thumb/1", true),
        ("content://org.thoughtcrime.securesms/part/42/", true),
        ("content://org.thoughtcrime.securesms/thumb/42/", true),
        ("content://org.thoughtcrime.securesms/part/42?x=1", true),
        ("content://org.thoughtcrime.securesms/part/99999999999999999999", true),
        ("content://org.thoughtcrime.securesms/part/", false),
        ("content://org.thoughtcrime.securesms/parts/1", false),
        ("content://org.thoughtcrime.provider.securesms/part/1", false),
        ("content://media/external/images/media/1", false),
        ("file:///sdcard/DCIM/1.jpg", false),
        ("https://cdn.example/part/1", false),
    ];
    for (raw, expected) in cases {
        assert_eq!(is_local(&reference(raw)), expected, "{raw}");
    }
}

#[test]
fn constructed_references_classify_back() {
    let part = part_reference(123).expect("part reference");
    let thumb = thumbnail_reference(123).expect("thumbnail reference");
    assert_eq!(classify(&part).expect("classify"), LocatorKind::Part(123));
    assert_eq!(
        classify(&thumb).expect("classify"),
        LocatorKind::Thumbnail(123)
    );
}

#[test]
fn exported_locator_preserves_the_part_id() {
    for id in [0, 1, 42, 9_000_000_000] {
        let local = part_reference(id).expect("part reference");
        let exported = to_external_locator(&local).expect("part should export");
        assert!(!is_local(&exported));
        assert_eq!(
            exported.as_str(),
            format!("content://org.thoughtcrime.provider.securesms/part/{id}")
        );
        assert_eq!(parse_external_id(&exported), Some(id));
    }
}

#[test]
fn external_references_cannot_be_exported() {
    let result = to_external_locator(&reference("file:///tmp/a.png"));
    assert!(matches!(result, Err(ContentError::NotExportable(_))));
}

#[test]
fn parse_external_id_rejects_local_references() {
    let local = part_reference(5).expect("part reference");
    assert_eq!(parse_external_id(&local), None);
}

#[test]
fn malformed_references_are_rejected() {
    let result = courier::content::ContentReference::parse("not a url");
    assert!(matches!(result, Err(ContentError::MalformedReference(_))));
}

#[test]
fn trailing_slash_keeps_the_id() {
    let kind = classify(&reference("content://org.thoughtcrime.securesms/part/42/"))
        .expect("classify");
    assert_eq!(kind, LocatorKind::Part(42));

    let exported = to_external_locator(&reference(
        "content://org.thoughtcrime.securesms/part/42/",
    ))
    .expect("part should export");
    assert_eq!(parse_external_id(&exported), Some(42));
    assert_eq!(
        parse_external_id(&reference(
            "content://org.thoughtcrime.provider.securesms/part/42/"
        )),
        Some(42)
    );
}

#[test]
fn overflowing_local_id_is_malformed_not_external() {
    let oversized = reference("content://org.thoughtcrime.securesms/part/99999999999999999999");
    assert!(is_local(&oversized));
    assert!(matches!(
        classify(&oversized),
        Err(ContentError::MalformedReference(_))
    ));
    assert!(matches!(
        to_external_locator(&oversized),
        Err(ContentError::MalformedReference(_))
    ));
}
