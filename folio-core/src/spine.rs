//! Spine resolver: reading order with non-linear items demoted to the end

use crate::error::PackageError;
use crate::manifest::{is_opf, Manifest};
use crate::paths::Href;
use crate::xml::Document;

/// Partition an itemref belongs to: 0 for primary content, 1 for auxiliary
///
/// Only an explicit `linear` other than `"yes"` demotes an item.
pub fn partition_index(linear: Option<&str>) -> usize {
    match linear {
        Some(value) if value != "yes" => 1,
        _ => 0,
    }
}

/// Order `(idref, linear)` pairs: every primary entry first, then every
/// auxiliary one, each group keeping document order
pub fn order_itemrefs<'a, I>(itemrefs: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut partitions: [Vec<&str>; 2] = [Vec::new(), Vec::new()];
    for (idref, linear) in itemrefs {
        partitions[partition_index(linear)].push(idref);
    }
    let [mut primary, auxiliary] = partitions;
    primary.extend(auxiliary);
    primary
}

/// Resolve the spine of `package` through `manifest`
///
/// An idref with no manifest entry means the book is self-inconsistent and
/// fails the load instead of silently dropping the page.
pub fn load_spine(package: &Document, manifest: &Manifest) -> Result<Vec<Href>, PackageError> {
    let spine = package
        .root()
        .child(|el| is_opf(el, "spine"))
        .ok_or(PackageError::MissingElement("spine"))?;

    let itemrefs = spine
        .elements()
        .filter(|el| is_opf(el, "itemref"))
        .filter_map(|el| el.attr("idref").map(|idref| (idref, el.attr("linear"))));

    order_itemrefs(itemrefs)
        .into_iter()
        .map(|idref| {
            manifest
                .href(idref)
                .cloned()
                .ok_or_else(|| PackageError::UnknownSpineItem(idref.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::load_manifest;
    use proptest::prelude::*;

    fn package(itemrefs: &str) -> Document {
        Document::parse(
            format!(
                r#"<package xmlns="http://www.idpf.org/2007/opf">
  <manifest>
    <item id="A" href="Text/a.xhtml" media-type="application/xhtml+xml"/>
    <item id="B" href="Text/b.xhtml" media-type="application/xhtml+xml"/>
    <item id="C" href="Text/c.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>{itemrefs}</spine>
</package>"#
            )
            .as_str(),
        )
        .unwrap()
    }

    fn resolve(itemrefs: &str) -> Result<Vec<String>, PackageError> {
        let doc = package(itemrefs);
        let manifest = load_manifest(&doc)?;
        Ok(load_spine(&doc, &manifest)?
            .into_iter()
            .map(|href| href.as_str().to_string())
            .collect())
    }

    #[test]
    fn test_linear_spine_keeps_order() {
        let spine = resolve(r#"<itemref idref="A"/><itemref idref="B"/><itemref idref="C"/>"#);
        assert_eq!(spine.unwrap(), ["Text/a.xhtml", "Text/b.xhtml", "Text/c.xhtml"]);
    }

    #[test]
    fn test_non_linear_items_move_to_end() {
        let spine = resolve(
            r#"<itemref idref="A" linear="yes"/><itemref idref="B" linear="no"/><itemref idref="C"/>"#,
        );
        assert_eq!(spine.unwrap(), ["Text/a.xhtml", "Text/c.xhtml", "Text/b.xhtml"]);
    }

    #[test]
    fn test_unknown_idref_is_fatal() {
        let err = resolve(r#"<itemref idref="A"/><itemref idref="missing"/>"#).unwrap_err();
        assert!(matches!(err, PackageError::UnknownSpineItem(id) if id == "missing"));
    }

    #[test]
    fn test_missing_spine_is_fatal() {
        let doc = Document::parse(r#"<package xmlns="http://www.idpf.org/2007/opf"><manifest/></package>"#)
            .unwrap();
        let manifest = load_manifest(&doc).unwrap();
        assert!(matches!(
            load_spine(&doc, &manifest),
            Err(PackageError::MissingElement("spine"))
        ));
    }

    #[test]
    fn test_partition_index() {
        assert_eq!(partition_index(None), 0);
        assert_eq!(partition_index(Some("yes")), 0);
        assert_eq!(partition_index(Some("no")), 1);
        assert_eq!(partition_index(Some("NO")), 1);
    }

    proptest! {
        #[test]
        fn prop_primary_entries_precede_auxiliary(flags in proptest::collection::vec(any::<bool>(), 0..40)) {
            let ids: Vec<String> = (0..flags.len()).map(|i| format!("id{i}")).collect();
            let itemrefs = ids.iter().zip(&flags).map(|(id, &linear)| {
                (id.as_str(), if linear { Some("yes") } else { Some("no") })
            });
            let ordered = order_itemrefs(itemrefs);

            let mut expected: Vec<&str> = Vec::new();
            for want in [true, false] {
                for (id, linear) in ids.iter().zip(&flags) {
                    if *linear == want {
                        expected.push(id.as_str());
                    }
                }
            }
            prop_assert_eq!(ordered, expected);
        }
    }
}
