//! Writing of external label JSON files (family to variant to tags).

use std::{io::Write, path::Path};

use indexmap::IndexMap;

use crate::err::Error;

use super::{is_included, write_json_pretty, write_to_path, ProvideTagInfo};

/// Labels keyed by family ID, then variant ID.
pub type Labels = IndexMap<String, IndexMap<String, Vec<String>>>;

/// Write external label file from a `ProvideTagInfo`.
///
/// Variants without any remaining tag are skipped and families without any
/// remaining variant are omitted.
pub struct ExternalLabelWriter<'a, T: ProvideTagInfo> {
    tag_info: &'a T,
    families_to_write: Option<Vec<String>>,
    tags_to_write: Option<Vec<String>>,
}

impl<'a, T: ProvideTagInfo> ExternalLabelWriter<'a, T> {
    /// Construct new writer, `None` restrictions mean "everything".
    pub fn new(
        tag_info: &'a T,
        families_to_write: Option<Vec<String>>,
        tags_to_write: Option<Vec<String>>,
    ) -> Self {
        Self {
            tag_info,
            families_to_write,
            tags_to_write,
        }
    }

    /// Collect the labels to write.
    pub fn labels(&self) -> Result<Labels, Error> {
        let mut result = Labels::new();
        for family_id in self.tag_info.get_families() {
            if !is_included(self.families_to_write.as_deref(), &family_id) {
                continue;
            }
            let mut variants = IndexMap::new();
            for variant_id in self.tag_info.get_variants_for_family(&family_id) {
                let mut tags = self
                    .tag_info
                    .get_tags_for_family_and_variant(&family_id, &variant_id)?;
                if let Some(tags_to_write) = &self.tags_to_write {
                    tags.retain(|tag| tags_to_write.contains(tag));
                }
                if !tags.is_empty() {
                    variants.insert(variant_id, tags);
                }
            }
            if !variants.is_empty() {
                result.insert(family_id, variants);
            }
        }
        Ok(result)
    }

    pub fn write_to(&self, writer: &mut dyn Write) -> Result<usize, Error> {
        let labels = self.labels()?;
        write_json_pretty(writer, &labels)?;
        Ok(labels.len())
    }

    /// Write external label file to `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        write_to_path(path, |writer| {
            let count = self.write_to(writer)?;
            tracing::debug!("wrote labels of {} families to {:?}", count, path);
            Ok(())
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use temp_testdir::TempDir;

    use super::{ExternalLabelWriter, Labels};
    use crate::seqr::TagRegistry;

    const VALID: &str = "tests/seqr/valid_tags.tsv";

    #[rstest::fixture]
    fn registry() -> TagRegistry {
        TagRegistry::parse(&[VALID]).unwrap()
    }

    fn read_back(path: &std::path::Path) -> Result<Labels, anyhow::Error> {
        Ok(serde_json::from_reader(std::fs::File::open(path)?)?)
    }

    #[rstest::rstest]
    fn write(registry: TagRegistry) -> Result<(), anyhow::Error> {
        let tmp_dir = TempDir::default();
        let path = tmp_dir.join("labels.json");

        ExternalLabelWriter::new(&registry, None, None).write(&path)?;
        let out = read_back(&path)?;

        assert_eq!(
            out.keys().cloned().collect::<Vec<_>>(),
            vec!["single_tag", "multi_tag", "multi_var", "multi_both", "disinteresting"]
        );
        for family_id in out.keys() {
            for variant_id in registry.get_variants_for_family(family_id) {
                let tags = registry.get_tags_for_family_and_variant(family_id, &variant_id)?;
                assert_eq!(out[family_id][&variant_id], tags);
            }
        }

        Ok(())
    }

    #[rstest::rstest]
    fn write_with_families(registry: TagRegistry) -> Result<(), anyhow::Error> {
        let families = vec![String::from("multi_var"), String::from("no_tag")];

        let labels = ExternalLabelWriter::new(&registry, Some(families), None).labels()?;

        assert_eq!(labels.keys().cloned().collect::<Vec<_>>(), vec!["multi_var"]);
        assert_eq!(
            labels["multi_var"].keys().cloned().collect::<Vec<_>>(),
            vec!["1-1-A-T", "1-2-C-G"]
        );

        Ok(())
    }

    #[rstest::rstest]
    fn write_with_tags(registry: TagRegistry) -> Result<(), anyhow::Error> {
        let tags = vec![
            String::from("Tier 1 - Novel gene and phenotype"),
            String::from("Tier 2 - Known gene, new phenotype"),
        ];

        let labels = ExternalLabelWriter::new(&registry, None, Some(tags)).labels()?;

        // single_tag, no_tag, and disinteresting carry none of the tags
        assert_eq!(
            labels.keys().cloned().collect::<Vec<_>>(),
            vec!["multi_tag", "multi_var", "multi_both"]
        );
        assert_eq!(
            labels["multi_tag"]["1-1-A-T"],
            vec!["Tier 1 - Novel gene and phenotype"]
        );
        // 1-1-A-T only carries "Known gene for phenotype"
        assert_eq!(
            labels["multi_var"].keys().cloned().collect::<Vec<_>>(),
            vec!["1-2-C-G"]
        );
        assert_eq!(
            labels["multi_both"]["1-1-A-T"],
            vec!["Tier 2 - Known gene, new phenotype"]
        );
        assert_eq!(
            labels["multi_both"]["2-5-G-C"],
            vec!["Tier 2 - Known gene, new phenotype"]
        );

        Ok(())
    }

    #[rstest::rstest]
    fn write_to_format(registry: TagRegistry) -> Result<(), anyhow::Error> {
        let mut buf = Vec::new();

        ExternalLabelWriter::new(&registry, Some(vec![String::from("single_tag")]), None)
            .write_to(&mut buf)?;

        let expected = r#"{
    "single_tag": {
        "1-1-A-T": [
            "Known gene for phenotype"
        ]
    }
}"#;
        assert_eq!(String::from_utf8(buf)?, expected);

        Ok(())
    }
}
