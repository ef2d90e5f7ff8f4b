//! Catalog walk: source -> zone -> region -> subregion leaves.

use std::{fmt, str::FromStr};

use crate::config::Source;

/// A name transform from `filenames.transform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Lowercase,
    SpaceDash,
}

impl FromStr for Transform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowercase" => Ok(Transform::Lowercase),
            "spacedash" => Ok(Transform::SpaceDash),
            other => Err(format!("unknown name transform `{}`", other)),
        }
    }
}

impl Transform {
    #[inline]
    pub fn apply(self, name: &str) -> String {
        match self {
            Transform::Lowercase => name.to_lowercase(),
            Transform::SpaceDash => name.replace(' ', "-"),
        }
    }
}

/// Parse `"lowercase,spacedash"`; blanks between commas are ignored.
pub fn parse_transforms(list: &str) -> Result<Vec<Transform>, String> {
    list.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Apply `transforms` left to right.
pub fn apply_transforms(transforms: &[Transform], name: &str) -> String {
    transforms
        .iter()
        .fold(name.to_owned(), |acc, t| t.apply(&acc))
}

/// One processing unit of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub source: String,
    pub zone: String,
    pub region: String,
    /// Raw subregion name as written in the catalog.
    pub subregion: String,
    /// Key of the subregion in the `id -> name` form.
    pub id: Option<String>,
    /// Subregion name after the transforms.
    pub name: String,
}

impl Leaf {
    /// Substitution slots shared by every pattern of this leaf.
    pub fn tokens(&self) -> Vec<(&str, &str)> {
        vec![
            ("zone", self.zone.as_str()),
            ("region", self.region.as_str()),
            ("subregion", self.subregion.as_str()),
            ("name", self.name.as_str()),
            ("id", self.id.as_deref().unwrap_or(&self.subregion)),
        ]
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.source, self.zone, self.region, self.subregion
        )
    }
}

/// Every leaf of `source`, in catalog order.
pub fn expand(source: &Source) -> Vec<Leaf> {
    let mut leaves = Vec::new();

    for (zone, regions) in &source.config.zones {
        for (region, subregions) in regions {
            for (id, subregion) in subregions.leaves() {
                leaves.push(Leaf {
                    source: source.name.clone(),
                    zone: zone.clone(),
                    region: region.clone(),
                    subregion: subregion.to_owned(),
                    id: id.map(str::to_owned),
                    name: apply_transforms(&source.transforms, subregion),
                });
            }
        }
    }

    leaves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_catalog;
    use std::path::Path;

    fn source(zones: &str, transform: &str) -> Source {
        let text = format!(
            r#"{{ "s": {{ "zones": {}, "filenames": {{ "transform": "{}" }} }} }}"#,
            zones, transform
        );
        parse_catalog(&text, Path::new("zones.json"))
            .unwrap()
            .remove(0)
    }

    #[test]
    fn named_subregions_give_one_leaf_each() {
        let src = source(r#"{ "z": { "r": { "a": "Alpha", "b": "Beta" } } }"#, "");
        let leaves = expand(&src);

        let names: Vec<_> = leaves.iter().map(|l| l.subregion.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
        assert_eq!(leaves[0].id.as_deref(), Some("a"));
    }

    #[test]
    fn leaves_follow_file_order() {
        let src = source(
            r#"{ "oceania": { "nz": { "wk": "Waikato", "ak": "Auckland" }, "au": "Tasmania" },
                 "africa": { "za": ["Western Cape", "Gauteng"] } }"#,
            "",
        );
        let leaves: Vec<_> = expand(&src).iter().map(|l| l.to_string()).collect();
        assert_eq!(
            leaves,
            vec![
                "s/oceania/nz/Waikato",
                "s/oceania/nz/Auckland",
                "s/oceania/au/Tasmania",
                "s/africa/za/Western Cape",
                "s/africa/za/Gauteng",
            ]
        );
    }

    #[test]
    fn single_subregion_gives_one_leaf() {
        let src = source(r#"{ "z": { "r": "Central" } }"#, "");
        let leaves = expand(&src);

        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].subregion, "Central");
        assert_eq!(leaves[0].id, None);
        assert_eq!(leaves[0].to_string(), "s/z/r/Central");
    }

    #[test]
    fn transforms_apply_in_order() {
        let src = source(r#"{ "z": { "r": "New South Wales" } }"#, "lowercase, spacedash");
        assert_eq!(expand(&src)[0].name, "new-south-wales");

        let none = source(r#"{ "z": { "r": "New South Wales" } }"#, "");
        assert_eq!(expand(&none)[0].name, "New South Wales");
    }

    #[test]
    fn unknown_transform_fails_to_parse() {
        assert!(parse_transforms("lowercase,upside-down").is_err());
        assert!(parse_transforms(" , ").unwrap().is_empty());
    }

    #[test]
    fn tokens_fall_back_to_subregion_for_id() {
        let src = source(r#"{ "europe": { "germany": "Berlin" } }"#, "lowercase");
        let leaf = &expand(&src)[0];
        let text = zonekit::substitute("{zone}/{region}/{id}/{name}", leaf.tokens());
        assert_eq!(text, "europe/germany/Berlin/berlin");
    }
}
