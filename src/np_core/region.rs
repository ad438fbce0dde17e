use serde_derive::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Region classification of nodes and fibers.
///
/// The declaration order is the precedence used when a run of links carries
/// more than one region: `Core` wins over `Metro`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Deserialize, Serialize, Display, EnumIter, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Region {
    Core,
    Metro,
}

impl Region {
    /// Picks the highest-precedence region out of a tag set.
    pub fn primary(regions: &[Region]) -> Option<Region> {
        regions.iter().min().copied()
    }

    /// Splits free-form tags into recognised regions and the remaining island tags.
    pub fn partition_tags(tags: &[String]) -> (Vec<Region>, Vec<String>) {
        let mut regions = vec![];
        let mut islands = vec![];

        for tag in tags {
            match tag.parse::<Region>() {
                Ok(region) => {
                    if !regions.contains(&region) {
                        regions.push(region);
                    }
                }
                Err(_) => islands.push(tag.clone()),
            }
        }

        regions.sort();
        (regions, islands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_takes_precedence_over_metro() {
        assert_eq!(Region::primary(&[Region::Metro, Region::Core]), Some(Region::Core));
        assert_eq!(Region::primary(&[Region::Metro]), Some(Region::Metro));
        assert_eq!(Region::primary(&[]), None);
    }

    #[test]
    fn tags_are_split_into_regions_and_islands() {
        let tags: Vec<String> = ["metro", "island_a", "CORE", "METRO"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (regions, islands) = Region::partition_tags(&tags);

        assert_eq!(regions, vec![Region::Core, Region::Metro]);
        assert_eq!(islands, vec!["island_a".to_string()]);
    }
}
