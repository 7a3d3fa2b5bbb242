use std::collections::BTreeMap;

use crate::{Coordinate, OsmId};

pub type Tags = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct Poi {
    pub id: OsmId,
    pub coordinate: Coordinate,
    pub tags: Tags,
}

impl Poi {
    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(|x| x.as_str())
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }
}
