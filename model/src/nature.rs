//! The tags that make a feature a "nature" point of interest.
//!
//! [`NATURE_TAGS`] is both the filter sent to the tag database and the rule
//! table for [`classify`], so the two can't drift apart. Order matters: the
//! first matching rule decides the category.

use crate::Tags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NatureTag {
    pub key: &'static str,
    pub value: &'static str,
    pub label: &'static str,
}

impl NatureTag {
    const fn new(key: &'static str, value: &'static str, label: &'static str) -> Self {
        Self { key, value, label }
    }

    /// `key=value`
    pub fn filter(&self) -> String {
        format!("{}={}", self.key, self.value)
    }

    pub fn matches(&self, tags: &Tags) -> bool {
        tags.get(self.key).is_some_and(|x| x == self.value)
    }
}

pub const NATURE_TAGS: [NatureTag; 60] = [
    NatureTag::new("leisure", "park", "Park"),
    NatureTag::new("natural", "wood", "Wood"),
    NatureTag::new("landuse", "forest", "Forest"),
    NatureTag::new("landuse", "meadow", "Meadow"),
    NatureTag::new("landuse", "recreation_ground", "Recreation Ground"),
    NatureTag::new("landuse", "winter_sports", "Winter Sports Location"),
    NatureTag::new("leisure", "beach_resort", "Beach Resort"),
    NatureTag::new("leisure", "bandstand", "Bandstand"),
    NatureTag::new("leisure", "bird_hide", "Bird Hide"),
    NatureTag::new("leisure", "disc_golf_course", "Disc Golf Course"),
    NatureTag::new("leisure", "dog_park", "Dog Park"),
    NatureTag::new("leisure", "firepit", "Firepit"),
    NatureTag::new("leisure", "fishing", "Fishing Spot"),
    NatureTag::new("leisure", "garden", "Garden"),
    NatureTag::new("leisure", "horse_riding", "Horse Riding Location"),
    NatureTag::new("leisure", "nature_reserve", "Nature Reserve"),
    NatureTag::new("leisure", "playground", "Playground"),
    NatureTag::new("leisure", "swimming_area", "Swimming Area"),
    NatureTag::new("man_made", "lighthouse", "Lighthouse"),
    NatureTag::new("man_made", "pier", "Pier"),
    NatureTag::new("natural", "fell", "Fell"),
    NatureTag::new("natural", "grassland", "Grassland"),
    NatureTag::new("natural", "heath", "Heath"),
    NatureTag::new("natural", "scrub", "Scrub"),
    NatureTag::new("natural", "beach", "Beach"),
    NatureTag::new("natural", "coastline", "Coastline"),
    NatureTag::new("natural", "geyser", "Geyser"),
    NatureTag::new("natural", "glacier", "Glacier"),
    NatureTag::new("natural", "hot_spring", "Hot Spring"),
    NatureTag::new("natural", "reef", "Reef"),
    NatureTag::new("natural", "spring", "Spring"),
    NatureTag::new("natural", "wetland", "Wetland"),
    NatureTag::new("natural", "arch", "Natural Arch"),
    NatureTag::new("natural", "cave_entrance", "Cave"),
    NatureTag::new("natural", "cliff", "Cliff"),
    NatureTag::new("natural", "dune", "Dune"),
    NatureTag::new("natural", "hill", "Hill"),
    NatureTag::new("natural", "ridge", "Ridge"),
    NatureTag::new("natural", "rock", "Rock"),
    NatureTag::new("natural", "volcano", "Volcano"),
    NatureTag::new("tourism", "camp_pitch", "Camp Pitch"),
    NatureTag::new("tourism", "camp_site", "Campsite"),
    NatureTag::new("tourism", "picnic_site", "Picnic Site"),
    NatureTag::new("tourism", "viewpoint", "Viewpoint"),
    NatureTag::new("water", "river", "River"),
    NatureTag::new("water", "lake", "Lake"),
    NatureTag::new("water", "reservoir", "Reservoir"),
    NatureTag::new("water", "pond", "Pond"),
    NatureTag::new("water", "stream_pool", "Stream Pool"),
    NatureTag::new("waterway", "river", "River"),
    NatureTag::new("waterway", "riverbank", "Riverbank"),
    NatureTag::new("waterway", "stream", "Stream"),
    NatureTag::new("waterway", "tidal_channel", "Tidal Channel"),
    NatureTag::new("waterway", "waterfall", "Waterfall"),
    NatureTag::new("amenity", "ranger_station", "Ranger Station"),
    NatureTag::new("amenity", "dive_centre", "Dive Center"),
    NatureTag::new("amenity", "hunting_stand", "Hunting Stand"),
    NatureTag::new("boundary", "forest", "Forest"),
    NatureTag::new("boundary", "national_park", "National Park"),
    NatureTag::new("boundary", "protected_area", "Protected Area"),
];

/// Category label of the first rule matching `tags`, if any.
pub fn classify(tags: &Tags) -> Option<&'static str> {
    NATURE_TAGS
        .iter()
        .find(|rule| rule.matches(tags))
        .map(|rule| rule.label)
}
