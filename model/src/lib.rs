mod coordinate;
mod nature;
mod osm;
mod poi;

pub use coordinate::{distance, Coordinate, InvalidCoordinate};
pub use nature::{classify, NatureTag, NATURE_TAGS};
pub use osm::OsmId;
pub use poi::{Poi, Tags};
