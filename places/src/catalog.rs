use crate::NearbyPlace;

type Entry = (&'static str, &'static str, f64, f64, &'static str, &'static [&'static str], f64);

#[rustfmt::skip]
const DEMO_PLACES: [Entry; 18] = [
    ("spot_001", "Riverside Park - Cherry Walk", 40.7829, -73.9654, "Riverside Park, New York, NY", &["park", "nature"], 4.8),
    ("spot_002", "Tranquil Grounds Cafe", 40.7825, -73.97, "Upper West Side, New York, NY", &["cafe", "food"], 4.6),
    ("spot_003", "Hudson River Overlook", 40.7835, -73.964, "Hudson River Park, New York, NY", &["waterfront", "park"], 4.7),
    ("spot_004", "Central Park - Conservatory Garden", 40.7945, -73.952, "Central Park, New York, NY", &["park"], 4.9),
    ("spot_005", "Public Library Reading Room", 40.7532, -73.9822, "476 5th Ave, New York, NY", &["indoor", "quiet_space"], 4.5),
    ("spot_006", "Meditation Corner - 82nd Street", 40.7845, -73.971, "82nd St, New York, NY", &["quiet_space"], 4.2),
    ("spot_007", "Riverside Park - Dog Hill", 40.789, -73.9635, "Riverside Park, New York, NY", &["park"], 4.4),
    ("spot_008", "Bloom Coffee Roasters", 40.7818, -73.972, "Columbus Ave, New York, NY", &["cafe", "food"], 4.7),
    ("spot_009", "Pier 84 - Hudson River Park", 40.765, -73.997, "Pier 84, New York, NY", &["waterfront", "park"], 4.6),
    ("spot_010", "Museum of Natural History - Quiet Halls", 40.7813, -73.974, "200 Central Park W, New York, NY", &["indoor"], 4.8),
    ("sf_001", "Golden Gate Park - Japanese Tea Garden", 37.7702, -122.4703, "Golden Gate Park, San Francisco, CA", &["park", "nature"], 4.7),
    ("sf_002", "Yerba Buena Gardens", 37.7849, -122.4024, "750 Howard St, San Francisco, CA", &["park", "quiet_space"], 4.6),
    ("sf_003", "Blue Bottle Coffee - Mint Plaza", 37.7815, -122.4094, "Mint Plaza, San Francisco, CA", &["cafe", "food"], 4.5),
    ("sf_004", "Embarcadero Waterfront", 37.7955, -122.3937, "The Embarcadero, San Francisco, CA", &["waterfront", "park"], 4.8),
    ("sf_005", "Palace of Fine Arts", 37.8026, -122.4486, "3601 Lyon St, San Francisco, CA", &["park", "scenic"], 4.8),
    ("sf_006", "San Francisco Public Library - Main", 37.7794, -122.416, "100 Larkin St, San Francisco, CA", &["indoor", "quiet_space"], 4.4),
    ("sf_007", "Crissy Field", 37.8024, -122.4645, "Crissy Field, San Francisco, CA", &["park", "waterfront"], 4.7),
    ("sf_008", "Ritual Coffee Roasters", 37.7512, -122.4214, "1026 Valencia St, San Francisco, CA", &["cafe", "food"], 4.6),
];

/// A small fixed catalog of quiet spots in New York and San Francisco.
///
/// Seeds [`InMemoryPlacesRepository`](crate::InMemoryPlacesRepository) for
/// demos and offline runs. Every entry reports itself as open.
#[must_use]
pub fn demo_catalog() -> Vec<NearbyPlace> {
    DEMO_PLACES
        .iter()
        .map(|&(id, name, lat, lng, address, types, rating)| NearbyPlace {
            id: id.to_owned(),
            name: name.to_owned(),
            lat,
            lng,
            address: address.to_owned(),
            distance_meters: 0,
            types: types.iter().map(|t| (*t).to_owned()).collect(),
            rating: Some(rating),
            is_open_now: Some(true),
        })
        .collect()
}
