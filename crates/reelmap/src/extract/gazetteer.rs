//! Built-in word lists for the rule-based entity recognizer.
//!
//! Entries are lower-case. Multi-word entries are matched token by token.

/// Cities, boroughs, states and countries, tagged as geopolitical entities.
pub const PLACES: &[&str] = &[
    // United States: cities and boroughs
    "new york", "new york city", "nyc", "manhattan", "brooklyn", "queens", "the bronx",
    "bronx", "staten island", "harlem", "los angeles", "la", "san francisco", "sf",
    "oakland", "san jose", "san diego", "sacramento", "seattle", "portland", "chicago",
    "austin", "houston", "dallas", "san antonio", "miami", "orlando", "tampa", "atlanta",
    "nashville", "memphis", "new orleans", "boston", "philadelphia", "philly",
    "pittsburgh", "baltimore", "washington", "dc", "washington dc", "denver",
    "las vegas", "phoenix", "detroit", "minneapolis", "st louis", "kansas city",
    "charleston", "savannah", "honolulu", "salt lake city", "cleveland", "columbus",
    "cincinnati", "milwaukee", "buffalo", "albuquerque", "santa fe", "anchorage",
    // United States: states
    "alabama", "alaska", "arizona", "arkansas", "california", "colorado", "connecticut",
    "delaware", "florida", "georgia", "hawaii", "idaho", "illinois", "indiana", "iowa",
    "kansas", "kentucky", "louisiana", "maine", "maryland", "massachusetts", "michigan",
    "minnesota", "mississippi", "missouri", "montana", "nebraska", "nevada",
    "new hampshire", "new jersey", "new mexico", "north carolina", "north dakota", "ohio",
    "oklahoma", "oregon", "pennsylvania", "rhode island", "south carolina",
    "south dakota", "tennessee", "texas", "utah", "vermont", "virginia",
    "west virginia", "wisconsin", "wyoming",
    // Elsewhere: cities
    "london", "paris", "rome", "naples", "milan", "florence", "venice", "bologna",
    "madrid", "barcelona", "lisbon", "porto", "berlin", "munich", "vienna", "amsterdam",
    "brussels", "copenhagen", "stockholm", "oslo", "dublin", "edinburgh", "istanbul",
    "athens", "tokyo", "osaka", "kyoto", "seoul", "busan", "beijing", "shanghai",
    "hong kong", "taipei", "singapore", "bangkok", "hanoi", "ho chi minh city",
    "kuala lumpur", "manila", "jakarta", "bali", "mumbai", "delhi", "new delhi",
    "dubai", "tel aviv", "cairo", "marrakech", "cape town", "lagos", "nairobi",
    "sydney", "melbourne", "auckland", "toronto", "montreal", "vancouver",
    "mexico city", "oaxaca", "guadalajara", "tijuana", "lima", "bogota",
    "buenos aires", "sao paulo", "rio de janeiro", "havana",
    // Countries
    "usa", "us", "united states", "america", "canada", "mexico", "uk",
    "united kingdom", "england", "scotland", "ireland", "france", "italy", "spain",
    "portugal", "germany", "austria", "netherlands", "belgium", "greece", "turkey",
    "japan", "korea", "south korea", "china", "taiwan", "thailand", "vietnam",
    "malaysia", "philippines", "indonesia", "india", "israel", "egypt", "morocco",
    "south africa", "nigeria", "kenya", "australia", "new zealand", "peru",
    "colombia", "argentina", "brazil", "cuba",
];

/// Named regions that are not political units.
pub const REGIONS: &[&str] = &[
    "midwest", "new england", "pacific northwest", "west coast", "east coast",
    "gulf coast", "bay area", "silicon valley", "napa valley", "hudson valley",
    "deep south", "southwest", "southeast asia", "middle east", "caribbean",
    "mediterranean", "scandinavia", "europe", "asia", "africa", "latin america",
    "south america", "central america", "north america",
];

/// Final words that mark a span as a geographic feature.
pub const GEO_FEATURES: &[&str] = &[
    "valley", "beach", "river", "lake", "lakes", "mountain", "mountains", "bay",
    "island", "islands", "coast", "canyon", "harbor", "harbour", "peninsula", "desert",
    "falls", "hills", "county", "district", "quarter",
];

/// Words that name a kind of food venue. Used both to classify spans as
/// organizations and to rank organization candidates.
pub const VENUE_KEYWORDS: &[&str] = &[
    "restaurant", "cafe", "bistro", "bar", "grill", "bakery", "pizzeria", "diner",
    "eatery",
];

/// Final words that mark a span of two or more words as a business name,
/// on top of [`VENUE_KEYWORDS`].
pub const BUSINESS_SUFFIXES: &[&str] = &[
    "café", "kitchen", "tavern", "pub", "brewery", "brewing", "deli", "delicatessen",
    "taqueria", "trattoria", "osteria", "cantina", "steakhouse", "smokehouse",
    "chophouse", "noodle", "noodles", "ramen", "creamery", "patisserie", "brasserie",
    "izakaya", "canteen", "cafeteria", "roastery", "roasters", "bakehouse", "bbq",
    "barbecue", "burger", "burgers", "house", "shack", "joint", "inc", "co", "llc", "ltd", "company",
];

/// Capitalized words that start sentences or titles but never names.
pub const LEADING_NOISE: &[&str] = &[
    "i", "we", "you", "they", "he", "she", "it", "my", "our", "your", "their", "his",
    "her", "this", "that", "these", "those", "the", "a", "an", "best", "amazing",
    "ultimate", "top", "trying", "tried", "try", "visiting", "visited", "visit",
    "eating", "ate", "exploring", "checking", "check", "found", "finally", "love",
    "loved", "review", "reviewing", "watch", "here", "today", "tonight", "must",
    "first", "why", "how", "what", "where", "when", "if", "so", "and", "but",
];

/// Words that break a span wherever they appear.
pub const SPAN_BREAKERS: &[&str] = &[
    "i", "we", "you", "they", "he", "she", "it", "my", "our", "your", "their", "his",
    "her", "this", "that", "these", "those",
];

/// Lower-case words allowed inside a span when a capitalized word follows.
pub const CONNECTORS: &[&str] = &["&", "of", "de", "del", "la", "le", "di", "da"];

pub fn is_place(phrase: &str) -> bool {
    PLACES.contains(&phrase)
}

pub fn is_region(phrase: &str) -> bool {
    REGIONS.contains(&phrase)
}

/// Longest `PLACES` entry is four words.
pub const MAX_PLACE_WORDS: usize = 4;
