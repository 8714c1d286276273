//! We can have a little hard-coded config, [as a
//! snack](https://knowyourmeme.com/memes/cats-can-have-a-little-salami).

/// Nominatim search endpoint. The public instance takes no credentials, but
/// it does insist on an identifying user-agent ([`GEOCODER_USER_AGENT`]).
pub const GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

pub const GEOCODER_USER_AGENT: &str = "brokerio/1.0";

/// Upper bound on a single geocoding request. Nominatim usually answers in
/// well under a second; anything slower gets treated as "no match."
pub const GEOCODER_TIMEOUT_SECS: u64 = 10;
