//! Random postal addresses for houses created without one.

use fake::faker::address::raw::{BuildingNumber, CityName, StateAbbr, StreetName, ZipCode};
use fake::locales::EN;
use fake::Fake;
use rand::Rng;

/// Produces a plausible US-style address, e.g. `"742 Evergreen Terrace, Springfield, OR 97403"`.
/// Addresses are not unique.
pub fn random_address() -> String {
    random_address_with(&mut rand::rng())
}

pub fn random_address_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let number: String = BuildingNumber(EN).fake_with_rng(rng);
    let street: String = StreetName(EN).fake_with_rng(rng);
    let city: String = CityName(EN).fake_with_rng(rng);
    let state: String = StateAbbr(EN).fake_with_rng(rng);
    let zip: String = ZipCode(EN).fake_with_rng(rng);
    format!("{} {}, {}, {} {}", number, street, city, state, zip)
}
