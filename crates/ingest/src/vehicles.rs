/// Vehicles offered as scan targets.
pub const VEHICLES: &[&str] = &[
    "Ola S1 Pro (Gen 1)",
    "Ather 450X (Gen 3)",
    "TVS iQube ST",
    "Bajaj Chetak",
];

pub const DEFAULT_VEHICLE: &str = "Ola S1 Pro (Gen 1)";

pub fn is_known_vehicle(name: &str) -> bool {
    VEHICLES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_listed() {
        assert!(is_known_vehicle(DEFAULT_VEHICLE));
        assert!(!is_known_vehicle("Tesla Model 3"));
    }
}
