use serde::{Deserialize, Serialize};

/// Identification details the host layer shows for a simulated door
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryInformation {
    pub manufacturer: String,
    pub model: String,
    pub firmware_revision: String,
    /// The door name with whitespace removed, upper-cased
    pub serial_number: String,
}

impl AccessoryInformation {
    pub fn new(name: &str, manufacturer: &str, model: &str, firmware_revision: &str) -> Self {
        Self {
            manufacturer: manufacturer.to_string(),
            model: model.to_string(),
            firmware_revision: firmware_revision.to_string(),
            serial_number: serial_number_for(name),
        }
    }
}

/// Derives a serial number from a door name
pub fn serial_number_for(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_number_strips_whitespace() {
        assert_eq!(serial_number_for("Dummy Garage"), "DUMMYGARAGE");
        assert_eq!(serial_number_for(" side\tdoor 2 "), "SIDEDOOR2");
    }
}
