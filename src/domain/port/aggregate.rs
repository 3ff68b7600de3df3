//! Port aggregate entity.
//!
//! A port is a geographic harbor identified by its UN/LOCODE-style key.
//! Ports are value objects: every change produces a new `Port`, so a
//! stored instance is never observed half-updated by a concurrent reader.

use crate::domain::foundation::ValidationError;

/// Field name reported when the identifier is missing.
pub const FIELD_ID: &str = "port id";
/// Field name reported when the name is missing.
pub const FIELD_NAME: &str = "port name";
/// Field name reported when the city is missing.
pub const FIELD_CITY: &str = "port city";
/// Field name reported when the country is missing.
pub const FIELD_COUNTRY: &str = "port country";

/// Descriptive attributes of a port, everything except its identifier.
///
/// This is the unvalidated input to [`Port::new`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortAttributes {
    pub name: String,
    pub code: String,
    pub city: String,
    pub country: String,
    pub alias: Vec<String>,
    pub regions: Vec<String>,
    /// `[lat, lon]` by convention, length is not enforced.
    pub coordinates: Vec<f64>,
    pub province: String,
    pub timezone: String,
    pub unlocs: Vec<String>,
}

/// Port aggregate.
///
/// # Invariants
///
/// - `id`, `name`, `city` and `country` are non-empty
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    id: String,
    name: String,
    code: String,
    city: String,
    country: String,
    alias: Vec<String>,
    regions: Vec<String>,
    coordinates: Vec<f64>,
    province: String,
    timezone: String,
    unlocs: Vec<String>,
}

impl Port {
    /// Create a validated port.
    ///
    /// # Errors
    ///
    /// - `EmptyField` naming the first empty required field, checked in the
    ///   order id, name, city, country
    pub fn new(id: impl Into<String>, attributes: PortAttributes) -> Result<Self, ValidationError> {
        let id = id.into();
        Self::validate_required(&id, &attributes)?;

        let PortAttributes {
            name,
            code,
            city,
            country,
            alias,
            regions,
            coordinates,
            province,
            timezone,
            unlocs,
        } = attributes;

        Ok(Self {
            id,
            name,
            code,
            city,
            country,
            alias,
            regions,
            coordinates,
            province,
            timezone,
            unlocs,
        })
    }

    fn validate_required(id: &str, attributes: &PortAttributes) -> Result<(), ValidationError> {
        let required = [
            (FIELD_ID, id),
            (FIELD_NAME, attributes.name.as_str()),
            (FIELD_CITY, attributes.city.as_str()),
            (FIELD_COUNTRY, attributes.country.as_str()),
        ];

        match required.iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(ValidationError::empty_field(*field)),
            None => Ok(()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn alias(&self) -> &[String] {
        &self.alias
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    pub fn province(&self) -> &str {
        &self.province
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn unlocs(&self) -> &[String] {
        &self.unlocs
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Modifications
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns a copy of this port carrying a new name.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if `name` is empty
    pub fn with_name(&self, name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::empty_field(FIELD_NAME));
        }
        Ok(Self {
            name,
            ..self.clone()
        })
    }
}
