use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of contact fields an extraction can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    State,
    ZipCode,
    Country,
    Company,
    JobTitle,
    Department,
    Notes,
}

impl FieldKey {
    pub const ALL: [FieldKey; 13] = [
        FieldKey::FirstName,
        FieldKey::LastName,
        FieldKey::Email,
        FieldKey::Phone,
        FieldKey::Address,
        FieldKey::City,
        FieldKey::State,
        FieldKey::ZipCode,
        FieldKey::Country,
        FieldKey::Company,
        FieldKey::JobTitle,
        FieldKey::Department,
        FieldKey::Notes,
    ];

    /// The camelCase name used on the wire and in the model prompt.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::FirstName => "firstName",
            FieldKey::LastName => "lastName",
            FieldKey::Email => "email",
            FieldKey::Phone => "phone",
            FieldKey::Address => "address",
            FieldKey::City => "city",
            FieldKey::State => "state",
            FieldKey::ZipCode => "zipCode",
            FieldKey::Country => "country",
            FieldKey::Company => "company",
            FieldKey::JobTitle => "jobTitle",
            FieldKey::Department => "department",
            FieldKey::Notes => "notes",
        }
    }

    pub fn from_name(name: &str) -> Option<FieldKey> {
        FieldKey::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// Short human description, used when describing the schema to the model.
    pub fn description(self) -> &'static str {
        match self {
            FieldKey::FirstName => "First name of the person",
            FieldKey::LastName => "Last name of the person",
            FieldKey::Email => "Email address",
            FieldKey::Phone => "Phone number",
            FieldKey::Address => "Street address",
            FieldKey::City => "City name",
            FieldKey::State => "State/Province",
            FieldKey::ZipCode => "ZIP/Postal code",
            FieldKey::Country => "Country name",
            FieldKey::Company => "Company/Organization name",
            FieldKey::JobTitle => "Job title/Position",
            FieldKey::Department => "Department name",
            FieldKey::Notes => "Any other relevant information",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact fields pulled out of a document.
///
/// Absent and empty values are both represented as `None` and are never
/// serialized, so a record only ever carries the keys that were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ExtractedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: FieldKey) -> &Option<String> {
        match key {
            FieldKey::FirstName => &self.first_name,
            FieldKey::LastName => &self.last_name,
            FieldKey::Email => &self.email,
            FieldKey::Phone => &self.phone,
            FieldKey::Address => &self.address,
            FieldKey::City => &self.city,
            FieldKey::State => &self.state,
            FieldKey::ZipCode => &self.zip_code,
            FieldKey::Country => &self.country,
            FieldKey::Company => &self.company,
            FieldKey::JobTitle => &self.job_title,
            FieldKey::Department => &self.department,
            FieldKey::Notes => &self.notes,
        }
    }

    fn slot_mut(&mut self, key: FieldKey) -> &mut Option<String> {
        match key {
            FieldKey::FirstName => &mut self.first_name,
            FieldKey::LastName => &mut self.last_name,
            FieldKey::Email => &mut self.email,
            FieldKey::Phone => &mut self.phone,
            FieldKey::Address => &mut self.address,
            FieldKey::City => &mut self.city,
            FieldKey::State => &mut self.state,
            FieldKey::ZipCode => &mut self.zip_code,
            FieldKey::Country => &mut self.country,
            FieldKey::Company => &mut self.company,
            FieldKey::JobTitle => &mut self.job_title,
            FieldKey::Department => &mut self.department,
            FieldKey::Notes => &mut self.notes,
        }
    }

    /// Returns the value for `key`, treating an empty string as absent.
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.slot(key).as_deref().filter(|v| !v.is_empty())
    }

    /// Sets `key` to `value`. An empty value clears the field.
    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        let value = value.into();
        *self.slot_mut(key) = if value.is_empty() { None } else { Some(value) };
    }

    #[must_use]
    pub fn with(mut self, key: FieldKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Iterates the populated fields in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> + '_ {
        FieldKey::ALL
            .into_iter()
            .filter_map(move |key| self.get(key).map(|value| (key, value)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes every field present in `other` over this record. Fields that
    /// `other` carries as an empty string are cleared.
    pub fn overlay(&mut self, other: &ExtractedRecord) {
        for key in FieldKey::ALL {
            if let Some(value) = other.slot(key) {
                self.set(key, value.clone());
            }
        }
    }
}
