//! Static table mapping normalized form-field names onto [`FieldKey`]s.

use crate::record::FieldKey;

/// Every known input-name variant, already normalized.
pub const FIELD_ALIASES: &[(&str, FieldKey)] = &[
    ("firstname", FieldKey::FirstName),
    ("first_name", FieldKey::FirstName),
    ("fname", FieldKey::FirstName),
    ("givenname", FieldKey::FirstName),
    ("given_name", FieldKey::FirstName),
    ("lastname", FieldKey::LastName),
    ("last_name", FieldKey::LastName),
    ("lname", FieldKey::LastName),
    ("surname", FieldKey::LastName),
    ("familyname", FieldKey::LastName),
    ("family_name", FieldKey::LastName),
    ("email", FieldKey::Email),
    ("emailaddress", FieldKey::Email),
    ("email_address", FieldKey::Email),
    ("mail", FieldKey::Email),
    ("phone", FieldKey::Phone),
    ("phonenumber", FieldKey::Phone),
    ("phone_number", FieldKey::Phone),
    ("telephone", FieldKey::Phone),
    ("tel", FieldKey::Phone),
    ("mobile", FieldKey::Phone),
    ("cell", FieldKey::Phone),
    ("address", FieldKey::Address),
    ("streetaddress", FieldKey::Address),
    ("street_address", FieldKey::Address),
    ("street", FieldKey::Address),
    ("address1", FieldKey::Address),
    ("addressline1", FieldKey::Address),
    ("city", FieldKey::City),
    ("town", FieldKey::City),
    ("locality", FieldKey::City),
    ("state", FieldKey::State),
    ("province", FieldKey::State),
    ("region", FieldKey::State),
    ("zip", FieldKey::ZipCode),
    ("zipcode", FieldKey::ZipCode),
    ("zip_code", FieldKey::ZipCode),
    ("postalcode", FieldKey::ZipCode),
    ("postal_code", FieldKey::ZipCode),
    ("postcode", FieldKey::ZipCode),
    ("country", FieldKey::Country),
    ("nation", FieldKey::Country),
    ("company", FieldKey::Company),
    ("companyname", FieldKey::Company),
    ("company_name", FieldKey::Company),
    ("organization", FieldKey::Company),
    ("organisation", FieldKey::Company),
    ("employer", FieldKey::Company),
    ("jobtitle", FieldKey::JobTitle),
    ("job_title", FieldKey::JobTitle),
    ("title", FieldKey::JobTitle),
    ("position", FieldKey::JobTitle),
    ("role", FieldKey::JobTitle),
    ("department", FieldKey::Department),
    ("dept", FieldKey::Department),
    ("division", FieldKey::Department),
    ("notes", FieldKey::Notes),
    ("comments", FieldKey::Notes),
    ("message", FieldKey::Notes),
    ("description", FieldKey::Notes),
];

/// Lowercases `raw` and strips hyphens and whitespace. Underscores are kept,
/// which is why the table carries `first_name` alongside `firstname`.
pub fn normalize_field_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Exact lookup of an already-normalized name.
pub fn lookup(normalized: &str) -> Option<FieldKey> {
    FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, key)| *key)
}

/// Normalizes `raw` and looks it up.
pub fn resolve(raw: &str) -> Option<FieldKey> {
    lookup(&normalize_field_name(raw))
}
