// Client record for the Client API
// The single domain type, plus the partial-update merge rule

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned client identifier
///
/// A plain integer on the wire (`"id": 3`) and in the `{clientId}` path
/// segment, so an alias reads better than a newtype here.
pub type ClientId = i64;

/// A client record
///
/// Every string field is free-form. Fields missing from an incoming JSON body
/// (or set to `null`) decode as the empty string, which the update merge
/// treats as "not supplied". The `id` is always assigned by storage; whatever
/// a caller sends is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Client {
    #[serde(deserialize_with = "null_as_default")]
    pub id: ClientId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cpf: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub birthdate: String,
}

/// Decode an explicit JSON `null` the same way as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Client {
    /// Apply a partial update
    ///
    /// Only non-empty fields of `patch` overwrite the stored values; the `id`
    /// never changes. PUT requests use this despite the verb, so a body of
    /// `{"name": "B"}` leaves the other fields as they were.
    pub fn merge(&mut self, patch: &Client) {
        fn overwrite(current: &mut String, incoming: &str) {
            if !incoming.is_empty() {
                *current = incoming.to_string();
            }
        }

        overwrite(&mut self.name, &patch.name);
        overwrite(&mut self.cpf, &patch.cpf);
        overwrite(&mut self.email, &patch.email);
        overwrite(&mut self.phone, &patch.phone);
        overwrite(&mut self.birthdate, &patch.birthdate);
    }

    /// Return the record with its ID replaced
    pub fn with_id(mut self, id: ClientId) -> Self {
        self.id = id;
        self
    }
}
