//! User profile data and its mapping to and from the backend representation.

use crate::utils::{date_from_ymd, date_to_ymd, is_possibly_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeSet, HashMap};
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Lenient parsing used for legacy data: `M`, `Male`, `F`, `Female` in any case
    pub fn from_legacy(value: &str) -> Option<Gender> {
        if value.eq_ignore_ascii_case("m") || value.eq_ignore_ascii_case("male") {
            Some(Gender::Male)
        } else if value.eq_ignore_ascii_case("f") || value.eq_ignore_ascii_case("female") {
            Some(Gender::Female)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    fn from_backend(value: &str) -> Option<Gender> {
        match value {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Typed value of a custom attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CustomAttributeValue {
    String(String),
    Number(Number),
    Date(NaiveDate),
}

impl CustomAttributeValue {
    fn to_backend(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Date(d) => Value::String(date_to_ymd(d)),
        }
    }
}

/// Another installation (device) belonging to the same user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub push_registration_id: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub external_user_id: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// `None` values delete the attribute on the backend
    #[serde(default)]
    pub custom_attributes: Option<HashMap<String, Option<CustomAttributeValue>>>,
    #[serde(default)]
    pub installations: Vec<Installation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailBody {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GsmBody {
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred: Option<bool>,
}

/// User as sent to and returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<EmailBody>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsms: Option<Vec<GsmBody>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<Vec<Installation>>,
}

/// Build the request body for reporting `user_data`
pub fn to_user_body(user_data: &UserData) -> UserBody {
    UserBody {
        external_user_id: user_data.external_user_id.clone(),
        first_name: user_data.first_name.clone(),
        middle_name: user_data.middle_name.clone(),
        last_name: user_data.last_name.clone(),
        birthday: user_data.birthday.as_ref().map(date_to_ymd),
        gender: user_data.gender.map(|g| g.as_str().to_string()),
        emails: non_empty(&user_data.emails).map(|emails| {
            emails
                .iter()
                .map(|address| EmailBody {
                    address: address.clone(),
                    preferred: None,
                })
                .collect()
        }),
        gsms: non_empty(&user_data.phones).map(|phones| {
            phones
                .iter()
                .map(|number| GsmBody {
                    number: number.clone(),
                    preferred: None,
                })
                .collect()
        }),
        tags: (!user_data.tags.is_empty()).then(|| user_data.tags.clone()),
        custom_attributes: user_data
            .custom_attributes
            .as_ref()
            .map(custom_attributes_for_backend),
        instances: None,
    }
}

fn non_empty(values: &[String]) -> Option<&[String]> {
    (!values.is_empty()).then_some(values)
}

/// True if there is nothing to report
pub fn is_user_body_empty(body: Option<&UserBody>) -> bool {
    body.map(|b| *b == UserBody::default()).unwrap_or(true)
}

/// Map the backend response to [`UserData`]. Unparseable birthday or gender
/// values are dropped.
pub fn from_user_body(body: &UserBody) -> UserData {
    let birthday = body.birthday.as_deref().and_then(|s| match date_from_ymd(s) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Ignoring birthday from backend: {}", e);
            None
        }
    });

    let gender = body.gender.as_deref().and_then(|g| {
        let parsed = Gender::from_backend(g);
        if parsed.is_none() {
            warn!("Ignoring unknown gender from backend: {}", g);
        }
        parsed
    });

    UserData {
        external_user_id: body.external_user_id.clone(),
        first_name: body.first_name.clone(),
        middle_name: body.middle_name.clone(),
        last_name: body.last_name.clone(),
        gender,
        birthday,
        phones: body
            .gsms
            .as_ref()
            .map(|gsms| gsms.iter().map(|g| g.number.clone()).collect())
            .unwrap_or_default(),
        emails: body
            .emails
            .as_ref()
            .map(|emails| emails.iter().map(|e| e.address.clone()).collect())
            .unwrap_or_default(),
        tags: body.tags.clone().unwrap_or_default(),
        custom_attributes: body.custom_attributes.as_ref().map(|attrs| {
            custom_attributes_from_backend(Some(attrs))
                .into_iter()
                .map(|(k, v)| (k, Some(v)))
                .collect()
        }),
        installations: body.instances.clone().unwrap_or_default(),
    }
}

/// Dates become `yyyy-MM-dd` strings; removed attributes stay `null`.
pub fn custom_attributes_for_backend(
    attributes: &HashMap<String, Option<CustomAttributeValue>>,
) -> Map<String, Value> {
    attributes
        .iter()
        .map(|(key, value)| {
            let value = value
                .as_ref()
                .map(CustomAttributeValue::to_backend)
                .unwrap_or(Value::Null);
            (key.clone(), value)
        })
        .collect()
}

/// Strings that look like and parse as `yyyy-MM-dd` become dates. Values that
/// are neither strings nor numbers are dropped.
pub fn custom_attributes_from_backend(
    attributes: Option<&Map<String, Value>>,
) -> HashMap<String, CustomAttributeValue> {
    let Some(attributes) = attributes else {
        return HashMap::new();
    };

    attributes
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => {
                    match is_possibly_date(s).then(|| date_from_ymd(s).ok()).flatten() {
                        Some(date) => CustomAttributeValue::Date(date),
                        None => CustomAttributeValue::String(s.clone()),
                    }
                }
                Value::Number(n) => CustomAttributeValue::Number(n.clone()),
                _ => return None,
            };
            Some((key.clone(), value))
        })
        .collect()
}

/// User data migrated from the legacy storage format
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigratedUserData {
    /// `None` if the legacy data could not be read
    pub user_data: Option<UserData>,
    pub custom_attributes: Option<HashMap<String, CustomAttributeValue>>,
}

/// Convert the legacy `{externalUserId, predefinedUserData, customUserData}`
/// format into the current model.
pub fn migrate_legacy(serialized: &str) -> MigratedUserData {
    match try_migrate_legacy(serialized) {
        Ok(migrated) => migrated,
        Err(reason) => {
            error!("User data migration failed {}", reason);
            MigratedUserData::default()
        }
    }
}

fn try_migrate_legacy(serialized: &str) -> std::result::Result<MigratedUserData, String> {
    let root: Value = serde_json::from_str(serialized).map_err(|e| e.to_string())?;
    let root = root
        .as_object()
        .ok_or_else(|| "legacy user data is not an object".to_string())?;

    let mut user_data = UserData {
        external_user_id: root.get("externalUserId").and_then(value_as_string),
        ..Default::default()
    };

    if let Some(predefined) = root.get("predefinedUserData") {
        let predefined = predefined
            .as_object()
            .ok_or_else(|| "predefinedUserData is not an object".to_string())?;
        let field = |name: &str| predefined.get(name).and_then(value_as_string);

        user_data.first_name = field("firstName");
        user_data.middle_name = field("middleName");
        user_data.last_name = field("lastName");
        user_data.phones = field("msisdn").into_iter().collect();
        user_data.emails = field("email").into_iter().collect();
        if let Some(birthdate) = field("birthdate") {
            user_data.birthday = Some(date_from_ymd(&birthdate).map_err(|e| e.to_string())?);
        }
        user_data.gender = field("gender").as_deref().and_then(Gender::from_legacy);
    }

    let custom_attributes = match root.get("customUserData") {
        None | Some(Value::Null) => None,
        Some(value) => Some(legacy_custom_attributes(value)?),
    };

    Ok(MigratedUserData {
        user_data: Some(user_data),
        custom_attributes,
    })
}

/// Legacy custom data was stored as a JSON string, each value either typed
/// (`{"type":"Date","value":"2020-01-01"}`) or a plain string/number.
fn legacy_custom_attributes(
    value: &Value,
) -> std::result::Result<HashMap<String, CustomAttributeValue>, String> {
    let decoded;
    let object = match value {
        Value::String(s) => {
            decoded = serde_json::from_str::<Value>(s).map_err(|e| e.to_string())?;
            decoded
                .as_object()
                .ok_or_else(|| "customUserData is not an object".to_string())?
        }
        Value::Object(map) => map,
        _ => return Err("customUserData has unexpected type".to_string()),
    };

    let mut attributes = HashMap::new();
    let mut plain = Map::new();
    for (key, value) in object {
        match serde_json::from_value::<CustomAttributeValue>(value.clone()) {
            Ok(typed) => {
                attributes.insert(key.clone(), typed);
            }
            Err(_) => {
                plain.insert(key.clone(), value.clone());
            }
        }
    }
    attributes.extend(custom_attributes_from_backend(Some(&plain)));
    Ok(attributes)
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
