use super::{lenient_date, lenient_string};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fields printed on a PAN card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanCard {
    #[serde(deserialize_with = "lenient_string")]
    pub pan_number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_date")]
    pub dob: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_string")]
    pub gender: String,
    #[serde(deserialize_with = "lenient_string")]
    pub father_name: String,
}
