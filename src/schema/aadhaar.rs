use super::{lenient_date, lenient_string};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fields printed on the front of an Aadhaar card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AadhaarFront {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_date")]
    pub dob: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_string")]
    pub gender: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub aadhaar_number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pincode: String,
}

/// Fields printed on the back of an Aadhaar card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AadhaarBack {
    #[serde(deserialize_with = "lenient_string")]
    pub aadhaar_number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pincode: String,
    /// 16-digit Virtual ID, often absent on older cards.
    #[serde(deserialize_with = "lenient_string")]
    pub vid: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn front_reads_indian_date_and_writes_iso() {
        let front: AadhaarFront = serde_json::from_value(json!({
            "name": "Asha Rao",
            "dob": "01/02/1990",
            "gender": "Female",
            "address": null,
            "aadhaar_number": "123456789012"
        }))
        .unwrap();
        assert_eq!(front.dob, NaiveDate::from_ymd_opt(1990, 2, 1));
        assert_eq!(front.address, "");
        assert_eq!(front.pincode, "");

        let out = serde_json::to_value(&front).unwrap();
        assert_eq!(out["dob"], "1990-02-01");
        assert_eq!(out["pincode"], "");
    }

    #[test]
    fn year_of_birth_only_leaves_dob_empty() {
        let front: AadhaarFront = serde_json::from_value(json!({
            "name": "Ravi Rao",
            "dob": "1985",
            "aadhaar_number": "123456789012"
        }))
        .unwrap();
        assert_eq!(front.dob, None);
        assert_eq!(front.name, "Ravi Rao");
    }

    #[test]
    fn default_template_has_every_key() {
        let v = serde_json::to_value(AadhaarBack::default()).unwrap();
        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        for k in ["aadhaar_number", "address", "pincode", "vid"] {
            assert!(keys.iter().any(|x| x == k), "missing {k}");
        }
    }
}
