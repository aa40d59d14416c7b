//! Form 16 (TDS certificate for salary) records.
//!
//! Dates inside the certificate are kept as the strings printed on the
//! form: quarters, assessment years and deposit dates use several layouts
//! and are only ever displayed, never computed with.

use super::{all_blank, lenient_string, null_as_default};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductorDetails {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pan: String,
    #[serde(deserialize_with = "lenient_string")]
    pub tan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeducteeDetails {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub pan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Period {
    #[serde(deserialize_with = "lenient_string")]
    pub from_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub to_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateDetails {
    #[serde(deserialize_with = "lenient_string")]
    pub certificate_number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_updated_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub assessment_year: String,
    #[serde(deserialize_with = "null_as_default")]
    pub period: Period,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub amount: String,
    #[serde(deserialize_with = "lenient_string")]
    pub nature: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
}

impl PaymentSummary {
    pub fn is_blank(&self) -> bool {
        all_blank(&[&self.amount, &self.nature, &self.date])
    }
}

/// One row of the quarterly TDS summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxDeductedSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub quarter: String,
    #[serde(deserialize_with = "lenient_string")]
    pub receipt_numbers: String,
    #[serde(deserialize_with = "lenient_string")]
    pub amount_of_tax_deducted: String,
    #[serde(deserialize_with = "lenient_string")]
    pub amount_of_tax_deposited: String,
}

impl TaxDeductedSummary {
    pub fn is_blank(&self) -> bool {
        all_blank(&[
            &self.quarter,
            &self.receipt_numbers,
            &self.amount_of_tax_deducted,
            &self.amount_of_tax_deposited,
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallanDetails {
    #[serde(deserialize_with = "lenient_string")]
    pub challan_identification_number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub bsr_code: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date_of_deposit: String,
    #[serde(deserialize_with = "lenient_string")]
    pub challan_serial_number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub status_of_matching_with_oltas: String,
}

impl ChallanDetails {
    pub fn is_blank(&self) -> bool {
        all_blank(&[
            &self.challan_identification_number,
            &self.bsr_code,
            &self.date_of_deposit,
            &self.challan_serial_number,
            &self.status_of_matching_with_oltas,
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxDepositDetails {
    #[serde(deserialize_with = "lenient_string")]
    pub tax_deposited_through_book_adjustment: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tax_deposited_through_challan: Vec<ChallanDetails>,
}

impl TaxDepositDetails {
    /// No book-adjustment text and no challan row with any text.
    pub fn is_blank(&self) -> bool {
        self.tax_deposited_through_book_adjustment.trim().is_empty()
            && self.tax_deposited_through_challan.iter().all(ChallanDetails::is_blank)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationDetails {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub designation: String,
    #[serde(deserialize_with = "lenient_string")]
    pub verification_statement: String,
    #[serde(deserialize_with = "lenient_string")]
    pub place_and_date_of_verification: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxDeductionDeposit {
    #[serde(deserialize_with = "lenient_string")]
    pub s_no: String,
    #[serde(deserialize_with = "lenient_string")]
    pub amount_of_tax_deducted: String,
}

impl TaxDeductionDeposit {
    pub fn is_blank(&self) -> bool {
        all_blank(&[&self.s_no, &self.amount_of_tax_deducted])
    }
}

/// A complete Form 16 certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Form16 {
    #[serde(deserialize_with = "null_as_default")]
    pub deductor_details: DeductorDetails,
    #[serde(deserialize_with = "null_as_default")]
    pub deductee_details: DeducteeDetails,
    #[serde(deserialize_with = "null_as_default")]
    pub certificate_details: CertificateDetails,
    #[serde(deserialize_with = "null_as_default")]
    pub summary_of_payment: Vec<PaymentSummary>,
    #[serde(deserialize_with = "null_as_default")]
    pub summary_of_tax_deducted_at_source: Vec<TaxDeductedSummary>,
    #[serde(deserialize_with = "null_as_default")]
    pub details_of_tax_deposited: Vec<TaxDepositDetails>,
    #[serde(deserialize_with = "null_as_default")]
    pub verification_details: VerificationDetails,
    #[serde(deserialize_with = "null_as_default")]
    pub tax_deposited_in_respect_of_deduction: Vec<TaxDeductionDeposit>,
}

impl Form16 {
    /// Remove table rows with no text, such as the placeholder row a model
    /// echoes back from the output template when a chunk has no table.
    pub fn drop_blank_rows(&mut self) {
        self.summary_of_payment.retain(|r| !r.is_blank());
        self.summary_of_tax_deducted_at_source.retain(|r| !r.is_blank());
        for deposit in &mut self.details_of_tax_deposited {
            deposit.tax_deposited_through_challan.retain(|c| !c.is_blank());
        }
        self.details_of_tax_deposited.retain(|r| !r.is_blank());
        self.tax_deposited_in_respect_of_deduction.retain(|r| !r.is_blank());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_nulls_and_numbers_are_tolerated() {
        let f: Form16 = serde_json::from_value(json!({
            "deductor_details": { "name": "Acme Pvt Ltd", "tan": null },
            "certificate_details": { "period": null, "assessment_year": "2024-25" },
            "summary_of_payment": [{ "amount": 125000.5, "nature": "Salary", "date": "" }],
            "details_of_tax_deposited": [{
                "tax_deposited_through_book_adjustment": "No",
                "tax_deposited_through_challan": null
            }],
            "tax_deposited_in_respect_of_deduction": null
        }))
        .unwrap();
        assert_eq!(f.deductor_details.name, "Acme Pvt Ltd");
        assert_eq!(f.deductor_details.tan, "");
        assert_eq!(f.certificate_details.period, Period::default());
        assert_eq!(f.summary_of_payment[0].amount, "125000.5");
        assert!(f.details_of_tax_deposited[0].tax_deposited_through_challan.is_empty());
        assert!(f.tax_deposited_in_respect_of_deduction.is_empty());
        assert_eq!(f.verification_details, VerificationDetails::default());
    }

    #[test]
    fn blank_rows_are_dropped() {
        let mut f: Form16 = serde_json::from_value(json!({
            "summary_of_payment": [
                { "amount": "", "nature": "", "date": "" },
                { "amount": "1200000", "nature": "Salary", "date": "" }
            ],
            "summary_of_tax_deducted_at_source": [
                { "quarter": " ", "receipt_numbers": null }
            ],
            "details_of_tax_deposited": [
                {
                    "tax_deposited_through_book_adjustment": "",
                    "tax_deposited_through_challan": [{ "bsr_code": "", "date_of_deposit": "" }]
                },
                {
                    "tax_deposited_through_book_adjustment": "",
                    "tax_deposited_through_challan": [
                        { "bsr_code": "" },
                        { "bsr_code": "0510032", "date_of_deposit": "07-05-2023" }
                    ]
                }
            ],
            "tax_deposited_in_respect_of_deduction": [{ "s_no": "", "amount_of_tax_deducted": "" }]
        }))
        .unwrap();

        f.drop_blank_rows();
        assert_eq!(f.summary_of_payment.len(), 1);
        assert_eq!(f.summary_of_payment[0].amount, "1200000");
        assert!(f.summary_of_tax_deducted_at_source.is_empty());
        assert_eq!(f.details_of_tax_deposited.len(), 1);
        let challans = &f.details_of_tax_deposited[0].tax_deposited_through_challan;
        assert_eq!(challans.len(), 1);
        assert_eq!(challans[0].bsr_code, "0510032");
        assert!(f.tax_deposited_in_respect_of_deduction.is_empty());
    }

    #[test]
    fn book_adjustment_alone_keeps_a_deposit_row() {
        let row = TaxDepositDetails {
            tax_deposited_through_book_adjustment: "No".into(),
            tax_deposited_through_challan: vec![ChallanDetails::default()],
        };
        assert!(!row.is_blank());
        assert!(TaxDepositDetails::default().is_blank());
    }

    #[test]
    fn default_template_shape() {
        let v = serde_json::to_value(Form16::default()).unwrap();
        assert!(v["certificate_details"]["period"]["from_date"].is_string());
        assert!(v["summary_of_payment"].as_array().unwrap().is_empty());
        assert_eq!(v.as_object().unwrap().len(), 8);
    }
}
