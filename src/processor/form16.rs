//! Form 16 merging and validation.
//!
//! Long certificates span several chunks. Header sections (deductor,
//! deductee, certificate, verification) are merged field by field, first
//! non-empty value wins. Table sections are concatenated in chunk order.

use super::DocumentKind;
use crate::dependencies::{DependencyContract, DependencyKind, DependencySpec};
use crate::error::DocExtractError;
use crate::prompts;
use crate::schema::{
    all_present, fill_string, CertificateDetails, ChallanDetails, DeducteeDetails,
    DeductorDetails, Form16, PaymentSummary, TaxDeductedSummary, TaxDeductionDeposit,
    TaxDepositDetails, VerificationDetails,
};
use serde_json::Value;
use tracing::warn;

impl DocumentKind for Form16 {
    const DOC_TYPE: &'static str = "form16";
    const SYSTEM_PROMPT: &'static str = prompts::FORM16_SYSTEM_PROMPT;

    fn user_prompt(text: &str) -> String {
        prompts::form16_prompt(text)
    }

    fn dependency_contract() -> DependencyContract {
        use DependencyKind as K;
        DependencyContract::Typed(vec![
            DependencySpec::optional(
                "deductor_details",
                K::record(["name", "address", "pan", "tan"]),
                "Deductor details",
            ),
            DependencySpec::optional(
                "deductee_details",
                K::record(["name", "address", "pan"]),
                "Deductee details",
            ),
            DependencySpec::optional(
                "certificate_details",
                K::record(["certificate_number", "last_updated_date", "assessment_year", "period"]),
                "Certificate details",
            ),
            DependencySpec::optional(
                "summary_of_payment",
                K::list_of(K::record(["amount", "nature", "date"])),
                "Summary of payment",
            ),
            DependencySpec::optional(
                "summary_of_tax_deducted_at_source",
                K::list_of(K::record([
                    "quarter",
                    "receipt_numbers",
                    "amount_of_tax_deducted",
                    "amount_of_tax_deposited",
                ])),
                "Summary of tax deducted at source",
            ),
            DependencySpec::optional(
                "details_of_tax_deposited",
                K::list_of(K::record([
                    "tax_deposited_through_book_adjustment",
                    "tax_deposited_through_challan",
                ])),
                "Details of tax deposited",
            ),
            DependencySpec::optional(
                "verification_details",
                K::record([
                    "name",
                    "designation",
                    "verification_statement",
                    "place_and_date_of_verification",
                ]),
                "Verification details",
            ),
            DependencySpec::optional(
                "tax_deposited_in_respect_of_deduction",
                K::list_of(K::record(["s_no", "amount_of_tax_deducted"])),
                "Tax deposited in respect of deduction",
            ),
        ])
    }

    /// One example row in every table so the model sees the row shape.
    fn output_template() -> Result<Value, DocExtractError> {
        let template = Form16 {
            summary_of_payment: vec![PaymentSummary::default()],
            summary_of_tax_deducted_at_source: vec![TaxDeductedSummary::default()],
            details_of_tax_deposited: vec![TaxDepositDetails {
                tax_deposited_through_book_adjustment: String::new(),
                tax_deposited_through_challan: vec![ChallanDetails::default()],
            }],
            tax_deposited_in_respect_of_deduction: vec![TaxDeductionDeposit::default()],
            ..Default::default()
        };
        Ok(serde_json::to_value(template)?)
    }

    /// Drops the empty example rows a model copies from the template when a
    /// chunk holds no table.
    fn tidy(mut self) -> Self {
        self.drop_blank_rows();
        self
    }

    fn merge(mut self, next: Self) -> Self {
        merge_deductor(&mut self.deductor_details, next.deductor_details);
        merge_deductee(&mut self.deductee_details, next.deductee_details);
        merge_certificate(&mut self.certificate_details, next.certificate_details);
        merge_verification(&mut self.verification_details, next.verification_details);
        self.summary_of_payment.extend(next.summary_of_payment);
        self.summary_of_tax_deducted_at_source
            .extend(next.summary_of_tax_deducted_at_source);
        self.details_of_tax_deposited
            .extend(next.details_of_tax_deposited);
        self.tax_deposited_in_respect_of_deduction
            .extend(next.tax_deposited_in_respect_of_deduction);
        self
    }

    fn validate(&self) -> bool {
        let d = &self.deductor_details;
        if !all_present(&[&d.name, &d.address, &d.pan, &d.tan]) {
            warn!("Form 16: missing deductor details");
            return false;
        }
        let e = &self.deductee_details;
        if !all_present(&[&e.name, &e.address, &e.pan]) {
            warn!("Form 16: missing deductee details");
            return false;
        }
        let c = &self.certificate_details;
        if !all_present(&[
            &c.certificate_number,
            &c.last_updated_date,
            &c.assessment_year,
            &c.period.from_date,
            &c.period.to_date,
        ]) {
            warn!("Form 16: missing certificate details");
            return false;
        }
        if self.summary_of_payment.is_empty() {
            warn!("Form 16: missing payment summary");
            return false;
        }
        if self.summary_of_tax_deducted_at_source.is_empty() {
            warn!("Form 16: missing tax deducted summary");
            return false;
        }
        if self.details_of_tax_deposited.is_empty() {
            warn!("Form 16: missing tax deposit details");
            return false;
        }
        let v = &self.verification_details;
        if !all_present(&[
            &v.name,
            &v.designation,
            &v.verification_statement,
            &v.place_and_date_of_verification,
        ]) {
            warn!("Form 16: missing verification details");
            return false;
        }
        if self.tax_deposited_in_respect_of_deduction.is_empty() {
            warn!("Form 16: missing tax deduction deposits");
            return false;
        }
        true
    }
}

fn merge_deductor(target: &mut DeductorDetails, next: DeductorDetails) {
    fill_string(&mut target.name, next.name);
    fill_string(&mut target.address, next.address);
    fill_string(&mut target.pan, next.pan);
    fill_string(&mut target.tan, next.tan);
}

fn merge_deductee(target: &mut DeducteeDetails, next: DeducteeDetails) {
    fill_string(&mut target.name, next.name);
    fill_string(&mut target.address, next.address);
    fill_string(&mut target.pan, next.pan);
}

fn merge_certificate(target: &mut CertificateDetails, next: CertificateDetails) {
    fill_string(&mut target.certificate_number, next.certificate_number);
    fill_string(&mut target.last_updated_date, next.last_updated_date);
    fill_string(&mut target.assessment_year, next.assessment_year);
    fill_string(&mut target.period.from_date, next.period.from_date);
    fill_string(&mut target.period.to_date, next.period.to_date);
}

fn merge_verification(target: &mut VerificationDetails, next: VerificationDetails) {
    fill_string(&mut target.name, next.name);
    fill_string(&mut target.designation, next.designation);
    fill_string(&mut target.verification_statement, next.verification_statement);
    fill_string(
        &mut target.place_and_date_of_verification,
        next.place_and_date_of_verification,
    );
}
