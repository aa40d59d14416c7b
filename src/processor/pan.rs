use super::DocumentKind;
use crate::dependencies::{DependencyContract, DependencyKind, DependencySpec};
use crate::prompts;
use crate::schema::{all_present, fill_option, fill_string, PanCard};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static RE_PAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").unwrap());

/// True for the issued PAN layout: five letters, four digits, one letter.
///
/// Stricter than [`DocumentKind::validate`], which only checks for ten
/// alphanumerics.
pub fn is_canonical_pan(pan: &str) -> bool {
    RE_PAN.is_match(pan)
}

impl DocumentKind for PanCard {
    const DOC_TYPE: &'static str = "pan";
    const SYSTEM_PROMPT: &'static str = prompts::PAN_SYSTEM_PROMPT;

    fn user_prompt(text: &str) -> String {
        prompts::pan_prompt(text)
    }

    /// Every printed field may be supplied up front; none is required.
    fn dependency_contract() -> DependencyContract {
        DependencyContract::Typed(vec![
            DependencySpec::optional("pan_number", DependencyKind::String, "PAN number"),
            DependencySpec::optional("name", DependencyKind::String, "Full name on PAN card"),
            DependencySpec::optional("dob", DependencyKind::String, "Date of birth"),
            DependencySpec::optional("father_name", DependencyKind::String, "Father's name"),
            DependencySpec::optional("gender", DependencyKind::String, "Gender"),
        ])
    }

    fn merge(mut self, next: Self) -> Self {
        fill_string(&mut self.pan_number, next.pan_number);
        fill_string(&mut self.name, next.name);
        fill_option(&mut self.dob, next.dob);
        fill_string(&mut self.gender, next.gender);
        fill_string(&mut self.father_name, next.father_name);
        self
    }

    fn validate(&self) -> bool {
        let pan_ok = self.pan_number.len() == 10
            && self.pan_number.bytes().all(|b| b.is_ascii_alphanumeric());
        if !pan_ok {
            warn!("PAN: pan_number is not 10 alphanumerics");
            return false;
        }
        if self.dob.is_none() || !all_present(&[&self.name, &self.father_name, &self.gender]) {
            warn!("PAN: missing required fields");
            return false;
        }
        true
    }
}
