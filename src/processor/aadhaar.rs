use super::DocumentKind;
use crate::prompts;
use crate::schema::{all_present, fill_option, fill_string, is_digits, AadhaarBack, AadhaarFront};
use tracing::warn;

impl DocumentKind for AadhaarFront {
    const DOC_TYPE: &'static str = "aadhaar_front";
    const SYSTEM_PROMPT: &'static str = prompts::AADHAAR_FRONT_SYSTEM_PROMPT;

    fn user_prompt(text: &str) -> String {
        prompts::aadhaar_front_prompt(text)
    }

    fn merge(mut self, next: Self) -> Self {
        fill_string(&mut self.name, next.name);
        fill_option(&mut self.dob, next.dob);
        fill_string(&mut self.gender, next.gender);
        fill_string(&mut self.address, next.address);
        fill_string(&mut self.aadhaar_number, next.aadhaar_number);
        fill_string(&mut self.pincode, next.pincode);
        self
    }

    fn validate(&self) -> bool {
        if self.dob.is_none()
            || !all_present(&[&self.name, &self.gender, &self.address, &self.aadhaar_number])
        {
            warn!("Aadhaar front: missing required fields");
            return false;
        }
        if !is_digits(&self.aadhaar_number, 12) {
            warn!("Aadhaar front: aadhaar_number is not 12 digits");
            return false;
        }
        if !self.pincode.is_empty() && !is_digits(&self.pincode, 6) {
            warn!("Aadhaar front: pincode is not 6 digits");
            return false;
        }
        true
    }
}

impl DocumentKind for AadhaarBack {
    const DOC_TYPE: &'static str = "aadhaar_back";
    const SYSTEM_PROMPT: &'static str = prompts::AADHAAR_BACK_SYSTEM_PROMPT;

    fn user_prompt(text: &str) -> String {
        prompts::aadhaar_back_prompt(text)
    }

    fn merge(mut self, next: Self) -> Self {
        fill_string(&mut self.aadhaar_number, next.aadhaar_number);
        fill_string(&mut self.address, next.address);
        fill_string(&mut self.pincode, next.pincode);
        fill_string(&mut self.vid, next.vid);
        self
    }

    fn validate(&self) -> bool {
        if !is_digits(&self.aadhaar_number, 12) {
            warn!("Aadhaar back: aadhaar_number is not 12 digits");
            return false;
        }
        if self.address.trim().chars().count() < 10 {
            warn!("Aadhaar back: address is missing or too short");
            return false;
        }
        if !is_digits(&self.pincode, 6) {
            warn!("Aadhaar back: pincode is not 6 digits");
            return false;
        }
        if !self.vid.is_empty() && !is_digits(&self.vid, 16) {
            warn!("Aadhaar back: vid is not 16 digits");
            return false;
        }
        true
    }
}
