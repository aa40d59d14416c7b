//! System prompts and user-prompt templates for each document type.
//!
//! All prompt text lives here so wording changes touch one file and tests
//! can inspect prompts without calling a model. The output-shape contract
//! (the JSON template) is appended separately by
//! [`crate::model::GenerationRequest::system_message`].

// ── System prompts ───────────────────────────────────────────────────────────

pub const AADHAAR_FRONT_SYSTEM_PROMPT: &str = r#"You are a specialized Aadhaar card front parser. Your task is to extract information from the OCR text of an Aadhaar card front and structure it according to the specified format.

Rules:
- Copy names and addresses as printed; fix obvious OCR spacing only.
- The Aadhaar number is 12 digits; return it without spaces.
- Write dates as YYYY-MM-DD.
- If a field is not present in the text, return null for it."#;

pub const AADHAAR_BACK_SYSTEM_PROMPT: &str = r#"You are a specialized Aadhaar back parser. Extract the following information from the OCR text of an Aadhaar card back:
- Aadhaar number (12 digits, no spaces)
- Complete address
- Pincode (6 digits)
- VID number (16 digits, no spaces)

Ensure all extracted information is accurate and properly formatted. If a field is not found, return null for it."#;

pub const PAN_SYSTEM_PROMPT: &str = r#"You are a specialized PAN card parser. Your task is to extract information from PAN card documents and structure it according to the specified format. Please extract:
- PAN number (10 character alphanumeric)
- Full name as shown on card
- Date of birth (YYYY-MM-DD)
- Father's name
- Gender

Ensure all extracted information is accurate and properly formatted."#;

pub const FORM16_SYSTEM_PROMPT: &str = r#"You are a specialized Form 16 parser. Your task is to extract information from Form 16 (TDS certificate) text and structure it according to the specified format.

Rules:
- Keep amounts, dates and identifiers exactly as printed.
- Each table row becomes one element of the corresponding list.
- You may receive only part of the certificate. Fill what this part contains and leave the rest blank or as empty lists."#;

// ── User prompts ─────────────────────────────────────────────────────────────

pub fn aadhaar_front_prompt(text: &str) -> String {
    format!(
        "Please extract and structure the following Aadhaar card front text.\n\n\
         Document Text:\n{text}\n\n\
         Please extract all required information and format it according to the specified structure, including:\n\
         - Name\n\
         - Date of Birth\n\
         - Gender\n\
         - Address\n\
         - Aadhaar Number\n\
         - Pincode\n\
         If fields are not found, return null."
    )
}

pub fn aadhaar_back_prompt(text: &str) -> String {
    format!(
        "Please extract and structure the following Aadhaar back text.\n\n\
         Document Text:\n{text}\n\n\
         Please extract all required information and format it according to the specified structure, including:\n\
         - Aadhaar number (12 digits)\n\
         - Complete address\n\
         - Pincode (6 digits)\n\
         - VID number\n\
         If fields are not found, return null."
    )
}

pub fn pan_prompt(text: &str) -> String {
    format!(
        "Please extract and structure the following PAN card text.\n\n\
         Document Text:\n{text}\n\n\
         Please extract all required information and format it according to the specified structure, including:\n\
         - PAN number\n\
         - Full name\n\
         - Date of birth\n\
         - Father's name\n\
         - Gender\n\
         If not able to find, leave it blank."
    )
}

pub fn form16_prompt(text: &str) -> String {
    format!(
        "Please extract and structure the following Form 16 text.\n\n\
         Document Text:\n{text}\n\n\
         Please extract all required information and format it according to the specified structure, including:\n\
         - Deductor details (employer's information)\n\
         - Deductee details (employee's information)\n\
         - Certificate details\n\
         - Payment summaries\n\
         - Tax deduction summaries\n\
         - Tax deposit details\n\
         - Verification details\n\
         - Tax deduction deposits\n\
         If not able to find, leave it blank."
    )
}
