use dialtone_core::phone::{MOBILE_NUMBER_LEN, PhoneError, PhoneNumber};
pub use dialtone_core::session::AUTH_FAILED_MESSAGE;

/// Login form on the entry screen.
#[derive(Debug, Default, Clone)]
pub struct AuthFormState {
    pub input: String,
    /// Set by the first submit; validation errors are hidden until then.
    pub submitted: bool,
    pub failure: Option<String>,
}

impl AuthFormState {
    pub fn validate(&self) -> Result<PhoneNumber, PhoneError> {
        PhoneNumber::parse(&self.input)
    }

    /// Live indicator: `None` while empty, otherwise whether the number is valid.
    pub fn indicator(&self) -> Option<bool> {
        (!self.input.is_empty()).then(|| self.validate().is_ok())
    }

    pub fn visible_error(&self) -> Option<PhoneError> {
        if self.submitted {
            self.validate().err()
        } else {
            None
        }
    }

    /// Appends the digits of `text`, up to the maximum number length.
    pub fn insert_digits(&mut self, text: &str) {
        for c in text.chars().filter(char::is_ascii_digit) {
            if self.input.len() >= MOBILE_NUMBER_LEN {
                break;
            }
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
