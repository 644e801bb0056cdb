//! Auth (entry) screen: phone number form.

mod render;
mod state;
mod update;

pub use render::{auth_lines, render_auth};
pub use state::{AUTH_FAILED_MESSAGE, AuthFormState};
pub use update::{handle_key, handle_login_finished, handle_paste};
