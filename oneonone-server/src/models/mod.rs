//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod email;
pub mod password;
pub mod title;
pub mod name;
pub mod comment;
pub mod color;
pub mod role;
pub mod meeting_date;

pub use validation::ValidationError;
pub use email::Email;
pub use password::{Password, MIN_PASSWORD_LEN};
pub use title::Title;
pub use name::DisplayName;
pub use comment::CommentContent;
pub use color::HexColor;
pub use role::Role;
pub use meeting_date::MeetingDate;
