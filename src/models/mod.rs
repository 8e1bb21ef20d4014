mod appointment;
mod comment;
mod module;
mod post;
mod user;

pub use appointment::{Appointment, AppointmentStatus, ChatKind, ChatMessage};
pub use comment::{
    Comment, contains_id, count_comments, find_comment, insert_reply, remove_node, update_content,
};
pub use module::{Module, QuizQuestion, QuizScore};
pub use post::Post;
pub use user::{Role, User, validate_password};
