//! Comment module for filehost.
//!
//! Users comment on files they can see. Comments are removed together with
//! their file or their author.

mod repository;
mod service;
mod types;

pub use repository::CommentRepository;
pub use service::{validate_body, CommentService};
pub use types::{Comment, CommentWithAuthor, NewComment};

/// Maximum comment length (in characters).
pub const MAX_COMMENT_LENGTH: usize = 2000;
