pub mod post;
pub mod requests;

pub use post::{Comment, Like, LikeId, Post};
