pub mod normalize;

pub use normalize::{clean_relative_path, to_slash, PathError};
