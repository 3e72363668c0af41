// Search strategies: the stateless inline scorer and the persistent FTS5 index.

pub mod fts;
pub mod inline;

pub use fts::Fts5Index;
