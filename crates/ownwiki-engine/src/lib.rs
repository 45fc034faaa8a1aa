pub mod annotate;
pub mod io;
pub mod models;
pub mod sanitize;


// Re-export key types for easier usage
pub use annotate::{Rule, StyleFlags, StyledChar, StyledLine, annotate, annotate_document};
pub use io::{SaveCheck, SaveMode, StoreError};
pub use models::Article;
pub use sanitize::sanitize;
