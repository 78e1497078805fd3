pub mod isbn;

pub use isbn::{CanonicalIsbn, Isbn, normalize_identifier};
