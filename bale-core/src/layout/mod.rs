mod element;
pub use self::element::*;
