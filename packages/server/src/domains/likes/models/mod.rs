pub mod like;

pub use like::Like;
