pub mod board;
pub mod transitions;
