pub mod access;
pub mod assign;
pub mod binary;
pub mod unary;

// Operator evaluation lives in `impl Interpreter` blocks in each submodule
