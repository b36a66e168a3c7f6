pub mod array;
pub use array::Array;

pub mod bitset;
pub use bitset::BitSet;

pub mod stack;
pub use stack::Stack;
