//! Addressable priority queues: a binary heap and a binomial heap, both
//! exposing handles that stay valid across internal restructuring.

mod handle;

pub mod binary;
pub mod binomial;

pub use binary::BinaryHeap;
pub use binomial::BinomialHeap;
pub use handle::Handle;
