pub mod digraph;
pub mod sampler;
pub mod seed;
pub mod transform;
pub mod translate;
pub mod tree;
pub mod word;
