//! Shared helpers

pub mod transpose;

pub use transpose::{
    flatten, flatten_2d, flatten_3d, flatten_4d, transpose, transpose_2d, transpose_3d,
    transpose_4d,
};
