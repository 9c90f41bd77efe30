//! Conversion between flat scalar runs and fixed-arity tuples
//!
//! The container stores every vertex attribute as one flat array. These
//! helpers split them into tuples and join them back, refusing lengths that
//! do not divide evenly instead of dropping the remainder.

use crate::error::{Error, Result};
use glam::{Vec2, Vec3, Vec4};

/// Split `data` into `N`-tuples.
///
/// `name` is only used for the error message.
pub fn transpose<T: Copy, const N: usize>(name: &str, data: &[T]) -> Result<Vec<[T; N]>> {
    if N == 0 || data.len() % N != 0 {
        return Err(Error::MalformedArray {
            name: name.to_string(),
            len: data.len(),
            arity: N,
        });
    }
    Ok(data
        .chunks_exact(N)
        .map(|chunk| std::array::from_fn(|i| chunk[i]))
        .collect())
}

/// Join tuples back into a flat run.
pub fn flatten<T: Copy, const N: usize>(tuples: &[[T; N]]) -> Vec<T> {
    tuples.as_flattened().to_vec()
}

pub fn transpose_2d(name: &str, data: &[f32]) -> Result<Vec<Vec2>> {
    Ok(transpose::<f32, 2>(name, data)?
        .into_iter()
        .map(Vec2::from_array)
        .collect())
}

pub fn transpose_3d(name: &str, data: &[f32]) -> Result<Vec<Vec3>> {
    Ok(transpose::<f32, 3>(name, data)?
        .into_iter()
        .map(Vec3::from_array)
        .collect())
}

pub fn transpose_4d(name: &str, data: &[f32]) -> Result<Vec<Vec4>> {
    Ok(transpose::<f32, 4>(name, data)?
        .into_iter()
        .map(Vec4::from_array)
        .collect())
}

pub fn flatten_2d(values: &[Vec2]) -> Vec<f32> {
    values.iter().flat_map(|v| v.to_array()).collect()
}

pub fn flatten_3d(values: &[Vec3]) -> Vec<f32> {
    values.iter().flat_map(|v| v.to_array()).collect()
}

pub fn flatten_4d(values: &[Vec4]) -> Vec<f32> {
    values.iter().flat_map(|v| v.to_array()).collect()
}
