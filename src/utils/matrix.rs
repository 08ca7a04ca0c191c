use ndarray::{Array2, Axis, concatenate, s};

/// Concatenate feature blocks vertically (along the row axis).
///
/// All blocks must have the same number of columns.
pub fn vstack(blocks: &[&Array2<f32>]) -> crate::Result<Array2<f32>> {
    let Some(first) = blocks.first() else {
        return Ok(Array2::<f32>::zeros((0, 0)));
    };
    let cols = first.ncols();
    for block in blocks {
        if block.ncols() != cols {
            return Err(crate::Error::ShapeMismatch {
                expected: format!("{cols} columns"),
                got: format!("{} columns", block.ncols()),
            });
        }
    }
    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    concatenate(Axis(0), &views).map_err(|e| crate::Error::ShapeMismatch {
        expected: format!("{cols} columns"),
        got: e.to_string(),
    })
}

/// Truncate two feature matrices to their common column count.
///
/// Returns the matrices unchanged when their frame counts already agree.
pub fn align_frames(a: Array2<f32>, b: Array2<f32>) -> (Array2<f32>, Array2<f32>) {
    let n = a.ncols().min(b.ncols());
    let a = if a.ncols() > n {
        a.slice(s![.., ..n]).to_owned()
    } else {
        a
    };
    let b = if b.ncols() > n {
        b.slice(s![.., ..n]).to_owned()
    } else {
        b
    };
    (a, b)
}
