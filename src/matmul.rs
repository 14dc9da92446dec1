//! Small GEMM wrapper used by batched inference.
//!
//! - default: a simple, safe triple-loop implementation
//! - optional: a faster backend via the `matrixmultiply` feature
//!
//! Computes `C = alpha * A * B + beta * C` with `A: (m, k)`, `B: (k, n)`, `C: (m, n)`
//! addressed through explicit row/column strides.

#[allow(clippy::too_many_arguments)]
#[inline]
pub(crate) fn gemm_f32(
    m: usize,
    n: usize,
    k: usize,
    alpha: f32,
    a: &[f32],
    rsa: usize,
    csa: usize,
    b: &[f32],
    rsb: usize,
    csb: usize,
    beta: f32,
    c: &mut [f32],
    rsc: usize,
    csc: usize,
) {
    debug_assert!(m > 0 && n > 0 && k > 0);
    debug_assert!(a.len() >= (m - 1) * rsa + (k - 1) * csa + 1);
    debug_assert!(b.len() >= (k - 1) * rsb + (n - 1) * csb + 1);
    debug_assert!(c.len() >= (m - 1) * rsc + (n - 1) * csc + 1);

    #[cfg(feature = "matrixmultiply")]
    {
        // SAFETY: callers uphold the strided bounds asserted above.
        unsafe {
            matrixmultiply::sgemm(
                m,
                k,
                n,
                alpha,
                a.as_ptr(),
                rsa as isize,
                csa as isize,
                b.as_ptr(),
                rsb as isize,
                csb as isize,
                beta,
                c.as_mut_ptr(),
                rsc as isize,
                csc as isize,
            );
        }
    }

    #[cfg(not(feature = "matrixmultiply"))]
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0_f32;
            let a0 = i * rsa;
            let b0 = j * csb;

            for p in 0..k {
                let av = a[a0 + p * csa];
                let bv = b[p * rsb + b0];
                acc = av.mul_add(bv, acc);
            }

            let idx = i * rsc + j * csc;
            c[idx] = alpha * acc + beta * c[idx];
        }
    }
}
