//! Damped Newton iteration from a fixed grid of seeds.

use crate::solve::SolveOptions;

const SEEDS: [f64; 11] = [-100.0, -10.0, -3.0, -1.0, -0.5, 0.0, 0.5, 1.0, 3.0, 10.0, 100.0];
const MAX_HALVINGS: usize = 30;
/// Residual accepted for a converged root.
const ACCEPT_RESIDUAL: f64 = 1e-8;

/// Real roots of `f` reached from any seed, deduplicated and ascending.
///
/// `f` returns `None` where it is undefined; iterations that step there are
/// abandoned.
pub(crate) fn find_roots<F>(f: F, options: &SolveOptions) -> Vec<f64>
where
    F: Fn(f64) -> Option<f64>,
{
    let mut roots: Vec<f64> = Vec::new();
    for seed in SEEDS {
        if let Some(root) = iterate(&f, seed, options) {
            if !roots.iter().any(|r| same_root(*r, root)) {
                roots.push(root);
            }
        }
    }
    roots.sort_by(f64::total_cmp);
    roots
}

fn iterate<F>(f: &F, seed: f64, options: &SolveOptions) -> Option<f64>
where
    F: Fn(f64) -> Option<f64>,
{
    let mut x = seed;
    let mut fx = finite(f(x)?)?;

    for _ in 0..options.max_iterations {
        if fx.abs() <= options.tolerance {
            return Some(x);
        }
        let h = 1e-7 * (1.0 + x.abs());
        let slope = (finite(f(x + h)?)? - finite(f(x - h)?)?) / (2.0 * h);
        if slope == 0.0 || !slope.is_finite() {
            return None;
        }

        let mut step = fx / slope;
        let mut accepted = None;
        for _ in 0..MAX_HALVINGS {
            let candidate = x - step;
            if let Some(fc) = f(candidate).and_then(finite) {
                if fc.abs() < fx.abs() {
                    accepted = Some((candidate, fc));
                    break;
                }
            }
            step /= 2.0;
        }
        let (next, f_next) = accepted?;
        let moved = (next - x).abs();
        x = next;
        fx = f_next;
        if moved <= options.tolerance * (1.0 + x.abs()) {
            break;
        }
    }

    (fx.abs() <= ACCEPT_RESIDUAL).then_some(x)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn same_root(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_fixed_point_of_cosine() {
        // cos(x) = x has a single real root near 0.739
        let roots = find_roots(|x| Some(x.cos() - x), &SolveOptions::default());
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 0.739_085_133_215).abs() < 1e-9);
    }

    #[test]
    fn undefined_regions_are_skipped() {
        let roots = find_roots(
            |x| (x > 0.0).then(|| x.ln() - 1.0),
            &SolveOptions::default(),
        );
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - std::f64::consts::E).abs() < 1e-9);
    }

    #[test]
    fn no_root_means_empty() {
        let roots = find_roots(|x| Some(x.exp() + 1.0), &SolveOptions::default());
        assert!(roots.is_empty());
    }
}
