//! Derivative-free minimisation
//!
//! Used where a Newton inversion failed to converge. Deterministic for a
//! given input.

/// Minimum found by a search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum<P> {
    /// Location of the minimum
    pub point: P,
    /// Objective value at `point`
    pub value: f64,
    /// Iterations spent
    pub iterations: usize,
}

/// Nelder-Mead simplex search in two dimensions
///
/// `step` sets the size of the initial simplex around `start`.
pub fn nelder_mead_2d<F>(
    f: F,
    start: [f64; 2],
    step: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Minimum<[f64; 2]>
where
    F: Fn([f64; 2]) -> f64,
{
    const ALPHA: f64 = 1.0;
    const GAMMA: f64 = 2.0;
    const RHO: f64 = 0.5;
    const SIGMA: f64 = 0.5;

    let mut simplex = [
        start,
        [start[0] + step, start[1]],
        [start[0], start[1] + step],
    ];
    let mut values = simplex.map(&f);
    let mut iterations = 0;

    while iterations < max_iterations {
        // Order best to worst
        let mut order = [0usize, 1, 2];
        order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));
        simplex = order.map(|i| simplex[i]);
        values = order.map(|i| values[i]);

        if (values[2] - values[0]).abs() <= tolerance {
            break;
        }
        iterations += 1;

        let centroid = [
            0.5 * (simplex[0][0] + simplex[1][0]),
            0.5 * (simplex[0][1] + simplex[1][1]),
        ];
        let along = |t: f64| {
            [
                centroid[0] + t * (simplex[2][0] - centroid[0]),
                centroid[1] + t * (simplex[2][1] - centroid[1]),
            ]
        };

        let reflected = along(-ALPHA);
        let fr = f(reflected);

        if fr < values[0] {
            let expanded = along(-GAMMA);
            let fe = f(expanded);
            if fe < fr {
                simplex[2] = expanded;
                values[2] = fe;
            } else {
                simplex[2] = reflected;
                values[2] = fr;
            }
            continue;
        }

        if fr < values[1] {
            simplex[2] = reflected;
            values[2] = fr;
            continue;
        }

        let contracted = along(RHO);
        let fc = f(contracted);
        if fc < values[2] {
            simplex[2] = contracted;
            values[2] = fc;
            continue;
        }

        // Shrink towards the best vertex
        for k in 1..3 {
            simplex[k] = [
                simplex[0][0] + SIGMA * (simplex[k][0] - simplex[0][0]),
                simplex[0][1] + SIGMA * (simplex[k][1] - simplex[0][1]),
            ];
            values[k] = f(simplex[k]);
        }
    }

    let best = (0..3)
        .min_by(|&i, &j| values[i].total_cmp(&values[j]))
        .unwrap_or(0);
    Minimum {
        point: simplex[best],
        value: values[best],
        iterations,
    }
}
