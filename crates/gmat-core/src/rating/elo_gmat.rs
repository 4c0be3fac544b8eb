//! ELO ↔ GMAT score piecewise-linear mapping (§6).

/// `(elo, gmat)` anchor points, ascending by `elo`.
const ANCHORS: [(f64, f64); 9] = [
    (100.0, 200.0),
    (200.0, 300.0),
    (300.0, 400.0),
    (400.0, 480.0),
    (500.0, 550.0),
    (600.0, 620.0),
    (700.0, 690.0),
    (800.0, 750.0),
    (900.0, 800.0),
];

fn interpolate(x: f64, anchors: &[(f64, f64)]) -> f64 {
    if x <= anchors[0].0 {
        return anchors[0].1;
    }
    let last = anchors.len() - 1;
    if x >= anchors[last].0 {
        return anchors[last].1;
    }
    for window in anchors.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        if x >= x0 && x <= x1 {
            let t = (x - x0) / (x1 - x0);
            return y0 + t * (y1 - y0);
        }
    }
    unreachable!("anchors cover the full domain")
}

/// Maps an ELO-space rating in `[100, 900]` to a GMAT score, clamping
/// outside the anchor range.
pub fn elo_to_gmat(elo: i32) -> f64 {
    interpolate(elo as f64, &ANCHORS)
}

/// The inverse mapping: GMAT score to ELO-space rating.
pub fn gmat_to_elo(gmat: f64) -> f64 {
    let inverted: Vec<(f64, f64)> = ANCHORS.iter().map(|(e, g)| (*g, *e)).collect();
    interpolate(gmat, &inverted)
}
