/// Square-root scale from country traffic totals to bubble radius, so
/// bubble area grows linearly with traffic
#[derive(Clone, Debug, PartialEq)]
pub struct RadiusScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl RadiusScale {
    pub fn new(domain_max: f64) -> Self {
        Self {
            domain: [0.0, domain_max.max(0.0)],
            range: [0.0, 1.0],
        }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    /// Replace the output range, leaving the domain untouched
    pub fn set_range(&mut self, max_radius: f64) {
        self.range = [0.0, max_radius.max(0.0)];
    }

    /// Radius for a traffic total
    pub fn radius(&self, value: f64) -> f64 {
        let d0 = self.domain[0].sqrt();
        let d1 = self.domain[1].sqrt();
        let [r0, r1] = self.range;
        let t = if d1 > d0 {
            (value.max(0.0).sqrt() - d0) / (d1 - d0)
        } else {
            0.5
        };
        r0 + (r1 - r0) * t
    }

    /// Round tick values spanning the domain
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain[0], self.domain[1], count as f64)
    }
}

/// Tick values at 1, 2 or 5 times a power of ten
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi) = if start < stop { (start, stop) } else { (stop, start) };
    let Some((i1, i2, inc)) = tick_spec(lo, hi, count) else {
        return Vec::new();
    };
    if i2 < i1 {
        return Vec::new();
    }

    let mut values: Vec<f64> = (i1..=i2)
        .map(|i| {
            if inc < 0.0 {
                i as f64 / -inc
            } else {
                i as f64 * inc
            }
        })
        .collect();
    if start > stop {
        values.reverse();
    }
    values
}

fn tick_spec(start: f64, stop: f64, count: f64) -> Option<(i64, i64, f64)> {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count;
    if !(step > 0.0) || !step.is_finite() {
        return None;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let mul = 10f64.powf(-power) / factor;
        i1 = (start * mul).round() as i64;
        i2 = (stop * mul).round() as i64;
        if (i1 as f64) / mul < start {
            i1 += 1;
        }
        if (i2 as f64) / mul > stop {
            i2 -= 1;
        }
        inc = -mul;
    } else {
        let step = 10f64.powf(power) * factor;
        i1 = (start / step).round() as i64;
        i2 = (stop / step).round() as i64;
        if (i1 as f64) * step < start {
            i1 += 1;
        }
        if (i2 as f64) * step > stop {
            i2 -= 1;
        }
        inc = step;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    Some((i1, i2, inc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_mapping() {
        let mut scale = RadiusScale::new(10_000.0);
        scale.set_range(50.0);
        assert_eq!(scale.radius(0.0), 0.0);
        assert_eq!(scale.radius(10_000.0), 50.0);
        assert!((scale.radius(2_500.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_range_keeps_domain() {
        let mut scale = RadiusScale::new(500.0);
        scale.set_range(10.0);
        scale.set_range(80.0);
        assert_eq!(scale.domain(), [0.0, 500.0]);
        assert_eq!(scale.range(), [0.0, 80.0]);
    }

    #[test]
    fn test_ticks() {
        assert_eq!(ticks(0.0, 10.0, 5.0), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(ticks(0.0, 1.0, 5.0), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(
            ticks(0.0, 3.2e8, 5.0),
            vec![0.0, 5e7, 1e8, 1.5e8, 2e8, 2.5e8, 3e8]
        );
    }

    #[test]
    fn test_ticks_degenerate() {
        assert_eq!(ticks(3.0, 3.0, 5.0), vec![3.0]);
        assert!(ticks(0.0, 1.0, 0.0).is_empty());
    }
}
