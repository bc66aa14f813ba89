use crate::errors::MarketError;
use crate::types::{PricePoint, SeriesSummary};

/// Window lengths used to summarize a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SummaryWindow {
    pub ma_length: usize,
    pub period: usize,
}

impl Default for SummaryWindow {
    fn default() -> Self {
        Self {
            ma_length: super::DEFAULT_MA_LENGTH,
            period: super::DEFAULT_PERIOD,
        }
    }
}

impl SummaryWindow {
    /// Shortest series `summarize` accepts.
    pub fn min_points(&self) -> usize {
        self.period + self.ma_length + 1
    }
}

/// Reduces a newest-last series into a [`SeriesSummary`].
///
/// The most recent `period` bars form the current window; the `ma_length`
/// bars before them form the baseline. Only those bars are read, and they
/// must be well formed (finite, non-negative volume, `low <= high`).
pub fn summarize(points: &[PricePoint], window: SummaryWindow) -> Result<SeriesSummary, MarketError> {
    let SummaryWindow { ma_length, period } = window;

    if period == 0 || ma_length == 0 {
        return Err(MarketError::InvalidParameters(format!(
            "period={period} ma_length={ma_length}"
        )));
    }

    let needed = window.min_points();
    if points.len() < needed {
        return Err(MarketError::InsufficientData {
            needed,
            got: points.len(),
        });
    }

    // Newest first from here on.
    let current: Vec<&PricePoint> = points.iter().rev().take(period).collect();
    let baseline: Vec<&PricePoint> = points.iter().rev().skip(period).take(ma_length).collect();

    for p in current.iter().chain(baseline.iter()) {
        validate(p)?;
    }

    let current_volume: f64 = current.iter().map(|p| p.volume_to).sum();
    let average_volume = baseline.iter().map(|p| p.volume_to).sum::<f64>() / ma_length as f64;

    let high = current.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
    let low = current.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);

    Ok(SeriesSummary {
        high,
        low,
        average_volume,
        current_volume,
        open: current[period - 1].open,
        close: current[0].close,
    })
}

fn validate(p: &PricePoint) -> Result<(), MarketError> {
    let fields = [p.open, p.close, p.high, p.low, p.volume_to];
    if fields.iter().any(|v| !v.is_finite()) {
        return Err(MarketError::Malformed(format!("non-finite value in bar {}", p.time)));
    }
    if p.volume_to < 0.0 {
        return Err(MarketError::Malformed(format!("negative volume in bar {}", p.time)));
    }
    if p.low > p.high {
        return Err(MarketError::Malformed(format!("low above high in bar {}", p.time)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bar(time: i64, open: f64, close: f64, volume_to: f64) -> PricePoint {
        PricePoint {
            time,
            open,
            close,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            volume_from: 0.0,
            volume_to,
        }
    }

    #[test]
    fn windows_are_taken_from_the_newest_end() {
        // 1 stale bar, 14 baseline bars, 4 current bars (oldest first)
        let mut points = vec![bar(0, 1.0, 1.0, 999.0)];
        points.extend((1..=14).map(|t| bar(t, 10.0, 10.0, 2.0)));
        points.push(bar(15, 20.0, 21.0, 5.0));
        points.push(bar(16, 21.0, 22.0, 5.0));
        points.push(bar(17, 22.0, 23.0, 5.0));
        points.push(bar(18, 23.0, 24.0, 5.0));

        let s = summarize(&points, SummaryWindow::default()).unwrap();

        assert_eq!(s.open, 20.0);
        assert_eq!(s.close, 24.0);
        assert_eq!(s.current_volume, 20.0);
        assert_eq!(s.average_volume, 2.0);
        assert_eq!(s.high, 25.0);
        assert_eq!(s.low, 19.0);
    }

    #[test]
    fn short_series_is_rejected() {
        let points: Vec<_> = (0..18).map(|t| bar(t, 1.0, 1.0, 1.0)).collect();

        let err = summarize(&points, SummaryWindow::default()).unwrap_err();

        assert!(matches!(err, MarketError::InsufficientData { needed: 19, got: 18 }));
    }

    #[test]
    fn zero_windows_are_rejected() {
        let points: Vec<_> = (0..30).map(|t| bar(t, 1.0, 1.0, 1.0)).collect();
        let window = SummaryWindow {
            ma_length: 0,
            period: 4,
        };

        assert!(matches!(
            summarize(&points, window),
            Err(MarketError::InvalidParameters(_))
        ));
    }

    #[test]
    fn malformed_bars_in_window_are_rejected() {
        let mut points: Vec<_> = (0..19).map(|t| bar(t, 1.0, 1.0, 1.0)).collect();
        points[18].volume_to = -1.0;

        assert!(matches!(
            summarize(&points, SummaryWindow::default()),
            Err(MarketError::Malformed(_))
        ));
    }

    #[test]
    fn bars_outside_window_are_ignored() {
        let mut points: Vec<_> = (0..19).map(|t| bar(t, 1.0, 1.0, 1.0)).collect();
        points[0].volume_to = f64::NAN;

        assert!(summarize(&points, SummaryWindow::default()).is_ok());
    }

    fn arb_bar() -> impl Strategy<Value = PricePoint> {
        (0.0..1e6f64, 0.0..1e6f64, 0.0..1e3f64, 0.0..1e3f64, 0.0..1e9f64).prop_map(
            |(open, close, up, down, volume_to)| PricePoint {
                time: 0,
                open,
                close,
                high: open.max(close) + up,
                low: (open.min(close) - down).max(0.0),
                volume_from: 0.0,
                volume_to,
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]
        #[test]
        fn summary_invariants_hold(
            points in prop::collection::vec(arb_bar(), 19..80),
            ma_length in 1..=14usize,
            period in 1..=4usize,
        ) {
            let window = SummaryWindow { ma_length, period };
            let s = summarize(&points, window).unwrap();

            prop_assert!(s.high >= s.low);
            prop_assert!(s.average_volume >= 0.0);
            prop_assert!(s.current_volume >= 0.0);
        }
    }
}
