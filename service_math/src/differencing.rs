//! Differencing and autoregressive recursion for ARIMA-style forecasts

use crate::{MathError, Result};

/// First differences of a series (`x[t] - x[t-1]`)
pub fn first_difference(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Apply first differencing `order` times
pub fn difference(values: &[f64], order: usize) -> Result<Vec<f64>> {
    if values.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "Differencing of order {} needs more than {} observations, got {}",
            order,
            order,
            values.len()
        )));
    }

    let mut series = values.to_vec();
    for _ in 0..order {
        series = first_difference(&series);
    }
    Ok(series)
}

/// Undo `order` rounds of differencing on forecasted values.
///
/// `history` is the undifferenced series the forecasts continue from.
pub fn integrate(history: &[f64], order: usize, forecasts: &[f64]) -> Result<Vec<f64>> {
    if history.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "Integration of order {} needs more than {} observations, got {}",
            order,
            order,
            history.len()
        )));
    }

    // lasts[k] holds the latest value of the k-th differenced series
    let mut lasts = Vec::with_capacity(order);
    let mut series = history.to_vec();
    for _ in 0..order {
        if let Some(&last) = series.last() {
            lasts.push(last);
        }
        series = first_difference(&series);
    }

    let mut levels = Vec::with_capacity(forecasts.len());
    for &forecast in forecasts {
        let mut value = forecast;
        for k in (0..order).rev() {
            value += lasts[k];
            lasts[k] = value;
        }
        levels.push(value);
    }

    Ok(levels)
}

/// Roll an AR(p) recursion forward `horizon` steps.
///
/// Each step is `intercept + sum(coefficients[i] * y[t-1-i])`, feeding its own
/// output back as history.
pub fn autoregressive_recursion(
    history: &[f64],
    intercept: f64,
    coefficients: &[f64],
    horizon: usize,
) -> Result<Vec<f64>> {
    let p = coefficients.len();
    if history.len() < p {
        return Err(MathError::InsufficientData(format!(
            "AR({}) needs at least {} observations, got {}",
            p,
            p,
            history.len()
        )));
    }

    let mut window = history[history.len() - p..].to_vec();
    let mut forecasts = Vec::with_capacity(horizon);

    for _ in 0..horizon {
        let mut forecast = intercept;
        for (i, coefficient) in coefficients.iter().enumerate() {
            forecast += coefficient * window[window.len() - 1 - i];
        }

        if !forecast.is_finite() {
            return Err(MathError::CalculationError(
                "Autoregressive recursion diverged to a non-finite value".to_string(),
            ));
        }

        window.push(forecast);
        forecasts.push(forecast);
    }

    Ok(forecasts)
}
