/// Errors raised while configuring or driving an indicator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndicatorError {
    #[error("{indicator}: {name} must be > 0, got {value}")]
    InvalidPeriod {
        indicator: &'static str,
        name: &'static str,
        value: usize,
    },
    #[error("{indicator}: invalid {name}: {reason}")]
    InvalidParameter {
        indicator: &'static str,
        name: &'static str,
        reason: String,
    },
    #[error("{indicator}: input columns have different lengths {lengths:?}")]
    MismatchedInputs {
        indicator: &'static str,
        lengths: Vec<usize>,
    },
    #[error("{indicator}: needs {required} samples, have {available}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        available: usize,
    },
}

impl IndicatorError {
    /// Reject a zero period.
    pub fn check_period(
        indicator: &'static str,
        name: &'static str,
        value: usize,
    ) -> Result<usize, IndicatorError> {
        if value == 0 {
            Err(IndicatorError::InvalidPeriod {
                indicator,
                name,
                value,
            })
        } else {
            Ok(value)
        }
    }
}

/// Errors that can occur while loading market data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Data not found: {0}")]
    NotFound(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_period() {
        assert_eq!(IndicatorError::check_period("SMA", "period", 5), Ok(5));
        let err = IndicatorError::check_period("SMA", "period", 0).unwrap_err();
        assert_eq!(err.to_string(), "SMA: period must be > 0, got 0");
    }
}
