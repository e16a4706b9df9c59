use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// An argument was rejected before any state was touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The cluster boundaries no longer describe the node set.
    #[error("inconsistent state: {0}")]
    InconsistentState(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("command `{command}` requires parameter `{parameter}`")]
    MissingParameter {
        command: &'static str,
        parameter: &'static str,
    },
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}

/// Rejects radii that cannot describe a disk.
pub(crate) fn check_radius(radius: f64) -> Result<()> {
    if radius.is_nan() || radius < 0.0 {
        return Err(Error::invalid(format!(
            "radius must be a non-negative number, got {radius}"
        )));
    }
    Ok(())
}

pub(crate) fn check_point(point: &[f64; 2]) -> Result<()> {
    if point.iter().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "point must have finite coordinates, got ({}, {})",
            point[0], point[1]
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::{check_point, check_radius, Error};

    #[test]
    fn radius_validation() {
        assert!(check_radius(0.0).is_ok());
        assert!(check_radius(f64::INFINITY).is_ok());
        assert!(matches!(check_radius(-0.5), Err(Error::InvalidArgument(_))));
        assert!(matches!(check_radius(f64::NAN), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn point_validation() {
        assert!(check_point(&[1.0, -2.0]).is_ok());
        assert!(check_point(&[f64::NAN, 0.0]).is_err());
        assert!(check_point(&[0.0, f64::NEG_INFINITY]).is_err());
    }

    #[test]
    fn messages() {
        let error = Error::MissingParameter {
            command: "meteor",
            parameter: "size",
        };
        assert_eq!(
            error.to_string(),
            "command `meteor` requires parameter `size`"
        );
    }
}
