use crate::utils::error::{AppError, Result};
use std::net::SocketAddr;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_bind_address(field_name: &str, value: &str) -> Result<()> {
    value
        .parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|e| AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Invalid socket address: {}", e),
        })
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_secret(field_name: &str, secret: &str, min_len: usize) -> Result<()> {
    if secret.contains("${") {
        return Err(AppError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    if secret.len() < min_len {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "<redacted>".to_string(),
            reason: format!("Secret must be at least {} bytes", min_len),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| AppError::MissingFieldError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AppError::ValidationError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_min<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
) -> Result<()> {
    if value < min {
        return Err(AppError::ValidationError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_bind_address() {
        assert!(validate_bind_address("server.bind", "127.0.0.1:3000").is_ok());
        assert!(validate_bind_address("server.bind", "0.0.0.0:0").is_ok());
        assert!(validate_bind_address("server.bind", "localhost").is_err());
        assert!(validate_bind_address("server.bind", "").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("limit", 1, 1, 100).is_ok());
        assert!(validate_range("limit", 100, 1, 100).is_ok());
        assert!(validate_range("limit", 0, 1, 100).is_err());
        assert!(validate_range("limit", 101, 1, 100).is_err());
    }

    #[test]
    fn test_validate_secret() {
        assert!(validate_secret("auth.jwt_secret", "0123456789abcdef", 16).is_ok());
        assert!(validate_secret("auth.jwt_secret", "short", 16).is_err());
        assert!(matches!(
            validate_secret("auth.jwt_secret", "${PORTFOLIO_JWT_SECRET}", 16),
            Err(AppError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("name", "Growth").is_ok());
        assert!(validate_non_empty_string("name", "   ").is_err());
    }
}
