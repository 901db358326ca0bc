use crate::portal::errors::PortalError;

/// Same rule the portal applies server-side: digits only, 7 or 8 of them.
pub(crate) fn validate_dni(dni: &str) -> Result<(), PortalError> {
    let valid = (7..=8).contains(&dni.len()) && dni.chars().all(|c| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(PortalError::InvalidInput(
            "DNI inválido. Debe contener 7 u 8 dígitos sin puntos.".to_string(),
        ))
    }
}

/// Accepts exactly `http(s)://[www.]github.com/<owner>/<repo>[/]`.
pub(crate) fn validate_repository_link(link: &str) -> Result<(), PortalError> {
    if is_github_repository(link) {
        Ok(())
    } else {
        Err(PortalError::InvalidInput(
            "Por favor, ingrese un enlace válido de GitHub".to_string(),
        ))
    }
}

fn is_github_repository(link: &str) -> bool {
    let Some(rest) =
        link.strip_prefix("https://").or_else(|| link.strip_prefix("http://"))
    else {
        return false;
    };

    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let Some(path) = rest.strip_prefix("github.com/") else {
        return false;
    };

    let path = path.strip_suffix('/').unwrap_or(path);
    let mut segments = path.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(owner), Some(repo), None) => is_slug(owner) && is_slug(repo),
        _ => false,
    }
}

fn is_slug(segment: &str) -> bool {
    !segment.is_empty()
        && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dni_accepts_seven_and_eight_digits() {
        assert!(validate_dni("1234567").is_ok());
        assert!(validate_dni("12345678").is_ok());
    }

    #[test]
    fn dni_rejects_bad_shapes() {
        for dni in ["", "123456", "123456789", "12a45678", "12.345.678", "-1234567"] {
            assert!(validate_dni(dni).is_err(), "accepted {dni:?}");
        }
    }

    #[test]
    fn repository_link_accepts_github_repos() {
        for link in [
            "https://github.com/ada/final-exam",
            "https://www.github.com/ada/final-exam",
            "http://github.com/ada/final-exam",
            "https://github.com/ada/final-exam/",
            "https://github.com/ada_lovelace/exam-2026",
        ] {
            assert!(validate_repository_link(link).is_ok(), "rejected {link:?}");
        }
    }

    #[test]
    fn repository_link_rejects_everything_else() {
        for link in [
            "",
            "github.com/ada/final-exam",
            "https://gitlab.com/ada/final-exam",
            "https://github.com/ada",
            "https://github.com/ada/final-exam/tree/main",
            "https://github.com//final-exam",
            "https://github.com/ada/final exam",
            "ftp://github.com/ada/final-exam",
        ] {
            assert!(validate_repository_link(link).is_err(), "accepted {link:?}");
        }
    }
}
