use super::label::{is_valid_label, Label};
use crate::error::{DeployError, DeployResult};
use crate::logging::Logger;

const INCREMENT_MARKER: &str = "++";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionTemplate<'a> {
    /// `<prefix>++`: one more than the highest deployed `<prefix><n>`.
    Incremental { prefix: &'a str },
    Literal(&'a str),
}

pub fn parse_template(template: &str) -> VersionTemplate<'_> {
    match template.strip_suffix(INCREMENT_MARKER) {
        Some(prefix) => VersionTemplate::Incremental { prefix },
        None => VersionTemplate::Literal(template),
    }
}

/// Number of `<prefix><n>` or `<prefix><n>-<label>` at the end of `id`.
pub fn deployed_number(prefix: &str, id: &str) -> Option<u64> {
    // Every start offset is tried: occurrences of the prefix may overlap.
    id.char_indices()
        .map(|(start, _)| start)
        .filter(|&start| id[start..].starts_with(prefix))
        .find_map(|start| {
            let rest = &id[start + prefix.len()..];
            let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            if digits == 0 {
                return None;
            }

            let suffix = &rest[digits..];
            let suffix_ok = match suffix.strip_prefix('-') {
                Some(label) => is_valid_label(label),
                None => suffix.is_empty(),
            };
            if !suffix_ok {
                return None;
            }

            rest[..digits].parse::<u64>().ok()
        })
}

pub fn next_version(prefix: &str, deployed: &[String]) -> DeployResult<String> {
    let highest = deployed
        .iter()
        .filter_map(|id| deployed_number(prefix, id))
        .max()
        .unwrap_or(0);
    let next = highest
        .checked_add(1)
        .ok_or_else(|| DeployError::VersionOverflow {
            prefix: prefix.to_string(),
        })?;
    Ok(format!("{}{}", prefix, next))
}

/// Computes the version to deploy from the template and the versions already deployed.
pub fn resolve_version(
    template: &str,
    deployed: &[String],
    label: Option<&Label>,
    logger: &dyn Logger,
) -> DeployResult<String> {
    let base = match parse_template(template) {
        VersionTemplate::Incremental { prefix } => {
            let next = next_version(prefix, deployed)?;
            logger.verbose(&format!(
                "{} deployed versions scanned for prefix '{}', next is {}",
                deployed.len(),
                prefix,
                next
            ));
            next
        }
        VersionTemplate::Literal(version) => {
            if deployed.iter().any(|id| id == version) {
                logger.warning(&format!(
                    "Version {} is already deployed and will be overwritten",
                    version
                ));
            }
            version.to_string()
        }
    };

    Ok(match label {
        Some(label) => format!("{}-{}", base, label),
        None => base,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeployError;
    use crate::logging::{MockLogger, SilentLogger};
    use mockall::predicate::*;

    fn versions(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_parse_template() {
        assert_eq!(
            parse_template("deploy++"),
            VersionTemplate::Incremental { prefix: "deploy" }
        );
        assert_eq!(
            parse_template("++"),
            VersionTemplate::Incremental { prefix: "" }
        );
        assert_eq!(parse_template("stable"), VersionTemplate::Literal("stable"));
        assert_eq!(parse_template("v+"), VersionTemplate::Literal("v+"));
    }

    #[test]
    fn test_deployed_number() {
        assert_eq!(deployed_number("v", "v12"), Some(12));
        assert_eq!(deployed_number("v", "v4-rc1"), Some(4));
        assert_eq!(deployed_number("deploy", "deploy7-hotfix-2"), Some(7));
        assert_eq!(deployed_number("v", "release-v3"), Some(3));
        assert_eq!(deployed_number("v", "v"), None);
        assert_eq!(deployed_number("v", "v3x"), None);
        assert_eq!(deployed_number("v", "v3-"), None);
        assert_eq!(deployed_number("v", "v3-Bad"), None);
        assert_eq!(deployed_number("deploy", "20240101t120000"), None);
        assert_eq!(deployed_number("", "42"), Some(42));
    }

    #[test]
    fn test_deployed_number_with_repeated_prefix() {
        assert_eq!(deployed_number("vv", "vvv3"), Some(3));
        assert_eq!(deployed_number("aa", "aaa12-rc1"), Some(12));
        assert_eq!(deployed_number("vv", "vvvx"), None);
        assert_eq!(
            resolve_version("vv++", &versions(&["vvv3"]), None, &SilentLogger).unwrap(),
            "vv4"
        );
    }

    #[test]
    fn test_next_version_overflow() {
        let deployed = versions(&["v18446744073709551615", "v2"]);
        let err = resolve_version("v++", &deployed, None, &SilentLogger).unwrap_err();
        assert!(matches!(err, DeployError::VersionOverflow { ref prefix } if prefix == "v"));
        assert_eq!(err.exit_code(), 3);

        assert_eq!(
            next_version("v", &versions(&["v18446744073709551614"])).unwrap(),
            "v18446744073709551615"
        );
    }

    #[test]
    fn test_incremental_resolution() {
        let logger = SilentLogger;
        assert_eq!(
            resolve_version("v++", &versions(&["v1", "v3", "v2"]), None, &logger).unwrap(),
            "v4"
        );
        assert_eq!(resolve_version("v++", &[], None, &logger).unwrap(), "v1");
        assert_eq!(
            resolve_version(
                "deploy++",
                &versions(&["20240101t120000", "deploy2-rc1", "other9"]),
                None,
                &logger
            )
            .unwrap(),
            "deploy3"
        );
    }

    #[test]
    fn test_incremental_resolution_with_label() {
        let label = Label::parse("rc1").unwrap();
        assert_eq!(
            resolve_version("v++", &versions(&["v4"]), Some(&label), &SilentLogger).unwrap(),
            "v5-rc1"
        );
    }

    #[test]
    fn test_literal_resolution_warns_when_deployed() {
        let mut logger = MockLogger::new();
        logger
            .expect_warning()
            .with(function(|message: &str| message.contains("stable")))
            .times(1)
            .return_const(());
        logger.expect_verbose().return_const(());

        let version =
            resolve_version("stable", &versions(&["v1", "stable"]), None, &logger).unwrap();
        assert_eq!(version, "stable");
    }

    #[test]
    fn test_literal_resolution_without_conflict() {
        let mut logger = MockLogger::new();
        logger.expect_warning().times(0);
        logger.expect_verbose().return_const(());

        assert_eq!(
            resolve_version(
                "stable",
                &versions(&["v1"]),
                Some(&Label::parse("blue").unwrap()),
                &logger
            )
            .unwrap(),
            "stable-blue"
        );
    }
}
