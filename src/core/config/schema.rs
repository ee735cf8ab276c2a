//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Config File
//!
//! The same schema is used for the global file and the project file. Keys
//! use the option names build tool users already know:
//!
//! ```toml
//! namespace = "git"
//! dirtyValue = "dirty"
//! shortRevisionLength = 7
//! gitDateFormat = "yyyy-MM-dd"
//! buildDateFormat = "yyyy-MM-dd HH:mm:ss"
//! dateFormatTimeZone = "UTC"
//! countCommitsSinceExclusive = "v1.0"
//! buildNumberFormat = 'branch + "." + commitsCount'
//! formatEngine = "rhai"
//! ```
//!
//! # Validation
//!
//! Values are validated when [`Parameters`] are resolved. Recoverable
//! problems (bad namespace, out-of-range length) fall back to defaults and
//! produce a warning; unusable values (bad date pattern, unknown zone or
//! engine) are errors.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigWarning};
use crate::core::ancestry::BoundKind;
use crate::core::dates::{DatePattern, Zone};
use crate::core::types::MAX_SHORT_LEN;
use crate::script::EngineKind;

pub const DEFAULT_NAMESPACE: &str = "git";
pub const DEFAULT_DIRTY_VALUE: &str = "dirty";
pub const DEFAULT_SHORT_REVISION_LENGTH: usize = 7;
pub const DEFAULT_GIT_DATE_FORMAT: &str = "yyyy-MM-dd";
pub const DEFAULT_BUILD_DATE_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// One layer of configuration: a file, or the command line.
///
/// Every field is optional; layers are merged before resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ConfigFile {
    /// Prefix for published property names
    pub namespace: Option<String>,

    /// Value of the `dirty` field when the tree is dirty
    pub dirty_value: Option<String>,

    /// Length of `shortRevision` and `shortParent` ids
    pub short_revision_length: Option<i64>,

    /// Pattern for `authorDate` and `commitDate`
    pub git_date_format: Option<String>,

    /// Pattern for `buildDate`
    pub build_date_format: Option<String>,

    /// Zone for both date patterns (default: local)
    pub date_format_time_zone: Option<String>,

    /// Count commits back to this ancestor, counting it
    pub count_commits_since_inclusive: Option<String>,

    /// Count commits back to this ancestor, not counting it
    pub count_commits_since_exclusive: Option<String>,

    /// Expression producing `buildNumber`
    pub build_number_format: Option<String>,

    /// Evaluator for `buildNumberFormat`: rhai, command, disabled
    pub format_engine: Option<String>,

    /// Program and leading arguments for the `command` engine
    pub format_command: Option<Vec<String>>,

    /// Where to start searching for the repository
    pub repository_directory: Option<PathBuf>,

    /// Skip extraction entirely
    pub skip: Option<bool>,

    /// Log parameters, timings and every extracted field
    pub verbose: Option<bool>,
}

impl ConfigFile {
    /// Overlay `higher` on top of `self`; values set in `higher` win.
    pub fn merge(self, higher: ConfigFile) -> ConfigFile {
        ConfigFile {
            namespace: higher.namespace.or(self.namespace),
            dirty_value: higher.dirty_value.or(self.dirty_value),
            short_revision_length: higher.short_revision_length.or(self.short_revision_length),
            git_date_format: higher.git_date_format.or(self.git_date_format),
            build_date_format: higher.build_date_format.or(self.build_date_format),
            date_format_time_zone: higher.date_format_time_zone.or(self.date_format_time_zone),
            count_commits_since_inclusive: higher
                .count_commits_since_inclusive
                .or(self.count_commits_since_inclusive),
            count_commits_since_exclusive: higher
                .count_commits_since_exclusive
                .or(self.count_commits_since_exclusive),
            build_number_format: higher.build_number_format.or(self.build_number_format),
            format_engine: higher.format_engine.or(self.format_engine),
            format_command: higher.format_command.or(self.format_command),
            repository_directory: higher.repository_directory.or(self.repository_directory),
            skip: higher.skip.or(self.skip),
            verbose: higher.verbose.or(self.verbose),
        }
    }
}

/// Ancestor at which commit counting stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorBound {
    pub kind: BoundKind,
    /// Tag name or (abbreviated) commit id, not yet resolved
    pub reference: String,
}

/// Fully resolved parameters for one extraction run.
#[derive(Debug, Clone)]
pub struct Parameters {
    pub namespace: String,
    pub dirty_value: String,
    pub short_revision_length: usize,
    pub git_date_format: DatePattern,
    pub build_date_format: DatePattern,
    pub date_format_time_zone: Option<String>,
    pub zone: Zone,
    pub count_commits_since_inclusive: Option<String>,
    pub count_commits_since_exclusive: Option<String>,
    pub build_number_format: Option<String>,
    pub format_engine: EngineKind,
    pub repository_directory: PathBuf,
    pub skip: bool,
    pub verbose: bool,
}

impl Parameters {
    /// Apply defaults and validate a merged configuration layer.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for date patterns, time zones or
    /// format engines that cannot be used.
    pub fn resolve(file: ConfigFile) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        let mut warnings = Vec::new();

        let namespace = match file.namespace {
            Some(ns) if is_valid_namespace(&ns) => ns,
            Some(ns) => {
                warnings.push(ConfigWarning::new(format!(
                    "invalid namespace '{}', using '{}'",
                    ns, DEFAULT_NAMESPACE
                )));
                DEFAULT_NAMESPACE.to_string()
            }
            None => DEFAULT_NAMESPACE.to_string(),
        };

        let short_revision_length = match file.short_revision_length {
            None => DEFAULT_SHORT_REVISION_LENGTH,
            Some(len) => {
                let clamped = len.clamp(0, MAX_SHORT_LEN as i64);
                if clamped != len {
                    warnings.push(ConfigWarning::new(format!(
                        "shortRevisionLength {} out of range 0..={}, using {}",
                        len, MAX_SHORT_LEN, clamped
                    )));
                }
                clamped as usize
            }
        };

        let git_date_format = parse_pattern(
            "gitDateFormat",
            file.git_date_format.as_deref().unwrap_or(DEFAULT_GIT_DATE_FORMAT),
        )?;
        let build_date_format = parse_pattern(
            "buildDateFormat",
            file.build_date_format
                .as_deref()
                .unwrap_or(DEFAULT_BUILD_DATE_FORMAT),
        )?;

        let zone = Zone::parse(file.date_format_time_zone.as_deref())
            .map_err(|e| ConfigError::InvalidValue(format!("dateFormatTimeZone: {}", e)))?;

        let format_engine = EngineKind::parse(
            file.format_engine.as_deref(),
            file.format_command.unwrap_or_default(),
        )
        .map_err(|e| ConfigError::InvalidValue(format!("formatEngine: {}", e)))?;

        let count_commits_since_inclusive = non_empty(file.count_commits_since_inclusive);
        let count_commits_since_exclusive = non_empty(file.count_commits_since_exclusive);
        if count_commits_since_inclusive.is_some() && count_commits_since_exclusive.is_some() {
            warnings.push(ConfigWarning::new(
                "both countCommitsSinceInclusive and countCommitsSinceExclusive are set; \
                 the inclusive bound is used"
                    .to_string(),
            ));
        }

        let params = Parameters {
            namespace,
            dirty_value: file
                .dirty_value
                .unwrap_or_else(|| DEFAULT_DIRTY_VALUE.to_string()),
            short_revision_length,
            git_date_format,
            build_date_format,
            date_format_time_zone: file.date_format_time_zone,
            zone,
            count_commits_since_inclusive,
            count_commits_since_exclusive,
            build_number_format: non_empty(file.build_number_format),
            format_engine,
            repository_directory: file
                .repository_directory
                .unwrap_or_else(|| PathBuf::from(".")),
            skip: file.skip.unwrap_or(false),
            verbose: file.verbose.unwrap_or(false),
        };

        Ok((params, warnings))
    }

    /// The ancestor bound, if any. The inclusive setting wins when both are set.
    pub fn ancestor_bound(&self) -> Option<AncestorBound> {
        if let Some(reference) = &self.count_commits_since_inclusive {
            return Some(AncestorBound {
                kind: BoundKind::Inclusive,
                reference: reference.clone(),
            });
        }
        self.count_commits_since_exclusive
            .as_ref()
            .map(|reference| AncestorBound {
                kind: BoundKind::Exclusive,
                reference: reference.clone(),
            })
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt(value: &Option<String>) -> &str {
            value.as_deref().unwrap_or("<unset>")
        }

        write!(
            f,
            "namespace={}, dirtyValue={}, shortRevisionLength={}, gitDateFormat={}, \
             buildDateFormat={}, dateFormatTimeZone={}, countCommitsSinceInclusive={}, \
             countCommitsSinceExclusive={}, buildNumberFormat={}, formatEngine={}, \
             repositoryDirectory={}, skip={}, verbose={}",
            self.namespace,
            self.dirty_value,
            self.short_revision_length,
            self.git_date_format.source(),
            self.build_date_format.source(),
            opt(&self.date_format_time_zone),
            opt(&self.count_commits_since_inclusive),
            opt(&self.count_commits_since_exclusive),
            opt(&self.build_number_format),
            self.format_engine,
            self.repository_directory.display(),
            self.skip,
            self.verbose,
        )
    }
}

fn parse_pattern(option: &str, pattern: &str) -> Result<DatePattern, ConfigError> {
    DatePattern::parse(pattern).map_err(|e| ConfigError::InvalidValue(format!("{}: {}", option, e)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Words that build tools reject as property name segments.
const RESERVED_WORDS: &[&str] = &[
    "_", "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
    "const", "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "void", "volatile", "while",
];

/// A namespace is one or more dot-separated identifiers, none of them a
/// reserved word.
pub fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace.split('.').all(|segment| {
            let mut chars = segment.chars();
            let identifier = match chars.next() {
                Some(first) if first.is_alphabetic() || first == '_' || first == '$' => chars
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '$'),
                _ => false,
            };
            identifier && !RESERVED_WORDS.contains(&segment)
        })
}
