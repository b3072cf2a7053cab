//! Configuration file wrangling
// (c) 2024 Ross Younger

use super::Configuration;
use crate::cli::styles::{ERROR, WARNING};
use crate::os::{AbstractPlatform as _, Platform};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::Value,
    Figment, Metadata, Provider,
};
use serde::de::DeserializeOwned;
use std::{
    collections::{BTreeSet, HashSet},
    fmt::{Debug, Display},
};
use struct_field_names_as_array::FieldNamesAsSlice;
use tabled::{settings::style::Style, Table, Tabled};

use tracing::{trace, warn};

/// Environment variable naming an alternative root ssh configuration file
pub const SSH_CONFIG_ENV_VAR: &str = "SSH_CONFIG_FILE";

/// Prefix for environment variables which set any configuration field
pub const ENV_PREFIX: &str = "SSHPICK_";

// SYSTEM DEFAULTS //////////////////////////////////////////////////////////////////////////////////////////////

/// A `[https://docs.rs/figment/latest/figment/trait.Provider.html](figment::Provider)` that holds
/// our set of fixed system default options
#[derive(Debug, Default, Clone, Copy)]
struct SystemDefault {}

impl SystemDefault {
    const META_NAME: &str = "default";
}

impl Provider for SystemDefault {
    fn metadata(&self) -> Metadata {
        figment::Metadata::named(Self::META_NAME)
    }

    fn data(
        &self,
    ) -> std::result::Result<
        figment::value::Map<figment::Profile, figment::value::Dict>,
        figment::Error,
    > {
        Serialized::defaults(Configuration::default()).data()
    }
}

// CONFIG MANAGER /////////////////////////////////////////////////////////////////////////////////////////////

/// Processes and merges all possible configuration sources.
///
/// Sources, lowest priority first:
/// 1. Hard-wired defaults
/// 2. The user configuration file (`~/.sshpick.toml`)
/// 3. Environment: `SSH_CONFIG_FILE`, then `SSHPICK_<FIELD>`
/// 4. Anything merged in by the caller, typically command-line options
///
/// To see what applies on the current platform, run `sshpick --config-files`.
#[derive(Debug, Default)]
pub struct Manager {
    /// Configuration data
    data: Figment,
}

fn add_user_config(f: Figment) -> Figment {
    let Some(path) = Platform::user_config_path() else {
        warn!("could not determine user configuration file path");
        return f;
    };
    if !path.exists() {
        trace!("user configuration file {path:?} not present");
        return f;
    }
    f.merge(Toml::file(path.as_path()))
}

fn add_environment(f: Figment, ssh_config_var: &str, prefix: &str) -> Figment {
    f.merge(
        Env::raw()
            .only(&[ssh_config_var])
            .map(|_| "ssh_config".into()),
    )
    .merge(Env::prefixed(prefix))
}

impl Manager {
    /// Initialises this structure, reading the user's config file and the environment.
    #[must_use]
    pub fn new() -> Self {
        let mut data = Figment::new().merge(SystemDefault::default());
        // N.B. This may leave data in a fused-error state, if a data file isn't parseable.
        data = add_user_config(data);
        data = add_environment(data, SSH_CONFIG_ENV_VAR, ENV_PREFIX);
        Self { data }
    }

    /// Returns the list of configuration files we read.
    ///
    /// This is a function of platform and the current user id.
    #[must_use]
    pub fn config_files() -> Vec<String> {
        Platform::user_config_path()
            .into_iter()
            .map(|p| p.into_os_string().to_string_lossy().into())
            .collect()
    }

    /// Testing constructor, does not read files or the environment
    #[cfg(test)]
    #[must_use]
    pub(crate) fn without_files() -> Self {
        let data = Figment::new().merge(SystemDefault::default());
        Self { data }
    }

    /// Merges in a data set, which is some sort of [figment::Provider](https://docs.rs/figment/latest/figment/trait.Provider.html).
    ///
    /// Command-line options arrive as a [`super::Overrides`], which is a Provider.
    pub fn merge_provider<T>(&mut self, provider: T)
    where
        T: Provider,
    {
        let f = std::mem::take(&mut self.data);
        self.data = f.merge(provider); // in the error case, this leaves the provider in a fused state
    }

    /// Attempts to extract a particular struct from the data.
    ///
    /// Within sshpick, `T` is usually [Configuration], but it isn't intrinsically required to be.
    pub fn get<T>(&self) -> Result<T, figment::Error>
    where
        T: DeserializeOwned,
    {
        self.data.extract::<T>()
    }

    /// Every top-level key present in any profile
    fn keys(&self) -> Result<BTreeSet<String>, figment::Error> {
        Ok(self
            .data
            .data()?
            .values()
            .flat_map(|dict| dict.keys().cloned())
            .collect())
    }
}

// PRETTY PRINT SUPPORT ///////////////////////////////////////////////////////////////////////////////////////

#[derive(Tabled)]
struct PrettyConfig {
    field: String,
    value: String,
    source: String,
}

impl PrettyConfig {
    fn render_source(meta: Option<&Metadata>) -> String {
        if let Some(m) = meta {
            m.source
                .as_ref()
                .map_or_else(|| m.name.to_string(), figment::Source::to_string)
        } else {
            String::new()
        }
    }

    fn render_value(value: &Value) -> String {
        match value {
            Value::String(_tag, s) => s.to_string(),
            Value::Char(_tag, c) => c.to_string(),
            Value::Bool(_tag, b) => b.to_string(),
            Value::Num(_tag, num) => {
                if let Some(i) = num.to_i128() {
                    i.to_string()
                } else if let Some(u) = num.to_u128() {
                    u.to_string()
                } else if let Some(ff) = num.to_f64() {
                    ff.to_string()
                } else {
                    "<number>".into()
                }
            }
            Value::Empty(_tag, _) => "<empty>".into(),
            Value::Dict(_tag, dict) => format!("<{} keys>", dict.len()),
            Value::Array(_tag, vec) => {
                format!(
                    "[{}]",
                    vec.iter()
                        .map(PrettyConfig::render_value)
                        .collect::<Vec<_>>()
                        .join(",")
                )
            }
        }
    }

    fn new(field: &str, value: &Value, meta: Option<&Metadata>) -> Self {
        Self {
            field: field.into(),
            value: PrettyConfig::render_value(value),
            source: PrettyConfig::render_source(meta),
        }
    }
}

/// Pretty-printing type wrapper to Manager
#[derive(Debug)]
pub struct DisplayAdapter<'a> {
    /// Data source
    source: &'a Manager,
    /// Whether to warn if unused fields are present
    warn_on_unused: bool,
    /// The fields we want to output
    fields: HashSet<String>,
}

impl Manager {
    /// Creates a `DisplayAdapter` for this struct with the given options.
    ///
    /// # Returns
    /// An ephemeral structure implementing `Display`.
    #[must_use]
    pub fn to_display_adapter<T>(&self, warn_on_unused: bool) -> DisplayAdapter<'_>
    where
        T: FieldNamesAsSlice,
    {
        let fields = T::FIELD_NAMES_AS_SLICE
            .iter()
            .map(|s| String::from(*s))
            .collect();
        DisplayAdapter {
            source: self,
            warn_on_unused,
            fields,
        }
    }
}

impl Display for DisplayAdapter<'_> {
    /// Formats the contents of this structure which are relevant to a given output type.
    ///
    /// N.B. This function uses CLI styling.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use anstream::eprintln;

        let keys = match self.source.keys() {
            Ok(k) => k,
            Err(e) => {
                eprintln!("{}ERROR{} {e}", ERROR.render(), ERROR.render_reset());
                return Ok(());
            }
        };

        let mut output = Vec::<PrettyConfig>::new();
        for field in keys {
            let meta = self.source.data.find_metadata(&field);
            if self.fields.contains(&field) {
                let value = match self.source.data.find_value(&field) {
                    Ok(v) => v,
                    Err(e) => {
                        eprintln!(
                            "{}WARNING{}: error on {field}: {e}",
                            WARNING.render(),
                            WARNING.render_reset()
                        );
                        continue;
                    }
                };
                output.push(PrettyConfig::new(&field, &value, meta));
            } else if self.warn_on_unused {
                let source = PrettyConfig::render_source(meta);
                eprintln!(
                    "{}WARNING{}: unrecognised field `{field}` in {source}",
                    WARNING.render(),
                    WARNING.render_reset()
                );
            }
        }
        write!(f, "{}", Table::new(output).with(Style::sharp()))
    }
}
