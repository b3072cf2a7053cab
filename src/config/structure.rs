//! Configuration structure
// (c) 2024 Ross Younger

use std::path::PathBuf;

use figment::{
    value::{Dict, Map, Value},
    Metadata, Profile, Provider,
};
use serde::{Deserialize, Serialize};
use struct_field_names_as_array::FieldNamesAsSlice;

use crate::os::{AbstractPlatform as _, Platform};
use crate::ssh::DEFAULT_DESCRIPTION_TAG;

/// The set of configurable options supported by sshpick.
///
/// **Note:** The implementation of `default()` for this struct returns the hard-wired defaults.
///
/// Values entered on the command line arrive as an [`Overrides`], in which every
/// field is optional. Wherever the user does not provide a value, values read from lower priority
/// sources (environment, configuration file and system defaults) obtain.
///
// Maintainer note: None of the members of this struct should be Option<anything>.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, FieldNamesAsSlice)]
pub struct Configuration {
    /// The root ssh client configuration file.
    /// A leading `~` is expanded when the file is opened.
    pub ssh_config: String,

    /// The command word recognised at the start of a line buffer.
    /// It is also used to obtain the effective configuration for previews.
    pub connect_command: String,

    /// The interactive picker program
    pub picker: String,

    /// Extra arguments for the picker, appended after our own
    pub picker_options: Vec<String>,

    /// The comment prefix which marks a host description
    pub description_tag: String,

    /// Whether to ask the picker for a preview pane
    pub preview: bool,

    /// The height of the picker (passed as its `--height`)
    pub picker_height: String,
}

impl Configuration {
    /// The root ssh configuration file, with any leading `~` expanded
    pub fn ssh_config_path(&self) -> anyhow::Result<PathBuf> {
        use anyhow::Context as _;
        if self.ssh_config.starts_with('~') {
            expanduser::expanduser(&self.ssh_config)
                .with_context(|| format!("expanding {}", self.ssh_config))
        } else {
            Ok(PathBuf::from(&self.ssh_config))
        }
    }
}

impl Default for Configuration {
    /// **(Unusual!)**
    /// Returns sshpick's hard-wired defaults.
    fn default() -> Self {
        let ssh_config = Platform::user_ssh_config().map_or_else(
            |_| "~/.ssh/config".to_string(),
            |p| p.to_string_lossy().into_owned(),
        );
        Self {
            ssh_config,
            connect_command: "ssh".into(),
            picker: "fzf".into(),
            picker_options: Vec::new(),
            description_tag: DEFAULT_DESCRIPTION_TAG.into(),
            preview: true,
            picker_height: "50%".into(),
        }
    }
}

/// Helper function for `figment::Provider` implementation
///
/// If the given `arg` is not None, inserts it into `dict` with key `arg_name`.
pub(crate) fn insert_if_some<T>(
    dict: &mut Dict,
    arg_name: &str,
    arg: Option<T>,
) -> Result<(), figment::Error>
where
    T: Serialize,
{
    if let Some(a) = arg {
        let _ = dict.insert(arg_name.to_string(), Value::serialize(a)?);
    }
    Ok(())
}

/// Configuration values entered on the command line.
///
/// This is [`Configuration`] with every member optional.
/// It implements [`figment::Provider`], contributing only the values the user entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, clap::Args)]
pub struct Overrides {
    /// The ssh client configuration file to read
    /// [default: ~/.ssh/config, or `SSH_CONFIG_FILE` if set]
    #[arg(long, value_name = "FILE", help_heading("Configuration"))]
    pub ssh_config: Option<String>,

    /// The interactive picker program [default: fzf]
    #[arg(long, value_name = "PROGRAM", help_heading("Configuration"))]
    pub picker: Option<String>,

    /// The command recognised in the line buffer, and used for previews [default: ssh]
    #[arg(long, value_name = "COMMAND", help_heading("Configuration"))]
    pub connect_command: Option<String>,

    /// Do not show a preview pane in the picker
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading("Configuration"))]
    pub no_preview: bool,
}

impl Provider for Overrides {
    fn metadata(&self) -> Metadata {
        Metadata::named("command-line").interpolater(|_profile, path| {
            let key = path
                .last()
                .map_or_else(|| "<unknown>".to_string(), |s| s.replace('_', "-"));
            format!("--{key}")
        })
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut dict = Dict::new();
        insert_if_some(&mut dict, "ssh_config", self.ssh_config.clone())?;
        insert_if_some(&mut dict, "picker", self.picker.clone())?;
        insert_if_some(&mut dict, "connect_command", self.connect_command.clone())?;
        insert_if_some(&mut dict, "preview", self.no_preview.then_some(false))?;

        let mut profile_map = Map::new();
        let _ = profile_map.insert(Profile::Global, dict);
        Ok(profile_map)
    }
}

#[cfg(test)]
mod test {
    use figment::{providers::Serialized, Figment};
    use struct_field_names_as_array::FieldNamesAsSlice as _;

    use super::{Configuration, Overrides};

    #[test]
    fn defaults() {
        let c = Configuration::default();
        assert_eq!(c.connect_command, "ssh");
        assert_eq!(c.picker, "fzf");
        assert_eq!(c.description_tag, "#_Desc");
        assert!(c.preview);
        assert!(c.picker_options.is_empty());
        assert!(c.ssh_config.ends_with(".ssh/config"));
    }

    #[test]
    fn field_names() {
        assert_eq!(
            Configuration::FIELD_NAMES_AS_SLICE,
            [
                "ssh_config",
                "connect_command",
                "picker",
                "picker_options",
                "description_tag",
                "preview",
                "picker_height"
            ]
        );
    }

    #[test]
    fn only_entered_values_override() {
        let entered = Overrides {
            picker: Some("sk".into()),
            no_preview: true,
            ..Default::default()
        };
        let result: Configuration = Figment::new()
            .merge(Serialized::defaults(Configuration::default()))
            .merge(entered)
            .extract()
            .unwrap();
        assert_eq!(
            result,
            Configuration {
                picker: "sk".into(),
                preview: false,
                ..Default::default()
            }
        );
    }

    #[test]
    fn tilde_path_is_expanded() {
        let c = Configuration {
            ssh_config: "~/x/config".into(),
            ..Default::default()
        };
        let path = c.ssh_config_path().unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("x/config"));

        let c = Configuration {
            ssh_config: "/etc/ssh/ssh_config".into(),
            ..Default::default()
        };
        assert_eq!(
            c.ssh_config_path().unwrap().to_str(),
            Some("/etc/ssh/ssh_config")
        );
    }
}
