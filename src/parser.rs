//! Parsing Module

use crate::error::{BotError, Result};
use crate::utils::log::{log, LogLevel};
use serde::de::Error as _;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Name of the optional config file looked up in the working directory
pub const CONFIG_FILE: &str = "buildbot.toml";

/// The properties bag handed over by the CI job.
///
/// Values are only type checked when a command reads them, so a command
/// never fails on keys it does not consult.
#[derive(Debug, Default, PartialEq)]
pub struct Properties {
    values: Map<String, Value>,
}

impl Properties {
    /// Parses the JSON string given on the command line.
    /// The top level value must be an object, unknown keys are ignored.
    pub fn parse(json: &str) -> Result<Properties> {
        match serde_json::from_str(json)? {
            Value::Object(values) => Ok(Properties { values }),
            _ => Err(serde_json::Error::custom("properties must be a JSON object").into()),
        }
    }

    /// Looks up a string property, `null` counts as absent
    pub fn string(&self, key: &'static str) -> Result<Option<&str>> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(BotError::InvalidProperty {
                key,
                expected: "a string",
            }),
        }
    }

    /// Looks up a boolean switch, absent means off
    pub fn flag(&self, key: &str) -> bool {
        self.values.get(key).map_or(false, is_truthy)
    }

    /// Returns `cxx_mkspec` or fails with a lookup error
    pub fn required_mkspec(&self) -> Result<&str> {
        self.string("cxx_mkspec")?
            .ok_or(BotError::MissingProperty("cxx_mkspec"))
    }

    /// Turns `tool_options` into command line flags, one per entry
    pub fn tool_option_flags(&self) -> Result<Vec<String>> {
        let options = match self.values.get("tool_options") {
            None => return Ok(Vec::new()),
            Some(Value::Object(options)) => options,
            Some(_) => {
                return Err(BotError::InvalidProperty {
                    key: "tool_options",
                    expected: "an object",
                })
            }
        };
        Ok(options
            .iter()
            .map(|(key, value)| match value {
                Value::Null => format!("--{}", key),
                value => format!("--{}={}", key, render_value(value)),
            })
            .collect())
    }
}

/// Renders a value the way the waf scripts print it: strings raw,
/// booleans as `True`/`False`, everything else in its JSON form
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

/// Truthiness as the CI job scripts understand it
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Struct describing the tools buildbot drives
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub python: String,
    pub waf: String,
    pub compiler: String,
    /// Smoke tests only run for mkspecs starting with this prefix
    pub native_mkspec_prefix: String,
    pub example: PathBuf,
    pub static_libs: Vec<String>,
    pub dynamic_libs: Vec<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            python: "python3".to_string(),
            waf: "waf".to_string(),
            compiler: "gcc".to_string(),
            native_mkspec_prefix: "cxx_gxx".to_string(),
            example: PathBuf::from("examples/encode_decode_simple/encode_decode_simple.c"),
            static_libs: ["kodo_rlnc_c_static", "kodo_rlnc", "fifi", "cpuid"]
                .iter()
                .map(|&lib| lib.to_string())
                .collect(),
            dynamic_libs: vec!["m".to_string(), "stdc++".to_string()],
        }
    }
}

impl BotConfig {
    /// The build tool invocation every waf command line starts with
    pub fn waf_command(&self) -> Vec<String> {
        vec![self.python.clone(), self.waf.clone()]
    }

    /// File name of the example source
    pub fn example_source(&self) -> Result<&str> {
        self.example
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| self.bad_example())
    }

    /// Name of the example binary, the source name without its extension
    pub fn example_binary(&self) -> Result<&str> {
        self.example
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| self.bad_example())
    }

    fn bad_example(&self) -> BotError {
        BotError::io(
            "Invalid example source",
            &self.example,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    bot: BotConfig,
}

/// This function is used to parse the config file of the local checkout.
/// A missing file yields the defaults.
/// # Arguments
/// * `path` - The path to the config file
pub fn parse_config(path: &Path) -> Result<BotConfig> {
    if !path.exists() {
        log(
            LogLevel::Debug,
            &format!("No config file at {}, using defaults", path.display()),
        );
        return Ok(BotConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| BotError::io("Could not read config file", path, e))?;
    parse_config_str(&contents)
}

/// Parses the contents of a config file
pub fn parse_config_str(contents: &str) -> Result<BotConfig> {
    let config: ConfigFile = toml::from_str(contents)?;
    log(LogLevel::Debug, &format!("Bot config: {:?}", config.bot));
    Ok(config.bot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_properties() {
        let json = r#"{
            "cxx_mkspec": "cxx_gxx83_x64",
            "waf_resolve_path": "/srv/resolve",
            "build_distclean": true,
            "install_path": "/tmp/install",
            "tool_options": {"cxx_debug": null, "jobs": 4},
            "builder": "linux"
        }"#;
        let props = Properties::parse(json).unwrap();
        assert_eq!(props.required_mkspec().unwrap(), "cxx_gxx83_x64");
        assert_eq!(props.string("waf_resolve_path").unwrap(), Some("/srv/resolve"));
        assert!(props.flag("build_distclean"));
        assert!(!props.flag("valgrind_run"));
        assert_eq!(props.string("install_path").unwrap(), Some("/tmp/install"));
        assert_eq!(props.tool_option_flags().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_empty_object() {
        let props = Properties::parse("{}").unwrap();
        assert_eq!(props, Properties::default());
        assert!(props.tool_option_flags().unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            Properties::parse("{\"cxx_mkspec\": "),
            Err(BotError::ParseProperties(_))
        ));
        assert!(matches!(
            Properties::parse("[1, 2]"),
            Err(BotError::ParseProperties(_))
        ));
    }

    #[test]
    fn test_mistyped_values_fail_on_read() {
        let props = Properties::parse(r#"{"cxx_mkspec": 7, "tool_options": null}"#).unwrap();
        assert!(matches!(
            props.required_mkspec(),
            Err(BotError::InvalidProperty { key: "cxx_mkspec", .. })
        ));
        assert!(matches!(
            props.tool_option_flags(),
            Err(BotError::InvalidProperty { key: "tool_options", .. })
        ));
        assert_eq!(props.string("install_path").unwrap(), None);
    }

    #[test]
    fn test_truthy_flags() {
        let props = Properties::parse(
            r#"{"valgrind_run": 1, "build_distclean": "", "install_relative": "yes"}"#,
        )
        .unwrap();
        assert!(props.flag("valgrind_run"));
        assert!(!props.flag("build_distclean"));
        assert!(props.flag("install_relative"));

        let props = Properties::parse(r#"{"valgrind_run": null, "install_relative": 0}"#).unwrap();
        assert!(!props.flag("valgrind_run"));
        assert!(!props.flag("install_relative"));
    }

    #[test]
    fn test_tool_option_flags() {
        let props = Properties::parse(
            r#"{"tool_options": {"cxx_debug": null, "jobs": 4, "run_silent": true, "strict": false, "target": "x86"}}"#,
        )
        .unwrap();
        let flags = props.tool_option_flags().unwrap();
        assert_eq!(
            flags,
            vec!["--cxx_debug", "--jobs=4", "--run_silent=True", "--strict=False", "--target=x86"]
        );
    }

    #[test]
    fn test_required_mkspec() {
        let props = Properties::default();
        assert!(matches!(
            props.required_mkspec(),
            Err(BotError::MissingProperty("cxx_mkspec"))
        ));
    }

    #[test]
    fn test_parse_config_str() {
        let toml = r#"
[bot]
python = "/usr/bin/python3.11"
static_libs = ["kodo_rlnc_c_static"]
"#;
        let config = parse_config_str(toml).unwrap();
        assert_eq!(config.python, "/usr/bin/python3.11");
        assert_eq!(config.static_libs, vec!["kodo_rlnc_c_static"]);
        assert_eq!(config.waf, "waf");
        assert_eq!(config.native_mkspec_prefix, "cxx_gxx");
    }

    #[test]
    fn test_parse_config_invalid() {
        assert!(matches!(
            parse_config_str("[bot]\npython = 3"),
            Err(BotError::ParseConfig(_))
        ));
    }

    #[test]
    fn test_parse_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = parse_config(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, BotConfig::default());
    }

    #[test]
    fn test_example_names() {
        let config = BotConfig::default();
        assert_eq!(config.example_source().unwrap(), "encode_decode_simple.c");
        assert_eq!(config.example_binary().unwrap(), "encode_decode_simple");
    }
}
