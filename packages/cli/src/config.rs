use marginalia_annotate::{
    AnnotateResult, Annotator, AnnotatorConfig, AnnotatorSettings, DecorateError, Decoration,
    Decorator, DecoratorData,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "marginalia.config.json";

/// Marginalia configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Engine options (wrapper tag, block lists, uid prefix, ...)
    #[serde(flatten)]
    pub annotator: AnnotatorConfig,

    /// Annotation names and how they are decorated
    #[serde(default = "default_annotations")]
    pub annotations: BTreeMap<String, AnnotationDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDef {
    /// Extra classes on every marker
    #[serde(default)]
    pub classes: Vec<String>,

    /// Extra attributes; values may use `{uid}` and `{data.<key>}`
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Keep markers in saved output
    #[serde(default = "default_persistent")]
    pub persistent: bool,
}

fn default_persistent() -> bool {
    true
}

fn default_annotations() -> BTreeMap<String, AnnotationDef> {
    let mut annotations = BTreeMap::new();
    annotations.insert(
        "comment".to_string(),
        AnnotationDef {
            persistent: true,
            ..Default::default()
        },
    );
    annotations
}

impl Config {
    /// Load `explicit`, or the default config file in `cwd` if there is one
    pub fn load(cwd: &str, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else if explicit.is_some() {
            Err(anyhow::anyhow!(
                "Config file does not exist: {}",
                config_path.display()
            ))
        } else {
            Ok(Config::default())
        }
    }

    /// Annotator with every configured annotation registered
    pub fn annotator(&self) -> AnnotateResult<Annotator> {
        let mut annotator = Annotator::new(self.annotator.clone())?;
        for (name, def) in &self.annotations {
            let decorator = TemplateDecorator {
                name: name.clone(),
                classes: def.classes.clone(),
                attributes: def.attributes.clone(),
            };
            annotator.register(
                name.as_str(),
                AnnotatorSettings::new(decorator).persistent(def.persistent),
            );
        }
        Ok(annotator)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            annotator: AnnotatorConfig::default(),
            annotations: default_annotations(),
        }
    }
}

/// Decorator filled in from an [`AnnotationDef`]
#[derive(Debug, Clone)]
pub struct TemplateDecorator {
    name: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
}

impl TemplateDecorator {
    fn render(&self, template: &str, uid: &str, data: &DecoratorData) -> Result<String, DecorateError> {
        let mut out = String::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                return Err(DecorateError::new(
                    self.name.as_str(),
                    format!("unclosed placeholder in '{}'", template),
                ));
            };
            let key = &after[..close];
            match key.strip_prefix("data.") {
                Some(field) => match data.get(field) {
                    Some(Value::String(value)) => out.push_str(value),
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        return Err(DecorateError::new(
                            self.name.as_str(),
                            format!("missing data '{}'", field),
                        ))
                    }
                },
                None if key == "uid" => out.push_str(uid),
                None => {
                    return Err(DecorateError::new(
                        self.name.as_str(),
                        format!("unknown placeholder '{{{}}}'", key),
                    ))
                }
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

impl Decorator for TemplateDecorator {
    fn decorate(&self, uid: &str, data: &DecoratorData) -> Result<Decoration, DecorateError> {
        let mut decoration = Decoration::default();
        for (name, template) in &self.attributes {
            decoration = decoration.with_attribute(name.as_str(), self.render(template, uid, data)?);
        }
        for class in &self.classes {
            decoration = decoration.with_class(class.as_str());
        }
        Ok(decoration)
    }
}
