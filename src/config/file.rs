use super::app::Backend;
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Output {
    #[serde(rename = "type")]
    pub backend: Option<Backend>,
    pub display: Option<usize>,
    pub path: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub tolerance: Option<u64>,
    pub min_brightness: Option<u64>,
    pub max_brightness: Option<u64>,
    pub interval: Option<f64>,
    pub sleep: Option<bool>,
    pub output: Output,
}
